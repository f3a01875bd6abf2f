use crate::config::EngineConfig;
use crate::error::{SolverError, SolverResult};
use crate::model::Problem;
use crate::solver::controller::Controller;
use crate::solver::placement::Placement;
use crate::solver::replica::Replica;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const CONTROLLER_SEED_STRIDE: u64 = 1_000_003;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStatus {
    Running,
    SuccessFound(usize),
    Stagnated(usize),
    TimedOut,
    RoundLimitReached,
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Replica id carried by the terminal state, if any.
    pub fn replica(&self) -> Option<usize> {
        match self {
            Self::SuccessFound(id) | Self::Stagnated(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    Success(usize),
    Stagnated(usize),
}

impl RoundOutcome {
    pub fn replica(&self) -> Option<usize> {
        match self {
            Self::Success(id) | Self::Stagnated(id) => Some(*id),
            Self::Continue => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoundReport {
    pub round: usize,
    pub cost_min: f64,
    pub stagnation: usize,
    pub elapsed: Duration,
}

/// Notified on the search thread after every round.
pub trait ProgressCallback {
    fn on_round(&self, report: &RoundReport);
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_round(&self, _report: &RoundReport) {}
}

/// Parallel-tempering search over all controllers and their replicas.
pub struct Engine<'p> {
    problem: &'p Problem,
    config: EngineConfig,
    pool: ThreadPool,

    controllers: Vec<Controller>,
    replicas: Vec<Replica<'p>>,
    placement: Placement,

    iterations_per_round: usize,

    // Per-round results, indexed by global replica id
    replica_cost: Vec<f64>,
    replica_is_opt: Vec<bool>,
    round_times: Vec<f64>,

    prev_cost_min: f64,
    stagnation: usize,
    current_round: usize,
    status: SearchStatus,

    started: Option<Instant>,
    run_time: Duration,
}

impl<'p> Engine<'p> {
    pub fn new(problem: &'p Problem, config: EngineConfig) -> SolverResult<Self> {
        config.validate()?;

        let iterations_per_round = problem.num_vars() * problem.num_k();
        let num_total_replicas = config.num_total_replicas();
        let num_total_cores = config.num_total_cores();

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_total_cores)
            .build()?;

        let seed = config.seed;
        let replicas: Vec<Replica<'p>> = pool.install(|| {
            (0..num_total_replicas)
                .into_par_iter()
                .map(|id| Replica::new(id, problem, seed.map(|s| s.wrapping_add(id as u64))))
                .collect()
        });

        let controllers = (0..config.num_controllers)
            .map(|c| {
                Controller::new(
                    config.replicas_per_controller,
                    config.t_max,
                    config.t_min,
                    config.ladder_mode,
                    iterations_per_round,
                    seed.map(|s| s.wrapping_add(CONTROLLER_SEED_STRIDE * (c as u64 + 1))),
                )
            })
            .collect::<SolverResult<Vec<_>>>()?;

        let placement = Placement::folded(
            config.replicas_per_controller,
            config.num_controllers,
            config.cores_per_controller,
        );

        let replica_cost = replicas.iter().map(|r| r.cost()).collect();

        info!(
            "Engine ready: {} replicas ({} controllers x {}), {} threads, {} iterations/round, ladder {}",
            num_total_replicas,
            config.num_controllers,
            config.replicas_per_controller,
            num_total_cores,
            iterations_per_round,
            config.ladder_mode
        );

        let mut engine = Self {
            problem,
            config,
            pool,
            controllers,
            replicas,
            placement,
            iterations_per_round,
            replica_cost,
            replica_is_opt: vec![false; num_total_replicas],
            round_times: vec![0.0; num_total_replicas],
            prev_cost_min: 0.0,
            stagnation: 0,
            current_round: 0,
            status: SearchStatus::Running,
            started: None,
            run_time: Duration::ZERO,
        };
        engine.prev_cost_min = engine.cost_min();

        Ok(engine)
    }

    /// Seeds every replica with `items` before the search starts. The best
    /// cost seen so far is kept if it is already lower.
    pub fn warm_start(&mut self, items: &[usize]) -> SolverResult<()> {
        for r in &mut self.replicas {
            if !r.inject_state(items) {
                return Err(SolverError::Validation(format!(
                    "Warm start {:?} is not a set of {} distinct indices below {}",
                    items,
                    self.problem.num_k(),
                    self.problem.num_vars()
                )));
            }
        }

        for (cost, r) in self.replica_cost.iter_mut().zip(&self.replicas) {
            *cost = r.cost();
        }
        self.prev_cost_min = self.cost_min();

        info!(
            "Warm-started {} replicas, best cost {}",
            self.replicas.len(),
            self.prev_cost_min
        );
        Ok(())
    }

    /// Runs the search to a terminal state. True iff a replica id was
    /// produced, either by reaching the target cost or by stagnating.
    pub fn solve(&mut self) -> bool {
        self.solve_with(&NoProgress)
    }

    pub fn solve_with<CB: ProgressCallback>(&mut self, callback: &CB) -> bool {
        let start = Instant::now();
        self.started = Some(start);

        let ans = self.execute_search_with(callback);
        self.run_time = start.elapsed();

        info!(
            "Search finished after {} rounds in {:.3}s: {:?}, best cost {}",
            self.current_round,
            self.run_time.as_secs_f64(),
            self.status,
            self.cost_min()
        );

        ans.is_some()
    }

    pub fn execute_search(&mut self) -> Option<usize> {
        self.execute_search_with(&NoProgress)
    }

    /// Repeats rounds until success, stagnation, the time limit or the round
    /// limit, checked in that order at every round boundary.
    pub fn execute_search_with<CB: ProgressCallback>(&mut self, callback: &CB) -> Option<usize> {
        let start = *self.started.get_or_insert_with(Instant::now);
        let time_limit = self.config.time_limit_duration();
        self.status = SearchStatus::Running;

        while self.current_round < self.config.round_limit {
            self.current_round += 1;
            let outcome = self.execute_round();

            callback.on_round(&RoundReport {
                round: self.current_round,
                cost_min: self.prev_cost_min.min(self.cost_min()),
                stagnation: self.stagnation,
                elapsed: start.elapsed(),
            });

            match outcome {
                RoundOutcome::Success(id) => {
                    self.status = SearchStatus::SuccessFound(id);
                    return Some(id);
                }
                RoundOutcome::Stagnated(id) => {
                    self.status = SearchStatus::Stagnated(id);
                    return Some(id);
                }
                RoundOutcome::Continue => {}
            }

            if start.elapsed() >= time_limit {
                self.status = SearchStatus::TimedOut;
                return None;
            }
        }

        self.status = SearchStatus::RoundLimitReached;
        None
    }

    /// One synchronized round: parallel dispatch, join, then single-threaded
    /// success check, controller sync and stagnation bookkeeping.
    pub fn execute_round(&mut self) -> RoundOutcome {
        let rpc = self.config.replicas_per_controller;

        let budgets: Vec<(f64, usize)> = (0..self.replicas.len())
            .map(|id| {
                let controller = &self.controllers[id / rpc];
                let local = id % rpc;
                (
                    controller.replica_temperature(local),
                    controller.replica_iterations(local),
                )
            })
            .collect();

        let ordered: Vec<&mut Replica<'p>> = {
            let mut slots: Vec<Option<&mut Replica<'p>>> =
                self.replicas.iter_mut().map(Some).collect();
            self.placement
                .order()
                .iter()
                .filter_map(|&id| slots[id].take())
                .collect()
        };

        let results: Vec<(usize, bool, f64, f64)> = self.pool.install(|| {
            ordered
                .into_par_iter()
                .map(|r| {
                    let (temperature, iterations) = budgets[r.id()];
                    let hit = r.execute_round(temperature, iterations);
                    (r.id(), hit, r.cost(), r.round_time())
                })
                .collect()
        });

        for (id, hit, cost, time) in results {
            self.replica_is_opt[id] = hit;
            self.replica_cost[id] = cost;
            self.round_times[id] = time;
        }

        if let Some(id) = self.replica_is_opt.iter().position(|&hit| hit) {
            return RoundOutcome::Success(id);
        }

        for (c, controller) in self.controllers.iter_mut().enumerate() {
            let range = c * rpc..(c + 1) * rpc;
            controller.sync(&self.replica_cost[range.clone()], &self.round_times[range]);
        }

        let curr_cost_min = self.cost_min();
        if curr_cost_min < self.prev_cost_min {
            self.prev_cost_min = curr_cost_min;
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }

        debug!(
            round = self.current_round,
            cost_min = curr_cost_min,
            stagnation = self.stagnation,
            "round synced"
        );

        if self.stagnation >= self.config.stagnation_limit {
            return RoundOutcome::Stagnated(self.cost_min_id());
        }

        RoundOutcome::Continue
    }

    pub fn cost_min(&self) -> f64 {
        self.replicas
            .iter()
            .map(|r| r.cost_min())
            .fold(f64::INFINITY, f64::min)
    }

    /// Lowest replica id among those holding the minimum best cost.
    pub fn cost_min_id(&self) -> usize {
        let mut r_min = 0;
        let mut cost_min = f64::INFINITY;
        for (i, r) in self.replicas.iter().enumerate() {
            if r.cost_min() < cost_min {
                cost_min = r.cost_min();
                r_min = i;
            }
        }
        r_min
    }

    pub fn cost_min_state(&self) -> Vec<usize> {
        self.replicas[self.cost_min_id()].cost_min_state().to_vec()
    }

    /// Seconds spent in the last `solve` call.
    pub fn run_time(&self) -> f64 {
        self.run_time.as_secs_f64()
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn stagnation_counter(&self) -> usize {
        self.stagnation
    }

    pub fn iterations_per_round(&self) -> usize {
        self.iterations_per_round
    }

    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn replicas(&self) -> &[Replica<'p>] {
        &self.replicas
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Costs reported by each replica at the end of the last round.
    pub fn replica_costs(&self) -> &[f64] {
        &self.replica_cost
    }
}
