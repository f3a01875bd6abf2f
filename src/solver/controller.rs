use crate::error::SolverResult;
use crate::solver::ladder::{self, LadderMode};
use fastrand::Rng;
use tracing::warn;

/// Temperature ladder plus the replica <-> slot assignment for one group of
/// replicas. Slot 0 is the coldest. Replica ids are local to the controller.
pub struct Controller {
    mode: LadderMode,
    temperatures: Vec<f64>,
    betas: Vec<f64>,

    /// slot -> replica holding that temperature
    slot_to_replica: Vec<usize>,
    /// replica -> slot it currently occupies
    replica_to_slot: Vec<usize>,

    base_iterations: usize,
    scaled_iterations: Vec<usize>,

    swap_attempts: Vec<u64>,
    swap_accepts: Vec<u64>,

    rng: Rng,
}

impl Controller {
    pub fn new(
        num_replicas: usize,
        t_max: f64,
        t_min: f64,
        mode: LadderMode,
        base_iterations: usize,
        seed: Option<u64>,
    ) -> SolverResult<Self> {
        let ladder = ladder::build_ladder(num_replicas, t_min, t_max, mode)?;
        let rng = if let Some(s) = seed {
            Rng::with_seed(s)
        } else {
            Rng::new()
        };
        let pairs = num_replicas.saturating_sub(1);

        Ok(Self {
            mode,
            temperatures: ladder.temperatures,
            betas: ladder.betas,
            slot_to_replica: (0..num_replicas).collect(),
            replica_to_slot: (0..num_replicas).collect(),
            base_iterations,
            scaled_iterations: vec![base_iterations; num_replicas],
            swap_attempts: vec![0; pairs],
            swap_accepts: vec![0; pairs],
            rng,
        })
    }

    pub fn num_replicas(&self) -> usize {
        self.temperatures.len()
    }

    pub fn mode(&self) -> LadderMode {
        self.mode
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    pub fn base_iterations(&self) -> usize {
        self.base_iterations
    }

    pub fn scaled_iterations(&self) -> &[usize] {
        &self.scaled_iterations
    }

    pub fn slot_of(&self, replica: usize) -> usize {
        self.replica_to_slot[replica]
    }

    pub fn replica_at(&self, slot: usize) -> usize {
        self.slot_to_replica[slot]
    }

    #[inline(always)]
    pub fn replica_temperature(&self, replica: usize) -> f64 {
        self.temperatures[self.replica_to_slot[replica]]
    }

    #[inline(always)]
    pub fn replica_iterations(&self, replica: usize) -> usize {
        self.scaled_iterations[self.replica_to_slot[replica]]
    }

    /// Replica-exchange Metropolis test, accepted with probability
    /// `min(1, exp((beta1 - beta2) * (cost1 - cost2)))`.
    pub fn check_swap(&mut self, cost1: f64, cost2: f64, beta1: f64, beta2: f64) -> bool {
        let accept = ((beta1 - beta2) * (cost1 - cost2)).exp();
        if accept >= 1.0 {
            true
        } else {
            accept > self.rng.f64()
        }
    }

    /// One coldest-to-hottest sweep over neighbouring slots.
    /// `costs` is indexed by replica.
    pub fn exchange_temperatures(&mut self, costs: &[f64]) {
        for i in 0..self.num_replicas().saturating_sub(1) {
            let id1 = self.slot_to_replica[i];
            let id2 = self.slot_to_replica[i + 1];

            self.swap_attempts[i] += 1;
            if self.check_swap(costs[id1], costs[id2], self.betas[i], self.betas[i + 1]) {
                self.swap_accepts[i] += 1;
                self.slot_to_replica[i] = id2;
                self.slot_to_replica[i + 1] = id1;
                self.replica_to_slot[id2] = i;
                self.replica_to_slot[id1] = i + 1;
            }
        }
    }

    /// Rescales each slot's iteration budget so every replica covers the
    /// same wall-clock time as the fastest one. `round_times` is indexed by
    /// replica and measured against the budgets handed out last round.
    pub fn update_load_balance_scaling_factors(&mut self, round_times: &[f64]) {
        let time_per_iteration: Vec<f64> = (0..self.num_replicas())
            .map(|slot| {
                let id = self.slot_to_replica[slot];
                round_times[id] / self.scaled_iterations[slot] as f64
            })
            .collect();

        if time_per_iteration
            .iter()
            .any(|t| !t.is_finite() || *t <= 0.0)
        {
            warn!("Round timings unusable for load balancing; keeping current budgets");
            return;
        }

        let min_time_per_iteration = time_per_iteration
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        for (scaled, tpi) in self.scaled_iterations.iter_mut().zip(&time_per_iteration) {
            let budget = (min_time_per_iteration / tpi) * self.base_iterations as f64;
            *scaled = (budget as usize).max(1);
        }
    }

    pub fn sync(&mut self, costs: &[f64], round_times: &[f64]) {
        self.update_load_balance_scaling_factors(round_times);
        self.exchange_temperatures(costs);
        debug_assert!(self.permutations_consistent());
    }

    /// Accepted / attempted swaps for each neighbouring slot pair (i, i+1).
    pub fn swap_acceptance_rates(&self) -> Vec<f64> {
        self.swap_attempts
            .iter()
            .zip(&self.swap_accepts)
            .map(|(&tries, &hits)| {
                if tries > 0 {
                    hits as f64 / tries as f64
                } else {
                    0.0
                }
            })
            .collect()
    }

    pub fn permutations_consistent(&self) -> bool {
        self.slot_to_replica.len() == self.replica_to_slot.len()
            && self
                .slot_to_replica
                .iter()
                .enumerate()
                .all(|(slot, &r)| r < self.replica_to_slot.len() && self.replica_to_slot[r] == slot)
    }
}
