use crate::config::EngineConfig;
use crate::error::{SolverError, SolverResult};
use crate::loader;
use crate::model::Problem;
use crate::quality::{self, EdgeDensities};
use crate::solver::{Engine, NoProgress, ProgressCallback, SearchStatus};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs for a k-medoids run read from disk.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub distances: PathBuf,
    pub num_k: usize,
    pub d_scale: f64,
    pub b_scale: f64,
    pub target_cost: Option<f64>,
    pub adjacency: Option<PathBuf>,
    pub delimiter: u8,
    /// Initial active set handed to every replica.
    pub warm_start: Option<Vec<usize>>,
}

impl SolveRequest {
    pub fn new<P: Into<PathBuf>>(distances: P, num_k: usize) -> Self {
        Self {
            distances: distances.into(),
            num_k,
            d_scale: 1.0,
            b_scale: 1.0,
            target_cost: None,
            adjacency: None,
            delimiter: b',',
            warm_start: None,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    pub status: SearchStatus,
    pub solved: bool,
    pub num_vars: usize,
    pub num_k: usize,
    pub cost_min: f64,
    pub run_time: f64,
    pub rounds: usize,
    /// Best active set, in the order its positions are used by `assignments`.
    pub medoids: Vec<usize>,
    pub assignments: Vec<usize>,
    pub cluster_sizes: Vec<usize>,
    pub densities: Option<EdgeDensities>,
    /// Per controller, accepted/attempted swaps for each neighbouring slot pair.
    pub swap_acceptance: Vec<Vec<f64>>,
}

impl SolveReport {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> SolverResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Service: read a distance matrix and build the k-medoids problem.
pub fn build_problem(request: &SolveRequest) -> SolverResult<Problem> {
    let matrix = loader::load_matrix(&request.distances, request.delimiter)?;
    Problem::k_medoids(
        matrix.values,
        matrix.size,
        request.num_k,
        request.d_scale,
        request.b_scale,
        request.target_cost,
    )
}

/// Service: run the engine on an already built problem and summarize the
/// best state. `adjacency` enables the edge-density metrics; `warm_start`
/// seeds every replica with a known active set.
pub fn solve_problem<CB: ProgressCallback>(
    problem: &Problem,
    config: EngineConfig,
    adjacency: Option<&[u8]>,
    warm_start: Option<&[usize]>,
    callback: &CB,
) -> SolverResult<SolveReport> {
    let mut engine = Engine::new(problem, config)?;
    if let Some(items) = warm_start {
        engine.warm_start(items)?;
    }
    let solved = engine.solve_with(callback);

    let medoids = engine.cost_min_state();
    let assignments = problem.generate_assignments(&medoids);

    let mut cluster_sizes = vec![0; problem.num_k()];
    for &a in &assignments {
        cluster_sizes[a] += 1;
    }

    let densities = match adjacency {
        Some(adj) => Some(quality::edge_densities(&assignments, problem.num_k(), adj)?),
        None => None,
    };

    let swap_acceptance = engine
        .controllers()
        .iter()
        .map(|c| c.swap_acceptance_rates())
        .collect();

    Ok(SolveReport {
        status: engine.status(),
        solved,
        num_vars: problem.num_vars(),
        num_k: problem.num_k(),
        cost_min: engine.cost_min(),
        run_time: engine.run_time(),
        rounds: engine.current_round(),
        medoids,
        assignments,
        cluster_sizes,
        densities,
        swap_acceptance,
    })
}

/// Service: load, solve and summarize in one call.
pub fn solve_from_files(request: &SolveRequest, config: EngineConfig) -> SolverResult<SolveReport> {
    solve_from_files_with(request, config, &NoProgress)
}

pub fn solve_from_files_with<CB: ProgressCallback>(
    request: &SolveRequest,
    config: EngineConfig,
    callback: &CB,
) -> SolverResult<SolveReport> {
    let problem = build_problem(request)?;
    info!(
        "Loaded {} items from {}, selecting k={}",
        problem.num_vars(),
        request.distances.display(),
        problem.num_k()
    );

    let adjacency = match &request.adjacency {
        Some(path) => {
            let adj = loader::load_adjacency(path, request.delimiter)?;
            if adj.size != problem.num_vars() {
                return Err(SolverError::Validation(format!(
                    "Adjacency matrix is {}x{} but the distance matrix is {}x{}",
                    adj.size,
                    adj.size,
                    problem.num_vars(),
                    problem.num_vars()
                )));
            }
            Some(adj.values)
        }
        None => None,
    };

    solve_problem(
        &problem,
        config,
        adjacency.as_deref(),
        request.warm_start.as_deref(),
        callback,
    )
}
