use crate::reports;
use clap::{ArgMatches, Args};
use medoid_pt::api::{self, SolveRequest};
use medoid_pt::solver::{ProgressCallback, RoundReport};
use medoid_pt::{EngineConfig, SolverError, SolverResult};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub engine: EngineConfig,

    /// Square distance matrix, one row per line
    #[arg(short, long)]
    pub distances: PathBuf,

    #[arg(short = 'k', long)]
    pub num_k: usize,

    #[arg(long, default_value_t = 1.0)]
    pub d_scale: f64,

    #[arg(long, default_value_t = 1.0)]
    pub b_scale: f64,

    /// Stop as soon as any replica reaches this cost
    #[arg(long)]
    pub target: Option<f64>,

    /// 0/1 adjacency matrix used for the edge-density report
    #[arg(long)]
    pub adjacency: Option<PathBuf>,

    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Comma-separated medoid indices to start every replica from
    #[arg(long, value_delimiter = ',')]
    pub warm_start: Option<Vec<usize>>,

    /// JSON engine configuration; flags given on the command line win
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the full result as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    pub report_every: usize,
}

struct LogProgress {
    every: usize,
}

impl ProgressCallback for LogProgress {
    fn on_round(&self, report: &RoundReport) {
        if self.every > 0 && report.round % self.every == 0 {
            info!(
                "Round {:>8} | best {:.6} | stagnant {:>6} | {:.1}s",
                report.round,
                report.cost_min,
                report.stagnation,
                report.elapsed.as_secs_f64()
            );
        }
    }
}

pub fn run(args: &SolveArgs, matches: Option<&ArgMatches>) -> SolverResult<()> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading engine config from: {}", path.display());
            let mut config = EngineConfig::load_from_file(path)?;
            if let Some(m) = matches {
                config.merge_from_cli(&args.engine, m);
            }
            config
        }
        None => args.engine.clone(),
    };

    if !args.delimiter.is_ascii() {
        return Err(SolverError::Config(format!(
            "Delimiter '{}' must be a single ASCII character",
            args.delimiter
        )));
    }

    let request = SolveRequest {
        distances: args.distances.clone(),
        num_k: args.num_k,
        d_scale: args.d_scale,
        b_scale: args.b_scale,
        target_cost: args.target,
        adjacency: args.adjacency.clone(),
        delimiter: args.delimiter as u8,
        warm_start: args.warm_start.clone(),
    };

    let progress = LogProgress {
        every: args.report_every,
    };
    let report = api::solve_from_files_with(&request, config, &progress)?;

    reports::print_solve_report(&report);

    if let Some(path) = &args.json {
        report.write_json(path)?;
        info!("Wrote result to {}", path.display());
    }

    Ok(())
}
