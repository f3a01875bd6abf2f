use crate::reports;
use clap::Args;
use medoid_pt::solver::ladder::{self, LadderMode};
use medoid_pt::SolverResult;

#[derive(Args, Debug, Clone)]
pub struct LadderArgs {
    #[arg(short, long, default_value_t = 32)]
    pub replicas: usize,

    #[arg(long, default_value_t = 0.01)]
    pub t_min: f64,

    #[arg(long, default_value_t = 10.0)]
    pub t_max: f64,

    #[arg(long, value_enum, default_value_t = LadderMode::ExponentialTemperature)]
    pub ladder_mode: LadderMode,
}

pub fn run(args: &LadderArgs) -> SolverResult<()> {
    let ladder = ladder::build_ladder(args.replicas, args.t_min, args.t_max, args.ladder_mode)?;
    reports::print_ladder(args.ladder_mode, &ladder);
    Ok(())
}
