use crate::error::{SolverError, SolverResult};
use crate::solver::ladder::{self, LadderMode};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[arg(long, default_value_t = 1_000_000)]
    pub round_limit: usize,

    #[arg(long, default_value_t = 32)]
    pub replicas_per_controller: usize,
    #[arg(long, default_value_t = 1)]
    pub num_controllers: usize,
    #[arg(long, default_value_t = 32)]
    pub cores_per_controller: usize,

    #[arg(long, default_value_t = 10.0)]
    pub t_max: f64,
    #[arg(long, default_value_t = 0.01)]
    pub t_min: f64,
    #[arg(long, value_enum, default_value_t = LadderMode::ExponentialTemperature)]
    #[serde(deserialize_with = "ladder::deserialize_mode")]
    pub ladder_mode: LadderMode,

    /// Wall-clock seconds, checked between rounds.
    #[arg(long, default_value_t = 60.0)]
    pub time_limit: f64,

    /// Rounds without a new global best before the search gives up.
    #[arg(long, default_value_t = 10_000)]
    pub stagnation_limit: usize,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            round_limit: 1_000_000,
            replicas_per_controller: 32,
            num_controllers: 1,
            cores_per_controller: 32,
            t_max: 10.0,
            t_min: 0.01,
            ladder_mode: LadderMode::ExponentialTemperature,
            time_limit: 60.0,
            stagnation_limit: 10_000,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SolverResult<Self> {
        let content = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&content)?;
        Ok(cfg)
    }

    pub fn num_total_replicas(&self) -> usize {
        self.replicas_per_controller * self.num_controllers
    }

    pub fn num_total_cores(&self) -> usize {
        self.cores_per_controller * self.num_controllers
    }

    pub fn time_limit_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.round_limit == 0 {
            return Err(SolverError::Config("round_limit must be at least 1".into()));
        }
        if self.replicas_per_controller == 0 {
            return Err(SolverError::Config(
                "replicas_per_controller must be at least 1".into(),
            ));
        }
        if self.num_controllers == 0 {
            return Err(SolverError::Config("num_controllers must be at least 1".into()));
        }
        if self.cores_per_controller == 0 {
            return Err(SolverError::Config(
                "cores_per_controller must be at least 1".into(),
            ));
        }
        if self.stagnation_limit == 0 {
            return Err(SolverError::Config(
                "stagnation_limit must be at least 1".into(),
            ));
        }
        if !self.time_limit.is_finite() || self.time_limit <= 0.0 {
            return Err(SolverError::Config(format!(
                "time_limit must be a positive number of seconds, got {}",
                self.time_limit
            )));
        }
        ladder::build_ladder(
            self.replicas_per_controller,
            self.t_min,
            self.t_max,
            self.ladder_mode,
        )?;
        Ok(())
    }

    /// Copies every field the user typed on the command line over the
    /// values loaded from a file.
    pub fn merge_from_cli(&mut self, cli: &EngineConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(round_limit);
        update_if_present!(replicas_per_controller);
        update_if_present!(num_controllers);
        update_if_present!(cores_per_controller);
        update_if_present!(t_max);
        update_if_present!(t_min);
        update_if_present!(ladder_mode);
        update_if_present!(time_limit);
        update_if_present!(stagnation_limit);
        update_if_present!(seed);
    }
}
