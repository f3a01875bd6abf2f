pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod quality;
pub mod solver;

pub use config::EngineConfig;
pub use error::{SolverError, SolverResult};
pub use model::Problem;
pub use solver::{Engine, LadderMode, SearchStatus};
