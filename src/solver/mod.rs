pub mod controller;
pub mod engine;
pub mod ladder;
pub mod placement;
pub mod replica;

pub use controller::Controller;
pub use engine::{Engine, NoProgress, ProgressCallback, RoundOutcome, RoundReport, SearchStatus};
pub use ladder::{build_ladder, Ladder, LadderMode};
pub use placement::Placement;
pub use replica::{Replica, RoundStats};
