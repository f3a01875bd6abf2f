pub mod ladder;
pub mod solve;
