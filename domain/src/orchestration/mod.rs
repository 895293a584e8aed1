//! Orchestration loop state.

pub mod loop_state;

pub use loop_state::{LoopPhase, LoopState};
