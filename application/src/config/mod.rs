//! Application-level configuration.
//!
//! - [`LoopParams`] - orchestration loop control (approval, concurrency, retries)

pub mod loop_params;

pub use loop_params::LoopParams;
