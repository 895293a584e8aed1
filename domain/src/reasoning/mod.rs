//! Reasoning strategy domain
//!
//! Configuration selecting iterative, batch, or adaptive execution, and the
//! heuristic that resolves adaptive mode for a particular goal.

pub mod complexity;
pub mod strategy;

pub use complexity::{ComplexityAssessment, ExecutionStyle};
pub use strategy::{DEFAULT_MAX_ITERATIONS, ReasoningMode, ReasoningStrategy, StrategyOverride};
