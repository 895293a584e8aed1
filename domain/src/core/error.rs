//! Domain error types

use thiserror::Error;

/// Domain-level validation errors.
///
/// Raised before any side effect takes place: a public operation that
/// returns one of these has not partially applied anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Goal must not be empty")]
    EmptyGoal,

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("Iteration budget must be positive")]
    InvalidIterationBudget,

    #[error("Plan step id must not be empty")]
    EmptyStepId,

    #[error("Duplicate step id in plan: {0}")]
    DuplicateStepId(String),

    #[error("Step {step} depends on unknown step {dependency}")]
    DanglingDependency { step: String, dependency: String },

    #[error("Dependency cycle detected involving steps: {0}")]
    DependencyCycle(String),

    #[error("Memory key must not be empty")]
    EmptyMemoryKey,

    #[error("Memory expiry must be in the future")]
    ExpiryInPast,

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
