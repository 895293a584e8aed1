//! Step execution results.

pub mod result;

pub use result::{NextStep, StepDisposition, StepOutcome, StepResult};
