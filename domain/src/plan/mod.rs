//! Plans: dependency-annotated step lists and their parsing.

pub mod entities;
pub mod parser;
pub mod value_objects;

pub use entities::{Plan, PlanStep};
pub use parser::{parse_plan, parse_plan_json};
pub use value_objects::{StepAction, StepId};
