//! Plan value objects - identifiers and action descriptors.

use serde::{Deserialize, Serialize};

/// Identifier of a step, unique within one plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for StepId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque description of what a step does.
///
/// The orchestration core never interprets `name` or `input`; they are handed
/// to whichever action runner is plugged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAction {
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
    /// Whether a human has to approve this action before it runs
    #[serde(default)]
    pub requires_approval: bool,
}

impl StepAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: serde_json::Value::Null,
            requires_approval: false,
        }
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    /// Look up a string field of an object input.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }
}
