//! Scripted model gateway for offline runs and tests.
//!
//! Replays queued responses in order: plan prompts draw from one queue,
//! step-outcome prompts from another. A drained queue is a fatal
//! [`GatewayError::Exhausted`].

use agentloop_application::ports::model_gateway::{
    GatewayError, ModelGateway, PromptContext, PromptPurpose,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Error loading a script file.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk script format.
///
/// Entries may be strings (sent verbatim) or JSON values (serialized):
/// ```json
/// { "plans": [ { "steps": [ ... ] } ], "outcomes": [ { "success": true } ] }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Script {
    plans: Vec<serde_json::Value>,
    outcomes: Vec<serde_json::Value>,
}

fn response_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Default)]
struct Queues {
    plans: VecDeque<String>,
    outcomes: VecDeque<String>,
}

/// Gateway that answers from pre-recorded responses.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    queues: Mutex<Queues>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(self, response: impl Into<String>) -> Self {
        self.push(PromptPurpose::Plan, response.into());
        self
    }

    pub fn with_outcome(self, response: impl Into<String>) -> Self {
        self.push(PromptPurpose::StepOutcome, response.into());
        self
    }

    /// Load a script file (see [`Script`] format).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| ScriptError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let script: Script = serde_json::from_str(contents)?;
        Ok(Self {
            queues: Mutex::new(Queues {
                plans: script.plans.into_iter().map(response_text).collect(),
                outcomes: script.outcomes.into_iter().map(response_text).collect(),
            }),
        })
    }

    /// Queue a response for the given purpose.
    pub fn push(&self, purpose: PromptPurpose, response: String) {
        let mut queues = self.lock();
        match purpose {
            PromptPurpose::Plan => queues.plans.push_back(response),
            PromptPurpose::StepOutcome => queues.outcomes.push_back(response),
        }
    }

    /// Responses left for the given purpose.
    pub fn remaining(&self, purpose: PromptPurpose) -> usize {
        let queues = self.lock();
        match purpose {
            PromptPurpose::Plan => queues.plans.len(),
            PromptPurpose::StepOutcome => queues.outcomes.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Queues> {
        match self.queues.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, prompt: &PromptContext) -> Result<String, GatewayError> {
        let mut queues = self.lock();
        let next = match prompt.purpose {
            PromptPurpose::Plan => queues.plans.pop_front(),
            PromptPurpose::StepOutcome => queues.outcomes.pop_front(),
        };
        debug!(purpose = prompt.purpose.as_str(), found = next.is_some(), "Scripted response");
        next.ok_or_else(|| GatewayError::Exhausted(prompt.purpose.as_str().to_string()))
    }
}
