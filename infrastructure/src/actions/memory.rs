//! Memory actions: let plans read and write the memory store.
//!
//! - `memory_remember` `{ key, value, tags?, ttl_secs? }`
//! - `memory_recall` `{ key }` for an exact lookup, or `{ query?, limit? }` to search
//! - `memory_recall_by_tags` `{ tags, limit? }`

use agentloop_application::ports::action_runner::{
    ActionContext, ActionError, ActionOutput, ActionRunner,
};
use agentloop_application::ports::memory_store::{MemoryError, MemoryStore};
use agentloop_domain::{Memory, MemoryQuery, PlanStep, SetOptions};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub const MEMORY_REMEMBER: &str = "memory_remember";
pub const MEMORY_RECALL: &str = "memory_recall";
pub const MEMORY_RECALL_BY_TAGS: &str = "memory_recall_by_tags";

/// Names of all actions served by [`MemoryActionRunner`].
pub const MEMORY_ACTIONS: &[&str] = &[MEMORY_REMEMBER, MEMORY_RECALL, MEMORY_RECALL_BY_TAGS];

const DEFAULT_RECALL_LIMIT: usize = 10;

pub struct MemoryActionRunner {
    store: Arc<dyn MemoryStore>,
}

impl MemoryActionRunner {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    async fn remember(&self, step: &PlanStep) -> Result<ActionOutput, ActionError> {
        let input = &step.action.input;
        let key = required_str(step, "key")?;
        let value = input.get("value").cloned().ok_or_else(|| invalid(step, "missing 'value'"))?;

        let mut options = SetOptions::default().with_tags(string_list(input.get("tags")));
        if let Some(ttl) = input.get("ttl_secs").and_then(|v| v.as_i64()) {
            options = options.expires_in(chrono::Duration::seconds(ttl));
        }

        let memory = self
            .store
            .set(key, value, options)
            .await
            .map_err(|e| store_error(step, e))?;
        Ok(
            ActionOutput::new(json!({ "id": memory.id.as_str(), "key": memory.key }))
                .with_observation(format!("Remembered '{}'", memory.key)),
        )
    }

    async fn recall(&self, step: &PlanStep) -> Result<ActionOutput, ActionError> {
        let input = &step.action.input;

        if let Some(key) = step.action.input_str("key") {
            let found = self.store.get(key).await.map_err(|e| store_error(step, e))?;
            let observation = match &found {
                Some(memory) => format!("Recalled '{}': {}", key, memory.value),
                None => format!("Nothing remembered under '{}'", key),
            };
            let value = found.map(|m| m.value).unwrap_or(serde_json::Value::Null);
            return Ok(ActionOutput::new(value).with_observation(observation));
        }

        let mut query = MemoryQuery::new().limit(limit(input));
        if let Some(text) = step.action.input_str("query") {
            query = query.text(text);
        }
        self.search(step, &query).await
    }

    async fn recall_by_tags(&self, step: &PlanStep) -> Result<ActionOutput, ActionError> {
        let tags = string_list(step.action.input.get("tags"));
        if tags.is_empty() {
            return Err(invalid(step, "missing 'tags'"));
        }
        let query = tags
            .into_iter()
            .fold(MemoryQuery::new(), |q, tag| q.tag(tag))
            .limit(limit(&step.action.input));
        self.search(step, &query).await
    }

    async fn search(&self, step: &PlanStep, query: &MemoryQuery) -> Result<ActionOutput, ActionError> {
        let found = self.store.search(query).await.map_err(|e| store_error(step, e))?;
        let observation = format!(
            "Recalled {} memor{}{}",
            found.len(),
            if found.len() == 1 { "y" } else { "ies" },
            summarize(&found)
        );
        let entries: Vec<serde_json::Value> = found
            .into_iter()
            .map(|m| json!({ "key": m.key, "value": m.value, "tags": m.metadata.tags }))
            .collect();
        Ok(ActionOutput::new(json!(entries)).with_observation(observation))
    }
}

fn summarize(found: &[Memory]) -> String {
    if found.is_empty() {
        return String::new();
    }
    let keys: Vec<&str> = found.iter().map(|m| m.key.as_str()).collect();
    format!(": {}", keys.join(", "))
}

fn limit(input: &serde_json::Value) -> usize {
    input
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_RECALL_LIMIT)
}

fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn required_str<'a>(step: &'a PlanStep, key: &str) -> Result<&'a str, ActionError> {
    step.action
        .input_str(key)
        .ok_or_else(|| invalid(step, &format!("missing '{}'", key)))
}

fn invalid(step: &PlanStep, reason: &str) -> ActionError {
    ActionError::InvalidInput {
        action: step.action.name.clone(),
        reason: reason.to_string(),
    }
}

fn store_error(step: &PlanStep, e: MemoryError) -> ActionError {
    match e {
        MemoryError::Validation(e) => invalid(step, &e.to_string()),
        other => ActionError::Failed(other.to_string()),
    }
}

#[async_trait]
impl ActionRunner for MemoryActionRunner {
    async fn run(&self, step: &PlanStep, _ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        match step.action.name.as_str() {
            MEMORY_REMEMBER => self.remember(step).await,
            MEMORY_RECALL => self.recall(step).await,
            MEMORY_RECALL_BY_TAGS => self.recall_by_tags(step).await,
            other => Err(ActionError::UnknownAction(other.to_string())),
        }
    }
}
