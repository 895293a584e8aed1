//! Action registry
//!
//! The [`ActionRegistry`] routes each step to the runner registered for its
//! action name. Names without a registered runner go to the fallback, if any.
//!
//! ```ignore
//! let registry = ActionRegistry::new()
//!     .register([RUN_COMMAND], Arc::new(CommandActionRunner::new(config)))
//!     .register(MEMORY_ACTIONS.iter().copied(), Arc::new(MemoryActionRunner::new(store)))
//!     .with_fallback(Arc::new(ModelActionRunner::new(gateway)));
//! ```

use agentloop_application::ports::action_runner::{
    ActionContext, ActionError, ActionOutput, ActionRunner,
};
use agentloop_domain::{PlanStep, StepAction};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Default)]
pub struct ActionRegistry {
    runners: HashMap<String, Arc<dyn ActionRunner>>,
    fallback: Option<Arc<dyn ActionRunner>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every name in `names` to `runner`. Later registrations win.
    pub fn register<I, S>(mut self, names: I, runner: Arc<dyn ActionRunner>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.runners.insert(name.into(), runner.clone());
        }
        self
    }

    pub fn with_fallback(mut self, runner: Arc<dyn ActionRunner>) -> Self {
        self.fallback = Some(runner);
        self
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.runners.contains_key(name)
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.runners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn resolve(&self, name: &str) -> Option<&Arc<dyn ActionRunner>> {
        let runner = self.runners.get(name).or(self.fallback.as_ref());
        trace!(action = name, routed = runner.is_some(), "Resolved action runner");
        runner
    }
}

#[async_trait]
impl ActionRunner for ActionRegistry {
    async fn run(&self, step: &PlanStep, ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        match self.resolve(&step.action.name) {
            Some(runner) => runner.run(step, ctx).await,
            None => Err(ActionError::UnknownAction(step.action.name.clone())),
        }
    }

    fn requires_approval(&self, action: &StepAction) -> bool {
        self.resolve(&action.name)
            .is_some_and(|runner| runner.requires_approval(action))
    }

    async fn verify(&self, step: &PlanStep, output: &ActionOutput) -> Result<(), String> {
        match self.resolve(&step.action.name) {
            Some(runner) => runner.verify(step, output).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Named {
        name: &'static str,
        risky: bool,
    }

    #[async_trait]
    impl ActionRunner for Named {
        async fn run(&self, _step: &PlanStep, _ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
            Ok(ActionOutput::new(json!(self.name)))
        }

        fn requires_approval(&self, _action: &StepAction) -> bool {
            self.risky
        }

        async fn verify(&self, _step: &PlanStep, _output: &ActionOutput) -> Result<(), String> {
            Err(format!("{} verified", self.name))
        }
    }

    fn ctx() -> ActionContext<'static> {
        ActionContext {
            goal: "g",
            observations: &[],
        }
    }

    fn step(action: &str) -> PlanStep {
        PlanStep::new("1", "d", StepAction::new(action))
    }

    #[tokio::test]
    async fn test_routes_by_name_then_fallback() {
        let registry = ActionRegistry::new()
            .register(["a", "b"], Arc::new(Named { name: "ab", risky: true }))
            .with_fallback(Arc::new(Named { name: "fallback", risky: false }));

        assert_eq!(registry.run(&step("b"), ctx()).await.unwrap().output, json!("ab"));
        assert_eq!(registry.run(&step("zzz"), ctx()).await.unwrap().output, json!("fallback"));
        assert!(registry.requires_approval(&StepAction::new("a")));
        assert!(!registry.requires_approval(&StepAction::new("zzz")));

        let output = ActionOutput::new(json!(null));
        assert_eq!(registry.verify(&step("a"), &output).await, Err("ab verified".to_string()));
        assert_eq!(registry.action_names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unknown_action_without_fallback() {
        let registry = ActionRegistry::new().register(["a"], Arc::new(Named { name: "a", risky: false }));
        assert!(registry.has_action("a"));
        assert_eq!(
            registry.run(&step("b"), ctx()).await,
            Err(ActionError::UnknownAction("b".to_string()))
        );
        assert!(registry.verify(&step("b"), &ActionOutput::new(json!(1))).await.is_ok());
    }
}
