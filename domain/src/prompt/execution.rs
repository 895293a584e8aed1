//! Prompt templates for model-executed steps

use crate::plan::PlanStep;

/// Templates for asking a model to carry out (or simulate) one step
pub struct ExecutionPromptTemplate;

impl ExecutionPromptTemplate {
    pub fn system() -> String {
        r#"You are the executor of an autonomous agent.
Carry out the given step and report what happened.

Respond with a single JSON object:

```json
{
  "success": true,
  "output": "result of the step (any JSON value)",
  "observation": "one sentence on what you learned",
  "error": null
}
```

Set "success" to false and fill "error" when the step cannot be done."#
            .to_string()
    }

    pub fn user(goal: &str, step: &PlanStep, observations: &[String]) -> String {
        let mut prompt = format!(
            "## Goal\n\n{}\n\n## Step {}\n\n{}\n\nAction: {}\nInput: {}\n",
            goal, step.id, step.description, step.action.name, step.action.input
        );
        if !step.expected_outcome.is_empty() {
            prompt.push_str(&format!("Expected outcome: {}\n", step.expected_outcome));
        }
        if !observations.is_empty() {
            prompt.push_str("\n## Observations So Far\n\n");
            for obs in observations {
                prompt.push_str(&format!("- {}\n", obs));
            }
        }
        prompt
    }
}
