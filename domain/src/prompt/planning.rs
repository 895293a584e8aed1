//! Prompt templates for the planning phase

use crate::plan::PlanStep;
use crate::reasoning::ExecutionStyle;

const PLAN_SCHEMA: &str = r#"```plan
{
  "steps": [
    {
      "id": "unique-step-id",
      "description": "What this step does",
      "action": {"name": "action_name", "input": {}},
      "dependencies": ["ids-of-steps-this-needs"],
      "expected_outcome": "What should be true after this step",
      "requires_approval": false
    }
  ],
  "concludes_goal": false,
  "is_complete": false
}
```"#;

/// Templates for planner prompts
pub struct PlanningPromptTemplate;

impl PlanningPromptTemplate {
    /// System prompt for the planner, specialised per execution style
    pub fn system(style: ExecutionStyle) -> String {
        let mode_rules = match style {
            ExecutionStyle::Iterative => {
                r#"## Mode: Iterative

- Plan only the NEXT step (or the next few independent steps)
- Use the observations from earlier steps to decide what comes next
- Never reuse the id of a step that already ran
- Set "concludes_goal" to true when these steps finish the goal
- When the observations show the goal is already achieved, return
  an empty "steps" array with "is_complete": true"#
            }
            ExecutionStyle::Batch => {
                r#"## Mode: Batch

- Plan ALL steps needed to accomplish the goal in one pass
- No intermediate observations will be available while the plan runs
- Every dependency id must refer to a step in this plan
- Steps without dependencies between them may run in parallel"#
            }
        };

        format!(
            r#"You are the planner of an autonomous agent.
Your job is to break a goal into concrete, executable steps.

## Output Format

Respond with a single fenced block in exactly this format:

{schema}

Mark a step with "requires_approval": true when it changes external state
(writes files, runs destructive commands, sends messages).

{mode_rules}
"#,
            schema = PLAN_SCHEMA,
            mode_rules = mode_rules
        )
    }

    /// User prompt carrying the goal and everything learned so far
    pub fn user(
        goal: &str,
        observations: &[String],
        previous_steps: &[PlanStep],
        style: ExecutionStyle,
    ) -> String {
        let mut prompt = format!("## Goal\n\n{}\n", goal);

        if !previous_steps.is_empty() {
            prompt.push_str("\n## Completed Steps\n\n");
            for (i, step) in previous_steps.iter().enumerate() {
                prompt.push_str(&format!("{}. {} ({})\n", i + 1, step.description, step.id));
            }
        }

        if !observations.is_empty() {
            prompt.push_str("\n## Observations\n\n");
            for (i, obs) in observations.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, obs));
            }
        }

        prompt.push_str(match style {
            ExecutionStyle::Iterative => "\nPlan the NEXT step to take based on the observations.",
            ExecutionStyle::Batch => {
                "\nCreate a COMPLETE execution plan with all steps needed to accomplish the goal."
            }
        });
        prompt
    }

    /// Follow-up sent when the previous answer could not be parsed
    pub fn retry(reason: &str) -> String {
        format!(
            "Your previous answer could not be used: {}\n\nRespond again with only the fenced plan block.",
            reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::StepAction;

    #[test]
    fn test_system_prompt_differs_by_style() {
        let iterative = PlanningPromptTemplate::system(ExecutionStyle::Iterative);
        let batch = PlanningPromptTemplate::system(ExecutionStyle::Batch);
        assert!(iterative.contains("Mode: Iterative"));
        assert!(batch.contains("Mode: Batch"));
        assert!(batch.contains("\"steps\""));
    }

    #[test]
    fn test_user_prompt_lists_history() {
        let steps = vec![PlanStep::new("fetch", "Fetch data", StepAction::new("http_get"))];
        let observations = vec!["[fetch] succeeded: 200 OK".to_string()];
        let prompt = PlanningPromptTemplate::user(
            "Summarise the data",
            &observations,
            &steps,
            ExecutionStyle::Iterative,
        );

        assert!(prompt.contains("## Goal\n\nSummarise the data"));
        assert!(prompt.contains("1. Fetch data (fetch)"));
        assert!(prompt.contains("1. [fetch] succeeded: 200 OK"));
        assert!(prompt.ends_with("based on the observations."));
    }

    #[test]
    fn test_user_prompt_without_history() {
        let prompt = PlanningPromptTemplate::user("Do it", &[], &[], ExecutionStyle::Batch);
        assert!(!prompt.contains("Observations"));
        assert!(prompt.contains("COMPLETE execution plan"));
    }
}
