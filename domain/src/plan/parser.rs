//! Plan parsing from model responses.
//!
//! Accepts a ` ```plan ` or ` ```json ` fenced block, or a response that is
//! raw JSON in its entirety. Structural checks (cycles, dangling
//! dependencies) are left to [`Plan::validate`].

use super::entities::{Plan, PlanStep};
use super::value_objects::StepAction;
use crate::reasoning::ReasoningStrategy;

/// Parse a plan from model response text.
///
/// Returns `None` if no JSON plan can be found, or if it has no steps and
/// does not declare the goal complete.
pub fn parse_plan(response: &str, strategy: &ReasoningStrategy) -> Option<Plan> {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```plan" || trimmed == "```json") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&current_block) {
                return parse_plan_json(&parsed, strategy);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(response.trim()) {
        return parse_plan_json(&parsed, strategy);
    }

    None
}

/// Stringify ids: numbers become strings, empty strings and null are dropped.
fn json_value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(json: &serde_json::Value, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|k| json.get(*k).and_then(|v| v.as_bool()))
        .unwrap_or(false)
}

fn text<'a>(json: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| json.get(*k).and_then(|v| v.as_str()))
}

fn parse_action(step_json: &serde_json::Value) -> Option<StepAction> {
    match step_json.get("action")? {
        serde_json::Value::String(name) if !name.trim().is_empty() => {
            let mut action = StepAction::new(name.trim());
            if let Some(input) = step_json.get("input") {
                action = action.with_input(input.clone());
            }
            Some(action)
        }
        serde_json::Value::Object(obj) => {
            let name = obj.get("name").and_then(|v| v.as_str())?.trim();
            if name.is_empty() {
                return None;
            }
            let mut action = StepAction::new(name);
            if let Some(input) = obj.get("input") {
                action = action.with_input(input.clone());
            }
            if obj
                .get("requires_approval")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                action = action.with_approval();
            }
            Some(action)
        }
        _ => None,
    }
}

/// Parse a plan from a JSON value.
///
/// Expected schema:
/// ```json
/// {
///   "is_complete": false,
///   "concludes_goal": false,
///   "steps": [
///     {
///       "id": "1",
///       "description": "string",
///       "action": "name" | { "name": "string", "input": { ... } },
///       "dependencies": ["step_id", ...],
///       "expected_outcome": "string",
///       "requires_approval": false
///     }
///   ]
/// }
/// ```
///
/// `depends_on` and `expectedOutcome` are accepted as aliases. A step without
/// an action is rejected along with the whole plan.
pub fn parse_plan_json(json: &serde_json::Value, strategy: &ReasoningStrategy) -> Option<Plan> {
    let steps = json.get("steps").and_then(|v| v.as_array())?;
    let is_complete = flag(json, &["is_complete", "isComplete"]);

    if steps.is_empty() {
        return is_complete.then(|| Plan::completed(strategy.clone()));
    }

    let mut plan = Plan::new(strategy.clone());
    plan.concludes_goal = strategy.is_batch() || flag(json, &["concludes_goal", "concludesGoal"]);

    for (index, step_json) in steps.iter().enumerate() {
        let id = step_json
            .get("id")
            .and_then(json_value_to_string)
            .unwrap_or_else(|| format!("{}", index + 1));
        let description = text(step_json, &["description"]).unwrap_or("No description");

        let mut action = parse_action(step_json)?;
        if flag(step_json, &["requires_approval", "requiresApproval"]) {
            action = action.with_approval();
        }

        let mut step = PlanStep::new(id, description, action);
        if let Some(outcome) = text(step_json, &["expected_outcome", "expectedOutcome"]) {
            step = step.with_expected_outcome(outcome);
        }

        let deps = ["dependencies", "depends_on"]
            .iter()
            .find_map(|k| step_json.get(*k).and_then(|v| v.as_array()));
        if let Some(deps) = deps {
            for dep in deps {
                if let Some(dep_id) = json_value_to_string(dep) {
                    step = step.with_dependency(dep_id);
                }
            }
        }

        plan.add_step(step);
    }

    if is_complete {
        plan.concludes_goal = true;
    }

    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::StepId;

    #[test]
    fn test_parse_fenced_plan() {
        let response = r#"
Here is the plan:

```plan
{
  "steps": [
    {
      "id": "1",
      "description": "Read the config",
      "action": {"name": "read_file", "input": {"path": "app.toml"}},
      "dependencies": [],
      "expected_outcome": "config contents"
    },
    {
      "id": "2",
      "description": "Summarise",
      "action": "summarise",
      "depends_on": ["1"]
    }
  ]
}
```
"#;

        let plan = parse_plan(response, &ReasoningStrategy::iterative()).unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].action.name, "read_file");
        assert_eq!(plan.steps[0].action.input_str("path"), Some("app.toml"));
        assert_eq!(plan.steps[0].expected_outcome, "config contents");
        assert_eq!(plan.steps[1].depends_on, vec![StepId::new("1")]);
        assert!(!plan.concludes_goal);
        assert!(!plan.is_complete);
    }

    #[test]
    fn test_parse_json_fence_and_camel_case() {
        let response = "```json\n{\"steps\":[{\"id\":1,\"description\":\"ping\",\"action\":\"ping\",\"expectedOutcome\":\"pong\",\"requiresApproval\":true}],\"concludesGoal\":true}\n```";
        let plan = parse_plan(response, &ReasoningStrategy::iterative()).unwrap();
        assert_eq!(plan.steps[0].id.as_str(), "1");
        assert_eq!(plan.steps[0].expected_outcome, "pong");
        assert!(plan.steps[0].action.requires_approval);
        assert!(plan.concludes_goal);
    }

    #[test]
    fn test_parse_raw_json() {
        let response = r#"{"steps": [{"description": "a", "action": "noop"}]}"#;
        let plan = parse_plan(response, &ReasoningStrategy::iterative()).unwrap();
        assert_eq!(plan.steps[0].id.as_str(), "1", "missing id falls back to position");
    }

    #[test]
    fn test_batch_plans_always_conclude() {
        let response = r#"{"steps": [{"id": "a", "description": "a", "action": "noop"}]}"#;
        let plan = parse_plan(response, &ReasoningStrategy::batch()).unwrap();
        assert!(plan.concludes_goal);
    }

    #[test]
    fn test_empty_steps_only_valid_when_complete() {
        let strategy = ReasoningStrategy::iterative();
        assert!(parse_plan(r#"{"steps": []}"#, &strategy).is_none());

        let plan = parse_plan(r#"{"steps": [], "is_complete": true}"#, &strategy).unwrap();
        assert!(plan.is_complete);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_step_without_action_rejects_plan() {
        let response = r#"{"steps": [{"id": "1", "description": "nothing to do"}]}"#;
        assert!(parse_plan(response, &ReasoningStrategy::iterative()).is_none());
    }

    #[test]
    fn test_plain_text_returns_none() {
        assert!(parse_plan("I think we should read the file first.", &ReasoningStrategy::iterative()).is_none());
    }

    #[test]
    fn test_complete_plan_with_final_steps_concludes() {
        let response = r#"{"steps": [{"id": "9", "description": "report", "action": "report"}], "is_complete": true}"#;
        let plan = parse_plan(response, &ReasoningStrategy::iterative()).unwrap();
        assert!(plan.concludes_goal);
        assert!(!plan.is_complete, "completion waits for the steps to run");
    }
}
