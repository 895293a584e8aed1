//! Console output formatter for run results

use agentloop_domain::{LoopState, StepDisposition, StepResult};
use colored::Colorize;

/// Formats a finished [`LoopState`] for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the run as a human-readable summary
    pub fn format(state: &LoopState) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("agentloop run"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Goal:".cyan().bold(), state.goal));
        if let Some(style) = state.style {
            output.push_str(&format!("{} {}\n", "Style:".cyan().bold(), style));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Iterations:".cyan().bold(),
            state.iteration
        ));
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), Self::status(state)));

        if !state.step_results.is_empty() {
            output.push_str(&Self::section_header("Steps"));
            for result in &state.step_results {
                output.push_str(&Self::step_line(result));
            }
        }

        if let Some(plan) = &state.plan
            && !plan.steps.is_empty()
        {
            let (done, total) = plan.progress();
            output.push_str(&Self::section_header("Last Plan"));
            output.push_str(&format!("{}/{} steps complete\n", done, total));
            for step in &plan.steps {
                let mark = if step.is_complete { "v".green() } else { "-".dimmed() };
                output.push_str(&format!("  {} [{}] {}\n", mark, step.id, step.description));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(state: &LoopState) -> String {
        serde_json::to_string_pretty(state).unwrap_or_else(|_| "{}".to_string())
    }

    fn status(state: &LoopState) -> String {
        if let Some(error) = &state.error {
            format!("{} ({})", "failed".red().bold(), error)
        } else if state.is_complete {
            "complete".green().bold().to_string()
        } else {
            "incomplete (iteration budget exhausted)".yellow().bold().to_string()
        }
    }

    fn step_line(result: &StepResult) -> String {
        let tag = match result.disposition {
            StepDisposition::Completed => "ok".green(),
            StepDisposition::Failed => "failed".red(),
            StepDisposition::Denied => "denied".yellow(),
            StepDisposition::Skipped => "skipped".dimmed(),
        };
        let detail = result
            .error
            .as_deref()
            .or(result.observation.as_deref())
            .unwrap_or("");
        let mut line = format!("  [{}] {}", tag, result.step_id);
        if !detail.is_empty() {
            line.push_str(": ");
            line.push_str(&Self::indent(detail, "      ").trim_start().to_string());
        }
        line.push('\n');
        line
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentloop_domain::{ExecutionStyle, StepId};

    fn finished_state() -> LoopState {
        let mut state = LoopState::new("Tidy the repo", serde_json::Value::Null);
        state.iteration = 2;
        state.style = Some(ExecutionStyle::Batch);
        state.apply_result(
            StepResult::success(
                StepId::new("1"),
                serde_json::json!("ok"),
                Some("listed 3 files".to_string()),
                chrono::Utc::now(),
            ),
        );
        state.apply_result(StepResult::denied(
            StepId::new("2"),
            "approval denied",
            chrono::Utc::now(),
        ));
        state.is_complete = true;
        state
    }

    #[test]
    fn test_text_summary() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&finished_state());
        assert!(text.contains("Goal: Tidy the repo"));
        assert!(text.contains("Style: batch"));
        assert!(text.contains("Iterations: 2"));
        assert!(text.contains("Status: complete"));
        assert!(text.contains("[ok] 1: listed 3 files"));
        assert!(text.contains("[denied] 2: approval denied"));
    }

    #[test]
    fn test_error_status() {
        colored::control::set_override(false);
        let mut state = finished_state();
        state.is_complete = false;
        state.error = Some("Operation cancelled".to_string());
        let text = ConsoleFormatter::format(&state);
        assert!(text.contains("Status: failed (Operation cancelled)"));
    }

    #[test]
    fn test_json_round_trips_state() {
        let state = finished_state();
        let json = ConsoleFormatter::format_json(&state);
        let parsed: LoopState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
