//! Goal complexity heuristic for adaptive mode.
//!
//! Goals that spell out a sequence of well-defined steps are predictable and
//! plan well upfront (batch). Open-ended or diagnostic goals need observations
//! between steps (iterative). The assessment only looks at the goal text, so
//! the resulting style is a pure function of its input.

use serde::{Deserialize, Serialize};
use std::fmt;

const SEQUENCING_WORDS: &[&str] = &["then", "afterwards", "finally", "first", "next", "lastly"];
const SEQUENCING_PHRASES: &[&str] = &["after that", "once done", "followed by"];
const EXPLORATORY_WORDS: &[&str] = &[
    "investigate",
    "why",
    "debug",
    "explore",
    "diagnose",
    "research",
    "unknown",
];
const EXPLORATORY_PHRASES: &[&str] = &["figure out", "find out", "look into"];

/// Word count above which a goal with any sequencing marker is batched.
const LONG_GOAL_WORDS: usize = 60;

/// Concrete execution style after adaptive mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStyle {
    Iterative,
    Batch,
}

impl ExecutionStyle {
    pub fn is_batch(&self) -> bool {
        matches!(self, ExecutionStyle::Batch)
    }
}

impl fmt::Display for ExecutionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStyle::Iterative => write!(f, "iterative"),
            ExecutionStyle::Batch => write!(f, "batch"),
        }
    }
}

/// Marker counts extracted from a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityAssessment {
    pub word_count: usize,
    pub sequencing_markers: usize,
    pub exploratory_markers: usize,
}

impl ComplexityAssessment {
    pub fn of(goal: &str) -> Self {
        let lowered = goal.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let count_words = |vocabulary: &[&str]| {
            words.iter().filter(|w| vocabulary.contains(w)).count()
        };
        let count_phrases = |phrases: &[&str]| {
            phrases
                .iter()
                .map(|p| lowered.matches(p).count())
                .sum::<usize>()
        };

        let list_items = goal.lines().filter(|line| is_list_item(line)).count();
        let semicolons = goal.matches(';').count();

        Self {
            word_count: words.len(),
            sequencing_markers: count_words(SEQUENCING_WORDS)
                + count_phrases(SEQUENCING_PHRASES)
                + list_items
                + semicolons,
            exploratory_markers: count_words(EXPLORATORY_WORDS)
                + count_phrases(EXPLORATORY_PHRASES)
                + goal.matches('?').count(),
        }
    }

    pub fn preferred_style(&self) -> ExecutionStyle {
        let sequenced = self.sequencing_markers > self.exploratory_markers;
        if sequenced && self.sequencing_markers >= 2 {
            return ExecutionStyle::Batch;
        }
        if sequenced && self.word_count > LONG_GOAL_WORDS {
            return ExecutionStyle::Batch;
        }
        ExecutionStyle::Iterative
    }
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
        return true;
    }
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    !digits.is_empty()
        && matches!(trimmed[digits.len()..].chars().next(), Some('.') | Some(')'))
}
