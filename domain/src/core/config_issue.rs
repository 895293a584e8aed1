//! Configuration issues.
//!
//! Config loading never fails on a bad value: it falls back to a default and
//! reports a [`ConfigIssue`]. Callers decide whether errors are fatal.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work as written.
    Error,
    /// The configuration works but a value was ignored.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field did not name a known variant
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A value is out of range
    InvalidValue { field: String, reason: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    /// Warning for an unknown enum string that fell back to `fallback`.
    pub fn invalid_enum(field: &str, value: &str, valid_values: &[&str], fallback: &str) -> Self {
        Self {
            severity: Severity::Warning,
            code: ConfigIssueCode::InvalidEnumValue {
                field: field.to_string(),
                value: value.to_string(),
                valid_values: valid_values.iter().map(|v| v.to_string()).collect(),
            },
            message: format!(
                "{}: unknown value '{}', falling back to '{}'",
                field, value, fallback
            ),
        }
    }

    /// Error for a value that cannot drive a run.
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            severity: Severity::Error,
            message: format!("{}: {}", field, reason),
            code: ConfigIssueCode::InvalidValue {
                field: field.to_string(),
                reason,
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_enum_is_warning() {
        let issue = ConfigIssue::invalid_enum("approval.hil_mode", "maybe", &["interactive"], "interactive");
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(
            issue.message,
            "approval.hil_mode: unknown value 'maybe', falling back to 'interactive'"
        );
        assert!(!ConfigIssue::has_errors(&[issue]));
    }

    #[test]
    fn test_invalid_value_is_error() {
        let issue = ConfigIssue::invalid_value("strategy.max_iterations", "must be positive");
        assert!(issue.is_error());
        assert_eq!(issue.message, "strategy.max_iterations: must be positive");
        assert!(ConfigIssue::has_errors(&[issue]));
    }
}
