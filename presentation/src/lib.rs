//! Presentation layer for agentloop
//!
//! This crate contains the CLI definition, the terminal approval prompt,
//! progress reporters and output formatting.

pub mod approval;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use approval::console::ConsoleApprovalPrompt;
pub use cli::commands::{Cli, ModeArg, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
