//! CLI command definitions

use agentloop_domain::{HilMode, ReasoningMode, StrategyOverride};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the final run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// The full run state as JSON
    Json,
}

/// Reasoning mode selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Plan one step, execute, observe, repeat
    Iterative,
    /// Plan every step upfront, execute as a batch
    Batch,
    /// Pick iterative or batch from the goal text
    Adaptive,
}

impl From<ModeArg> for ReasoningMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Iterative => ReasoningMode::Iterative,
            ModeArg::Batch => ReasoningMode::Batch,
            ModeArg::Adaptive => ReasoningMode::Adaptive,
        }
    }
}

/// CLI arguments for agentloop
#[derive(Parser, Debug)]
#[command(name = "agentloop")]
#[command(author, version, about = "Plan, execute and observe until a goal is met")]
#[command(long_about = r#"
agentloop drives a model through a plan -> execute -> observe loop.

Iterative mode plans one step at a time and feeds each observation back
into the next plan. Batch mode plans everything upfront and runs
independent steps concurrently. Adaptive mode picks one per goal.

Actions flagged as risky pause for approval on the terminal unless
--auto-approve or --auto-deny is given.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/agentloop/config.toml   Global config
2. ./agentloop.toml                  Project-level config
3. --config <path>                   Explicit config file
4. AGENTLOOP_* environment variables (e.g. AGENTLOOP_STRATEGY__MODE=batch)

Example:
  agentloop "Summarise the open TODOs in this repo"
  agentloop --mode batch --max-iterations 3 "Build, then test, then package"
  agentloop --scripted demo.json --output json "Say hello"
"#)]
pub struct Cli {
    /// The goal to pursue
    pub goal: Option<String>,

    /// Reasoning mode (overrides [strategy] mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Maximum plan/execute/observe iterations
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Require approval before every step
    #[arg(long)]
    pub require_approval: bool,

    /// Approval timeout in milliseconds (0 waits forever)
    #[arg(long, value_name = "MS")]
    pub approval_timeout_ms: Option<u64>,

    /// Approve every approval request without asking
    #[arg(long, conflicts_with = "auto_deny")]
    pub auto_approve: bool,

    /// Deny every approval request without asking
    #[arg(long)]
    pub auto_deny: bool,

    /// Persist memory to this JSON file
    #[arg(long, value_name = "PATH")]
    pub memory_file: Option<PathBuf>,

    /// Append structured run events to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub run_log: Option<PathBuf>,

    /// Replay model responses from a script file instead of calling a model
    #[arg(long, value_name = "FILE")]
    pub scripted: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Strategy fields set on the command line.
    pub fn strategy_overrides(&self) -> StrategyOverride {
        StrategyOverride {
            mode: self.mode.map(ReasoningMode::from),
            max_iterations: self.max_iterations,
            requires_approval: self.require_approval.then_some(true),
            ..Default::default()
        }
    }

    /// Approval mode forced by `--auto-approve` / `--auto-deny`.
    pub fn hil_mode(&self) -> Option<HilMode> {
        if self.auto_approve {
            Some(HilMode::AutoApprove)
        } else if self.auto_deny {
            Some(HilMode::AutoDeny)
        } else {
            None
        }
    }
}
