//! Configuration file loading for agentloop
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. See [`ConfigLoader::load`] for the priority order.

mod file_config;
mod loader;

pub use file_config::{
    FileActionsConfig, FileApprovalConfig, FileConfig, FileExecutorConfig, FileLoggingConfig,
    FileMemoryConfig, FileModelConfig, FileStrategyConfig, MemoryBackend,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSource};
