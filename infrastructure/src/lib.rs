//! Infrastructure layer for agentloop
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod actions;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod memory;

// Re-export commonly used types
pub use actions::{
    ActionRegistry, CommandActionRunner, CommandRunnerConfig, MEMORY_ACTIONS, MemoryActionRunner,
    RUN_COMMAND,
};
pub use config::{ConfigError, ConfigLoader, ConfigSource, FileConfig, MemoryBackend};
#[cfg(feature = "http-gateway")]
pub use gateway::{HttpGatewayConfig, OpenAiCompatibleGateway};
pub use gateway::{ScriptError, ScriptedGateway};
pub use logging::JsonlRunLogger;
pub use memory::{FileMemoryStore, InMemoryStore};
#[cfg(feature = "redis-memory")]
pub use memory::{RedisMemoryConfig, RedisMemoryStore};
