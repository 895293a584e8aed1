//! Model gateway adapters.

#[cfg(feature = "http-gateway")]
mod http;
mod scripted;

#[cfg(feature = "http-gateway")]
pub use http::{HttpGatewayConfig, OpenAiCompatibleGateway};
pub use scripted::{ScriptError, ScriptedGateway};
