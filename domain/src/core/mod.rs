//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - validation errors raised before side effects
//! - [`config_issue::ConfigIssue`] - non-fatal configuration diagnostics

pub mod config_issue;
pub mod error;
