//! Security log triage core
//!
//! Staged analysis of security logs, verdict extraction and durable
//! recording of high-severity events.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::Config;
pub use error::{ErrorBody, InputError};
