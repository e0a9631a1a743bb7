//! API Module
//!
//! Boundary between callers and the triage core.
//!
//! Structure:
//! - analyze.rs: `{log}` request validation, engine dispatch, response rendering
//!
//! Usage:
//! - `api::TriageEngine::from_config(&config)` - Build once per process
//! - `api::handle(&engine, body).await` - One request

pub mod analyze;

pub use analyze::*;
