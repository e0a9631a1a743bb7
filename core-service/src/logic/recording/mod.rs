//! Recording Module
//!
//! Durable recording of security events: ledger first, local store as fallback.
//!
//! ## Structure
//! - `types.rs` - RecordingResult, RecordStatus, Backend
//! - `gateway.rs` - Probe / write / fallback state machine

pub mod gateway;
pub mod types;

pub use gateway::RecordingGateway;
pub use types::{Backend, RecordStatus, RecordingResult};
