//! Telemetry Module
//!
//! Security events and where they land when the ledger cannot take them.
//!
//! ## Structure
//! - `event.rs` - SecurityEvent struct (immutable, timestamped, unique id)
//! - `local_store.rs` - One-file-per-event fallback directory
//! - `stats.rs` - Process-wide counters

pub mod event;
pub mod local_store;
pub mod stats;

// Re-export main types and functions
pub use event::{excerpt, next_event_id, SecurityEvent};

pub use local_store::{LocalRecord, LocalStore, StoreError};

pub use stats::{snapshot, TriageStats};
