//! Logic Module - Business Logic & Engines
//!
//! ## Structure
//! - `threat/` - Verdict types, narrative extractor, rule-based classifier
//! - `pipeline/` - Stage orchestration (Analyst, Remediator, Validator)
//! - `ledger/` - Ledger clients (fabric, http, file, none)
//! - `recording/` - Ledger-or-local recording gateway
//! - `telemetry/` - Security events, local store, counters

pub mod ledger;
pub mod pipeline;
pub mod recording;
pub mod telemetry;
pub mod threat;
