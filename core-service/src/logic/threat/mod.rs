//! Threat Module
//!
//! Turns analysis output or raw log text into a `Verdict`.
//!
//! ## Structure
//! - `types`: Core types (Criticality, Verdict, LogRecord)
//! - `rules`: Markers, keyword tables and fixed confidences
//! - `extractor`: Narrative -> Verdict (staged pipeline path)
//! - `classifier`: Log text -> Verdict (rule-based path)
//!
//! ## Usage
//! ```ignore
//! use crate::logic::threat::{extract, classify_simple, Criticality};
//!
//! let verdict = extract(&narrative);
//! if verdict.criticality == Criticality::Critique {
//!     // record it
//! }
//! ```

pub mod types;
pub mod rules;
pub mod extractor;
pub mod classifier;

// Re-export main types for convenience
pub use types::{Criticality, LogRecord, Verdict};

pub use extractor::{extract, extract_actions, missing_labels, ActionPattern};

pub use classifier::classify_simple;
