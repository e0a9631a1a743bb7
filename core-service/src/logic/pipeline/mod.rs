//! Pipeline Module - Staged log analysis
//!
//! ## Structure
//! - `types.rs` - StageRole, AnalysisStage trait, Narrative, Analysis
//! - `prompts.rs` - Per-stage French prompts with the line-format contract
//! - `ollama.rs` - HTTP stage service (Ollama `/api/generate`)
//! - `orchestrator.rs` - Sequential stage runner + recording trigger

pub mod ollama;
pub mod orchestrator;
pub mod prompts;
pub mod types;

pub use ollama::OllamaStage;
pub use orchestrator::Orchestrator;
pub use types::{Analysis, AnalysisStage, Narrative, StageError, StagePrompt, StageRole};
