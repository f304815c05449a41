//! The analyze pipeline core: model selection, prompting, response parsing.
//!
//! This module provides:
//! * [`ModelSelector`] — deterministic tiered selection over the catalog.
//! * [`parse`] — tolerant structured parsing of model responses.
//! * [`PromptBuilder`] — vocabulary-list and scenario prompts.
//! * [`AnalysisOrchestrator`] — composes the whole cycle.
//! * [`AnalysisResult`] / [`VocabularyItem`] / [`ScenarioRecord`] — the
//!   validated output data.
//! * [`AnalysisError`] — the classified failure taxonomy.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use object_learner::analysis::{AnalysisOrchestrator, ResponseShape};
//! use object_learner::config::AppConfig;
//! use object_learner::gemini::{ApiClient, ImagePayload};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = ApiClient::from_config(&config.gemini);
//!     let orchestrator =
//!         AnalysisOrchestrator::from_config(client.clone(), client, &config);
//!
//!     let photo = ImagePayload::new(std::fs::read("photo.jpg").unwrap(), "image/jpeg");
//!     match orchestrator.analyze(&photo, ResponseShape::List).await {
//!         Ok(report) => {
//!             for item in &report.analysis.vocabulary {
//!                 println!("{} {} — {}", item.word, item.phonetic, item.sentence);
//!             }
//!         }
//!         Err(err) => eprintln!("{}: {err}", err.headline()),
//!     }
//! }
//! ```

pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod result;
pub mod selector;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::{AnalysisError, AnalysisOrchestrator};
pub use parser::{parse, ParseError, ParseReport};
pub use prompt::PromptBuilder;
pub use result::{AnalysisResult, ResponseShape, ScenarioRecord, VocabularyItem};
pub use selector::{
    FallbackPolicy, ModelDescriptor, ModelSelector, SelectionError, GENERATE_CONTENT,
};
