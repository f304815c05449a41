//! Google Gemini REST collaborators: model catalog and multimodal invocation.

pub mod client;

pub use client::{ApiClient, GeminiError, ImagePayload, ModelCatalog, ModelInvoker};
