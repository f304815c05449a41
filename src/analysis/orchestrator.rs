//! The analyze pipeline: catalog → select → invoke → parse.
//!
//! [`AnalysisOrchestrator`] composes the two Gemini collaborator traits with
//! the [`ModelSelector`] and [`parse`]. Every failure is classified into an
//! [`AnalysisError`] at the boundary where it occurs; nothing propagates to
//! the UI as an unclassified fault.
//!
//! The pipeline is strictly sequential and owns no shared state — each
//! `analyze` call is independent, and dropping the future abandons the
//! request cleanly.

use crate::analysis::parser::{parse, ParseError, ParseReport};
use crate::analysis::prompt::PromptBuilder;
use crate::analysis::result::ResponseShape;
use crate::analysis::selector::{ModelSelector, SelectionError};
use crate::config::AppConfig;
use crate::gemini::{GeminiError, ImagePayload, ModelCatalog, ModelInvoker};

use thiserror::Error;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Classified failure of one analyze cycle.
///
/// The variants deliberately separate "could not ask the provider"
/// ([`CatalogUnavailable`](Self::CatalogUnavailable)) from "the provider
/// answered but offered nothing usable"
/// ([`Selection`](Self::Selection)) — the root causes differ (credentials /
/// network vs. entitlement or region restrictions) and the UI surfaces them
/// differently.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// The model catalog query failed (auth, network, provider outage).
    #[error("cannot reach the model catalog: {0}")]
    CatalogUnavailable(#[source] GeminiError),

    /// The catalog answered, but no model matched the selection policy.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The model invocation failed in transit.
    #[error("model request failed: {0}")]
    Transport(String),

    /// The model invocation exceeded the configured timeout.
    #[error("model request timed out")]
    TransportTimeout,

    /// The model answered, but its text was not parseable.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisError {
    /// Short, user-facing headline per failure class, rendered by the UI
    /// above the detail text.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable(_) => "Cannot reach the model provider",
            Self::Selection(_) => "Connected, but no usable model",
            Self::Transport(_) => "Model request failed",
            Self::TransportTimeout => "Model request timed out",
            Self::Parse(_) => "The model's reply could not be understood",
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisOrchestrator
// ---------------------------------------------------------------------------

/// Runs one request/response cycle against the configured collaborators.
pub struct AnalysisOrchestrator<C, M> {
    catalog: C,
    invoker: M,
    selector: ModelSelector,
    prompts: PromptBuilder,
    /// Deployment override: skip catalog selection and use this id directly.
    pinned_model: Option<String>,
    /// Total invocation attempts for transport failures (1 = no retry).
    /// Parse failures are never retried — the same prompt would most likely
    /// reproduce the same malformed answer.
    max_attempts: u32,
}

impl<C, M> AnalysisOrchestrator<C, M>
where
    C: ModelCatalog,
    M: ModelInvoker,
{
    /// Assemble the pipeline from application config.
    pub fn from_config(catalog: C, invoker: M, config: &AppConfig) -> Self {
        Self {
            catalog,
            invoker,
            selector: ModelSelector::from_config(&config.selector),
            prompts: PromptBuilder::new(&config.prompt.learner_language),
            pinned_model: config.selector.pinned_model.clone(),
            max_attempts: config.gemini.max_attempts.max(1),
        }
    }

    /// Analyze one photo: pick a model, invoke it, parse the reply.
    pub async fn analyze(
        &self,
        image: &ImagePayload,
        shape: ResponseShape,
    ) -> Result<ParseReport, AnalysisError> {
        let model_id = self.resolve_model().await?;
        log::info!("analyzing image ({} bytes) with {model_id}", image.bytes.len());

        let prompt = self.prompts.build(shape);
        let raw = self.invoke_with_retry(&model_id, &prompt, image).await?;

        let report = parse(&raw, shape)?;
        log::info!(
            "analysis complete: {} vocabulary item(s), {} dropped",
            report.analysis.vocabulary.len(),
            report.dropped
        );
        Ok(report)
    }

    /// Pinned model if configured, otherwise catalog + tiered selection.
    async fn resolve_model(&self) -> Result<String, AnalysisError> {
        if let Some(pinned) = &self.pinned_model {
            log::debug!("using pinned model {pinned}, skipping catalog");
            return Ok(pinned.clone());
        }

        let descriptors = self
            .catalog
            .list_models()
            .await
            .map_err(AnalysisError::CatalogUnavailable)?;

        Ok(self.selector.select(&descriptors)?)
    }

    /// Invoke the model, re-trying transport failures up to `max_attempts`.
    async fn invoke_with_retry(
        &self,
        model_id: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, AnalysisError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.invoker.generate(model_id, prompt, image).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    let retryable =
                        matches!(err, GeminiError::Request(_) | GeminiError::Timeout);
                    if retryable && attempt < self.max_attempts {
                        log::warn!("invocation attempt {attempt} failed ({err}), retrying");
                        continue;
                    }
                    return Err(match err {
                        GeminiError::Timeout => AnalysisError::TransportTimeout,
                        other => AnalysisError::Transport(other.to_string()),
                    });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
