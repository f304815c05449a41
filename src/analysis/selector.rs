//! Tiered model selection over the provider's dynamic catalog.
//!
//! The catalog changes over time as Google adds and retires models, so
//! hardcoding one identifier is fragile — but blind "first in list" is just
//! as fragile, because list order carries no quality signal. [`ModelSelector`]
//! applies a fixed priority ladder instead:
//!
//! 1. ids containing `"flash"` (fastest / cheapest tier)
//! 2. ids containing `"pro"` but not `"vision"` (general-quality tier; the
//!    deprecated vision-only variant is excluded on purpose)
//! 3. a configurable fallback — either the first id containing `"vision"`
//!    or simply the first remaining descriptor
//!
//! Selection is deterministic: within a tier the first descriptor in catalog
//! order wins, so identical input always yields the identical id.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SelectorConfig;

/// Capability flag a model must advertise to accept a text+image request.
pub const GENERATE_CONTENT: &str = "generateContent";

// ---------------------------------------------------------------------------
// ModelDescriptor
// ---------------------------------------------------------------------------

/// One entry from the provider's model catalog.
///
/// Created fresh on every catalog query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Opaque provider identifier, e.g. `"gemini-1.5-flash"`.
    pub id: String,
    /// Supported generation methods, e.g. `["generateContent", "countTokens"]`.
    pub capabilities: Vec<String>,
}

impl ModelDescriptor {
    /// Convenience constructor used by the Gemini client and tests.
    pub fn new(id: impl Into<String>, capabilities: &[&str]) -> Self {
        Self {
            id: id.into(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Whether this model can serve a multimodal generate request.
    pub fn supports_generation(&self) -> bool {
        self.capabilities.iter().any(|c| c == GENERATE_CONTENT)
    }
}

// ---------------------------------------------------------------------------
// FallbackPolicy
// ---------------------------------------------------------------------------

/// What to do when neither the flash nor the pro tier matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// Fall back to the first id containing `"vision"` (legacy vision-only
    /// models such as `gemini-pro-vision`).
    PreferVision,
    /// Fall back to the first remaining descriptor in catalog order.
    FirstAvailable,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::PreferVision
    }
}

// ---------------------------------------------------------------------------
// SelectionError
// ---------------------------------------------------------------------------

/// Failure to pick a model from the catalog.
///
/// Distinct from a catalog *query* failure: this means the provider answered
/// but offered nothing usable (empty catalog, or nothing matched any tier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The catalog contained no descriptor matching any tier or fallback.
    #[error("no usable model in the catalog")]
    NoUsableModel,
}

// ---------------------------------------------------------------------------
// ModelSelector
// ---------------------------------------------------------------------------

/// Deterministic tiered selection policy.
///
/// # Example
/// ```rust
/// use object_learner::analysis::{ModelDescriptor, ModelSelector};
///
/// let selector = ModelSelector::default();
/// let catalog = vec![
///     ModelDescriptor::new("gemini-1.5-pro", &["generateContent"]),
///     ModelDescriptor::new("gemini-1.5-flash", &["generateContent"]),
/// ];
/// assert_eq!(selector.select(&catalog).unwrap(), "gemini-1.5-flash");
/// ```
#[derive(Debug, Clone)]
pub struct ModelSelector {
    /// Only consider descriptors advertising [`GENERATE_CONTENT`]. Some
    /// deployments disable this and accept any catalog entry; that looser
    /// mode is the `false` setting, not a separate code path.
    require_generation_capability: bool,
    /// Behaviour when no tier matched.
    fallback_policy: FallbackPolicy,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            require_generation_capability: true,
            fallback_policy: FallbackPolicy::default(),
        }
    }
}

impl ModelSelector {
    /// Build a selector with explicit policy flags.
    pub fn new(require_generation_capability: bool, fallback_policy: FallbackPolicy) -> Self {
        Self {
            require_generation_capability,
            fallback_policy,
        }
    }

    /// Build a selector from persisted configuration.
    pub fn from_config(config: &SelectorConfig) -> Self {
        Self::new(config.require_generation_capability, config.fallback_policy)
    }

    /// Pick one model id from `descriptors`, or fail with
    /// [`SelectionError::NoUsableModel`].
    ///
    /// First match wins; catalog order breaks ties within a tier.
    pub fn select(&self, descriptors: &[ModelDescriptor]) -> Result<String, SelectionError> {
        let candidates: Vec<&ModelDescriptor> = descriptors
            .iter()
            .filter(|d| !self.require_generation_capability || d.supports_generation())
            .collect();

        if candidates.is_empty() {
            return Err(SelectionError::NoUsableModel);
        }

        // Tier 1: flash — fastest and cheapest.
        if let Some(d) = candidates.iter().find(|d| d.id.contains("flash")) {
            log::debug!("selected flash-tier model: {}", d.id);
            return Ok(d.id.clone());
        }

        // Tier 2: pro, excluding the deprecated vision-only variant.
        if let Some(d) = candidates
            .iter()
            .find(|d| d.id.contains("pro") && !d.id.contains("vision"))
        {
            log::debug!("selected pro-tier model: {}", d.id);
            return Ok(d.id.clone());
        }

        // No tier matched — apply the configured fallback.
        let fallback = match self.fallback_policy {
            FallbackPolicy::PreferVision => {
                candidates.iter().find(|d| d.id.contains("vision")).copied()
            }
            FallbackPolicy::FirstAvailable => candidates.first().copied(),
        };

        match fallback {
            Some(d) => {
                log::debug!("selected fallback model: {}", d.id);
                Ok(d.id.clone())
            }
            None => Err(SelectionError::NoUsableModel),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(id: &str) -> ModelDescriptor {
        ModelDescriptor::new(id, &[GENERATE_CONTENT])
    }

    // -----------------------------------------------------------------------
    // Tier priority
    // -----------------------------------------------------------------------

    #[test]
    fn flash_tier_wins_over_pro_and_vision() {
        let catalog = vec![
            gen("gemini-pro-vision"),
            gen("gemini-1.5-pro"),
            gen("gemini-1.5-flash"),
        ];
        let selector = ModelSelector::default();
        assert_eq!(selector.select(&catalog).unwrap(), "gemini-1.5-flash");
    }

    #[test]
    fn pro_tier_excludes_vision_variant() {
        let catalog = vec![gen("gemini-pro-vision"), gen("gemini-1.0-pro")];
        let selector = ModelSelector::default();
        assert_eq!(selector.select(&catalog).unwrap(), "gemini-1.0-pro");
    }

    #[test]
    fn first_flash_in_catalog_order_breaks_ties() {
        let catalog = vec![
            gen("gemini-2.0-flash"),
            gen("gemini-1.5-flash"),
            gen("gemini-1.5-flash-8b"),
        ];
        let selector = ModelSelector::default();
        assert_eq!(selector.select(&catalog).unwrap(), "gemini-2.0-flash");
    }

    #[test]
    fn selection_is_deterministic() {
        let catalog = vec![
            gen("gemini-pro-vision"),
            gen("gemini-1.0-pro"),
            gen("gemini-1.5-flash"),
        ];
        let selector = ModelSelector::default();
        let first = selector.select(&catalog).unwrap();
        for _ in 0..10 {
            assert_eq!(selector.select(&catalog).unwrap(), first);
        }
    }

    // -----------------------------------------------------------------------
    // Capability filter
    // -----------------------------------------------------------------------

    #[test]
    fn capability_filter_skips_non_generating_models() {
        // Matches the flash tier by name but cannot generate content.
        let catalog = vec![
            ModelDescriptor::new("gemini-1.5-flash", &["countTokens"]),
            gen("gemini-1.0-pro"),
        ];
        let selector = ModelSelector::default();
        assert_eq!(selector.select(&catalog).unwrap(), "gemini-1.0-pro");
    }

    #[test]
    fn loose_mode_accepts_any_capability_set() {
        let catalog = vec![ModelDescriptor::new("gemini-1.5-flash", &["countTokens"])];
        let selector = ModelSelector::new(false, FallbackPolicy::PreferVision);
        assert_eq!(selector.select(&catalog).unwrap(), "gemini-1.5-flash");
    }

    #[test]
    fn all_filtered_out_is_no_usable_model() {
        let catalog = vec![ModelDescriptor::new("gemini-1.5-flash", &["embedContent"])];
        let selector = ModelSelector::default();
        assert_eq!(
            selector.select(&catalog),
            Err(SelectionError::NoUsableModel)
        );
    }

    // -----------------------------------------------------------------------
    // Fallback policies
    // -----------------------------------------------------------------------

    #[test]
    fn prefer_vision_falls_back_to_vision_model() {
        let catalog = vec![gen("text-bison"), gen("gemini-pro-vision-deprecated")];
        // "gemini-pro-vision-deprecated" contains "pro" AND "vision", so tier 2
        // skips it; the vision fallback picks it up.
        let selector = ModelSelector::new(true, FallbackPolicy::PreferVision);
        assert_eq!(
            selector.select(&catalog).unwrap(),
            "gemini-pro-vision-deprecated"
        );
    }

    #[test]
    fn prefer_vision_without_vision_model_fails() {
        let catalog = vec![gen("text-bison"), gen("chat-bison")];
        let selector = ModelSelector::new(true, FallbackPolicy::PreferVision);
        assert_eq!(
            selector.select(&catalog),
            Err(SelectionError::NoUsableModel)
        );
    }

    #[test]
    fn first_available_falls_back_to_list_head() {
        let catalog = vec![gen("text-bison"), gen("chat-bison")];
        let selector = ModelSelector::new(true, FallbackPolicy::FirstAvailable);
        assert_eq!(selector.select(&catalog).unwrap(), "text-bison");
    }

    // -----------------------------------------------------------------------
    // Empty catalog
    // -----------------------------------------------------------------------

    #[test]
    fn empty_catalog_is_no_usable_model() {
        let selector = ModelSelector::default();
        assert_eq!(selector.select(&[]), Err(SelectionError::NoUsableModel));
    }
}
