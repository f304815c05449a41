//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analysis::FallbackPolicy;

use super::AppPaths;

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

/// Connection settings for the Google Generative Language API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the API (configurable for proxies and test servers).
    pub base_url: String,
    /// API key. `None` means read `GEMINI_API_KEY` / `GOOGLE_API_KEY` from
    /// the environment at request time.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for any single API call.
    pub timeout_secs: u64,
    /// Sampling temperature (0.0 – 1.0). Lower = more deterministic, which
    /// keeps the JSON output well-formed more reliably.
    pub temperature: f32,
    /// Total invocation attempts for transport failures (1 = no retry).
    pub max_attempts: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            timeout_secs: 30,
            temperature: 0.4,
            max_attempts: 1,
        }
    }
}

impl GeminiConfig {
    /// The API key to use: config value first, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`. Empty strings count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| non_empty_env("GEMINI_API_KEY"))
            .or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// SelectorConfig
// ---------------------------------------------------------------------------

/// Policy flags for model selection (see `analysis::selector`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Only consider models advertising the `generateContent` capability.
    pub require_generation_capability: bool,
    /// Behaviour when neither the flash nor the pro tier matched.
    pub fallback_policy: FallbackPolicy,
    /// Deployment override: use this model id directly and skip the catalog.
    pub pinned_model: Option<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            require_generation_capability: true,
            fallback_policy: FallbackPolicy::default(),
            pinned_model: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PromptConfig
// ---------------------------------------------------------------------------

/// Settings for prompt construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Learner's native language, spelled out in English (e.g. `"Chinese"`);
    /// the `meaning` field of each vocabulary item is written in it.
    pub learner_language: String,
    /// Ask for a scenario narrative in addition to the vocabulary list.
    pub include_scenario: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            learner_language: "Chinese".into(),
            include_scenario: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for pronunciation-clip fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Whether to fetch pronunciation clips after a successful analysis.
    pub enabled: bool,
    /// TTS endpoint (translate-tts style: `q` + `tl` query params, MP3 back).
    pub endpoint: String,
    /// Speech language code passed as `tl`.
    pub language: String,
    /// Maximum seconds to wait per clip.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://translate.google.com/translate_tts".into(),
            language: "en".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use object_learner::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API connection settings.
    pub gemini: GeminiConfig,
    /// Model-selection policy flags.
    pub selector: SelectorConfig,
    /// Prompt construction settings.
    pub prompt: PromptConfig,
    /// Pronunciation-clip settings.
    pub tts: TtsConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // GeminiConfig
        assert_eq!(original.gemini.base_url, loaded.gemini.base_url);
        assert_eq!(original.gemini.api_key, loaded.gemini.api_key);
        assert_eq!(original.gemini.timeout_secs, loaded.gemini.timeout_secs);
        assert_eq!(original.gemini.temperature, loaded.gemini.temperature);
        assert_eq!(original.gemini.max_attempts, loaded.gemini.max_attempts);

        // SelectorConfig
        assert_eq!(
            original.selector.require_generation_capability,
            loaded.selector.require_generation_capability
        );
        assert_eq!(
            original.selector.fallback_policy,
            loaded.selector.fallback_policy
        );
        assert_eq!(original.selector.pinned_model, loaded.selector.pinned_model);

        // PromptConfig
        assert_eq!(
            original.prompt.learner_language,
            loaded.prompt.learner_language
        );
        assert_eq!(
            original.prompt.include_scenario,
            loaded.prompt.include_scenario
        );

        // TtsConfig
        assert_eq!(original.tts.enabled, loaded.tts.enabled);
        assert_eq!(original.tts.endpoint, loaded.tts.endpoint);
        assert_eq!(original.tts.language, loaded.tts.language);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.gemini.base_url, default.gemini.base_url);
        assert_eq!(
            config.selector.require_generation_capability,
            default.selector.require_generation_capability
        );
        assert_eq!(config.prompt.learner_language, default.prompt.learner_language);
    }

    #[test]
    fn default_values_are_sane() {
        let cfg = AppConfig::default();

        assert_eq!(
            cfg.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(cfg.gemini.api_key.is_none());
        assert_eq!(cfg.gemini.timeout_secs, 30);
        assert_eq!(cfg.gemini.max_attempts, 1);
        assert!(cfg.selector.require_generation_capability);
        assert_eq!(cfg.selector.fallback_policy, FallbackPolicy::PreferVision);
        assert!(cfg.selector.pinned_model.is_none());
        assert_eq!(cfg.prompt.learner_language, "Chinese");
        assert!(!cfg.prompt.include_scenario);
        assert!(cfg.tts.enabled);
        assert_eq!(cfg.tts.language, "en");
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.gemini.base_url = "http://localhost:8080/v1beta".into();
        cfg.gemini.api_key = Some("AIza-test".into());
        cfg.gemini.max_attempts = 2;
        cfg.selector.require_generation_capability = false;
        cfg.selector.fallback_policy = FallbackPolicy::FirstAvailable;
        cfg.selector.pinned_model = Some("gemini-1.5-flash".into());
        cfg.prompt.learner_language = "Spanish".into();
        cfg.prompt.include_scenario = true;
        cfg.tts.enabled = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.gemini.base_url, "http://localhost:8080/v1beta");
        assert_eq!(loaded.gemini.api_key, Some("AIza-test".into()));
        assert_eq!(loaded.gemini.max_attempts, 2);
        assert!(!loaded.selector.require_generation_capability);
        assert_eq!(
            loaded.selector.fallback_policy,
            FallbackPolicy::FirstAvailable
        );
        assert_eq!(loaded.selector.pinned_model, Some("gemini-1.5-flash".into()));
        assert_eq!(loaded.prompt.learner_language, "Spanish");
        assert!(loaded.prompt.include_scenario);
        assert!(!loaded.tts.enabled);
    }

    #[test]
    fn explicit_api_key_wins_over_environment() {
        let cfg = GeminiConfig {
            api_key: Some("from-config".into()),
            ..GeminiConfig::default()
        };
        assert_eq!(cfg.resolve_api_key(), Some("from-config".into()));
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let cfg = GeminiConfig {
            api_key: Some("   ".into()),
            ..GeminiConfig::default()
        };
        // Falls through to the environment, which may or may not be set in
        // the test runner; only assert it is not the blank config value.
        assert_ne!(cfg.resolve_api_key(), Some("   ".into()));
    }
}
