//! Text-to-speech collaborator and pronunciation-clip cache.
//!
//! TTS is strictly best effort: a clip that cannot be fetched is logged and
//! skipped, never surfaced as an analysis failure. [`ApiSpeaker`] performs a
//! GET against a translate-tts style endpoint (`q` text + `tl` language
//! query params, MP3 bytes back); fetched clips are cached on disk keyed by
//! a sanitised word so repeat lookups stay offline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching or caching a pronunciation clip.
#[derive(Debug, Error)]
pub enum TtsError {
    /// HTTP transport or non-success status error.
    #[error("TTS request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("TTS request timed out")]
    Timeout,

    /// The endpoint answered with zero audio bytes.
    #[error("TTS returned no audio")]
    EmptyAudio,

    /// Writing the clip to the cache directory failed.
    #[error("failed to cache audio clip: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextToSpeech trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-audio synthesis.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert `text` into audio bytes (MP3).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;
}

// ---------------------------------------------------------------------------
// ApiSpeaker
// ---------------------------------------------------------------------------

/// Calls a translate-tts style HTTP endpoint.
pub struct ApiSpeaker {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ApiSpeaker {
    /// Build an `ApiSpeaker` from application config.
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TextToSpeech for ApiSpeaker {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", text),
                ("tl", self.config.language.as_str()),
                ("client", "tw-ob"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::Request(format!("TTS returned HTTP {status}")));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(TtsError::EmptyAudio);
        }
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Clip cache
// ---------------------------------------------------------------------------

/// Write `bytes` to `{dir}/{sanitised word}.mp3`, creating `dir` as needed,
/// and return the clip path.
pub fn cache_clip(dir: &Path, word: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.mp3", sanitize_word(word)));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Path the clip for `word` would be cached at, if it exists.
pub fn cached_clip(dir: &Path, word: &str) -> Option<PathBuf> {
    let path = dir.join(format!("{}.mp3", sanitize_word(word)));
    path.exists().then_some(path)
}

/// Lowercase, keep ASCII alphanumerics, map everything else to `-`.
/// `"coffee mug"` → `"coffee-mug"`.
fn sanitize_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_keeps_alphanumerics() {
        assert_eq!(sanitize_word("cat"), "cat");
        assert_eq!(sanitize_word("Coffee Mug"), "coffee-mug");
        assert_eq!(sanitize_word("  jack-o'-lantern "), "jack-o-lantern");
    }

    #[test]
    fn sanitize_collapses_runs_of_punctuation() {
        assert_eq!(sanitize_word("a / b"), "a-b");
        assert_eq!(sanitize_word("!!!"), "");
    }

    #[test]
    fn cache_clip_writes_and_is_found_again() {
        let dir = tempdir().expect("temp dir");

        let path = cache_clip(dir.path(), "coffee mug", b"mp3-bytes").expect("write");
        assert!(path.file_name().is_some_and(|n| n == "coffee-mug.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"mp3-bytes");

        let hit = cached_clip(dir.path(), "Coffee Mug").expect("cache hit");
        assert_eq!(hit, path);
    }

    #[test]
    fn cached_clip_misses_for_unknown_word() {
        let dir = tempdir().expect("temp dir");
        assert!(cached_clip(dir.path(), "zeppelin").is_none());
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _speaker = ApiSpeaker::from_config(&TtsConfig::default());
    }

    /// Verify that `ApiSpeaker` is object-safe (usable as `dyn TextToSpeech`).
    #[test]
    fn speaker_is_object_safe() {
        let speaker: Box<dyn TextToSpeech> = Box::new(ApiSpeaker::from_config(&TtsConfig::default()));
        drop(speaker);
    }
}
