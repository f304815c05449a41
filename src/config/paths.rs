//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\object-learner\
//!   macOS:   ~/Library/Application Support/object-learner/
//!   Linux:   ~/.config/object-learner/
//!
//! Cache dir (pronunciation clips):
//!   Windows: %LOCALAPPDATA%\object-learner\audio\
//!   macOS:   ~/Library/Caches/object-learner/audio/
//!   Linux:   ~/.cache/object-learner/audio/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for cached pronunciation MP3 clips.
    pub audio_cache_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "object-learner";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let audio_cache_dir = cache_dir.join("audio");

        Self {
            config_dir,
            settings_file,
            audio_cache_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .audio_cache_dir
            .file_name()
            .is_some_and(|n| n == "audio"));
    }
}
