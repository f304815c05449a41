//! Best-effort text-to-speech for vocabulary pronunciation.

pub mod speaker;

pub use speaker::{cache_clip, cached_clip, ApiSpeaker, TextToSpeech, TtsError};
