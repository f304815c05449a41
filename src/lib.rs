//! Object Learner — photo-to-vocabulary learning aid.
//!
//! Drop a photo, and a multimodal Gemini model names the objects in it,
//! complete with phonetics, meanings in the learner's language, and example
//! sentences. The interesting parts live in [`analysis`]: deterministic
//! tiered model selection over the provider's changing catalog, and tolerant
//! structured parsing of the model's not-quite-schema'd JSON replies.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`analysis`] | selection policy, prompts, response parsing, orchestration |
//! | [`gemini`] | REST collaborators: model catalog + multimodal invocation |
//! | [`tts`] | best-effort pronunciation clips |
//! | [`config`] | TOML settings + platform paths |
//! | [`app`] | egui desktop window |

pub mod analysis;
pub mod app;
pub mod config;
pub mod gemini;
pub mod tts;
