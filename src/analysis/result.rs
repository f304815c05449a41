//! Data types produced by image analysis.
//!
//! Everything here is plain owned data: a result is created once per analyze
//! cycle, handed to the UI, and dropped. Nothing is cached across requests.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VocabularyItem
// ---------------------------------------------------------------------------

/// One object identified in the photo, with its learning material.
///
/// Only `word` is mandatory; every other field defaults to an empty string
/// when the model omits it. The parser enforces the non-empty-word invariant
/// and drops records that violate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// English name of the object (non-empty after trimming).
    pub word: String,
    /// IPA-style phonetic transcription, e.g. `/kæt/`. Empty when unknown.
    pub phonetic: String,
    /// Meaning or translation in the learner's native language.
    pub meaning: String,
    /// Where the object appears in the photo (e.g. "bottom left").
    pub location: String,
    /// A short example sentence using the word.
    pub sentence: String,
}

// ---------------------------------------------------------------------------
// ScenarioRecord
// ---------------------------------------------------------------------------

/// A short narrative built from the vocabulary, returned by the richer
/// scenario-mode prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Title of the scenario.
    pub title: String,
    /// Narrative text; may contain embedded line breaks.
    pub body: String,
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// The validated outcome of one analyze cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Vocabulary items in the order the model listed them.
    pub vocabulary: Vec<VocabularyItem>,
    /// Present only when the request used [`ResponseShape::ObjectWithScenario`].
    pub scenario: Option<ScenarioRecord>,
}

// ---------------------------------------------------------------------------
// ResponseShape
// ---------------------------------------------------------------------------

/// Which serialized structure the model was asked to produce.
///
/// | Variant | Expected payload |
/// |---------|------------------|
/// | `List` | JSON array of vocabulary records |
/// | `ObjectWithScenario` | JSON object: `vocabulary` array + optional `scenario_title` / `scenario_text` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseShape {
    /// A bare vocabulary list.
    List,
    /// Vocabulary plus a scenario narrative.
    ObjectWithScenario,
}
