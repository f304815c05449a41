//! Tolerant structured parsing of model responses.
//!
//! Gemini is asked for raw JSON but frequently wraps its answer in a fenced
//! code block, pads it with whitespace, or omits optional fields. The parser
//! strips the wrapping artifacts, then performs a *strict* JSON parse of
//! whatever remains — there is no free-text scraping fallback. A response
//! that is not valid JSON after cleanup fails with
//! [`ParseError::Malformed`], carrying the original text so the UI can show
//! what the model actually said.
//!
//! Field handling treats the payload as untrusted input:
//!
//! * missing or non-string optional fields become `""`
//! * a record with a missing or blank `word` is dropped (counted, warned,
//!   never fatal to the batch)
//! * item order is preserved exactly as the model listed it

use serde_json::Value;
use thiserror::Error;

use crate::analysis::result::{AnalysisResult, ResponseShape, ScenarioRecord, VocabularyItem};

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Unrecoverable response-structure failure.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The cleaned text is not the serialized structure the prompt asked for.
    /// `raw` is the unmodified model response, kept for diagnostics.
    #[error("malformed model response: {reason}")]
    Malformed { reason: String, raw: String },
}

impl ParseError {
    fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::Malformed {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// The original model response text, for diagnostics.
    pub fn raw_text(&self) -> &str {
        match self {
            Self::Malformed { raw, .. } => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// ParseReport
// ---------------------------------------------------------------------------

/// A successful parse plus how many records were dropped for lacking a word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// The validated analysis result.
    pub analysis: AnalysisResult,
    /// Number of records dropped because `word` was missing or blank.
    /// A soft warning, not an error.
    pub dropped: usize,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a raw model response into a validated [`ParseReport`].
///
/// # Example
/// ```rust
/// use object_learner::analysis::{parse, ResponseShape};
///
/// let raw = "```json\n[{\"word\":\"cat\",\"sentence\":\"A cat sat.\"}]\n```";
/// let report = parse(raw, ResponseShape::List).unwrap();
/// assert_eq!(report.analysis.vocabulary[0].word, "cat");
/// assert_eq!(report.analysis.vocabulary[0].phonetic, "");
/// ```
pub fn parse(raw: &str, shape: ResponseShape) -> Result<ParseReport, ParseError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ParseError::malformed(format!("not valid JSON: {e}"), raw))?;

    match shape {
        ResponseShape::List => {
            let records = value
                .as_array()
                .ok_or_else(|| ParseError::malformed("expected a JSON array of records", raw))?;
            let (vocabulary, dropped) = map_records(records);
            Ok(ParseReport {
                analysis: AnalysisResult {
                    vocabulary,
                    scenario: None,
                },
                dropped,
            })
        }
        ResponseShape::ObjectWithScenario => {
            let obj = value.as_object().ok_or_else(|| {
                ParseError::malformed("expected a JSON object with a `vocabulary` array", raw)
            })?;
            let records = obj
                .get("vocabulary")
                .and_then(Value::as_array)
                .ok_or_else(|| ParseError::malformed("missing `vocabulary` array", raw))?;
            let (vocabulary, dropped) = map_records(records);

            // Absent scenario fields default to an empty record, never fail.
            let scenario = ScenarioRecord {
                title: string_field(&value, &["scenario_title", "title"]),
                body: string_field(&value, &["scenario_text", "scenario", "story"]),
            };

            Ok(ParseReport {
                analysis: AnalysisResult {
                    vocabulary,
                    scenario: Some(scenario),
                },
                dropped,
            })
        }
    }
}

/// Map raw records into [`VocabularyItem`]s, dropping wordless ones.
fn map_records(records: &[Value]) -> (Vec<VocabularyItem>, usize) {
    let mut vocabulary = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for record in records {
        let word = string_field(record, &["word", "name", "object"]);
        if word.is_empty() {
            dropped += 1;
            continue;
        }
        vocabulary.push(VocabularyItem {
            word,
            phonetic: string_field(record, &["phonetic", "pronunciation", "ipa"]),
            meaning: string_field(record, &["meaning", "translation", "definition"]),
            location: string_field(record, &["location", "position"]),
            sentence: string_field(record, &["sentence", "example_sentence", "example"]),
        });
    }

    if dropped > 0 {
        log::warn!("dropped {dropped} vocabulary record(s) with no word");
    }
    (vocabulary, dropped)
}

/// First matching key with a string value, trimmed; `""` otherwise.
fn string_field(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| record.get(k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Remove three-backtick fence markers that bracket the payload, keeping the
/// interior content. A language tag on the opening fence (```` ```json ````)
/// is removed too. Text without fences is only trimmed.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let inner = match trimmed.rfind("```") {
        Some(end) if end > start => &trimmed[start + 3..end],
        _ => &trimmed[start + 3..],
    };

    let inner = inner.trim_start();
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Fence stripping
    // -----------------------------------------------------------------------

    #[test]
    fn strips_fences_with_language_tag() {
        let raw = "```json\n[{\"word\":\"cat\"}]\n```";
        assert_eq!(strip_code_fences(raw), "[{\"word\":\"cat\"}]");
    }

    #[test]
    fn strips_fences_without_language_tag() {
        let raw = "```\n[1, 2]\n```";
        assert_eq!(strip_code_fences(raw), "[1, 2]");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  [1]  \n"), "[1]");
    }

    #[test]
    fn unterminated_fence_still_yields_payload() {
        let raw = "```json\n[{\"word\":\"cat\"}]";
        assert_eq!(strip_code_fences(raw), "[{\"word\":\"cat\"}]");
    }

    // -----------------------------------------------------------------------
    // List shape
    // -----------------------------------------------------------------------

    #[test]
    fn fenced_single_record_parses() {
        let raw = "```json\n[{\"word\":\"cat\",\"sentence\":\"A cat sat.\"}]\n```";
        let report = parse(raw, ResponseShape::List).expect("parse");

        assert_eq!(report.analysis.vocabulary.len(), 1);
        let item = &report.analysis.vocabulary[0];
        assert_eq!(item.word, "cat");
        assert_eq!(item.phonetic, "");
        assert_eq!(item.sentence, "A cat sat.");
        assert_eq!(report.dropped, 0);
        assert!(report.analysis.scenario.is_none());
    }

    #[test]
    fn missing_optional_fields_become_empty_strings() {
        let raw = r#"[{"word": "lamp"}]"#;
        let report = parse(raw, ResponseShape::List).expect("parse");
        let item = &report.analysis.vocabulary[0];
        assert_eq!(item.word, "lamp");
        assert_eq!(item.meaning, "");
        assert_eq!(item.location, "");
        assert_eq!(item.sentence, "");
    }

    #[test]
    fn wordless_record_is_dropped_and_counted() {
        let raw = r#"[
            {"sentence": "It is red."},
            {"word": "apple", "sentence": "An apple a day."}
        ]"#;
        let report = parse(raw, ResponseShape::List).expect("parse");

        assert_eq!(report.analysis.vocabulary.len(), 1);
        assert_eq!(report.analysis.vocabulary[0].word, "apple");
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn blank_word_counts_as_missing() {
        let raw = r#"[{"word": "   "}, {"word": "chair"}]"#;
        let report = parse(raw, ResponseShape::List).expect("parse");
        assert_eq!(report.analysis.vocabulary.len(), 1);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn source_order_is_preserved() {
        let raw = r#"[{"word":"zebra"},{"word":"apple"},{"word":"mango"}]"#;
        let report = parse(raw, ResponseShape::List).expect("parse");
        let words: Vec<&str> = report
            .analysis
            .vocabulary
            .iter()
            .map(|i| i.word.as_str())
            .collect();
        assert_eq!(words, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn non_string_field_values_are_coerced_to_empty() {
        let raw = r#"[{"word": "clock", "location": 3, "sentence": null}]"#;
        let report = parse(raw, ResponseShape::List).expect("parse");
        let item = &report.analysis.vocabulary[0];
        assert_eq!(item.location, "");
        assert_eq!(item.sentence, "");
    }

    #[test]
    fn alias_keys_are_accepted() {
        let raw = r#"[{"word": "dog", "translation": "perro", "example": "The dog barks."}]"#;
        let report = parse(raw, ResponseShape::List).expect("parse");
        let item = &report.analysis.vocabulary[0];
        assert_eq!(item.meaning, "perro");
        assert_eq!(item.sentence, "The dog barks.");
    }

    // -----------------------------------------------------------------------
    // Malformed input
    // -----------------------------------------------------------------------

    #[test]
    fn conversational_reply_fails_with_raw_text_preserved() {
        let raw = "Sorry, I can't process that.";
        let err = parse(raw, ResponseShape::List).expect_err("must fail");
        assert_eq!(err.raw_text(), raw);
    }

    #[test]
    fn object_for_list_shape_is_malformed() {
        let raw = r#"{"word": "cat"}"#;
        assert!(parse(raw, ResponseShape::List).is_err());
    }

    // -----------------------------------------------------------------------
    // ObjectWithScenario shape
    // -----------------------------------------------------------------------

    #[test]
    fn scenario_fields_are_extracted() {
        let raw = r#"{
            "vocabulary": [{"word": "kettle", "sentence": "The kettle whistles."}],
            "scenario_title": "Morning tea",
            "scenario_text": "The kettle whistles.\nTea is ready."
        }"#;
        let report = parse(raw, ResponseShape::ObjectWithScenario).expect("parse");

        let scenario = report.analysis.scenario.expect("scenario present");
        assert_eq!(scenario.title, "Morning tea");
        assert!(scenario.body.contains('\n'));
        assert_eq!(report.analysis.vocabulary.len(), 1);
    }

    #[test]
    fn absent_scenario_fields_default_to_empty_record() {
        let raw = r#"{"vocabulary": [{"word": "mug"}]}"#;
        let report = parse(raw, ResponseShape::ObjectWithScenario).expect("parse");
        let scenario = report.analysis.scenario.expect("scenario present");
        assert_eq!(scenario, ScenarioRecord::default());
    }

    #[test]
    fn object_without_vocabulary_array_is_malformed() {
        let raw = r#"{"scenario_title": "Oops"}"#;
        assert!(parse(raw, ResponseShape::ObjectWithScenario).is_err());
    }

    #[test]
    fn array_for_object_shape_is_malformed() {
        let raw = r#"[{"word": "cat"}]"#;
        assert!(parse(raw, ResponseShape::ObjectWithScenario).is_err());
    }
}
