//! Prompt builder for the image-analysis request.
//!
//! Two prompt flavours, one per [`ResponseShape`]:
//! * **Vocabulary list** — identify the main objects and return a JSON array
//!   of vocabulary records.
//! * **Scenario** — the same vocabulary wrapped in an object together with a
//!   short narrative that uses the words.
//!
//! Both insist on raw JSON output; the parser still strips code fences
//! because models wrap their answer in one anyway more often than not.

use crate::analysis::result::ResponseShape;

// ---------------------------------------------------------------------------
// Instruction templates
// ---------------------------------------------------------------------------

const VOCABULARY_INSTRUCTION: &str = "\
You are an English vocabulary tutor. Analyze this photo.

Identify the main objects visible in the photo. For each object provide:
- \"word\": its English name
- \"phonetic\": IPA transcription, e.g. /kaet/
- \"meaning\": a short meaning or translation in {language}
- \"location\": where the object appears in the photo
- \"sentence\": one simple English example sentence using the word

Reply with ONLY a JSON array of these records, in the order the objects
catch the eye. No markdown, no code fences, no commentary.";

const SCENARIO_INSTRUCTION: &str = "\
Additionally, write a short everyday scenario (3-5 sentences) that uses the
words naturally, so the learner sees them in context.

Reply with ONLY a JSON object of this form, no markdown, no commentary:
{\"vocabulary\": [records as above], \"scenario_title\": \"...\", \"scenario_text\": \"...\"}";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds the analysis prompt for a given learner language.
///
/// # Example
/// ```rust
/// use object_learner::analysis::{PromptBuilder, ResponseShape};
///
/// let builder = PromptBuilder::new("Chinese");
/// let prompt = builder.build(ResponseShape::List);
/// assert!(prompt.contains("Chinese"));
/// ```
pub struct PromptBuilder {
    /// Learner's native language, spelled out in English (e.g. "Chinese",
    /// "Spanish"); the model writes the `meaning` field in it.
    learner_language: String,
}

impl PromptBuilder {
    pub fn new(learner_language: &str) -> Self {
        Self {
            learner_language: learner_language.to_string(),
        }
    }

    /// Build the full prompt text for `shape`.
    pub fn build(&self, shape: ResponseShape) -> String {
        let base = VOCABULARY_INSTRUCTION.replace("{language}", &self.learner_language);
        match shape {
            ResponseShape::List => base,
            ResponseShape::ObjectWithScenario => format!("{base}\n\n{SCENARIO_INSTRUCTION}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_prompt_names_every_field() {
        let prompt = PromptBuilder::new("Chinese").build(ResponseShape::List);

        for field in ["\"word\"", "\"phonetic\"", "\"meaning\"", "\"location\"", "\"sentence\""] {
            assert!(prompt.contains(field), "prompt must mention {field}");
        }
        assert!(prompt.contains("JSON array"), "prompt must demand a JSON array");
    }

    #[test]
    fn learner_language_is_embedded() {
        let prompt = PromptBuilder::new("Spanish").build(ResponseShape::List);
        assert!(prompt.contains("Spanish"));
        assert!(!prompt.contains("{language}"), "placeholder must be substituted");
    }

    #[test]
    fn list_prompt_has_no_scenario_section() {
        let prompt = PromptBuilder::new("Chinese").build(ResponseShape::List);
        assert!(!prompt.contains("scenario_title"));
    }

    #[test]
    fn scenario_prompt_extends_the_list_prompt() {
        let builder = PromptBuilder::new("Chinese");
        let list = builder.build(ResponseShape::List);
        let scenario = builder.build(ResponseShape::ObjectWithScenario);

        assert!(scenario.starts_with(&list));
        assert!(scenario.contains("\"vocabulary\""));
        assert!(scenario.contains("scenario_title"));
        assert!(scenario.contains("scenario_text"));
    }

    #[test]
    fn both_prompts_forbid_markdown() {
        let builder = PromptBuilder::new("Chinese");
        for shape in [ResponseShape::List, ResponseShape::ObjectWithScenario] {
            assert!(builder.build(shape).contains("no markdown"));
        }
    }
}
