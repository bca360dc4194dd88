//! Domain models used by the backend: taught chunks, lesson activities, steps,
//! plans, and the content-source contract.
//!
//! `ChunkContent` is created once per request by a content source and never
//! mutated afterwards. `LessonPlan` is immutable once assembled; the validator
//! only inspects it.

use serde::{Deserialize, Serialize};

use crate::error::ContentSourceError;

/// Marker placed in a fill-blank sentence where the learner types the answer.
pub const BLANK_MARKER: &str = "___";

/// Where did the lesson's chunk content come from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
  Generated, // produced by the AI source for this request
  Fallback,  // shipped, hand-authored bank
}

/// One taught phrase with everything needed to introduce and quiz it.
/// All strings are non-empty after trimming; both option arrays hold exactly
/// three entries in the learner's native language.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkContent {
  pub target_phrase: String,
  pub native_translation: String,
  pub example_sentence: String,
  pub usage_note: String,
  pub explanation: String,
  pub distractors: Vec<String>,
  pub correct_usage_context: String,
  pub wrong_usage_contexts: Vec<String>,
}

/// Loosely-typed chunk record as received from untrusted model output or
/// operator-supplied TOML. Promoted to [`ChunkContent`] via
/// [`ChunkContent::from_untrusted`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawChunk {
  pub target_phrase: String,
  pub native_translation: String,
  pub example_sentence: String,
  pub usage_note: String,
  pub explanation: String,
  pub distractors: Vec<String>,
  pub correct_usage_context: String,
  pub wrong_usage_contexts: Vec<String>,
}

impl ChunkContent {
  /// Promote an untrusted record, enforcing the chunk contract.
  ///
  /// Core fields must be present; `distractors`/`wrongUsageContexts` must have
  /// exactly three non-empty entries, none equal to the canonical answer
  /// (compared trimmed, case-insensitive). Violations reject the chunk with a
  /// reason suitable for logging. The descriptive fields (`exampleSentence`,
  /// `usageNote`, `explanation`) are optional and synthesized from the target
  /// phrase when missing, never rejected.
  pub fn from_untrusted(raw: RawChunk) -> Result<Self, String> {
    let target_phrase = required(&raw.target_phrase, "targetPhrase")?;
    let native_translation = required(&raw.native_translation, "nativeTranslation")?;
    let correct_usage_context = required(&raw.correct_usage_context, "correctUsageContext")?;

    let distractors = fixed_options(&raw.distractors, &native_translation, "distractors")?;
    let wrong_usage_contexts =
      fixed_options(&raw.wrong_usage_contexts, &correct_usage_context, "wrongUsageContexts")?;

    let example_sentence = non_empty(&raw.example_sentence).unwrap_or_else(|| target_phrase.clone());
    let usage_note = non_empty(&raw.usage_note)
      .unwrap_or_else(|| format!("Use \"{}\" in everyday conversation.", target_phrase));
    let explanation = non_empty(&raw.explanation)
      .unwrap_or_else(|| format!("\"{}\" means \"{}\".", target_phrase, native_translation));

    Ok(Self {
      target_phrase,
      native_translation,
      example_sentence,
      usage_note,
      explanation,
      distractors,
      correct_usage_context,
      wrong_usage_contexts,
    })
  }
}

fn required(s: &str, field: &str) -> Result<String, String> {
  non_empty(s).ok_or_else(|| format!("missing {field}"))
}

fn non_empty(s: &str) -> Option<String> {
  let t = s.trim();
  if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Exactly three trimmed, non-empty entries, none colliding with the canonical
/// answer. Never padded or truncated to fit.
fn fixed_options(raw: &[String], canonical: &str, field: &str) -> Result<Vec<String>, String> {
  if raw.len() != 3 {
    return Err(format!("{field} must have exactly 3 entries, got {}", raw.len()));
  }
  let mut out = Vec::with_capacity(3);
  for entry in raw {
    let t = entry.trim();
    if t.is_empty() {
      return Err(format!("{field} contains an empty entry"));
    }
    if t.eq_ignore_ascii_case(canonical.trim()) {
      return Err(format!("{field} entry duplicates the correct answer"));
    }
    out.push(t.to_string());
  }
  Ok(out)
}

/// Request-scoped aggregate handed to the assembler: 2–4 independent chunks
/// plus the lesson framing. Chunks never reference each other.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonContent {
  pub title: String,
  pub target_language_code: String,
  pub native_language_code: String,
  pub chunks: Vec<ChunkContent>,
}

/// A single interactive activity with its reward. The payload is a genuine
/// tagged union so "required fields per type" is structural, not optional
/// soup. `reward` is validated into [0,4] by the validator, not the type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Activity {
  pub reward: i32,
  #[serde(flatten)]
  pub kind: ActivityKind,
}

/// One matching pair (target-language side, native side).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchPair {
  pub left: String,
  pub right: String,
}

/// The seven renderable activity payloads.
///
/// Presence-checkable scalars (`correct_index`, `is_true`) are `Option` so a
/// plan deserialized from stored or external JSON can be missing them and the
/// validator can say so, instead of serde inventing a zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
  #[serde(rename_all = "camelCase")]
  Info {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    example: String,
  },
  #[serde(rename_all = "camelCase")]
  MultipleChoice {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_index: Option<usize>,
  },
  #[serde(rename_all = "camelCase")]
  FillBlank {
    #[serde(default)]
    sentence: String,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    accepted_answers: Vec<String>,
  },
  #[serde(rename_all = "camelCase")]
  Translate {
    #[serde(default)]
    source_phrase: String,
    #[serde(default)]
    accepted_answers: Vec<String>,
    #[serde(default)]
    hint: String,
  },
  #[serde(rename_all = "camelCase")]
  TrueFalse {
    #[serde(default)]
    statement: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    is_true: Option<bool>,
  },
  #[serde(rename_all = "camelCase")]
  Matching {
    #[serde(default)]
    pairs: Vec<MatchPair>,
  },
  #[serde(rename_all = "camelCase")]
  WordArrange {
    #[serde(default)]
    target_sentence: String,
    #[serde(default)]
    scrambled_words: Vec<String>,
  },
}

impl ActivityKind {
  /// Stable name used in validator messages and logs.
  pub fn type_name(&self) -> &'static str {
    match self {
      ActivityKind::Info { .. } => "info",
      ActivityKind::MultipleChoice { .. } => "multiple_choice",
      ActivityKind::FillBlank { .. } => "fill_blank",
      ActivityKind::Translate { .. } => "translate",
      ActivityKind::TrueFalse { .. } => "true_false",
      ActivityKind::Matching { .. } => "matching",
      ActivityKind::WordArrange { .. } => "word_arrange",
    }
  }

  pub fn is_info(&self) -> bool {
    matches!(self, ActivityKind::Info { .. })
  }
}

/// One lesson screen: what the tutor says, optional help, and the activity.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStep {
  pub tutor_text: String,
  pub help_text: String,
  pub activity: Activity,
}

/// Aggregate root handed to the renderer. Immutable once produced; the only
/// retry point in the pipeline discards a whole plan and regenerates from a
/// different source, never repairs one in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
  pub id: String,
  pub title: String,
  pub steps: Vec<LessonStep>,
  pub total_reward: i32,
}

/// Inbound lesson-open request from the (external) caller.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
  pub topic: String,
  pub target_language_code: String,
  pub native_language_code: String,
  #[serde(default = "default_chunk_count")]
  pub desired_chunk_count: u8,
  #[serde(default)]
  pub age_band: String,
  #[serde(default)]
  pub interests: Vec<String>,
  #[serde(default)]
  pub already_seen_phrases: Vec<String>,
}

fn default_chunk_count() -> u8 {
  3
}

impl LessonRequest {
  /// Requested chunk count clamped to the supported [2,4] range.
  pub fn chunk_count(&self) -> usize {
    self.desired_chunk_count.clamp(2, 4) as usize
  }
}

/// Generation metadata returned next to the plan.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMeta {
  pub source: SourceKind,
  pub used_fallback: bool,
  pub generation_latency_ms: u64,
  pub warnings: Vec<String>,
}

/// Any producer of chunk content, AI-backed or static, behind one interface.
/// The assembler and validator never see this trait; only the orchestrator
/// talks to sources.
pub trait ContentSource {
  /// Short name for logs ("openai", "static").
  fn name(&self) -> &'static str;

  /// Produce chunk records for the request. The static implementation never
  /// fails; the AI-backed one fails on transport/parse/empty-batch.
  fn fetch_chunks(
    &self,
    req: &LessonRequest,
  ) -> impl std::future::Future<Output = Result<Vec<ChunkContent>, ContentSourceError>> + Send;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw_ok() -> RawChunk {
    RawChunk {
      target_phrase: "Hallo".into(),
      native_translation: "Hello".into(),
      example_sentence: "Hallo, wie geht's?".into(),
      usage_note: "Casual greeting.".into(),
      explanation: "The everyday German hello.".into(),
      distractors: vec!["Goodbye".into(), "Thank you".into(), "Sorry".into()],
      correct_usage_context: "Meeting a friend".into(),
      wrong_usage_contexts: vec!["Leaving a party".into(), "Ordering food".into(), "Going to bed".into()],
    }
  }

  #[test]
  fn promotes_complete_chunk() {
    let c = ChunkContent::from_untrusted(raw_ok()).expect("valid chunk");
    assert_eq!(c.target_phrase, "Hallo");
    assert_eq!(c.distractors.len(), 3);
  }

  #[test]
  fn synthesizes_optional_descriptive_fields() {
    let mut raw = raw_ok();
    raw.example_sentence = String::new();
    raw.usage_note = "   ".into();
    raw.explanation = String::new();
    let c = ChunkContent::from_untrusted(raw).expect("valid chunk");
    assert_eq!(c.example_sentence, "Hallo");
    assert!(c.usage_note.contains("Hallo"));
    assert!(c.explanation.contains("Hello"));
  }

  #[test]
  fn rejects_wrong_length_option_arrays() {
    let mut raw = raw_ok();
    raw.distractors.pop();
    let err = ChunkContent::from_untrusted(raw).unwrap_err();
    assert!(err.contains("exactly 3"));
  }

  #[test]
  fn rejects_distractor_equal_to_translation() {
    let mut raw = raw_ok();
    raw.distractors[1] = " hello ".into();
    let err = ChunkContent::from_untrusted(raw).unwrap_err();
    assert!(err.contains("duplicates"));
  }

  #[test]
  fn rejects_missing_core_field() {
    let mut raw = raw_ok();
    raw.native_translation = "  ".into();
    assert!(ChunkContent::from_untrusted(raw).is_err());
  }

  #[test]
  fn chunk_count_is_clamped() {
    let mut req = LessonRequest {
      topic: "greetings".into(),
      target_language_code: "de".into(),
      native_language_code: "en".into(),
      desired_chunk_count: 9,
      age_band: String::new(),
      interests: vec![],
      already_seen_phrases: vec![],
    };
    assert_eq!(req.chunk_count(), 4);
    req.desired_chunk_count = 0;
    assert_eq!(req.chunk_count(), 2);
  }
}
