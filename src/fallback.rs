//! Shipped fallback content: hand-authored chunk banks per language pair.
//!
//! This source can never fail and its data ships pre-validated (the tests
//! below assemble and validate every bank). An ultra-generic one-chunk set
//! covers language pairs we have no bank for, so the app stays useful even
//! when the AI source is down and the pair is exotic.

use std::collections::HashMap;

use tracing::{error, info};

use crate::config::FallbackBankCfg;
use crate::domain::{ChunkContent, ContentSource, LessonRequest};
use crate::error::ContentSourceError;

macro_rules! chunk {
  ($phrase:expr, $native:expr, $example:expr, $note:expr, $explain:expr,
   [$d1:expr, $d2:expr, $d3:expr], $ctx:expr, [$w1:expr, $w2:expr, $w3:expr]) => {
    ChunkContent {
      target_phrase: $phrase.into(),
      native_translation: $native.into(),
      example_sentence: $example.into(),
      usage_note: $note.into(),
      explanation: $explain.into(),
      distractors: vec![$d1.into(), $d2.into(), $d3.into()],
      correct_usage_context: $ctx.into(),
      wrong_usage_contexts: vec![$w1.into(), $w2.into(), $w3.into()],
    }
  };
}

fn bank_de_en() -> Vec<ChunkContent> {
  vec![
    chunk!(
      "Hallo", "Hello", "Hallo, Anna! Wie geht's?",
      "The all-purpose casual greeting.",
      "\"Hallo\" is the everyday German hello, fine at any time of day.",
      ["Goodbye", "Thank you", "Sorry"],
      "Meeting a friend",
      ["Leaving a party", "Ordering food", "Going to bed"]
    ),
    chunk!(
      "Danke schön", "Thank you very much", "Danke schön für die Blumen!",
      "A warm, slightly formal thank-you.",
      "\"Danke schön\" adds warmth to a plain \"danke\".",
      ["You're welcome", "Excuse me", "Good morning"],
      "Receiving a gift",
      ["Greeting a stranger", "Asking for directions", "Saying goodnight"]
    ),
    chunk!(
      "Tschüss", "Bye", "Tschüss, bis morgen!",
      "Casual goodbye among friends.",
      "\"Tschüss\" is the relaxed way to part; save \"Auf Wiedersehen\" for formal settings.",
      ["Hello", "Please", "Cheers"],
      "Leaving a friend's house",
      ["Answering the phone", "Starting a meal", "Meeting someone new"]
    ),
  ]
}

fn bank_es_en() -> Vec<ChunkContent> {
  vec![
    chunk!(
      "Hola", "Hello", "¡Hola! ¿Qué tal?",
      "Works everywhere, at any hour.",
      "\"Hola\" is the universal Spanish greeting.",
      ["Goodbye", "Please", "Sorry"],
      "Greeting a neighbor",
      ["Leaving a shop", "Going to sleep", "Apologizing for a mistake"]
    ),
    chunk!(
      "Gracias", "Thank you", "Gracias por tu ayuda.",
      "The everyday thank-you.",
      "\"Gracias\" covers nearly every thank-you moment.",
      ["Hello", "Excuse me", "Goodbye"],
      "Someone holds the door for you",
      ["Greeting your teacher", "Ordering dessert", "Waving goodbye"]
    ),
    chunk!(
      "Por favor", "Please", "Una limonada, por favor.",
      "Attach it to any request.",
      "\"Por favor\" turns an order into a polite request.",
      ["Thank you", "You're welcome", "Good night"],
      "Asking for something at a café",
      ["Answering a question", "Saying hello", "Leaving a party"]
    ),
  ]
}

fn bank_fr_en() -> Vec<ChunkContent> {
  vec![
    chunk!(
      "Bonjour", "Hello", "Bonjour, madame!",
      "The polite daytime greeting.",
      "\"Bonjour\" literally means \"good day\" and opens almost every exchange.",
      ["Goodbye", "Thank you", "Good night"],
      "Entering a bakery",
      ["Leaving a restaurant", "Going to bed", "Thanking a friend"]
    ),
    chunk!(
      "Merci beaucoup", "Thank you very much", "Merci beaucoup pour le cadeau!",
      "A heartfelt thank-you.",
      "\"Merci beaucoup\" strengthens a plain \"merci\".",
      ["You're welcome", "Hello", "See you soon"],
      "Receiving help with your bags",
      ["Greeting a shopkeeper", "Asking the time", "Saying goodbye"]
    ),
  ]
}

/// Last-resort set for unknown language pairs. Deliberately tiny and
/// language-neutral.
fn bank_generic() -> Vec<ChunkContent> {
  vec![chunk!(
    "OK", "Okay", "OK, let's go!",
    "Understood around the world.",
    "\"OK\" signals agreement in almost every language.",
    ["No", "Maybe", "Never"],
    "Agreeing to a plan",
    ["Refusing an offer", "Asking a question", "Saying farewell"]
  )]
}

/// Static, infallible chunk source backed by the shipped banks plus any
/// sanitized operator-supplied banks from TOML config.
pub struct StaticChunkSource {
  banks: HashMap<(String, String), Vec<ChunkContent>>,
  generic: Vec<ChunkContent>,
}

impl StaticChunkSource {
  /// Built-in banks only.
  pub fn shipped() -> Self {
    let mut banks = HashMap::new();
    banks.insert(key("de", "en"), bank_de_en());
    banks.insert(key("es", "en"), bank_es_en());
    banks.insert(key("fr", "en"), bank_fr_en());
    Self { banks, generic: bank_generic() }
  }

  /// Built-in banks merged with operator-supplied ones. Config chunks pass
  /// the same per-chunk contract as AI chunks; rejects are logged and
  /// skipped so this source stays infallible regardless of config quality.
  pub fn with_config_banks(extra: &[FallbackBankCfg]) -> Self {
    let mut source = Self::shipped();
    for bank in extra {
      let k = key(&bank.target_language_code, &bank.native_language_code);
      let mut accepted = Vec::new();
      for (idx, raw) in bank.chunks.iter().cloned().enumerate() {
        match ChunkContent::from_untrusted(raw) {
          Ok(chunk) => accepted.push(chunk),
          Err(reason) => {
            error!(target: "lesson", pair = %format!("{}-{}", k.0, k.1), idx, %reason, "Skipping config bank chunk");
          }
        }
      }
      if accepted.is_empty() {
        continue;
      }
      source.banks.entry(k).or_default().extend(accepted);
    }
    for ((target, native), chunks) in &source.banks {
      info!(target: "lesson", pair = %format!("{target}-{native}"), count = chunks.len(), "Fallback bank ready");
    }
    source
  }

  fn bank_for(&self, target_lang: &str, native_lang: &str) -> &[ChunkContent] {
    self
      .banks
      .get(&key(target_lang, native_lang))
      .map(|v| v.as_slice())
      .unwrap_or(&self.generic)
  }
}

fn key(target_lang: &str, native_lang: &str) -> (String, String) {
  (target_lang.trim().to_lowercase(), native_lang.trim().to_lowercase())
}

impl ContentSource for StaticChunkSource {
  fn name(&self) -> &'static str {
    "static"
  }

  /// Pure in-process lookup; always succeeds. Serves the first N chunks of
  /// the bank (or the whole bank when smaller than the request).
  async fn fetch_chunks(&self, req: &LessonRequest) -> Result<Vec<ChunkContent>, ContentSourceError> {
    let bank = self.bank_for(&req.target_language_code, &req.native_language_code);
    // Banks are never empty, so this always yields at least one chunk.
    let take = req.chunk_count().min(bank.len());
    Ok(bank.iter().take(take).cloned().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assembler::assemble;
  use crate::domain::LessonContent;
  use crate::validator::validate;

  fn request(target: &str, native: &str) -> LessonRequest {
    LessonRequest {
      topic: "greetings".into(),
      target_language_code: target.into(),
      native_language_code: native.into(),
      desired_chunk_count: 3,
      age_band: String::new(),
      interests: vec![],
      already_seen_phrases: vec![],
    }
  }

  #[test]
  fn every_shipped_bank_assembles_into_a_valid_plan() {
    let source = StaticChunkSource::shipped();
    let mut all: Vec<(String, Vec<ChunkContent>)> = source
      .banks
      .iter()
      .map(|((t, n), c)| (format!("{t}-{n}"), c.clone()))
      .collect();
    all.push(("generic".into(), source.generic.clone()));

    for (pair, chunks) in all {
      let content = LessonContent {
        title: format!("Fallback {pair}"),
        target_language_code: "xx".into(),
        native_language_code: "en".into(),
        chunks,
      };
      let report = validate(&assemble(&content));
      assert!(report.is_valid(), "bank {pair} failed: {:?}", report.errors);
    }
  }

  #[tokio::test]
  async fn unknown_pair_gets_the_generic_set() {
    let source = StaticChunkSource::shipped();
    let chunks = source.fetch_chunks(&request("fi", "ja")).await.expect("infallible");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].target_phrase, "OK");
  }

  #[tokio::test]
  async fn known_pair_serves_requested_count_case_insensitively() {
    let source = StaticChunkSource::shipped();
    let mut req = request("DE", "EN");
    req.desired_chunk_count = 2;
    let chunks = source.fetch_chunks(&req).await.expect("infallible");
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].target_phrase, "Hallo");
  }

  #[test]
  fn invalid_config_chunks_are_skipped_not_fatal() {
    use crate::domain::RawChunk;
    let cfg = FallbackBankCfg {
      target_language_code: "it".into(),
      native_language_code: "en".into(),
      chunks: vec![RawChunk {
        target_phrase: "Ciao".into(),
        native_translation: "Hi".into(),
        distractors: vec!["Bye".into()], // incomplete chunk, must be skipped
        ..Default::default()
      }],
    };
    let source = StaticChunkSource::with_config_banks(&[cfg]);
    // Nothing usable arrived for it-en, so the pair falls through to generic.
    assert!(source.banks.get(&key("it", "en")).is_none());
  }
}
