//! Loading agent configuration (prompts + optional fallback banks) from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::RawChunk;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub fallback_banks: Vec<FallbackBankCfg>,
}

/// Operator-supplied fallback bank for one language pair. Chunks use the same
/// field names as the AI contract and pass the same per-chunk sanitization at
/// load time; bad entries are skipped, never served.
#[derive(Clone, Debug, Deserialize)]
pub struct FallbackBankCfg {
  pub target_language_code: String,
  pub native_language_code: String,
  #[serde(default)]
  pub chunks: Vec<RawChunk>,
}

/// Prompts used by the AI content source. Defaults are sensible for young
/// learners; override them in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub chunk_system: String,
  pub chunk_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      chunk_system: "You are a language-lesson content generator for young learners. \
        Respond ONLY with strict JSON: a bare array of chunk objects, no prose, no markdown."
        .into(),
      chunk_user_template: "Generate exactly {count} lexical chunks teaching {target} to a \
        {native}-speaking learner. Topic: {topic}. Age band: {age_band}. Interests: {interests}. \
        Do not reuse these phrases: {seen}.\n\
        Each array element must have: targetPhrase, nativeTranslation, exampleSentence, \
        usageNote, explanation, distractors (exactly 3 plausible-but-wrong translations in the \
        native language), correctUsageContext, wrongUsageContexts (exactly 3, in the native \
        language). Keep phrases short and natural."
        .into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "wordgarden_backend", %path, banks = cfg.fallback_banks.len(), "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "wordgarden_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "wordgarden_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallback_banks_parse_from_toml() {
    let cfg: AgentConfig = toml::from_str(
      r#"
      [[fallback_banks]]
      target_language_code = "it"
      native_language_code = "en"

      [[fallback_banks.chunks]]
      targetPhrase = "Ciao"
      nativeTranslation = "Hi"
      distractors = ["Bye", "Thanks", "Sorry"]
      correctUsageContext = "Meeting a classmate"
      wrongUsageContexts = ["Ending a call", "Ordering pizza", "Going to sleep"]
      "#,
    )
    .expect("parse");
    assert_eq!(cfg.fallback_banks.len(), 1);
    assert_eq!(cfg.fallback_banks[0].chunks[0].target_phrase, "Ciao");
    // Prompts fall back to defaults when the table is absent.
    assert!(cfg.prompts.chunk_system.contains("strict JSON"));
  }
}
