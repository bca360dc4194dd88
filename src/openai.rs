//! Minimal OpenAI client backing the primary content source.
//!
//! We only call chat.completions and request a strict JSON array of chunk
//! objects. The response is treated as untrusted text: fences are stripped,
//! both bare-array and `{"chunks": [...]}` shapes are accepted, and every
//! chunk passes the per-chunk contract before it is used. Calls are
//! instrumented and log model names, latencies, and response sizes (not
//! contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to
//! avoid leaking learner data.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::{ChunkContent, ContentSource, LessonRequest, RawChunk};
use crate::error::ContentSourceError;
use crate::util::{fill_template, strip_code_fences, trunc_for_log};

/// AI-backed chunk source. Present only when OPENAI_API_KEY is set; the
/// orchestrator treats its absence as an immediate fallback transition.
#[derive(Clone)]
pub struct OpenAiChunkSource {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  content_model: String,
  prompts: Prompts,
}

impl OpenAiChunkSource {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(prompts: Prompts) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let content_model =
      std::env::var("OPENAI_CONTENT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, content_model, prompts })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn content_model(&self) -> &str {
    &self.content_model
  }

  /// Raw chat completion returning the assistant text.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.content_model))]
  async fn chat_raw(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<String, ContentSourceError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.content_model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "wordgarden-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| ContentSourceError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(ContentSourceError::Http { status, message });
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| ContentSourceError::Parse(format!("completion body: {e}")))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    Ok(text)
  }
}

impl ContentSource for OpenAiChunkSource {
  fn name(&self) -> &'static str {
    "openai"
  }

  /// Request exactly N chunks; keep whatever survives the per-chunk contract.
  /// Fails only when the transport/parse fails or zero chunks survive.
  async fn fetch_chunks(&self, req: &LessonRequest) -> Result<Vec<ChunkContent>, ContentSourceError> {
    let count = req.chunk_count();
    let count_str = count.to_string();
    let interests = req.interests.join(", ");
    let seen = req.already_seen_phrases.join(", ");
    let user = fill_template(
      &self.prompts.chunk_user_template,
      &[
        ("count", count_str.as_str()),
        ("target", req.target_language_code.as_str()),
        ("native", req.native_language_code.as_str()),
        ("topic", req.topic.as_str()),
        ("age_band", req.age_band.as_str()),
        ("interests", interests.as_str()),
        ("seen", seen.as_str()),
      ],
    );

    let start = std::time::Instant::now();
    let text = self.chat_raw(&self.prompts.chunk_system, &user, 0.9).await;
    let elapsed = start.elapsed();
    let text = match text {
      Ok(t) => {
        info!(?elapsed, response_len = t.len(), "Chunk generation response received");
        t
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Chunk generation call failed");
        return Err(e);
      }
    };

    let raws = parse_chunk_batch(&text)?;
    let (mut chunks, discarded) = sanitize_batch(raws);
    if chunks.is_empty() {
      return Err(ContentSourceError::EmptyBatch { discarded });
    }
    if discarded > 0 {
      warn!(target: "lesson", discarded, kept = chunks.len(), "Discarded malformed chunks from model output");
    }
    // We asked for exactly N; drop any extras the model volunteered.
    chunks.truncate(count);
    Ok(chunks)
  }
}

/// Parse untrusted model text into raw chunk records.
/// Accepts a bare JSON array or an object wrapping a `chunks` field, with or
/// without surrounding markdown fences.
pub fn parse_chunk_batch(text: &str) -> Result<Vec<RawChunk>, ContentSourceError> {
  let cleaned = strip_code_fences(text);
  let value: serde_json::Value = serde_json::from_str(&cleaned)
    .map_err(|e| ContentSourceError::Parse(format!("chunk batch: {e}")))?;

  let array = match value {
    serde_json::Value::Array(items) => items,
    serde_json::Value::Object(mut map) => match map.remove("chunks") {
      Some(serde_json::Value::Array(items)) => items,
      _ => {
        return Err(ContentSourceError::Parse(
          "chunk batch: expected an array or an object with a chunks array".into(),
        ))
      }
    },
    _ => return Err(ContentSourceError::Parse("chunk batch: expected a JSON array".into())),
  };

  array
    .into_iter()
    .map(|item| {
      serde_json::from_value::<RawChunk>(item)
        .map_err(|e| ContentSourceError::Parse(format!("chunk record: {e}")))
    })
    .collect()
}

/// Apply the per-chunk contract; malformed chunks are discarded individually,
/// not the whole batch. Returns survivors plus the discard count.
pub fn sanitize_batch(raws: Vec<RawChunk>) -> (Vec<ChunkContent>, usize) {
  let mut chunks = Vec::with_capacity(raws.len());
  let mut discarded = 0usize;
  for (idx, raw) in raws.into_iter().enumerate() {
    match ChunkContent::from_untrusted(raw) {
      Ok(chunk) => chunks.push(chunk),
      Err(reason) => {
        discarded += 1;
        warn!(target: "lesson", idx, %reason, "Discarding chunk from model output");
      }
    }
  }
  (chunks, discarded)
}

// --- Chat DTOs ---

// JSON-object response mode is deliberately not requested: the chunk contract
// is a bare array, which that mode cannot produce.
#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ONE_CHUNK: &str = r#"{
    "targetPhrase": "Hallo",
    "nativeTranslation": "Hello",
    "exampleSentence": "Hallo, Anna!",
    "usageNote": "Casual greeting.",
    "explanation": "Everyday hello.",
    "distractors": ["Goodbye", "Thank you", "Sorry"],
    "correctUsageContext": "Meeting a friend",
    "wrongUsageContexts": ["Leaving a party", "Ordering food", "Going to bed"]
  }"#;

  #[test]
  fn parses_bare_array() {
    let raws = parse_chunk_batch(&format!("[{ONE_CHUNK}]")).expect("parse");
    assert_eq!(raws.len(), 1);
    assert_eq!(raws[0].target_phrase, "Hallo");
  }

  #[test]
  fn parses_fenced_chunks_wrapper() {
    let text = format!("```json\n{{\"chunks\": [{ONE_CHUNK}]}}\n```");
    let raws = parse_chunk_batch(&text).expect("parse");
    assert_eq!(raws.len(), 1);
  }

  #[test]
  fn rejects_non_batch_shapes() {
    assert!(parse_chunk_batch("not json at all").is_err());
    assert!(parse_chunk_batch("{\"data\": []}").is_err());
    assert!(parse_chunk_batch("42").is_err());
  }

  #[test]
  fn unknown_fields_are_tolerated_per_record() {
    let text = format!("[{}]", ONE_CHUNK.replacen('{', "{\"model_mood\": \"chipper\",", 1));
    let raws = parse_chunk_batch(&text).expect("parse");
    assert_eq!(raws[0].native_translation, "Hello");
  }

  #[test]
  fn sanitize_discards_per_chunk_not_per_batch() {
    let good: RawChunk = serde_json::from_str(ONE_CHUNK).expect("raw");
    let mut bad = good.clone();
    bad.distractors.pop();
    let (chunks, discarded) = sanitize_batch(vec![good, bad]);
    assert_eq!(chunks.len(), 1);
    assert_eq!(discarded, 1);
  }
}
