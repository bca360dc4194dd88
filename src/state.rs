//! Application state: configured content sources.
//!
//! This module owns:
//!   - the optional OpenAI-backed primary source (env-gated)
//!   - the static fallback source (shipped banks + sanitized config banks)
//!
//! Everything is built once at startup and read-only afterwards; the pipeline
//! itself is stateless per request, so no synchronization is needed.

use tracing::{info, instrument};

use crate::config::load_agent_config_from_env;
use crate::fallback::StaticChunkSource;
use crate::openai::OpenAiChunkSource;

pub struct AppState {
    pub openai: Option<OpenAiChunkSource>,
    pub fallback: StaticChunkSource,
}

impl AppState {
    /// Build state from env: load config, merge fallback banks, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional fallback banks).
        let cfg = load_agent_config_from_env().unwrap_or_default();

        let fallback = StaticChunkSource::with_config_banks(&cfg.fallback_banks);

        // Build optional OpenAI client (if API key present).
        let openai = OpenAiChunkSource::from_env(cfg.prompts);
        if let Some(oa) = &openai {
            info!(target: "wordgarden_backend", base_url = %oa.base_url(), model = %oa.content_model(), "OpenAI enabled.");
        } else {
            info!(target: "wordgarden_backend", "OpenAI disabled (no OPENAI_API_KEY). Every lesson will use the fallback banks.");
        }

        Self { openai, fallback }
    }
}
