//! Error types for the lesson pipeline.
//!
//! Three kinds exist, with strictly widening blast radius:
//! - [`ContentSourceError`]: the primary source failed to deliver usable
//!   chunks. Always recoverable by switching to the fallback source.
//! - Blocking validation errors: carried as plain strings inside
//!   `validator::ValidationReport`, recoverable only by switching source.
//! - [`PipelineError`]: both paths produced an invalid plan. Not recoverable
//!   at runtime; handlers map it to a generic user-facing message.

/// Failure of a content source to deliver a usable chunk batch.
#[derive(Debug, thiserror::Error)]
pub enum ContentSourceError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the upstream API.
    #[error("upstream HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response text could not be parsed into chunk records.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response parsed, but zero chunks survived per-chunk validation.
    #[error("no usable chunks in response ({discarded} discarded)")]
    EmptyBatch { discarded: usize },
}

/// Terminal pipeline failure. Raised only when the fallback path also fails
/// validation, which indicates a defect in the assembler or shipped data
/// rather than a runtime condition.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("lesson pipeline failed on both sources; fallback plan had {} blocking error(s)", .fallback_errors.len())]
    Fatal {
        /// What took down the primary path (source error or validation).
        primary_failure: String,
        /// Blocking errors reported against the fallback plan.
        fallback_errors: Vec<String>,
    },
}

impl PipelineError {
    pub fn fatal(primary_failure: impl Into<String>, fallback_errors: Vec<String>) -> Self {
        Self::Fatal { primary_failure: primary_failure.into(), fallback_errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ContentSourceError::Http { status: 429, message: "rate limited".into() };
        assert_eq!(err.to_string(), "upstream HTTP 429: rate limited");

        let err = ContentSourceError::EmptyBatch { discarded: 4 };
        assert!(err.to_string().contains("4 discarded"));

        let err = PipelineError::fatal("parse error: bad JSON", vec!["step 0: missing title".into()]);
        assert!(err.to_string().contains("1 blocking error"));
    }
}
