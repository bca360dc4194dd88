//! Lesson pipeline orchestration.
//!
//! A three-state machine: `TryPrimary → TryFallback → Terminal`. The fallback
//! transition is the single retry point in the whole system. A validation
//! failure on primary output is treated identically to a primary transport
//! failure: the assembler is deterministic, so an invalid plan signals a
//! malformed upstream batch, and re-asking the same source with the same
//! input cannot help. If the fallback path also fails validation, that is a
//! defect in the assembler or the shipped data, and the pipeline raises a
//! fatal error instead of looping.

use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::assembler::assemble;
use crate::domain::{
    ContentSource, ChunkContent, GenerationMeta, LessonContent, LessonPlan, LessonRequest,
    SourceKind,
};
use crate::error::PipelineError;
use crate::validator::{validate, ValidationReport};

/// Validated plan plus generation metadata. Only ever produced by the
/// terminal state; no partial plan can escape the pipeline.
#[derive(Clone, Debug)]
pub struct GeneratedLesson {
    pub plan: LessonPlan,
    pub meta: GenerationMeta,
}

enum Stage {
    TryPrimary,
    TryFallback { primary_failure: String },
}

/// Run the pipeline for one lesson-open request.
///
/// `primary` is the AI source (absent when unconfigured); `fallback` is the
/// static source, infallible by construction.
#[instrument(level = "info", skip_all, fields(topic = %req.topic, pair = %format!("{}-{}", req.target_language_code, req.native_language_code), chunks = req.chunk_count()))]
pub async fn generate_lesson<P, F>(
    primary: Option<&P>,
    fallback: &F,
    req: &LessonRequest,
) -> Result<GeneratedLesson, PipelineError>
where
    P: ContentSource,
    F: ContentSource,
{
    let started = Instant::now();
    let mut stage = Stage::TryPrimary;

    loop {
        match stage {
            Stage::TryPrimary => {
                let Some(source) = primary else {
                    info!(target: "lesson", "Primary source not configured; using fallback");
                    stage = Stage::TryFallback {
                        primary_failure: "primary source not configured".into(),
                    };
                    continue;
                };
                match source.fetch_chunks(req).await {
                    Ok(chunks) => {
                        let (plan, report) = assemble_and_validate(req, chunks);
                        if report.is_valid() {
                            info!(target: "lesson", plan_id = %plan.id, steps = plan.steps.len(), source = source.name(), "Lesson generated from primary source");
                            return Ok(terminal(plan, report, SourceKind::Generated, started));
                        }
                        error!(target: "lesson", source = source.name(), errors = ?report.errors, "Primary output failed validation; switching to fallback");
                        stage = Stage::TryFallback {
                            primary_failure: format!("validation: {}", report.errors.join("; ")),
                        };
                    }
                    Err(e) => {
                        error!(target: "lesson", source = source.name(), error = %e, "Primary source failed; switching to fallback");
                        stage = Stage::TryFallback { primary_failure: e.to_string() };
                    }
                }
            }
            Stage::TryFallback { primary_failure } => {
                let chunks = match fallback.fetch_chunks(req).await {
                    Ok(chunks) => chunks,
                    // The static source cannot fail; an error here is a defect.
                    Err(e) => return Err(PipelineError::fatal(primary_failure, vec![e.to_string()])),
                };
                let (plan, report) = assemble_and_validate(req, chunks);
                if report.is_valid() {
                    warn!(target: "lesson", plan_id = %plan.id, source = fallback.name(), "Lesson served from fallback source");
                    return Ok(terminal(plan, report, SourceKind::Fallback, started));
                }
                error!(target: "lesson", errors = ?report.errors, "Fallback plan failed validation; pipeline is defective");
                return Err(PipelineError::fatal(primary_failure, report.errors));
            }
        }
    }
}

fn assemble_and_validate(
    req: &LessonRequest,
    chunks: Vec<ChunkContent>,
) -> (LessonPlan, ValidationReport) {
    let content = LessonContent {
        title: lesson_title(req),
        target_language_code: req.target_language_code.clone(),
        native_language_code: req.native_language_code.clone(),
        chunks,
    };
    let plan = assemble(&content);
    let report = validate(&plan);
    (plan, report)
}

fn lesson_title(req: &LessonRequest) -> String {
    let topic = req.topic.trim();
    if topic.is_empty() {
        format!("Your new {} words", req.target_language_code)
    } else {
        topic.to_string()
    }
}

fn terminal(
    plan: LessonPlan,
    report: ValidationReport,
    source: SourceKind,
    started: Instant,
) -> GeneratedLesson {
    GeneratedLesson {
        plan,
        meta: GenerationMeta {
            source,
            used_fallback: source == SourceKind::Fallback,
            generation_latency_ms: started.elapsed().as_millis() as u64,
            warnings: report.warnings,
        },
    }
}
