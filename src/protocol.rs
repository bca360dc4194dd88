//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::Serialize;

use crate::domain::{LessonPlan, SourceKind};
use crate::pipeline::GeneratedLesson;

/// Outbound payload for a successfully generated lesson: the validated plan
/// plus generation metadata for the rendering layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOut {
    pub plan: LessonPlan,
    pub source: SourceKind,
    pub used_fallback: bool,
    pub generation_latency_ms: u64,
    pub warnings: Vec<String>,
}

/// Convert a pipeline result to the public DTO.
pub fn to_out(lesson: GeneratedLesson) -> LessonOut {
    LessonOut {
        plan: lesson.plan,
        source: lesson.meta.source,
        used_fallback: lesson.meta.used_fallback,
        generation_latency_ms: lesson.meta.generation_latency_ms,
        warnings: lesson.meta.warnings,
    }
}

/// Generic user-facing error body. Never carries internals.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
