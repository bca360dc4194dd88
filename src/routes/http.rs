//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! pipeline. Each handler is instrumented and logs parameters and basic
//! result info.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{error, info, instrument};

use crate::domain::LessonRequest;
use crate::pipeline::generate_lesson;
use crate::protocol::{to_out, ErrorOut, HealthOut};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(topic = %body.topic, pair = %format!("{}-{}", body.target_language_code, body.native_language_code)))]
pub async fn http_post_lesson(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LessonRequest>,
) -> Response {
  match generate_lesson(state.openai.as_ref(), &state.fallback, &body).await {
    Ok(lesson) => {
      info!(target: "lesson", plan_id = %lesson.plan.id, used_fallback = lesson.meta.used_fallback, latency_ms = lesson.meta.generation_latency_ms, "HTTP lesson served");
      (StatusCode::OK, Json(to_out(lesson))).into_response()
    }
    Err(e) => {
      // Operators get the details; the learner gets a generic apology.
      error!(target: "lesson", error = %e, "Lesson pipeline failed fatally");
      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorOut { message: "We couldn't prepare your lesson. Please try again in a moment.".into() }),
      )
        .into_response()
    }
  }
}
