//! Axum route handlers for the Scout API.

use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::CandidateProfile;
use crate::pipeline::events::ProgressEvent;
use crate::pipeline::run::{spawn_run, RunRequest, RunState};
use crate::report::markdown::render_markdown;
use crate::state::AppState;

const DEFAULT_QUERY: &str = "python";
const DEFAULT_LOCATION: &str = "Remote";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoutRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub candidate_profile: CandidateProfile,
}

impl ScoutRequest {
    fn into_run_request(self) -> Result<RunRequest, AppError> {
        if self.candidate_profile.is_blank() {
            return Err(AppError::Validation(
                "candidate_profile needs at least one of experience, skills or goals".to_string(),
            ));
        }

        Ok(RunRequest {
            query: non_blank_or(self.query, DEFAULT_QUERY),
            location: non_blank_or(self.location, DEFAULT_LOCATION),
            profile: self.candidate_profile,
        })
    }
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/scout
///
/// Starts a run and streams its progress as server-sent events, one JSON `ProgressEvent`
/// per `data:` line. The stream ends after the `result` or `error` event.
pub async fn handle_scout(
    State(state): State<AppState>,
    Json(request): Json<ScoutRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let request = request.into_run_request()?;
    let run = spawn_run(state.pipeline.clone(), request);
    info!(run_id = %run.run_id, "Streaming scout run");

    let events = run
        .events
        .into_stream()
        .map(|event| Event::default().json_data(&event));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// POST /api/v1/scout/markdown
///
/// Runs the same pipeline to completion and returns the report as a markdown document.
pub async fn handle_scout_markdown(
    State(state): State<AppState>,
    Json(request): Json<ScoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = request.into_run_request()?;
    let (query, location) = (request.query.clone(), request.location.clone());
    let mut run = spawn_run(state.pipeline.clone(), request);

    let mut report = None;
    while let Some(event) = run.events.recv().await {
        match event {
            ProgressEvent::Step(step) => debug!(run_id = %run.run_id, "{step}"),
            ProgressEvent::Result(r) => report = Some(r),
            ProgressEvent::Error(message) => return Err(AppError::Pipeline(message)),
        }
    }

    match run.handle.await {
        Ok(RunState::Completed) => {}
        Ok(state) => {
            return Err(AppError::Pipeline(format!("run ended in state {state:?}")));
        }
        Err(e) => return Err(anyhow::anyhow!("scout run task failed: {e}").into()),
    }

    let report = report
        .ok_or_else(|| AppError::Pipeline("run ended without producing a report".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_markdown(&report, &query, &location),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::matching::fit_scoring::KeywordMatchScorer;
    use crate::pipeline::testing::{context, sample_listings, InvalidSource, StaticSource};
    use crate::routes::build_router;
    use crate::sources::JobSource;

    fn app(sources: Vec<Arc<dyn JobSource>>) -> Router {
        build_router(AppState {
            pipeline: context(sources, Arc::new(KeywordMatchScorer)),
        })
    }

    fn healthy_app() -> Router {
        app(vec![Arc::new(StaticSource::new(
            "Alpha",
            sample_listings("Alpha", 3),
        ))])
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn scout_body() -> Value {
        json!({
            "query": "rust",
            "location": "Remote",
            "candidate_profile": {
                "experience": "6 years of backend work",
                "skills": "Rust, PostgreSQL",
                "goals": "Remote backend role"
            }
        })
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let response = healthy_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["message"], "Welcome to ScoutHire API");

        let response = healthy_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "scout-api");
    }

    #[tokio::test]
    async fn test_scout_streams_steps_then_single_result() {
        let response = healthy_app()
            .oneshot(post("/api/v1/scout", scout_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        let text = body_text(response).await;
        let events: Vec<Value> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect();

        assert!(events.len() > 1);
        assert!(events[..events.len() - 1]
            .iter()
            .all(|e| e["type"] == "step"));
        let last = events.last().unwrap();
        assert_eq!(last["type"], "result");
        assert_eq!(last["content"]["jobs"].as_array().unwrap().len(), 3);
        assert!(last["content"]["jobs"][0]["match_score"].as_u64().unwrap() >= 1);
        assert_eq!(last["content"]["jobs"][0]["source"], "Alpha");
    }

    #[tokio::test]
    async fn test_blank_profile_is_rejected() {
        let body = json!({
            "candidate_profile": {"experience": " ", "skills": "", "goals": ""}
        });
        let response = healthy_app()
            .oneshot(post("/api/v1/scout", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_markdown_mode_returns_document() {
        let response = healthy_app()
            .oneshot(post("/api/v1/scout/markdown", scout_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        let text = body_text(response).await;
        assert!(text.starts_with("# Job Matches: rust (Remote)"));
        assert!(text.contains("## 1. Rust Engineer Alpha"));
    }

    #[tokio::test]
    async fn test_markdown_mode_maps_failed_run_to_500() {
        let response = app(vec![Arc::new(InvalidSource::new("Rogue"))])
            .oneshot(post("/api/v1/scout/markdown", scout_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "PIPELINE_ERROR");
    }

    #[test]
    fn test_request_defaults_fill_blank_query_and_location() {
        let request: ScoutRequest = serde_json::from_value(json!({
            "query": "  ",
            "candidate_profile": {"skills": "Python"}
        }))
        .unwrap();
        let run = request.into_run_request().unwrap();

        assert_eq!(run.query, "python");
        assert_eq!(run.location, "Remote");
        assert_eq!(run.profile.skills, "Python");
        assert_eq!(run.profile.goals, "");
    }
}
