use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::extractors::JsonBody;
use crate::pose::types::BodyPart;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::yoga_sessions::SessionCompletion;
use crate::store::StoreError;
use crate::validation::{is_valid_session_id, parse_body_parts, validate_duration_minutes};

pub fn router() -> Router<AppState> {
    // Static segment first so it never reaches the id lookup.
    Router::new()
        .route("/generate", post(generate_session))
        .route("/preview", post(preview_session))
        .route("/body-parts", get(list_body_parts))
        .route("/:id", get(get_session))
        .route("/:id/complete", post(complete_session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest {
    #[serde(default)]
    pain_areas: Vec<String>,
    #[serde(default)]
    improvement_areas: Vec<String>,
    duration_minutes: f64,
}

struct ParsedRequest {
    pain: Vec<BodyPart>,
    improvement: Vec<BodyPart>,
    minutes: f64,
}

impl SessionRequest {
    fn parse(&self) -> Result<ParsedRequest, AppError> {
        Ok(ParsedRequest {
            pain: parse_body_parts(&self.pain_areas)?,
            improvement: parse_body_parts(&self.improvement_areas)?,
            minutes: validate_duration_minutes(self.duration_minutes)?,
        })
    }
}

async fn generate_session(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = req.parse()?;
    let session = state
        .planner()
        .generate(&req.pain, &req.improvement, req.minutes)?;
    state.store().create_yoga_session(&session)?;
    Ok(created(session))
}

async fn preview_session(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let req = req.parse()?;
    Ok(ok(state.planner().preview(&req.pain, &req.improvement)))
}

async fn list_body_parts() -> impl IntoResponse {
    let names: Vec<&str> = BodyPart::ALL.iter().map(|p| p.as_str()).collect();
    ok(serde_json::json!({ "bodyParts": names }))
}

fn session_not_found(id: &str) -> AppError {
    AppError::not_found(&format!("Session not found: {id}"))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_session_id(&id) {
        return Err(session_not_found(&id));
    }
    let session = state
        .store()
        .get_yoga_session(&id)?
        .ok_or_else(|| session_not_found(&id))?;
    Ok(ok(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    completed_poses: u32,
    /// Seconds actually spent in the session.
    total_time: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionSummary {
    message: &'static str,
    session_id: String,
    completed_poses: u32,
    total_poses: usize,
    actual_duration_sec: u64,
    completed_at: chrono::DateTime<Utc>,
}

async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_session_id(&id) {
        return Err(session_not_found(&id));
    }
    let session = state
        .store()
        .get_yoga_session(&id)?
        .ok_or_else(|| session_not_found(&id))?;
    if req.completed_poses as usize > session.num_poses {
        return Err(AppError::bad_request(
            "INVALID_COMPLETION",
            &format!(
                "completedPoses {} exceeds the {} poses in this session",
                req.completed_poses, session.num_poses
            ),
        ));
    }

    let completion = SessionCompletion {
        completed_poses: req.completed_poses,
        actual_duration_sec: req.total_time,
        completed_at: Utc::now(),
    };
    let session = match state.store().complete_yoga_session(&id, completion) {
        Ok(session) => session,
        Err(StoreError::Conflict { .. }) => {
            return Err(AppError::conflict(
                "SESSION_ALREADY_COMPLETED",
                "Session has already been completed",
            ))
        }
        Err(StoreError::NotFound { .. }) => return Err(session_not_found(&id)),
        Err(e) => return Err(e.into()),
    };

    let Some(done) = session.completion else {
        return Err(AppError::internal("completion missing after update"));
    };
    tracing::info!(
        session_id = %session.id,
        completed_poses = done.completed_poses,
        total_poses = session.num_poses,
        "session completed"
    );
    Ok(ok(CompletionSummary {
        message: "Session completed successfully",
        session_id: session.id,
        completed_poses: done.completed_poses,
        total_poses: session.num_poses,
        actual_duration_sec: done.actual_duration_sec,
        completed_at: done.completed_at,
    }))
}
