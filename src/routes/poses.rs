use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::extractors::JsonBody;
use crate::pose::catalog::{PoseCatalog, PoseDefinition};
use crate::pose::landmarks::Landmarks;
use crate::pose::types::{BodyPart, Difficulty, Orientation, PoseCategory};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_poses))
        .route("/score", post(score_landmarks))
        .route("/:name", get(get_pose))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PoseSummary {
    name: String,
    category: PoseCategory,
    difficulty: Difficulty,
    default_duration_sec: u32,
    target_body_parts: Vec<BodyPart>,
    valid_orientations: Vec<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    body_part: Option<String>,
    category: Option<PoseCategory>,
}

async fn list_poses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = state.catalog();
    let part = query
        .body_part
        .as_deref()
        .map(|raw| {
            raw.parse::<BodyPart>()
                .map_err(|e| AppError::bad_request("UNKNOWN_BODY_PART", &e.to_string()))
        })
        .transpose()?;
    let wanted: Option<Vec<&str>> = part.map(|p| catalog.by_body_part(p));

    let summaries: Vec<PoseSummary> = catalog
        .iter()
        .filter(|p| query.category.map_or(true, |c| p.category == c))
        .filter(|p| {
            wanted
                .as_ref()
                .map_or(true, |names| names.contains(&p.name.as_str()))
        })
        .map(|p| summarize(catalog, p))
        .collect();
    Ok(ok(summaries))
}

fn summarize(catalog: &PoseCatalog, pose: &PoseDefinition) -> PoseSummary {
    PoseSummary {
        name: pose.name.clone(),
        category: pose.category,
        difficulty: pose.difficulty,
        default_duration_sec: pose.default_duration_sec,
        target_body_parts: pose.target_body_parts.clone(),
        valid_orientations: pose.valid_orientations.clone(),
        partner: catalog.partner_of(&pose.name).map(|p| p.name.clone()),
    }
}

async fn get_pose(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let pose = state
        .catalog()
        .get(&name)
        .cloned()
        .ok_or_else(|| AppError::not_found(&format!("Pose not found: {name}")))?;
    Ok(ok(pose))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRequest {
    landmarks: Landmarks,
    #[serde(default)]
    target_pose: Option<String>,
}

async fn score_landmarks(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let score = state
        .pipeline()
        .score_landmarks(&req.landmarks, req.target_pose.as_deref())?;
    Ok(ok(score))
}
