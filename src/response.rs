use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::{FrameError, PipelineError};
use crate::planner::PlannerError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn too_many_requests(message: &str) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: "TOO_MANY_CONNECTIONS".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn payload_too_large(message: &str) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: "PAYLOAD_TOO_LARGE".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// Lookups and conflicts are caller errors and keep their message.
// Everything else is redacted to a generic 500.
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::NotFound { entity, key } => {
                AppError::not_found(&format!("{entity} not found: {key}"))
            }
            StoreError::Conflict { entity, key } => AppError::conflict(
                "CONFLICT",
                &format!("{entity} {key} was already updated"),
            ),
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::InvalidDuration(_) => {
                AppError::bad_request("INVALID_DURATION", &value.to_string())
            }
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        match &value {
            PipelineError::UnknownPose(_) => {
                AppError::bad_request("UNKNOWN_POSE", &value.to_string())
            }
            PipelineError::Frame(FrameError::TooLarge { .. }) => {
                AppError::payload_too_large(&value.to_string())
            }
            PipelineError::Frame(FrameError::Interrupted) => AppError::internal(&value.to_string()),
            PipelineError::Frame(_) => AppError::bad_request("INVALID_IMAGE", &value.to_string()),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn internal_error_is_redacted() {
        let resp = AppError::internal("sled crash").into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("sled crash"));
        assert!(text.contains("Internal server error"));
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let resp =
            AppError::bad_request("UNKNOWN_BODY_PART", "unknown body part: elbow").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "UNKNOWN_BODY_PART");
        assert_eq!(json["message"], "unknown body part: elbow");
    }

    #[tokio::test]
    async fn store_not_found_maps_to_404() {
        let err = StoreError::NotFound {
            entity: "yoga_session".to_string(),
            key: "abc".to_string(),
        };
        let resp = AppError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[test]
    fn unknown_pose_is_a_bad_request() {
        let err = AppError::from(PipelineError::UnknownPose("Lotus".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "UNKNOWN_POSE");
        assert!(err.message.contains("Lotus"));

        let err = AppError::from(PipelineError::Frame(FrameError::TooLarge { size: 10, max: 5 }));
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);

        let err = AppError::from(PipelineError::Frame(FrameError::Interrupted));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_operational);
    }

    #[tokio::test]
    async fn planner_duration_error_is_a_bad_request() {
        let resp = AppError::from(PlannerError::InvalidDuration(5.0)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["code"], "INVALID_DURATION");
    }
}
