//! REST API request and response types

use axum::{http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::Action;
use crate::comments::Comment;
use crate::error::GdlmError;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionInfo {
  pub latest: String,
  pub requested: String,
  pub resolved: String,
}

/// API error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Whether repeating the request may succeed
  #[serde(default)]
  pub retryable: bool,
}

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<BaseResponse<()>>);

pub type ApiResult<T> = Result<Json<BaseResponse<T>>, ApiFailure>;

// Status/Version Endpoints
// =======================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  pub models: usize,
  pub durable_comments: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
  pub version: String,
}

// Catalog and Dashboard
// =====================

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelEntry {
  pub name: String,
  pub versions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
  pub models: Vec<ModelEntry>,
}

/// Query string for GET /dashboard
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardQuery {
  pub model: String,
  pub version: Option<String>,
  pub start: Option<NaiveDate>,
  pub end: Option<NaiveDate>,
}

// Comments
// ========

#[derive(Debug, Serialize, Deserialize)]
pub struct PostCommentRequest {
  pub name: String,
  pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
  pub comment: Comment,
  pub durable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentsResponse {
  /// Most recent first
  pub comments: Vec<Comment>,
}

// Actions
// =======

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionRequest {
  pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
  pub action: Action,
  pub message: String,
}

// Helper Functions
// ================

fn version_info() -> VersionInfo {
  let version = env!("CARGO_PKG_VERSION");
  VersionInfo {
    latest: version.to_string(),
    requested: version.to_string(),
    resolved: version.to_string(),
  }
}

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: version_info(), transaction_id, errors: Vec::new(), data }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: version_info(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), retryable: false }
  }
}

impl From<&GdlmError> for ApiError {
  fn from(err: &GdlmError) -> Self {
    Self { key: err.key().to_string(), message: err.to_string(), retryable: err.is_retryable() }
  }
}

/// HTTP status for a domain error
pub fn status_for(err: &GdlmError) -> StatusCode {
  match err {
    GdlmError::NotFound { .. } | GdlmError::MetricsNotFound { .. } => StatusCode::NOT_FOUND,
    GdlmError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    GdlmError::Validation(_) => StatusCode::BAD_REQUEST,
    GdlmError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

/// Turn a domain error into the failure half of a handler result
pub fn failure(err: GdlmError, transaction_id: Uuid) -> ApiFailure {
  let status = status_for(&err);
  if status.is_server_error() {
    tracing::error!(%transaction_id, error = %err, "request failed");
  } else {
    tracing::debug!(%transaction_id, error = %err, "request rejected");
  }
  (status, Json(BaseResponse::<()>::error(vec![ApiError::from(&err)], transaction_id)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    let not_found = GdlmError::NotFound { name: "A".into(), version: "2".into() };
    assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);
    assert_eq!(status_for(&GdlmError::InsufficientData { points: 1 }), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(status_for(&GdlmError::Validation("empty".into())), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&GdlmError::Store("down".into())), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(status_for(&GdlmError::Config("bad".into())), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_error_payload_carries_key_and_retry_hint() {
    let (status, Json(body)) = failure(GdlmError::Store("connection reset".into()), Uuid::new_v4());

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.errors.len(), 1);
    assert_eq!(body.errors[0].key, "comment_store_unavailable");
    assert!(body.errors[0].retryable);
  }

  #[test]
  fn test_success_flattens_data() {
    let body = BaseResponse::success(VersionResponse { version: "1.0".into() }, Uuid::new_v4());
    let value = serde_json::to_value(&body).unwrap();

    assert_eq!(value["version"], "1.0");
    assert!(value.get("errors").is_none());
    assert!(value["versioning"]["latest"].is_string());
  }
}
