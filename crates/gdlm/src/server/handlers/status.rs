//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::server::state::AppState;
use crate::server::types::{BaseResponse, StatusResponse, VersionResponse};

/// GET /status - Health check endpoint
pub async fn status(State(state): State<AppState>) -> Json<BaseResponse<StatusResponse>> {
  let transaction_id = Uuid::new_v4();
  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    models: state.data.catalog.models.len(),
    durable_comments: state.comments.is_durable(),
  };

  Json(BaseResponse::success(response, transaction_id))
}

/// GET /version - Returns current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let transaction_id = Uuid::new_v4();
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };

  Json(BaseResponse::success(response, transaction_id))
}
