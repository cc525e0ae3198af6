//! Axum router configuration for all endpoints

use axum::{
  routing::{get, post},
  Router,
};

use crate::server::handlers::{actions, comments, dashboard, status};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    // Catalog and dashboard
    .route("/models", get(dashboard::list_models))
    .route("/dashboard", get(dashboard::dashboard))
    // Team comments
    .route("/comments", get(comments::list_comments).post(comments::post_comment))
    // Lifecycle actions
    .route("/actions/retrain", post(actions::retrain))
    .route("/actions/rollback", post(actions::rollback))
    .with_state(state)
}
