//! Retrain and rollback endpoint handlers

use axum::extract::{Json, State};
use uuid::Uuid;

use crate::actions::Action;
use crate::error::GdlmError;
use crate::server::state::AppState;
use crate::server::types::{failure, ApiResult, ActionRequest, ActionResponse, BaseResponse};

fn acknowledge(state: &AppState, action: Action, request: ActionRequest) -> ApiResult<ActionResponse> {
  let transaction_id = Uuid::new_v4();

  if state.data.catalog.versions_of(&request.model).is_empty() {
    let err = GdlmError::NotFound { name: request.model, version: "<any>".to_string() };
    return Err(failure(err, transaction_id));
  }

  let message = action.acknowledge(&request.model);
  Ok(Json(BaseResponse::success(ActionResponse { action, message }, transaction_id)))
}

/// POST /actions/retrain
pub async fn retrain(State(state): State<AppState>, Json(request): Json<ActionRequest>) -> ApiResult<ActionResponse> {
  acknowledge(&state, Action::Retrain, request)
}

/// POST /actions/rollback
pub async fn rollback(State(state): State<AppState>, Json(request): Json<ActionRequest>) -> ApiResult<ActionResponse> {
  acknowledge(&state, Action::Rollback, request)
}
