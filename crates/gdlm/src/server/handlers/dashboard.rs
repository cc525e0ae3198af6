//! Catalog and dashboard endpoint handlers

use axum::{
  extract::{rejection::QueryRejection, Query, State},
  response::Json,
};
use chrono::Local;
use uuid::Uuid;

use crate::error::GdlmError;
use crate::model::DateRange;
use crate::server::state::AppState;
use crate::server::types::{failure, ApiResult, BaseResponse, DashboardQuery, ModelEntry, ModelsResponse};
use crate::view::{self, DashboardView};

/// GET /models - Model names with their published versions
pub async fn list_models(State(state): State<AppState>) -> Json<BaseResponse<ModelsResponse>> {
  let transaction_id = Uuid::new_v4();
  let catalog = &state.data.catalog;

  let models = catalog
    .model_names()
    .into_iter()
    .map(|name| ModelEntry {
      name: name.to_string(),
      versions: catalog.versions_of(name).into_iter().map(str::to_string).collect(),
    })
    .collect();

  Json(BaseResponse::success(ModelsResponse { models }, transaction_id))
}

/// GET /dashboard - KPIs, filtered series, alerts and logs for one selection
pub async fn dashboard(
  State(state): State<AppState>,
  query: Result<Query<DashboardQuery>, QueryRejection>,
) -> ApiResult<DashboardView> {
  let transaction_id = Uuid::new_v4();
  let Query(query) =
    query.map_err(|rejection| failure(GdlmError::Validation(rejection.body_text()), transaction_id))?;
  let data = &state.data;

  let version = view::resolve_version(&data.catalog, &query.model, query.version.as_deref())
    .map_err(|e| failure(e, transaction_id))?;

  let fallback = DateRange::trailing(Local::now().date_naive(), state.window_days)
    .map_err(|e| failure(e, transaction_id))?;
  let range = DateRange::new(query.start.unwrap_or(fallback.start), query.end.unwrap_or(fallback.end));
  if range.is_reversed() {
    tracing::warn!(%transaction_id, start = %range.start, end = %range.end, "start date is after end date");
  }

  let view = view::build_view(&data.catalog, &data.metrics, &query.model, version, range)
    .map_err(|e| failure(e, transaction_id))?;

  Ok(Json(BaseResponse::success(view, transaction_id)))
}
