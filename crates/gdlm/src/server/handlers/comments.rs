//! Comment endpoint handlers

use axum::{
  extract::{Json, State},
  http::HeaderMap,
};
use uuid::Uuid;

use crate::comments::newest_first;
use crate::error::{GdlmError, Result};
use crate::server::state::{AppState, CommentSessions, DEFAULT_SESSION, SESSION_HEADER};
use crate::server::types::{
  failure, ApiResult, BaseResponse, CommentResponse, CommentsResponse, PostCommentRequest,
};

fn session_id(headers: &HeaderMap) -> String {
  headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()).unwrap_or(DEFAULT_SESSION).to_string()
}

/// Run a comment store call on the blocking pool; the durable store does file I/O under a lock
async fn with_comments<T, F>(state: &AppState, call: F) -> Result<T>
where
  F: FnOnce(&CommentSessions) -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  let comments = state.comments.clone();
  tokio::task::spawn_blocking(move || call(&comments))
    .await
    .map_err(|e| GdlmError::Store(format!("comment task failed: {e}")))?
}

/// GET /comments - Comments visible to the caller's session, most recent first
pub async fn list_comments(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<CommentsResponse> {
  let transaction_id = Uuid::new_v4();
  let session = session_id(&headers);

  let comments = with_comments(&state, move |comments: &CommentSessions| comments.list(&session))
    .await
    .map_err(|e| failure(e, transaction_id))?;

  Ok(Json(BaseResponse::success(CommentsResponse { comments: newest_first(comments) }, transaction_id)))
}

/// POST /comments - Append a comment
pub async fn post_comment(
  State(state): State<AppState>,
  headers: HeaderMap,
  Json(request): Json<PostCommentRequest>,
) -> ApiResult<CommentResponse> {
  let transaction_id = Uuid::new_v4();
  let session = session_id(&headers);

  let (comment, durable) = with_comments(&state, {
    let session = session.clone();
    move |comments: &CommentSessions| {
      let comment = comments.append(&session, &request.name, &request.comment)?;
      Ok((comment, comments.is_durable()))
    }
  })
  .await
  .map_err(|e| failure(e, transaction_id))?;

  tracing::info!(%transaction_id, session = %session, author = %comment.author, "comment posted");
  Ok(Json(BaseResponse::success(CommentResponse { comment, durable }, transaction_id)))
}
