//! REST server startup

use anyhow::{Context, Result};
use axum::serve;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::server::routing::create_router;
use crate::server::state::{AppState, CommentSessions};
use crate::store::DataSet;

/// Load the data set named by `config` and build the server state
pub fn build_state(config: &Config) -> Result<AppState> {
  let metrics_path = config.metrics_path();
  let data = DataSet::load(&config.catalog, &metrics_path)
    .with_context(|| format!("loading {} and {}", config.catalog.display(), metrics_path.display()))?;

  Ok(AppState::new(data, CommentSessions::from_config(config), config.window_days))
}

/// Start the REST server and serve until it shuts down
pub async fn start_server(config: &Config) -> Result<()> {
  let state = build_state(config)?;
  tracing::info!(
    models = state.data.catalog.models.len(),
    durable_comments = state.comments.is_durable(),
    "data loaded"
  );

  // TODO: restrict CORS to the dashboard origin once it is served from a fixed host
  let app = create_router(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

  let listener = TcpListener::bind(config.bind).await.with_context(|| format!("binding {}", config.bind))?;
  tracing::info!(addr = %config.bind, "server listening");

  serve(listener, app).await.context("server error")?;
  tracing::info!("server shut down");
  Ok(())
}
