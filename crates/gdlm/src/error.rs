use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GdlmError>;

#[derive(Error, Debug)]
pub enum GdlmError {
  #[error("Model '{name}' version '{version}' not found in catalog")]
  NotFound { name: String, version: String },

  #[error("No metrics recorded for model '{name}'")]
  MetricsNotFound { name: String },

  #[error("At least two data points are needed to compute a delta, found {points}")]
  InsufficientData { points: usize },

  #[error(
    "Metrics for '{name}' are malformed: {dates} dates, {latency} latency values, {token_usage} token usage values"
  )]
  MalformedSeries { name: String, dates: usize, latency: usize, token_usage: usize },

  #[error("Model '{name}' version '{version}' appears more than once in catalog")]
  DuplicateModel { name: String, version: String },

  #[error("{0}")]
  Validation(String),

  #[error("Comment store unavailable: {0}")]
  Store(String),

  #[error("Comment store {} has an unreadable row at line {line}: {message}", .path.display())]
  CorruptComment { path: PathBuf, line: usize, message: String },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl GdlmError {
  /// Short machine-readable key used in API error payloads
  pub fn key(&self) -> &'static str {
    match self {
      GdlmError::NotFound { .. } => "model_not_found",
      GdlmError::MetricsNotFound { .. } => "metrics_not_found",
      GdlmError::InsufficientData { .. } => "insufficient_data",
      GdlmError::MalformedSeries { .. } => "malformed_series",
      GdlmError::DuplicateModel { .. } => "duplicate_model",
      GdlmError::Validation(_) => "validation_failed",
      GdlmError::Store(_) => "comment_store_unavailable",
      GdlmError::CorruptComment { .. } => "comment_store_corrupt",
      GdlmError::Config(_) => "config_error",
      GdlmError::Read { .. } | GdlmError::Io(_) => "io_error",
      GdlmError::Parse { .. } | GdlmError::Json(_) => "parse_error",
    }
  }

  /// Whether the user can retry the same request and expect it to succeed
  pub fn is_retryable(&self) -> bool {
    matches!(self, GdlmError::Store(_))
  }
}
