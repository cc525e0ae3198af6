//! Configuration management for gdlm
//!
//! Settings come from a JSON config file (or defaults), then environment
//! variables, then command-line flags, each layer overriding the previous.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::comments::{CommentLog, JsonlCommentLog, MemoryCommentLog};
use crate::error::{GdlmError, Result};
use crate::store::{self, CATALOG_FILE_NAME};

pub const ENV_CATALOG: &str = "GDLM_CATALOG";
pub const ENV_METRICS: &str = "GDLM_METRICS";
pub const ENV_COMMENTS: &str = "GDLM_COMMENTS";

/// Longest default window accepted, about a century
pub const MAX_WINDOW_DAYS: i64 = 36_500;

const CONFIG_PATHS: [&str; 3] = [".gdlm.json", "gdlm.json", ".gdlm/config.json"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Model catalog document
  #[serde(default = "default_catalog")]
  pub catalog: PathBuf,
  /// Metrics document. When unset, looked up next to the catalog.
  #[serde(default)]
  pub metrics: Option<PathBuf>,
  /// Where team comments are kept
  #[serde(default)]
  pub comments: CommentsConfig,
  /// Days shown by default, counting back from today
  #[serde(default = "default_window_days")]
  pub window_days: i64,
  /// REST server bind address
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentBackend {
  /// Kept for the current session only
  #[default]
  Memory,
  /// Appended to a JSON-lines file
  File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentsConfig {
  #[serde(default)]
  pub backend: CommentBackend,
  #[serde(default = "default_comments_path")]
  pub path: PathBuf,
}

fn default_catalog() -> PathBuf {
  PathBuf::from(CATALOG_FILE_NAME)
}

fn default_window_days() -> i64 {
  14
}

fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 8501))
}

/// ~/.gdlm/comments.jsonl, or a relative path when there is no home directory
fn default_comments_path() -> PathBuf {
  dirs::home_dir()
    .map(|home| home.join(".gdlm"))
    .unwrap_or_else(|| PathBuf::from(".gdlm"))
    .join("comments.jsonl")
}

impl Default for CommentsConfig {
  fn default() -> Self {
    Self { backend: CommentBackend::Memory, path: default_comments_path() }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      catalog: default_catalog(),
      metrics: None,
      comments: CommentsConfig::default(),
      window_days: default_window_days(),
      bind: default_bind(),
    }
  }
}

impl Config {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|source| GdlmError::Read { path: path.to_path_buf(), source })?;
    let config: Config = serde_json::from_str(&content)
      .map_err(|source| GdlmError::Parse { path: path.to_path_buf(), source })?;
    config.validate()?;
    Ok(config)
  }

  /// Load the explicit config file, else the first one found in the working
  /// directory, else defaults. Environment overrides are applied on top.
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    let mut config = match explicit {
      Some(path) => Self::load_from_file(path)?,
      None => match CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
        Some(path) => Self::load_from_file(path)?,
        None => Config::default(),
      },
    };

    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
  }

  /// Apply overrides from a variable lookup (the process environment in practice)
  pub fn apply_overrides<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(catalog) = lookup(ENV_CATALOG) {
      self.catalog = PathBuf::from(catalog);
    }
    if let Some(metrics) = lookup(ENV_METRICS) {
      self.metrics = Some(PathBuf::from(metrics));
    }
    if let Some(comments) = lookup(ENV_COMMENTS) {
      self.use_comment_file(PathBuf::from(comments));
    }
  }

  /// Switch to durable comments stored at `path`
  pub fn use_comment_file(&mut self, path: PathBuf) {
    self.comments.backend = CommentBackend::File;
    self.comments.path = path;
  }

  pub fn validate(&self) -> Result<()> {
    if !(0..=MAX_WINDOW_DAYS).contains(&self.window_days) {
      return Err(GdlmError::Config(format!(
        "window_days must be between 0 and {MAX_WINDOW_DAYS}, got {}",
        self.window_days
      )));
    }
    Ok(())
  }

  /// Configured metrics path, or the metrics document sitting next to the catalog
  pub fn metrics_path(&self) -> PathBuf {
    match &self.metrics {
      Some(path) => path.clone(),
      None => {
        let dir = self.catalog.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        store::locate_metrics(dir)
      }
    }
  }

  /// A fresh comment log for one session
  pub fn comment_log(&self) -> Box<dyn CommentLog> {
    match self.comments.backend {
      CommentBackend::Memory => Box::new(MemoryCommentLog::new()),
      CommentBackend::File => Box::new(JsonlCommentLog::new(&self.comments.path)),
    }
  }
}
