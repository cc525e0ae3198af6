//! Team comment log
//!
//! Two backends share the [`CommentLog`] interface: a session-scoped list in
//! memory, and a JSON-lines table on disk that only ever grows by appending
//! whole rows.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::error::{GdlmError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A posted comment. Serialized with the worksheet column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  #[serde(rename = "name")]
  pub author: String,
  #[serde(rename = "comment")]
  pub text: String,
  pub timestamp: String,
}

impl Comment {
  /// Validate the inputs and stamp a new comment with the local time
  pub fn new(author: &str, text: &str) -> Result<Self> {
    let author = author.trim();
    let text = text.trim();

    if author.is_empty() {
      return Err(GdlmError::Validation("Comment author must not be empty".to_string()));
    }
    if text.is_empty() {
      return Err(GdlmError::Validation("Comment text must not be empty".to_string()));
    }

    Ok(Self {
      author: author.to_string(),
      text: text.to_string(),
      timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    })
  }
}

/// Append-only comment storage
pub trait CommentLog: Send {
  /// Validate and store a comment. Nothing is stored when validation fails.
  fn append(&mut self, author: &str, text: &str) -> Result<Comment>;

  /// All comments in insertion order
  fn list_all(&self) -> Result<Vec<Comment>>;

  /// Whether comments outlive the current process
  fn is_durable(&self) -> bool;
}

/// Comments held for the lifetime of one session
#[derive(Debug, Default)]
pub struct MemoryCommentLog {
  comments: Vec<Comment>,
}

impl MemoryCommentLog {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CommentLog for MemoryCommentLog {
  fn append(&mut self, author: &str, text: &str) -> Result<Comment> {
    let comment = Comment::new(author, text)?;
    self.comments.push(comment.clone());
    Ok(comment)
  }

  fn list_all(&self) -> Result<Vec<Comment>> {
    Ok(self.comments.clone())
  }

  fn is_durable(&self) -> bool {
    false
  }
}

/// Comments persisted as one JSON object per line.
///
/// Each append is a single write of a complete row to a file opened in append
/// mode, so concurrent writers never overwrite each other's rows.
#[derive(Debug, Clone)]
pub struct JsonlCommentLog {
  path: PathBuf,
}

impl JsonlCommentLog {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl CommentLog for JsonlCommentLog {
  fn append(&mut self, author: &str, text: &str) -> Result<Comment> {
    let comment = Comment::new(author, text)?;

    let mut row = serde_json::to_string(&comment)?;
    row.push('\n');

    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(store_error)?;
      }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path).map_err(store_error)?;
    file.write_all(row.as_bytes()).map_err(store_error)?;

    tracing::info!(path = %self.path.display(), author = %comment.author, "comment appended");
    Ok(comment)
  }

  fn list_all(&self) -> Result<Vec<Comment>> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(store_error(e)),
    };

    content
      .lines()
      .enumerate()
      .filter(|(_, line)| !line.trim().is_empty())
      .map(|(i, line)| {
        serde_json::from_str(line).map_err(|e| GdlmError::CorruptComment {
          path: self.path.clone(),
          line: i + 1,
          message: e.to_string(),
        })
      })
      .collect()
  }

  fn is_durable(&self) -> bool {
    true
  }
}

fn store_error(e: std::io::Error) -> GdlmError {
  GdlmError::Store(e.to_string())
}

/// Most recent first, the order comments are displayed in
pub fn newest_first(mut comments: Vec<Comment>) -> Vec<Comment> {
  comments.reverse();
  comments
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_memory_log_keeps_insertion_order() -> Result<()> {
    let mut log = MemoryCommentLog::new();
    log.append("ana", "first")?;
    log.append("ben", "second")?;

    let all = log.list_all()?;
    assert_eq!(all.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);

    let shown = newest_first(all);
    assert_eq!(shown[0].author, "ben");
    Ok(())
  }

  #[test]
  fn test_empty_author_rejected_and_not_appended() {
    let mut log = MemoryCommentLog::new();

    assert!(matches!(log.append("", "hello"), Err(GdlmError::Validation(_))));
    assert!(matches!(log.append("   ", "hello"), Err(GdlmError::Validation(_))));
    assert!(matches!(log.append("ana", ""), Err(GdlmError::Validation(_))));
    assert!(log.list_all().unwrap().is_empty());
  }

  #[test]
  fn test_comment_is_trimmed_and_stamped() -> Result<()> {
    let comment = Comment::new("  ana ", " looks good ")?;
    assert_eq!(comment.author, "ana");
    assert_eq!(comment.text, "looks good");
    assert!(chrono::NaiveDateTime::parse_from_str(&comment.timestamp, TIMESTAMP_FORMAT).is_ok());
    Ok(())
  }

  #[test]
  fn test_jsonl_log_persists_across_instances() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("comments.jsonl");

    JsonlCommentLog::new(&path).append("ana", "retrain next week")?;
    JsonlCommentLog::new(&path).append("ben", "agreed")?;

    let comments = JsonlCommentLog::new(&path).list_all()?;
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author, "ana");
    assert_eq!(comments[1].text, "agreed");

    let raw = fs::read_to_string(&path)?;
    assert!(raw.lines().all(|line| line.contains("\"name\"") && line.contains("\"comment\"")));
    Ok(())
  }

  #[test]
  fn test_jsonl_missing_file_is_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let log = JsonlCommentLog::new(dir.path().join("absent.jsonl"));
    assert!(log.list_all()?.is_empty());
    assert!(log.is_durable());
    Ok(())
  }

  #[test]
  fn test_jsonl_invalid_comment_leaves_file_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("comments.jsonl");
    let mut log = JsonlCommentLog::new(&path);

    assert!(log.append("", "text").is_err());
    assert!(!path.exists());
    Ok(())
  }

  #[test]
  fn test_jsonl_corrupt_row_reports_line() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("comments.jsonl");
    fs::write(
      &path,
      "{\"name\":\"ana\",\"comment\":\"ok\",\"timestamp\":\"2024-01-01 10:00:00\"}\n\nnot json\n",
    )?;

    match JsonlCommentLog::new(&path).list_all() {
      Err(GdlmError::CorruptComment { line, .. }) => assert_eq!(line, 3),
      other => panic!("expected CorruptComment, got {other:?}"),
    }
    Ok(())
  }

  #[test]
  fn test_unwritable_store_is_retryable() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes the open fail
    let mut log = JsonlCommentLog::new(dir.path());

    let err = log.append("ana", "hello").unwrap_err();
    assert!(matches!(err, GdlmError::Store(_)));
    assert!(err.is_retryable());
  }
}
