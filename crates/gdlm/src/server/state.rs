//! Shared server state

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::comments::{Comment, CommentLog, MemoryCommentLog};
use crate::config::{CommentBackend, Config};
use crate::error::{GdlmError, Result};
use crate::store::DataSet;

/// Header naming the client session that owns an in-memory comment list
pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";
/// In-memory sessions kept at once before the oldest is dropped
pub const MAX_SESSIONS: usize = 1024;

/// In-memory comment lists keyed by session id.
///
/// Holds at most `capacity` sessions. Opening one more evicts the session
/// that was opened first, along with its comments.
pub struct SessionLogs {
  logs: HashMap<String, MemoryCommentLog>,
  opened: VecDeque<String>,
  capacity: usize,
}

impl SessionLogs {
  pub fn with_capacity(capacity: usize) -> Self {
    Self { logs: HashMap::new(), opened: VecDeque::new(), capacity: capacity.max(1) }
  }

  pub fn get(&self, session: &str) -> Option<&MemoryCommentLog> {
    self.logs.get(session)
  }

  /// The log for `session`, opening it (and evicting if full) when new
  pub fn open(&mut self, session: &str) -> &mut MemoryCommentLog {
    if !self.logs.contains_key(session) {
      while self.opened.len() >= self.capacity {
        let Some(oldest) = self.opened.pop_front() else { break };
        self.logs.remove(&oldest);
        tracing::debug!(session = %oldest, "evicted comment session");
      }
      self.opened.push_back(session.to_string());
    }
    self.logs.entry(session.to_string()).or_default()
  }

  pub fn len(&self) -> usize {
    self.logs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.logs.is_empty()
  }
}

/// Comment logs as seen by the server.
///
/// A durable log is shared by every client and serialized behind one lock.
/// Without one, each session id gets its own in-memory list, up to
/// [`MAX_SESSIONS`] of them.
///
/// Every method may block on file I/O and should run off the async workers.
pub enum CommentSessions {
  Shared(Mutex<Box<dyn CommentLog>>),
  PerSession(Mutex<SessionLogs>),
}

fn poisoned<T>(_: T) -> GdlmError {
  GdlmError::Store("comment log lock poisoned".to_string())
}

impl CommentSessions {
  pub fn shared(log: Box<dyn CommentLog>) -> Self {
    CommentSessions::Shared(Mutex::new(log))
  }

  pub fn per_session() -> Self {
    Self::per_session_with_capacity(MAX_SESSIONS)
  }

  pub fn per_session_with_capacity(capacity: usize) -> Self {
    CommentSessions::PerSession(Mutex::new(SessionLogs::with_capacity(capacity)))
  }

  pub fn from_config(config: &Config) -> Self {
    match config.comments.backend {
      CommentBackend::File => Self::shared(config.comment_log()),
      CommentBackend::Memory => Self::per_session(),
    }
  }

  pub fn is_durable(&self) -> bool {
    match self {
      CommentSessions::Shared(log) => log.lock().map(|log| log.is_durable()).unwrap_or(false),
      CommentSessions::PerSession(_) => false,
    }
  }

  pub fn append(&self, session: &str, author: &str, text: &str) -> Result<Comment> {
    match self {
      CommentSessions::Shared(log) => log.lock().map_err(poisoned)?.append(author, text),
      CommentSessions::PerSession(sessions) => {
        let mut sessions = sessions.lock().map_err(poisoned)?;
        // Validate before creating a session so bad posts leave no trace
        Comment::new(author, text)?;
        sessions.open(session).append(author, text)
      }
    }
  }

  /// Comments visible to `session`, in insertion order
  pub fn list(&self, session: &str) -> Result<Vec<Comment>> {
    match self {
      CommentSessions::Shared(log) => log.lock().map_err(poisoned)?.list_all(),
      CommentSessions::PerSession(sessions) => {
        let sessions = sessions.lock().map_err(poisoned)?;
        match sessions.get(session) {
          Some(log) => log.list_all(),
          None => Ok(Vec::new()),
        }
      }
    }
  }
}

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
  pub data: Arc<DataSet>,
  pub comments: Arc<CommentSessions>,
  pub window_days: i64,
}

impl AppState {
  pub fn new(data: DataSet, comments: CommentSessions, window_days: i64) -> Self {
    Self { data: Arc::new(data), comments: Arc::new(comments), window_days }
  }
}
