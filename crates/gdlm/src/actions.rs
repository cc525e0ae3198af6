//! Lifecycle actions offered on the dashboard.
//!
//! These only acknowledge the request; no model state is touched.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Retrain,
  Rollback,
}

impl Action {
  pub fn acknowledge(self, model_name: &str) -> String {
    tracing::info!(action = %self, model = model_name, "lifecycle action requested");
    match self {
      Action::Retrain => format!("Model `{model_name}` marked for retraining"),
      Action::Rollback => format!("Model `{model_name}` rolled back to previous version"),
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Action::Retrain => write!(f, "retrain"),
      Action::Rollback => write!(f, "rollback"),
    }
  }
}
