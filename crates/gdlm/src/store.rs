//! Loading of the static catalog and metrics documents

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GdlmError, Result};
use crate::model::{Catalog, MetricsStore};

/// Metrics document names, newest layout first
pub const METRICS_FILE_NAMES: [&str; 2] = ["gdlm_metrics_data_v2.json", "gdlm_metrics_data.json"];

pub const CATALOG_FILE_NAME: &str = "gdlm_dummy_data.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content = fs::read_to_string(path)
    .map_err(|source| GdlmError::Read { path: path.to_path_buf(), source })?;
  serde_json::from_str(&content).map_err(|source| GdlmError::Parse { path: path.to_path_buf(), source })
}

/// Load and validate the model catalog
pub fn load_catalog(path: &Path) -> Result<Catalog> {
  let catalog: Catalog = read_json(path)?;
  catalog.validate()?;
  tracing::debug!(path = %path.display(), models = catalog.models.len(), "loaded catalog");
  Ok(catalog)
}

/// Load and validate the per-model metrics document
pub fn load_metrics(path: &Path) -> Result<MetricsStore> {
  let metrics: MetricsStore = read_json(path)?;
  metrics.validate()?;
  tracing::debug!(path = %path.display(), models = metrics.names().count(), "loaded metrics");
  Ok(metrics)
}

/// Pick the first metrics document that exists in `dir`, preferring the v2 name.
/// Falls back to the v2 path so the eventual read error names the expected file.
pub fn locate_metrics(dir: &Path) -> PathBuf {
  METRICS_FILE_NAMES
    .iter()
    .map(|name| dir.join(name))
    .find(|path| path.exists())
    .unwrap_or_else(|| dir.join(METRICS_FILE_NAMES[0]))
}

/// Catalog and metrics loaded together, as every view needs both
#[derive(Debug, Clone)]
pub struct DataSet {
  pub catalog: Catalog,
  pub metrics: MetricsStore,
}

impl DataSet {
  pub fn load(catalog_path: &Path, metrics_path: &Path) -> Result<Self> {
    let catalog = load_catalog(catalog_path)?;
    let metrics = load_metrics(metrics_path)?;

    for name in catalog.model_names() {
      if metrics.get(name).is_none() {
        tracing::warn!(model = name, "catalog model has no metrics series");
      }
    }

    Ok(Self { catalog, metrics })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const CATALOG: &str = r#"{
    "models": [
      {"name": "Falcon", "version": "v1", "accuracy": 91.2, "token_usage": 1200,
       "inference_cost": 0.42, "alerts": [], "logs": []}
    ]
  }"#;

  const METRICS: &str = r#"{
    "Falcon": {"dates": ["2024-01-01", "2024-01-02"], "latency": [100, 110], "token_usage": [5, 6]}
  }"#;

  #[test]
  fn test_load_catalog_and_metrics() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join(CATALOG_FILE_NAME), CATALOG)?;
    fs::write(dir.path().join("gdlm_metrics_data.json"), METRICS)?;

    let data = DataSet::load(&dir.path().join(CATALOG_FILE_NAME), &locate_metrics(dir.path()))?;

    assert_eq!(data.catalog.models.len(), 1);
    assert_eq!(data.catalog.models[0].token_usage, 1200.0);
    assert_eq!(data.metrics.get("Falcon").map(|s| s.len()), Some(2));
    Ok(())
  }

  #[test]
  fn test_locate_metrics_prefers_v2() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("gdlm_metrics_data.json"), METRICS)?;
    fs::write(dir.path().join("gdlm_metrics_data_v2.json"), METRICS)?;

    assert_eq!(locate_metrics(dir.path()), dir.path().join("gdlm_metrics_data_v2.json"));
    Ok(())
  }

  #[test]
  fn test_locate_metrics_defaults_to_v2_name_when_missing() {
    let dir = TempDir::new().unwrap();
    assert_eq!(locate_metrics(dir.path()), dir.path().join("gdlm_metrics_data_v2.json"));
  }

  #[test]
  fn test_malformed_metrics_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("metrics.json");
    fs::write(
      &path,
      r#"{"Falcon": {"dates": ["2024-01-01"], "latency": [1, 2], "token_usage": [1]}}"#,
    )?;

    assert!(matches!(load_metrics(&path), Err(GdlmError::MalformedSeries { .. })));
    Ok(())
  }

  #[test]
  fn test_missing_file_names_path() {
    let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/catalog.json"));
  }

  #[test]
  fn test_invalid_json_is_parse_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("catalog.json");
    fs::write(&path, "{ not json")?;

    assert!(matches!(load_catalog(&path), Err(GdlmError::Parse { .. })));
    Ok(())
  }
}
