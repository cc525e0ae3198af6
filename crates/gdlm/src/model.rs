//! Data model for the deployment dashboard
//!
//! The catalog and metrics documents are loaded once at startup and never
//! mutated afterwards. Everything the dashboard shows is derived from them.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{GdlmError, Result};

/// A free-form log record attached to a model version
pub type LogRecord = Map<String, Value>;

/// One deployed model version with its point-in-time attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
  pub name: String,
  pub version: String,
  pub accuracy: f64,
  pub token_usage: f64,
  pub inference_cost: f64,
  #[serde(default)]
  pub alerts: Vec<String>,
  #[serde(default)]
  pub logs: Vec<LogRecord>,
}

impl ModelVersion {
  pub fn new(name: &str, version: &str) -> Self {
    Self {
      name: name.to_string(),
      version: version.to_string(),
      accuracy: 0.0,
      token_usage: 0.0,
      inference_cost: 0.0,
      alerts: Vec::new(),
      logs: Vec::new(),
    }
  }
}

/// Registry of every known model name/version combination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
  pub models: Vec<ModelVersion>,
}

impl Catalog {
  pub fn new(models: Vec<ModelVersion>) -> Self {
    Self { models }
  }

  /// Distinct model names in catalog order
  pub fn model_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for model in &self.models {
      if !names.contains(&model.name.as_str()) {
        names.push(&model.name);
      }
    }
    names
  }

  /// Versions published under `name`, in catalog order
  pub fn versions_of(&self, name: &str) -> Vec<&str> {
    self.models.iter().filter(|m| m.name == name).map(|m| m.version.as_str()).collect()
  }

  pub fn find(&self, name: &str, version: &str) -> Option<&ModelVersion> {
    self.models.iter().find(|m| m.name == name && m.version == version)
  }

  /// Reject catalogs where a (name, version) pair is not unique
  pub fn validate(&self) -> Result<()> {
    for (i, model) in self.models.iter().enumerate() {
      let repeated =
        self.models[..i].iter().any(|m| m.name == model.name && m.version == model.version);
      if repeated {
        return Err(GdlmError::DuplicateModel {
          name: model.name.clone(),
          version: model.version.clone(),
        });
      }
    }
    Ok(())
  }
}

/// One day's observation for a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
  pub date: NaiveDate,
  pub latency: f64,
  pub token_usage: f64,
}

/// Day-indexed latency and token usage for one model.
///
/// The three vectors are parallel: index `i` across them is one observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
  #[serde(deserialize_with = "deserialize_dates")]
  pub dates: Vec<NaiveDate>,
  pub latency: Vec<f64>,
  pub token_usage: Vec<f64>,
}

impl MetricSeries {
  pub fn from_points(points: &[SeriesPoint]) -> Self {
    Self {
      dates: points.iter().map(|p| p.date).collect(),
      latency: points.iter().map(|p| p.latency).collect(),
      token_usage: points.iter().map(|p| p.token_usage).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  pub fn points(&self) -> impl Iterator<Item = SeriesPoint> + '_ {
    self
      .dates
      .iter()
      .zip(&self.latency)
      .zip(&self.token_usage)
      .map(|((date, latency), token_usage)| SeriesPoint {
        date: *date,
        latency: *latency,
        token_usage: *token_usage,
      })
  }

  /// Enforce equal lengths across the parallel vectors
  pub fn check_shape(&self, name: &str) -> Result<()> {
    if self.latency.len() != self.dates.len() || self.token_usage.len() != self.dates.len() {
      return Err(GdlmError::MalformedSeries {
        name: name.to_string(),
        dates: self.dates.len(),
        latency: self.latency.len(),
        token_usage: self.token_usage.len(),
      });
    }
    Ok(())
  }
}

/// Metric series for every model, keyed by model name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsStore {
  series: BTreeMap<String, MetricSeries>,
}

impl MetricsStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: &str, series: MetricSeries) {
    self.series.insert(name.to_string(), series);
  }

  pub fn get(&self, name: &str) -> Option<&MetricSeries> {
    self.series.get(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.series.keys().map(String::as_str)
  }

  pub fn validate(&self) -> Result<()> {
    for (name, series) in &self.series {
      series.check_shape(name)?;
    }
    Ok(())
  }
}

/// Inclusive date window chosen by the user. `start > end` is allowed and
/// simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
    Self { start, end }
  }

  /// The `window_days` days leading up to and including `today`
  pub fn trailing(today: NaiveDate, window_days: i64) -> Result<Self> {
    let start = Duration::try_days(window_days)
      .and_then(|window| today.checked_sub_signed(window))
      .ok_or_else(|| {
        GdlmError::Config(format!("a window of {window_days} days before {today} is outside the calendar"))
      })?;
    Ok(Self { start, end: today })
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  pub fn is_reversed(&self) -> bool {
    self.start > self.end
  }
}

/// Parse a calendar date, tolerating a trailing time component
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let day = raw.trim().split(['T', ' ']).next().unwrap_or_default();
  NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn deserialize_dates<'de, D>(deserializer: D) -> std::result::Result<Vec<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Vec<String> = Vec::deserialize(deserializer)?;
  raw
    .iter()
    .map(|s| parse_date(s).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn test_model_names_are_distinct_and_ordered() {
    let catalog = Catalog::new(vec![
      ModelVersion::new("Falcon", "v1"),
      ModelVersion::new("Llama", "v1"),
      ModelVersion::new("Falcon", "v2"),
    ]);

    assert_eq!(catalog.model_names(), vec!["Falcon", "Llama"]);
    assert_eq!(catalog.versions_of("Falcon"), vec!["v1", "v2"]);
    assert!(catalog.versions_of("Mistral").is_empty());
  }

  #[test]
  fn test_duplicate_model_rejected() {
    let catalog =
      Catalog::new(vec![ModelVersion::new("Falcon", "v1"), ModelVersion::new("Falcon", "v1")]);

    assert!(matches!(catalog.validate(), Err(GdlmError::DuplicateModel { .. })));
  }

  #[test]
  fn test_series_parses_dates_with_time_component() {
    let json = r#"{"dates": ["2024-01-01", "2024-01-02T00:00:00"], "latency": [1, 2], "token_usage": [3, 4]}"#;
    let series: MetricSeries = serde_json::from_str(json).unwrap();

    assert_eq!(series.dates, vec![date("2024-01-01"), date("2024-01-02")]);
    assert_eq!(series.latency, vec![1.0, 2.0]);
  }

  #[test]
  fn test_series_rejects_bad_date() {
    let json = r#"{"dates": ["yesterday"], "latency": [1], "token_usage": [3]}"#;
    assert!(serde_json::from_str::<MetricSeries>(json).is_err());
  }

  #[test]
  fn test_check_shape_reports_lengths() {
    let series = MetricSeries {
      dates: vec![date("2024-01-01"), date("2024-01-02")],
      latency: vec![100.0],
      token_usage: vec![5.0, 6.0],
    };

    match series.check_shape("Falcon") {
      Err(GdlmError::MalformedSeries { name, dates, latency, token_usage }) => {
        assert_eq!(name, "Falcon");
        assert_eq!((dates, latency, token_usage), (2, 1, 2));
      }
      other => panic!("expected MalformedSeries, got {other:?}"),
    }
  }

  #[test]
  fn test_trailing_range() {
    let range = DateRange::trailing(date("2024-01-15"), 14).unwrap();
    assert_eq!(range.start, date("2024-01-01"));
    assert_eq!(range.end, date("2024-01-15"));
    assert!(range.contains(date("2024-01-01")));
    assert!(range.contains(date("2024-01-15")));
    assert!(!range.contains(date("2024-01-16")));
    assert!(!range.is_reversed());
  }

  #[test]
  fn test_trailing_range_out_of_calendar() {
    let today = date("2024-01-15");
    assert!(matches!(DateRange::trailing(today, 100_000_000), Err(GdlmError::Config(_))));
    assert!(matches!(DateRange::trailing(today, i64::MAX), Err(GdlmError::Config(_))));
  }
}
