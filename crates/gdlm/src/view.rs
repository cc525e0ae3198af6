//! Metrics view builder
//!
//! Pure functions that turn the catalog, the metrics store and the user's
//! current selection into everything one dashboard render needs.

use serde::{Deserialize, Serialize};

use crate::error::{GdlmError, Result};
use crate::model::{Catalog, DateRange, LogRecord, MetricSeries, MetricsStore, ModelVersion, SeriesPoint};

/// Headline numbers shown as cards at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
  pub latency_today: f64,
  pub latency_delta: f64,
  pub accuracy: f64,
  pub token_usage: f64,
  pub inference_cost: f64,
}

/// Log records of a model along with the table columns they span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTable {
  pub columns: Vec<String>,
  pub rows: Vec<LogRecord>,
}

/// Everything needed to render the dashboard for one selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
  pub model: String,
  pub version: String,
  pub range: DateRange,
  pub kpis: KpiSummary,
  pub series: Vec<SeriesPoint>,
  pub alerts: Vec<String>,
  pub logs: LogTable,
}

/// Look up the catalog entry for `name` and `version`
pub fn select_model<'a>(catalog: &'a Catalog, name: &str, version: &str) -> Result<&'a ModelVersion> {
  catalog.find(name, version).ok_or_else(|| GdlmError::NotFound {
    name: name.to_string(),
    version: version.to_string(),
  })
}

/// Resolve the version to show, defaulting to the first one published for `name`
pub fn resolve_version<'a>(catalog: &'a Catalog, name: &str, version: Option<&'a str>) -> Result<&'a str> {
  match version {
    Some(version) => Ok(version),
    None => catalog.versions_of(name).into_iter().next().ok_or_else(|| GdlmError::NotFound {
      name: name.to_string(),
      version: "<any>".to_string(),
    }),
  }
}

/// Metric series recorded under the model's name
pub fn series_for<'a>(metrics: &'a MetricsStore, name: &str) -> Result<&'a MetricSeries> {
  metrics.get(name).ok_or_else(|| GdlmError::MetricsNotFound { name: name.to_string() })
}

/// Rows of `series` whose date falls inside `range`, both ends inclusive
pub fn filter_series(series: &MetricSeries, range: &DateRange) -> Vec<SeriesPoint> {
  series.points().filter(|point| range.contains(point.date)).collect()
}

/// Headline KPIs for `model`.
///
/// The latency delta always compares the last two days of the full series,
/// independent of any date filter applied to the charts.
pub fn compute_kpis(series: &MetricSeries, model: &ModelVersion) -> Result<KpiSummary> {
  let points = series.latency.len();
  if points < 2 {
    return Err(GdlmError::InsufficientData { points });
  }

  let today = series.latency[points - 1];
  let yesterday = series.latency[points - 2];

  Ok(KpiSummary {
    latency_today: today,
    latency_delta: round2(today - yesterday),
    accuracy: model.accuracy,
    token_usage: model.token_usage,
    inference_cost: model.inference_cost,
  })
}

pub fn alerts_for(model: &ModelVersion) -> &[String] {
  &model.alerts
}

/// Log rows with columns in first-seen key order
pub fn logs_for(model: &ModelVersion) -> LogTable {
  let mut columns: Vec<String> = Vec::new();
  for record in &model.logs {
    for key in record.keys() {
      if !columns.contains(key) {
        columns.push(key.clone());
      }
    }
  }
  LogTable { columns, rows: model.logs.clone() }
}

/// Assemble the full dashboard for one selection
pub fn build_view(
  catalog: &Catalog,
  metrics: &MetricsStore,
  name: &str,
  version: &str,
  range: DateRange,
) -> Result<DashboardView> {
  let model = select_model(catalog, name, version)?;
  let series = series_for(metrics, name)?;
  let kpis = compute_kpis(series, model)?;
  let filtered = filter_series(series, &range);

  tracing::debug!(
    model = name,
    version,
    start = %range.start,
    end = %range.end,
    rows = filtered.len(),
    "built dashboard view"
  );

  Ok(DashboardView {
    model: model.name.clone(),
    version: model.version.clone(),
    range,
    kpis,
    series: filtered,
    alerts: alerts_for(model).to_vec(),
    logs: logs_for(model),
  })
}

fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use serde_json::json;

  fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  fn sample_series() -> MetricSeries {
    MetricSeries {
      dates: ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
        .iter()
        .map(|d| date(d))
        .collect(),
      latency: vec![100.0, 110.0, 105.0, 120.0, 130.0],
      token_usage: vec![1000.0, 1100.0, 1050.0, 1200.0, 1300.0],
    }
  }

  fn sample_model() -> ModelVersion {
    ModelVersion {
      accuracy: 92.5,
      token_usage: 15000.0,
      inference_cost: 0.37,
      alerts: vec!["Latency spike detected".to_string()],
      ..ModelVersion::new("A", "1")
    }
  }

  #[test]
  fn test_kpis_from_full_series() {
    let kpis = compute_kpis(&sample_series(), &sample_model()).unwrap();

    assert_eq!(kpis.latency_today, 130.0);
    assert_eq!(kpis.latency_delta, 10.0);
    assert_eq!(kpis.accuracy, 92.5);
    assert_eq!(kpis.token_usage, 15000.0);
    assert_eq!(kpis.inference_cost, 0.37);
  }

  #[test]
  fn test_kpi_delta_rounds_to_two_decimals() {
    let series = MetricSeries {
      dates: vec![date("2024-01-01"), date("2024-01-02")],
      latency: vec![100.111, 100.3333],
      token_usage: vec![1.0, 1.0],
    };

    let kpis = compute_kpis(&series, &sample_model()).unwrap();
    assert_eq!(kpis.latency_delta, 0.22);
  }

  #[test]
  fn test_kpis_need_two_points() {
    let single = MetricSeries {
      dates: vec![date("2024-01-01")],
      latency: vec![100.0],
      token_usage: vec![1.0],
    };

    assert!(matches!(
      compute_kpis(&single, &sample_model()),
      Err(GdlmError::InsufficientData { points: 1 })
    ));
    assert!(matches!(
      compute_kpis(&MetricSeries::default(), &sample_model()),
      Err(GdlmError::InsufficientData { points: 0 })
    ));
  }

  #[test]
  fn test_filter_inclusive_window() {
    let rows = filter_series(&sample_series(), &DateRange::new(date("2024-01-02"), date("2024-01-04")));

    let dates: Vec<NaiveDate> = rows.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03"), date("2024-01-04")]);
    assert_eq!(rows[0].latency, 110.0);
    assert_eq!(rows[2].token_usage, 1200.0);
  }

  #[test]
  fn test_filter_reversed_range_is_empty() {
    let series = sample_series();
    for (start, end) in [("2024-01-04", "2024-01-02"), ("2024-01-05", "2024-01-01"), ("2030-01-01", "2000-01-01")] {
      let range = DateRange::new(date(start), date(end));
      assert!(range.is_reversed());
      assert!(filter_series(&series, &range).is_empty());
    }
  }

  #[test]
  fn test_filter_covering_range_returns_everything() {
    let series = sample_series();
    let rows = filter_series(&series, &DateRange::new(date("2023-12-01"), date("2024-02-01")));

    assert_eq!(rows, series.points().collect::<Vec<_>>());
  }

  #[test]
  fn test_filter_is_idempotent() {
    let range = DateRange::new(date("2024-01-02"), date("2024-01-04"));
    let once = filter_series(&sample_series(), &range);
    let twice = filter_series(&MetricSeries::from_points(&once), &range);

    assert_eq!(once, twice);
  }

  #[test]
  fn test_filter_single_day_and_outside() {
    let series = sample_series();
    let day = date("2024-01-03");
    assert_eq!(filter_series(&series, &DateRange::new(day, day)).len(), 1);
    assert!(filter_series(&series, &DateRange::new(date("2025-01-01"), date("2025-02-01"))).is_empty());
  }

  #[test]
  fn test_select_model_not_found() {
    let catalog = Catalog::new(vec![ModelVersion::new("A", "1")]);

    assert!(select_model(&catalog, "A", "1").is_ok());
    match select_model(&catalog, "A", "2") {
      Err(GdlmError::NotFound { name, version }) => {
        assert_eq!(name, "A");
        assert_eq!(version, "2");
      }
      other => panic!("expected NotFound, got {other:?}"),
    }
  }

  #[test]
  fn test_resolve_version_defaults_to_first() {
    let catalog = Catalog::new(vec![ModelVersion::new("A", "1"), ModelVersion::new("A", "2")]);

    assert_eq!(resolve_version(&catalog, "A", None).unwrap(), "1");
    assert_eq!(resolve_version(&catalog, "A", Some("2")).unwrap(), "2");
    assert!(resolve_version(&catalog, "B", None).is_err());
  }

  #[test]
  fn test_alerts_passthrough() {
    let quiet = ModelVersion::new("A", "1");
    assert!(alerts_for(&quiet).is_empty());
    assert_eq!(alerts_for(&sample_model()), ["Latency spike detected".to_string()]);
  }

  #[test]
  fn test_log_columns_first_seen_order() {
    let mut model = ModelVersion::new("A", "1");
    for value in [
      json!({"timestamp": "2024-01-01", "event": "deployed"}),
      json!({"timestamp": "2024-01-02", "event": "scaled", "replicas": 3}),
    ] {
      if let serde_json::Value::Object(record) = value {
        model.logs.push(record);
      }
    }

    let table = logs_for(&model);
    assert_eq!(table.columns, vec!["timestamp", "event", "replicas"]);
    assert_eq!(table.rows.len(), 2);
  }

  #[test]
  fn test_build_view_uses_full_history_for_kpis() {
    let catalog = Catalog::new(vec![sample_model()]);
    let mut metrics = MetricsStore::new();
    metrics.insert("A", sample_series());

    let range = DateRange::new(date("2024-01-01"), date("2024-01-02"));
    let view = build_view(&catalog, &metrics, "A", "1", range).unwrap();

    assert_eq!(view.series.len(), 2);
    assert_eq!(view.kpis.latency_today, 130.0);
    assert_eq!(view.alerts.len(), 1);
  }

  #[test]
  fn test_build_view_missing_metrics() {
    let catalog = Catalog::new(vec![sample_model()]);
    let range = DateRange::new(date("2024-01-01"), date("2024-01-02"));

    assert!(matches!(
      build_view(&catalog, &MetricsStore::new(), "A", "1", range),
      Err(GdlmError::MetricsNotFound { .. })
    ));
  }
}
