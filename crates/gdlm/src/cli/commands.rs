//! Command implementations behind the `gdlm` binary

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use colored::*;
use serde::Serialize;

use crate::actions::Action;
use crate::comments::{newest_first, Comment};
use crate::config::Config;
use crate::display;
use crate::logging;
use crate::model::{parse_date, DateRange};
use crate::store::DataSet;
use crate::view::{self, DashboardView};

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
  #[default]
  Pretty,
  Json,
}

/// clap value parser for `YYYY-MM-DD` dates
pub fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
  parse_date(raw).ok_or_else(|| format!("'{raw}' is not a date in YYYY-MM-DD form"))
}

fn load_data(config: &Config) -> Result<DataSet> {
  let metrics_path = config.metrics_path();
  DataSet::load(&config.catalog, &metrics_path)
    .with_context(|| format!("loading {} and {}", config.catalog.display(), metrics_path.display()))
}

/// List every model with its versions
pub fn list_models(config: &Config) -> Result<()> {
  let data = load_data(config)?;

  for name in data.catalog.model_names() {
    let versions = data.catalog.versions_of(name).join(", ");
    println!("{} ({})", name.cyan(), versions.yellow());
  }
  Ok(())
}

#[derive(Serialize)]
struct ShowOutput<'a> {
  #[serde(flatten)]
  view: &'a DashboardView,
  comments: &'a [Comment],
}

/// Render the dashboard for one model version and date range
pub fn show(
  config: &Config,
  model: &str,
  version: Option<&str>,
  start: Option<NaiveDate>,
  end: Option<NaiveDate>,
  format: OutputFormat,
) -> Result<()> {
  let data = load_data(config)?;
  let version = view::resolve_version(&data.catalog, model, version)?;

  let fallback = DateRange::trailing(Local::now().date_naive(), config.window_days)?;
  let range = DateRange::new(start.unwrap_or(fallback.start), end.unwrap_or(fallback.end));
  if range.is_reversed() {
    logging::warn(&format!(
      "Start date {} is after end date {}, no data points will match",
      range.start, range.end
    ));
  }

  let dashboard = view::build_view(&data.catalog, &data.metrics, model, version, range)?;

  let comments = match config.comment_log().list_all() {
    Ok(comments) => newest_first(comments),
    Err(e) => {
      logging::warn(&format!("Comments unavailable: {e}"));
      Vec::new()
    }
  };

  match format {
    OutputFormat::Pretty => display::print_dashboard(&dashboard, &comments),
    OutputFormat::Json => {
      let output = ShowOutput { view: &dashboard, comments: &comments };
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
  }
  Ok(())
}

/// Print the active alerts for a model version
pub fn alerts(config: &Config, model: &str, version: Option<&str>) -> Result<()> {
  let data = load_data(config)?;
  let version = view::resolve_version(&data.catalog, model, version)?;
  let selected = view::select_model(&data.catalog, model, version)?;

  print!("{}", display::render_alerts(view::alerts_for(selected)));
  Ok(())
}

/// Print the log table for a model version
pub fn logs(config: &Config, model: &str, version: Option<&str>) -> Result<()> {
  let data = load_data(config)?;
  let version = view::resolve_version(&data.catalog, model, version)?;
  let selected = view::select_model(&data.catalog, model, version)?;

  print!("{}", display::render_logs(&view::logs_for(selected)));
  Ok(())
}

/// Acknowledge a retrain or rollback request
pub fn lifecycle_action(config: &Config, action: Action, model: &str) -> Result<()> {
  let data = load_data(config)?;
  view::resolve_version(&data.catalog, model, None)?;

  logging::success(&action.acknowledge(model));
  Ok(())
}

/// Post a comment to the configured comment log
pub fn add_comment(config: &Config, author: &str, text: &str) -> Result<()> {
  let mut log = config.comment_log();
  let comment = log.append(author, text)?;

  if log.is_durable() {
    logging::success(&format!("Comment posted by {} at {}", comment.author, comment.timestamp));
  } else {
    logging::success("Comment posted! (simulated)");
    logging::info("Comments are kept for this session only, set GDLM_COMMENTS or --comments to keep them");
  }
  Ok(())
}

/// Print every stored comment, most recent first
pub fn list_comments(config: &Config) -> Result<()> {
  let comments = newest_first(config.comment_log().list_all()?);
  print!("{}", display::render_comments(&comments));
  Ok(())
}
