//! Terminal rendering of the dashboard

use colored::*;
use console::Term;
use serde_json::Value;

use crate::comments::Comment;
use crate::model::SeriesPoint;
use crate::view::{DashboardView, KpiSummary, LogTable};

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const MAX_WIDTH: usize = 100;

/// Usable output width, capped so wide terminals still get a compact layout
pub fn terminal_width() -> usize {
  let (_, cols) = Term::stdout().size();
  (cols as usize).clamp(40, MAX_WIDTH)
}

pub fn banner_line(length: usize, c: char) -> String {
  c.to_string().repeat(length)
}

/// Integers print without a fractional part, everything else with up to two decimals
pub fn format_number(value: f64) -> String {
  if value.fract() == 0.0 && value.abs() < 1e15 {
    format!("{}", value as i64)
  } else {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
  }
}

pub fn format_delta(delta: f64) -> String {
  let text = if delta > 0.0 {
    format!("▲ +{}", format_number(delta))
  } else if delta < 0.0 {
    format!("▼ {}", format_number(delta))
  } else {
    "● 0".to_string()
  };

  if delta > 0.0 {
    text.green().to_string()
  } else if delta < 0.0 {
    text.red().to_string()
  } else {
    text.dimmed().to_string()
  }
}

/// Block-character sparkline, one character per value
pub fn sparkline(values: &[f64]) -> String {
  if values.is_empty() {
    return String::new();
  }

  let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
  let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
  let range = (max - min).max(0.001);

  values
    .iter()
    .map(|&v| {
      let normalized = ((v - min) / range).clamp(0.0, 0.999);
      BLOCKS[(normalized * BLOCKS.len() as f64) as usize]
    })
    .collect()
}

/// Average adjacent values so the series fits in `width` characters
pub fn downsample(values: &[f64], width: usize) -> Vec<f64> {
  if width == 0 || values.len() <= width {
    return values.to_vec();
  }
  let bucket = values.len().div_ceil(width);
  values.chunks(bucket).map(|chunk| chunk.iter().sum::<f64>() / chunk.len() as f64).collect()
}

pub fn render_header(view: &DashboardView, width: usize) -> String {
  let title = "GenAI Deployment Lifecycle Manager (GDLM)".bold().to_string();
  format!(
    "{}\n{}\n{}\nModel: {} | Version: {}\n",
    banner_line(width, '='),
    title,
    banner_line(width, '='),
    view.model.cyan(),
    view.version.yellow()
  )
}

pub fn render_kpis(kpis: &KpiSummary) -> String {
  let cards = [
    ("Latency (ms)", format_number(kpis.latency_today), Some(kpis.latency_delta)),
    ("Accuracy (%)", format_number(kpis.accuracy), None),
    ("Token Usage", format_number(kpis.token_usage), None),
    ("Inference Cost ($)", format_number(kpis.inference_cost), None),
  ];

  let mut out = String::new();
  for (label, value, delta) in cards {
    let delta = delta.map(|d| format!("  {}", format_delta(d))).unwrap_or_default();
    out.push_str(&format!("  {:<20}{}{}\n", label, value.bold(), delta));
  }
  out
}

fn render_chart(title: &str, points: &[SeriesPoint], pick: fn(&SeriesPoint) -> f64, width: usize) -> String {
  let mut out = format!("{}\n", title.bold());

  if points.is_empty() {
    out.push_str(&format!("  {}\n", "No data in the selected date range".dimmed()));
    return out;
  }

  let values: Vec<f64> = points.iter().map(pick).collect();
  let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
  let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
  let line = sparkline(&downsample(&values, width.saturating_sub(4)));

  out.push_str(&format!("  {}\n", line.cyan()));
  out.push_str(&format!(
    "  {} → {}   min {}  max {}\n",
    points[0].date,
    points[points.len() - 1].date,
    format_number(min),
    format_number(max)
  ));
  out
}

pub fn render_charts(series: &[SeriesPoint], width: usize) -> String {
  format!(
    "{}\n{}",
    render_chart("Model Latency Over Time", series, |p| p.latency, width),
    render_chart("Token Usage Over Time", series, |p| p.token_usage, width)
  )
}

pub fn render_alerts(alerts: &[String]) -> String {
  let mut out = format!("{}\n", "Alerts".bold());
  if alerts.is_empty() {
    out.push_str(&format!("  {} {}\n", "✓".green(), "No active alerts.".green()));
  } else {
    for alert in alerts {
      out.push_str(&format!("  {} {}\n", "✗".red(), alert.red()));
    }
  }
  out
}

fn cell_text(value: Option<&Value>) -> String {
  match value {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
    Some(other) => other.to_string(),
  }
}

pub fn render_logs(logs: &LogTable) -> String {
  let mut out = format!("{}\n", "Logs".bold());
  if logs.rows.is_empty() {
    out.push_str(&format!("  {}\n", "No log entries".dimmed()));
    return out;
  }

  let cells: Vec<Vec<String>> = logs
    .rows
    .iter()
    .map(|row| logs.columns.iter().map(|c| cell_text(row.get(c))).collect())
    .collect();

  let widths: Vec<usize> = logs
    .columns
    .iter()
    .enumerate()
    .map(|(i, col)| cells.iter().map(|r| r[i].chars().count()).chain([col.chars().count()]).max().unwrap_or(0))
    .collect();

  let header: Vec<String> =
    logs.columns.iter().zip(&widths).map(|(c, w)| format!("{c:<w$}", w = *w)).collect();
  out.push_str(&format!("  {}\n", header.join(" | ").bold()));
  let rule: Vec<String> = widths.iter().map(|w| banner_line(*w, '-')).collect();
  out.push_str(&format!("  {}\n", rule.join("-+-")));

  for row in cells {
    let padded: Vec<String> = row.iter().zip(&widths).map(|(c, w)| format!("{c:<w$}", w = *w)).collect();
    out.push_str(&format!("  {}\n", padded.join(" | ")));
  }
  out
}

/// Comments are expected most recent first
pub fn render_comments(comments: &[Comment]) -> String {
  let mut out = format!("{}\n", "Team Comments".bold());
  if comments.is_empty() {
    out.push_str(&format!("  {}\n", "No comments yet".dimmed()));
  }
  for comment in comments {
    out.push_str(&format!("  [{}] {}: {}\n", comment.timestamp.dimmed(), comment.author.cyan(), comment.text));
  }
  out
}

pub fn render_dashboard(view: &DashboardView, comments: &[Comment], width: usize) -> String {
  [
    render_header(view, width),
    render_kpis(&view.kpis),
    render_charts(&view.series, width),
    render_alerts(&view.alerts),
    render_logs(&view.logs),
    render_comments(comments),
  ]
  .join("\n")
}

pub fn print_dashboard(view: &DashboardView, comments: &[Comment]) {
  print!("{}", render_dashboard(view, comments, terminal_width()));
}
