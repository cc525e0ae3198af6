//! Logging setup and console status output.
//!
//! Diagnostics go through `tracing`. Human-facing status lines (errors,
//! warnings, acknowledgements) are written to stderr with a short colored
//! level prefix so they stay out of the way of rendered output on stdout.

use colored::*;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` raises gdlm to debug.
pub fn init(verbose: bool) {
  let default = if verbose { "gdlm=debug,tower_http=debug,warn" } else { "gdlm=warn,warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  // A second init (as in tests running several commands) is harmless
  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .try_init();
}

/// Format a colored prefix for status lines
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

fn emit(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    eprintln!("{prefix} {line}");
  }
}

pub fn info(message: &str) {
  emit(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  emit(Color::Yellow, "warn", message);
}

pub fn error(message: &str) {
  emit(Color::Red, "error", message);
}

pub fn success(message: &str) {
  emit(Color::Green, "sccs", message);
}
