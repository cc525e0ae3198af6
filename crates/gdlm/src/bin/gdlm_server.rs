//! GDLM REST Server
//!
//! Serves dashboard views, comments and lifecycle actions as JSON.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use gdlm::config::Config;
use gdlm::logging;
use gdlm::server::startup::start_server;

#[derive(Parser)]
#[command(name = "gdlm_server")]
#[command(about = "GDLM REST API Server")]
#[command(version)]
struct Args {
  /// Configuration file
  #[arg(long)]
  config: Option<PathBuf>,

  /// Server bind address (overrides the config file)
  #[arg(long)]
  bind: Option<SocketAddr>,

  /// Keep comments in this JSON-lines file, shared by all clients
  #[arg(long)]
  comments: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  logging::init(args.verbose);

  let mut config = Config::load(args.config.as_deref())?;
  if let Some(bind) = args.bind {
    config.bind = bind;
  }
  if let Some(comments) = args.comments {
    config.use_comment_file(comments);
  }

  logging::info(&format!("Starting GDLM REST Server v{}", env!("CARGO_PKG_VERSION")));
  logging::info(&format!("Binding to address: {}", config.bind));

  start_server(&config).await
}
