use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use gdlm::actions::Action;
use gdlm::cli::commands::{self, parse_date_arg, OutputFormat};
use gdlm::config::Config;
use gdlm::logging;

#[derive(Parser)]
#[command(name = "gdlm")]
#[command(
  about = "GDLM - GenAI Deployment Lifecycle Manager\nLatency, token usage, accuracy and cost dashboards for deployed model versions"
)]
#[command(version)]
struct Cli {
  /// Configuration file (defaults to .gdlm.json or gdlm.json in the working directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Model catalog document
  #[arg(long, global = true)]
  catalog: Option<PathBuf>,

  /// Metrics document
  #[arg(long, global = true)]
  metrics: Option<PathBuf>,

  /// Keep comments in this JSON-lines file instead of the current session
  #[arg(long, global = true)]
  comments: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Common model selection arguments
#[derive(Args)]
struct ModelSelection {
  /// Model name
  #[arg(short, long)]
  model: String,
  /// Model version (defaults to the first version in the catalog)
  #[arg(long = "model-version")]
  model_version: Option<String>,
}

#[derive(Subcommand)]
enum Command {
  /// List models and their versions
  Models,
  /// Render the dashboard for a model version
  Show {
    #[command(flatten)]
    selection: ModelSelection,
    /// First day to chart (defaults to the start of the configured window)
    #[arg(long, value_parser = parse_date_arg)]
    start: Option<NaiveDate>,
    /// Last day to chart (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    end: Option<NaiveDate>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
  },
  /// Show active alerts for a model version
  Alerts {
    #[command(flatten)]
    selection: ModelSelection,
  },
  /// Show the deployment log for a model version
  Logs {
    #[command(flatten)]
    selection: ModelSelection,
  },
  /// Mark a model for retraining
  Retrain {
    /// Model name
    #[arg(short, long)]
    model: String,
  },
  /// Roll a model back to its previous version
  Rollback {
    /// Model name
    #[arg(short, long)]
    model: String,
  },
  /// Post or read team comments
  #[command(subcommand)]
  Comment(CommentCommand),
}

#[derive(Subcommand)]
enum CommentCommand {
  /// Post a comment
  Add {
    /// Your name
    #[arg(short, long)]
    author: String,
    /// Comment text
    #[arg(short, long)]
    text: String,
  },
  /// List comments, most recent first
  List,
}

fn load_config(cli: &Cli) -> Result<Config> {
  let mut config = Config::load(cli.config.as_deref())?;

  if let Some(catalog) = &cli.catalog {
    config.catalog = catalog.clone();
  }
  if let Some(metrics) = &cli.metrics {
    config.metrics = Some(metrics.clone());
  }
  if let Some(comments) = &cli.comments {
    config.use_comment_file(comments.clone());
  }
  Ok(config)
}

fn run(cli: Cli) -> Result<()> {
  let config = load_config(&cli)?;

  match cli.command {
    Command::Models => commands::list_models(&config),
    Command::Show { selection, start, end, format } => commands::show(
      &config,
      &selection.model,
      selection.model_version.as_deref(),
      start,
      end,
      format,
    ),
    Command::Alerts { selection } => {
      commands::alerts(&config, &selection.model, selection.model_version.as_deref())
    }
    Command::Logs { selection } => {
      commands::logs(&config, &selection.model, selection.model_version.as_deref())
    }
    Command::Retrain { model } => commands::lifecycle_action(&config, Action::Retrain, &model),
    Command::Rollback { model } => commands::lifecycle_action(&config, Action::Rollback, &model),
    Command::Comment(CommentCommand::Add { author, text }) => {
      commands::add_comment(&config, &author, &text)
    }
    Command::Comment(CommentCommand::List) => commands::list_comments(&config),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  logging::init(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      logging::error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
