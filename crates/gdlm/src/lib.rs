//! GDLM - GenAI Deployment Lifecycle Manager
//!
//! Dashboard core for deployed model versions: catalog lookup, date-filtered
//! latency and token usage series, headline KPIs, alerts, logs and a team
//! comment log. Rendered in the terminal by the `gdlm` binary and served as
//! JSON by `gdlm_server`.

pub mod actions;
pub mod cli;
pub mod comments;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod store;
pub mod view;

pub use error::{GdlmError, Result};
