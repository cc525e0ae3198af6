//! REST API for the dashboard
//!
//! Serves the same views as the terminal renderer as JSON, so a browser
//! front end can draw the cards and charts.

pub mod handlers;
pub mod routing;
pub mod startup;
pub mod state;
pub mod types;
