pub mod actions;
pub mod comments;
pub mod dashboard;
pub mod status;
