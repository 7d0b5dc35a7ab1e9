mod app;
mod effects;
mod files;
pub mod logging;
mod persistence;
mod ui;

pub use app::{run_app, Action, PageConfig};
