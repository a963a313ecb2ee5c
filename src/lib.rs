//! fitweek - Weekly workout plan and progress tracker
//!
//! 练 - a fixed weekly template, your own exercises on top, and the numbers
//! that show whether it is working.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod plan;
pub mod progress;
pub mod timer;
pub mod tui;

pub use app::AppContext;
pub use config::Config;
pub use db::Database;
pub use error::{AppError, AppResult};
