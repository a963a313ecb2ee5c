//! Runtime configuration

use std::path::PathBuf;

use crate::plan::{Goal, Level, Profile};

/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "fitweek.db";

/// Settings resolved from the command line, environment and `.env`
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub profile: Profile,
}

impl Config {
    pub fn new(db_path: impl Into<PathBuf>, level: Level, goal: Goal) -> Self {
        Self {
            db_path: db_path.into(),
            profile: Profile { level, goal },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH, Level::default(), Goal::default())
    }
}
