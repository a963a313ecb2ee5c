//! Progress module - history listings, body stats and charts
//!
//! Features:
//! - Per-exercise set history and summary
//! - BMI and weight history windows
//! - Weight trend with suggestions
//! - Achievements

pub mod achievements;
pub mod body;
pub mod chart;
pub mod trend;

pub use achievements::{AchievementStatus, evaluate as evaluate_achievements};
pub use body::{TimeWindow, UNRECORDED, format_bmi};
pub use chart::ChartConfig;
pub use trend::{Trend, TrendDirection};

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::db::ProgressEntry;

/// Aggregates for one exercise
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub sets: usize,
    pub best_weight: f64,
    pub total_volume: f64,
    pub last_date: DateTime<Utc>,
}

/// Progress history analytics
pub struct History {
    entries: Vec<ProgressEntry>,
}

impl History {
    pub fn new(mut entries: Vec<ProgressEntry>) -> Self {
        entries.sort_by_key(|e| (e.date, e.id));
        Self { entries }
    }

    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    /// Sets of one exercise, oldest first
    pub fn for_exercise<'a>(&'a self, exercise: &'a str) -> impl Iterator<Item = &'a ProgressEntry> + 'a {
        self.entries.iter().filter(move |e| e.exercise == exercise)
    }

    /// Distinct exercise names in order of first appearance
    pub fn exercises(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !names.contains(&e.exercise.as_str()) {
                names.push(&e.exercise);
            }
        }
        names
    }

    pub fn summary(&self, exercise: &str) -> Option<ExerciseSummary> {
        let sets: Vec<_> = self.for_exercise(exercise).collect();
        let last = sets.last()?;
        Some(ExerciseSummary {
            sets: sets.len(),
            best_weight: sets.iter().map(|e| e.weight).fold(0.0, f64::max),
            total_volume: sets.iter().map(|e| e.weight * f64::from(e.reps)).sum(),
            last_date: last.date,
        })
    }

    /// Most recent sets across all exercises, newest first
    pub fn recent(&self, limit: usize) -> Vec<&ProgressEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn achievements(&self) -> Vec<AchievementStatus> {
        evaluate_achievements(&self.entries)
    }
}

/// Calendar day a set belongs to, in local time
pub fn training_date(at: &DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// One line per set
pub fn format_set(e: &ProgressEntry) -> String {
    let equipment = if e.equipment_weight > 0.0 {
        format!(" (器械 {} kg)", e.equipment_weight)
    } else {
        String::new()
    };
    format!(
        "{} | {:12} | {} kg x {}{}",
        e.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        e.exercise,
        e.weight,
        e.reps,
        equipment
    )
}
