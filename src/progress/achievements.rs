//! Achievements - derived from history on every check, never stored

use std::collections::HashSet;

use serde::Serialize;

use super::training_date;
use crate::db::ProgressEntry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// At least `reps` in a single set of `exercise`
    RepsOnExercise { exercise: &'static str, reps: i32 },
    /// Sets logged on at least `days` different dates
    DistinctTrainingDays { days: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rule: Rule,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "squat_10",
        title: "深蹲达人",
        description: "单组深蹲完成 10 次以上",
        rule: Rule::RepsOnExercise { exercise: "深蹲", reps: 10 },
    },
    Achievement {
        id: "days_30",
        title: "坚持不懈",
        description: "累计训练 30 天",
        rule: Rule::DistinctTrainingDays { days: 30 },
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Training dates are counted by the same local day the listings show
fn distinct_days(entries: &[ProgressEntry]) -> usize {
    entries
        .iter()
        .map(|e| training_date(&e.date))
        .collect::<HashSet<_>>()
        .len()
}

impl Rule {
    pub fn is_met(&self, entries: &[ProgressEntry]) -> bool {
        match self {
            Rule::RepsOnExercise { exercise, reps } => entries
                .iter()
                .any(|e| e.exercise == *exercise && e.reps >= *reps),
            Rule::DistinctTrainingDays { days } => distinct_days(entries) >= *days,
        }
    }
}

/// Evaluate every achievement against the progress history
pub fn evaluate(entries: &[ProgressEntry]) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|a| AchievementStatus {
            id: a.id,
            title: a.title,
            description: a.description,
            unlocked: a.rule.is_met(entries),
        })
        .collect()
}

pub fn render(statuses: &[AchievementStatus]) -> Vec<String> {
    statuses
        .iter()
        .map(|s| {
            let mark = if s.unlocked { "[x]" } else { "[ ]" };
            format!("{} {} - {}", mark, s.title, s.description)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    // Noon UTC keeps consecutive days on distinct local dates
    fn set(exercise: &str, reps: i32, days_ago: i64) -> ProgressEntry {
        ProgressEntry {
            id: None,
            exercise: exercise.to_string(),
            weight: 60.0,
            reps,
            equipment_weight: 0.0,
            date: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap() - Duration::days(days_ago),
        }
    }

    fn unlocked(statuses: &[AchievementStatus], id: &str) -> bool {
        statuses.iter().find(|s| s.id == id).unwrap().unlocked
    }

    #[test]
    fn test_nothing_unlocked_on_empty_history() {
        let statuses = evaluate(&[]);
        assert_eq!(statuses.len(), ACHIEVEMENTS.len());
        assert!(statuses.iter().all(|s| !s.unlocked));
    }

    #[test]
    fn test_reps_achievement() {
        assert!(!unlocked(&evaluate(&[set("深蹲", 9, 0)]), "squat_10"));
        assert!(unlocked(&evaluate(&[set("深蹲", 10, 0)]), "squat_10"));
        // Other exercises do not count
        assert!(!unlocked(&evaluate(&[set("卧推", 15, 0)]), "squat_10"));
    }

    #[test]
    fn test_distinct_days_achievement() {
        // Two sets a day for 29 days: still locked
        let mut history: Vec<_> = (0..29)
            .flat_map(|d| [set("卧推", 8, d), set("深蹲", 8, d)])
            .collect();
        assert!(!unlocked(&evaluate(&history), "days_30"));

        history.push(set("卧推", 8, 40));
        assert!(unlocked(&evaluate(&history), "days_30"));
    }

    #[test]
    fn test_sets_on_one_listed_day_count_once() {
        let morning = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let history: Vec<_> = (0..30)
            .map(|i| ProgressEntry {
                date: morning + Duration::minutes(i),
                ..set("深蹲", 8, 0)
            })
            .collect();
        assert_eq!(distinct_days(&history), 1);
        assert!(!unlocked(&evaluate(&history), "days_30"));
    }

    #[test]
    fn test_render_marks() {
        let lines = render(&evaluate(&[set("深蹲", 12, 0)]));
        assert!(lines[0].starts_with("[x] 深蹲达人"));
        assert!(lines[1].starts_with("[ ]"));
    }
}
