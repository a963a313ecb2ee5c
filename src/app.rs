//! Application context and form handlers
//!
//! [`AppContext`] owns the store handle and the training profile. Every
//! handler validates its form, writes through the store and reports which
//! views are now stale.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{Database, ExerciseEntry, MeasurementEntry};
use crate::error::{AppError, AppResult};
use crate::forms::{ExerciseForm, MeasurementForm, SetForm};
use crate::plan::{self, Day, PlanDay, Profile, SessionParams};
use crate::progress::{AchievementStatus, History, Trend};

/// Views a handler invalidated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Plan,
    Progress(String),
    Measurements,
    Achievements,
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub id: Option<i64>,
    pub refresh: Vec<View>,
}

/// How the user points at a custom exercise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseRef {
    Id(i64),
    Named { day: Day, name: String },
}

pub struct AppContext {
    db: Database,
    profile: Profile,
}

impl AppContext {
    /// Open the store. An error here leaves the app unusable.
    pub fn init(config: &Config) -> AppResult<Self> {
        let db = Database::open(&config.db_path)?;
        info!(
            "Profile: {:?} / {:?}",
            config.profile.level, config.profile.goal
        );
        Ok(Self::with_database(db, config.profile))
    }

    pub fn with_database(db: Database, profile: Profile) -> Self {
        Self { db, profile }
    }

    pub fn teardown(self) -> AppResult<()> {
        self.db.close()
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn session_params(&self) -> SessionParams {
        self.profile.session_params()
    }

    /// Effective weekly plan
    pub fn plan(&self) -> AppResult<Vec<PlanDay>> {
        Ok(plan::compose(&self.db.get_exercises()?))
    }

    pub fn today(&self, date: NaiveDate) -> AppResult<PlanDay> {
        Ok(plan::today(&self.plan()?, date))
    }

    pub fn history(&self) -> AppResult<History> {
        Ok(History::new(self.db.get_progress()?))
    }

    pub fn measurements(&self) -> AppResult<Vec<MeasurementEntry>> {
        self.db.get_measurements()
    }

    /// Weight trend over the full, unfiltered history
    pub fn trend(&self) -> AppResult<Option<Trend>> {
        Ok(Trend::from_measurements(&self.measurements()?))
    }

    pub fn achievements(&self) -> AppResult<Vec<AchievementStatus>> {
        Ok(self.history()?.achievements())
    }

    /// Log a set and its equipment companion
    pub fn log_set(&mut self, exercise: &str, form: &SetForm, now: DateTime<Utc>) -> AppResult<Outcome> {
        let entry = form.validate(exercise, now).inspect_err(|e| {
            warn!("Rejected set for {}: {}", exercise, e);
        })?;
        let (id, _) = self.db.log_set(&entry)?;
        Ok(Outcome {
            id: Some(id),
            refresh: vec![View::Progress(entry.exercise), View::Achievements],
        })
    }

    pub fn log_measurement(&self, form: &MeasurementForm) -> AppResult<Outcome> {
        let entry = form.validate().inspect_err(|e| {
            warn!("Rejected measurement: {}", e);
        })?;
        let id = self.db.add_measurement(&entry)?;
        Ok(Outcome {
            id: Some(id),
            refresh: vec![View::Measurements],
        })
    }

    pub fn add_exercise(&self, form: &ExerciseForm) -> AppResult<Outcome> {
        let entry = form.validate().inspect_err(|e| {
            warn!("Rejected exercise: {}", e);
        })?;
        let id = self.db.add_exercise(&entry)?;
        Ok(Outcome {
            id: Some(id),
            refresh: vec![View::Plan],
        })
    }

    /// Find the custom exercise `target` points at
    pub fn resolve(&self, target: &ExerciseRef) -> AppResult<ExerciseEntry> {
        match target {
            ExerciseRef::Id(id) => self.db.get_exercise(*id)?.ok_or(AppError::NotFound(*id)),
            ExerciseRef::Named { day, name } => {
                let mut matches: Vec<ExerciseEntry> = self
                    .db
                    .get_exercises()?
                    .into_iter()
                    .filter(|e| e.day == *day && e.name == *name)
                    .collect();
                match matches.len() {
                    0 if plan::is_template_exercise(*day, name) => {
                        Err(AppError::TemplateLocked(name.clone()))
                    }
                    0 => Err(AppError::NoSuchExercise {
                        name: name.clone(),
                        day: *day,
                    }),
                    1 => Ok(matches.remove(0)),
                    _ => Err(AppError::Ambiguous {
                        name: name.clone(),
                        day: *day,
                        ids: matches.iter().filter_map(|e| e.id).collect(),
                    }),
                }
            }
        }
    }

    pub fn edit_exercise(&self, target: &ExerciseRef, form: &ExerciseForm) -> AppResult<Outcome> {
        let mut entry = self.resolve(target)?;
        form.apply_to(&mut entry)?;
        if !self.db.update_exercise(&entry)? {
            return Err(AppError::NotFound(entry.id.unwrap_or_default()));
        }
        info!("Edited exercise {:?} -> {} on {}", entry.id, entry.name, entry.day);
        Ok(Outcome {
            id: entry.id,
            refresh: vec![View::Plan],
        })
    }

    pub fn delete_exercise(&self, target: &ExerciseRef) -> AppResult<Outcome> {
        let entry = self.resolve(target)?;
        let id = entry.id.unwrap_or_default();
        if !self.db.delete_exercise(id)? {
            return Err(AppError::NotFound(id));
        }
        info!("Deleted exercise {} ({})", entry.name, id);
        Ok(Outcome {
            id: Some(id),
            refresh: vec![View::Plan],
        })
    }

    /// Wipe every collection
    pub fn clear_history(&mut self) -> AppResult<Outcome> {
        self.db.clear_all()?;
        Ok(Outcome {
            id: None,
            refresh: vec![View::Plan, View::Measurements, View::Achievements],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AppContext {
        AppContext::with_database(Database::open_in_memory().unwrap(), Profile::default())
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn set_form(weight: &str, reps: &str) -> SetForm {
        SetForm {
            weight: s(weight),
            reps: s(reps),
            equipment_weight: s("10"),
        }
    }

    fn exercise_form(name: &str, day: &str) -> ExerciseForm {
        ExerciseForm {
            name: s(name),
            video: None,
            day: s(day),
        }
    }

    #[test]
    fn test_log_set_persists_pair() {
        let mut app = ctx();
        let outcome = app.log_set("深蹲", &set_form("100", "5"), Utc::now()).unwrap();
        assert!(outcome.refresh.contains(&View::Progress("深蹲".to_string())));

        let progress = app.db().get_progress().unwrap();
        let equipment = app.db().get_equipment().unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(equipment.len(), 1);
        assert_eq!(progress[0].exercise, equipment[0].exercise);
        assert_eq!(progress[0].date, equipment[0].date);
        assert_eq!(equipment[0].equipment_weight, 10.0);
    }

    #[test]
    fn test_invalid_set_writes_nothing() {
        let mut app = ctx();
        for (weight, reps) in [("0", "5"), ("100", "0"), ("", "5"), ("100", ""), ("-1", "-1")] {
            let err = app.log_set("深蹲", &set_form(weight, reps), Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{weight}/{reps}");
        }
        assert!(app.db().counts().unwrap().is_empty());
    }

    #[test]
    fn test_custom_exercise_shows_in_plan() {
        let app = ctx();
        app.add_exercise(&exercise_form("哑铃飞鸟", "周一")).unwrap();
        app.add_exercise(&exercise_form("冥想", "周日")).unwrap();

        let plan = app.plan().unwrap();
        let monday = &plan[0];
        assert_eq!(monday.exercises.last().unwrap().name, "哑铃飞鸟");
        let sunday = &plan[6];
        assert!(sunday.exercises.is_empty());

        // 2024-01-01 is a Monday
        let today = app.today(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        assert_eq!(today.day, Day::Monday);
        assert!(today.exercises.iter().any(|e| e.name == "哑铃飞鸟"));
    }

    #[test]
    fn test_edit_and_delete_by_id() {
        let app = ctx();
        let id = app.add_exercise(&exercise_form("哑铃飞鸟", "周一")).unwrap().id.unwrap();

        app.edit_exercise(&ExerciseRef::Id(id), &exercise_form("蝴蝶机夹胸", "")).unwrap();
        let edited = app.db().get_exercise(id).unwrap().unwrap();
        assert_eq!(edited.name, "蝴蝶机夹胸");
        assert_eq!(edited.day, Day::Monday);

        app.delete_exercise(&ExerciseRef::Id(id)).unwrap();
        assert!(app.db().get_exercises().unwrap().is_empty());
    }

    #[test]
    fn test_lookup_misses_change_nothing() {
        let app = ctx();
        let err = app.delete_exercise(&ExerciseRef::Id(99)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(99)));

        let template = ExerciseRef::Named {
            day: Day::Thursday,
            name: "深蹲".to_string(),
        };
        let err = app.edit_exercise(&template, &exercise_form("前蹲", "")).unwrap_err();
        assert!(matches!(err, AppError::TemplateLocked(_)));

        let unknown = ExerciseRef::Named {
            day: Day::Monday,
            name: "不存在".to_string(),
        };
        assert!(matches!(
            app.delete_exercise(&unknown).unwrap_err(),
            AppError::NoSuchExercise { .. }
        ));
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        let app = ctx();
        let a = app.add_exercise(&exercise_form("跑步", "周六")).unwrap().id.unwrap();
        let b = app.add_exercise(&exercise_form("跑步", "周六")).unwrap().id.unwrap();
        let target = ExerciseRef::Named {
            day: Day::Saturday,
            name: "跑步".to_string(),
        };
        match app.delete_exercise(&target).unwrap_err() {
            AppError::Ambiguous { ids, .. } => assert_eq!(ids, vec![a, b]),
            other => panic!("unexpected {other}"),
        }
        // by id still works
        app.delete_exercise(&ExerciseRef::Id(a)).unwrap();
        app.delete_exercise(&target).unwrap();
        assert!(app.db().get_exercises().unwrap().is_empty());
    }

    #[test]
    fn test_clear_resets_achievements() {
        let mut app = ctx();
        app.log_set("深蹲", &set_form("60", "12"), Utc::now()).unwrap();
        app.log_measurement(&MeasurementForm {
            weight: s("70"),
            date: s("2024-01-01"),
            ..Default::default()
        })
        .unwrap();
        assert!(app.achievements().unwrap().iter().any(|a| a.unlocked));

        app.clear_history().unwrap();
        assert!(app.db().counts().unwrap().is_empty());
        assert!(app.achievements().unwrap().iter().all(|a| !a.unlocked));
        assert!(app.trend().unwrap().is_none());
    }

    #[test]
    fn test_trend_uses_full_history() {
        let app = ctx();
        for (weight, date) in [("70", "2024-01-01"), ("71.5", "2024-01-08")] {
            app.log_measurement(&MeasurementForm {
                weight: s(weight),
                date: s(date),
                ..Default::default()
            })
            .unwrap();
        }
        let trend = app.trend().unwrap().unwrap();
        assert_eq!(trend.direction, crate::progress::TrendDirection::Gaining);
    }

    #[test]
    fn test_init_and_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("fit.db"),
            ..Config::default()
        };
        let app = AppContext::init(&config).unwrap();
        assert_eq!(app.session_params().rest_secs, 90);
        app.teardown().unwrap();
    }
}
