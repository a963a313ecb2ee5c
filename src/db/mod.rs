//! Database module - SQLite storage for training data
//!
//! Four independent collections, one table each: progress, measurements,
//! equipment and custom exercises.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::plan::Day;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// One logged working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: Option<i64>,
    pub exercise: String,
    pub weight: f64,
    pub reps: i32,
    pub equipment_weight: f64,
    pub date: DateTime<Utc>,
}

/// Body measurement snapshot. Lengths in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    pub id: Option<i64>,
    pub weight: f64,
    pub date: NaiveDate,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub height: Option<f64>,
}

/// Companion record of a [`ProgressEntry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    pub id: Option<i64>,
    pub exercise: String,
    pub equipment_weight: f64,
    pub date: DateTime<Utc>,
}

/// User-added exercise attached to a day of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: Option<i64>,
    pub name: String,
    pub video: Option<String>,
    pub day: Day,
}

/// Row counts per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub progress: usize,
    pub measurements: usize,
    pub equipment: usize,
    pub exercises: usize,
}

impl Counts {
    pub fn is_empty(&self) -> bool {
        *self == Counts::default()
    }
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database. Failure here is fatal for the app.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let unavailable = |source| AppError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(unavailable)?;
        let db = Self { conn };
        db.init_schema().map_err(unavailable)?;
        info!("Opened database {}", path.display());
        Ok(db)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Close the connection explicitly
    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> AppResult<()> {
        self.conn.close().map_err(|(_, e)| AppError::Storage(e))
    }

    pub fn schema_version(&self) -> AppResult<i64> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    /// Initialize database schema
    ///
    /// Upgrading an older store only makes sure every table exists;
    /// existing rows are left untouched.
    fn init_schema(&self) -> rusqlite::Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < SCHEMA_VERSION {
            info!("Upgrading schema from v{} to v{}", version, SCHEMA_VERSION);
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS progress (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    exercise TEXT NOT NULL,
                    weight REAL NOT NULL,
                    reps INTEGER NOT NULL,
                    equipment_weight REAL NOT NULL DEFAULT 0,
                    date TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS measurements (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    weight REAL NOT NULL,
                    date TEXT NOT NULL,
                    chest REAL,
                    waist REAL,
                    hip REAL,
                    height REAL
                );

                CREATE TABLE IF NOT EXISTS equipment (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    exercise TEXT NOT NULL,
                    equipment_weight REAL NOT NULL,
                    date TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS exercises (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    video TEXT,
                    day INTEGER NOT NULL CHECK (day BETWEEN 0 AND 6)
                );",
            )?;
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    /// Add a progress record on its own, without the equipment companion
    pub fn add_progress(&self, entry: &ProgressEntry) -> AppResult<i64> {
        insert_progress(&self.conn, entry)
    }

    /// Log a set: progress record plus its equipment companion, atomically
    pub fn log_set(&mut self, entry: &ProgressEntry) -> AppResult<(i64, i64)> {
        let tx = self.conn.transaction()?;
        let progress_id = insert_progress(&tx, entry)?;
        let equipment_id = insert_equipment(
            &tx,
            &EquipmentEntry {
                id: None,
                exercise: entry.exercise.clone(),
                equipment_weight: entry.equipment_weight,
                date: entry.date,
            },
        )?;
        tx.commit()?;
        info!(
            "Logged set: {} {}kg x{} (progress {}, equipment {})",
            entry.exercise, entry.weight, entry.reps, progress_id, equipment_id
        );
        Ok((progress_id, equipment_id))
    }

    /// Get all progress records, oldest first
    pub fn get_progress(&self) -> AppResult<Vec<ProgressEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exercise, weight, reps, equipment_weight, date FROM progress ORDER BY date ASC, id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(ProgressEntry {
                    id: Some(row.get(0)?),
                    exercise: row.get(1)?,
                    weight: row.get(2)?,
                    reps: row.get(3)?,
                    equipment_weight: row.get(4)?,
                    date: parse_timestamp(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} progress entries", entries.len());
        Ok(entries)
    }

    pub fn add_equipment(&self, entry: &EquipmentEntry) -> AppResult<i64> {
        insert_equipment(&self.conn, entry)
    }

    pub fn get_equipment(&self) -> AppResult<Vec<EquipmentEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exercise, equipment_weight, date FROM equipment ORDER BY date ASC, id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(EquipmentEntry {
                    id: Some(row.get(0)?),
                    exercise: row.get(1)?,
                    equipment_weight: row.get(2)?,
                    date: parse_timestamp(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Add body measurement
    pub fn add_measurement(&self, entry: &MeasurementEntry) -> AppResult<i64> {
        self.conn.execute(
            "INSERT INTO measurements (weight, date, chest, waist, hip, height) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.weight,
                entry.date.format("%Y-%m-%d").to_string(),
                entry.chest,
                entry.waist,
                entry.hip,
                entry.height,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Logged measurement {}kg on {} (id: {})", entry.weight, entry.date, id);
        Ok(id)
    }

    /// Get all measurements, oldest first
    pub fn get_measurements(&self) -> AppResult<Vec<MeasurementEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, weight, date, chest, waist, hip, height FROM measurements ORDER BY date ASC, id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                let date_str: String = row.get(2)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
                })?;
                Ok(MeasurementEntry {
                    id: Some(row.get(0)?),
                    weight: row.get(1)?,
                    date,
                    chest: row.get(3)?,
                    waist: row.get(4)?,
                    hip: row.get(5)?,
                    height: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} measurements", entries.len());
        Ok(entries)
    }

    /// Add custom exercise
    pub fn add_exercise(&self, entry: &ExerciseEntry) -> AppResult<i64> {
        self.conn.execute(
            "INSERT INTO exercises (name, video, day) VALUES (?1, ?2, ?3)",
            params![entry.name, entry.video, entry.day.index()],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Added exercise {} on {} (id: {})", entry.name, entry.day, id);
        Ok(id)
    }

    /// Get all custom exercises in insertion order
    pub fn get_exercises(&self) -> AppResult<Vec<ExerciseEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, video, day FROM exercises ORDER BY id ASC")?;
        let entries = stmt
            .query_map([], exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_exercise(&self, id: i64) -> AppResult<Option<ExerciseEntry>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, video, day FROM exercises WHERE id = ?1",
                params![id],
                exercise_from_row,
            )
            .optional()?)
    }

    /// Update a custom exercise by id. Returns false if no such row.
    pub fn update_exercise(&self, entry: &ExerciseEntry) -> AppResult<bool> {
        let Some(id) = entry.id else {
            return Ok(false);
        };
        let changed = self.conn.execute(
            "UPDATE exercises SET name = ?1, video = ?2, day = ?3 WHERE id = ?4",
            params![entry.name, entry.video, entry.day.index(), id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a custom exercise by id. Returns false if no such row.
    pub fn delete_exercise(&self, id: i64) -> AppResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Wipe every collection in one transaction
    pub fn clear_all(&mut self) -> AppResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM progress;
             DELETE FROM measurements;
             DELETE FROM equipment;
             DELETE FROM exercises;",
        )?;
        tx.commit()?;
        info!("Cleared all collections");
        Ok(())
    }

    pub fn counts(&self) -> AppResult<Counts> {
        let count = |table: &str| -> AppResult<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        };
        Ok(Counts {
            progress: count("progress")?,
            measurements: count("measurements")?,
            equipment: count("equipment")?,
            exercises: count("exercises")?,
        })
    }
}

fn insert_progress(conn: &Connection, entry: &ProgressEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO progress (exercise, weight, reps, equipment_weight, date) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.exercise,
            entry.weight,
            entry.reps,
            entry.equipment_weight,
            entry.date.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_equipment(conn: &Connection, entry: &EquipmentEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO equipment (exercise, equipment_weight, date) VALUES (?1, ?2, ?3)",
        params![entry.exercise, entry.equipment_weight, entry.date.to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<ExerciseEntry> {
    let day_index: i64 = row.get(3)?;
    let day = Day::from_index(day_index).ok_or(rusqlite::Error::IntegralValueOutOfRange(3, day_index))?;
    Ok(ExerciseEntry {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        video: row.get(2)?,
        day,
    })
}
