//! Form input validation
//!
//! Forms arrive as raw optional strings, the way a user typed them.
//! Required numeric fields must be present, numeric and positive.
//! Optional numeric fields fall back to 0 or `None` when left blank, and
//! may not be negative when filled in.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::db::{ExerciseEntry, MeasurementEntry, ProgressEntry};
use crate::plan::Day;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("请填写{0}")]
    Missing(&'static str),

    #[error("{field}必须是数字: \"{value}\"")]
    NotANumber { field: &'static str, value: String },

    #[error("{0}必须大于 0")]
    NotPositive(&'static str),

    #[error("{0}不能为负数")]
    Negative(&'static str),

    #[error("日期格式应为 YYYY-MM-DD: \"{0}\"")]
    BadDate(String),

    #[error("未知的星期: \"{0}\"")]
    BadDay(String),
}

/// Log-a-set form
#[derive(Debug, Clone, Default)]
pub struct SetForm {
    pub weight: Option<String>,
    pub reps: Option<String>,
    pub equipment_weight: Option<String>,
}

/// Body measurement form
#[derive(Debug, Clone, Default)]
pub struct MeasurementForm {
    pub weight: Option<String>,
    pub date: Option<String>,
    pub chest: Option<String>,
    pub waist: Option<String>,
    pub hip: Option<String>,
    pub height: Option<String>,
}

/// Add/edit custom exercise form
#[derive(Debug, Clone, Default)]
pub struct ExerciseForm {
    pub name: Option<String>,
    pub video: Option<String>,
    pub day: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(field: &'static str, value: &Option<String>) -> Result<String, ValidationError> {
    present(value)
        .map(str::to_string)
        .ok_or(ValidationError::Missing(field))
}

fn required_positive(field: &'static str, value: &Option<String>) -> Result<f64, ValidationError> {
    let raw = present(value).ok_or(ValidationError::Missing(field))?;
    let number: f64 = raw.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: raw.to_string(),
    })?;
    if !number.is_finite() {
        return Err(ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        });
    }
    if number <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(number)
}

fn optional_number(field: &'static str, value: &Option<String>) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    let number = raw
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
    if number < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(Some(number))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::BadDate(raw.to_string()))
}

impl SetForm {
    /// Build a progress record for `exercise` logged at `now`
    pub fn validate(&self, exercise: &str, now: DateTime<Utc>) -> Result<ProgressEntry, ValidationError> {
        let exercise = required_text("动作名称", &Some(exercise.to_string()))?;
        let weight = required_positive("本次重量", &self.weight)?;
        let reps = required_positive("完成次数", &self.reps)?;
        if reps.fract() != 0.0 || reps > f64::from(i32::MAX) {
            return Err(ValidationError::NotANumber {
                field: "完成次数",
                value: present(&self.reps).unwrap_or_default().to_string(),
            });
        }
        let equipment_weight = optional_number("器械重量", &self.equipment_weight)?.unwrap_or(0.0);

        Ok(ProgressEntry {
            id: None,
            exercise,
            weight,
            reps: reps as i32,
            equipment_weight,
            date: now,
        })
    }
}

impl MeasurementForm {
    pub fn validate(&self) -> Result<MeasurementEntry, ValidationError> {
        let weight = required_positive("体重", &self.weight)?;
        let date = parse_date(&required_text("日期", &self.date)?)?;

        Ok(MeasurementEntry {
            id: None,
            weight,
            date,
            chest: optional_number("胸围", &self.chest)?,
            waist: optional_number("腰围", &self.waist)?,
            hip: optional_number("臀围", &self.hip)?,
            height: optional_number("身高", &self.height)?,
        })
    }
}

impl ExerciseForm {
    pub fn validate(&self) -> Result<ExerciseEntry, ValidationError> {
        let name = required_text("动作名称", &self.name)?;
        let raw_day = required_text("训练日", &self.day)?;
        let day = raw_day
            .parse::<Day>()
            .map_err(|_| ValidationError::BadDay(raw_day.clone()))?;

        Ok(ExerciseEntry {
            id: None,
            name,
            video: present(&self.video).map(str::to_string),
            day,
        })
    }

    /// Edit in place: blank fields keep their current value
    pub fn apply_to(&self, entry: &mut ExerciseEntry) -> Result<(), ValidationError> {
        let day = match present(&self.day) {
            Some(raw) => raw
                .parse::<Day>()
                .map_err(|_| ValidationError::BadDay(raw.to_string()))?,
            None => entry.day,
        };
        if let Some(name) = present(&self.name) {
            entry.name = name.to_string();
        }
        if let Some(video) = present(&self.video) {
            entry.video = Some(video.to_string());
        }
        entry.day = day;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn set_form(weight: Option<String>, reps: Option<String>) -> SetForm {
        SetForm {
            weight,
            reps,
            equipment_weight: None,
        }
    }

    #[test]
    fn test_valid_set() {
        let now = Utc::now();
        let form = SetForm {
            weight: s("62.5"),
            reps: s("8"),
            equipment_weight: s("20"),
        };
        let entry = form.validate("杠铃卧推", now).unwrap();
        assert_eq!(entry.weight, 62.5);
        assert_eq!(entry.reps, 8);
        assert_eq!(entry.equipment_weight, 20.0);
        assert_eq!(entry.date, now);
    }

    #[test]
    fn test_equipment_weight_defaults_to_zero() {
        let entry = set_form(s("40"), s("12")).validate("深蹲", Utc::now()).unwrap();
        assert_eq!(entry.equipment_weight, 0.0);

        let blank = SetForm {
            equipment_weight: s("  "),
            ..set_form(s("40"), s("12"))
        };
        assert_eq!(blank.validate("深蹲", Utc::now()).unwrap().equipment_weight, 0.0);
    }

    #[test]
    fn test_rejects_missing_or_non_positive() {
        let now = Utc::now();
        let cases = [
            (None, s("8"), ValidationError::Missing("本次重量")),
            (s("60"), None, ValidationError::Missing("完成次数")),
            (s("0"), s("8"), ValidationError::NotPositive("本次重量")),
            (s("-5"), s("8"), ValidationError::NotPositive("本次重量")),
            (s("60"), s("0"), ValidationError::NotPositive("完成次数")),
            (s(""), s("8"), ValidationError::Missing("本次重量")),
        ];
        for (weight, reps, expected) in cases {
            let err = set_form(weight, reps).validate("深蹲", now).unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = set_form(s("abc"), s("8")).validate("深蹲", Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: "本次重量", .. }));

        let err = set_form(s("60"), s("7.5")).validate("深蹲", Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: "完成次数", .. }));

        let err = set_form(s("NaN"), s("8")).validate("深蹲", Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { .. }));
    }

    #[test]
    fn test_rejects_blank_exercise_name() {
        let err = set_form(s("60"), s("8")).validate("  ", Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::Missing("动作名称"));
    }

    #[test]
    fn test_measurement_optional_fields() {
        let form = MeasurementForm {
            weight: s("70"),
            date: s("2024-05-01"),
            height: s("175"),
            ..Default::default()
        };
        let entry = form.validate().unwrap();
        assert_eq!(entry.height, Some(175.0));
        assert_eq!(entry.chest, None);
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_measurement_requires_weight_and_date() {
        let no_weight = MeasurementForm {
            date: s("2024-05-01"),
            ..Default::default()
        };
        assert_eq!(no_weight.validate().unwrap_err(), ValidationError::Missing("体重"));

        let no_date = MeasurementForm {
            weight: s("70"),
            ..Default::default()
        };
        assert_eq!(no_date.validate().unwrap_err(), ValidationError::Missing("日期"));

        let bad_date = MeasurementForm {
            weight: s("70"),
            date: s("01/05/2024"),
            ..Default::default()
        };
        assert!(matches!(bad_date.validate().unwrap_err(), ValidationError::BadDate(_)));
    }

    #[test]
    fn test_measurement_rejects_garbage_optional() {
        let form = MeasurementForm {
            weight: s("70"),
            date: s("2024-05-01"),
            waist: s("eighty"),
            ..Default::default()
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::NotANumber { field: "腰围", .. }
        ));
    }

    #[test]
    fn test_rejects_negative_optional_numbers() {
        let form = SetForm {
            equipment_weight: s("-20"),
            ..set_form(s("60"), s("8"))
        };
        assert_eq!(
            form.validate("深蹲", Utc::now()).unwrap_err(),
            ValidationError::Negative("器械重量")
        );

        let form = MeasurementForm {
            weight: s("70"),
            date: s("2024-05-01"),
            height: s("-175"),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::Negative("身高"));
    }

    #[test]
    fn test_exercise_form() {
        let form = ExerciseForm {
            name: s(" 哑铃飞鸟 "),
            video: s(""),
            day: s("周一"),
        };
        let entry = form.validate().unwrap();
        assert_eq!(entry.name, "哑铃飞鸟");
        assert_eq!(entry.video, None);
        assert_eq!(entry.day, Day::Monday);

        let bad = ExerciseForm {
            day: s("someday"),
            ..form
        };
        assert_eq!(bad.validate().unwrap_err(), ValidationError::BadDay("someday".to_string()));
    }

    #[test]
    fn test_apply_to_keeps_blank_fields() {
        let mut entry = ExerciseEntry {
            id: Some(3),
            name: "哑铃飞鸟".to_string(),
            video: Some("https://example.com/a".to_string()),
            day: Day::Monday,
        };
        let form = ExerciseForm {
            name: None,
            video: s(""),
            day: s("周五"),
        };
        form.apply_to(&mut entry).unwrap();
        assert_eq!(entry.name, "哑铃飞鸟");
        assert_eq!(entry.video.as_deref(), Some("https://example.com/a"));
        assert_eq!(entry.day, Day::Friday);

        let bad_day = ExerciseForm {
            name: s("新名字"),
            day: s("?"),
            ..Default::default()
        };
        assert!(bad_day.apply_to(&mut entry).is_err());
        // nothing applied on error
        assert_eq!(entry.name, "哑铃飞鸟");
    }
}
