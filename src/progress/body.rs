//! Body measurements - BMI and time-window filtering

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;

use crate::db::MeasurementEntry;

/// Shown when a value cannot be computed
pub const UNRECORDED: &str = "未记录";

/// BMI = weight / height_m², `height_cm` in centimetres
pub fn bmi(weight: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let (weight, height_cm) = (weight?, height_cm?);
    if weight <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight / (height_m * height_m))
}

/// BMI to one decimal, or the unrecorded marker
pub fn format_bmi(weight: Option<f64>, height_cm: Option<f64>) -> String {
    match bmi(weight, height_cm) {
        Some(value) => format!("{:.1}", value),
        None => UNRECORDED.to_string(),
    }
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{} {}", v, unit))
        .unwrap_or_else(|| UNRECORDED.to_string())
}

/// Relative window for the weight history view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
pub enum TimeWindow {
    #[value(name = "7d")]
    Week,
    #[value(name = "1m")]
    Month,
    #[value(name = "6m")]
    HalfYear,
    #[value(name = "1y")]
    Year,
    #[default]
    All,
}

impl TimeWindow {
    pub fn days(&self) -> Option<i64> {
        match self {
            TimeWindow::Week => Some(7),
            TimeWindow::Month => Some(30),
            TimeWindow::HalfYear => Some(180),
            TimeWindow::Year => Some(360),
            TimeWindow::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Week => "近7天",
            TimeWindow::Month => "近1月",
            TimeWindow::HalfYear => "近6月",
            TimeWindow::Year => "近1年",
            TimeWindow::All => "全部",
        }
    }

    /// Cycle order used by the dashboard
    pub fn next(&self) -> TimeWindow {
        match self {
            TimeWindow::Week => TimeWindow::Month,
            TimeWindow::Month => TimeWindow::HalfYear,
            TimeWindow::HalfYear => TimeWindow::Year,
            TimeWindow::Year => TimeWindow::All,
            TimeWindow::All => TimeWindow::Week,
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.days() {
            Some(days) => date >= today - Duration::days(days),
            None => true,
        }
    }

    /// Entries dated inside the window ending at `today`
    pub fn filter<'a>(&self, entries: &'a [MeasurementEntry], today: NaiveDate) -> Vec<&'a MeasurementEntry> {
        entries.iter().filter(|e| self.contains(e.date, today)).collect()
    }
}

/// Height is rarely re-entered; take the most recent one recorded
pub fn latest_height(entries: &[MeasurementEntry]) -> Option<f64> {
    entries
        .iter()
        .filter(|e| e.height.is_some())
        .max_by_key(|e| e.date)
        .and_then(|e| e.height)
}

/// Summary of the newest measurement
pub fn latest_summary(entries: &[MeasurementEntry]) -> Option<String> {
    let latest = entries.iter().max_by_key(|e| (e.date, e.id))?;
    let height = latest.height.or_else(|| latest_height(entries));
    Some(
        [
            format!("日期: {}", latest.date),
            format!("体重: {} kg", latest.weight),
            format!("BMI: {}", format_bmi(Some(latest.weight), height)),
            format!("胸围: {}", format_optional(latest.chest, "cm")),
            format!("腰围: {}", format_optional(latest.waist, "cm")),
            format!("臀围: {}", format_optional(latest.hip, "cm")),
        ]
        .join("\n"),
    )
}

/// One line per measurement
pub fn render_history(entries: &[&MeasurementEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| {
            format!(
                "{} | {:>6.1} kg | BMI {}",
                e.date,
                e.weight,
                format_bmi(Some(e.weight), e.height)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(weight: f64, date: NaiveDate, height: Option<f64>) -> MeasurementEntry {
        MeasurementEntry {
            id: None,
            weight,
            date,
            chest: None,
            waist: None,
            hip: None,
            height,
        }
    }

    #[test]
    fn test_bmi_value() {
        assert_eq!(format_bmi(Some(70.0), Some(175.0)), "22.9");
        assert_eq!(format_bmi(Some(80.0), Some(180.0)), "24.7");
    }

    #[test]
    fn test_bmi_missing_input() {
        assert_eq!(format_bmi(Some(70.0), None), UNRECORDED);
        assert_eq!(format_bmi(None, Some(175.0)), UNRECORDED);
        assert_eq!(format_bmi(Some(70.0), Some(0.0)), UNRECORDED);
    }

    #[test]
    fn test_week_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let entries = vec![
            entry(71.0, today - Duration::days(10), None),
            entry(70.5, today - Duration::days(2), None),
        ];
        let filtered = TimeWindow::Week.filter(&entries, today);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].weight, 70.5);

        assert_eq!(TimeWindow::All.filter(&entries, today).len(), 2);
        assert_eq!(TimeWindow::Month.filter(&entries, today).len(), 2);
    }

    #[test]
    fn test_window_lengths() {
        assert_eq!(TimeWindow::Week.days(), Some(7));
        assert_eq!(TimeWindow::Month.days(), Some(30));
        assert_eq!(TimeWindow::HalfYear.days(), Some(180));
        assert_eq!(TimeWindow::Year.days(), Some(360));
        assert_eq!(TimeWindow::All.days(), None);
        assert_eq!(TimeWindow::All.next(), TimeWindow::Week);
    }

    #[test]
    fn test_latest_summary_uses_previous_height() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let entries = vec![entry(72.0, d1, Some(175.0)), entry(70.0, d2, None)];
        let summary = latest_summary(&entries).unwrap();
        assert!(summary.contains("体重: 70 kg"));
        assert!(summary.contains("BMI: 22.9"));
        assert!(summary.contains("胸围: 未记录"));
        assert!(latest_summary(&[]).is_none());
    }
}
