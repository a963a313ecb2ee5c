//! Body weight trend over the full history

use serde::Serialize;

use crate::db::MeasurementEntry;

/// Slope threshold in kg per recorded interval
const THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Gaining,
    Losing,
    Stable,
}

impl TrendDirection {
    pub fn classify(slope: f64) -> Self {
        if slope > THRESHOLD {
            TrendDirection::Gaining
        } else if slope < -THRESHOLD {
            TrendDirection::Losing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Gaining => "上升",
            TrendDirection::Losing => "下降",
            TrendDirection::Stable => "稳定",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            TrendDirection::Gaining => "体重上升较快，建议控制热量摄入并增加有氧训练。",
            TrendDirection::Losing => "体重下降较快，注意补充蛋白质和总热量，避免肌肉流失。",
            TrendDirection::Stable => "体重保持稳定，继续当前的训练和饮食计划。",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub direction: TrendDirection,
}

impl Trend {
    /// (last - first) / (count - 1); None with fewer than two points
    pub fn from_weights(weights: &[f64]) -> Option<Self> {
        let (first, last) = (weights.first()?, weights.last()?);
        if weights.len() < 2 {
            return None;
        }
        let slope = (last - first) / (weights.len() - 1) as f64;
        Some(Self {
            slope,
            direction: TrendDirection::classify(slope),
        })
    }

    /// Trend over every measurement, ordered by date
    pub fn from_measurements(entries: &[MeasurementEntry]) -> Option<Self> {
        let mut sorted: Vec<_> = entries.iter().collect();
        sorted.sort_by_key(|e| (e.date, e.id));
        let weights: Vec<f64> = sorted.iter().map(|e| e.weight).collect();
        Self::from_weights(&weights)
    }

    pub fn format(&self) -> String {
        let sign = if self.slope >= 0.0 { "+" } else { "" };
        format!(
            "趋势: {} ({}{:.2} kg/次)\n建议: {}",
            self.direction.label(),
            sign,
            self.slope,
            self.direction.suggestion()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_stable_trend() {
        let trend = Trend::from_weights(&[70.0, 70.2, 70.3]).unwrap();
        assert!((trend.slope - 0.15).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_gaining_trend() {
        let trend = Trend::from_weights(&[70.0, 71.5]).unwrap();
        assert!((trend.slope - 1.5).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Gaining);
    }

    #[test]
    fn test_losing_trend() {
        let trend = Trend::from_weights(&[80.0, 79.0, 78.0]).unwrap();
        assert_eq!(trend.direction, TrendDirection::Losing);
        assert!(trend.format().contains("下降"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(TrendDirection::classify(0.5), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(-0.5), TrendDirection::Stable);
    }

    #[test]
    fn test_not_enough_points() {
        assert!(Trend::from_weights(&[]).is_none());
        assert!(Trend::from_weights(&[70.0]).is_none());
    }

    #[test]
    fn test_measurements_sorted_before_slope() {
        let entry = |weight, day| MeasurementEntry {
            id: None,
            weight,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            chest: None,
            waist: None,
            hip: None,
            height: None,
        };
        // Inserted out of order: chronologically 70 -> 72
        let entries = vec![entry(72.0, 10), entry(70.0, 1)];
        let trend = Trend::from_measurements(&entries).unwrap();
        assert_eq!(trend.direction, TrendDirection::Gaining);
        assert!((trend.slope - 2.0).abs() < 1e-9);
    }
}
