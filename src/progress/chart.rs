//! Chart data for the weight and per-exercise progress graphs
//!
//! [`ChartConfig`] serializes to a plain JSON object any charting widget can
//! consume. The dashboard draws the same points through [`ChartConfig::xy`].

use chrono::NaiveDate;
use serde::Serialize;

use super::training_date;
use crate::db::{MeasurementEntry, ProgressEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: NaiveDate,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Time,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    #[serde(rename = "type")]
    pub scale: Scale,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<Series>,
}

impl ChartConfig {
    fn line(title: String, y_title: &str, series: Vec<Series>) -> Self {
        Self {
            kind: "line",
            title,
            x_axis: Axis {
                scale: Scale::Time,
                title: "日期".to_string(),
                unit: Some("day"),
            },
            y_axis: Axis {
                scale: Scale::Linear,
                title: y_title.to_string(),
                unit: None,
            },
            series,
        }
    }

    /// Body weight over time
    pub fn weight<'a>(entries: impl IntoIterator<Item = &'a MeasurementEntry>) -> Self {
        let mut points: Vec<ChartPoint> = entries
            .into_iter()
            .map(|e| ChartPoint { x: e.date, y: e.weight })
            .collect();
        points.sort_by_key(|p| p.x);
        Self::line(
            "体重变化".to_string(),
            "体重 (kg)",
            vec![Series {
                label: "体重".to_string(),
                points,
            }],
        )
    }

    /// Working weight and reps of one exercise, one point per set
    pub fn exercise(entries: &[ProgressEntry], exercise: &str) -> Self {
        let mut sets: Vec<_> = entries.iter().filter(|e| e.exercise == exercise).collect();
        sets.sort_by_key(|e| e.date);

        let weight = sets
            .iter()
            .map(|e| ChartPoint {
                x: training_date(&e.date),
                y: e.weight,
            })
            .collect();
        let reps = sets
            .iter()
            .map(|e| ChartPoint {
                x: training_date(&e.date),
                y: f64::from(e.reps),
            })
            .collect();

        Self::line(
            format!("{} 进度", exercise),
            "重量 (kg) / 次数",
            vec![
                Series {
                    label: "重量".to_string(),
                    points: weight,
                },
                Series {
                    label: "次数".to_string(),
                    points: reps,
                },
            ],
        )
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// Points as (days since CE, value) for plotting
    pub fn xy(series: &Series) -> Vec<(f64, f64)> {
        series
            .points
            .iter()
            .map(|p| (f64::from(chrono::Datelike::num_days_from_ce(&p.x)), p.y))
            .collect()
    }

    /// (min, max) over every series, padded so flat lines stay visible
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let all: Vec<(f64, f64)> = self.series.iter().flat_map(Self::xy).collect();
        let (x0, y0) = *all.first()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);
        for (x, y) in &all {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
        if x_max - x_min < 1.0 {
            x_max = x_min + 1.0;
        }
        Some(([x_min, x_max], [y_min - 1.0, y_max + 1.0]))
    }
}
