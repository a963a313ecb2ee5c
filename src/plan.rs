//! Weekly plan - 每周训练计划
//!
//! A fixed seven-day template merged with the user's custom exercises.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::db::ExerciseEntry;

/// Day of the training week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub fn all() -> &'static [Day] {
        &[
            Day::Monday,
            Day::Tuesday,
            Day::Wednesday,
            Day::Thursday,
            Day::Friday,
            Day::Saturday,
            Day::Sunday,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Day::Monday => "周一",
            Day::Tuesday => "周二",
            Day::Wednesday => "周三",
            Day::Thursday => "周四",
            Day::Friday => "周五",
            Day::Saturday => "周六",
            Day::Sunday => "周日",
        }
    }

    /// Storage index, Monday = 0
    pub fn index(&self) -> i64 {
        *self as i64
    }

    pub fn from_index(index: i64) -> Option<Day> {
        Day::all().get(usize::try_from(index).ok()?).copied()
    }

    /// Exact label match, no normalization
    pub fn from_label(label: &str) -> Option<Day> {
        Day::all().iter().copied().find(|d| d.label() == label)
    }

    pub fn from_chrono(weekday: Weekday) -> Day {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }

    pub fn of(date: NaiveDate) -> Day {
        Day::from_chrono(date.weekday())
    }

    pub fn next(&self) -> Day {
        Day::from_index((self.index() + 1) % 7).unwrap_or(Day::Monday)
    }

    pub fn prev(&self) -> Day {
        Day::from_index((self.index() + 6) % 7).unwrap_or(Day::Monday)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = String;

    /// Accepts the Chinese label (周一) or an English name (monday, mon)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(day) = Day::from_label(s.trim()) {
            return Ok(day);
        }
        s.trim()
            .parse::<Weekday>()
            .map(Day::from_chrono)
            .map_err(|_| format!("未知的星期: {}", s))
    }
}

/// Experience level - drives sets and rest time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Level {
    pub fn sets(&self) -> u32 {
        match self {
            Level::Beginner => 3,
            Level::Intermediate => 3,
            Level::Advanced => 4,
        }
    }

    pub fn rest_secs(&self) -> u64 {
        match self {
            Level::Beginner => 120,
            Level::Intermediate => 90,
            Level::Advanced => 60,
        }
    }
}

/// Training goal - drives the reps range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum Goal {
    #[default]
    Muscle,     // 增肌
    Strength,   // 力量
    Endurance,  // 耐力
}

impl Goal {
    pub fn reps_range(&self) -> &'static str {
        match self {
            Goal::Muscle => "8-12",
            Goal::Strength => "4-6",
            Goal::Endurance => "12-15",
        }
    }
}

/// User profile the session parameters are derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub level: Level,
    pub goal: Goal,
}

impl Profile {
    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            sets: self.level.sets(),
            reps: self.goal.reps_range(),
            rest_secs: self.level.rest_secs(),
        }
    }
}

/// Per-exercise prescription shown in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionParams {
    pub sets: u32,
    pub reps: &'static str,
    pub rest_secs: u64,
}

impl SessionParams {
    pub fn describe(&self) -> String {
        format!("组数：{} 组 x {} 次，休息 {} 秒", self.sets, self.reps, self.rest_secs)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateDay {
    pub day: Day,
    pub focus: &'static str,
    pub rest: bool,
    pub exercises: &'static [&'static str],
}

/// Fixed weekly template, one entry per day
pub const WEEK_TEMPLATE: &[TemplateDay] = &[
    TemplateDay {
        day: Day::Monday,
        focus: "胸部 + 三头",
        rest: false,
        exercises: &["杠铃卧推", "上斜哑铃卧推", "双杠臂屈伸", "绳索下压"],
    },
    TemplateDay {
        day: Day::Tuesday,
        focus: "背部 + 二头",
        rest: false,
        exercises: &["引体向上", "杠铃划船", "高位下拉", "哑铃弯举"],
    },
    TemplateDay {
        day: Day::Wednesday,
        focus: "休息",
        rest: true,
        exercises: &[],
    },
    TemplateDay {
        day: Day::Thursday,
        focus: "腿部",
        rest: false,
        exercises: &["深蹲", "罗马尼亚硬拉", "腿举", "提踵"],
    },
    TemplateDay {
        day: Day::Friday,
        focus: "肩部 + 核心",
        rest: false,
        exercises: &["站姿推举", "哑铃侧平举", "面拉", "平板支撑"],
    },
    TemplateDay {
        day: Day::Saturday,
        focus: "全身",
        rest: false,
        exercises: &["硬拉", "俯卧撑", "壶铃摆荡", "跳绳"],
    },
    TemplateDay {
        day: Day::Sunday,
        focus: "休息",
        rest: true,
        exercises: &[],
    },
];

pub fn template_day(day: Day) -> Option<&'static TemplateDay> {
    WEEK_TEMPLATE.iter().find(|t| t.day == day)
}

/// True if `name` is one of the fixed exercises of `day`
pub fn is_template_exercise(day: Day, name: &str) -> bool {
    template_day(day).is_some_and(|t| t.exercises.iter().any(|e| *e == name))
}

/// Where a plan exercise came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    Template,
    Custom(Option<i64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanExercise {
    pub name: String,
    pub video: Option<String>,
    pub source: Source,
}

/// One day of the effective plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDay {
    pub day: Day,
    pub focus: String,
    pub rest: bool,
    pub exercises: Vec<PlanExercise>,
}

impl PlanDay {
    fn rest_day(day: Day) -> Self {
        Self {
            day,
            focus: "休息".to_string(),
            rest: true,
            exercises: Vec::new(),
        }
    }

    /// Plain-text rendering of one day
    pub fn render(&self, params: &SessionParams) -> String {
        let mut lines = vec![format!("{} · {}", self.day, self.focus)];
        if self.rest {
            lines.push("休息日 - 建议进行轻度活动或完全休息。".to_string());
            return lines.join("\n");
        }
        for (i, exercise) in self.exercises.iter().enumerate() {
            let marker = match exercise.source {
                Source::Template => "",
                Source::Custom(_) => " *",
            };
            lines.push(format!("{}. {}{}", i + 1, exercise.name, marker));
            lines.push(format!("   {}", params.describe()));
            if let Some(video) = &exercise.video {
                lines.push(format!("   示范: {}", video));
            }
        }
        lines.join("\n")
    }

    pub fn render_today(&self, params: &SessionParams) -> String {
        format!("今日训练 ({})\n{}", self.day, self.render(params))
    }
}

/// Merge `template` with custom exercises. Rest days never take customs.
pub fn compose_with(template: &[TemplateDay], custom: &[ExerciseEntry]) -> Vec<PlanDay> {
    template
        .iter()
        .map(|t| {
            let fixed = t.exercises.iter().map(|e| PlanExercise {
                name: e.to_string(),
                video: None,
                source: Source::Template,
            });
            let exercises = if t.rest {
                Vec::new()
            } else {
                let extra = custom.iter().filter(|c| c.day == t.day).map(|c| PlanExercise {
                    name: c.name.clone(),
                    video: c.video.clone(),
                    source: Source::Custom(c.id),
                });
                fixed.chain(extra).collect()
            };
            PlanDay {
                day: t.day,
                focus: t.focus.to_string(),
                rest: t.rest,
                exercises,
            }
        })
        .collect()
}

/// Effective plan: [`WEEK_TEMPLATE`] plus custom exercises
pub fn compose(custom: &[ExerciseEntry]) -> Vec<PlanDay> {
    compose_with(WEEK_TEMPLATE, custom)
}

/// Plan entry for the weekday of `date`, or a synthetic rest day
pub fn today(plan: &[PlanDay], date: NaiveDate) -> PlanDay {
    let day = Day::of(date);
    plan.iter()
        .find(|d| d.day == day)
        .cloned()
        .unwrap_or_else(|| PlanDay::rest_day(day))
}
