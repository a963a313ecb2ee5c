//! fitweek - Weekly workout plan and progress tracker

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{Level as LogLevel, error};

use fitweek::app::{ExerciseRef, View};
use fitweek::config::{Config, DEFAULT_DB_PATH};
use fitweek::forms::{ExerciseForm, MeasurementForm, SetForm};
use fitweek::plan::{Day, Goal, Level};
use fitweek::progress::{self, ChartConfig, TimeWindow, body};
use fitweek::timer::{Finished, RestTimer, format_clock};
use fitweek::tui::App;
use fitweek::AppContext;

#[derive(Parser)]
#[command(name = "fitweek")]
#[command(author, version, about = "每周训练计划与进度记录")]
struct Cli {
    /// Database file
    #[arg(long, global = true, env = "FITWEEK_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Experience level (sets and rest time)
    #[arg(long, global = true, env = "FITWEEK_LEVEL", value_enum, default_value_t = Level::Intermediate)]
    level: Level,

    /// Training goal (reps range)
    #[arg(long, global = true, env = "FITWEEK_GOAL", value_enum, default_value_t = Goal::Muscle)]
    goal: Goal,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Show the weekly plan
    Plan {
        /// Only this day (周一 or monday)
        #[arg(short, long)]
        day: Option<Day>,
    },

    /// Show today's training
    Today,

    /// Log a set
    Log {
        /// Exercise name (e.g. "深蹲")
        exercise: String,

        /// Weight in kg
        #[arg(short, long)]
        weight: Option<String>,

        /// Reps completed
        #[arg(short, long)]
        reps: Option<String>,

        /// Equipment weight in kg (bar, machine)
        #[arg(short, long)]
        equipment: Option<String>,
    },

    /// Log body measurements
    Measure {
        /// Body weight in kg
        #[arg(short, long)]
        weight: Option<String>,

        /// Date, YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(long)]
        chest: Option<String>,

        #[arg(long)]
        waist: Option<String>,

        #[arg(long)]
        hip: Option<String>,

        /// Height in cm
        #[arg(long)]
        height: Option<String>,
    },

    /// Manage custom exercises
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// List logged sets
    History {
        /// Filter by exercise name
        exercise: Option<String>,

        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Body weight history and BMI
    Body {
        #[arg(short, long, value_enum, default_value_t = TimeWindow::Month)]
        window: TimeWindow,
    },

    /// Body weight trend
    Trend,

    /// Achievement status
    Achievements,

    /// Print chart data as JSON
    #[command(subcommand)]
    Chart(ChartCommand),

    /// Rest countdown between sets
    Rest {
        /// Seconds (default: from profile)
        #[arg(short, long)]
        seconds: Option<u64>,
    },

    /// Delete ALL records
    Clear {
        /// Confirm
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add a custom exercise to a day
    Add {
        name: String,

        #[arg(short, long)]
        day: String,

        /// Demo video URL
        #[arg(long)]
        video: Option<String>,
    },

    /// Edit a custom exercise
    Edit {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(long = "set-name")]
        new_name: Option<String>,

        #[arg(long = "set-video")]
        video: Option<String>,

        #[arg(long = "set-day")]
        new_day: Option<String>,
    },

    /// Delete a custom exercise
    Delete {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// List custom exercises
    List,
}

#[derive(clap::Args)]
struct TargetArgs {
    /// Exercise id
    #[arg(long)]
    id: Option<i64>,

    /// Day the exercise is on (with --name)
    #[arg(long)]
    day: Option<Day>,

    /// Exercise name (with --day)
    #[arg(long)]
    name: Option<String>,
}

impl TargetArgs {
    fn resolve(self) -> Result<ExerciseRef> {
        match (self.id, self.day, self.name) {
            (Some(id), _, _) => Ok(ExerciseRef::Id(id)),
            (None, Some(day), Some(name)) => Ok(ExerciseRef::Named { day, name }),
            _ => bail!("请用 --id, 或 --day 加 --name 指定动作"),
        }
    }
}

#[derive(Subcommand)]
enum ChartCommand {
    /// Body weight
    Weight {
        #[arg(short, long, value_enum, default_value_t = TimeWindow::All)]
        window: TimeWindow,
    },
    /// Weight and reps of one exercise
    Exercise { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let max_level = match cli.verbose {
        0 => LogLevel::WARN,
        1 => LogLevel::INFO,
        _ => LogLevel::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new(cli.db, cli.level, cli.goal);
    let mut ctx = match AppContext::init(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("数据库不可用");
        }
    };

    let result = dispatch(cli.command.unwrap_or(Commands::Tui), &mut ctx).await;
    ctx.teardown()?;
    result
}

async fn dispatch(command: Commands, ctx: &mut AppContext) -> Result<()> {
    match command {
        Commands::Tui => App::new(ctx)?.run()?,

        Commands::Plan { day } => {
            let params = ctx.session_params();
            for entry in ctx.plan()?.iter().filter(|d| day.is_none_or(|want| d.day == want)) {
                println!("{}\n", entry.render(&params));
            }
        }

        Commands::Today => {
            let today = ctx.today(Local::now().date_naive())?;
            println!("{}", today.render_today(&ctx.session_params()));
        }

        Commands::Log { exercise, weight, reps, equipment } => {
            let form = SetForm {
                weight,
                reps,
                equipment_weight: equipment,
            };
            let outcome = ctx.log_set(&exercise, &form, Utc::now())?;
            println!("已记录: {} (id: {})", exercise, outcome.id.unwrap_or_default());
            render_views(ctx, &outcome.refresh)?;
        }

        Commands::Measure { weight, date, chest, waist, hip, height } => {
            let form = MeasurementForm {
                weight,
                date: date.or_else(|| Some(Local::now().format("%Y-%m-%d").to_string())),
                chest,
                waist,
                hip,
                height,
            };
            let outcome = ctx.log_measurement(&form)?;
            println!("已记录身体数据 (id: {})", outcome.id.unwrap_or_default());
            render_views(ctx, &outcome.refresh)?;
        }

        Commands::Exercise(cmd) => match cmd {
            ExerciseCommand::Add { name, day, video } => {
                let form = ExerciseForm {
                    name: Some(name.clone()),
                    video,
                    day: Some(day),
                };
                let outcome = ctx.add_exercise(&form)?;
                println!("已添加动作: {} (id: {})", name, outcome.id.unwrap_or_default());
            }
            ExerciseCommand::Edit { target, new_name, video, new_day } => {
                let form = ExerciseForm {
                    name: new_name,
                    video,
                    day: new_day,
                };
                let outcome = ctx.edit_exercise(&target.resolve()?, &form)?;
                println!("已更新动作 (id: {})", outcome.id.unwrap_or_default());
            }
            ExerciseCommand::Delete { target } => {
                let outcome = ctx.delete_exercise(&target.resolve()?)?;
                println!("已删除动作 (id: {})", outcome.id.unwrap_or_default());
            }
            ExerciseCommand::List => {
                let exercises = ctx.db().get_exercises()?;
                if exercises.is_empty() {
                    println!("还没有自定义动作");
                }
                for e in exercises {
                    println!(
                        "{:>4} | {} | {} | {}",
                        e.id.unwrap_or_default(),
                        e.day,
                        e.name,
                        e.video.as_deref().unwrap_or("-")
                    );
                }
            }
        },

        Commands::History { exercise, limit } => {
            let history = ctx.history()?;
            println!("训练记录:");
            println!("{:-<60}", "");
            match exercise {
                Some(name) => {
                    let sets: Vec<_> = history.for_exercise(&name).collect();
                    for set in sets.iter().rev().take(limit) {
                        println!("{}", progress::format_set(set));
                    }
                    if let Some(summary) = history.summary(&name) {
                        println!("{:-<60}", "");
                        println!(
                            "共 {} 组 | 最大重量 {} kg | 总容量 {:.0} kg",
                            summary.sets, summary.best_weight, summary.total_volume
                        );
                    }
                }
                None => {
                    for set in history.recent(limit) {
                        println!("{}", progress::format_set(set));
                    }
                }
            }
        }

        Commands::Body { window } => {
            let measurements = ctx.measurements()?;
            let visible = window.filter(&measurements, Local::now().date_naive());
            println!("体重记录 ({}):", window.label());
            println!("{:-<40}", "");
            for line in body::render_history(&visible) {
                println!("{}", line);
            }
            println!("{:-<40}", "");
            println!(
                "{}",
                body::latest_summary(&measurements).unwrap_or_else(|| progress::UNRECORDED.to_string())
            );
        }

        Commands::Trend => match ctx.trend()? {
            Some(trend) => println!("{}", trend.format()),
            None => println!("记录不足, 至少需要两次体重数据"),
        },

        Commands::Achievements => {
            for line in progress::achievements::render(&ctx.achievements()?) {
                println!("{}", line);
            }
        }

        Commands::Chart(cmd) => {
            let chart = match cmd {
                ChartCommand::Weight { window } => {
                    let measurements = ctx.measurements()?;
                    ChartConfig::weight(window.filter(&measurements, Local::now().date_naive()))
                }
                ChartCommand::Exercise { name } => ChartConfig::exercise(ctx.history()?.entries(), &name),
            };
            println!("{}", serde_json::to_string_pretty(&chart)?);
        }

        Commands::Rest { seconds } => {
            let secs = seconds.unwrap_or(ctx.session_params().rest_secs);
            let timer = RestTimer::new(secs);
            let cancel = timer.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            let finished = timer
                .run(|left| {
                    print!("\r休息 {} ", format_clock(left));
                    let _ = std::io::stdout().flush();
                })
                .await;
            println!();
            match finished {
                Finished::Completed => println!("休息结束, 开始下一组!"),
                Finished::Cancelled { remaining_secs } => {
                    println!("已取消 (剩余 {})", format_clock(remaining_secs))
                }
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                bail!("这会删除所有记录, 确认请加 --yes");
            }
            let outcome = ctx.clear_history()?;
            println!("已清空所有记录");
            render_views(ctx, &outcome.refresh)?;
        }
    }

    Ok(())
}

/// Print the views a handler reported as changed
fn render_views(ctx: &AppContext, views: &[View]) -> Result<()> {
    for view in views {
        match view {
            View::Plan => {}
            View::Progress(exercise) => {
                if let Some(summary) = ctx.history()?.summary(exercise) {
                    println!(
                        "{}: 共 {} 组, 最大重量 {} kg",
                        exercise, summary.sets, summary.best_weight
                    );
                }
            }
            View::Measurements => {
                let measurements = ctx.measurements()?;
                if let Some(summary) = body::latest_summary(&measurements) {
                    println!("{}", summary);
                }
                if let Some(trend) = ctx.trend()? {
                    println!("{}", trend.format());
                }
            }
            View::Achievements => {
                for line in progress::achievements::render(&ctx.achievements()?) {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}
