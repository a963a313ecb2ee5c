//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Wrap},
};
use std::io::{stdout, Stdout};

use crate::app::{AppContext, View};
use crate::db::MeasurementEntry;
use crate::plan::{Day, PlanDay};
use crate::progress::{self, ChartConfig, History, TimeWindow, Trend, format_bmi};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App<'a> {
    ctx: &'a AppContext,
    plan: Vec<PlanDay>,
    measurements: Vec<MeasurementEntry>,
    history: History,
    day: Day,
    window: TimeWindow,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(ctx: &'a AppContext) -> Result<Self> {
        Ok(Self {
            plan: ctx.plan()?,
            measurements: ctx.measurements()?,
            history: ctx.history()?,
            ctx,
            day: Day::of(Local::now().date_naive()),
            window: TimeWindow::Month,
            should_quit: false,
        })
    }

    /// Reload only the stale views
    fn reload(&mut self, views: &[View]) -> Result<()> {
        for view in views {
            match view {
                View::Plan => self.plan = self.ctx.plan()?,
                View::Measurements => self.measurements = self.ctx.measurements()?,
                View::Progress(_) | View::Achievements => self.history = self.ctx.history()?,
            }
        }
        Ok(())
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        restoring(|| self.event_loop(&mut terminal), restore_terminal)
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new("fitweek - 每周训练计划")
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body[1]);

        self.render_plan(frame, body[0]);
        self.render_weight_chart(frame, right[0]);
        self.render_log(frame, right[1]);

        // Footer
        let footer = Paragraph::new("q: quit | ←/→: day | t: today | w: window | r: refresh")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_plan(&self, frame: &mut Frame, area: Rect) {
        let params = self.ctx.session_params();
        let text = self
            .plan
            .iter()
            .find(|d| d.day == self.day)
            .map(|d| d.render(&params))
            .unwrap_or_default();
        let title = if self.day == Day::of(self.today()) {
            format!("今日训练 ({})", self.day)
        } else {
            format!("训练计划 ({})", self.day)
        };
        let plan = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(plan, area);
    }

    fn render_weight_chart(&self, frame: &mut Frame, area: Rect) {
        let visible = self.window.filter(&self.measurements, self.today());
        let config = ChartConfig::weight(visible);
        let title = format!("体重 ({}) | BMI {}", self.window.label(), self.latest_bmi());

        let Some((x_bounds, y_bounds)) = config.bounds() else {
            let empty = Paragraph::new(progress::UNRECORDED)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty, area);
            return;
        };

        let points = ChartConfig::xy(&config.series[0]);
        let dataset = Dataset::default()
            .name("体重")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let date_label = |x: f64| {
            NaiveDate::from_num_days_from_ce_opt(x as i32)
                .map(|d| d.format("%m-%d").to_string())
                .unwrap_or_default()
        };

        let chart = Chart::new(vec![dataset])
            .block(Block::default().borders(Borders::ALL).title(title))
            .x_axis(
                Axis::default()
                    .bounds(x_bounds)
                    .labels(vec![Span::raw(date_label(x_bounds[0])), Span::raw(date_label(x_bounds[1]))]),
            )
            .y_axis(
                Axis::default()
                    .bounds(y_bounds)
                    .labels(vec![
                        Span::raw(format!("{:.1}", y_bounds[0])),
                        Span::raw(format!("{:.1}", y_bounds[1])),
                    ]),
            );
        frame.render_widget(chart, area);
    }

    fn latest_bmi(&self) -> String {
        let latest = self.measurements.iter().max_by_key(|m| (m.date, m.id));
        format_bmi(
            latest.map(|m| m.weight),
            latest.and_then(|m| m.height).or_else(|| progress::body::latest_height(&self.measurements)),
        )
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let mut items: Vec<ListItem> = Vec::new();

        if let Some(trend) = Trend::from_measurements(&self.measurements) {
            items.push(ListItem::new(format!(
                "趋势: {} ({:+.2} kg/次)",
                trend.direction.label(),
                trend.slope
            )));
        }
        for line in progress::achievements::render(&self.history.achievements()) {
            items.push(ListItem::new(line));
        }
        for set in self.history.recent(10) {
            items.push(ListItem::new(progress::format_set(set)));
        }

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("记录"));
        frame.render_widget(list, area);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => self.should_quit = true,
                        KeyCode::Char('r') => {
                            self.reload(&[View::Plan, View::Measurements, View::Achievements])?;
                        }
                        KeyCode::Char('w') => self.window = self.window.next(),
                        KeyCode::Char('t') => self.day = Day::of(self.today()),
                        KeyCode::Left => self.day = self.day.prev(),
                        KeyCode::Right => self.day = self.day.next(),
                        _ => {}
                    }
                }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

/// Run `body`, then `restore` no matter how `body` ended. The body's error wins.
fn restoring<T>(body: impl FnOnce() -> Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
