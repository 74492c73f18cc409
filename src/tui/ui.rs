use chrono::{Datelike, NaiveDate};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
};

use crate::dashboard::calendar::month_grid;
use crate::weather::WeatherStatus;

use super::app::App;
use super::form::{self, TextField};
use super::keymap::Focus;

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Line::from(vec![
        Span::styled(" tick ", app.theme.accent_style()),
        Span::styled(app.now.format("%A").to_string(), app.theme.dim()),
    ]);
    frame.render_widget(Paragraph::new(title), outer[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28),
            Constraint::Min(30),
            Constraint::Length(30),
        ])
        .split(outer[1]);

    draw_left(frame, app, columns[0]);
    draw_centre(frame, app, columns[1]);
    draw_right(frame, app, columns[2]);
    draw_status_bar(frame, app, outer[2]);

    if app.link_dialog_open {
        draw_link_dialog(frame, app);
    }
    if app.show_help {
        draw_help(frame, app);
    }
}

fn panel<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(app.theme.unfocused_border())
}

// ── Left column ───────────────────────────────────────────────────────

fn draw_left(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    draw_clock(frame, app, rows[0]);
    draw_weather(frame, app, rows[1]);
    draw_pomodoro(frame, app, rows[2]);
    draw_progress(frame, app, rows[3]);
    draw_key_reference(frame, app, rows[4]);
}

fn draw_clock(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(app.now.format("%H:%M").to_string(), app.theme.accent_style()),
            Span::styled(app.now.format(":%S").to_string(), app.theme.dim()),
        ]),
        Line::from(app.now.format("%A").to_string()),
        Line::styled(app.now.format("%B %-d, %Y").to_string(), app.theme.dim()),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel(app, " clock ")), area);
}

fn draw_weather(frame: &mut Frame, app: &App, area: Rect) {
    let panel_state = &app.dashboard.weather;
    let style = app.theme.weather_style(panel_state.status());
    let lines = match (panel_state.status(), panel_state.weather()) {
        (WeatherStatus::Ok, Some(w)) => vec![
            Line::styled(format!("{}° {}", w.temperature, w.condition), style),
            Line::styled(w.location.clone(), app.theme.dim()),
        ],
        (WeatherStatus::Loading, _) => vec![Line::styled("locating…", style)],
        (WeatherStatus::Denied, _) => vec![Line::styled("location unavailable", style)],
        (WeatherStatus::Error, _) => vec![Line::styled("weather unavailable", style)],
        _ => vec![],
    };
    frame.render_widget(Paragraph::new(lines).block(panel(app, " weather ")), area);
}

/// Four dots, filled up to the position in the current cycle.
fn session_dots(position: u32) -> String {
    (0..4)
        .map(|i| if i < position { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn draw_pomodoro(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.dashboard.pomodoro.state();
    let style = app.theme.pomodoro_style(state.mode);
    let block = panel(app, " pomodoro ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let status = if state.running { "running" } else { "paused" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(state.mode.label(), style),
            Span::styled(format!("  {status}"), app.theme.dim()),
        ])),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::styled(state.clock_label(), app.theme.accent_style())),
        rows[1],
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(style)
            .ratio(state.progress().clamp(0.0, 1.0))
            .label(""),
        rows[2],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(session_dots(state.cycle_position()), style),
            Span::styled(format!("  {} today", state.sessions_today), app.theme.dim()),
        ])),
        rows[3],
    );
}

fn draw_progress(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = &app.dashboard.tasks;
    let line = Line::from(vec![
        Span::styled(tasks.completed_count().to_string(), app.theme.accent_style()),
        Span::styled(format!(" / {} done", tasks.tasks().len()), app.theme.dim()),
    ]);
    frame.render_widget(Paragraph::new(line).block(panel(app, " progress ")), area);
}

fn draw_key_reference(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line<'_>> = app
        .keymap
        .help_entries()
        .into_iter()
        .flat_map(|(_, entries)| entries)
        .map(|e| {
            Line::from(vec![
                Span::styled(format!("{:>6} ", e.label), app.theme.accent_style()),
                Span::styled(e.description, app.theme.dim()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel(app, " keys ")), area);
}

// ── Centre column ─────────────────────────────────────────────────────

fn draw_centre(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let date = app.dashboard.tasks.active_date();
    let mut header = vec![Span::styled(
        date.format("%d · %m · %Y").to_string(),
        app.theme.accent_style(),
    )];
    if date == app.today() {
        header.push(Span::styled("  today", app.theme.dim()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(header)).block(panel(app, "")),
        rows[0],
    );

    draw_tasks(frame, app, rows[1]);
    draw_task_input(frame, app, rows[2]);
}

fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let store = &app.dashboard.tasks;
    let block = panel(app, " tasks ");

    if store.tasks().is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("press n to add a task", app.theme.dim())).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem<'_>> = store
        .tasks()
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let selected = store.cursor() == Some(i);
            let prefix = if selected { "▸ " } else { "  " };
            let style = app.theme.task_style(task.completed, selected);
            ListItem::new(Line::from(vec![
                Span::styled(prefix, Style::default().fg(app.theme.selection)),
                Span::raw(format!("{} ", task.symbol())),
                Span::styled(task.title.as_str(), style),
            ]))
        })
        .collect();
    // The list scrolls so the selected task stays on screen.
    let mut state = ListState::default().with_selected(store.cursor());
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn field_line<'a>(app: &App, field: &'a TextField, focused: bool, placeholder: &'a str) -> Line<'a> {
    if focused {
        Line::raw(field.with_cursor())
    } else if field.is_empty() {
        Line::styled(placeholder, app.theme.dim())
    } else {
        Line::raw(field.value())
    }
}

fn draw_task_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::TaskInput;
    let border = if focused {
        app.theme.focused_border()
    } else {
        app.theme.unfocused_border()
    };
    let block = Block::default()
        .title(" new task ")
        .borders(Borders::ALL)
        .border_style(border);
    let line = field_line(app, &app.task_input, focused, "what needs doing?");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

// ── Right column ──────────────────────────────────────────────────────

fn draw_right(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    draw_calendar(frame, app, rows[0]);
    draw_bookmarks(frame, app, rows[1]);
}

fn draw_calendar(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.dashboard.tasks.active_date();
    let today = app.today();
    let title = format!(" {} ", selected.format("%B %Y"));

    let mut lines = vec![Line::styled(" Su Mo Tu We Th Fr Sa", app.theme.dim())];
    for week in month_grid(selected) {
        let spans: Vec<Span<'_>> = week
            .iter()
            .map(|day: &NaiveDate| {
                let style = app.theme.calendar_day_style(
                    day.month() == selected.month(),
                    *day == today,
                    *day == selected,
                );
                Span::styled(format!("{:>3}", day.day()), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines).block(panel(app, &title)), area);
}

fn draw_bookmarks(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.pending_remove {
        " remove which? "
    } else {
        " bookmarks "
    };
    let links = app.dashboard.links.links();
    let lines: Vec<Line<'_>> = if links.is_empty() {
        vec![Line::styled("press b to add one", app.theme.dim())]
    } else {
        links
            .iter()
            .take(9)
            .enumerate()
            .map(|(i, link)| {
                Line::from(vec![
                    Span::styled(format!("{} ", i + 1), app.theme.accent_style()),
                    Span::styled(link.name.as_str(), Style::default().fg(app.theme.link)),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(panel(app, title)), area);
}

// ── Overlays and status bar ───────────────────────────────────────────

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match app.focus {
        Focus::TaskInput => &[(" enter", " add  "), ("esc", " done")],
        Focus::LinkName | Focus::LinkUrl => {
            &[(" tab", " switch field  "), ("enter", " save  "), ("esc", " cancel")]
        }
        Focus::None => &[
            (" n", " task  "),
            ("p", " pomodoro  "),
            ("b", " bookmark  "),
            ("?", " help  "),
            ("q", " quit"),
        ],
    };
    form::render_hints(frame, area, hints, app.theme.accent_style(), app.theme.dim());
}

fn draw_link_dialog(frame: &mut Frame, app: &App) {
    let inner = form::render_modal(frame, "add bookmark", app.theme.focused_border(), 50, 8);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let label_style = |focused: bool| {
        if focused {
            app.theme.accent_style()
        } else {
            app.theme.dim()
        }
    };
    let name_focused = app.focus == Focus::LinkName;
    let url_focused = app.focus == Focus::LinkUrl;

    frame.render_widget(Paragraph::new(Line::styled("name", label_style(name_focused))), rows[0]);
    frame.render_widget(
        Paragraph::new(field_line(app, &app.link_name, name_focused, "docs")),
        rows[1],
    );
    frame.render_widget(Paragraph::new(Line::styled("url", label_style(url_focused))), rows[2]);
    frame.render_widget(
        Paragraph::new(field_line(app, &app.link_url, url_focused, "docs.rs")),
        rows[3],
    );
}

fn draw_help(frame: &mut Frame, app: &App) {
    let sections = app.keymap.help_entries();
    let height = sections
        .iter()
        .map(|(_, entries)| entries.len() + 2)
        .sum::<usize>() as u16
        + 2;
    let inner = form::render_modal(frame, "keys", app.theme.focused_border(), 44, height);

    let mut lines = Vec::new();
    for (title, entries) in sections {
        lines.push(Line::styled(title, app.theme.accent_style()));
        for e in entries {
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<8}", e.label)),
                Span::styled(e.description, app.theme.dim()),
            ]));
        }
        lines.push(Line::raw(""));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Local, TimeZone};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::api::{LocalService, TaskService};
    use crate::config::Config;
    use crate::dashboard::Dashboard;
    use crate::dashboard::clock::Clock;
    use crate::dashboard::persistence::{MemoryStore, SessionLog};
    use crate::store::Store;
    use crate::weather::WeatherClient;
    use crate::worker::Worker;

    struct Noon;

    impl Clock for Noon {
        fn now(&self) -> DateTime<Local> {
            Local.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).single().unwrap()
        }
    }

    fn app_with_tasks(count: usize) -> App {
        let service = Arc::new(LocalService::new(Store::open_in_memory().unwrap()));
        for i in 1..=count {
            service.create_task(&format!("task {i:02}"), "2026-10-16").unwrap();
        }
        let worker = Worker::inline(service, WeatherClient::new().unwrap());
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let dashboard = Dashboard::new(today, SessionLog::new(Box::new(MemoryStore::default())));
        let mut app = App::new(dashboard, worker, Box::new(Noon), &Config::default());
        app.process_completions();
        app
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn selected_task_below_the_fold_is_scrolled_into_view() {
        let mut app = app_with_tasks(40);
        assert!(screen(&app).contains("task 01"));

        // `k` with no selection jumps to the last task.
        app.handle_key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE));
        assert_eq!(app.dashboard.tasks.cursor(), Some(39));

        let shown = screen(&app);
        assert!(shown.contains("task 40"));
        assert!(!shown.contains("task 01"));
    }

    #[test]
    fn empty_day_shows_hint() {
        let app = app_with_tasks(0);
        assert!(screen(&app).contains("press n to add a task"));
    }

    #[test]
    fn session_dots_fill_up_to_position() {
        assert_eq!(session_dots(0), "○ ○ ○ ○");
        assert_eq!(session_dots(3), "● ● ● ○");
    }
}
