use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::dashboard::pomodoro::Mode;
use crate::weather::WeatherStatus;

/// Semantic colour theme for the dashboard.
///
/// Every colour used by the renderer is stored here so the user can
/// override any of them via `[theme]` in `config.toml`.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Borders ───────────────────────────────────────────────
    pub border_focused: Color,
    pub border_unfocused: Color,

    // ── Text ──────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,

    // ── Tasks ─────────────────────────────────────────────────
    pub task_done: Color,
    pub selection: Color,

    // ── Pomodoro ──────────────────────────────────────────────
    pub pomodoro_work: Color,
    pub pomodoro_break: Color,

    // ── Calendar ──────────────────────────────────────────────
    pub calendar_today: Color,
    pub calendar_selected: Color,

    // ── Weather ───────────────────────────────────────────────
    pub weather_ok: Color,
    pub weather_error: Color,

    // ── Bookmarks ─────────────────────────────────────────────
    pub link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,

            text_primary: Color::White,
            text_secondary: Color::DarkGray,
            accent: Color::Cyan,

            task_done: Color::DarkGray,
            selection: Color::Yellow,

            pomodoro_work: Color::LightRed,
            pomodoro_break: Color::Green,

            calendar_today: Color::Cyan,
            calendar_selected: Color::Yellow,

            weather_ok: Color::White,
            weather_error: Color::Red,

            link: Color::Magenta,
        }
    }
}

impl Theme {
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    /// Task rows: completed ones are struck through, the selected row is
    /// reversed in the selection colour.
    pub fn task_style(&self, completed: bool, selected: bool) -> Style {
        let mut style = if completed {
            Style::default()
                .fg(self.task_done)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(self.text_primary)
        };
        if selected {
            style = style.fg(self.selection).add_modifier(Modifier::BOLD);
        }
        style
    }

    pub fn pomodoro_style(&self, mode: Mode) -> Style {
        let color = match mode {
            Mode::Work => self.pomodoro_work,
            Mode::Break => self.pomodoro_break,
        };
        Style::default().fg(color)
    }

    pub fn weather_style(&self, status: WeatherStatus) -> Style {
        let color = match status {
            WeatherStatus::Ok => self.weather_ok,
            WeatherStatus::Error => self.weather_error,
            WeatherStatus::Idle | WeatherStatus::Loading | WeatherStatus::Denied => {
                self.text_secondary
            }
        };
        Style::default().fg(color)
    }

    pub fn calendar_day_style(&self, in_month: bool, is_today: bool, is_selected: bool) -> Style {
        if is_selected {
            Style::default()
                .fg(self.calendar_selected)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if is_today {
            Style::default()
                .fg(self.calendar_today)
                .add_modifier(Modifier::BOLD)
        } else if in_month {
            Style::default().fg(self.text_primary)
        } else {
            self.dim()
        }
    }
}

// ── Config deserialization ────────────────────────────────────────────

/// All-optional mirror of [`Theme`] for the `[theme]` table of
/// `config.toml`. Unset or unparseable fields keep the default.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ThemeConfig {
    pub border_focused: Option<String>,
    pub border_unfocused: Option<String>,
    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub accent: Option<String>,
    pub task_done: Option<String>,
    pub selection: Option<String>,
    pub pomodoro_work: Option<String>,
    pub pomodoro_break: Option<String>,
    pub calendar_today: Option<String>,
    pub calendar_selected: Option<String>,
    pub weather_ok: Option<String>,
    pub weather_error: Option<String>,
    pub link: Option<String>,
}

/// Parse `"cyan"`, `"dark_gray"`, `"LightRed"` or `"rgb(R,G,B)"`.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let mut channels = inner.split(',').map(|p| p.trim().parse::<u8>());
        let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) = (
            channels.next(),
            channels.next(),
            channels.next(),
            channels.next(),
        ) else {
            return None;
        };
        return Some(Color::Rgb(r, g, b));
    }

    let name: String = s
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    let color = match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => return None,
    };
    Some(color)
}

fn apply(target: &mut Color, source: Option<&String>) {
    if let Some(color) = source.and_then(|s| parse_color(s)) {
        *target = color;
    }
}

impl ThemeConfig {
    pub fn build(&self) -> Theme {
        let mut t = Theme::default();
        apply(&mut t.border_focused, self.border_focused.as_ref());
        apply(&mut t.border_unfocused, self.border_unfocused.as_ref());
        apply(&mut t.text_primary, self.text_primary.as_ref());
        apply(&mut t.text_secondary, self.text_secondary.as_ref());
        apply(&mut t.accent, self.accent.as_ref());
        apply(&mut t.task_done, self.task_done.as_ref());
        apply(&mut t.selection, self.selection.as_ref());
        apply(&mut t.pomodoro_work, self.pomodoro_work.as_ref());
        apply(&mut t.pomodoro_break, self.pomodoro_break.as_ref());
        apply(&mut t.calendar_today, self.calendar_today.as_ref());
        apply(&mut t.calendar_selected, self.calendar_selected.as_ref());
        apply(&mut t.weather_ok, self.weather_ok.as_ref());
        apply(&mut t.weather_error, self.weather_error.as_ref());
        apply(&mut t.link, self.link.as_ref());
        t
    }
}
