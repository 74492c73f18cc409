use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    /// Nothing arrived within the timeout.
    Idle,
}

/// Wait up to `timeout` for a key press. Releases and repeats reported by
/// terminals with the kitty protocol are ignored.
pub fn poll(timeout: Duration) -> Result<AppEvent> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(AppEvent::Key(key));
    }
    Ok(AppEvent::Idle)
}
