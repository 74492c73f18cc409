//! Work/break countdown.
//!
//! The state is a plain value and every transition is a pure function on
//! it. Nothing here owns a timer: the caller decides when a second has
//! passed and calls [`PomodoroEngine::tick`].
//!
//! ```text
//! Work --(0s while running)--> Break --(0s while running)--> Work
//! ```
//!
//! Every phase change stops the clock, so the next phase waits for an
//! explicit start.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::persistence::SessionLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Work,
    Break,
}

impl Mode {
    pub fn duration_secs(self) -> u32 {
        match self {
            Mode::Work => 25 * 60,
            Mode::Break => 5 * 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "focus",
            Mode::Break => "break",
        }
    }
}

/// What happened when a phase ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A work phase finished; `sessions` is the new count for today.
    WorkCompleted { sessions: u32 },
    BreakCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroState {
    pub mode: Mode,
    pub remaining_secs: u32,
    pub running: bool,
    pub sessions_today: u32,
}

impl PomodoroState {
    pub fn new(sessions_today: u32) -> Self {
        Self {
            mode: Mode::Work,
            remaining_secs: Mode::Work.duration_secs(),
            running: false,
            sessions_today,
        }
    }

    /// One second of countdown. Does nothing while paused.
    #[must_use]
    pub fn tick(self) -> Self {
        if !self.running {
            return self;
        }
        Self {
            remaining_secs: self.remaining_secs.saturating_sub(1),
            ..self
        }
    }

    /// Flip to the other phase if the running countdown has hit zero.
    #[must_use]
    pub fn settle(self) -> (Self, Option<Transition>) {
        if !self.running || self.remaining_secs > 0 {
            return (self, None);
        }
        match self.mode {
            Mode::Work => {
                let sessions = self.sessions_today + 1;
                let next = Self {
                    mode: Mode::Break,
                    remaining_secs: Mode::Break.duration_secs(),
                    running: false,
                    sessions_today: sessions,
                };
                (next, Some(Transition::WorkCompleted { sessions }))
            }
            Mode::Break => {
                let next = Self {
                    mode: Mode::Work,
                    remaining_secs: Mode::Work.duration_secs(),
                    running: false,
                    ..self
                };
                (next, Some(Transition::BreakCompleted))
            }
        }
    }

    #[must_use]
    pub fn toggle_running(self) -> Self {
        Self {
            running: !self.running,
            ..self
        }
    }

    #[must_use]
    pub fn reset(self) -> Self {
        Self {
            running: false,
            remaining_secs: self.mode.duration_secs(),
            ..self
        }
    }

    /// Elapsed share of the current phase, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        let total = f64::from(self.mode.duration_secs());
        (total - f64::from(self.remaining_secs)) / total
    }

    /// Position in the four-session cycle shown by the tracker dots.
    pub fn cycle_position(&self) -> u32 {
        self.sessions_today % 4
    }

    /// `mm:ss`
    pub fn clock_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }
}

/// The countdown plus the log that remembers today's sessions across
/// restarts.
pub struct PomodoroEngine {
    state: PomodoroState,
    log: SessionLog,
    /// The day `state.sessions_today` counts for.
    day: NaiveDate,
}

impl PomodoroEngine {
    /// Start in a paused work phase, seeded with today's stored count.
    pub fn new(log: SessionLog, today: NaiveDate) -> Self {
        let sessions = log.load(today);
        tracing::debug!("restored {sessions} pomodoro sessions for {today}");
        Self {
            state: PomodoroState::new(sessions),
            log,
            day: today,
        }
    }

    pub fn state(&self) -> PomodoroState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn toggle_running(&mut self) {
        self.state = self.state.toggle_running();
    }

    pub fn reset(&mut self) {
        self.state = self.state.reset();
    }

    /// Advance one second. A finished work phase is written to the log; a
    /// failed write is logged and otherwise ignored. The first tick on a new
    /// day reloads that day's count before anything is recorded.
    pub fn tick(&mut self, today: NaiveDate) -> Option<Transition> {
        if today != self.day {
            self.state.sessions_today = self.log.load(today);
            self.day = today;
            tracing::debug!("day changed to {today}, {} sessions so far", self.state.sessions_today);
        }
        let (state, transition) = self.state.tick().settle();
        self.state = state;
        if let Some(Transition::WorkCompleted { sessions }) = transition {
            tracing::info!("pomodoro session {sessions} completed");
            if let Err(e) = self.log.record(today, sessions) {
                tracing::warn!("failed to persist pomodoro sessions: {e:#}");
            }
        }
        transition
    }
}
