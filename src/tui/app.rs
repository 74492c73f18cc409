use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Days, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::config::Config;
use crate::dashboard::calendar::shift_month;
use crate::dashboard::clock::{Clock, Ticker};
use crate::dashboard::quicklinks::open_link;
use crate::dashboard::Dashboard;
use crate::worker::{Completion, Request, Worker};

use super::event::{self, AppEvent};
use super::form::TextField;
use super::keymap::{Action, Command, Dispatch, Focus, KeyMap};
use super::theme::Theme;
use super::ui;

/// Longest the loop sleeps waiting for input, so completions are picked up
/// promptly even when no timer is due.
const MAX_IDLE: Duration = Duration::from_millis(250);

pub struct App {
    pub dashboard: Dashboard,
    pub theme: Theme,
    pub keymap: KeyMap,
    pub should_quit: bool,

    pub focus: Focus,
    pub task_input: TextField,
    pub link_name: TextField,
    pub link_url: TextField,
    pub link_dialog_open: bool,
    pub show_help: bool,
    /// `X` was pressed; the next digit removes that bookmark.
    pub pending_remove: bool,

    /// Wall-clock time shown in the clock panel, refreshed once a second.
    pub now: chrono::DateTime<chrono::Local>,

    worker: Worker,
    clock: Box<dyn Clock>,
    clock_ticker: Ticker,
    pomodoro_ticker: Ticker,
}

impl App {
    pub fn new(dashboard: Dashboard, worker: Worker, clock: Box<dyn Clock>, config: &Config) -> Self {
        let mut app = App {
            dashboard,
            theme: config.theme.build(),
            keymap: KeyMap::default_keymap(),
            should_quit: false,
            focus: Focus::None,
            task_input: TextField::default(),
            link_name: TextField::default(),
            link_url: TextField::default(),
            link_dialog_open: false,
            show_help: false,
            pending_remove: false,
            now: clock.now(),
            worker,
            clock,
            clock_ticker: Ticker::every_second(),
            pomodoro_ticker: Ticker::every_second(),
        };
        let startup = app.dashboard.startup_requests(&config.weather);
        app.worker.submit_all(startup);
        app.clock_ticker.arm(Instant::now());
        app
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let result = self.event_loop(terminal);
        self.teardown();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            if let AppEvent::Key(key) = event::poll(self.poll_timeout(Instant::now()))? {
                self.handle_key(key);
            }
            self.process_completions();
            self.fire_timers(Instant::now());

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Stop both tickers so nothing keeps counting once the view is gone.
    fn teardown(&mut self) {
        self.clock_ticker.cancel();
        self.pomodoro_ticker.cancel();
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        [
            self.clock_ticker.time_until(now),
            self.pomodoro_ticker.time_until(now),
        ]
        .into_iter()
        .flatten()
        .fold(MAX_IDLE, Duration::min)
    }

    // ── Timers ────────────────────────────────────────────────────────

    pub fn fire_timers(&mut self, now: Instant) {
        if self.clock_ticker.fire(now) > 0 {
            self.now = self.clock.now();
        }
        let ticks = self.pomodoro_ticker.fire(now);
        let today = self.clock.today();
        for _ in 0..ticks {
            if self.dashboard.pomodoro.tick(today).is_some() {
                break;
            }
        }
        self.sync_pomodoro_ticker(now);
    }

    /// The pomodoro ticker runs exactly while the countdown does.
    fn sync_pomodoro_ticker(&mut self, now: Instant) {
        if self.dashboard.pomodoro.is_running() {
            self.pomodoro_ticker.arm(now);
        } else {
            self.pomodoro_ticker.cancel();
        }
    }

    // ── Completions ───────────────────────────────────────────────────

    /// Apply everything that has finished, including completions of
    /// follow-ups that finish while this runs.
    pub fn process_completions(&mut self) {
        loop {
            let done = self.worker.drain();
            if done.is_empty() {
                return;
            }
            for completion in done {
                self.apply_completion(completion);
            }
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        match &completion {
            Completion::TaskCreated { result: Ok(_), .. } => self.task_input.clear(),
            Completion::QuicklinkCreated(Ok(_)) => self.close_link_dialog(),
            _ => {}
        }
        let follow_up = self.dashboard.apply(completion);
        self.worker.submit_all(follow_up);
    }

    // ── Keys ──────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Any key closes help; Esc still goes on to cancel.
        if self.show_help {
            self.show_help = false;
            if key.code != KeyCode::Esc {
                return;
            }
        }

        if self.pending_remove {
            self.pending_remove = false;
            if let KeyCode::Char(c @ '1'..='9') = key.code
                && let Some(slot) = c.to_digit(10)
            {
                self.remove_bookmark(slot as usize);
                return;
            }
        }

        match self.keymap.dispatch(self.focus, key, &self.dashboard.tasks) {
            Dispatch::PassThrough => self.handle_text_key(key),
            Dispatch::Handled(Some(command)) => self.execute(command),
            Dispatch::Handled(None) => {}
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::FocusTaskInput => self.focus = Focus::TaskInput,
            Command::MoveSelection(direction) => self.dashboard.tasks.move_selection(direction),
            Command::Toggle(id) => self.submit(self.dashboard.tasks.toggle_task(id)),
            Command::Delete(id) => self.submit(self.dashboard.tasks.delete_task(id)),
            Command::Cancel { blur } => {
                if blur {
                    self.focus = Focus::None;
                }
                self.dashboard.tasks.clear_selection();
                self.close_link_dialog();
                self.show_help = false;
                self.pending_remove = false;
            }
            Command::App(action) => self.execute_action(action),
        }
    }

    fn execute_action(&mut self, action: Action) {
        let active = self.dashboard.tasks.active_date();
        match action {
            Action::Quit => self.should_quit = true,
            Action::ShowHelp => self.show_help = true,
            Action::PrevDay => self.set_active_date(active.checked_sub_days(Days::new(1))),
            Action::NextDay => self.set_active_date(active.checked_add_days(Days::new(1))),
            Action::Today => self.set_active_date(Some(self.clock.today())),
            Action::PrevMonth => self.set_active_date(Some(shift_month(active, -1))),
            Action::NextMonth => self.set_active_date(Some(shift_month(active, 1))),
            Action::StartPause => {
                self.dashboard.pomodoro.toggle_running();
                self.sync_pomodoro_ticker(Instant::now());
            }
            Action::ResetPomodoro => {
                self.dashboard.pomodoro.reset();
                self.sync_pomodoro_ticker(Instant::now());
            }
            Action::AddBookmark => {
                self.link_dialog_open = true;
                self.focus = Focus::LinkName;
            }
            Action::RemoveBookmark => self.pending_remove = true,
            Action::OpenBookmark(slot) => {
                if let Some(link) = self.dashboard.links.slot(usize::from(slot)) {
                    open_link(link);
                }
            }
            // Resolved by the keymap before reaching here.
            Action::Cancel
            | Action::NewTask
            | Action::MoveDown
            | Action::MoveUp
            | Action::ToggleTask
            | Action::DeleteTask => {}
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        match (self.focus, key.code) {
            (Focus::TaskInput, KeyCode::Enter) => {
                if let Some(request) = self.dashboard.tasks.create_task(self.task_input.value()) {
                    self.submit(request);
                }
            }
            (Focus::LinkName | Focus::LinkUrl, KeyCode::Enter) => {
                if let Some(request) = self
                    .dashboard
                    .links
                    .add(self.link_name.value(), self.link_url.value())
                {
                    self.submit(request);
                }
            }
            (Focus::LinkName, KeyCode::Tab | KeyCode::BackTab) => self.focus = Focus::LinkUrl,
            (Focus::LinkUrl, KeyCode::Tab | KeyCode::BackTab) => self.focus = Focus::LinkName,
            (Focus::TaskInput, _) => {
                self.task_input.edit(key.code, key.modifiers);
            }
            (Focus::LinkName, _) => {
                self.link_name.edit(key.code, key.modifiers);
            }
            (Focus::LinkUrl, _) => {
                self.link_url.edit(key.code, key.modifiers);
            }
            (Focus::None, _) => {}
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────

    fn submit(&self, request: Request) {
        self.worker.submit(request);
    }

    fn set_active_date(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            let request = self.dashboard.tasks.set_active_date(date);
            self.submit(request);
        }
    }

    fn remove_bookmark(&mut self, slot: usize) {
        if let Some(id) = self.dashboard.links.slot(slot).map(|l| l.id) {
            self.submit(self.dashboard.links.remove(id));
        }
    }

    fn close_link_dialog(&mut self) {
        if self.link_dialog_open {
            self.link_dialog_open = false;
            self.link_name.clear();
            self.link_url.clear();
            if matches!(self.focus, Focus::LinkName | Focus::LinkUrl) {
                self.focus = Focus::None;
            }
        }
    }
}
