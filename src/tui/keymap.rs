use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dashboard::tasks::{Direction, TaskStore};

// ── Actions ──────────────────────────────────────────────────────────

/// Every discrete action the dashboard performs in response to a key press.
///
/// Actions are context-free identifiers; [`KeyMap::dispatch`] resolves the
/// task-list ones against the live list, and `App` executes the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ShowHelp,
    Cancel,

    // Tasks
    NewTask,
    MoveDown,
    MoveUp,
    ToggleTask,
    DeleteTask,

    // Dates
    PrevDay,
    NextDay,
    Today,
    PrevMonth,
    NextMonth,

    // Pomodoro
    StartPause,
    ResetPomodoro,

    // Bookmarks
    AddBookmark,
    RemoveBookmark,
    /// Open the bookmark in this 1-based slot.
    OpenBookmark(u8),
}

// ── Help categories ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpCategory {
    Tasks,
    Navigation,
    Pomodoro,
    Bookmarks,
}

impl HelpCategory {
    fn label(self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Navigation => "Navigation",
            Self::Pomodoro => "Pomodoro",
            Self::Bookmarks => "Bookmarks",
        }
    }

    const ORDERED: &[Self] = &[
        Self::Tasks,
        Self::Navigation,
        Self::Pomodoro,
        Self::Bookmarks,
    ];
}

// ── Keybinding ───────────────────────────────────────────────────────

/// A single key → action mapping with metadata for the help overlay.
/// Bindings with an empty label are aliases and stay out of the help.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: Action,
    pub label: &'static str,
    pub description: &'static str,
    pub category: HelpCategory,
}

#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub label: &'static str,
    pub description: &'static str,
}

// ── Focus and dispatch ───────────────────────────────────────────────

/// Where typed characters go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Keys are commands.
    None,
    TaskInput,
    LinkName,
    LinkUrl,
}

impl Focus {
    pub fn is_text_entry(self) -> bool {
        !matches!(self, Focus::None)
    }
}

/// A resolved key press, ready for `App` to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FocusTaskInput,
    MoveSelection(Direction),
    Toggle(i64),
    Delete(i64),
    /// Clear the selection and close dialogs; `blur` also leaves the
    /// focused text field.
    Cancel { blur: bool },
    App(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The key belongs to the focused text field.
    PassThrough,
    /// The key was consumed, possibly doing nothing (`x` with no selection).
    Handled(Option<Command>),
}

// ── KeyMap ────────────────────────────────────────────────────────────

/// Declarative registry of every command-mode key binding.
pub struct KeyMap {
    pub bindings: Vec<KeyBinding>,
}

impl KeyMap {
    pub fn default_keymap() -> Self {
        Self {
            bindings: default_bindings(),
        }
    }

    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        // Shift is already folded into the character for letters and symbols.
        let modifiers = if matches!(code, KeyCode::Char(_)) {
            modifiers.difference(KeyModifiers::SHIFT)
        } else {
            modifiers
        };
        self.bindings
            .iter()
            .find(|kb| kb.code == code && kb.modifiers == modifiers)
            .map(|kb| kb.action)
    }

    /// Resolve a key press against the current focus and task list.
    ///
    /// Esc is honoured everywhere. Any other key typed into a text field is
    /// left for the field. Toggle and delete read the selection at this
    /// moment, so they always target the task under the cursor now.
    pub fn dispatch(&self, focus: Focus, key: KeyEvent, tasks: &TaskStore) -> Dispatch {
        if key.code == KeyCode::Esc {
            return Dispatch::Handled(Some(Command::Cancel {
                blur: focus.is_text_entry(),
            }));
        }
        if focus.is_text_entry() {
            return Dispatch::PassThrough;
        }
        let Some(action) = self.lookup(key.code, key.modifiers) else {
            return Dispatch::Handled(None);
        };
        let command = match action {
            Action::NewTask => Some(Command::FocusTaskInput),
            Action::MoveDown => Some(Command::MoveSelection(Direction::Next)),
            Action::MoveUp => Some(Command::MoveSelection(Direction::Prev)),
            Action::ToggleTask => tasks.selected().map(|t| Command::Toggle(t.id)),
            Action::DeleteTask => tasks.selected().map(|t| Command::Delete(t.id)),
            Action::Cancel => Some(Command::Cancel { blur: false }),
            other => Some(Command::App(other)),
        };
        Dispatch::Handled(command)
    }

    /// Grouped help rows in display order.
    pub fn help_entries(&self) -> Vec<(&'static str, Vec<HelpEntry>)> {
        HelpCategory::ORDERED
            .iter()
            .filter_map(|&cat| {
                let entries: Vec<HelpEntry> = self
                    .bindings
                    .iter()
                    .filter(|kb| kb.category == cat && !kb.label.is_empty())
                    .map(|kb| HelpEntry {
                        label: kb.label,
                        description: kb.description,
                    })
                    .collect();
                (!entries.is_empty()).then(|| (cat.label(), entries))
            })
            .collect()
    }
}

// ── Default bindings ─────────────────────────────────────────────────

fn bind(
    code: KeyCode,
    action: Action,
    label: &'static str,
    description: &'static str,
    category: HelpCategory,
) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: KeyModifiers::NONE,
        action,
        label,
        description,
        category,
    }
}

fn alias(code: KeyCode, action: Action, category: HelpCategory) -> KeyBinding {
    bind(code, action, "", "", category)
}

#[allow(clippy::enum_glob_use)]
fn default_bindings() -> Vec<KeyBinding> {
    use Action::*;
    use HelpCategory::*;

    let mut bindings = vec![
        // ── Tasks ────────────────────────────────────────────────
        bind(KeyCode::Char('n'), NewTask, "n", "new task", Tasks),
        bind(KeyCode::Char('j'), MoveDown, "j/k", "move selection", Tasks),
        alias(KeyCode::Down, MoveDown, Tasks),
        alias(KeyCode::Char('k'), MoveUp, Tasks),
        alias(KeyCode::Up, MoveUp, Tasks),
        bind(KeyCode::Char('x'), ToggleTask, "x", "toggle done", Tasks),
        bind(KeyCode::Char('d'), DeleteTask, "d", "delete", Tasks),
        bind(KeyCode::Esc, Cancel, "esc", "clear / close", Tasks),
        // ── Navigation ───────────────────────────────────────────
        bind(KeyCode::Char('h'), PrevDay, "h/l", "prev / next day", Navigation),
        alias(KeyCode::Left, PrevDay, Navigation),
        alias(KeyCode::Char('l'), NextDay, Navigation),
        alias(KeyCode::Right, NextDay, Navigation),
        bind(KeyCode::Char('H'), PrevMonth, "H/L", "prev / next month", Navigation),
        alias(KeyCode::Char('L'), NextMonth, Navigation),
        bind(KeyCode::Char('t'), Today, "t", "today", Navigation),
        bind(KeyCode::Char('?'), ShowHelp, "?", "help", Navigation),
        bind(KeyCode::Char('q'), Quit, "q", "quit", Navigation),
        KeyBinding {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            action: Quit,
            label: "",
            description: "",
            category: Navigation,
        },
        // ── Pomodoro ─────────────────────────────────────────────
        bind(KeyCode::Char('p'), StartPause, "p", "start / pause", Pomodoro),
        bind(KeyCode::Char('r'), ResetPomodoro, "r", "reset", Pomodoro),
        // ── Bookmarks ────────────────────────────────────────────
        bind(KeyCode::Char('b'), AddBookmark, "b", "add bookmark", Bookmarks),
        bind(KeyCode::Char('X'), RemoveBookmark, "X 1-9", "remove bookmark", Bookmarks),
    ];

    bindings.extend((1..=9u8).map(|slot| {
        let code = KeyCode::Char(char::from(b'0' + slot));
        if slot == 1 {
            bind(code, OpenBookmark(slot), "1-9", "open bookmark", Bookmarks)
        } else {
            alias(code, OpenBookmark(slot), Bookmarks)
        }
    }));

    bindings
}

// ── Tests ────────────────────────────────────────────────────────────
