use anyhow::Result;
use chrono::NaiveDate;

use crate::store::Task;
use crate::worker::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// The task list for one day plus the keyboard selection cursor.
///
/// Nothing changes locally until the task service confirms it. The list is
/// the service's answer for `active_date`, in the service's order, and the
/// cursor is either `None` or a valid index into it.
///
/// Every fetch carries a generation number. Fetches for the same day can
/// finish out of order, so an answer older than the one already applied
/// is dropped.
#[derive(Debug)]
pub struct TaskStore {
    active_date: NaiveDate,
    tasks: Vec<Task>,
    cursor: Option<usize>,
    issued: u64,
    applied: u64,
}

impl TaskStore {
    pub fn new(active_date: NaiveDate) -> Self {
        Self {
            active_date,
            tasks: Vec::new(),
            cursor: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn active_date(&self) -> NaiveDate {
        self.active_date
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Task> {
        self.cursor.and_then(|i| self.tasks.get(i))
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Switch days. The selection is dropped immediately; the list on
    /// screen stays until the new day's fetch lands.
    pub fn set_active_date(&mut self, date: NaiveDate) -> Request {
        self.active_date = date;
        self.cursor = None;
        self.refresh()
    }

    pub fn refresh(&mut self) -> Request {
        self.issued += 1;
        Request::FetchTasks {
            date: self.active_date,
            generation: self.issued,
        }
    }

    /// Ask the service to create a task on the active day. Blank titles are
    /// ignored.
    pub fn create_task(&self, title: &str) -> Option<Request> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Request::CreateTask {
            title: title.to_string(),
            date: self.active_date,
        })
    }

    pub fn toggle_task(&self, id: i64) -> Request {
        Request::ToggleTask(id)
    }

    pub fn delete_task(&self, id: i64) -> Request {
        Request::DeleteTask(id)
    }

    pub fn move_selection(&mut self, direction: Direction) {
        let Some(last) = self.tasks.len().checked_sub(1) else {
            return;
        };
        self.cursor = Some(match (self.cursor, direction) {
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => last,
            (Some(i), Direction::Next) => (i + 1).min(last),
            (Some(i), Direction::Prev) => i.saturating_sub(1),
        });
    }

    pub fn clear_selection(&mut self) {
        self.cursor = None;
    }

    /// Replace the list with a fetched one. Answers for a day that is no
    /// longer active are dropped, as are answers overtaken by a newer fetch
    /// and failures. Returns whether the list was replaced.
    pub fn apply_fetched(
        &mut self,
        date: NaiveDate,
        generation: u64,
        result: Result<Vec<Task>>,
    ) -> bool {
        if date != self.active_date || generation <= self.applied {
            tracing::debug!("dropping stale task list for {date} (generation {generation})");
            return false;
        }
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.cursor = None;
                self.applied = generation;
                true
            }
            Err(e) => {
                tracing::warn!("failed to fetch tasks for {date}: {e:#}");
                false
            }
        }
    }

    /// A confirmed create means the active day's list is out of date. If the
    /// user has already moved to another day, that day's fetch is in flight
    /// and nothing more is needed.
    pub fn apply_created(&mut self, date: NaiveDate, result: &Result<Task>) -> Option<Request> {
        match result {
            Ok(task) => {
                tracing::info!("created task {} on {date}", task.id);
                (date == self.active_date).then(|| self.refresh())
            }
            Err(e) => {
                tracing::warn!("failed to create task: {e:#}");
                None
            }
        }
    }

    /// Apply the service's `completed` value. A task that is no longer in
    /// the list is ignored.
    pub fn apply_toggled(&mut self, id: i64, result: Result<bool>) {
        match result {
            Ok(completed) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.completed = completed;
                }
            }
            Err(e) => tracing::warn!("failed to toggle task {id}: {e:#}"),
        }
    }

    /// Remove a confirmed delete and pull the cursor along with it.
    pub fn apply_deleted(&mut self, id: i64, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!("failed to delete task {id}: {e:#}");
            return;
        }
        let Some(removed) = self.tasks.iter().position(|t| t.id == id) else {
            return;
        };
        self.tasks.remove(removed);
        self.cursor = reconcile_cursor(self.cursor, removed, self.tasks.len());
    }
}

/// Where the cursor lands after the task at `removed` leaves a list that is
/// now `len` long.
fn reconcile_cursor(cursor: Option<usize>, removed: usize, len: usize) -> Option<usize> {
    let cursor = cursor?;
    if removed < cursor {
        Some(cursor - 1)
    } else if removed == cursor {
        len.checked_sub(1).map(|last| cursor.min(last))
    } else {
        Some(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn task(id: i64, title: &str, completed: bool) -> Task {
        Task {
            id,
            title: title.into(),
            completed,
            date: "2026-10-16".into(),
            created_at: String::new(),
        }
    }

    fn generation(request: &Request) -> u64 {
        match request {
            Request::FetchTasks { generation, .. } => *generation,
            other => panic!("not a fetch: {other:?}"),
        }
    }

    /// Issue a fetch for the active day and apply `tasks` as its answer.
    fn land(store: &mut TaskStore, tasks: Vec<Task>) -> bool {
        let date = store.active_date();
        let request = store.refresh();
        store.apply_fetched(date, generation(&request), Ok(tasks))
    }

    fn store_with(tasks: Vec<Task>) -> TaskStore {
        let mut store = TaskStore::new(day(16));
        assert!(land(&mut store, tasks));
        store
    }

    fn abc() -> TaskStore {
        store_with(vec![
            task(1, "A", false),
            task(2, "B", false),
            task(3, "C", true),
        ])
    }

    fn ids(store: &TaskStore) -> Vec<i64> {
        store.tasks().iter().map(|t| t.id).collect()
    }

    #[test]
    fn movement_on_empty_list_is_noop() {
        let mut store = TaskStore::new(day(16));
        store.move_selection(Direction::Next);
        assert_eq!(store.cursor(), None);
        store.move_selection(Direction::Prev);
        assert_eq!(store.cursor(), None);
    }

    #[test]
    fn first_movement_picks_an_end() {
        let mut store = abc();
        store.move_selection(Direction::Next);
        assert_eq!(store.cursor(), Some(0));

        store.clear_selection();
        store.move_selection(Direction::Prev);
        assert_eq!(store.cursor(), Some(2));
    }

    #[test]
    fn movement_clamps_without_wrapping() {
        let mut store = abc();
        store.move_selection(Direction::Prev);
        store.move_selection(Direction::Next);
        assert_eq!(store.cursor(), Some(2));

        for _ in 0..5 {
            store.move_selection(Direction::Prev);
        }
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn movement_never_leaves_bounds() {
        for len in 1..6_i64 {
            let tasks = (0..len).map(|i| task(i, "t", false)).collect();
            let mut store = store_with(tasks);
            let moves = [
                Direction::Next,
                Direction::Next,
                Direction::Prev,
                Direction::Next,
                Direction::Next,
                Direction::Next,
                Direction::Next,
                Direction::Prev,
                Direction::Prev,
                Direction::Prev,
                Direction::Prev,
                Direction::Prev,
            ];
            for dir in moves {
                store.move_selection(dir);
                let cursor = store.cursor().unwrap();
                assert!(cursor < store.tasks().len());
            }
        }
    }

    #[test]
    fn delete_selected_middle_task_keeps_index() {
        let mut store = abc();
        store.move_selection(Direction::Next);
        store.move_selection(Direction::Next);
        assert_eq!(store.selected().unwrap().title, "B");

        let request = store.delete_task(2);
        assert_eq!(request, Request::DeleteTask(2));
        store.apply_deleted(2, Ok(()));

        assert_eq!(ids(&store), [1, 3]);
        assert_eq!(store.cursor(), Some(1));
        assert_eq!(store.selected().unwrap().title, "C");
    }

    #[test]
    fn delete_selected_last_task_clamps() {
        let mut store = abc();
        store.move_selection(Direction::Prev);
        store.apply_deleted(3, Ok(()));
        assert_eq!(store.cursor(), Some(1));
    }

    #[test]
    fn delete_only_task_clears_cursor() {
        let mut store = store_with(vec![task(1, "only", false)]);
        store.move_selection(Direction::Next);
        store.apply_deleted(1, Ok(()));
        assert!(store.tasks().is_empty());
        assert_eq!(store.cursor(), None);
    }

    #[test]
    fn delete_before_cursor_keeps_same_task_selected() {
        let mut store = abc();
        store.move_selection(Direction::Prev);
        assert_eq!(store.selected().unwrap().id, 3);

        store.apply_deleted(1, Ok(()));
        assert_eq!(store.cursor(), Some(1));
        assert_eq!(store.selected().unwrap().id, 3);
    }

    #[test]
    fn delete_after_cursor_leaves_it() {
        let mut store = abc();
        store.move_selection(Direction::Next);
        store.apply_deleted(3, Ok(()));
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn failed_delete_changes_nothing() {
        let mut store = abc();
        store.move_selection(Direction::Next);
        store.apply_deleted(1, Err(anyhow!("503")));
        assert_eq!(ids(&store), [1, 2, 3]);
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn reconcile_cursor_rules() {
        assert_eq!(reconcile_cursor(None, 0, 3), None);
        assert_eq!(reconcile_cursor(Some(2), 0, 3), Some(1));
        assert_eq!(reconcile_cursor(Some(2), 2, 2), Some(1));
        assert_eq!(reconcile_cursor(Some(0), 0, 0), None);
        assert_eq!(reconcile_cursor(Some(1), 3, 3), Some(1));
    }

    #[test]
    fn toggle_applies_server_value_by_id() {
        let mut store = abc();
        assert_eq!(store.toggle_task(3), Request::ToggleTask(3));
        store.apply_toggled(3, Ok(false));
        store.apply_toggled(1, Ok(true));
        let flags: Vec<bool> = store.tasks().iter().map(|t| t.completed).collect();
        assert_eq!(flags, [true, false, false]);
    }

    #[test]
    fn toggle_of_missing_task_is_noop() {
        let mut store = abc();
        store.apply_deleted(2, Ok(()));
        store.apply_toggled(2, Ok(true));
        assert_eq!(ids(&store), [1, 3]);
        assert!(!store.tasks()[0].completed);
    }

    #[test]
    fn failed_toggle_changes_nothing() {
        let mut store = abc();
        store.apply_toggled(1, Err(anyhow!("timeout")));
        assert!(!store.tasks()[0].completed);
    }

    #[test]
    fn create_trims_and_ignores_blank_titles() {
        let store = TaskStore::new(day(16));
        assert_eq!(store.create_task("   "), None);
        assert_eq!(
            store.create_task("  buy milk "),
            Some(Request::CreateTask {
                title: "buy milk".into(),
                date: day(16),
            })
        );
    }

    #[test]
    fn confirmed_create_refetches_active_day() {
        let mut store = TaskStore::new(day(16));
        let created = Ok(task(7, "new", false));
        assert_eq!(
            store.apply_created(day(16), &created),
            Some(Request::FetchTasks {
                date: day(16),
                generation: 1,
            })
        );

        store.set_active_date(day(17));
        assert_eq!(store.apply_created(day(16), &created), None);
        assert_eq!(store.apply_created(day(17), &Err(anyhow!("500"))), None);
    }

    #[test]
    fn switching_days_clears_cursor_before_fetch_lands() {
        let mut store = abc();
        store.move_selection(Direction::Next);
        assert_eq!(
            store.set_active_date(day(17)),
            Request::FetchTasks {
                date: day(17),
                generation: 2,
            }
        );
        assert_eq!(store.cursor(), None);
        assert_eq!(store.active_date(), day(17));
    }

    #[test]
    fn refetch_clears_cursor() {
        let mut store = abc();
        store.move_selection(Direction::Next);
        assert!(land(&mut store, vec![task(1, "A", false)]));
        assert_eq!(store.cursor(), None);
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut store = TaskStore::new(day(16));
        let old = store.refresh();
        let new = store.set_active_date(day(17));
        assert!(store.apply_fetched(day(17), generation(&new), Ok(vec![task(9, "tomorrow", false)])));

        // The fetch for the 16th finally answers.
        let late = vec![task(1, "A", false), task(2, "B", false)];
        assert!(!store.apply_fetched(day(16), generation(&old), Ok(late)));
        assert_eq!(ids(&store), [9]);
        assert_eq!(store.active_date(), day(17));
    }

    #[test]
    fn failed_fetch_keeps_current_list() {
        let mut store = abc();
        let request = store.refresh();
        assert!(!store.apply_fetched(day(16), generation(&request), Err(anyhow!("connection refused"))));
        assert_eq!(ids(&store), [1, 2, 3]);
    }

    #[test]
    fn overtaken_fetch_for_same_day_is_discarded() {
        let mut store = TaskStore::new(day(16));
        // Two creates confirmed back to back, each asking for a refetch.
        let first = store.apply_created(day(16), &Ok(task(1, "A", false))).unwrap();
        let second = store.apply_created(day(16), &Ok(task(2, "B", false))).unwrap();

        // The newer answer lands first.
        let both = vec![task(1, "A", false), task(2, "B", false)];
        assert!(store.apply_fetched(day(16), generation(&second), Ok(both)));

        let only_a = vec![task(1, "A", false)];
        assert!(!store.apply_fetched(day(16), generation(&first), Ok(only_a)));
        assert_eq!(ids(&store), [1, 2]);
    }

    #[test]
    fn failed_newer_fetch_does_not_block_older_answer() {
        let mut store = TaskStore::new(day(16));
        let first = store.refresh();
        let second = store.refresh();
        assert!(!store.apply_fetched(day(16), generation(&second), Err(anyhow!("timeout"))));
        assert!(store.apply_fetched(day(16), generation(&first), Ok(vec![task(1, "A", false)])));
        assert_eq!(ids(&store), [1]);
    }

    #[test]
    fn completed_count_tracks_toggles() {
        let mut store = abc();
        assert_eq!(store.completed_count(), 1);
        store.apply_toggled(1, Ok(true));
        assert_eq!(store.completed_count(), 2);
    }
}
