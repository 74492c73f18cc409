use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};
use chrono::Local;

use super::TaskService;
use crate::store::{Quicklink, Store, Task};

/// Answers the task service contract straight from a SQLite file.
///
/// Validation matches the tick server: a task needs a title, a missing date
/// means today, and a quicklink needs both a name and a URL.
pub struct LocalService {
    store: Mutex<Store>,
}

impl LocalService {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| anyhow!("local store lock poisoned"))
    }
}

impl TaskService for LocalService {
    fn list_tasks(&self, date: &str) -> Result<Vec<Task>> {
        self.store()?.list_tasks(date)
    }

    fn create_task(&self, title: &str, date: &str) -> Result<Task> {
        if title.is_empty() {
            bail!("title is required");
        }
        let today;
        let date = if date.is_empty() {
            today = Local::now().format("%Y-%m-%d").to_string();
            today.as_str()
        } else {
            date
        };
        self.store()?.create_task(title, date)
    }

    fn toggle_task(&self, id: i64) -> Result<bool> {
        self.store()?.toggle_task(id)
    }

    fn delete_task(&self, id: i64) -> Result<()> {
        self.store()?.delete_task(id)
    }

    fn list_quicklinks(&self) -> Result<Vec<Quicklink>> {
        self.store()?.list_quicklinks()
    }

    fn create_quicklink(&self, name: &str, url: &str) -> Result<Quicklink> {
        if name.is_empty() {
            bail!("name is required");
        }
        if url.is_empty() {
            bail!("url is required");
        }
        self.store()?.create_quicklink(name, url)
    }

    fn delete_quicklink(&self, id: i64) -> Result<()> {
        self.store()?.delete_quicklink(id)
    }
}
