//! The task service seam.
//!
//! Everything the dashboard knows about tasks and quicklinks arrives through
//! [`TaskService`]. The HTTP implementation talks to a running tick server;
//! the local implementation answers from a SQLite file with the same
//! semantics, so the dashboard cannot tell them apart.

mod http;
mod local;

pub use http::HttpService;
pub use local::LocalService;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{self, Backend, Config};
use crate::store::{Quicklink, Store, Task};

pub trait TaskService: Send + Sync {
    /// Tasks for a `YYYY-MM-DD` day key, in service order. No tasks is an
    /// empty list, never an error.
    fn list_tasks(&self, date: &str) -> Result<Vec<Task>>;

    fn create_task(&self, title: &str, date: &str) -> Result<Task>;

    /// Flip a task and report the `completed` value the service settled on.
    fn toggle_task(&self, id: i64) -> Result<bool>;

    fn delete_task(&self, id: i64) -> Result<()>;

    fn list_quicklinks(&self) -> Result<Vec<Quicklink>>;

    fn create_quicklink(&self, name: &str, url: &str) -> Result<Quicklink>;

    fn delete_quicklink(&self, id: i64) -> Result<()>;
}

/// Build the service selected by `config.backend`.
pub fn connect(config: &Config) -> Result<Arc<dyn TaskService>> {
    match config.backend {
        Backend::Http => {
            tracing::info!("using task service at {}", config.server_url);
            Ok(Arc::new(HttpService::new(&config.server_url)?))
        }
        Backend::Local => {
            let path = config::db_path(config)?;
            tracing::info!("using local database {}", path.display());
            let store = Store::open(&path)?;
            store.migrate()?;
            Ok(Arc::new(LocalService::new(store)))
        }
    }
}
