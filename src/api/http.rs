use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use serde_json::json;

use super::TaskService;
use crate::store::{Quicklink, Task, ToggleResult};

/// Client for the tick server's `/api/tasks` and `/api/quicklinks` routes.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Turn any non-2xx answer into an error carrying the status.
fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    response
        .error_for_status()
        .with_context(|| format!("task service answered {status}"))
}

impl TaskService for HttpService {
    fn list_tasks(&self, date: &str) -> Result<Vec<Task>> {
        let response = self
            .client
            .get(self.url("/api/tasks"))
            .query(&[("date", date)])
            .send()
            .context("GET /api/tasks failed")?;
        // The server encodes an empty day as `null`.
        let tasks: Option<Vec<Task>> = ensure_success(response)?
            .json()
            .context("malformed task list")?;
        Ok(tasks.unwrap_or_default())
    }

    fn create_task(&self, title: &str, date: &str) -> Result<Task> {
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .json(&json!({ "title": title, "date": date }))
            .send()
            .context("POST /api/tasks failed")?;
        ensure_success(response)?
            .json()
            .context("malformed created task")
    }

    fn toggle_task(&self, id: i64) -> Result<bool> {
        let response = self
            .client
            .patch(self.url("/api/tasks"))
            .query(&[("id", id)])
            .send()
            .context("PATCH /api/tasks failed")?;
        let result: ToggleResult = ensure_success(response)?
            .json()
            .context("malformed toggle response")?;
        Ok(result.completed)
    }

    fn delete_task(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/api/tasks"))
            .query(&[("id", id)])
            .send()
            .context("DELETE /api/tasks failed")?;
        ensure_success(response)?;
        Ok(())
    }

    fn list_quicklinks(&self) -> Result<Vec<Quicklink>> {
        let response = self
            .client
            .get(self.url("/api/quicklinks"))
            .send()
            .context("GET /api/quicklinks failed")?;
        let links: Option<Vec<Quicklink>> = ensure_success(response)?
            .json()
            .context("malformed quicklink list")?;
        Ok(links.unwrap_or_default())
    }

    fn create_quicklink(&self, name: &str, url: &str) -> Result<Quicklink> {
        let response = self
            .client
            .post(self.url("/api/quicklinks"))
            .json(&json!({ "name": name, "url": url }))
            .send()
            .context("POST /api/quicklinks failed")?;
        ensure_success(response)?
            .json()
            .context("malformed created quicklink")
    }

    fn delete_quicklink(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/api/quicklinks"))
            .query(&[("id", id)])
            .send()
            .context("DELETE /api/quicklinks failed")?;
        ensure_success(response)?;
        Ok(())
    }
}
