use anyhow::{Result, bail};
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use super::models::{Quicklink, Task};

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let completed: i64 = row.get(2)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: completed != 0,
        date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn quicklink_from_row(row: &Row<'_>) -> rusqlite::Result<Quicklink> {
    Ok(Quicklink {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Store {
    // ── Tasks ──

    pub fn list_tasks(&self, date: &str) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, completed, date, created_at
             FROM tasks WHERE date = ?1
             ORDER BY created_at, id",
        )?;
        let tasks = stmt
            .query_map(params![date], task_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                "SELECT id, title, completed, date, created_at FROM tasks WHERE id = ?1",
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    pub fn create_task(&self, title: &str, date: &str) -> Result<Task> {
        self.conn.execute(
            "INSERT INTO tasks (title, date) VALUES (?1, ?2)",
            params![title, date],
        )?;
        let id = self.conn.last_insert_rowid();
        match self.get_task(id)? {
            Some(task) => Ok(task),
            None => bail!("task {id} vanished after insert"),
        }
    }

    /// Flip `completed` and return the value it now holds.
    pub fn toggle_task(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = 1 - completed WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            bail!("task {id} not found");
        }
        let completed: i64 = self.conn.query_row(
            "SELECT completed FROM tasks WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(completed != 0)
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            bail!("task {id} not found");
        }
        Ok(())
    }

    // ── Quicklinks ──

    pub fn list_quicklinks(&self) -> Result<Vec<Quicklink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, created_at FROM quicklinks ORDER BY created_at, id",
        )?;
        let links = stmt
            .query_map([], quicklink_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(links)
    }

    pub fn create_quicklink(&self, name: &str, url: &str) -> Result<Quicklink> {
        self.conn.execute(
            "INSERT INTO quicklinks (name, url) VALUES (?1, ?2)",
            params![name, url],
        )?;
        let id = self.conn.last_insert_rowid();
        let link = self.conn.query_row(
            "SELECT id, name, url, created_at FROM quicklinks WHERE id = ?1",
            params![id],
            quicklink_from_row,
        )?;
        Ok(link)
    }

    pub fn delete_quicklink(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM quicklinks WHERE id = ?1", params![id])?;
        Ok(())
    }
}
