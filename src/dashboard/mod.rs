//! Dashboard state, independent of any terminal.
//!
//! Each panel owns its state privately and exposes operations that return
//! the [`Request`]s they need run, plus `apply_*` handlers for the matching
//! [`Completion`]s. [`Dashboard::apply`] routes completions to their owner.

pub mod calendar;
pub mod clock;
pub mod persistence;
pub mod pomodoro;
pub mod quicklinks;
pub mod tasks;

use chrono::NaiveDate;

use crate::config::WeatherConfig;
use crate::weather::WeatherPanel;
use crate::worker::{Completion, Request};

use self::persistence::SessionLog;
use self::pomodoro::PomodoroEngine;
use self::quicklinks::QuickShelf;
use self::tasks::TaskStore;

/// `YYYY-MM-DD`, the day key the task service speaks.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub struct Dashboard {
    pub tasks: TaskStore,
    pub pomodoro: PomodoroEngine,
    pub links: QuickShelf,
    pub weather: WeatherPanel,
}

impl Dashboard {
    pub fn new(today: NaiveDate, log: SessionLog) -> Self {
        Self {
            tasks: TaskStore::new(today),
            pomodoro: PomodoroEngine::new(log, today),
            links: QuickShelf::default(),
            weather: WeatherPanel::default(),
        }
    }

    /// Everything to load when the dashboard opens.
    pub fn startup_requests(&mut self, weather: &WeatherConfig) -> Vec<Request> {
        let mut requests = vec![self.tasks.refresh(), self.links.refresh()];
        requests.extend(self.weather.start(weather));
        requests
    }

    /// Route a completion to the panel that asked for it. Returns follow-up
    /// requests, such as the refetch after a create.
    pub fn apply(&mut self, completion: Completion) -> Vec<Request> {
        let follow_up = match completion {
            Completion::TasksFetched {
                date,
                generation,
                result,
            } => {
                self.tasks.apply_fetched(date, generation, result);
                None
            }
            Completion::TaskCreated { date, result } => self.tasks.apply_created(date, &result),
            Completion::TaskToggled { id, result } => {
                self.tasks.apply_toggled(id, result);
                None
            }
            Completion::TaskDeleted { id, result } => {
                self.tasks.apply_deleted(id, result);
                None
            }
            Completion::QuicklinksFetched(result) => {
                self.links.apply_fetched(result);
                None
            }
            Completion::QuicklinkCreated(result) => self.links.apply_created(&result),
            Completion::QuicklinkDeleted { id, result } => {
                self.links.apply_deleted(id, result);
                None
            }
            Completion::WeatherFetched(result) => {
                self.weather.apply(result);
                None
            }
        };
        follow_up.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::persistence::MemoryStore;
    use crate::store::Task;
    use crate::weather::WeatherStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(day(16), SessionLog::new(Box::new(MemoryStore::default())))
    }

    #[test]
    fn day_key_is_iso() {
        assert_eq!(day_key(day(6)), "2026-10-06");
    }

    #[test]
    fn startup_loads_tasks_and_links_without_weather() {
        let mut dash = dashboard();
        let requests = dash.startup_requests(&WeatherConfig::default());
        assert_eq!(
            requests,
            [
                Request::FetchTasks {
                    date: day(16),
                    generation: 1,
                },
                Request::FetchQuicklinks
            ]
        );
        assert_eq!(dash.weather.status(), WeatherStatus::Denied);
    }

    #[test]
    fn created_task_triggers_refetch() {
        let mut dash = dashboard();
        let follow_up = dash.apply(Completion::TaskCreated {
            date: day(16),
            result: Ok(Task {
                id: 1,
                title: "t".into(),
                completed: false,
                date: "2026-10-16".into(),
                created_at: String::new(),
            }),
        });
        assert_eq!(
            follow_up,
            [Request::FetchTasks {
                date: day(16),
                generation: 1,
            }]
        );
    }

    #[test]
    fn fetched_tasks_land_in_store() {
        let mut dash = dashboard();
        let follow_up = dash.apply(Completion::TasksFetched {
            date: day(16),
            generation: 1,
            result: Ok(vec![Task {
                id: 5,
                title: "read".into(),
                completed: true,
                date: "2026-10-16".into(),
                created_at: String::new(),
            }]),
        });
        assert!(follow_up.is_empty());
        assert_eq!(dash.tasks.tasks().len(), 1);
        assert_eq!(dash.tasks.completed_count(), 1);
    }
}
