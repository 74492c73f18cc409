//! Background request execution.
//!
//! Every user action becomes one [`Request`], run on its own thread so the
//! event loop never blocks on the network. Results come back as tagged
//! [`Completion`]s that the event loop drains between key presses. Requests
//! are never queued or coalesced: two toggles fired back to back are two
//! independent round trips, and their completions may arrive in any order.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::Result;
use chrono::NaiveDate;

use crate::api::TaskService;
use crate::dashboard::day_key;
use crate::store::{Quicklink, Task};
use crate::weather::{Weather, WeatherClient};

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `generation` orders fetches issued by the task list, so an answer
    /// that overtakes a newer one can be recognised.
    FetchTasks { date: NaiveDate, generation: u64 },
    CreateTask { title: String, date: NaiveDate },
    ToggleTask(i64),
    DeleteTask(i64),
    FetchQuicklinks,
    CreateQuicklink { name: String, url: String },
    DeleteQuicklink(i64),
    FetchWeather { latitude: f64, longitude: f64 },
}

/// The outcome of a [`Request`], tagged with whatever the receiver needs to
/// decide whether the result is still relevant.
#[derive(Debug)]
pub enum Completion {
    TasksFetched {
        date: NaiveDate,
        generation: u64,
        result: Result<Vec<Task>>,
    },
    TaskCreated {
        date: NaiveDate,
        result: Result<Task>,
    },
    TaskToggled {
        id: i64,
        result: Result<bool>,
    },
    TaskDeleted {
        id: i64,
        result: Result<()>,
    },
    QuicklinksFetched(Result<Vec<Quicklink>>),
    QuicklinkCreated(Result<Quicklink>),
    QuicklinkDeleted {
        id: i64,
        result: Result<()>,
    },
    WeatherFetched(Result<Weather>),
}

/// Run one request to completion on the calling thread.
pub fn execute(service: &dyn TaskService, weather: &WeatherClient, request: Request) -> Completion {
    match request {
        Request::FetchTasks { date, generation } => Completion::TasksFetched {
            date,
            generation,
            result: service.list_tasks(&day_key(date)),
        },
        Request::CreateTask { title, date } => Completion::TaskCreated {
            date,
            result: service.create_task(&title, &day_key(date)),
        },
        Request::ToggleTask(id) => Completion::TaskToggled {
            id,
            result: service.toggle_task(id),
        },
        Request::DeleteTask(id) => Completion::TaskDeleted {
            id,
            result: service.delete_task(id),
        },
        Request::FetchQuicklinks => Completion::QuicklinksFetched(service.list_quicklinks()),
        Request::CreateQuicklink { name, url } => {
            Completion::QuicklinkCreated(service.create_quicklink(&name, &url))
        }
        Request::DeleteQuicklink(id) => Completion::QuicklinkDeleted {
            id,
            result: service.delete_quicklink(id),
        },
        Request::FetchWeather {
            latitude,
            longitude,
        } => Completion::WeatherFetched(weather.fetch(latitude, longitude)),
    }
}

enum Mode {
    Threaded,
    #[cfg(test)]
    Inline,
}

pub struct Worker {
    service: Arc<dyn TaskService>,
    weather: Arc<WeatherClient>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    mode: Mode,
}

impl Worker {
    pub fn new(service: Arc<dyn TaskService>, weather: WeatherClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            weather: Arc::new(weather),
            tx,
            rx,
            mode: Mode::Threaded,
        }
    }

    /// A worker that runs each request synchronously inside `submit`, so
    /// tests can control exactly when completions become visible.
    #[cfg(test)]
    pub fn inline(service: Arc<dyn TaskService>, weather: WeatherClient) -> Self {
        Self {
            mode: Mode::Inline,
            ..Self::new(service, weather)
        }
    }

    pub fn submit(&self, request: Request) {
        tracing::debug!("request: {request:?}");
        match self.mode {
            Mode::Threaded => {
                let service = Arc::clone(&self.service);
                let weather = Arc::clone(&self.weather);
                let tx = self.tx.clone();
                thread::spawn(move || {
                    // The receiver is gone once the dashboard has shut down.
                    let _ = tx.send(execute(service.as_ref(), &weather, request));
                });
            }
            #[cfg(test)]
            Mode::Inline => {
                let _ = self
                    .tx
                    .send(execute(self.service.as_ref(), &self.weather, request));
            }
        }
    }

    pub fn submit_all(&self, requests: impl IntoIterator<Item = Request>) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Everything that has finished since the last call, in arrival order.
    pub fn drain(&self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            done.push(completion);
        }
        done
    }
}
