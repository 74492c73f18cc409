mod app;
mod event;
mod form;
pub mod keymap;
pub mod theme;
mod ui;

use anyhow::Result;

use crate::api;
use crate::config::{self, Config};
use crate::dashboard::Dashboard;
use crate::dashboard::clock::{Clock, SystemClock};
use crate::dashboard::persistence::{FileStore, SessionLog};
use crate::weather::WeatherClient;
use crate::worker::Worker;

pub fn run(config: &Config) -> Result<()> {
    let service = api::connect(config)?;
    let worker = Worker::new(service, WeatherClient::new()?);
    let log = SessionLog::new(Box::new(FileStore::new(config::storage_path()?)));
    let dashboard = Dashboard::new(SystemClock.today(), log);

    let mut terminal = ratatui::init();
    let mut app = app::App::new(dashboard, worker, Box::new(SystemClock), config);
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
