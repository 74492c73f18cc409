pub mod api;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod store;
pub mod tui;
pub mod weather;
pub mod worker;
