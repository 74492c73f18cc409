use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tui::theme::ThemeConfig;

/// Where tasks and quicklinks live.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// A tick server reachable over HTTP at `server_url`.
    Http,
    /// A SQLite file on this machine.
    #[default]
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,

    /// Base URL of the task service. Default: `http://localhost:8080`
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Database file for the local backend. Default: `~/.tick/tick.db`
    #[serde(default)]
    pub db_path: Option<String>,

    /// Max level written to `~/.tick/tick.log`. Default: "info"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::default(),
            server_url: default_server_url(),
            db_path: None,
            log_level: default_log_level(),
            weather: WeatherConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Whether the weather panel fetches anything. Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Location for the forecast. Without both coordinates the panel
    /// reports the location as unavailable.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            enabled: true,
            latitude: None,
            longitude: None,
        }
    }
}

impl WeatherConfig {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if self.enabled => Some((lat, lon)),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the base tick directory: ~/.tick/
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".tick"))
}

/// Returns the path to the config file
pub fn config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

/// Returns the path to the local-backend `SQLite` database
pub fn db_path(config: &Config) -> Result<PathBuf> {
    match config.db_path {
        Some(ref custom) => Ok(PathBuf::from(custom)),
        None => Ok(base_dir()?.join("tick.db")),
    }
}

/// Returns the path to the key-value file backing the session counter
pub fn storage_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("storage.json"))
}

/// Returns the path to the log file
pub fn log_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("tick.log"))
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> Result<()> {
    let base = base_dir()?;
    fs::create_dir_all(&base).context("failed to create ~/.tick/")?;
    Ok(())
}

/// Load config from ~/.tick/config.toml (or return defaults if it doesn't exist)
pub fn load() -> Result<Config> {
    load_from(&config_path()?)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}
