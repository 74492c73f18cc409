use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;

/// Route `tracing` output to `path`.
///
/// The dashboard owns the terminal, so nothing may be written to stdout or
/// stderr while it runs. An unknown `level` falls back to `info`. A second
/// call is a no-op.
pub fn init(path: &Path, level: &str) -> Result<()> {
    let max_level = parse_level(level);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(max_level)
        .try_init();

    Ok(())
}

fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_any_case() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level(" trace "), Level::TRACE);
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(parse_level("chatty"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tick.log");
        init(&path, "info").unwrap();
        assert!(path.exists());
    }
}
