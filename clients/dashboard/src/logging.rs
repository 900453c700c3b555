//! File logging for the dashboard; the terminal belongs to the UI

use anyhow::Result;
use std::{fs::OpenOptions, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// Install a global subscriber appending to `path`
pub fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_the_log_file() {
        let path = std::env::temp_dir().join(format!("dashboard-log-{}.log", uuid::Uuid::new_v4()));

        init_file_logging(&path).unwrap();
        tracing::warn!("dashboard log line");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("dashboard log line"));

        // Only one global subscriber per process
        assert!(init_file_logging(&path).is_err());

        let _ = std::fs::remove_file(&path);
    }
}
