//! Client configuration

use std::path::PathBuf;

/// Dashboard client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the task API
    pub api_url: String,
    /// File holding the persisted session
    pub session_file: PathBuf,
    /// Optional log file; the terminal itself is reserved for the UI
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DASHBOARD_API_URL`: API base URL (default: "http://localhost:5000")
    /// - `DASHBOARD_SESSION_FILE`: Session file (default: "$HOME/.task-dashboard/session.json")
    /// - `DASHBOARD_LOG`: Log file path (default: logging disabled)
    pub fn from_env() -> Self {
        let api_url = std::env::var("DASHBOARD_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());

        let session_file = std::env::var("DASHBOARD_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        let log_file = std::env::var("DASHBOARD_LOG").ok().map(PathBuf::from);

        Self {
            api_url,
            session_file,
            log_file,
        }
    }
}

fn default_session_file() -> PathBuf {
    let base = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".task-dashboard").join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_client_config_defaults() {
        let original_home = std::env::var("HOME").ok();
        unsafe {
            std::env::remove_var("DASHBOARD_API_URL");
            std::env::remove_var("DASHBOARD_SESSION_FILE");
            std::env::remove_var("DASHBOARD_LOG");
            std::env::set_var("HOME", "/home/jo");
        }

        let config = ClientConfig::from_env();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(
            config.session_file,
            PathBuf::from("/home/jo/.task-dashboard/session.json")
        );
        assert_eq!(config.log_file, None);

        unsafe {
            match original_home {
                Some(home) => std::env::set_var("HOME", home),
                None => std::env::remove_var("HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_client_config_from_env() {
        unsafe {
            std::env::set_var("DASHBOARD_API_URL", "http://tasks.internal:8080");
            std::env::set_var("DASHBOARD_SESSION_FILE", "/tmp/session.json");
            std::env::set_var("DASHBOARD_LOG", "/tmp/dashboard.log");
        }

        let config = ClientConfig::from_env();
        assert_eq!(config.api_url, "http://tasks.internal:8080");
        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/dashboard.log")));

        unsafe {
            std::env::remove_var("DASHBOARD_API_URL");
            std::env::remove_var("DASHBOARD_SESSION_FILE");
            std::env::remove_var("DASHBOARD_LOG");
        }
    }
}
