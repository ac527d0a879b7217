//! Service configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory.

use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration shared by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Service name, used in log fields.
    pub service: String,
    /// Listen interface.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Upper bound on establishing a single backend connection.
    pub connect_timeout_secs: u64,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads configuration from the environment.
    pub fn load_with_service(service: &str) -> Self {
        load_dotenv(Path::new(".env"));
        Self::from_lookup(service, |key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(service: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SERVER_HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("SERVER_PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let connect_timeout_secs = lookup("PROBE_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let log_json = lookup("LOG_FORMAT")
            .map(|v| v.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self {
            service: service.to_string(),
            host,
            port,
            connect_timeout_secs,
            log_json,
        }
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup("health-service", |_| None)
    }
}

/// Loads a `.env` file (best-effort, no error if missing).
///
/// Variables already present in the environment are left untouched.
fn load_dotenv(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
    tracing::debug!(path = %path.display(), "loaded environment file");
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_listen_on_all_interfaces_port_8000() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(!config.log_json);
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_lookup(
            "svc",
            lookup_from(&[
                ("SERVER_HOST", "127.0.0.1"),
                ("SERVER_PORT", "9000"),
                ("PROBE_CONNECT_TIMEOUT_SECS", "3"),
                ("LOG_FORMAT", "JSON"),
            ]),
        );
        assert_eq!(config.service, "svc");
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.connect_timeout_secs, 3);
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(
            "svc",
            lookup_from(&[
                ("SERVER_PORT", "not-a-port"),
                ("PROBE_CONNECT_TIMEOUT_SECS", "0"),
            ]),
        );
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_dotenv_skips_comments_and_blank_lines() {
        let content = "# comment\n\nSERVER_PORT = 8001\nbroken line\n=novalue\n";
        assert_eq!(parse_dotenv(content), vec![("SERVER_PORT", "8001")]);
    }
}
