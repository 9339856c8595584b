//! Configuration types for the askmos engine.
//!
//! This module defines where the backend lives, how long requests may take,
//! and the fixed messages the conversation session uses.

use crate::session::{DEFAULT_FALLBACK_MESSAGE, DEFAULT_WELCOME_MESSAGE};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for askmos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the archive backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Path of the question-answering endpoint.
    #[serde(default = "default_ask_path")]
    pub ask_path: String,

    /// Path (or absolute URL) of the rendered knowledge graph.
    #[serde(default = "default_graph_path")]
    pub graph_path: String,

    /// Deadline for a question, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Deadline for the graph request, in seconds.
    #[serde(default = "default_graph_timeout")]
    pub graph_timeout_seconds: u64,

    /// Seeded assistant greeting.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Assistant reply used when a question fails.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_ask_path() -> String {
    "/ask".into()
}

fn default_graph_path() -> String {
    "/neo4j_graph.html".into()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_graph_timeout() -> u64 {
    30
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.into()
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            ask_path: default_ask_path(),
            graph_path: default_graph_path(),
            request_timeout_seconds: default_request_timeout(),
            graph_timeout_seconds: default_graph_timeout(),
            welcome_message: default_welcome_message(),
            fallback_message: default_fallback_message(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Full URL of the question endpoint.
    pub fn ask_url(&self) -> Result<Url, ConfigError> {
        self.resolve(&self.ask_path)
    }

    /// Full URL of the graph artifact.
    pub fn graph_url(&self) -> Result<Url, ConfigError> {
        self.resolve(&self.graph_path)
    }

    /// Question deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Graph deadline.
    pub fn graph_timeout(&self) -> Duration {
        Duration::from_secs(self.graph_timeout_seconds)
    }

    /// Check everything a backend connection needs: both endpoints resolve
    /// to http(s) URLs and both deadlines are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ask_url()?;
        self.graph_url()?;
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_seconds"));
        }
        if self.graph_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout("graph_timeout_seconds"));
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
        // Absolute URLs bypass the backend.
        let (candidate, parsed) = match Url::parse(path) {
            Ok(url) => (path.to_string(), Ok(url)),
            Err(_) => {
                let joined = format!(
                    "{}/{}",
                    self.backend_url.trim_end_matches('/'),
                    path.trim_start_matches('/')
                );
                let parsed = Url::parse(&joined);
                (joined, parsed)
            }
        };

        let url = parsed.map_err(|e| ConfigError::InvalidUrl {
            url: candidate.clone(),
            reason: e.to_string(),
        })?;

        // `localhost:5000/ask` parses with `localhost` as its scheme.
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: candidate,
                reason: format!(
                    "unsupported scheme `{}`, expected http or https",
                    url.scheme()
                ),
            });
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(url),
            _ => Err(ConfigError::InvalidUrl {
                url: candidate,
                reason: "missing host".into(),
            }),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A configured endpoint is not a valid URL.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A deadline of zero would fail every request immediately.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.graph_timeout(), Duration::from_secs(30));
        assert_eq!(config.welcome_message, DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn test_endpoint_urls() {
        let config = Config {
            backend_url: "http://archive.example:8080/".into(),
            ..Config::default()
        };
        assert_eq!(
            config.ask_url().unwrap().as_str(),
            "http://archive.example:8080/ask"
        );
        assert_eq!(
            config.graph_url().unwrap().as_str(),
            "http://archive.example:8080/neo4j_graph.html"
        );
    }

    #[test]
    fn test_absolute_graph_path_is_kept() {
        let config = Config {
            graph_path: "https://cdn.example/graphs/kg.html".into(),
            ..Config::default()
        };
        assert_eq!(
            config.graph_url().unwrap().as_str(),
            "https://cdn.example/graphs/kg.html"
        );
    }

    #[test]
    fn test_invalid_backend_url() {
        let config = Config {
            backend_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.ask_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_schemeless_backend_url_is_invalid() {
        let config = Config {
            backend_url: "localhost:5000".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.ask_url(),
            Err(ConfigError::InvalidUrl { ref url, .. }) if url == "localhost:5000/ask"
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_absolute_graph_path_needs_http_scheme() {
        let config = Config {
            graph_path: "archive:8080/graph.html".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.graph_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let config = Config {
            graph_path: "file:///tmp/graph.html".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.graph_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            request_timeout_seconds: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("request_timeout_seconds"))
        ));

        let config = Config {
            graph_timeout_seconds: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("graph_timeout_seconds"))
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"backend_url":"http://10.0.0.2:5000"}"#).unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:5000");
        assert_eq!(config.ask_path, "/ask");
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".askmos").join("config.json");

        let config = Config {
            request_timeout_seconds: 5,
            ..Config::default()
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
