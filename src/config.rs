use crate::view::ViewKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "ASKASHA_API_URL";
const ENV_USER_ID: &str = "ASKASHA_USER_ID";
const ENV_TIMEOUT: &str = "ASKASHA_REQUEST_TIMEOUT_SECS";
const ENV_VIEW: &str = "ASKASHA_VIEW";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ignoring {key}={value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub user_id: String,
    pub request_timeout_secs: u64,
    pub initial_view: ViewKey,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_id: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            initial_view: ViewKey::Unset,
        }
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_path() -> PathBuf {
    home_dir().join(".askasha").join("config.json")
}

fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let data = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads settings from `~/.askasha/config.json` and the environment. Problems
/// are returned as warnings; the app always starts with usable settings.
pub fn load() -> (AppConfig, Vec<ConfigError>) {
    let path = config_path();
    load_from(Some(&path), |key| std::env::var(key).ok())
}

pub fn load_from(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> (AppConfig, Vec<ConfigError>) {
    let mut warnings = Vec::new();

    let mut config = match path {
        Some(path) if path.exists() => match read_config_file(path) {
            Ok(config) => config,
            Err(err) => {
                warnings.push(err);
                AppConfig::default()
            }
        },
        _ => AppConfig::default(),
    };

    if let Some(url) = env(ENV_API_URL).filter(|value| !value.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(user_id) = env(ENV_USER_ID) {
        config.user_id = user_id.trim().to_string();
    }
    if let Some(raw) = env(ENV_TIMEOUT) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
            Ok(_) => warnings.push(ConfigError::InvalidValue {
                key: ENV_TIMEOUT,
                value: raw,
                reason: "timeout must be at least one second".to_string(),
            }),
            Err(err) => warnings.push(ConfigError::InvalidValue {
                key: ENV_TIMEOUT,
                value: raw,
                reason: err.to_string(),
            }),
        }
    }
    if let Some(raw) = env(ENV_VIEW) {
        match raw.parse::<ViewKey>() {
            Ok(view) => config.initial_view = view,
            Err(reason) => warnings.push(ConfigError::InvalidValue {
                key: ENV_VIEW,
                value: raw,
                reason,
            }),
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "askasha_config_{prefix}_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_file_and_env_gives_defaults() {
        let path = temp_file("missing");
        let (config, warnings) = load_from(Some(&path), env_from(&[]));

        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn file_values_are_read_and_partial_files_keep_defaults() {
        let path = temp_file("partial");
        fs::write(&path, r#"{ "user_id": "asha-42", "initial_view": "events" }"#)
            .expect("config file should be written");

        let (config, warnings) = load_from(Some(&path), env_from(&[]));
        fs::remove_file(&path).expect("config file should be removed");

        assert!(warnings.is_empty());
        assert_eq!(config.user_id, "asha-42");
        assert_eq!(config.initial_view, ViewKey::Events);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn env_overrides_file() {
        let path = temp_file("override");
        fs::write(&path, r#"{ "api_base_url": "http://file.test", "user_id": "from-file" }"#)
            .expect("config file should be written");

        let (config, warnings) = load_from(
            Some(&path),
            env_from(&[
                (ENV_API_URL, "http://env.test"),
                (ENV_USER_ID, " from-env "),
                (ENV_TIMEOUT, "5"),
                (ENV_VIEW, "roadmap"),
            ]),
        );
        fs::remove_file(&path).expect("config file should be removed");

        assert!(warnings.is_empty());
        assert_eq!(config.api_base_url, "http://env.test");
        assert_eq!(config.user_id, "from-env");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.initial_view, ViewKey::Roadmap);
    }

    #[test]
    fn malformed_file_warns_and_falls_back() {
        let path = temp_file("malformed");
        fs::write(&path, "{ not json").expect("config file should be written");

        let (config, warnings) = load_from(Some(&path), env_from(&[]));
        fs::remove_file(&path).expect("config file should be removed");

        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_env_values_are_reported_not_applied() {
        let (config, warnings) = load_from(
            None,
            env_from(&[(ENV_TIMEOUT, "soon"), (ENV_VIEW, "calendar")]),
        );

        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.initial_view, ViewKey::Unset);
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|warning| matches!(warning, ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let (config, warnings) = load_from(None, env_from(&[(ENV_TIMEOUT, "0")]));
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(warnings.len(), 1);
    }
}
