//! Layered configuration: built-in defaults, an optional TOML file, then
//! `BGSUBS_*` environment variables (nested keys joined with `__`).

use crate::{
    Result, SubsError,
    provider::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, PROVIDER_IDS},
    query::{DEFAULT_MAX_QUERIES, MAX_QUERIES_CAP},
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "BGSUBS";
const APP_DIR: &str = "bgsubs";
const CONFIG_FILE: &str = "config.toml";

/// Library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsConfig {
    /// User-Agent sent on every request
    pub user_agent: String,
    /// Timeout of a single search attempt or download request
    pub request_timeout_secs: u64,
    /// Upper bound on query variations per provider
    pub max_query_variations: usize,
    /// Enabled provider ids, searched in the built-in order
    pub providers: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for SubsConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_query_variations: DEFAULT_MAX_QUERIES,
            providers: PROVIDER_IDS.iter().map(ToString::to_string).collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SubsConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject values the library can't work with
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(SubsError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_QUERIES_CAP).contains(&self.max_query_variations) {
            return Err(SubsError::Config(format!(
                "max_query_variations must be between 1 and {MAX_QUERIES_CAP}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SubsError::Config("user_agent must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Tracing output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Also write daily-rotated log files here
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

/// `<config dir>/bgsubs/config.toml`, when the platform has a config dir
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load configuration from `path` (or the default location) and the process environment.
///
/// A missing file is not an error.
pub fn load(path: Option<&Path>) -> anyhow::Result<SubsConfig> {
    load_from(path.map(Path::to_path_buf).or_else(default_path), None)
}

fn load_from(
    path: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
) -> anyhow::Result<SubsConfig> {
    let mut builder = config::Config::builder().add_source(
        config::Config::try_from(&SubsConfig::default())
            .context("Failed to serialize default configuration")?,
    );

    if let Some(path) = &path {
        builder = builder.add_source(config::File::from(path.as_path()).required(false));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("providers")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .with_context(|| match &path {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })?;

    let config: SubsConfig = settings
        .try_deserialize()
        .context("Invalid configuration")?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = SubsConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_query_variations, 3);
        assert_eq!(config.providers, vec!["sab", "subsunacs", "yavka", "podnapisi"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(Some(dir.path().join("absent.toml")), env(&[])).unwrap();
        assert_eq!(config, SubsConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
request_timeout_secs = 4
providers = ["yavka", "sab"]

[logging]
level = "bgsubs=debug"
json = true
"#
        )
        .unwrap();

        let config = load_from(Some(file.path().to_path_buf()), env(&[])).unwrap();
        assert_eq!(config.request_timeout_secs, 4);
        assert_eq!(config.providers, vec!["yavka", "sab"]);
        assert_eq!(config.max_query_variations, 3);
        assert_eq!(config.logging.level, "bgsubs=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_query_variations = 2").unwrap();

        let config = load_from(
            Some(file.path().to_path_buf()),
            env(&[
                ("BGSUBS_MAX_QUERY_VARIATIONS", "1"),
                ("BGSUBS_PROVIDERS", "podnapisi,sab"),
                ("BGSUBS_LOGGING__LEVEL", "warn"),
            ]),
        )
        .unwrap();

        assert_eq!(config.max_query_variations, 1);
        assert_eq!(config.providers, vec!["podnapisi", "sab"]);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = SubsConfig {
            request_timeout_secs: 0,
            ..SubsConfig::default()
        };
        assert!(matches!(config.validate(), Err(SubsError::Config(_))));

        let result = load_from(None, env(&[("BGSUBS_REQUEST_TIMEOUT_SECS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_query_variations_bounded() {
        for value in [0, 4] {
            let config = SubsConfig {
                max_query_variations: value,
                ..SubsConfig::default()
            };
            assert!(matches!(config.validate(), Err(SubsError::Config(_))), "{value}");
        }

        let result = load_from(None, env(&[("BGSUBS_MAX_QUERY_VARIATIONS", "5")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = default_path() {
            assert!(path.ends_with("bgsubs/config.toml"));
        }
    }
}
