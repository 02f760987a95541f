// src/core/config_manager.rs
//! Configuration loading: optional `config.yaml` sections per environment,
//! then environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MATCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub database_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub port: u16,
    pub jwt_secret: String,
    pub match_concurrency: usize,
}

/// One environment section of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentSection {
    pub database_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub jwt_secret: Option<String>,
    pub match_concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl ConfigManager {
    /// Load configuration from `config.yaml` (if present) and the environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = PathBuf::from("config.yaml");
        let section = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;
            Self::section_from_yaml(&content, &environment)?
        } else {
            EnvironmentSection::default()
        };

        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::from_parts(environment, section, &base_dir, |key| std::env::var(key).ok())
    }

    fn get_environment() -> String {
        std::env::var("STAFFHUB_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn section_from_yaml(content: &str, environment: &str) -> Result<EnvironmentSection> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Merge file values, environment overrides and defaults.
    fn from_parts<F>(
        environment: String,
        section: EnvironmentSection,
        base_dir: &Path,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = env("STAFFHUB_DATABASE_PATH")
            .map(PathBuf::from)
            .or(section.database_path)
            .unwrap_or_else(|| PathBuf::from("data/staffhub.db"));

        let log_file = env("STAFFHUB_LOG_FILE").map(PathBuf::from).or(section.log_file);

        let port = match env("ROCKET_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?,
            None => section.port.unwrap_or(DEFAULT_PORT),
        };

        let match_concurrency = match env("STAFFHUB_MATCH_CONCURRENCY") {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                anyhow::anyhow!("STAFFHUB_MATCH_CONCURRENCY must be a positive integer")
            })?,
            None => section
                .match_concurrency
                .unwrap_or(DEFAULT_MATCH_CONCURRENCY),
        }
        .max(1);

        let jwt_secret = match env("STAFFHUB_JWT_SECRET").or(section.jwt_secret) {
            Some(secret) => secret,
            None if environment == "production" => {
                anyhow::bail!("STAFFHUB_JWT_SECRET must be set in production")
            }
            None => "local-development-secret".to_string(),
        };

        Ok(Self {
            environment,
            database_path: resolve_path(base_dir, database_path),
            log_file: log_file.map(|path| resolve_path(base_dir, path)),
            port,
            jwt_secret,
            match_concurrency,
        })
    }
}

fn resolve_path(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = ConfigManager::from_parts(
            "local".into(),
            EnvironmentSection::default(),
            Path::new("/srv/app"),
            env_from(&[]),
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/app/data/staffhub.db"));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.match_concurrency, DEFAULT_MATCH_CONCURRENCY);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn env_overrides_file_section() {
        let section = ConfigManager::section_from_yaml(
            "local:\n  database_path: local.db\n  port: 9100\nproduction:\n  database_path: /var/lib/prod.db\n",
            "local",
        )
        .unwrap();
        assert_eq!(section.port, Some(9100));

        let config = ConfigManager::from_parts(
            "local".into(),
            section,
            Path::new("/srv/app"),
            env_from(&[("ROCKET_PORT", "9200"), ("STAFFHUB_MATCH_CONCURRENCY", "0")]),
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/app/local.db"));
        assert_eq!(config.port, 9200);
        assert_eq!(config.match_concurrency, 1);
    }

    #[test]
    fn production_requires_secret() {
        let result = ConfigManager::from_parts(
            "production".into(),
            EnvironmentSection::default(),
            Path::new("/app"),
            env_from(&[]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn invalid_port_is_reported() {
        let result = ConfigManager::from_parts(
            "local".into(),
            EnvironmentSection::default(),
            Path::new("/app"),
            env_from(&[("ROCKET_PORT", "not-a-port")]),
        );
        assert!(result.is_err());
    }
}
