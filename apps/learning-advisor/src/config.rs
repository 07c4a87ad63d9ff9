use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "ADVISOR_API_URL";
pub const LOG_ENV: &str = "ADVISOR_LOG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

/// How much of a generated report to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_plan_weeks")]
    pub plan_weeks: usize,
    #[serde(default = "default_plan_activities")]
    pub plan_activities: usize,
    #[serde(default = "default_resources")]
    pub resources: usize,
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            plan_weeks: default_plan_weeks(),
            plan_activities: default_plan_activities(),
            resources: default_resources(),
            health_interval_secs: default_health_interval(),
        }
    }
}

fn default_plan_weeks() -> usize {
    4
}

fn default_plan_activities() -> usize {
    3
}

fn default_resources() -> usize {
    4
}

fn default_health_interval() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `info` or `advisor_api=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Read the config file (defaults when absent) and apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(LOG_ENV).ok(),
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Non-empty values replace the configured ones.
    pub fn apply_overrides(&mut self, base_url: Option<String>, log: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(level) = log.filter(|l| !l.trim().is_empty()) {
            self.log.level = level.trim().to_string();
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::dirs().map(|p| p.config_dir().join("config.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Self::dirs().map(|p| p.data_dir().join("learning-advisor.log"))
    }

    fn dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "learning-advisor")
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.display.plan_weeks, 4);
        assert_eq!(config.display.resources, 4);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nplan_weeks = 6\n\n[log]\nlevel = \"debug\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.display.plan_weeks, 6);
        assert_eq!(config.display.plan_activities, 3);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://advisor:8080/".to_string()), Some("  ".to_string()));
        assert_eq!(config.api.base_url, "http://advisor:8080/");
        assert_eq!(config.log.level, "info");

        config.apply_overrides(None, Some("warn".to_string()));
        assert_eq!(config.log.level, "warn");
    }
}
