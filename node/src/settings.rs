//! Node configuration: optional TOML file, then `EUREKA_*` environment
//! variables, then command-line overrides.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use eureka_ledger::LedgerConfig;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config/eureka.toml";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // Storage
    pub data_dir: PathBuf,

    // Logging
    pub log_level: String,
    pub log_format: String,

    // Observability
    pub prometheus_enabled: bool,

    pub ledger: LedgerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("eureka"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            prometheus_enabled: false,
            ledger: LedgerConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path_override: Option<&str>) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path)
            }
            None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|path| path.exists()),
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(
            Environment::with_prefix("EUREKA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("failed to read configuration")?;
        config
            .try_deserialize()
            .context("failed to parse configuration")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!("log_format must be \"pretty\" or \"json\", got {}", self.log_format);
        }
        self.ledger
            .validate()
            .context("invalid ledger configuration")?;
        Ok(())
    }
}

pub fn apply_overrides(matches: &clap::ArgMatches, config: &mut AppConfig) {
    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        config.data_dir = PathBuf::from(data_dir);
    }

    if let Some(log_level) = matches.get_one::<String>("log-level") {
        config.log_level = log_level.clone();
    }

    if let Some(log_format) = matches.get_one::<String>("log-format") {
        config.log_format = log_format.clone();
    }

    if matches.get_flag("metrics") {
        config.prometheus_enabled = true;
    }
}
