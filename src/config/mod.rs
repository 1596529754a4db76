mod file_config;

pub use file_config::FileConfig;

use crate::catalog_store::SortOrder;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Verbosity of the log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    pub default_sort_order: SortOrder,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow::anyhow!("db_path must be specified via --db or in config file"))?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        // A bare file name lives in the working directory.
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let log_level = file
            .log_level
            .and_then(|s| parse_log_level(&s))
            .unwrap_or(cli.log_level);

        let default_sort_order = file
            .default_sort_order
            .and_then(|s| s.parse::<SortOrder>().ok())
            .unwrap_or_default();

        Ok(Self {
            db_path,
            log_level,
            default_sort_order,
        })
    }
}

/// Parses a log level name, ignoring case.
/// Uses clap's ValueEnum trait for parsing.
fn parse_log_level(s: &str) -> Option<LogLevel> {
    LogLevel::from_str(s, true).ok()
}
