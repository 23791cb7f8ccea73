// SPDX-FileCopyrightText: 2025 sqlgrid contributors
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use sqlgrid_db::ScanOrder;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result, SqlgridError};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SQLGRID_CONFIG";
/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "sqlgrid.toml";

/// Row order of table scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowOrder {
    /// Whatever order the engine returns
    #[default]
    Natural,
    /// Sorted by the primary key when the table has one
    PrimaryKey,
}

impl From<RowOrder> for ScanOrder {
    fn from(order: RowOrder) -> Self {
        match order {
            RowOrder::Natural => ScanOrder::Natural,
            RowOrder::PrimaryKey => ScanOrder::PrimaryKey,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the session cache
    pub cache_dir: PathBuf,

    /// Directory exports are written to when no output path is given
    pub output_dir: PathBuf,

    /// File name of the saved database snapshot
    pub snapshot_file_name: String,

    /// File name of the all-tables archive
    pub archive_file_name: String,

    pub scan_order: RowOrder,

    /// Log level
    pub log_level: String,

    /// Persist the session between runs
    pub enable_cache: bool,
}

fn default_cache_dir() -> PathBuf {
    let non_empty = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty());
    if let Some(xdg) = non_empty("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("sqlgrid")
    } else if let Some(home) = non_empty("HOME") {
        PathBuf::from(home).join(".cache").join("sqlgrid")
    } else {
        PathBuf::from(".sqlgrid-cache")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            output_dir: PathBuf::from("."),
            snapshot_file_name: sqlgrid_export::SNAPSHOT_FILE_NAME.to_string(),
            archive_file_name: sqlgrid_export::ARCHIVE_FILE_NAME.to_string(),
            scan_order: RowOrder::default(),
            log_level: "info".to_string(),
            enable_cache: true,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .io_context(|| format!("Failed to read config file at {}", path.display()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("snapshot_file_name", &self.snapshot_file_name),
            ("archive_file_name", &self.archive_file_name),
        ] {
            if name.trim().is_empty() {
                return Err(SqlgridError::config(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn scan_order(&self) -> ScanOrder {
        self.scan_order.into()
    }
}

/// Load the configuration.
///
/// An explicit path wins, then `$SQLGRID_CONFIG`, then `sqlgrid.toml` in the
/// working directory. Without any of them the defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::from_file(path);
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => Config::from_file(Path::new(&path)),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_file(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => Ok(Config::default()),
    }
}
