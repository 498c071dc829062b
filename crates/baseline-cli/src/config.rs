//! Configuration file management for baseline.
//!
//! Provides a TOML-based config file at `~/.config/baseline/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use baseline_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the baseline config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/baseline` or
/// `~/.config/baseline`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("baseline");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("baseline")
}

/// Return the path to the baseline config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

// -----------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------

/// Fully resolved configuration for a CLI invocation.
#[derive(Debug, Clone)]
pub struct BaselineConfig {
    pub db_config: DbConfig,
}

impl BaselineConfig {
    /// Resolve the database URL: CLI flag > `BASELINE_DATABASE_URL` env
    /// var > config file > compile-time default.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        if let Some(url) = cli_db_url {
            return Ok(Self {
                db_config: DbConfig::new(url),
            });
        }
        if let Ok(url) = std::env::var("BASELINE_DATABASE_URL") {
            return Ok(Self {
                db_config: DbConfig::new(url),
            });
        }
        if let Ok(file) = load_config() {
            return Ok(Self {
                db_config: DbConfig::new(file.database.url),
            });
        }
        Ok(Self {
            db_config: DbConfig::new(DbConfig::DEFAULT_URL),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_roundtrip() {
        let file = ConfigFile {
            database: DatabaseSection {
                url: "postgresql://localhost:5432/baseline".to_owned(),
            },
        };
        let toml_str = toml::to_string_pretty(&file).expect("serialize");
        let back: ConfigFile = toml::from_str(&toml_str).expect("parse");
        assert_eq!(back.database.url, file.database.url);
    }

    #[test]
    fn cli_flag_wins_resolution() {
        let resolved =
            BaselineConfig::resolve(Some("postgresql://elsewhere:5432/other")).expect("resolve");
        assert_eq!(
            resolved.db_config.database_url,
            "postgresql://elsewhere:5432/other"
        );
    }
}
