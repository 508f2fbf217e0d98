//! Configuration loading.
//!
//! Reads `config.toml` from the platform config directory. A missing
//! file is not an error: every key has a default or can be supplied on
//! the command line. Malformed TOML is an error with context.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::UtcOffset;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "rne-check";

/// Offset the original surface localized to (es-CO, UTC-05:00).
const DEFAULT_UTC_OFFSET: UtcOffset = time::macros::offset!(-5);

const OFFSET_FORMAT: &[FormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: Option<PathBuf>,
    /// Base URL of the registry service. May instead come from the
    /// command line.
    pub service_url: Option<String>,
    /// Fixed regional offset for timestamp localization.
    pub utc_offset: UtcOffset,
    /// Default region for phone input normalization (e.g. "CO").
    pub phone_region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            service_url: None,
            utc_offset: DEFAULT_UTC_OFFSET,
            phone_region: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    service_url: Option<String>,
    utc_offset: Option<String>,
    phone_region: Option<String>,
}

/// Load configuration from the default platform location.
pub fn load() -> Result<Config> {
    let Some(base) = BaseDirs::new() else {
        return Ok(Config::default());
    };
    let path = base.config_dir().join(APP_NAME).join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    let utc_offset = match &file.utc_offset {
        Some(spec) => UtcOffset::parse(spec, OFFSET_FORMAT)
            .with_context(|| format!("invalid utc_offset in config: {}", spec))?,
        None => DEFAULT_UTC_OFFSET,
    };

    Ok(Config {
        config_path: Some(path.to_path_buf()),
        service_url: file.service_url,
        utc_offset,
        phone_region: file.phone_region,
    })
}
