//! Pipeline configuration and config file resolution

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{QuakemapError, Result},
    playback::PlaybackOptions,
};

pub const CONFIG_ENV_VAR: &str = "QUAKEMAP_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Records below this magnitude are dropped.
    pub min_magnitude: f64,
    /// Records before this year are dropped.
    pub min_year: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_magnitude: 6.5,
            min_year: 1975,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Display slot of the first kept record.
    pub start_date: NaiveDate,
    /// Days between consecutive display slots.
    pub slot_days: u32,
    /// Offset added to the composed event time.
    pub utc_offset_hours: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            slot_days: 2,
            utc_offset_hours: 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filter: FilterConfig,
    pub timeline: TimelineConfig,
    pub playback: PlaybackOptions,
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config found by [`resolve_config_path`], or fall back to defaults.
    pub async fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => Self::load(&path).await,
            None => {
                debug!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeline.slot_days == 0 {
            return Err(QuakemapError::Config(
                "timeline.slot_days must be at least 1".to_string(),
            ));
        }
        if !self.filter.min_magnitude.is_finite() {
            return Err(QuakemapError::Config(
                "filter.min_magnitude must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Config file resolution, highest priority first:
/// 1. Command-line argument
/// 2. `QUAKEMAP_CONFIG` environment variable
/// 3. `<config_dir>/quakemap/config.toml`, if it exists
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|path| path.exists())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quakemap").join("config.toml"))
}
