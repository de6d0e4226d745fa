// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

fn default_target_phrase() -> String {
    "você concordou em participar do evento".to_string()
}

fn default_duration_minutes() -> i64 {
    crate::model::candidate::DEFAULT_DURATION_MINUTES
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// IANA zone used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Only notifications whose card contains this phrase are kept.
    #[serde(default = "default_target_phrase")]
    pub target_phrase: String,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
    /// Where `events.json` / `events.py` are written. Defaults to the data dir.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            target_phrase: default_target_phrase(),
            default_duration_minutes: default_duration_minutes(),
            output_dir: None,
            calendar_id: default_calendar_id(),
        }
    }
}

impl Config {
    /// Loads `config.toml`. A missing file gives the defaults; a broken one is an error.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// `TZ`, when set, replaces the configured zone.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(tz) = std::env::var("TZ")
            && !tz.trim().is_empty()
        {
            self.timezone = tz.trim().to_string();
        }
        self
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn tz(&self) -> Option<Tz> {
        self.timezone.parse::<Tz>().ok()
    }

    /// Calendar date of `now` in the configured zone, falling back to the
    /// host's local zone when the id is unknown.
    pub fn reference_date(&self, now: DateTime<Utc>) -> NaiveDate {
        match self.tz() {
            Some(tz) => now.with_timezone(&tz).date_naive(),
            None => {
                log::warn!(
                    "Unknown timezone '{}', using the local zone for relative dates",
                    self.timezone
                );
                now.with_timezone(&Local).date_naive()
            }
        }
    }

    /// Paths of the canonical snapshot and its companion module.
    pub fn output_paths(&self, ctx: &dyn AppContext) -> Result<(PathBuf, PathBuf)> {
        match &self.output_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok((
                    dir.join(crate::context::EVENTS_JSON_FILENAME),
                    dir.join(crate::context::EVENTS_MODULE_FILENAME),
                ))
            }
            None => Ok((ctx.get_events_json_path()?, ctx.get_events_module_path()?)),
        }
    }
}
