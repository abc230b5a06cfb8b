//! User settings: default week start and reference timezone
//!
//! Stored as JSON at `~/.timesheet-rollup/config.json`. A missing file
//! means defaults (Monday week start, UTC).

use std::fs;
use std::path::PathBuf;

use chrono::FixedOffset;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::{Result, RollupError, WeekStart};

/// Largest accepted UTC offset magnitude (UTC-14:00 .. UTC+14:00)
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub week_starts_on: WeekStart,
    /// Offset of the reference timezone from UTC, in minutes
    pub utc_offset_minutes: i32,
}

impl Settings {
    /// Reference timezone for turning timestamps into calendar dates
    pub fn offset(&self) -> Result<FixedOffset> {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    if minutes.abs() > MAX_OFFSET_MINUTES {
        return Err(RollupError::Config(format!(
            "utc offset {} minutes is out of range (±{})",
            minutes, MAX_OFFSET_MINUTES
        )));
    }
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| RollupError::Config(format!("invalid utc offset {} minutes", minutes)))
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| RollupError::Config("Cannot determine home directory".into()))?;
        let path = base_dirs
            .home_dir()
            .join(".timesheet-rollup")
            .join("config.json");
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            RollupError::Config(format!("{}: {}", self.path.display(), e))
        })?;
        // Reject a bad offset at load time
        settings.offset()?;
        Ok(settings)
    }
}
