//! Persistent settings for the command line tool.
//!
//! Settings live in `<config dir>/xform-eval/settings.json`, or wherever the
//! `XFORM_EVAL_SETTINGS` environment variable points. Missing fields take
//! their default values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::TimeCode;
use crate::util::{Error, Result};

/// Environment variable overriding the settings file location.
pub const SETTINGS_ENV: &str = "XFORM_EVAL_SETTINGS";

/// Settings that persist between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Evaluation time; `None` means the default time code.
    pub time: Option<f64>,
    /// Decimal places when printing positions.
    pub precision: usize,
    /// Print JSON instead of text.
    pub json: bool,
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time: None,
            precision: 3,
            json: false,
            log_filter: "warn".to_string(),
        }
    }
}

const MAX_PRECISION: usize = 17;

impl Settings {
    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(p));
        }
        dirs::config_dir().map(|mut p| {
            p.push("xform-eval");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from [`Settings::path`]. A missing file gives the
    /// defaults; an unreadable or invalid one is an error so the caller can
    /// report it once logging is up.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.validate();
        Ok(settings)
    }

    /// Save settings to [`Settings::path`] and return where they went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()
            .ok_or_else(|| Error::Io(std::io::Error::other("no config directory")))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&mut self) {
        if self.precision > MAX_PRECISION {
            self.precision = MAX_PRECISION;
        }
        if self.time.is_some_and(|t| !t.is_finite()) {
            self.time = None;
        }
    }

    /// Evaluation time as a time code.
    pub fn time_code(&self) -> TimeCode {
        self.time.map_or(TimeCode::Default, TimeCode::At)
    }
}
