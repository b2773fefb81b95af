use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeFormat {
    #[default]
    HoursMinutes, // "3h 15m"
    Decimal, // "3.25h"
}

/// Direction policy for the external calendar connection. The core only
/// performs the import side; export is an outbound collaborator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SyncPolicy {
    #[default]
    ImportOnly,
    ExportOnly,
    Bidirectional,
}

impl SyncPolicy {
    pub fn imports(&self) -> bool {
        matches!(self, SyncPolicy::ImportOnly | SyncPolicy::Bidirectional)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store_domain: String,
    pub email: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub time_format: TimeFormat,
    #[serde(default)]
    pub sync_policy: SyncPolicy,
    /// Nominal working hours per day used as the utilization denominator.
    #[serde(default = "default_capacity_hours")]
    pub capacity_hours_per_day: f64,
    #[serde(default = "default_grid_start_hour")]
    pub grid_start_hour: u8,
    #[serde(default = "default_grid_end_hour")]
    pub grid_end_hour: u8,
    /// Entries listed per month cell before the "+K more" indicator.
    #[serde(default = "default_month_cell_max")]
    pub month_cell_max_entries: usize,
}

fn default_capacity_hours() -> f64 {
    8.0
}

fn default_grid_start_hour() -> u8 {
    7 // 7am
}

fn default_grid_end_hour() -> u8 {
    19 // 7pm
}

fn default_month_cell_max() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_domain: String::new(),
            email: String::new(),
            api_token: None,
            time_format: TimeFormat::HoursMinutes,
            sync_policy: SyncPolicy::ImportOnly,
            capacity_hours_per_day: 8.0,
            grid_start_hour: 7,
            grid_end_hour: 19,
            month_cell_max_entries: 3,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.store_domain.is_empty() && !self.email.is_empty() && self.api_token.is_some()
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "crewcal", "crewcal")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    pub fn base_url(&self) -> String {
        // Clean up the domain - remove protocol, trailing slashes, paths
        let domain = self
            .store_domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .split('/')
            .next()
            .unwrap_or(&self.store_domain);

        format!("https://{}/api/v1", domain)
    }

    /// Visible hour range of the day/week grid, clamped to a sane ordering.
    pub fn visible_hours(&self) -> (u8, u8) {
        if self.grid_end_hour > self.grid_start_hour {
            (self.grid_start_hour, self.grid_end_hour.min(24))
        } else {
            (default_grid_start_hour(), default_grid_end_hour())
        }
    }
}
