use crate::errors::{AppError, AppResult};
use crate::period::DAY_ROLLOVER_HOUR;
use chrono::{DateTime, FixedOffset, Local};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_VAULT_ROOT: &str = "PERIODIC_NOTES_VAULT_ROOT";
pub const ENV_TIME_ZONE: &str = "PERIODIC_NOTES_TIME_ZONE";
pub const ENV_LOG_DIR: &str = "PERIODIC_NOTES_LOG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentZone {
    Local,
    Named(Tz),
    Fixed(FixedOffset),
}

impl DeploymentZone {
    pub fn localize(&self, at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Self::Local => at.with_timezone(&Local).fixed_offset(),
            Self::Named(zone) => at.with_timezone(zone).fixed_offset(),
            Self::Fixed(offset) => at.with_timezone(offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LinkRewrite {
    pub from: String,
    pub to: String,
}

impl LinkRewrite {
    pub fn apply(&self, url: &str) -> String {
        if self.from.is_empty() {
            return url.to_string();
        }
        url.replace(self.from.as_str(), self.to.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct EngineConfig {
    pub vault_root: Option<PathBuf>,
    #[serde(alias = "utc_offset")]
    pub time_zone: String,
    pub rollover_hour: u32,
    pub daily_folder_suffix: String,
    pub daily_action_folder_suffix: String,
    pub daily_file_prefix: String,
    pub cycles_folder_suffix: String,
    pub weekly_cycles_folder: String,
    pub template_boundary: String,
    pub daily_review_marker: String,
    pub issue_link_rewrite: Option<LinkRewrite>,
    pub log_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vault_root: None,
            time_zone: "local".to_string(),
            rollover_hour: DAY_ROLLOVER_HOUR,
            daily_folder_suffix: "_Daily".to_string(),
            daily_action_folder_suffix: "_Daily-Action".to_string(),
            daily_file_prefix: "DA ".to_string(),
            cycles_folder_suffix: "_Cycles".to_string(),
            weekly_cycles_folder: "_Weekly-Cycles".to_string(),
            template_boundary: "Vision Objective 1:".to_string(),
            daily_review_marker: "Daily Review:".to_string(),
            issue_link_rewrite: Some(LinkRewrite {
                from: "https://linear.app/".to_string(),
                to: "linear://".to_string(),
            }),
            log_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|error| {
                    AppError::Configuration(format!("Failed to read config {}: {}", path.to_string_lossy(), error))
                })?;
                if raw.trim().is_empty() {
                    Self::default()
                } else {
                    serde_yaml::from_str(&raw)?
                }
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        if let Some(root) = read(ENV_VAULT_ROOT) {
            self.vault_root = Some(PathBuf::from(root));
        }
        if let Some(zone) = read(ENV_TIME_ZONE) {
            self.time_zone = zone;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.vault_root()?;
        if self.rollover_hour >= 24 {
            return Err(AppError::Configuration(format!(
                "rollover_hour must be between 0 and 23 (got {})",
                self.rollover_hour
            )));
        }
        self.zone()?;
        for (name, value) in [
            ("daily_folder_suffix", &self.daily_folder_suffix),
            ("daily_action_folder_suffix", &self.daily_action_folder_suffix),
            ("cycles_folder_suffix", &self.cycles_folder_suffix),
            ("weekly_cycles_folder", &self.weekly_cycles_folder),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("{} cannot be empty", name)));
            }
        }
        Ok(())
    }

    pub fn vault_root(&self) -> AppResult<&Path> {
        match self.vault_root.as_deref() {
            Some(root) if !root.as_os_str().is_empty() => Ok(root),
            _ => Err(AppError::Configuration(format!(
                "vault_root is not set (config file or {})",
                ENV_VAULT_ROOT
            ))),
        }
    }

    pub fn zone(&self) -> AppResult<DeploymentZone> {
        parse_time_zone(&self.time_zone)
    }
}

pub fn parse_time_zone(raw: &str) -> AppResult<DeploymentZone> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("local") {
        return Ok(DeploymentZone::Local);
    }
    if value.starts_with(['+', '-']) {
        return parse_fixed_offset(value).map(DeploymentZone::Fixed);
    }
    if value == "Z" {
        return parse_fixed_offset("+00:00").map(DeploymentZone::Fixed);
    }
    value
        .parse::<Tz>()
        .or_else(|_| value.to_ascii_uppercase().parse::<Tz>())
        .map(DeploymentZone::Named)
        .map_err(|_| {
            AppError::Configuration(format!(
                "Invalid time_zone '{}' (expected local, an IANA zone name or ±HH:MM)",
                raw
            ))
        })
}

fn parse_fixed_offset(value: &str) -> AppResult<FixedOffset> {
    let invalid = || AppError::Configuration(format!("Invalid time_zone offset '{}' (expected ±HH:MM)", value));
    let (sign, rest) = match value.chars().next() {
        Some('+') => (1, &value[1..]),
        Some('-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
