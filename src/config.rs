//! Environment-based configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::service::raid_protection_service::RaidConfig;

/// Feature toggles for optional subsystems.
#[derive(Clone, Debug)]
pub struct Features {
    pub raid_protection: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub admin_id: String,
    pub logs_path: PathBuf,
    /// Channel that receives raid alerts. Alerts are only logged when unset.
    pub alert_channel_id: Option<u64>,
    pub raid: RaidConfig,
    pub features: Features,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, AppError> {
        let raid = RaidConfig {
            join_count_threshold: parse_min_1("RAID_JOIN_THRESHOLD", 10)?,
            timeframe: Duration::from_secs(parse_min_1("RAID_TIMEFRAME_SECS", 60)? as u64),
            sweep_interval: Duration::from_secs(
                parse_min_1("RAID_SWEEP_INTERVAL_SECS", 60)? as u64,
            ),
        };

        Ok(Self {
            discord_token: require("DISCORD_TOKEN")?,
            admin_id: require("ADMIN_ID")?,
            logs_path: PathBuf::from(var_or("LOGS_PATH", "logs")),
            alert_channel_id: parse_optional("ALERT_CHANNEL_ID")?,
            raid,
            features: Features {
                raid_protection: var_or("FEATURE_RAID_PROTECTION", "true") == "true",
            },
        })
    }
}

fn require(key: &str) -> Result<String, AppError> {
    std::env::var(key).map_err(|_| AppError::MissingConfig {
        key: key.to_string(),
    })
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_min_1(key: &str, default: usize) -> Result<usize, AppError> {
    let value = match std::env::var(key) {
        Ok(raw) => raw.parse::<usize>().map_err(|e| AppError::InvalidConfig {
            key: key.to_string(),
            reason: e.to_string(),
        })?,
        Err(_) => default,
    };

    if value < 1 {
        return Err(AppError::InvalidConfig {
            key: key.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_optional(key: &str) -> Result<Option<u64>, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|e| AppError::InvalidConfig {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
