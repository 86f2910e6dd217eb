//! Application configuration. Bot token, administrators, paths, export schedule.
//!
//! Sources, highest priority first: `STOREBOT_*` environment variables, the optional file
//! named by `STOREBOT_CONFIG`, then plain fallbacks (`TELEGRAM_BOT_TOKEN`, `BOT_TOKEN`,
//! `ADMIN_IDS`, `TELEGRAM_ADMIN_ID`, `EXCHANGE_RATE`). `.env` is loaded first.
//!
//! Bad values never stop the bot: getters log a warning and use the default.

use crate::domain::{AdministratorSet, Rate};
use chrono::{FixedOffset, NaiveTime, Offset, Utc, Weekday};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_EXPORT_DIR: &str = "./exports";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 50;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;
pub const DEFAULT_EXPORT_UTC_OFFSET_HOURS: i32 = 3;
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Bot API token from @BotFather. Required.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Comma-separated administrator user ids.
    #[serde(default)]
    pub admin_ids: Option<String>,

    #[serde(default)]
    pub data_dir: Option<String>,

    #[serde(default)]
    pub export_dir: Option<String>,

    /// Rate for platforms missing from the data file, e.g. `10000` or `99.50`.
    #[serde(default)]
    pub default_rate: Option<String>,

    /// Long-poll timeout for getUpdates.
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,

    /// Sessions idle longer than this start over from the menu.
    #[serde(default)]
    pub session_idle_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Weekly export
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub export_utc_offset_hours: Option<i32>,

    /// `mon` .. `sun`
    #[serde(default)]
    pub export_weekday: Option<String>,

    #[serde(default)]
    pub export_hour: Option<u32>,

    #[serde(default)]
    pub export_minute: Option<u32>,

    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("STOREBOT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("STOREBOT"));
        let cfg: Self = c.build()?.try_deserialize()?;
        Ok(cfg.with_env_fallbacks())
    }

    /// Like [`AppConfig::load`], but an unreadable source only costs its typed settings.
    /// The token and admin list are still read from the environment.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "configuration unreadable, using defaults");
            Self::default().with_env_fallbacks()
        })
    }

    /// Plain names are read directly so an existing .env keeps working.
    fn with_env_fallbacks(mut self) -> Self {
        if self.bot_token.is_none() {
            self.bot_token = first_env(&["STOREBOT_BOT_TOKEN", "TELEGRAM_BOT_TOKEN", "BOT_TOKEN"]);
        }
        if self.admin_ids.is_none() {
            self.admin_ids = first_env(&["STOREBOT_ADMIN_IDS", "ADMIN_IDS", "TELEGRAM_ADMIN_ID"]);
        }
        if self.default_rate.is_none() {
            self.default_rate = first_env(&["STOREBOT_DEFAULT_RATE", "EXCHANGE_RATE"]);
        }
        self
    }

    /// Non-empty bot token, if configured.
    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn admin_set(&self) -> AdministratorSet {
        self.admin_ids
            .as_deref()
            .map(parse_admin_ids)
            .unwrap_or_default()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR))
    }

    pub fn export_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.export_dir.as_deref().unwrap_or(DEFAULT_EXPORT_DIR))
    }

    /// Returns the configured default rate. Falls back to 10000 if unset or invalid.
    pub fn default_rate_or_default(&self) -> Rate {
        let fallback = Rate::DEFAULT;
        match self.default_rate.as_deref().map(str::parse::<Rate>) {
            Some(Ok(rate)) => rate,
            Some(Err(e)) => {
                warn!(error = %e, "invalid default rate, using {}", fallback);
                fallback
            }
            None => fallback,
        }
    }

    pub fn poll_timeout_secs_or_default(&self) -> u64 {
        self.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS)
    }

    pub fn session_idle_secs_or_default(&self) -> u64 {
        self.session_idle_secs.unwrap_or(DEFAULT_SESSION_IDLE_SECS)
    }

    pub fn api_base_url_or_default(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// UTC offset for export timestamps and file names, default +03:00.
    pub fn export_offset(&self) -> FixedOffset {
        let hours = self
            .export_utc_offset_hours
            .unwrap_or(DEFAULT_EXPORT_UTC_OFFSET_HOURS);
        match hours.checked_mul(3600).and_then(FixedOffset::east_opt) {
            Some(offset) => offset,
            None => {
                warn!(hours, "invalid export UTC offset, using default");
                default_export_offset()
            }
        }
    }

    pub fn export_weekday(&self) -> Weekday {
        let Some(raw) = self.export_weekday.as_deref() else {
            return Weekday::Mon;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!(weekday = raw, "invalid export weekday, using Monday");
            Weekday::Mon
        })
    }

    /// Default 09:00.
    pub fn export_time(&self) -> NaiveTime {
        let default = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let hour = self.export_hour.unwrap_or(9);
        let minute = self.export_minute.unwrap_or(0);
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_else(|| {
            warn!(hour, minute, "invalid export time, using 09:00");
            default
        })
    }
}

fn default_export_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_EXPORT_UTC_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// Parse `"123, 456"`. Malformed entries are skipped with a warning.
pub fn parse_admin_ids(raw: &str) -> AdministratorSet {
    let ids = raw
        .split([',', ';', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(entry = s, "skipping malformed admin id");
                None
            }
        });
    AdministratorSet::new(ids)
}
