use crate::error::{config_error, env_error, BotResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Default notification window in hours
pub const DEFAULT_NOTIFICATION_WINDOW_HOURS: f64 = 12.0;
/// Default interval between calendar checks in seconds
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
/// Default age after which a pending response is no longer correlated
pub const DEFAULT_PENDING_EXPIRY_HOURS: i64 = 168;
/// Optional file overriding the tunable settings
pub const CONFIG_FILE: &str = "config/rsvpbot.toml";

/// Main configuration structure for the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Calendar feed URL (`webcal://` or `https://`)
    pub calendar_url: String,
    /// Operator address that receives confirmations and error reports
    pub admin_address: String,
    /// Send reminders for every future event instead of waiting for the window
    pub send_immediately: bool,
    /// Hours before an event during which a reminder is sent
    pub notification_window_hours: f64,
    /// Seconds between calendar checks
    pub check_interval_secs: u64,
    /// Hours a pending response stays correlatable
    pub pending_expiry_hours: i64,
    /// Directory holding the JSON state files
    pub state_dir: PathBuf,
    /// Locale for outgoing message templates
    pub bot_locale: String,
}

/// Tunables that may be set in the config file
#[derive(Debug, Default, Deserialize)]
pub struct FileOverrides {
    pub send_immediately: Option<bool>,
    pub notification_window_hours: Option<f64>,
    pub check_interval_secs: Option<u64>,
    pub pending_expiry_hours: Option<i64>,
    pub state_dir: Option<PathBuf>,
    pub bot_locale: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let calendar_url = env::var("CALENDAR_URL").map_err(|_| env_error("CALENDAR_URL"))?;
        let admin_address = env::var("ADMIN_ADDRESS").map_err(|_| env_error("ADMIN_ADDRESS"))?;

        let send_immediately = match env::var("SEND_IMMEDIATELY") {
            Ok(value) => parse_bool(&value)
                .ok_or_else(|| config_error("Invalid SEND_IMMEDIATELY value"))?,
            Err(_) => false,
        };

        let notification_window_hours = match env::var("NOTIFICATION_WINDOW_HOURS") {
            Ok(value) => value
                .parse::<f64>()
                .map_err(|_| env_error("Invalid NOTIFICATION_WINDOW_HOURS format"))?,
            Err(_) => DEFAULT_NOTIFICATION_WINDOW_HOURS,
        };

        let check_interval_secs = match env::var("CHECK_INTERVAL_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| env_error("Invalid CHECK_INTERVAL_SECS format"))?,
            Err(_) => DEFAULT_CHECK_INTERVAL_SECS,
        };

        let pending_expiry_hours = match env::var("PENDING_EXPIRY_HOURS") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| env_error("Invalid PENDING_EXPIRY_HOURS format"))?,
            Err(_) => DEFAULT_PENDING_EXPIRY_HOURS,
        };

        let state_dir = env::var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let bot_locale = env::var("BOT_LOCALE").unwrap_or_else(|_| String::from("en"));

        let mut config = Config {
            calendar_url,
            admin_address,
            send_immediately,
            notification_window_hours,
            check_interval_secs,
            pending_expiry_hours,
            state_dir,
            bot_locale,
        };

        // File values take precedence over the environment
        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            let overrides: FileOverrides = toml::from_str(&content)?;
            config.apply(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge values from the config file
    pub fn apply(&mut self, overrides: FileOverrides) {
        if let Some(value) = overrides.send_immediately {
            self.send_immediately = value;
        }
        if let Some(value) = overrides.notification_window_hours {
            self.notification_window_hours = value;
        }
        if let Some(value) = overrides.check_interval_secs {
            self.check_interval_secs = value;
        }
        if let Some(value) = overrides.pending_expiry_hours {
            self.pending_expiry_hours = value;
        }
        if let Some(value) = overrides.state_dir {
            self.state_dir = value;
        }
        if let Some(value) = overrides.bot_locale {
            self.bot_locale = value;
        }
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> BotResult<()> {
        let normalized = crate::components::calendar_feed::normalize_feed_url(&self.calendar_url);
        Url::parse(&normalized)
            .map_err(|e| config_error(&format!("Invalid CALENDAR_URL: {}", e)))?;

        if self.admin_address.trim().is_empty() {
            return Err(config_error("ADMIN_ADDRESS must not be empty"));
        }
        if !self.notification_window_hours.is_finite() || self.notification_window_hours < 0.0 {
            return Err(config_error("Notification window must be a non-negative number of hours"));
        }
        if self.check_interval_secs == 0 {
            return Err(config_error("Check interval must be greater than zero"));
        }
        if self.pending_expiry_hours <= 0 {
            return Err(config_error("Pending expiry must be greater than zero"));
        }
        Ok(())
    }

    /// Human readable description of the sending mode
    pub fn mode_description(&self) -> String {
        if self.send_immediately {
            "Immediate sending".to_string()
        } else {
            format!("{}-hour window", self.notification_window_hours)
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
