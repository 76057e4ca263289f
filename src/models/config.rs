//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Item;

/// Root application configuration.
///
/// Loaded from a JSON file; its absence is fatal at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Items to watch (exactly one is monitored per process)
    pub items: Vec<Item>,

    /// SMTP credentials and addresses for notifications
    pub email: EmailConfig,

    /// Check scheduling
    pub schedule: ScheduleConfig,

    /// HTTP and file-layout settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Availability detection heuristics
    #[serde(default)]
    pub detector: DetectorConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file is a configuration error, not an I/O error, so the
    /// caller can print an actionable diagnostic and exit.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::config(format!(
                    "{} not found. Create it before starting the monitor.",
                    path.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(AppError::validation("No items defined"));
        }
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(AppError::validation("Item name is empty"));
            }
            url::Url::parse(&item.url)
                .map_err(|e| AppError::validation(format!("Item URL '{}': {e}", item.url)))?;
        }
        if self.schedule.interval_hours == 0 {
            return Err(AppError::validation("schedule.interval_hours must be > 0"));
        }
        if self.email.sender_email.trim().is_empty()
            || self.email.recipient_email.trim().is_empty()
        {
            return Err(AppError::validation("email addresses must not be empty"));
        }
        if self.email.smtp_server.trim().is_empty() {
            return Err(AppError::validation("email.smtp_server is empty"));
        }
        if self.monitor.user_agent.trim().is_empty() {
            return Err(AppError::validation("monitor.user_agent is empty"));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(AppError::validation("monitor.timeout_secs must be > 0"));
        }
        if self.detector.out_of_stock_phrases.is_empty() {
            return Err(AppError::validation("detector.out_of_stock_phrases is empty"));
        }
        Ok(())
    }

    /// The single monitored item.
    ///
    /// `validate` guarantees at least one entry; extra entries are ignored.
    pub fn item(&self) -> &Item {
        &self.items[0]
    }
}

/// Outbound SMTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

/// Check scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Wall-clock interval between checks, in hours
    pub interval_hours: u64,
}

/// HTTP client and file-layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Path of the persisted status file
    #[serde(default = "defaults::status_file")]
    pub status_file: String,

    /// Path of the log file used by background runs
    #[serde(default = "defaults::log_file")]
    pub log_file: String,

    /// Path of the pid file used by background runs
    #[serde(default = "defaults::pid_file")]
    pub pid_file: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            status_file: defaults::status_file(),
            log_file: defaults::log_file(),
            pid_file: defaults::pid_file(),
        }
    }
}

/// Availability detection settings.
///
/// Defaults target a BigCommerce storefront; a different storefront only
/// needs different markers, not different code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Substring identifying the embedded stock blob script
    #[serde(default = "defaults::blob_marker")]
    pub blob_marker: String,

    /// Color names matched against `<option>` text (case-insensitive)
    #[serde(default = "defaults::color_tokens")]
    pub color_tokens: Vec<String>,

    /// Out-of-stock phrases matched against page text, in priority order
    #[serde(default = "defaults::out_of_stock_phrases")]
    pub out_of_stock_phrases: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blob_marker: defaults::blob_marker(),
            color_tokens: defaults::color_tokens(),
            out_of_stock_phrases: defaults::out_of_stock_phrases(),
        }
    }
}

mod defaults {
    // Monitor defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn status_file() -> String {
        "previous_status.json".into()
    }
    pub fn log_file() -> String {
        "stockwatch.log".into()
    }
    pub fn pid_file() -> String {
        "stockwatch.pid".into()
    }

    // Detector defaults
    pub fn blob_marker() -> String {
        "BCData".into()
    }
    pub fn color_tokens() -> Vec<String> {
        vec!["blue".into(), "gray".into(), "pink".into(), "yellow".into()]
    }
    pub fn out_of_stock_phrases() -> Vec<String> {
        vec![
            "out of stock".into(),
            "sold out".into(),
            "unavailable".into(),
            "backorder".into(),
            "preorder".into(),
            "currently unavailable".into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        serde_json::from_str(
            r#"{
                "items": [
                    {"name": "Widget", "url": "https://example.com/widget/"}
                ],
                "email": {
                    "sender_email": "sender@example.com",
                    "sender_password": "secret",
                    "recipient_email": "me@example.com",
                    "smtp_server": "smtp.example.com",
                    "smtp_port": 587
                },
                "schedule": {"interval_hours": 2}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_minimal_config_applies_defaults() {
        let config = sample_config();
        assert_eq!(config.items[0].name, "Widget");
        assert_eq!(config.schedule.interval_hours, 2);
        assert_eq!(config.monitor.timeout_secs, 15);
        assert_eq!(config.detector.blob_marker, "BCData");
        assert_eq!(config.detector.color_tokens.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = Config::load("definitely/not/here/config.json").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn validate_rejects_empty_items() {
        let mut config = sample_config();
        config.items.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = sample_config();
        config.schedule.interval_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = sample_config();
        config.items[0].url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
