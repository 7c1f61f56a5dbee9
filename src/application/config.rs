use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub prices: PriceConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// General settings: alert polling interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

/// Quote provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Push service used in addition to the in-process queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushService {
    #[default]
    None,
    Pushover,
    Pushbullet,
}

/// Notification channels: desktop popup and one optional push service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub desktop: bool,
    #[serde(default)]
    pub push_service: PushService,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushover_user_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushover_api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushbullet_access_token: Option<String>,
}

/// Terminal dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,
}

/// Database storage path (tilde-expanded at point of use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

pub const MIN_DASHBOARD_REFRESH_SECS: u64 = 60;

// --- Defaults ---

const fn default_interval() -> u64 {
    60
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

const fn default_timeout() -> u64 {
    10
}

const fn default_request_delay() -> u64 {
    200
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0 Safari/537.36"
        .into()
}

const fn default_true() -> bool {
    true
}

const fn default_refresh() -> u64 {
    300
}

// NOTE: Stored as raw string with tilde, expanded with shellexpand at point of use.
fn default_database_path() -> String {
    "~/.local/share/stockwatch/portfolio.db".into()
}

// --- Default impls ---

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            request_delay_ms: default_request_delay(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: default_true(),
            push_service: PushService::None,
            pushover_user_key: None,
            pushover_api_token: None,
            pushbullet_access_token: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl GeneralConfig {
    /// Polling interval, never shorter than one second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl PriceConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(MIN_DASHBOARD_REFRESH_SECS))
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the TOML content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or a value is out of range.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to default path
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Reject values the daemon cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.general.interval_secs == 0 {
            bail!("general.interval_secs must be at least 1");
        }
        if self.dashboard.refresh_secs < MIN_DASHBOARD_REFRESH_SECS {
            bail!(
                "dashboard.refresh_secs must be at least {MIN_DASHBOARD_REFRESH_SECS} (got {})",
                self.dashboard.refresh_secs
            );
        }
        if self.prices.base_url.trim().is_empty() {
            bail!("prices.base_url must not be empty");
        }
        Ok(())
    }

    /// Default config file location: `<config dir>/stockwatch/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("stockwatch").join("config.toml"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_sensible_values() {
        let config = AppConfig::default();
        assert_eq!(config.general.interval_secs, 60);
        assert_eq!(config.prices.base_url, "https://query1.finance.yahoo.com");
        assert_eq!(config.prices.timeout_secs, 10);
        assert_eq!(config.prices.request_delay_ms, 200);
        assert!(config.notifications.desktop);
        assert_eq!(config.notifications.push_service, PushService::None);
        assert!(config.notifications.pushover_user_key.is_none());
        assert_eq!(config.dashboard.refresh_secs, 300);
        assert_eq!(
            config.database.path,
            "~/.local/share/stockwatch/portfolio.db"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serde_roundtrip() {
        let mut config = AppConfig::default();
        config.notifications.push_service = PushService::Pushbullet;
        config.notifications.pushbullet_access_token = Some("o.abc".into());

        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let deserialized: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(
            deserialized.general.interval_secs,
            config.general.interval_secs
        );
        assert_eq!(
            deserialized.notifications.push_service,
            PushService::Pushbullet
        );
        assert_eq!(
            deserialized.notifications.pushbullet_access_token.as_deref(),
            Some("o.abc")
        );
        assert_eq!(deserialized.database.path, config.database.path);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse empty toml");
        assert_eq!(config.general.interval_secs, 60);
        assert_eq!(config.dashboard.refresh_secs, 300);
        assert_eq!(config.notifications.push_service, PushService::None);
    }

    #[test]
    fn partial_toml_fills_missing_with_defaults() {
        let toml_str = r#"
[general]
interval_secs = 15

[notifications]
push_service = "pushover"
pushover_user_key = "u123"
pushover_api_token = "t456"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse partial toml");
        assert_eq!(config.general.interval_secs, 15);
        assert_eq!(config.notifications.push_service, PushService::Pushover);
        assert_eq!(config.notifications.pushover_user_key.as_deref(), Some("u123"));
        assert!(config.notifications.desktop);
        assert_eq!(config.prices.timeout_secs, 10);
    }

    #[test]
    fn unknown_push_service_fails_to_parse() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
[notifications]
push_service = "carrier-pigeon"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let toml_str = r#"
[general]
interval_secs = 5

[dashboard]
refresh_secs = 120
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().expect("create tempfile");
        tmpfile
            .write_all(toml_str.as_bytes())
            .expect("write tmpfile");

        let config = AppConfig::load_from(tmpfile.path()).expect("load from file");
        assert_eq!(config.general.interval_secs, 5);
        assert_eq!(config.dashboard.refresh_secs, 120);
    }

    #[test]
    fn load_from_rejects_short_dashboard_refresh() {
        let mut tmpfile = tempfile::NamedTempFile::new().expect("create tempfile");
        tmpfile
            .write_all(b"[dashboard]\nrefresh_secs = 10\n")
            .expect("write tmpfile");

        let err = AppConfig::load_from(tmpfile.path()).expect_err("should reject");
        assert!(err.to_string().contains("refresh_secs"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.general.interval_secs = 0;
        assert!(config.validate().is_err());
        assert_eq!(config.general.interval(), Duration::from_secs(1));
    }

    #[test]
    fn config_path_contains_stockwatch() {
        let path = AppConfig::config_path().expect("config path");
        assert!(path.to_string_lossy().contains("stockwatch"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn save_to_creates_file_and_directories() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("subdir").join("config.toml");

        let config = AppConfig::default();
        config.save_to(&path).expect("save_to");

        assert!(path.exists());
        let reloaded = AppConfig::load_from(&path).expect("reload");
        assert_eq!(reloaded.general.interval_secs, config.general.interval_secs);
        assert_eq!(reloaded.database.path, config.database.path);
    }

    #[test]
    fn load_or_create_loads_existing_file() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\ninterval_secs = 42\n").expect("write");

        let config = AppConfig::load_or_create(&path).expect("load_or_create");
        assert_eq!(config.general.interval_secs, 42);
    }

    #[test]
    fn load_or_create_creates_default_when_missing() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("stockwatch").join("config.toml");

        assert!(!path.exists());
        let config = AppConfig::load_or_create(&path).expect("load_or_create");

        assert!(path.exists());
        assert_eq!(config.general.interval_secs, 60);

        let reloaded = AppConfig::load_from(&path).expect("reload created file");
        assert_eq!(reloaded.prices.base_url, config.prices.base_url);
    }

    #[test]
    fn load_from_nonexistent_file_fails() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let missing = dir.path().join("missing-config.toml");
        assert!(AppConfig::load_from(&missing).is_err());
    }

    #[test]
    fn invalid_toml_fails() {
        let mut tmpfile = tempfile::NamedTempFile::new().expect("create tempfile");
        tmpfile
            .write_all(b"this is not valid toml [[[")
            .expect("write");

        assert!(AppConfig::load_from(tmpfile.path()).is_err());
    }

    #[test]
    fn durations() {
        let config = AppConfig::default();
        assert_eq!(config.general.interval(), Duration::from_secs(60));
        assert_eq!(config.prices.timeout(), Duration::from_secs(10));
        assert_eq!(config.prices.request_delay(), Duration::from_millis(200));
        assert_eq!(config.dashboard.refresh(), Duration::from_secs(300));
    }
}
