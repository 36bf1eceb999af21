use crate::error::Result;
use log::info;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Address the control surface listens on when nothing else is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Upper bound for a single SmartApp call.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }

    pairs
}

/// Daemon configuration.
///
/// Read from a flat JSON file (`app.json`), then overridden by environment
/// variables. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    #[serde(flatten)]
    pub smartapp: SmartAppConfig,
}

/// SmartApp endpoint settings and the sleep debounce delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartAppConfig {
    pub app_url: Option<String>,
    pub app_id: Option<String>,
    pub access_token: Option<String>,
    /// Seconds to wait before reporting a sleep. Absent or `<= 0` reports
    /// immediately.
    pub sleep_delay: Option<i64>,
    pub notify_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            smartapp: SmartAppConfig::default(),
        }
    }
}

impl Default for SmartAppConfig {
    fn default() -> Self {
        Self {
            app_url: None,
            app_id: None,
            access_token: None,
            sleep_delay: None,
            notify_timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
        }
    }
}

impl SmartAppConfig {
    /// Debounce delay for sleep notifications, `None` when they fire immediately.
    pub fn sleep_delay(&self) -> Option<Duration> {
        match self.sleep_delay {
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        }
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs.max(1))
    }
}

impl Config {
    /// Default location of the config file: `$XDG_CONFIG_HOME/display-wake-bridge/app.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("display-wake-bridge").join("app.json"))
    }

    /// Read the config file (if present) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!("[Config] Reading {}", path.display());
                Self::from_json(&fs::read_to_string(path)?)?
            }
            Some(path) => {
                info!(
                    "[Config] {} not found, using defaults and environment",
                    path.display()
                );
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Override values from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("BIND_ADDR") {
            self.bind = bind;
        }
        if let Some(url) = lookup("APP_URL") {
            self.smartapp.app_url = Some(url);
        }
        if let Some(id) = lookup("APP_ID") {
            self.smartapp.app_id = Some(id);
        }
        if let Some(token) = lookup("ACCESS_TOKEN") {
            self.smartapp.access_token = Some(token);
        }
        if let Some(delay) = lookup("SLEEP_DELAY")
            && let Ok(d) = delay.trim().parse()
        {
            self.smartapp.sleep_delay = Some(d);
        }
        if let Some(timeout) = lookup("NOTIFY_TIMEOUT_SECS")
            && let Ok(t) = timeout.trim().parse()
        {
            self.smartapp.notify_timeout_secs = t;
        }
    }
}

/// SmartApp settings shared between the bridge, the notifier and the
/// reload handler. Readers always see the latest loaded values.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(Arc<RwLock<SmartAppConfig>>);

impl SharedConfig {
    pub fn new(config: SmartAppConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    pub fn snapshot(&self) -> SmartAppConfig {
        self.0.read().clone()
    }

    pub fn sleep_delay(&self) -> Option<Duration> {
        self.0.read().sleep_delay()
    }

    pub fn replace(&self, config: SmartAppConfig) {
        *self.0.write() = config;
    }

    /// Re-read file and environment. On error the current values are kept.
    pub fn reload(&self, path: Option<&Path>) -> Result<()> {
        let config = Config::load(path)?;
        info!(
            "[Config] Reloaded (sleep_delay={:?}, app_url set: {})",
            config.smartapp.sleep_delay,
            config.smartapp.app_url.is_some()
        );
        self.replace(config.smartapp);
        Ok(())
    }
}
