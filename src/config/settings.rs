use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::InitialState;

pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub backend: BackendSettings,
    pub server: ServerSettings,
    pub timing: TimingSettings,
    pub form: FormDefaults,
    /// JSON document with `metrics` and `history_plot` shown before the first poll.
    pub initial_state_path: Option<PathBuf>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            server: ServerSettings::default(),
            timing: TimingSettings::default(),
            form: FormDefaults::default(),
            initial_state_path: None,
        }
    }
}

impl DashboardSettings {
    /// Defaults, then the optional file, then `DASHBOARD__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let url = self.backend.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("backend.base_url must be an http(s) URL, got {:?}", url));
        }
        if self.backend.request_timeout_secs == 0 {
            errors.push("backend.request_timeout_secs must be > 0".to_string());
        }
        if self.timing.poll_interval_secs == 0 {
            errors.push("timing.poll_interval_secs must be > 0".to_string());
        }
        if self.form.lookback_days == 0 {
            errors.push("form.lookback_days must be > 0".to_string());
        }
        if self.form.epochs == 0 {
            errors.push("form.epochs must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn load_initial_state(&self) -> anyhow::Result<InitialState> {
        match &self.initial_state_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&raw)?)
            }
            None => Ok(InitialState::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            // Training blocks the request for the whole fit.
            request_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub poll_interval_secs: u64,
    pub status_clear_secs: u64,
}

impl TimingSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_secs(self.status_clear_secs)
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            status_clear_secs: 5,
        }
    }
}

/// Values the training form is pre-filled with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub symbol: String,
    pub interval: String,
    pub lookback_days: u32,
    pub epochs: u32,
    pub threshold: f64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            interval: "1m".to_string(),
            lookback_days: 10,
            epochs: 12,
            threshold: 0.0005,
        }
    }
}
