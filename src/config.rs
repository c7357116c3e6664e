use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per task activation (including the first).
    pub max_attempts: u32,
    /// Fixed delay in seconds between disconnect and reconnect (e.g. 2.0).
    pub delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 2.0,
        }
    }
}

/// Data-channel negotiation mode. Passive: the client opens the data
/// connection; Active: the server connects back. Configuration input,
/// never negotiated dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Passive,
    Active,
}

/// Global engine configuration loaded from `~/.config/ftpdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpdlConfig {
    /// Maximum number of simultaneous transfers.
    pub max_concurrent: usize,
    /// Data-channel read size in bytes; also the cancellation granularity.
    pub chunk_size: usize,
    /// Control-channel connect and read timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Scheduler idle sleep between admission polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Data-channel mode: "passive" (default) or "active".
    #[serde(default)]
    pub transfer_mode: TransferMode,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for FtpdlConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            chunk_size: 8192,
            connect_timeout_secs: 30,
            poll_interval_ms: 200,
            transfer_mode: TransferMode::Passive,
            retry: None,
        }
    }
}

impl FtpdlConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ftpdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FtpdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FtpdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FtpdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
