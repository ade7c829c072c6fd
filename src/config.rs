use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub list: ListConfig,
    pub tui: TuiConfig,
    pub download: DownloadConfig,
}

/// Clipboard-history server connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the server, without the `/api` suffix.
    pub base_url: String,
    /// Username for automatic login.
    pub username: Option<String>,
    /// Password for automatic login.
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// History list behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Initial page size.
    pub page_size: u32,
    /// Interval between change-detection stats requests, in milliseconds.
    pub poll_interval_ms: u64,
    /// Quiet period after the last search keystroke before querying.
    pub search_debounce_ms: u64,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
}

/// Where downloaded files are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Override the default download directory.
    pub dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            username: None,
            password: None,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            poll_interval_ms: 1000,
            search_debounce_ms: 400,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 50 }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/cliptui/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    Self::validated(config)
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}; using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}; using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Replace zero timer periods and page size with their defaults.
    ///
    /// `tokio::time::interval` panics on a zero period.
    pub fn validated(mut self) -> Self {
        let defaults = ListConfig::default();
        if self.list.poll_interval_ms == 0 {
            log::warn!(
                "list.poll_interval_ms must be positive; using {}",
                defaults.poll_interval_ms
            );
            self.list.poll_interval_ms = defaults.poll_interval_ms;
        }
        if self.list.page_size == 0 {
            log::warn!("list.page_size must be positive; using {}", defaults.page_size);
            self.list.page_size = defaults.page_size;
        }
        if self.tui.tick_rate_ms == 0 {
            let tick_rate_ms = TuiConfig::default().tick_rate_ms;
            log::warn!("tui.tick_rate_ms must be positive; using {tick_rate_ms}");
            self.tui.tick_rate_ms = tick_rate_ms;
        }
        self
    }

    /// Resolved download directory (override, platform download dir, or cwd).
    pub fn download_dir(&self) -> PathBuf {
        self.download
            .dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("cliptui").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
