use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: String,
    /// Site profile YAML. `None` selects the built-in profile.
    pub profile_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Delay before the first extraction so a dynamically-loading page can settle.
    pub settle_delay_ms: u64,
    pub watch_interval_secs: u64,
}
