use std::path::PathBuf;

/// Where the bot host publishes its feed files when no base URL is configured.
pub const DEFAULT_FEED_BASE: &str = "http://127.0.0.1:8080/jsons";

/// File name of the customs database inside the data directory.
pub const DATABASE_FILE: &str = "customs.duckdb";

pub const ENV_CACHE_DIR: &str = "KISSUNE_CACHE_DIR";
pub const ENV_DATABASE: &str = "KISSUNE_DATABASE";
pub const ENV_FEED_URL: &str = "KISSUNE_FEED_URL";
pub const ENV_OFFLINE: &str = "KISSUNE_OFFLINE";
pub const ENV_TIMEOUT_SECS: &str = "KISSUNE_TIMEOUT_SECS";

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("kissune-cards")
    } else {
        PathBuf::from(".kissune-cards-cache")
    }
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("kissune-cards").join(DATABASE_FILE)
    } else {
        PathBuf::from(DATABASE_FILE)
    }
}

/// Interpret an environment flag: `1`, `true`, `yes` and `on` are truthy.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
