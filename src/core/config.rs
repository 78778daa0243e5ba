use std::env;
use std::time::Duration;

pub const DEFAULT_SPORTSDB_API_ROOT: &str = "https://www.thesportsdb.com/api/v1/json";
// TheSportsDB's public test key
pub const DEFAULT_SPORTSDB_API_KEY: &str = "3";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sportsdb_api_root: String,
    pub sportsdb_api_key: String,
    // Fail multi calendar feeds when any owned calendar fails
    pub strict_aggregation: bool,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Read every setting from `CALFEED_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let sportsdb_api_root = env::var("CALFEED_SPORTSDB_API_ROOT")
            .unwrap_or_else(|_| DEFAULT_SPORTSDB_API_ROOT.to_string());
        let sportsdb_api_key = env::var("CALFEED_SPORTSDB_API_KEY")
            .unwrap_or_else(|_| DEFAULT_SPORTSDB_API_KEY.to_string());
        let strict_aggregation = env::var("CALFEED_STRICT_AGGREGATION")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let http_timeout_secs = env::var("CALFEED_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Self {
            sportsdb_api_root,
            sportsdb_api_key,
            strict_aggregation,
            http_timeout_secs,
        }
    }
}
