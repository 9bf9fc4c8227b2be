//! Client configuration

use std::time::Duration;

use crate::cache::CachePolicy;

/// Base URL for table queries; the table is appended as `?type=<table>`
pub const DEFAULT_API_URL: &str = "https://battlefieldsmc.net/api/";

/// URL returning the JSON array of server addresses
pub const DEFAULT_SERVER_LIST_URL: &str = "https://battlefieldsmc.net/api/servers.json";

/// URL returning per-host status colours inside the response envelope
pub const DEFAULT_SERVER_STATUS_URL: &str = "https://battlefieldsmc.net/api/status";

/// Prefix for server info lookups; the server address is appended
pub const DEFAULT_SERVER_INFO_URL: &str = "https://api.mcsrvstat.us/2/";

/// The upstream rejects requests that do not look like they come from a browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.11 (KHTML, like Gecko) Chrome/23.0.1271.95 Safari/537.11";

/// Default time-to-live for cached results
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default time to wait for in-flight requests during shutdown
pub const DEFAULT_SHUTDOWN_WAIT: Duration = Duration::from_secs(10);

/// Configuration for a [`BattlefieldsClient`](super::BattlefieldsClient)
///
/// Fixed once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for table queries
    pub base_url: String,
    /// URL of the server list
    pub server_list_url: String,
    /// URL of the server status list
    pub server_status_url: String,
    /// Prefix for server info lookups
    pub server_info_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// How long results are cached; `Duration::ZERO` disables caching
    pub cache_ttl: Duration,
    /// Whether failed requests are cached for one TTL window
    pub cache_errors: bool,
    /// How long `shutdown` waits for in-flight requests
    pub shutdown_wait: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            server_list_url: DEFAULT_SERVER_LIST_URL.to_string(),
            server_status_url: DEFAULT_SERVER_STATUS_URL.to_string(),
            server_info_url: DEFAULT_SERVER_INFO_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_errors: true,
            shutdown_wait: DEFAULT_SHUTDOWN_WAIT,
        }
    }
}

impl ClientConfig {
    /// Cache policy derived from the TTL and error caching settings
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.cache_ttl, self.cache_errors)
    }

    /// Builds the URL for a table query from an encoded query suffix
    pub fn table_url(&self, table: &str, query_suffix: &str) -> String {
        format!("{}?type={}{}", self.base_url, table, query_suffix)
    }

    /// Builds the server info URL for an address
    pub fn server_info_url_for(&self, address: &str) -> String {
        format!("{}{}", self.server_info_url, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.cache_errors);
        assert_eq!(config.shutdown_wait, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_table_url() {
        let config = ClientConfig {
            base_url: "http://localhost/api".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.table_url("kills", "&uuid=abc"),
            "http://localhost/api?type=kills&uuid=abc"
        );
        assert_eq!(config.table_url("wins", ""), "http://localhost/api?type=wins");
    }

    #[test]
    fn test_server_info_url() {
        let config = ClientConfig::default();
        assert_eq!(
            config.server_info_url_for("play.example.net"),
            "https://api.mcsrvstat.us/2/play.example.net"
        );
    }

    #[test]
    fn test_zero_ttl_disables_cache_policy() {
        let config = ClientConfig {
            cache_ttl: Duration::ZERO,
            ..Default::default()
        };
        assert!(!config.cache_policy().is_enabled());
    }
}
