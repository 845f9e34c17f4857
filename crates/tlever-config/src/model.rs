//! Typed configuration document.
//!
//! # Design
//! - Top-level keys keep the capitalised `Client`/`General`/`Tiers`/`Clog`
//!   layout of existing config files.
//! - The tier table is positional: index `i` is tier `i`, and its
//!   `seed_ratio_limit` is the upper bound of that tier's ratio range.

use serde::{Deserialize, Serialize};
use tlever_torrent_core::ThrottleProfile;

use crate::defaults;

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeverConfig {
    /// Daemon connection settings.
    #[serde(rename = "Client", default)]
    pub client: ClientConfig,
    /// Label prefixes, free-tier profile and logging preferences.
    #[serde(rename = "General", default)]
    pub general: GeneralConfig,
    /// Ordered tier ladder.
    #[serde(rename = "Tiers", default = "defaults::tiers")]
    pub tiers: Vec<ThrottleProfile>,
    /// Throttle bands for torrents above the top of the ladder.
    #[serde(rename = "Clog", default)]
    pub clog: ClogConfig,
}

impl Default for LeverConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            general: GeneralConfig::default(),
            tiers: defaults::tiers(),
            clog: ClogConfig::default(),
        }
    }
}

/// Connection settings for the RPC daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Daemon host name or address.
    pub host: String,
    /// Daemon RPC port.
    pub port: u16,
    /// Username for HTTP basic auth; empty disables auth.
    pub username: String,
    /// Password for HTTP basic auth.
    pub password: String,
    /// RPC endpoint path.
    pub path: String,
    /// Use HTTPS instead of HTTP.
    pub tls: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            path: defaults::DEFAULT_RPC_PATH.to_string(),
            tls: false,
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Base endpoint URL assembled from the connection fields.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
    }
}

/// General section: prefixes, free profile and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Single-character label prefixes.
    #[serde(default)]
    pub prefix: Prefixes,
    /// Profile applied to `tier-free` torrents and after `tier unset`.
    #[serde(default = "defaults::free_profile")]
    pub free: ThrottleProfile,
    /// Preferred log output (`pretty` or `json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            prefix: Prefixes::default(),
            free: defaults::free_profile(),
            log_format: None,
        }
    }
}

/// Prefix characters that disambiguate label encodings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prefixes {
    /// Prefix for `tier-<N>` / `tier-free` labels.
    pub tiers: char,
    /// Prefix for category labels.
    pub categories: char,
    /// Prefix for tag labels.
    pub tags: char,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            tiers: defaults::TIER_PREFIX,
            categories: defaults::CATEGORY_PREFIX,
            tags: defaults::TAG_PREFIX,
        }
    }
}

/// One clog band: torrents above `min_ratio` get `upload_limit`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClogBand {
    /// Exclusive lower ratio bound of the band.
    pub min_ratio: f64,
    /// Upload cap in KiB/s applied inside the band.
    pub upload_limit: u64,
}

/// Throttle applied to torrents whose ratio exceeds the tier ladder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClogConfig {
    /// Base profile; `upload_limit`/`upload_limited` are overridden per band.
    #[serde(default = "defaults::clog_profile")]
    pub profile: ThrottleProfile,
    /// Bands ordered by increasing `min_ratio`.
    #[serde(default = "default_clog_bands")]
    pub bands: Vec<ClogBand>,
}

impl Default for ClogConfig {
    fn default() -> Self {
        Self {
            profile: defaults::clog_profile(),
            bands: default_clog_bands(),
        }
    }
}

fn default_clog_bands() -> Vec<ClogBand> {
    defaults::CLOG_BANDS
        .iter()
        .map(|&(min_ratio, upload_limit)| ClogBand {
            min_ratio,
            upload_limit,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_torrent_core::RatioMode;

    #[test]
    fn empty_document_uses_defaults() {
        let config: LeverConfig = serde_json::from_str("{}").expect("empty object parses");
        assert_eq!(config, LeverConfig::default());
        assert_eq!(config.general.prefix.categories, '@');
        assert_eq!(config.tiers.len(), 4);
    }

    #[test]
    fn capitalised_sections_are_recognised() {
        let config: LeverConfig = serde_json::from_str(
            r#"{
                "Client": {"host": "seedbox", "port": 9092},
                "General": {"prefix": {"tiers": "!", "categories": "@", "tags": "+"}},
                "Tiers": [
                    {"seed_ratio_limit": 1.0, "seed_ratio_mode": "single", "seed_idle_limit": 10,
                     "seed_idle_mode": "global", "upload_limit": 10, "upload_limited": true}
                ]
            }"#,
        )
        .expect("document parses");
        assert_eq!(config.client.host, "seedbox");
        assert_eq!(config.client.path, "/transmission/rpc");
        assert_eq!(config.general.prefix.tiers, '!');
        assert_eq!(config.tiers.len(), 1);
        assert_eq!(config.tiers[0].seed_ratio_limit, 1.0);
        assert_eq!(config.tiers[0].seed_ratio_mode, RatioMode::Single);
    }

    #[test]
    fn multi_character_prefix_is_rejected_by_parser() {
        let result = serde_json::from_str::<LeverConfig>(
            r##"{"General": {"prefix": {"tiers": "%%", "categories": "@", "tags": "#"}}}"##,
        );
        assert!(result.is_err());
    }

    #[test]
    fn endpoint_reflects_scheme_and_path() {
        let mut client = ClientConfig::default();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9091/transmission/rpc");
        client.tls = true;
        client.path = "/rpc".to_string();
        assert_eq!(client.endpoint(), "https://127.0.0.1:9091/rpc");
    }
}
