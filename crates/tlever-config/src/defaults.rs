//! Built-in configuration values and discovery locations.
//!
//! # Design
//! - The default ladder sets each tier's ratio limit equal to its threshold,
//!   so the daemon pauses a torrent when it outgrows its tier and
//!   `tier enforce` promotes and resumes it.

use tlever_torrent_core::{IdleMode, RatioMode, ThrottleProfile};

/// Directory name used under the XDG and legacy config roots.
pub const CONFIG_DIR_NAME: &str = "transmission-lever";
/// File name looked up inside each config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Environment variable that overrides discovery with an explicit file.
pub const CONFIG_ENV_VAR: &str = "TLEVER_CONFIG";

pub(crate) const DEFAULT_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_PORT: u16 = 9091;
pub(crate) const DEFAULT_RPC_PATH: &str = "/transmission/rpc";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub(crate) const TIER_PREFIX: char = '%';
pub(crate) const CATEGORY_PREFIX: char = '@';
pub(crate) const TAG_PREFIX: char = '#';

const IDLE_LIMIT_MINUTES: u32 = 30;

pub(crate) fn tiers() -> Vec<ThrottleProfile> {
    [(1.0, 5_000), (2.0, 2_500), (5.0, 1_000), (50.0, 250)]
        .into_iter()
        .map(|(threshold, upload_limit)| ThrottleProfile {
            seed_ratio_limit: threshold,
            seed_ratio_mode: RatioMode::Single,
            seed_idle_limit: IDLE_LIMIT_MINUTES,
            seed_idle_mode: IdleMode::Off,
            upload_limit,
            upload_limited: true,
        })
        .collect()
}

pub(crate) const fn free_profile() -> ThrottleProfile {
    ThrottleProfile {
        seed_ratio_limit: 0.0,
        seed_ratio_mode: RatioMode::Unlimited,
        seed_idle_limit: IDLE_LIMIT_MINUTES,
        seed_idle_mode: IdleMode::Off,
        upload_limit: 0,
        upload_limited: false,
    }
}

pub(crate) const fn clog_profile() -> ThrottleProfile {
    ThrottleProfile {
        seed_ratio_limit: 5.0,
        seed_ratio_mode: RatioMode::Unlimited,
        seed_idle_limit: IDLE_LIMIT_MINUTES,
        seed_idle_mode: IdleMode::Off,
        upload_limit: 50,
        upload_limited: true,
    }
}

pub(crate) const CLOG_BANDS: [(f64, u64); 2] = [(50.0, 50), (70.0, 25)];
