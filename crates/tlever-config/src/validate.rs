//! Invariant checks applied after parsing.

use tlever_torrent_core::ThrottleProfile;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ClientConfig, ClogConfig, LeverConfig, Prefixes};

/// Separator used when labels are flattened for pattern matching; prefixes
/// must not collide with it.
const LABEL_SEPARATOR: char = ',';

/// Validate every section of a parsed configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` describing the first violation found.
pub fn validate_config(config: &LeverConfig) -> ConfigResult<()> {
    validate_client(&config.client)?;
    validate_prefixes(&config.general.prefix)?;
    validate_profile("General", "free", &config.general.free)?;
    validate_tiers(&config.tiers)?;
    validate_clog(&config.clog)
}

fn validate_client(client: &ClientConfig) -> ConfigResult<()> {
    if client.host.trim().is_empty() {
        return Err(ConfigError::invalid("Client", "host", None, "must not be empty"));
    }
    if client.port == 0 {
        return Err(ConfigError::invalid(
            "Client",
            "port",
            Some(client.port.to_string()),
            "must be between 1 and 65535",
        ));
    }
    if !client.path.starts_with('/') {
        return Err(ConfigError::invalid(
            "Client",
            "path",
            Some(client.path.clone()),
            "must start with '/'",
        ));
    }
    if client.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "Client",
            "timeout_secs",
            Some(client.timeout_secs.to_string()),
            "must be positive",
        ));
    }
    Ok(())
}

fn validate_prefixes(prefix: &Prefixes) -> ConfigResult<()> {
    for (field, value) in [
        ("prefix.tiers", prefix.tiers),
        ("prefix.categories", prefix.categories),
        ("prefix.tags", prefix.tags),
    ] {
        if value.is_whitespace() || value == LABEL_SEPARATOR {
            return Err(ConfigError::invalid(
                "General",
                field,
                Some(value.to_string()),
                "must be a visible character other than ','",
            ));
        }
    }

    if prefix.tiers == prefix.categories
        || prefix.tiers == prefix.tags
        || prefix.categories == prefix.tags
    {
        return Err(ConfigError::invalid(
            "General",
            "prefix",
            Some(format!(
                "{}{}{}",
                prefix.tiers, prefix.categories, prefix.tags
            )),
            "prefixes must be pairwise distinct",
        ));
    }
    Ok(())
}

fn validate_profile(
    section: &'static str,
    field: &str,
    profile: &ThrottleProfile,
) -> ConfigResult<()> {
    if !profile.seed_ratio_limit.is_finite() || profile.seed_ratio_limit < 0.0 {
        return Err(ConfigError::invalid(
            section,
            format!("{field}.seed_ratio_limit"),
            Some(profile.seed_ratio_limit.to_string()),
            "must be a finite non-negative number",
        ));
    }
    Ok(())
}

fn validate_tiers(tiers: &[ThrottleProfile]) -> ConfigResult<()> {
    if tiers.is_empty() {
        return Err(ConfigError::invalid(
            "Tiers",
            "[]",
            None,
            "at least one tier must be configured",
        ));
    }

    for (index, tier) in tiers.iter().enumerate() {
        validate_profile("Tiers", &format!("[{index}]"), tier)?;
    }

    for (index, pair) in tiers.windows(2).enumerate() {
        if pair[1].seed_ratio_limit <= pair[0].seed_ratio_limit {
            return Err(ConfigError::invalid(
                "Tiers",
                format!("[{}].seed_ratio_limit", index + 1),
                Some(pair[1].seed_ratio_limit.to_string()),
                "thresholds must be strictly increasing",
            ));
        }
    }
    Ok(())
}

fn validate_clog(clog: &ClogConfig) -> ConfigResult<()> {
    validate_profile("Clog", "profile", &clog.profile)?;

    for (index, band) in clog.bands.iter().enumerate() {
        if !band.min_ratio.is_finite() || band.min_ratio < 0.0 {
            return Err(ConfigError::invalid(
                "Clog",
                format!("bands[{index}].min_ratio"),
                Some(band.min_ratio.to_string()),
                "must be a finite non-negative number",
            ));
        }
    }

    for (index, pair) in clog.bands.windows(2).enumerate() {
        if pair[1].min_ratio <= pair[0].min_ratio {
            return Err(ConfigError::invalid(
                "Clog",
                format!("bands[{}].min_ratio", index + 1),
                Some(pair[1].min_ratio.to_string()),
                "bands must be ordered by strictly increasing ratio",
            ));
        }
    }
    Ok(())
}
