//! Error types for configuration loading and validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained a value that violates a configuration invariant.
    #[error("invalid configuration field {section}.{field}: {reason}")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: String,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Configuration document could not be read.
    #[error("failed to read configuration file")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path that was being read.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Configuration document was not valid JSON for the expected shape.
    #[error("failed to parse configuration file")]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Source serde error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &'static str,
        field: impl Into<String>,
        value: Option<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            section,
            field: field.into(),
            value,
            reason,
        }
    }

    /// Human-readable detail including the offending path or value.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidField {
                value: Some(value), ..
            } => format!("{self} (got '{value}')"),
            Self::InvalidField { value: None, .. } => self.to_string(),
            Self::Io {
                operation,
                path,
                source,
            } => format!("{self} ({operation} {}): {source}", path.display()),
            Self::Parse { path, source } => format!("{self} {}: {source}", path.display()),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_includes_context() {
        let invalid = ConfigError::invalid("General", "prefix", Some(",".into()), "reserved");
        assert_eq!(
            invalid.detail(),
            "invalid configuration field General.prefix: reserved (got ',')"
        );
        let io = ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("/etc/x.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(io.detail().contains("/etc/x.json"));
    }
}
