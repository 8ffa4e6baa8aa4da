//! core::config::schema
//!
//! Publish settings schema.
//!
//! # Settings File
//!
//! Publishing works with built-in defaults. An optional TOML file passed
//! with `--settings` overrides individual values:
//!
//! ```toml
//! api_base = "https://api.fabric.microsoft.com/v1"
//! operation_timeout_secs = 1800
//! identity_attempts = 40
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: URLs must be http(s), and timeouts,
//! poll intervals, and attempt counts must be non-zero.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default remote API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.fabric.microsoft.com/v1";

/// Default OAuth2 authority (tenant id is appended).
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Default OAuth2 scope for the workspace API.
pub const DEFAULT_SCOPE: &str = "https://api.fabric.microsoft.com/.default";

/// Publish settings as written in the TOML file.
///
/// Every field is optional; [`PublishSettings`] applies defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    /// Workspace API base URL
    pub api_base: Option<String>,

    /// OAuth2 authority URL
    pub authority: Option<String>,

    /// OAuth2 scope
    pub scope: Option<String>,

    /// Timeout for ordinary API requests
    pub request_timeout_secs: Option<u64>,

    /// Timeout for create/update definition requests
    pub deploy_timeout_secs: Option<u64>,

    /// Deadline for a long-running operation
    pub operation_timeout_secs: Option<u64>,

    /// Poll interval when the server sends no Retry-After
    pub operation_poll_secs: Option<u64>,

    /// Transport retries for idempotent requests
    pub retry_count: Option<u32>,

    /// Initial backoff for transport retries
    pub retry_backoff_secs: Option<u64>,

    /// Item-list polls when resolving a created item's id
    pub identity_attempts: Option<u32>,

    /// Sleep between identity polls
    pub identity_poll_secs: Option<u64>,
}

impl SettingsFile {
    /// Parse a settings document.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, url) in [
            ("api_base", &self.api_base),
            ("authority", &self.authority),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} must be an http(s) URL, got '{}'",
                        key, url
                    )));
                }
            }
        }

        if let Some(scope) = &self.scope {
            if scope.trim().is_empty() {
                return Err(ConfigError::InvalidValue("scope cannot be empty".into()));
            }
        }

        for (key, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("deploy_timeout_secs", self.deploy_timeout_secs),
            ("operation_timeout_secs", self.operation_timeout_secs),
            ("operation_poll_secs", self.operation_poll_secs),
            ("identity_poll_secs", self.identity_poll_secs),
            ("identity_attempts", self.identity_attempts.map(u64::from)),
        ] {
            if value == Some(0) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }

        Ok(())
    }
}

/// Resolved publish settings with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSettings {
    pub api_base: String,
    pub authority: String,
    pub scope: String,
    pub request_timeout: Duration,
    pub deploy_timeout: Duration,
    pub operation_timeout: Duration,
    pub operation_poll: Duration,
    pub retry_count: u32,
    pub retry_backoff: Duration,
    pub identity_attempts: u32,
    pub identity_poll: Duration,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self::from(SettingsFile::default())
    }
}

impl From<SettingsFile> for PublishSettings {
    fn from(file: SettingsFile) -> Self {
        let secs = |value: Option<u64>, default: u64| Duration::from_secs(value.unwrap_or(default));
        Self {
            api_base: file
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            authority: file
                .authority
                .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string())
                .trim_end_matches('/')
                .to_string(),
            scope: file.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            request_timeout: secs(file.request_timeout_secs, 60),
            deploy_timeout: secs(file.deploy_timeout_secs, 180),
            operation_timeout: secs(file.operation_timeout_secs, 900),
            operation_poll: secs(file.operation_poll_secs, 5),
            retry_count: file.retry_count.unwrap_or(3),
            retry_backoff: secs(file.retry_backoff_secs, 2),
            identity_attempts: file.identity_attempts.unwrap_or(25),
            identity_poll: secs(file.identity_poll_secs, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = PublishSettings::default();
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert_eq!(settings.deploy_timeout, Duration::from_secs(180));
        assert_eq!(settings.operation_timeout, Duration::from_secs(900));
        assert_eq!(settings.operation_poll, Duration::from_secs(5));
        assert_eq!(settings.retry_count, 3);
        assert_eq!(settings.identity_attempts, 25);
        assert_eq!(settings.identity_poll, Duration::from_secs(2));
    }

    #[test]
    fn overrides_apply() {
        let file = SettingsFile::parse(
            r#"
            api_base = "http://localhost:8080/v1/"
            operation_timeout_secs = 30
            identity_attempts = 3
            "#,
        )
        .unwrap();
        file.validate().unwrap();

        let settings = PublishSettings::from(file);
        assert_eq!(settings.api_base, "http://localhost:8080/v1");
        assert_eq!(settings.operation_timeout, Duration::from_secs(30));
        assert_eq!(settings.identity_attempts, 3);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(SettingsFile::parse("retries = 5").is_err());
    }

    #[test]
    fn zero_values_rejected() {
        let file = SettingsFile {
            operation_poll_secs: Some(0),
            ..Default::default()
        };
        assert!(file.validate().is_err());

        let file = SettingsFile {
            identity_attempts: Some(0),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn zero_retries_allowed() {
        let file = SettingsFile {
            retry_count: Some(0),
            ..Default::default()
        };
        assert!(file.validate().is_ok());
    }

    #[test]
    fn non_http_urls_rejected() {
        let file = SettingsFile {
            api_base: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let file = SettingsFile {
            api_base: Some("https://example.com/v1".into()),
            retry_count: Some(5),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&file).unwrap();
        assert_eq!(SettingsFile::parse(&text).unwrap(), file);
    }
}
