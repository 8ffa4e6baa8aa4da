//! auth::credentials
//!
//! Publish credentials loaded from a [`SecretSource`].
//!
//! # Variables
//!
//! - `AZURE_TENANT_ID` - directory (tenant) of the service principal
//! - `AZURE_CLIENT_ID` - service principal application id
//! - `AZURE_CLIENT_SECRET` - service principal secret
//! - `FABRIC_WORKSPACE_ID` - target workspace (falls back to `WORKSPACE_ID`)
//!
//! Every missing variable is reported in a single error so the operator can
//! fix them all at once.

use crate::core::config::ConfigError;
use crate::secrets::SecretSource;

pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "AZURE_CLIENT_SECRET";
pub const WORKSPACE_ID_VARS: [&str; 2] = ["FABRIC_WORKSPACE_ID", "WORKSPACE_ID"];

/// OAuth2 client credentials of a service principal.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The client secret. Never log this.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Everything needed to publish: who we are and where to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCredentials {
    pub credentials: ClientCredentials,
    pub workspace_id: String,
}

/// Load publish credentials from `source`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnv` listing every unset variable, or
/// `ConfigError::InvalidValue` if a variable cannot be read.
pub fn load_credentials(source: &dyn SecretSource) -> Result<PublishCredentials, ConfigError> {
    let read = |keys: &[&str]| {
        source
            .get_any(keys)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    };

    let tenant_id = read(&[TENANT_ID_VAR])?;
    let client_id = read(&[CLIENT_ID_VAR])?;
    let client_secret = read(&[CLIENT_SECRET_VAR])?;
    let workspace_id = read(&WORKSPACE_ID_VARS)?;

    let mut missing = Vec::new();
    for (name, value) in [
        (TENANT_ID_VAR, &tenant_id),
        (CLIENT_ID_VAR, &client_id),
        (CLIENT_SECRET_VAR, &client_secret),
        (WORKSPACE_ID_VARS[0], &workspace_id),
    ] {
        if value.is_none() {
            missing.push(name.to_string());
        }
    }

    match (tenant_id, client_id, client_secret, workspace_id) {
        (Some(tenant_id), Some(client_id), Some(client_secret), Some(workspace_id)) => {
            Ok(PublishCredentials {
                credentials: ClientCredentials::new(tenant_id, client_id, client_secret),
                workspace_id,
            })
        }
        _ => Err(ConfigError::MissingEnv(missing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySource;

    fn full() -> MemorySource {
        MemorySource::new()
            .with(TENANT_ID_VAR, "tenant")
            .with(CLIENT_ID_VAR, "client")
            .with(CLIENT_SECRET_VAR, "secret")
            .with("FABRIC_WORKSPACE_ID", "ws")
    }

    #[test]
    fn loads_all_values() {
        let creds = load_credentials(&full()).unwrap();
        assert_eq!(creds.credentials.tenant_id, "tenant");
        assert_eq!(creds.credentials.client_id, "client");
        assert_eq!(creds.credentials.client_secret(), "secret");
        assert_eq!(creds.workspace_id, "ws");
    }

    #[test]
    fn workspace_falls_back_to_legacy_name() {
        let source = MemorySource::new()
            .with(TENANT_ID_VAR, "tenant")
            .with(CLIENT_ID_VAR, "client")
            .with(CLIENT_SECRET_VAR, "secret")
            .with("WORKSPACE_ID", "legacy");
        assert_eq!(load_credentials(&source).unwrap().workspace_id, "legacy");
    }

    #[test]
    fn all_missing_names_reported_together() {
        let source = MemorySource::new().with(CLIENT_ID_VAR, "client");
        match load_credentials(&source).unwrap_err() {
            ConfigError::MissingEnv(names) => assert_eq!(
                names,
                vec![
                    "AZURE_TENANT_ID".to_string(),
                    "AZURE_CLIENT_SECRET".to_string(),
                    "FABRIC_WORKSPACE_ID".to_string(),
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = load_credentials(&full()).unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("\"secret\""));
    }
}
