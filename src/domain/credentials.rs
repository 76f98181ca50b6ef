// Credential contexts passed explicitly into every remote call
use chrono::{DateTime, Utc};
use std::fmt;

/// Temporary credentials obtained by assuming a role in another account.
///
/// Owned by a single replication run; never cached or refreshed.
#[derive(Clone, PartialEq)]
pub struct AssumedRoleSession {
    pub role_arn: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl AssumedRoleSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }
}

impl fmt::Debug for AssumedRoleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssumedRoleSession")
            .field("role_arn", &self.role_arn)
            .field("access_key_id", &self.access_key_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// Whatever the default provider chain resolves for this process
    Ambient,
    Assumed(AssumedRoleSession),
}

/// Account, region and credentials a remote call runs under
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceContext {
    pub account_id: String,
    pub region: String,
    pub credentials: CredentialSource,
}

impl ServiceContext {
    pub fn ambient(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
            credentials: CredentialSource::Ambient,
        }
    }

    pub fn assumed(
        account_id: impl Into<String>,
        region: impl Into<String>,
        session: AssumedRoleSession,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
            credentials: CredentialSource::Assumed(session),
        }
    }

    pub fn session(&self) -> Option<&AssumedRoleSession> {
        match &self.credentials {
            CredentialSource::Assumed(session) => Some(session),
            CredentialSource::Ambient => None,
        }
    }
}
