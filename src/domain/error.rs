// Error taxonomy shared by every lifecycle operation
use thiserror::Error;

use super::status::ResourceStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("missing configuration: {}", .missing.join(", "))]
    MissingConfiguration { missing: Vec<&'static str> },

    #[error("invalid configuration value for {key}: {value:?}")]
    InvalidConfiguration { key: &'static str, value: String },

    #[error("{resource} reached {status}: {reason}")]
    RemoteOperationFailed {
        resource: String,
        status: ResourceStatus,
        reason: String,
    },

    #[error("could not assume role {role_arn}: {reason}")]
    RoleAssumptionFailed { role_arn: String, reason: String },

    #[error("no dataset bound for placeholder(s): {}", .missing.join(", "))]
    UnresolvedPlaceholder { missing: Vec<String> },

    #[error("{resource} did not reach a terminal status after {attempts} polls")]
    PollingTimeout { resource: String, attempts: u32 },

    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },

    #[error("{resource} already exists")]
    AlreadyExists { resource: String },

    #[error("could not write template archive: {0}")]
    Archive(String),
}

impl LifecycleError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_lists_every_key() {
        let err = LifecycleError::MissingConfiguration {
            missing: vec!["AWS_ACCOUNT_ID", "TEMPLATE_ID"],
        };
        assert_eq!(
            err.to_string(),
            "missing configuration: AWS_ACCOUNT_ID, TEMPLATE_ID"
        );
    }

    #[test]
    fn test_remote_failure_carries_service_reason() {
        let err = LifecycleError::RemoteOperationFailed {
            resource: "template tmpl-1".to_string(),
            status: ResourceStatus::CreationFailed,
            reason: "DATA_SET_NOT_FOUND: dataset missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "template tmpl-1 reached CREATION_FAILED: DATA_SET_NOT_FOUND: dataset missing"
        );
    }
}
