// Lifecycle status reported by the service for templates and dashboards
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    CreationInProgress,
    CreationSuccessful,
    CreationFailed,
    UpdateInProgress,
    UpdateSuccessful,
    UpdateFailed,
    Deleted,
    Unknown(String),
}

impl ResourceStatus {
    /// Parse the service's wire name (e.g. `CREATION_SUCCESSFUL`)
    pub fn from_service(value: &str) -> Self {
        match value {
            "CREATION_IN_PROGRESS" => Self::CreationInProgress,
            "CREATION_SUCCESSFUL" => Self::CreationSuccessful,
            "CREATION_FAILED" => Self::CreationFailed,
            "UPDATE_IN_PROGRESS" => Self::UpdateInProgress,
            "UPDATE_SUCCESSFUL" => Self::UpdateSuccessful,
            "UPDATE_FAILED" => Self::UpdateFailed,
            "DELETED" => Self::Deleted,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CreationInProgress => "CREATION_IN_PROGRESS",
            Self::CreationSuccessful => "CREATION_SUCCESSFUL",
            Self::CreationFailed => "CREATION_FAILED",
            Self::UpdateInProgress => "UPDATE_IN_PROGRESS",
            Self::UpdateSuccessful => "UPDATE_SUCCESSFUL",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::Deleted => "DELETED",
            Self::Unknown(value) => value,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::CreationSuccessful | Self::UpdateSuccessful)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CreationFailed | Self::UpdateFailed | Self::Deleted
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_failure()
    }

    /// False for statuses this crate has no name for, including a missing one
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
