// Dashboard domain model
use std::fmt;
use std::str::FromStr;

use super::error::LifecycleError;
use super::permission::PermissionGrant;
use super::status::ResourceStatus;
use super::template::{join_errors, ResourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetControlsVisibility {
    Expanded,
    Collapsed,
}

impl FromStr for SheetControlsVisibility {
    type Err = LifecycleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "EXPANDED" => Ok(Self::Expanded),
            "COLLAPSED" => Ok(Self::Collapsed),
            _ => Err(LifecycleError::InvalidConfiguration {
                key: "SHEET_CONTROLS_VISIBILITY",
                value: value.to_string(),
            }),
        }
    }
}

/// Publish options for a dashboard; `None` leaves the service default in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub ad_hoc_filtering_enabled: Option<bool>,
    pub export_to_csv_enabled: Option<bool>,
    pub sheet_controls_visibility: Option<SheetControlsVisibility>,
}

impl PublishOptions {
    /// Everything switched on with sheet controls expanded
    pub fn interactive() -> Self {
        Self {
            ad_hoc_filtering_enabled: Some(true),
            export_to_csv_enabled: Some(true),
            sheet_controls_visibility: Some(SheetControlsVisibility::Expanded),
        }
    }
}

/// One placeholder bound to a concrete dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetBinding {
    pub placeholder: String,
    pub dataset_arn: String,
}

/// Bindings in template declaration order, one per placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<DatasetBinding>,
}

impl BindingTable {
    pub fn new(bindings: Vec<DatasetBinding>) -> Self {
        Self { bindings }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.placeholder == placeholder)
            .map(|b| b.dataset_arn.as_str())
    }
}

impl fmt::Display for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .bindings
            .iter()
            .map(|b| format!("{} -> {}", b.placeholder, b.dataset_arn))
            .collect();
        f.write_str(&pairs.join(", "))
    }
}

/// Everything a create or update request carries
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub dashboard_id: String,
    pub name: String,
    pub source_template_arn: String,
    pub bindings: BindingTable,
    pub publish_options: PublishOptions,
    /// Applied on creation only; updates keep existing permissions
    pub permissions: Vec<PermissionGrant>,
    pub version_description: String,
}

/// What the service acknowledged for a create or update request
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSubmission {
    pub arn: String,
    pub version_number: Option<i64>,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDescription {
    pub arn: String,
    pub dashboard_id: String,
    pub version_number: Option<i64>,
    pub status: ResourceStatus,
    pub errors: Vec<ResourceError>,
}

impl DashboardDescription {
    pub fn failure_reason(&self) -> String {
        join_errors(&self.errors)
    }
}

/// A deployed dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRef {
    pub account_id: String,
    pub dashboard_id: String,
    pub arn: String,
    pub url: String,
}
