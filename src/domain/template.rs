// Template domain model
//
// `TemplateDescription` doubles as the persisted template document, so its
// serialized field names follow the service's PascalCase JSON.
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::arn;
use super::dashboard::DatasetBinding;
use super::status::ResourceStatus;

/// Reference to a template version usable as a dashboard source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub account_id: String,
    pub template_id: String,
    pub arn: String,
    pub version_number: Option<i64>,
}

impl TemplateRef {
    /// Latest version of a template whose id is known but not yet described
    pub fn latest(region: &str, account_id: &str, template_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            template_id: template_id.to_string(),
            arn: arn::template_arn(region, account_id, template_id),
            version_number: None,
        }
    }
}

/// Template creation request sourced from an analysis
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRequest {
    pub template_id: String,
    pub name: String,
    pub source_analysis_arn: String,
    pub data_set_references: Vec<DatasetBinding>,
    pub version_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSubmission {
    pub arn: String,
    pub version_number: Option<i64>,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateDescription {
    pub arn: String,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_time: Option<DateTime<Utc>>,
    pub version: TemplateVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_number: Option<i64>,
    #[serde(serialize_with = "serialize_status")]
    pub status: ResourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_entity_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    pub data_set_configurations: Vec<DataSetConfiguration>,
    pub sheets: Vec<Sheet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResourceError>,
}

/// A dataset placeholder declared by the template, with the schema it expects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSetConfiguration {
    pub placeholder: String,
    pub data_set_schema: DataSetSchema,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSetSchema {
    pub column_schema_list: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sheet {
    pub sheet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceError {
    #[serde(rename = "Type")]
    pub kind: String,
    pub message: String,
}

fn serialize_status<S: serde::Serializer>(
    status: &ResourceStatus,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(status.as_str())
}

impl TemplateDescription {
    pub fn placeholders(&self) -> Vec<&str> {
        self.version
            .data_set_configurations
            .iter()
            .map(|config| config.placeholder.as_str())
            .collect()
    }

    pub fn to_ref(&self, account_id: &str) -> TemplateRef {
        TemplateRef {
            account_id: account_id.to_string(),
            template_id: self.template_id.clone(),
            arn: self.arn.clone(),
            version_number: self.version.version_number,
        }
    }

    /// Service-reported errors joined into one message
    pub fn failure_reason(&self) -> String {
        join_errors(&self.version.errors)
    }
}

pub(crate) fn join_errors(errors: &[ResourceError]) -> String {
    if errors.is_empty() {
        return "no error details reported".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.kind, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
