// Analysis domain model
use super::arn;
use super::dashboard::DatasetBinding;

/// Source analysis; read-only input to template export
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDescription {
    pub analysis_id: String,
    pub arn: String,
    pub name: Option<String>,
    pub data_set_arns: Vec<String>,
}

impl AnalysisDescription {
    /// One reference per dataset, named after the dataset's resource id
    pub fn data_set_references(&self) -> Vec<DatasetBinding> {
        self.data_set_arns
            .iter()
            .map(|dataset_arn| DatasetBinding {
                placeholder: arn::resource_name(dataset_arn).to_string(),
                dataset_arn: dataset_arn.clone(),
            })
            .collect()
    }
}
