// Placeholder resolver - Bind template dataset placeholders to concrete datasets
use crate::application::quicksight_client::QuickSightClient;
use crate::domain::arn;
use crate::domain::credentials::ServiceContext;
use crate::domain::dashboard::{BindingTable, DatasetBinding};
use crate::domain::dataset::DatasetMap;
use crate::domain::error::{LifecycleError, Result};
use crate::domain::template::TemplateRef;
use std::sync::Arc;

/// Account and region dataset identifiers are qualified against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTarget {
    pub account_id: String,
    pub region: String,
}

/// Bind each declared placeholder, in declaration order.
///
/// Every placeholder must resolve through `datasets`; all that don't are
/// reported together. Explicit entries for undeclared placeholders are ignored.
pub fn bind_placeholders(
    placeholders: &[&str],
    datasets: &DatasetMap,
    target: &DatasetTarget,
) -> Result<BindingTable> {
    let mut bindings = Vec::with_capacity(placeholders.len());
    let mut missing = Vec::new();

    for placeholder in placeholders {
        match datasets.lookup(placeholder) {
            Some(dataset) => bindings.push(DatasetBinding {
                placeholder: placeholder.to_string(),
                dataset_arn: arn::dataset_arn(&target.region, &target.account_id, dataset),
            }),
            None => missing.push(placeholder.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(LifecycleError::UnresolvedPlaceholder { missing });
    }

    for unused in datasets
        .explicit_placeholders()
        .filter(|p| !placeholders.contains(p))
    {
        tracing::warn!("Dataset mapping for unknown placeholder {} ignored", unused);
    }

    Ok(BindingTable::new(bindings))
}

#[derive(Clone)]
pub struct PlaceholderResolver {
    client: Arc<dyn QuickSightClient>,
}

impl PlaceholderResolver {
    pub fn new(client: Arc<dyn QuickSightClient>) -> Self {
        Self { client }
    }

    /// Enumerate the template's placeholders (read with `source` credentials)
    /// and bind each one to a dataset in `target`
    pub async fn resolve_bindings(
        &self,
        source: &ServiceContext,
        template: &TemplateRef,
        datasets: &DatasetMap,
        target: &DatasetTarget,
    ) -> Result<BindingTable> {
        let description = self
            .client
            .describe_template(source, &template.template_id, template.version_number)
            .await?;
        let placeholders = description.placeholders();
        if placeholders.is_empty() {
            return Err(LifecycleError::RemoteOperationFailed {
                resource: format!("template {}", template.template_id),
                status: description.version.status.clone(),
                reason: "template does not declare any dataset placeholder".to_string(),
            });
        }

        let bindings = bind_placeholders(&placeholders, datasets, target)?;
        for binding in bindings.iter() {
            tracing::info!(
                "Mapping dataset placeholder '{}' to {}",
                binding.placeholder,
                binding.dataset_arn
            );
        }
        Ok(bindings)
    }
}
