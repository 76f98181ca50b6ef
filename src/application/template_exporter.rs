// Template exporter - Snapshot an analysis into a template and persist its definition
use crate::application::poller::{poll_until_terminal, PollPolicy};
use crate::application::quicksight_client::QuickSightClient;
use crate::application::template_archive::TemplateArchive;
use crate::domain::credentials::ServiceContext;
use crate::domain::error::{LifecycleError, Result};
use crate::domain::status::ResourceStatus;
use crate::domain::template::{TemplateDescription, TemplateRef, TemplateRequest};
use std::path::PathBuf;
use std::sync::Arc;

const VERSION_DESCRIPTION: &str = "Created from analysis";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTemplate {
    pub template: TemplateRef,
    pub description: TemplateDescription,
    /// Set when an archive is configured and the write succeeded
    pub archived_to: Option<PathBuf>,
}

#[derive(Clone)]
pub struct TemplateExporter {
    client: Arc<dyn QuickSightClient>,
    poll: PollPolicy,
    archive: Option<Arc<dyn TemplateArchive>>,
}

impl TemplateExporter {
    pub fn new(client: Arc<dyn QuickSightClient>, poll: PollPolicy) -> Self {
        Self {
            client,
            poll,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn TemplateArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Create a new template version from `analysis_id` and wait until it is durable.
    ///
    /// An existing `template_id` gets the analysis as its next version.
    pub async fn export_template(
        &self,
        ctx: &ServiceContext,
        analysis_id: &str,
        template_id: &str,
    ) -> Result<ExportedTemplate> {
        let analysis = self.client.describe_analysis(ctx, analysis_id).await?;
        let data_set_references = analysis.data_set_references();
        if data_set_references.is_empty() {
            return Err(LifecycleError::RemoteOperationFailed {
                resource: format!("analysis {analysis_id}"),
                status: ResourceStatus::Unknown("NO_DATASETS".to_string()),
                reason: "analysis does not reference any dataset".to_string(),
            });
        }

        tracing::info!(
            "Creating template {} from analysis {} with {} dataset reference(s)",
            template_id,
            analysis.name.as_deref().unwrap_or(&analysis.analysis_id),
            data_set_references.len()
        );

        let request = TemplateRequest {
            template_id: template_id.to_string(),
            name: template_id.to_string(),
            source_analysis_arn: analysis.arn.clone(),
            data_set_references,
            version_description: VERSION_DESCRIPTION.to_string(),
        };
        let submission = match self.client.create_template(ctx, &request).await {
            Err(LifecycleError::AlreadyExists { .. }) => {
                tracing::info!("Template {} exists, adding a new version", template_id);
                self.client.update_template(ctx, &request).await?
            }
            other => other?,
        };
        tracing::info!(
            "Template {} submitted (version {:?}, {})",
            submission.arn,
            submission.version_number,
            submission.status
        );

        let description = self
            .wait_for_template(ctx, template_id, submission.version_number)
            .await?;

        let archived_to = match &self.archive {
            Some(archive) => match archive.store(&description) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Template {} created but not archived: {}", template_id, e);
                    None
                }
            },
            None => None,
        };

        Ok(ExportedTemplate {
            template: description.to_ref(&ctx.account_id),
            description,
            archived_to,
        })
    }

    /// Describe a template version (latest when `version_number` is `None`) and
    /// write its document to `archive`
    pub async fn save_template(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        version_number: Option<i64>,
        archive: &dyn TemplateArchive,
    ) -> Result<PathBuf> {
        let description = self
            .client
            .describe_template(ctx, template_id, version_number)
            .await?;
        tracing::debug!(
            "Describe template {} version {:?}: {}",
            template_id,
            description.version.version_number,
            description.version.status
        );
        archive.store(&description)
    }

    async fn wait_for_template(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        version_number: Option<i64>,
    ) -> Result<TemplateDescription> {
        let resource = format!("template {template_id}");
        poll_until_terminal(self.poll, &resource, || {
            self.client.describe_template(ctx, template_id, version_number)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_client::FakeQuickSight;
    use std::sync::Mutex;
    use std::time::Duration;

    fn ctx() -> ServiceContext {
        ServiceContext::ambient("111122223333", "us-east-1")
    }

    fn poll() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(1),
            max_attempts: 5,
        }
    }

    #[derive(Default)]
    struct MemoryArchive {
        stored: Mutex<Vec<String>>,
        fail: bool,
    }

    impl TemplateArchive for MemoryArchive {
        fn store(&self, template: &TemplateDescription) -> Result<PathBuf> {
            if self.fail {
                return Err(LifecycleError::Archive("disk full".to_string()));
            }
            self.stored.lock().unwrap().push(template.template_id.clone());
            Ok(PathBuf::from(format!("{}.json", template.template_id)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_succeeds_after_three_polls() {
        let client = Arc::new(FakeQuickSight::new().with_template_statuses(&[
            ResourceStatus::CreationInProgress,
            ResourceStatus::CreationInProgress,
            ResourceStatus::CreationSuccessful,
        ]));
        let exporter = TemplateExporter::new(client.clone(), poll());

        let exported = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap();

        assert_eq!(client.count("DescribeTemplate"), 3);
        assert_eq!(
            client.operations(),
            vec![
                "DescribeAnalysis",
                "CreateTemplate",
                "DescribeTemplate",
                "DescribeTemplate",
                "DescribeTemplate"
            ]
        );
        assert_eq!(exported.template.template_id, "tmpl-1");
        assert_eq!(exported.template.account_id, "111122223333");
        assert_eq!(exported.template.version_number, Some(1));
        assert_eq!(exported.archived_to, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reexport_adds_a_template_version() {
        let client = Arc::new(FakeQuickSight::new());
        let exporter = TemplateExporter::new(client.clone(), poll());

        let first = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap();
        let second = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap();

        assert_eq!(first.template.version_number, Some(1));
        assert_eq!(second.template.version_number, Some(2));
        assert_eq!(
            client.operations(),
            vec![
                "DescribeAnalysis",
                "CreateTemplate",
                "DescribeTemplate",
                "DescribeAnalysis",
                "CreateTemplate",
                "UpdateTemplate",
                "DescribeTemplate"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_request_references_analysis_datasets() {
        let client = Arc::new(FakeQuickSight::new().with_analysis_datasets(&[
            "arn:aws:quicksight:us-east-1:111122223333:dataset/orders",
            "arn:aws:quicksight:us-east-1:111122223333:dataset/customers",
        ]));
        let exporter = TemplateExporter::new(client.clone(), poll());

        exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap();

        let requests = client.template_requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(
            request.source_analysis_arn,
            "arn:aws:quicksight:us-east-1:111122223333:analysis/sales-analysis"
        );
        assert_eq!(request.name, "tmpl-1");
        let placeholders: Vec<&str> = request
            .data_set_references
            .iter()
            .map(|r| r.placeholder.as_str())
            .collect();
        assert_eq!(placeholders, vec!["orders", "customers"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_fails_on_creation_failed() {
        let client = Arc::new(FakeQuickSight::new().with_template_statuses(&[
            ResourceStatus::CreationInProgress,
            ResourceStatus::CreationFailed,
        ]));
        let exporter = TemplateExporter::new(client.clone(), poll());

        let err = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::RemoteOperationFailed { status: ResourceStatus::CreationFailed, .. }
        ));
        assert_eq!(client.count("DescribeTemplate"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_times_out() {
        let client = Arc::new(
            FakeQuickSight::new().with_template_statuses(&[ResourceStatus::CreationInProgress]),
        );
        let exporter = TemplateExporter::new(client.clone(), poll());

        let err = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LifecycleError::PollingTimeout {
                resource: "template tmpl-1".to_string(),
                attempts: 5,
            }
        );
    }

    #[tokio::test]
    async fn test_export_rejects_analysis_without_datasets() {
        let client = Arc::new(FakeQuickSight::new().with_analysis_datasets(&[]));
        let exporter = TemplateExporter::new(client.clone(), poll());

        let err = exporter
            .export_template(&ctx(), "empty", "tmpl-1")
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::RemoteOperationFailed { .. }));
        assert_eq!(client.count("CreateTemplate"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_archives_when_configured() {
        let client = Arc::new(FakeQuickSight::new());
        let archive = Arc::new(MemoryArchive::default());
        let exporter = TemplateExporter::new(client, poll()).with_archive(archive.clone());

        let exported = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap();

        assert_eq!(exported.archived_to, Some(PathBuf::from("tmpl-1.json")));
        assert_eq!(*archive.stored.lock().unwrap(), vec!["tmpl-1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_archive_failure_does_not_fail_export() {
        let client = Arc::new(FakeQuickSight::new());
        let archive = Arc::new(MemoryArchive {
            fail: true,
            ..Default::default()
        });
        let exporter = TemplateExporter::new(client, poll()).with_archive(archive);

        let exported = exporter
            .export_template(&ctx(), "sales-analysis", "tmpl-1")
            .await
            .unwrap();

        assert_eq!(exported.archived_to, None);
    }

    #[tokio::test]
    async fn test_save_template_describes_requested_version() {
        let client = Arc::new(FakeQuickSight::new());
        let archive = MemoryArchive::default();
        let exporter = TemplateExporter::new(client.clone(), poll());

        let path = exporter
            .save_template(&ctx(), "tmpl-1", Some(1), &archive)
            .await
            .unwrap();

        assert_eq!(path, PathBuf::from("tmpl-1.json"));
        assert_eq!(client.operations(), vec!["DescribeTemplate"]);
    }
}
