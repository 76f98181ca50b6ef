// QuickSightClient backed by the AWS SDK (QuickSight + STS)
use crate::application::quicksight_client::QuickSightClient;
use crate::domain::analysis::AnalysisDescription;
use crate::domain::arn;
use crate::domain::credentials::{AssumedRoleSession, ServiceContext};
use crate::domain::dashboard::{
    DashboardDescription, DashboardRequest, DashboardSubmission, DatasetBinding, PublishOptions,
    SheetControlsVisibility,
};
use crate::domain::error::{LifecycleError, Result};
use crate::domain::permission::PermissionGrant;
use crate::domain::status::ResourceStatus;
use crate::domain::template::{
    ColumnSchema, DataSetConfiguration, DataSetSchema, ResourceError, Sheet, TemplateDescription,
    TemplateRequest, TemplateSubmission, TemplateVersion,
};
use async_trait::async_trait;
use aws_sdk_quicksight::config::{Credentials, Region};
use aws_sdk_quicksight::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_quicksight::operation::create_dashboard::CreateDashboardError;
use aws_sdk_quicksight::operation::create_template::CreateTemplateError;
use aws_sdk_quicksight::primitives::DateTime as SdkDateTime;
use aws_sdk_quicksight::types::{
    AdHocFilteringOption, DashboardBehavior, DashboardPublishOptions, DashboardSourceEntity,
    DashboardSourceTemplate, DashboardUiState, DataSetReference, ExportToCsvOption,
    ResourcePermission, SheetControlsOption, TemplateSourceAnalysis, TemplateSourceEntity,
};
use chrono::{DateTime, Utc};
use std::time::SystemTime;

const CREDENTIALS_PROVIDER: &str = "assumed-role-session";

#[derive(Clone)]
pub struct AwsQuickSightClient {
    sdk_config: aws_config::SdkConfig,
}

impl std::fmt::Debug for AwsQuickSightClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsQuickSightClient")
            .field("region", &self.sdk_config.region())
            .finish()
    }
}

impl AwsQuickSightClient {
    /// Build from the default provider chain (environment, profile, instance role)
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(sdk_config)
    }

    pub fn new(sdk_config: aws_config::SdkConfig) -> Self {
        Self { sdk_config }
    }

    /// QuickSight client scoped to `ctx`: its region, and its assumed-role
    /// credentials when it carries a session
    fn quicksight(&self, ctx: &ServiceContext) -> aws_sdk_quicksight::Client {
        let mut builder = aws_sdk_quicksight::config::Builder::from(&self.sdk_config)
            .region(Region::new(ctx.region.clone()));
        if let Some(session) = ctx.session() {
            builder = builder.credentials_provider(session_credentials(session));
        }
        aws_sdk_quicksight::Client::from_conf(builder.build())
    }

    fn sts(&self, ctx: &ServiceContext) -> aws_sdk_sts::Client {
        let mut builder = aws_sdk_sts::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_sts::config::Region::new(ctx.region.clone()));
        if let Some(session) = ctx.session() {
            builder = builder.credentials_provider(session_credentials(session));
        }
        aws_sdk_sts::Client::from_conf(builder.build())
    }
}

fn session_credentials(session: &AssumedRoleSession) -> Credentials {
    Credentials::new(
        session.access_key_id.clone(),
        session.secret_access_key.clone(),
        Some(session.session_token.clone()),
        session.expiration.map(SystemTime::from),
        CREDENTIALS_PROVIDER,
    )
}

/// Service-reported code and message, or the full error chain for transport failures
fn error_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => match (service.code(), service.message()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.to_string(),
            _ => DisplayErrorContext(err).to_string(),
        },
        None => DisplayErrorContext(err).to_string(),
    }
}

fn service_error<E, R>(operation: &'static str) -> impl FnOnce(SdkError<E, R>) -> LifecycleError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    move |err| {
        let message = error_message(&err);
        tracing::error!("{} failed: {}", operation, message);
        LifecycleError::service(operation, message)
    }
}

fn build_error(operation: &'static str) -> impl FnOnce(BuildError) -> LifecycleError {
    move |err| LifecycleError::service(operation, format!("invalid request: {err}"))
}

fn missing(operation: &'static str, what: &str) -> LifecycleError {
    LifecycleError::service(operation, format!("response carried no {what}"))
}

fn to_chrono(value: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn status_of(status: Option<&aws_sdk_quicksight::types::ResourceStatus>) -> ResourceStatus {
    status
        .map(|s| ResourceStatus::from_service(s.as_str()))
        .unwrap_or_else(|| ResourceStatus::Unknown("UNREPORTED".to_string()))
}

fn data_set_references(
    operation: &'static str,
    bindings: impl Iterator<Item = DatasetBinding>,
) -> Result<Vec<DataSetReference>> {
    bindings
        .map(|binding| {
            DataSetReference::builder()
                .data_set_placeholder(binding.placeholder)
                .data_set_arn(binding.dataset_arn)
                .build()
                .map_err(build_error(operation))
        })
        .collect()
}

fn resource_permissions(
    operation: &'static str,
    grants: &[PermissionGrant],
) -> Result<Vec<ResourcePermission>> {
    grants
        .iter()
        .map(|grant| {
            ResourcePermission::builder()
                .principal(&grant.principal)
                .set_actions(Some(grant.actions.clone()))
                .build()
                .map_err(build_error(operation))
        })
        .collect()
}

fn availability(enabled: bool) -> DashboardBehavior {
    if enabled {
        DashboardBehavior::Enabled
    } else {
        DashboardBehavior::Disabled
    }
}

fn publish_options(options: &PublishOptions) -> DashboardPublishOptions {
    DashboardPublishOptions::builder()
        .set_ad_hoc_filtering_option(options.ad_hoc_filtering_enabled.map(|enabled| {
            AdHocFilteringOption::builder()
                .availability_status(availability(enabled))
                .build()
        }))
        .set_export_to_csv_option(options.export_to_csv_enabled.map(|enabled| {
            ExportToCsvOption::builder()
                .availability_status(availability(enabled))
                .build()
        }))
        .set_sheet_controls_option(options.sheet_controls_visibility.map(|visibility| {
            let state = match visibility {
                SheetControlsVisibility::Expanded => DashboardUiState::Expanded,
                SheetControlsVisibility::Collapsed => DashboardUiState::Collapsed,
            };
            SheetControlsOption::builder().visibility_state(state).build()
        }))
        .build()
}

fn dashboard_source(
    operation: &'static str,
    request: &DashboardRequest,
) -> Result<DashboardSourceEntity> {
    let references = data_set_references(operation, request.bindings.iter().cloned())?;
    let template = DashboardSourceTemplate::builder()
        .arn(&request.source_template_arn)
        .set_data_set_references(Some(references))
        .build()
        .map_err(build_error(operation))?;
    Ok(DashboardSourceEntity::builder()
        .source_template(template)
        .build())
}

fn template_source(operation: &'static str, request: &TemplateRequest) -> Result<TemplateSourceEntity> {
    let references =
        data_set_references(operation, request.data_set_references.iter().cloned())?;
    let source_analysis = TemplateSourceAnalysis::builder()
        .arn(&request.source_analysis_arn)
        .set_data_set_references(Some(references))
        .build()
        .map_err(build_error(operation))?;
    Ok(TemplateSourceEntity::builder()
        .source_analysis(source_analysis)
        .build())
}

fn template_submission(
    arn: Option<&str>,
    version_arn: Option<&str>,
    status: Option<&aws_sdk_quicksight::types::ResourceStatus>,
) -> TemplateSubmission {
    TemplateSubmission {
        arn: arn.unwrap_or_default().to_string(),
        version_number: version_arn.and_then(arn::version_number),
        status: status_of(status),
    }
}

fn submission(
    arn: Option<&str>,
    version_arn: Option<&str>,
    status: Option<&aws_sdk_quicksight::types::ResourceStatus>,
) -> DashboardSubmission {
    DashboardSubmission {
        arn: arn.unwrap_or_default().to_string(),
        version_number: version_arn.and_then(arn::version_number),
        status: status_of(status),
    }
}

fn template_version(version: Option<&aws_sdk_quicksight::types::TemplateVersion>) -> TemplateVersion {
    let Some(version) = version else {
        return TemplateVersion {
            version_number: None,
            status: ResourceStatus::Unknown("UNREPORTED".to_string()),
            description: None,
            source_entity_arn: None,
            created_time: None,
            data_set_configurations: vec![],
            sheets: vec![],
            errors: vec![],
        };
    };

    TemplateVersion {
        version_number: version.version_number(),
        status: status_of(version.status()),
        description: version.description().map(str::to_string),
        source_entity_arn: version.source_entity_arn().map(str::to_string),
        created_time: version.created_time().and_then(to_chrono),
        data_set_configurations: version
            .data_set_configurations()
            .iter()
            .map(|config| DataSetConfiguration {
                placeholder: config.placeholder().unwrap_or_default().to_string(),
                data_set_schema: DataSetSchema {
                    column_schema_list: config
                        .data_set_schema()
                        .map(|schema| {
                            schema
                                .column_schema_list()
                                .iter()
                                .map(|column| ColumnSchema {
                                    name: column.name().unwrap_or_default().to_string(),
                                    data_type: column.data_type().map(str::to_string),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                },
            })
            .collect(),
        sheets: version
            .sheets()
            .iter()
            .map(|sheet| Sheet {
                sheet_id: sheet.sheet_id().unwrap_or_default().to_string(),
                name: sheet.name().map(str::to_string),
            })
            .collect(),
        errors: version
            .errors()
            .iter()
            .map(|error| ResourceError {
                kind: error
                    .r#type()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_default(),
                message: error.message().unwrap_or_default().to_string(),
            })
            .collect(),
    }
}

#[async_trait]
impl QuickSightClient for AwsQuickSightClient {
    async fn describe_analysis(
        &self,
        ctx: &ServiceContext,
        analysis_id: &str,
    ) -> Result<AnalysisDescription> {
        const OPERATION: &str = "DescribeAnalysis";
        let output = self
            .quicksight(ctx)
            .describe_analysis()
            .aws_account_id(&ctx.account_id)
            .analysis_id(analysis_id)
            .send()
            .await
            .map_err(service_error(OPERATION))?;
        let analysis = output.analysis().ok_or_else(|| missing(OPERATION, "analysis"))?;

        Ok(AnalysisDescription {
            analysis_id: analysis.analysis_id().unwrap_or(analysis_id).to_string(),
            arn: analysis
                .arn()
                .map(str::to_string)
                .unwrap_or_else(|| arn::analysis_arn(&ctx.region, &ctx.account_id, analysis_id)),
            name: analysis.name().map(str::to_string),
            data_set_arns: analysis.data_set_arns().to_vec(),
        })
    }

    async fn create_template(
        &self,
        ctx: &ServiceContext,
        request: &TemplateRequest,
    ) -> Result<TemplateSubmission> {
        const OPERATION: &str = "CreateTemplate";
        let result = self
            .quicksight(ctx)
            .create_template()
            .aws_account_id(&ctx.account_id)
            .template_id(&request.template_id)
            .name(&request.name)
            .source_entity(template_source(OPERATION, request)?)
            .version_description(&request.version_description)
            .send()
            .await;

        match result {
            Ok(output) => Ok(template_submission(
                output.arn(),
                output.version_arn(),
                output.creation_status(),
            )),
            Err(err)
                if matches!(
                    err.as_service_error(),
                    Some(CreateTemplateError::ResourceExistsException(_))
                ) =>
            {
                Err(LifecycleError::AlreadyExists {
                    resource: format!("template {}", request.template_id),
                })
            }
            Err(err) => Err(service_error(OPERATION)(err)),
        }
    }

    async fn update_template(
        &self,
        ctx: &ServiceContext,
        request: &TemplateRequest,
    ) -> Result<TemplateSubmission> {
        const OPERATION: &str = "UpdateTemplate";
        let output = self
            .quicksight(ctx)
            .update_template()
            .aws_account_id(&ctx.account_id)
            .template_id(&request.template_id)
            .name(&request.name)
            .source_entity(template_source(OPERATION, request)?)
            .version_description(&request.version_description)
            .send()
            .await
            .map_err(service_error(OPERATION))?;

        Ok(template_submission(
            output.arn(),
            output.version_arn(),
            output.creation_status(),
        ))
    }

    async fn describe_template(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        version_number: Option<i64>,
    ) -> Result<TemplateDescription> {
        const OPERATION: &str = "DescribeTemplate";
        let output = self
            .quicksight(ctx)
            .describe_template()
            .aws_account_id(&ctx.account_id)
            .template_id(template_id)
            .set_version_number(version_number)
            .send()
            .await
            .map_err(service_error(OPERATION))?;
        let template = output.template().ok_or_else(|| missing(OPERATION, "template"))?;

        Ok(TemplateDescription {
            arn: template.arn().unwrap_or_default().to_string(),
            template_id: template.template_id().unwrap_or(template_id).to_string(),
            name: template.name().map(str::to_string),
            created_time: template.created_time().and_then(to_chrono),
            last_updated_time: template.last_updated_time().and_then(to_chrono),
            version: template_version(template.version()),
        })
    }

    async fn update_template_permissions(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        grants: &[PermissionGrant],
    ) -> Result<()> {
        const OPERATION: &str = "UpdateTemplatePermissions";
        self.quicksight(ctx)
            .update_template_permissions()
            .aws_account_id(&ctx.account_id)
            .template_id(template_id)
            .set_grant_permissions(Some(resource_permissions(OPERATION, grants)?))
            .send()
            .await
            .map_err(service_error(OPERATION))?;
        Ok(())
    }

    async fn create_dashboard(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardSubmission> {
        const OPERATION: &str = "CreateDashboard";
        let result = self
            .quicksight(ctx)
            .create_dashboard()
            .aws_account_id(&ctx.account_id)
            .dashboard_id(&request.dashboard_id)
            .name(&request.name)
            .set_permissions(Some(resource_permissions(OPERATION, &request.permissions)?))
            .source_entity(dashboard_source(OPERATION, request)?)
            .dashboard_publish_options(publish_options(&request.publish_options))
            .version_description(&request.version_description)
            .send()
            .await;

        match result {
            Ok(output) => Ok(submission(
                output.arn(),
                output.version_arn(),
                output.creation_status(),
            )),
            Err(err)
                if matches!(
                    err.as_service_error(),
                    Some(CreateDashboardError::ResourceExistsException(_))
                ) =>
            {
                Err(LifecycleError::AlreadyExists {
                    resource: format!("dashboard {}", request.dashboard_id),
                })
            }
            Err(err) => Err(service_error(OPERATION)(err)),
        }
    }

    async fn update_dashboard(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardSubmission> {
        const OPERATION: &str = "UpdateDashboard";
        let output = self
            .quicksight(ctx)
            .update_dashboard()
            .aws_account_id(&ctx.account_id)
            .dashboard_id(&request.dashboard_id)
            .name(&request.name)
            .source_entity(dashboard_source(OPERATION, request)?)
            .dashboard_publish_options(publish_options(&request.publish_options))
            .version_description(&request.version_description)
            .send()
            .await
            .map_err(service_error(OPERATION))?;

        Ok(submission(
            output.arn(),
            output.version_arn(),
            output.creation_status(),
        ))
    }

    async fn publish_dashboard_version(
        &self,
        ctx: &ServiceContext,
        dashboard_id: &str,
        version_number: i64,
    ) -> Result<()> {
        self.quicksight(ctx)
            .update_dashboard_published_version()
            .aws_account_id(&ctx.account_id)
            .dashboard_id(dashboard_id)
            .version_number(version_number)
            .send()
            .await
            .map_err(service_error("UpdateDashboardPublishedVersion"))?;
        Ok(())
    }

    async fn describe_dashboard(
        &self,
        ctx: &ServiceContext,
        dashboard_id: &str,
        version_number: Option<i64>,
    ) -> Result<DashboardDescription> {
        const OPERATION: &str = "DescribeDashboard";
        let output = self
            .quicksight(ctx)
            .describe_dashboard()
            .aws_account_id(&ctx.account_id)
            .dashboard_id(dashboard_id)
            .set_version_number(version_number)
            .send()
            .await
            .map_err(service_error(OPERATION))?;
        let dashboard = output.dashboard().ok_or_else(|| missing(OPERATION, "dashboard"))?;
        let version = dashboard.version();

        Ok(DashboardDescription {
            arn: dashboard.arn().unwrap_or_default().to_string(),
            dashboard_id: dashboard.dashboard_id().unwrap_or(dashboard_id).to_string(),
            version_number: version.and_then(|v| v.version_number()),
            status: status_of(version.and_then(|v| v.status())),
            errors: version
                .map(|v| {
                    v.errors()
                        .iter()
                        .map(|error| ResourceError {
                            kind: error
                                .r#type()
                                .map(|t| t.as_str().to_string())
                                .unwrap_or_default(),
                            message: error.message().unwrap_or_default().to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    async fn assume_role(
        &self,
        ctx: &ServiceContext,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedRoleSession> {
        let rejected = |reason: String| LifecycleError::RoleAssumptionFailed {
            role_arn: role_arn.to_string(),
            reason,
        };

        let output = self
            .sts(ctx)
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|err| rejected(error_message(&err)))?;
        let credentials = output
            .credentials()
            .ok_or_else(|| rejected("response carried no credentials".to_string()))?;

        tracing::info!("Assumed role {}", role_arn);
        Ok(AssumedRoleSession {
            role_arn: role_arn.to_string(),
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expiration: to_chrono(credentials.expiration()),
        })
    }
}
