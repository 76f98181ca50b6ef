// Capability set of the remote BI service, one method per remote call
use crate::domain::analysis::AnalysisDescription;
use crate::domain::credentials::{AssumedRoleSession, ServiceContext};
use crate::domain::dashboard::{DashboardDescription, DashboardRequest, DashboardSubmission};
use crate::domain::error::Result;
use crate::domain::permission::PermissionGrant;
use crate::domain::template::{TemplateDescription, TemplateRequest, TemplateSubmission};
use async_trait::async_trait;

/// Every call runs under the account, region and credentials of `ctx`.
///
/// Implementations report a duplicate id on `create_template` and
/// `create_dashboard` as `LifecycleError::AlreadyExists`, and a rejected role
/// assumption as `LifecycleError::RoleAssumptionFailed`.
#[async_trait]
pub trait QuickSightClient: Send + Sync {
    async fn describe_analysis(
        &self,
        ctx: &ServiceContext,
        analysis_id: &str,
    ) -> Result<AnalysisDescription>;

    async fn create_template(
        &self,
        ctx: &ServiceContext,
        request: &TemplateRequest,
    ) -> Result<TemplateSubmission>;

    /// Add a new version to an existing template
    async fn update_template(
        &self,
        ctx: &ServiceContext,
        request: &TemplateRequest,
    ) -> Result<TemplateSubmission>;

    /// Describe a template version, or the latest one when `version_number` is `None`
    async fn describe_template(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        version_number: Option<i64>,
    ) -> Result<TemplateDescription>;

    async fn update_template_permissions(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        grants: &[PermissionGrant],
    ) -> Result<()>;

    async fn create_dashboard(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardSubmission>;

    async fn update_dashboard(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardSubmission>;

    async fn publish_dashboard_version(
        &self,
        ctx: &ServiceContext,
        dashboard_id: &str,
        version_number: i64,
    ) -> Result<()>;

    async fn describe_dashboard(
        &self,
        ctx: &ServiceContext,
        dashboard_id: &str,
        version_number: Option<i64>,
    ) -> Result<DashboardDescription>;

    /// Assume `role_arn` using the credentials of `ctx`
    async fn assume_role(
        &self,
        ctx: &ServiceContext,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedRoleSession>;
}
