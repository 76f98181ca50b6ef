// Scripted in-memory QuickSightClient that records every call
use crate::application::quicksight_client::QuickSightClient;
use crate::domain::analysis::AnalysisDescription;
use crate::domain::arn;
use crate::domain::credentials::{AssumedRoleSession, ServiceContext};
use crate::domain::dashboard::{DashboardDescription, DashboardRequest, DashboardSubmission};
use crate::domain::error::{LifecycleError, Result};
use crate::domain::permission::PermissionGrant;
use crate::domain::status::ResourceStatus;
use crate::domain::template::{
    DataSetConfiguration, DataSetSchema, TemplateDescription, TemplateRequest, TemplateSubmission,
    TemplateVersion,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// One recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: &'static str,
    pub account_id: String,
    pub assumed: bool,
}

pub struct FakeQuickSight {
    calls: Mutex<Vec<Call>>,
    placeholders: Vec<String>,
    analysis_datasets: Vec<String>,
    template_statuses: Mutex<VecDeque<ResourceStatus>>,
    dashboard_statuses: Mutex<VecDeque<ResourceStatus>>,
    template_versions: Mutex<HashMap<String, i64>>,
    existing_dashboards: Mutex<HashSet<String>>,
    dashboard_versions: Mutex<i64>,
    session_expiration: Option<DateTime<Utc>>,
    assume_role_error: Option<LifecycleError>,
    grant_error: Option<LifecycleError>,
    pub template_requests: Mutex<Vec<TemplateRequest>>,
    pub dashboard_requests: Mutex<Vec<DashboardRequest>>,
    pub grants: Mutex<Vec<PermissionGrant>>,
    pub published_versions: Mutex<Vec<i64>>,
}

impl FakeQuickSight {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            placeholders: vec!["ds1".to_string()],
            analysis_datasets: vec!["arn:aws:quicksight:us-east-1:111122223333:dataset/ds1".to_string()],
            template_statuses: Mutex::new(VecDeque::new()),
            dashboard_statuses: Mutex::new(VecDeque::new()),
            template_versions: Mutex::new(HashMap::new()),
            existing_dashboards: Mutex::new(HashSet::new()),
            dashboard_versions: Mutex::new(0),
            session_expiration: Some(Utc::now() + Duration::hours(1)),
            assume_role_error: None,
            grant_error: None,
            template_requests: Mutex::new(Vec::new()),
            dashboard_requests: Mutex::new(Vec::new()),
            grants: Mutex::new(Vec::new()),
            published_versions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_placeholders(mut self, placeholders: &[&str]) -> Self {
        self.placeholders = placeholders.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_analysis_datasets(mut self, datasets: &[&str]) -> Self {
        self.analysis_datasets = datasets.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Statuses returned by successive describe_template calls; the last one repeats
    pub fn with_template_statuses(self, statuses: &[ResourceStatus]) -> Self {
        *self.template_statuses.lock().unwrap() = statuses.iter().cloned().collect();
        self
    }

    /// Statuses returned by successive describe_dashboard calls; the last one repeats
    pub fn with_dashboard_statuses(self, statuses: &[ResourceStatus]) -> Self {
        *self.dashboard_statuses.lock().unwrap() = statuses.iter().cloned().collect();
        self
    }

    pub fn with_existing_dashboard(self, dashboard_id: &str) -> Self {
        self.existing_dashboards
            .lock()
            .unwrap()
            .insert(dashboard_id.to_string());
        *self.dashboard_versions.lock().unwrap() = 1;
        self
    }

    pub fn with_session_expiration(mut self, expiration: Option<DateTime<Utc>>) -> Self {
        self.session_expiration = expiration;
        self
    }

    pub fn failing_assume_role(mut self, reason: &str) -> Self {
        self.assume_role_error = Some(LifecycleError::RoleAssumptionFailed {
            role_arn: "arn:aws:iam::444455556666:role/qs".to_string(),
            reason: reason.to_string(),
        });
        self
    }

    pub fn failing_grant(mut self, message: &str) -> Self {
        self.grant_error = Some(LifecycleError::service("UpdateTemplatePermissions", message));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.operation).collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.operation == operation).count()
    }

    fn record(&self, operation: &'static str, ctx: &ServiceContext) {
        self.calls.lock().unwrap().push(Call {
            operation,
            account_id: ctx.account_id.clone(),
            assumed: ctx.session().is_some(),
        });
    }

    fn next_status(queue: &Mutex<VecDeque<ResourceStatus>>) -> ResourceStatus {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or(ResourceStatus::CreationSuccessful)
        }
    }

    fn submit_dashboard(&self, ctx: &ServiceContext, request: &DashboardRequest) -> DashboardSubmission {
        self.dashboard_requests.lock().unwrap().push(request.clone());
        let mut versions = self.dashboard_versions.lock().unwrap();
        *versions += 1;
        DashboardSubmission {
            arn: dashboard_arn(ctx, &request.dashboard_id),
            version_number: Some(*versions),
            status: ResourceStatus::CreationInProgress,
        }
    }
}

fn dashboard_arn(ctx: &ServiceContext, dashboard_id: &str) -> String {
    format!(
        "arn:aws:quicksight:{}:{}:dashboard/{}",
        ctx.region, ctx.account_id, dashboard_id
    )
}

#[async_trait]
impl QuickSightClient for FakeQuickSight {
    async fn describe_analysis(
        &self,
        ctx: &ServiceContext,
        analysis_id: &str,
    ) -> Result<AnalysisDescription> {
        self.record("DescribeAnalysis", ctx);
        Ok(AnalysisDescription {
            analysis_id: analysis_id.to_string(),
            arn: arn::analysis_arn(&ctx.region, &ctx.account_id, analysis_id),
            name: Some(analysis_id.to_string()),
            data_set_arns: self.analysis_datasets.clone(),
        })
    }

    async fn create_template(
        &self,
        ctx: &ServiceContext,
        request: &TemplateRequest,
    ) -> Result<TemplateSubmission> {
        self.record("CreateTemplate", ctx);
        let mut versions = self.template_versions.lock().unwrap();
        if versions.contains_key(&request.template_id) {
            return Err(LifecycleError::AlreadyExists {
                resource: format!("template {}", request.template_id),
            });
        }
        versions.insert(request.template_id.clone(), 1);
        self.template_requests.lock().unwrap().push(request.clone());
        Ok(TemplateSubmission {
            arn: arn::template_arn(&ctx.region, &ctx.account_id, &request.template_id),
            version_number: Some(1),
            status: ResourceStatus::CreationInProgress,
        })
    }

    async fn update_template(
        &self,
        ctx: &ServiceContext,
        request: &TemplateRequest,
    ) -> Result<TemplateSubmission> {
        self.record("UpdateTemplate", ctx);
        let mut versions = self.template_versions.lock().unwrap();
        let version = versions.entry(request.template_id.clone()).or_insert(0);
        *version += 1;
        self.template_requests.lock().unwrap().push(request.clone());
        Ok(TemplateSubmission {
            arn: arn::template_arn(&ctx.region, &ctx.account_id, &request.template_id),
            version_number: Some(*version),
            status: ResourceStatus::CreationInProgress,
        })
    }

    async fn describe_template(
        &self,
        ctx: &ServiceContext,
        template_id: &str,
        version_number: Option<i64>,
    ) -> Result<TemplateDescription> {
        self.record("DescribeTemplate", ctx);
        let latest = self.template_versions.lock().unwrap().get(template_id).copied();
        Ok(TemplateDescription {
            arn: arn::template_arn(&ctx.region, &ctx.account_id, template_id),
            template_id: template_id.to_string(),
            name: Some(template_id.to_string()),
            created_time: None,
            last_updated_time: None,
            version: TemplateVersion {
                version_number: version_number.or(latest).or(Some(1)),
                status: Self::next_status(&self.template_statuses),
                description: None,
                source_entity_arn: None,
                created_time: None,
                data_set_configurations: self
                    .placeholders
                    .iter()
                    .map(|p| DataSetConfiguration {
                        placeholder: p.clone(),
                        data_set_schema: DataSetSchema::default(),
                    })
                    .collect(),
                sheets: vec![],
                errors: vec![],
            },
        })
    }

    async fn update_template_permissions(
        &self,
        ctx: &ServiceContext,
        _template_id: &str,
        grants: &[PermissionGrant],
    ) -> Result<()> {
        self.record("UpdateTemplatePermissions", ctx);
        if let Some(err) = &self.grant_error {
            return Err(err.clone());
        }
        self.grants.lock().unwrap().extend_from_slice(grants);
        Ok(())
    }

    async fn create_dashboard(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardSubmission> {
        self.record("CreateDashboard", ctx);
        if !self
            .existing_dashboards
            .lock()
            .unwrap()
            .insert(request.dashboard_id.clone())
        {
            return Err(LifecycleError::AlreadyExists {
                resource: format!("dashboard {}", request.dashboard_id),
            });
        }
        Ok(self.submit_dashboard(ctx, request))
    }

    async fn update_dashboard(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardSubmission> {
        self.record("UpdateDashboard", ctx);
        Ok(self.submit_dashboard(ctx, request))
    }

    async fn publish_dashboard_version(
        &self,
        ctx: &ServiceContext,
        _dashboard_id: &str,
        version_number: i64,
    ) -> Result<()> {
        self.record("UpdateDashboardPublishedVersion", ctx);
        self.published_versions.lock().unwrap().push(version_number);
        Ok(())
    }

    async fn describe_dashboard(
        &self,
        ctx: &ServiceContext,
        dashboard_id: &str,
        version_number: Option<i64>,
    ) -> Result<DashboardDescription> {
        self.record("DescribeDashboard", ctx);
        Ok(DashboardDescription {
            arn: dashboard_arn(ctx, dashboard_id),
            dashboard_id: dashboard_id.to_string(),
            version_number,
            status: Self::next_status(&self.dashboard_statuses),
            errors: vec![],
        })
    }

    async fn assume_role(
        &self,
        ctx: &ServiceContext,
        role_arn: &str,
        _session_name: &str,
    ) -> Result<AssumedRoleSession> {
        self.record("AssumeRole", ctx);
        if let Some(err) = &self.assume_role_error {
            return Err(err.clone());
        }
        Ok(AssumedRoleSession {
            role_arn: role_arn.to_string(),
            access_key_id: "ASIAFAKE".to_string(),
            secret_access_key: "fake-secret".to_string(),
            session_token: "fake-token".to_string(),
            expiration: self.session_expiration,
        })
    }
}
