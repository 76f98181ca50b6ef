// Cross-account replicator - Deploy a source template as a dashboard in another account
//
// Stages run strictly in order: AssumeRole, GrantTemplatePermission,
// ResolveBindings, CreateDashboard. The first failure ends the run. Nothing done by
// earlier stages is undone; the failure lists those stages so the leftovers
// (a template permission grant, at most) can be audited.
use crate::application::dashboard_instantiator::{DashboardInstantiator, DashboardPlan};
use crate::application::placeholder_resolver::{DatasetTarget, PlaceholderResolver};
use crate::application::quicksight_client::QuickSightClient;
use crate::domain::credentials::{AssumedRoleSession, ServiceContext};
use crate::domain::dashboard::{BindingTable, DashboardRef};
use crate::domain::dataset::DatasetMap;
use crate::domain::error::{LifecycleError, Result};
use crate::domain::permission::PermissionGrant;
use crate::domain::template::TemplateRef;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const ROLE_SESSION_NAME: &str = "QuickSightSession";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationStage {
    AssumeRole,
    GrantTemplatePermission,
    ResolveBindings,
    CreateDashboard,
}

impl fmt::Display for ReplicationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AssumeRole => "AssumeRole",
            Self::GrantTemplatePermission => "GrantTemplatePermission",
            Self::ResolveBindings => "ResolveBindings",
            Self::CreateDashboard => "CreateDashboard",
        };
        f.write_str(name)
    }
}

/// The first failing stage, its error verbatim, and the stages left in place
#[derive(Error, Debug, Clone, PartialEq)]
#[error("replication failed at {stage}: {error}{}", left_in_place(.completed))]
pub struct ReplicationFailure {
    pub stage: ReplicationStage,
    pub completed: Vec<ReplicationStage>,
    #[source]
    pub error: LifecycleError,
}

fn left_in_place(completed: &[ReplicationStage]) -> String {
    if completed.is_empty() {
        return String::new();
    }
    let stages: Vec<String> = completed.iter().map(|s| s.to_string()).collect();
    format!(" (completed, not rolled back: {})", stages.join(", "))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationRequest {
    /// Source account context (ambient credentials)
    pub source: ServiceContext,
    pub template_id: String,
    pub target_account_id: String,
    pub target_region: String,
    pub target_role_arn: String,
    pub datasets: DatasetMap,
    pub dashboard: DashboardPlan,
}

/// Completed stages of one run
#[derive(Default)]
struct StageLog {
    completed: Vec<ReplicationStage>,
}

impl StageLog {
    fn record<T>(
        &mut self,
        stage: ReplicationStage,
        result: Result<T>,
    ) -> std::result::Result<T, ReplicationFailure> {
        match result {
            Ok(value) => {
                tracing::info!("Stage {} completed", stage);
                self.completed.push(stage);
                Ok(value)
            }
            Err(error) => {
                tracing::error!(
                    "Stage {} failed: {} (left in place: {:?})",
                    stage,
                    error,
                    self.completed
                );
                Err(ReplicationFailure {
                    stage,
                    completed: self.completed.clone(),
                    error,
                })
            }
        }
    }
}

#[derive(Clone)]
pub struct CrossAccountReplicator {
    client: Arc<dyn QuickSightClient>,
    resolver: PlaceholderResolver,
    instantiator: DashboardInstantiator,
}

impl CrossAccountReplicator {
    pub fn new(
        client: Arc<dyn QuickSightClient>,
        resolver: PlaceholderResolver,
        instantiator: DashboardInstantiator,
    ) -> Self {
        Self {
            client,
            resolver,
            instantiator,
        }
    }

    pub async fn replicate(
        &self,
        request: &ReplicationRequest,
    ) -> std::result::Result<DashboardRef, ReplicationFailure> {
        let mut log = StageLog::default();
        let template = TemplateRef::latest(
            &request.source.region,
            &request.source.account_id,
            &request.template_id,
        );

        let session = log.record(ReplicationStage::AssumeRole, self.assume_role(request).await)?;

        log.record(
            ReplicationStage::GrantTemplatePermission,
            self.grant_template_permission(request).await,
        )?;

        let bindings = log.record(
            ReplicationStage::ResolveBindings,
            self.resolve_bindings(request, &template).await,
        )?;

        let target = ServiceContext::assumed(
            request.target_account_id.clone(),
            request.target_region.clone(),
            session,
        );
        let dashboard = log.record(
            ReplicationStage::CreateDashboard,
            self.create_dashboard(&target, request, &template, &bindings)
                .await,
        )?;

        tracing::info!("Replicated template {} as {}", template.arn, dashboard.arn);
        Ok(dashboard)
    }

    async fn assume_role(&self, request: &ReplicationRequest) -> Result<AssumedRoleSession> {
        tracing::info!("Assuming role {}", request.target_role_arn);
        self.client
            .assume_role(&request.source, &request.target_role_arn, ROLE_SESSION_NAME)
            .await
            .map_err(|e| match e {
                LifecycleError::RoleAssumptionFailed { .. } => e,
                other => LifecycleError::RoleAssumptionFailed {
                    role_arn: request.target_role_arn.clone(),
                    reason: other.to_string(),
                },
            })
    }

    async fn grant_template_permission(&self, request: &ReplicationRequest) -> Result<()> {
        let grant = PermissionGrant::template_consumer(&request.target_account_id);
        tracing::info!(
            "Granting {} on template {} to {}",
            grant.actions.join(", "),
            request.template_id,
            grant.principal
        );
        self.client
            .update_template_permissions(&request.source, &request.template_id, &[grant])
            .await
    }

    async fn resolve_bindings(
        &self,
        request: &ReplicationRequest,
        template: &TemplateRef,
    ) -> Result<BindingTable> {
        let target = DatasetTarget {
            account_id: request.target_account_id.clone(),
            region: request.target_region.clone(),
        };
        self.resolver
            .resolve_bindings(&request.source, template, &request.datasets, &target)
            .await
    }

    async fn create_dashboard(
        &self,
        target: &ServiceContext,
        request: &ReplicationRequest,
        template: &TemplateRef,
        bindings: &BindingTable,
    ) -> Result<DashboardRef> {
        if let Some(session) = target.session() {
            if session.is_expired(Utc::now()) {
                return Err(LifecycleError::RoleAssumptionFailed {
                    role_arn: session.role_arn.clone(),
                    reason: "assumed-role session expired before dashboard creation".to_string(),
                });
            }
        }
        self.instantiator
            .create_or_update_dashboard(target, &request.dashboard, template, bindings)
            .await
    }
}
