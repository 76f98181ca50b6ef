// Dashboard instantiator - Create or update a dashboard from a template
use crate::application::poller::{poll_until_terminal, PollPolicy};
use crate::application::quicksight_client::QuickSightClient;
use crate::domain::arn;
use crate::domain::credentials::ServiceContext;
use crate::domain::dashboard::{
    BindingTable, DashboardDescription, DashboardRef, DashboardRequest, PublishOptions,
};
use crate::domain::error::{LifecycleError, Result};
use crate::domain::permission::PermissionGrant;
use crate::domain::template::TemplateRef;
use std::sync::Arc;

const VERSION_DESCRIPTION: &str = "Initial version";

/// Identity and presentation of the dashboard to deploy
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPlan {
    pub dashboard_id: String,
    pub name: String,
    pub publish_options: PublishOptions,
}

#[derive(Clone)]
pub struct DashboardInstantiator {
    client: Arc<dyn QuickSightClient>,
    poll: PollPolicy,
}

impl DashboardInstantiator {
    pub fn new(client: Arc<dyn QuickSightClient>, poll: PollPolicy) -> Self {
        Self { client, poll }
    }

    /// Create the dashboard in `ctx`'s account, or update it when the id is taken.
    ///
    /// An update publishes the new version once it is durable, so re-running with
    /// the same inputs converges on the same dashboard.
    pub async fn create_or_update_dashboard(
        &self,
        ctx: &ServiceContext,
        plan: &DashboardPlan,
        template: &TemplateRef,
        bindings: &BindingTable,
    ) -> Result<DashboardRef> {
        let request = DashboardRequest {
            dashboard_id: plan.dashboard_id.clone(),
            name: plan.name.clone(),
            source_template_arn: template.arn.clone(),
            bindings: bindings.clone(),
            publish_options: plan.publish_options.clone(),
            permissions: vec![PermissionGrant::dashboard_viewers(&ctx.region, &ctx.account_id)],
            version_description: VERSION_DESCRIPTION.to_string(),
        };

        if bindings.is_empty() {
            tracing::warn!("Dashboard {} has no dataset references", plan.dashboard_id);
        }
        tracing::info!(
            "Creating dashboard {} in account {} with {} dataset reference(s) [{}]",
            plan.dashboard_id,
            ctx.account_id,
            bindings.len(),
            bindings
        );

        let described = match self.client.create_dashboard(ctx, &request).await {
            Ok(submission) => {
                tracing::debug!("Dashboard {} submitted ({})", submission.arn, submission.status);
                self.wait_for_dashboard(ctx, &plan.dashboard_id, submission.version_number)
                    .await?
            }
            Err(LifecycleError::AlreadyExists { .. }) => {
                tracing::info!("Dashboard {} exists, updating it instead", plan.dashboard_id);
                self.update_and_publish(ctx, &request).await?
            }
            Err(e) => return Err(e),
        };

        Ok(DashboardRef {
            account_id: ctx.account_id.clone(),
            url: arn::dashboard_url(&ctx.region, &described.dashboard_id),
            dashboard_id: described.dashboard_id,
            arn: described.arn,
        })
    }

    async fn update_and_publish(
        &self,
        ctx: &ServiceContext,
        request: &DashboardRequest,
    ) -> Result<DashboardDescription> {
        let submission = self.client.update_dashboard(ctx, request).await?;
        tracing::debug!("Dashboard {} update submitted ({})", submission.arn, submission.status);
        let described = self
            .wait_for_dashboard(ctx, &request.dashboard_id, submission.version_number)
            .await?;

        match described.version_number.or(submission.version_number) {
            Some(version) => {
                self.client
                    .publish_dashboard_version(ctx, &request.dashboard_id, version)
                    .await?;
                tracing::info!("Published dashboard {} version {}", request.dashboard_id, version);
            }
            None => tracing::warn!(
                "Dashboard {} updated but no version number was reported; not published",
                request.dashboard_id
            ),
        }
        Ok(described)
    }

    async fn wait_for_dashboard(
        &self,
        ctx: &ServiceContext,
        dashboard_id: &str,
        version_number: Option<i64>,
    ) -> Result<DashboardDescription> {
        let resource = format!("dashboard {dashboard_id}");
        poll_until_terminal(self.poll, &resource, || {
            self.client.describe_dashboard(ctx, dashboard_id, version_number)
        })
        .await
    }
}
