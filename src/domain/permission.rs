// Access-control entries attached to templates and dashboards
use super::arn;

pub const TEMPLATE_CONSUMER_ACTIONS: &[&str] = &[
    "quicksight:DescribeTemplate",
    "quicksight:ListTemplateVersions",
];

pub const DASHBOARD_VIEWER_ACTIONS: &[&str] = &[
    "quicksight:DescribeDashboard",
    "quicksight:QueryDashboard",
    "quicksight:ListDashboardVersions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub principal: String,
    pub actions: Vec<String>,
}

impl PermissionGrant {
    pub fn new(principal: String, actions: &[&str]) -> Self {
        Self {
            principal,
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Lets another account describe a template and create dashboards from it
    pub fn template_consumer(target_account_id: &str) -> Self {
        Self::new(
            arn::account_root_principal(target_account_id),
            TEMPLATE_CONSUMER_ACTIONS,
        )
    }

    /// Read access for everyone in the account's default namespace
    pub fn dashboard_viewers(region: &str, account_id: &str) -> Self {
        Self::new(
            arn::default_namespace_principal(region, account_id),
            DASHBOARD_VIEWER_ACTIONS,
        )
    }
}
