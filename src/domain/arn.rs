// ARN and URL builders for QuickSight resources

pub fn analysis_arn(region: &str, account_id: &str, analysis_id: &str) -> String {
    format!("arn:aws:quicksight:{region}:{account_id}:analysis/{analysis_id}")
}

pub fn template_arn(region: &str, account_id: &str, template_id: &str) -> String {
    format!("arn:aws:quicksight:{region}:{account_id}:template/{template_id}")
}

/// Dataset ARN for an identifier; values that already are ARNs pass through untouched
pub fn dataset_arn(region: &str, account_id: &str, dataset: &str) -> String {
    if dataset.starts_with("arn:") {
        dataset.to_string()
    } else {
        format!("arn:aws:quicksight:{region}:{account_id}:dataset/{dataset}")
    }
}

pub fn default_namespace_principal(region: &str, account_id: &str) -> String {
    format!("arn:aws:quicksight:{region}:{account_id}:namespace/default")
}

pub fn account_root_principal(account_id: &str) -> String {
    format!("arn:aws:iam::{account_id}:root")
}

pub fn dashboard_url(region: &str, dashboard_id: &str) -> String {
    format!("https://{region}.quicksight.aws.amazon.com/sn/dashboards/{dashboard_id}")
}

/// Trailing resource segment of an ARN ("arn:...:dataset/sales" -> "sales")
pub fn resource_name(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

/// Version number encoded in a version ARN ("...:dashboard/d1/version/3" -> 3)
pub fn version_number(version_arn: &str) -> Option<i64> {
    let (_, version) = version_arn.rsplit_once("/version/")?;
    version.parse().ok()
}
