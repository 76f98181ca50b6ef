// Status polling with a fixed interval and bounded attempts
use crate::domain::dashboard::DashboardDescription;
use crate::domain::error::{LifecycleError, Result};
use crate::domain::status::ResourceStatus;
use crate::domain::template::TemplateDescription;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A described resource that carries a lifecycle status
pub trait StatusReport {
    fn status(&self) -> &ResourceStatus;
    fn failure_reason(&self) -> String;
}

impl StatusReport for TemplateDescription {
    fn status(&self) -> &ResourceStatus {
        &self.version.status
    }

    fn failure_reason(&self) -> String {
        TemplateDescription::failure_reason(self)
    }
}

impl StatusReport for DashboardDescription {
    fn status(&self) -> &ResourceStatus {
        &self.status
    }

    fn failure_reason(&self) -> String {
        DashboardDescription::failure_reason(self)
    }
}

/// Call `probe` until it reports a terminal status.
///
/// Sleeps `interval` between attempts (never after the last one), so a run
/// finishes within `max_attempts * interval`. A failed terminal status becomes
/// `RemoteOperationFailed`; running out of attempts becomes `PollingTimeout`.
/// Errors from `probe` itself abort immediately.
pub async fn poll_until_terminal<T, F, Fut>(
    policy: PollPolicy,
    resource: &str,
    mut probe: F,
) -> Result<T>
where
    T: StatusReport,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut unrecognized_reported = false;

    for attempt in 1..=max_attempts {
        let report = probe().await?;
        let status = report.status();
        tracing::debug!("{} poll {}/{}: {}", resource, attempt, max_attempts, status);

        if !status.is_recognized() && !unrecognized_reported {
            tracing::warn!(
                "{} reported unrecognized status {}; polling continues until it becomes terminal",
                resource,
                status
            );
            unrecognized_reported = true;
        }

        if status.is_terminal() {
            if status.is_success() {
                return Ok(report);
            }
            return Err(LifecycleError::RemoteOperationFailed {
                resource: resource.to_string(),
                status: status.clone(),
                reason: report.failure_reason(),
            });
        }
        if attempt < max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(LifecycleError::PollingTimeout {
        resource: resource.to_string(),
        attempts: max_attempts,
    })
}
