// Typed settings loaded from an optional config file and the process environment
use crate::application::dashboard_instantiator::DashboardPlan;
use crate::application::poller::{PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use crate::application::replicator::ReplicationRequest;
use crate::domain::credentials::ServiceContext;
use crate::domain::dashboard::{PublishOptions, SheetControlsVisibility};
use crate::domain::dataset::DatasetMap;
use crate::domain::error::{LifecycleError, Result};
use chrono::Utc;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TEMPLATE_OUTPUT: &str = "template.json";

/// Every recognised key, all optional until an operation validates them.
/// Field names are the lower-cased environment variable names.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub aws_account_id: Option<String>,
    pub aws_region: Option<String>,
    pub analysis_id: Option<String>,
    pub template_id: Option<String>,
    pub template_version: Option<i64>,
    pub template_output: Option<String>,
    pub dataset_id: Option<String>,
    pub dataset_map: Option<String>,
    pub target_account_id: Option<String>,
    pub target_region: Option<String>,
    pub target_role_arn: Option<String>,
    pub target_dataset_id: Option<String>,
    pub target_dataset_map: Option<String>,
    pub dashboard_id: Option<String>,
    pub dashboard_name: Option<String>,
    pub ad_hoc_filtering_enabled: Option<bool>,
    pub export_to_csv_enabled: Option<bool>,
    pub sheet_controls_visibility: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub poll_max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub source: ServiceContext,
    pub analysis_id: String,
    pub template_id: String,
    pub output: PathBuf,
    pub poll: PollPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveConfig {
    pub source: ServiceContext,
    pub template_id: String,
    pub version_number: Option<i64>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub source: ServiceContext,
    pub template_id: String,
    pub datasets: DatasetMap,
    pub plan: DashboardPlan,
    pub poll: PollPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationConfig {
    pub request: ReplicationRequest,
    pub poll: PollPolicy,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(None)
}

/// Load settings, reading environment variables from `env` instead of the
/// process environment when given
pub fn load_settings_from(env: Option<config::Map<String, String>>) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/quicksight").required(false))
        .add_source(config::Environment::default().source(env))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Collects every missing required key before failing
#[derive(Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn take(&mut self, key: &'static str, value: &Option<String>) -> String {
        match present(value) {
            Some(value) => value.to_string(),
            None => {
                self.missing.push(key);
                String::new()
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::MissingConfiguration {
                missing: self.missing,
            })
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Where an operation's dataset bindings come from
enum DatasetSource {
    Map {
        key: &'static str,
        raw: String,
        fallback: Option<String>,
    },
    Single(String),
    Missing,
}

impl DatasetSource {
    /// A dataset map under `map_key`, else a single dataset under `id_key`;
    /// with neither, `id_key` is reported missing
    fn select(
        required: &mut Required,
        map_key: &'static str,
        map: &Option<String>,
        id_key: &'static str,
        id: &Option<String>,
    ) -> Self {
        let single = present(id).map(str::to_string);
        match (present(map), single) {
            (Some(raw), fallback) => Self::Map {
                key: map_key,
                raw: raw.to_string(),
                fallback,
            },
            (None, Some(single)) => Self::Single(single),
            (None, None) => {
                required.missing.push(id_key);
                Self::Missing
            }
        }
    }

    fn into_map(self) -> Result<DatasetMap> {
        match self {
            Self::Map { key, raw, fallback } => {
                Ok(DatasetMap::parse(key, &raw)?.with_fallback(fallback))
            }
            Self::Single(dataset) => Ok(DatasetMap::single(dataset)),
            Self::Missing => Ok(DatasetMap::default()),
        }
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}

impl Settings {
    pub fn poll_policy(&self) -> Result<PollPolicy> {
        let max_attempts = self.poll_max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(LifecycleError::InvalidConfiguration {
                key: "POLL_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        Ok(PollPolicy {
            interval: self
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            max_attempts,
        })
    }

    /// Dashboard publish options: everything enabled with expanded sheet
    /// controls unless overridden
    pub fn publish_options(&self) -> Result<PublishOptions> {
        let defaults = PublishOptions::interactive();
        let sheet_controls_visibility = match present(&self.sheet_controls_visibility) {
            Some(value) => Some(value.parse::<SheetControlsVisibility>()?),
            None => defaults.sheet_controls_visibility,
        };
        Ok(PublishOptions {
            ad_hoc_filtering_enabled: self
                .ad_hoc_filtering_enabled
                .or(defaults.ad_hoc_filtering_enabled),
            export_to_csv_enabled: self.export_to_csv_enabled.or(defaults.export_to_csv_enabled),
            sheet_controls_visibility,
        })
    }

    fn template_output(&self) -> PathBuf {
        PathBuf::from(present(&self.template_output).unwrap_or(DEFAULT_TEMPLATE_OUTPUT))
    }

    fn dashboard_plan(&self, default_name: String) -> Result<DashboardPlan> {
        Ok(DashboardPlan {
            dashboard_id: present(&self.dashboard_id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("dashboard-{}", timestamp())),
            name: present(&self.dashboard_name)
                .map(str::to_string)
                .unwrap_or(default_name),
            publish_options: self.publish_options()?,
        })
    }

    pub fn export_config(&self) -> Result<ExportConfig> {
        let mut required = Required::default();
        let account_id = required.take("AWS_ACCOUNT_ID", &self.aws_account_id);
        let region = required.take("AWS_REGION", &self.aws_region);
        let analysis_id = required.take("ANALYSIS_ID", &self.analysis_id);
        let template_id = required.take("TEMPLATE_ID", &self.template_id);
        required.finish()?;

        Ok(ExportConfig {
            source: ServiceContext::ambient(account_id, region),
            analysis_id,
            template_id,
            output: self.template_output(),
            poll: self.poll_policy()?,
        })
    }

    pub fn save_config(&self) -> Result<SaveConfig> {
        let mut required = Required::default();
        let account_id = required.take("AWS_ACCOUNT_ID", &self.aws_account_id);
        let region = required.take("AWS_REGION", &self.aws_region);
        let template_id = required.take("TEMPLATE_ID", &self.template_id);
        required.finish()?;

        Ok(SaveConfig {
            source: ServiceContext::ambient(account_id, region),
            template_id,
            version_number: self.template_version,
            output: self.template_output(),
        })
    }

    pub fn dashboard_config(&self) -> Result<DashboardConfig> {
        let mut required = Required::default();
        let account_id = required.take("AWS_ACCOUNT_ID", &self.aws_account_id);
        let region = required.take("AWS_REGION", &self.aws_region);
        let template_id = required.take("TEMPLATE_ID", &self.template_id);
        let datasets = DatasetSource::select(
            &mut required,
            "DATASET_MAP",
            &self.dataset_map,
            "DATASET_ID",
            &self.dataset_id,
        );
        required.finish()?;

        Ok(DashboardConfig {
            source: ServiceContext::ambient(account_id, region),
            template_id,
            datasets: datasets.into_map()?,
            plan: self.dashboard_plan("New Dashboard".to_string())?,
            poll: self.poll_policy()?,
        })
    }

    pub fn replication_config(&self) -> Result<ReplicationConfig> {
        let mut required = Required::default();
        let account_id = required.take("AWS_ACCOUNT_ID", &self.aws_account_id);
        let region = required.take("AWS_REGION", &self.aws_region);
        let template_id = required.take("TEMPLATE_ID", &self.template_id);
        let target_account_id = required.take("TARGET_ACCOUNT_ID", &self.target_account_id);
        let datasets = DatasetSource::select(
            &mut required,
            "TARGET_DATASET_MAP",
            &self.target_dataset_map,
            "TARGET_DATASET_ID",
            &self.target_dataset_id,
        );
        let target_role_arn = required.take("TARGET_ROLE_ARN", &self.target_role_arn);
        let target_region = required.take("TARGET_REGION", &self.target_region);
        required.finish()?;

        Ok(ReplicationConfig {
            request: ReplicationRequest {
                source: ServiceContext::ambient(account_id, region),
                template_id,
                target_account_id,
                target_region,
                target_role_arn,
                datasets: datasets.into_map()?,
                dashboard: self.dashboard_plan(format!("Imported Dashboard {}", timestamp()))?,
            },
            poll: self.poll_policy()?,
        })
    }
}
