// Command handlers - Validate settings, run one operation, describe the outcome
use crate::application::placeholder_resolver::DatasetTarget;
use crate::application::poller::PollPolicy;
use crate::domain::dashboard::DashboardRef;
use crate::domain::error::Result;
use crate::domain::template::TemplateRef;
use crate::infrastructure::config::{
    DashboardConfig, ExportConfig, ReplicationConfig, SaveConfig, Settings,
};
use crate::infrastructure::json_archive::JsonFileArchive;
use crate::presentation::app_state::AppState;
use crate::presentation::cli::Command;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A validated operation, ready to run
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Export { config: ExportConfig, save: bool },
    Save(SaveConfig),
    CreateDashboard(DashboardConfig),
    Replicate(ReplicationConfig),
}

impl Plan {
    pub fn poll_policy(&self) -> PollPolicy {
        match self {
            Plan::Export { config, .. } => config.poll,
            Plan::Save(_) => PollPolicy::default(),
            Plan::CreateDashboard(config) => config.poll,
            Plan::Replicate(config) => config.poll,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    TemplateExported {
        template: TemplateRef,
        archived_to: Option<PathBuf>,
    },
    TemplateSaved(PathBuf),
    DashboardDeployed(DashboardRef),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::TemplateExported {
                template,
                archived_to,
            } => {
                write!(f, "Template created: {}", template.arn)?;
                if let Some(version) = template.version_number {
                    write!(f, " (version {version})")?;
                }
                if let Some(path) = archived_to {
                    write!(f, "\nTemplate definition written to {}", path.display())?;
                }
                Ok(())
            }
            Outcome::TemplateSaved(path) => {
                write!(f, "Template written to {}", path.display())
            }
            Outcome::DashboardDeployed(dashboard) => write!(
                f,
                "Dashboard created successfully!\nDashboard ARN: {}\nDashboard URL: {}",
                dashboard.arn, dashboard.url
            ),
        }
    }
}

/// Validate everything `command` needs; no remote call happens before this succeeds
pub fn plan(command: &Command, settings: &Settings) -> Result<Plan> {
    let settings = command.apply_overrides(settings.clone());
    Ok(match command {
        Command::ExportTemplate { save, .. } => Plan::Export {
            config: settings.export_config()?,
            save: *save,
        },
        Command::SaveTemplate { .. } => Plan::Save(settings.save_config()?),
        Command::CreateDashboard { .. } => Plan::CreateDashboard(settings.dashboard_config()?),
        Command::Replicate { .. } => Plan::Replicate(settings.replication_config()?),
    })
}

pub async fn execute(state: &AppState, plan: Plan) -> anyhow::Result<Outcome> {
    match plan {
        Plan::Export { config, save } => export_template(state, config, save).await,
        Plan::Save(config) => save_template(state, config).await,
        Plan::CreateDashboard(config) => create_dashboard(state, config).await,
        Plan::Replicate(config) => replicate(state, config).await,
    }
}

async fn export_template(
    state: &AppState,
    config: ExportConfig,
    save: bool,
) -> anyhow::Result<Outcome> {
    let exporter = if save {
        state
            .exporter
            .clone()
            .with_archive(Arc::new(JsonFileArchive::new(config.output.clone())))
    } else {
        state.exporter.clone()
    };

    let exported = exporter
        .export_template(&config.source, &config.analysis_id, &config.template_id)
        .await?;

    Ok(Outcome::TemplateExported {
        template: exported.template,
        archived_to: exported.archived_to,
    })
}

async fn save_template(state: &AppState, config: SaveConfig) -> anyhow::Result<Outcome> {
    let archive = JsonFileArchive::new(config.output);
    let path = state
        .exporter
        .save_template(
            &config.source,
            &config.template_id,
            config.version_number,
            &archive,
        )
        .await?;
    Ok(Outcome::TemplateSaved(path))
}

async fn create_dashboard(state: &AppState, config: DashboardConfig) -> anyhow::Result<Outcome> {
    let source = &config.source;
    let template = TemplateRef::latest(&source.region, &source.account_id, &config.template_id);
    let target = DatasetTarget {
        account_id: source.account_id.clone(),
        region: source.region.clone(),
    };

    let bindings = state
        .resolver
        .resolve_bindings(source, &template, &config.datasets, &target)
        .await?;
    let dashboard = state
        .instantiator
        .create_or_update_dashboard(source, &config.plan, &template, &bindings)
        .await?;

    Ok(Outcome::DashboardDeployed(dashboard))
}

async fn replicate(state: &AppState, config: ReplicationConfig) -> anyhow::Result<Outcome> {
    let dashboard = state.replicator.replicate(&config.request).await?;
    Ok(Outcome::DashboardDeployed(dashboard))
}
