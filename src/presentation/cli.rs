// Command line definition
use crate::infrastructure::config::Settings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quicksight-lifecycle")]
#[command(about = "Export QuickSight templates and deploy dashboards across accounts")]
#[command(
    after_help = "Inputs are read from the environment (AWS_ACCOUNT_ID, AWS_REGION, TEMPLATE_ID, ...) \
                  or from config/quicksight.{toml,yaml,json}."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a template from ANALYSIS_ID and wait until it is ready
    ExportTemplate {
        /// Also write the template document to disk
        #[arg(long)]
        save: bool,

        /// Template document path (default: template.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download TEMPLATE_ID's definition into a JSON file
    SaveTemplate {
        /// Template version (default: latest)
        #[arg(long)]
        version: Option<i64>,

        /// Template document path (default: template.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update a dashboard from TEMPLATE_ID in the source account
    CreateDashboard {
        /// Dashboard id (default: dashboard-<timestamp>)
        #[arg(long)]
        dashboard_id: Option<String>,
    },

    /// Deploy TEMPLATE_ID as a dashboard in TARGET_ACCOUNT_ID via TARGET_ROLE_ARN
    Replicate {
        /// Dashboard id in the target account (default: dashboard-<timestamp>)
        #[arg(long)]
        dashboard_id: Option<String>,
    },
}

impl Command {
    /// Command-line values take precedence over loaded settings
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        match self {
            Command::ExportTemplate { output, .. } => {
                if let Some(output) = output {
                    settings.template_output = Some(output.display().to_string());
                }
            }
            Command::SaveTemplate { version, output } => {
                if let Some(output) = output {
                    settings.template_output = Some(output.display().to_string());
                }
                if version.is_some() {
                    settings.template_version = *version;
                }
            }
            Command::CreateDashboard { dashboard_id } | Command::Replicate { dashboard_id } => {
                if dashboard_id.is_some() {
                    settings.dashboard_id = dashboard_id.clone();
                }
            }
        }
        settings
    }
}
