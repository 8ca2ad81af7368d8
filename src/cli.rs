use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::load_config::load_config;
use crate::mailer::Mailer;
use crate::publish::publish;
use crate::runlog::RunLog;
use crate::store::FolderStore;

/// CLI for geopublisher: copy feature datasets and keep dated zip archives.
#[derive(Parser)]
#[clap(
    name = "geopublisher",
    version,
    about = "Publish feature datasets between workspaces, with optional dated zip archives and email notification"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one publish job described by the given config file
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config } => {
            let config = load_config(config)?;
            let store = FolderStore::new();
            let mut log = RunLog::new("geopublisher");

            println!("Publish starting...");
            let outcome = publish(
                &store,
                &config.publish.input,
                &config.publish.output_location,
                &config.publish.output_name,
                config.publish.archive_folder.as_deref(),
                &mut log,
            )
            .await;

            let result = match &outcome {
                Ok(report) => {
                    println!("Publish complete.\nReport:");
                    println!("{report:#?}");
                    match serde_json::to_string_pretty(report) {
                        Ok(json) => {
                            tracing::debug!(json = %json, "Publish report as JSON")
                        }
                        Err(e) => {
                            tracing::error!(error = ?e, "Failed to serialize publish report")
                        }
                    }
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Publish failed: {e}");
                    Err(anyhow::anyhow!("publish failed: {e}"))
                }
            };

            if let Some(folder) = &config.log_folder {
                if let Err(e) = log.write_to_file(folder) {
                    tracing::error!(error = ?e, folder = %folder.display(), "Failed to write run log");
                }
            }

            if let Some(mail) = &config.mail {
                let mailer = Mailer::new(
                    mail.server.clone(),
                    mail.port,
                    mail.from.clone(),
                    mail.to.clone(),
                    mail.testing,
                )?;
                let (subject, body) = match &outcome {
                    Ok(_) => (
                        format!("geopublisher: published {}", config.publish.output_name),
                        format!("Publish succeeded.\n\n{}", log.contents()),
                    ),
                    Err(e) => (
                        format!(
                            "geopublisher: publish of {} FAILED",
                            config.publish.output_name
                        ),
                        format!("Publish failed: {e}\n\n{}", log.contents()),
                    ),
                };
                if let Err(e) = mailer.send_email(&subject, &body, None) {
                    tracing::error!(error = %e, "Failed to send notification email");
                }
            }

            result
        }
    }
}
