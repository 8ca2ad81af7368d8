use crate::config::{Config, MailConfig, PublishJob};
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Deserialize)]
struct StaticConfig {
    publish: PublishSection,
    #[serde(default)]
    log_folder: Option<PathBuf>,
    #[serde(default)]
    mail: Option<MailSection>,
}

#[derive(Deserialize)]
struct PublishSection {
    input: PathBuf,
    output_location: PathBuf,
    output_name: String,
    #[serde(default)]
    archive_folder: Option<PathBuf>,
}

#[derive(Deserialize)]
struct MailSection {
    server: String,
    #[serde(default = "default_smtp_port")]
    port: u16,
    from: String,
    #[serde(default)]
    to: Vec<String>,
    #[serde(default)]
    testing: bool,
}

fn default_smtp_port() -> u16 {
    25
}

/// Loads a static YAML config file and merges environment overrides.
/// `GEOPUBLISHER_NOTIFY` (comma-separated addresses) replaces the mail
/// recipient list when set. Returns a fully merged Config or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let notify_override: Option<Vec<String>> = std::env::var("GEOPUBLISHER_NOTIFY")
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

    let mail = match static_conf.mail {
        Some(section) => {
            let to = match notify_override {
                Some(to) if !to.is_empty() => {
                    info!(recipients = ?to, "Mail recipients overridden from GEOPUBLISHER_NOTIFY");
                    to
                }
                _ => section.to,
            };
            if to.is_empty() {
                error!("Mail section present but no recipients configured");
                anyhow::bail!(
                    "mail section present but no recipients configured (set mail.to or GEOPUBLISHER_NOTIFY)"
                );
            }
            Some(MailConfig {
                server: section.server,
                port: section.port,
                from: section.from,
                to,
                testing: section.testing,
            })
        }
        None => None,
    };

    let config = Config {
        publish: PublishJob {
            input: static_conf.publish.input,
            output_location: static_conf.publish.output_location,
            output_name: static_conf.publish.output_name,
            archive_folder: static_conf.publish.archive_folder,
        },
        log_folder: static_conf.log_folder,
        mail,
    };
    config.trace_loaded();
    Ok(config)
}
