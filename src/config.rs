use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// One publish job: where the data comes from, where it lands, and whether a
/// dated zip archive of the result is kept.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublishJob {
    pub input: PathBuf,
    pub output_location: PathBuf,
    pub output_name: String,
    pub archive_folder: Option<PathBuf>,
}

/// Notification mail settings. `testing` prints composed messages instead of
/// transmitting them.
#[derive(Debug, Serialize, Deserialize)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub from: String,
    pub to: Vec<String>,
    #[serde(default)]
    pub testing: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub publish: PublishJob,
    pub log_folder: Option<PathBuf>,
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            input = %self.publish.input.display(),
            output_location = %self.publish.output_location.display(),
            output_name = %self.publish.output_name,
            archived = self.publish.archive_folder.is_some(),
            notify = self.mail.is_some(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}
