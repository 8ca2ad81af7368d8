//! Run log: an explicit, single-owner log buffer.
//!
//! The log is a value handed to the operations that record progress, then
//! written out or discarded by the caller. Nothing in the crate keeps global
//! log state, so repeated or parallel runs never share a buffer.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use tracing::{error, info};

/// In-memory, append-only log for one publish run.
pub struct RunLog {
    buffer: String,
}

impl RunLog {
    /// Starts a log with a `<script> || <date> || <time> || <host>` header.
    pub fn new(script_name: &str) -> Self {
        let now = Local::now();
        let host = std::env::var("COMPUTERNAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_else(|_| "unknown-host".to_string());
        let buffer = format!(
            "{} || {} || {} || {}",
            script_name,
            now.format("%Y-%m-%d"),
            now.format("%H:%M:%S"),
            host
        );
        info!(header = %buffer, "Run log started");
        RunLog { buffer }
    }

    /// Appends a timestamped line and echoes it through tracing.
    pub fn log_msg(&mut self, msg: &str) {
        let time = Local::now().format("%H:%M:%S");
        self.buffer.push('\n');
        self.buffer.push_str(&format!("{time} | {msg}"));
        info!("{msg}");
    }

    /// Appends an error block. Callers invoke this before the error
    /// propagates, so the line is recorded even when they bail out.
    pub fn log_error(&mut self, err: &dyn std::fmt::Display) {
        let time = Local::now().format("%H:%M:%S");
        self.buffer.push_str(&format!("\n{time} | **ERROR**\n{time} | {err}"));
        error!(error = %err, "Operation failed");
    }

    /// Appends the whole buffer to `<folder>/<date>.txt`, creating the
    /// folder when missing.
    pub fn write_to_file(&self, folder: &Path) -> io::Result<()> {
        if !folder.exists() {
            std::fs::create_dir_all(folder)?;
        }
        let file_path = folder.join(format!("{}.txt", Local::now().format("%Y-%m-%d")));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;
        write!(file, "\n\n{}", self.buffer)?;
        info!(path = %file_path.display(), "Run log written");
        Ok(())
    }

    /// The accumulated log text.
    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::tempdir;

    #[test]
    fn header_names_the_script() {
        let log = RunLog::new("nightly-publish");
        assert!(log.contents().starts_with("nightly-publish || "));
    }

    #[test]
    fn messages_are_appended_in_order() {
        let mut log = RunLog::new("test");
        log.log_msg("first");
        log.log_msg("second");
        let first = log.contents().find("first").unwrap();
        let second = log.contents().find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn errors_are_marked() {
        let mut log = RunLog::new("test");
        log.log_error(&"copy failed");
        assert!(log.contents().contains("**ERROR**"));
        assert!(log.contents().contains("copy failed"));
    }

    #[test]
    fn write_to_file_appends_to_a_dated_file() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("Logs");

        let mut log = RunLog::new("test");
        log.log_msg("hello");
        log.write_to_file(&folder).unwrap();
        log.write_to_file(&folder).unwrap();

        let file = folder.join(format!("{}.txt", Local::now().format("%Y-%m-%d")));
        let contents = std::fs::read_to_string(file).unwrap();
        assert_eq!(contents.matches("hello").count(), 2);
    }
}
