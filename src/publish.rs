//! High-level pipeline: delete stale output, copy features, optionally
//! archive.
//!
//! This is a linear happy path with one optional fork. Each failed step is
//! logged and returned immediately; no partial-success state is reported
//! back to the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::archive::{self, ArchiveError};
use crate::runlog::RunLog;
use crate::store::{DatasetStore, StoreError};

/// Errors surfaced by a publish run, passed through from the store or the
/// archive builder unchanged.
#[derive(Debug)]
pub enum PublishError {
    Store(StoreError),
    Archive(ArchiveError),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Store(e) => write!(f, "dataset store error: {e}"),
            PublishError::Archive(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Store(e) => Some(e.as_ref()),
            PublishError::Archive(e) => Some(e),
        }
    }
}

/// Outcome of a publish run, for callers and downstream audit.
#[derive(Debug, serde::Serialize)]
pub struct PublishReport {
    pub output_path: PathBuf,
    pub archive_path: Option<PathBuf>,
}

/// Publishes `input_fc` as `<output_location>/<output_fc>`.
///
/// An object already present at the output path is deleted first. When
/// `archive_folder` is given, a dated zip of the result's shapefile
/// representation is written there as well; without it no archive-related
/// filesystem writes happen.
pub async fn publish<S: DatasetStore>(
    store: &S,
    input_fc: &Path,
    output_location: &Path,
    output_fc: &str,
    archive_folder: Option<&Path>,
    log: &mut RunLog,
) -> Result<PublishReport, PublishError> {
    let output_path = output_location.join(output_fc);
    info!(
        input = %input_fc.display(),
        output = %output_path.display(),
        "Publishing"
    );
    log.log_msg(&format!(
        "Publishing {} to {}",
        input_fc.display(),
        output_path.display()
    ));

    match store.exists(&output_path).await {
        Ok(true) => {
            log.log_msg(&format!(
                "{} exists, trying to delete...",
                output_path.display()
            ));
            if let Err(e) = store.delete(&output_path).await {
                error!(error = %e, output = %output_path.display(), "Delete of stale output failed");
                log.log_error(&e);
                return Err(PublishError::Store(e));
            }
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, output = %output_path.display(), "Existence check failed");
            log.log_error(&e);
            return Err(PublishError::Store(e));
        }
    }

    log.log_msg(&format!(
        "Exporting {} to {}",
        input_fc.display(),
        output_path.display()
    ));
    if let Err(e) = store.copy_features(input_fc, &output_path).await {
        error!(error = %e, input = %input_fc.display(), "Feature copy failed");
        log.log_error(&e);
        return Err(PublishError::Store(e));
    }

    let mut archive_path = None;
    if let Some(folder) = archive_folder {
        // create_archive records its own failures to the log.
        match archive::create_archive(store, folder, &output_path, log).await {
            Ok(path) => archive_path = Some(path),
            Err(e) => {
                error!(error = %e, "Archiving failed");
                return Err(PublishError::Archive(e));
            }
        }
    }

    info!(output = %output_path.display(), "Publish complete");
    Ok(PublishReport {
        output_path,
        archive_path,
    })
}
