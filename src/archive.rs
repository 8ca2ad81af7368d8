//! Zip archiving of a dataset's shapefile representation.
//!
//! An archive holds exactly one shapefile file set, flattened to base file
//! names, in a zip named `<file-name>_<ISO-date>.zip`. A dataset that is not
//! already a shapefile is first copied out to a temporary shapefile, which
//! then also lends the archive its name.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, error, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::runlog::RunLog;
use crate::shapefile;
use crate::store::{DatasetStore, StoreError};

/// Errors surfaced while building an archive. Store and zip failures pass
/// through unchanged; there is no retry and no partial-archive cleanup.
#[derive(Debug)]
pub enum ArchiveError {
    Io(io::Error),
    Zip(zip::result::ZipError),
    Store(StoreError),
}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        ArchiveError::Zip(e)
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Io(e) => write!(f, "archive io error: {e}"),
            ArchiveError::Zip(e) => write!(f, "zip error: {e}"),
            ArchiveError::Store(e) => write!(f, "dataset store error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            ArchiveError::Zip(e) => Some(e),
            ArchiveError::Store(e) => Some(e.as_ref()),
        }
    }
}

/// Creates `<archive_folder>/<described-name>_<today>.zip` holding the
/// shapefile file set of `dataset`, and returns the archive path.
///
/// A non-shapefile dataset is first materialized as a temporary shapefile in
/// a scratch directory owned by this call; the scratch directory is removed
/// on every exit path. The archive is named after what was actually zipped,
/// so for a non-shapefile source the name reflects the temporary shapefile.
/// The zip is opened in write mode: a same-day re-run overwrites.
pub async fn create_archive<S: DatasetStore>(
    store: &S,
    archive_folder: &Path,
    dataset: &Path,
    log: &mut RunLog,
) -> Result<PathBuf, ArchiveError> {
    let mut desc = match store.describe(dataset).await {
        Ok(desc) => desc,
        Err(e) => {
            log.log_error(&e);
            return Err(ArchiveError::Store(e));
        }
    };

    // The scratch directory, made only when a temporary shapefile is
    // needed, owns that shapefile until the archive is written.
    let (source, _scratch) = if desc.is_shapefile() {
        (dataset.to_path_buf(), None)
    } else {
        let name = match store.scratch_name("tmp").await {
            Ok(name) => name,
            Err(e) => {
                log.log_error(&e);
                return Err(ArchiveError::Store(e));
            }
        };
        let scratch = tempfile::tempdir()?;
        let temp_file = scratch.path().join(name);
        log.log_msg(&format!(
            "Creating temporary shapefile {} for archiving",
            temp_file.display()
        ));
        if let Err(e) = store.copy_features(dataset, &temp_file).await {
            error!(error = %e, temp = %temp_file.display(), "Temporary shapefile copy failed");
            log.log_error(&e);
            return Err(ArchiveError::Store(e));
        }
        // The archive takes the temporary shapefile's name, not the original
        // dataset's. Long-standing behavior; pinned by tests.
        desc = match store.describe(&temp_file).await {
            Ok(desc) => desc,
            Err(e) => {
                log.log_error(&e);
                return Err(ArchiveError::Store(e));
            }
        };
        (temp_file, Some(scratch))
    };

    let archive_name = format!("{}_{}.zip", desc.file_name, Local::now().format("%Y-%m-%d"));
    let archive_path = archive_folder.join(&archive_name);
    info!(
        source = %source.display(),
        archive = %archive_path.display(),
        "Archiving"
    );
    log.log_msg(&format!(
        "Archiving {} to {}",
        source.display(),
        archive_path.display()
    ));

    if let Err(e) = write_zip(&source, &archive_path, log) {
        log.log_error(&e);
        return Err(e);
    }
    if let Err(e) = log_zip_info(&archive_path, log) {
        log.log_error(&e);
        return Err(e);
    }

    Ok(archive_path)
}

/// Writes the resolved file set of `source` into a fresh deflate-compressed
/// zip at `archive_path`, each entry under its base file name.
fn write_zip(source: &Path, archive_path: &Path, log: &mut RunLog) -> Result<(), ArchiveError> {
    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in shapefile::sibling_files(source)? {
        let name = entry
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        debug!(file = %entry.display(), entry = %name, "Adding to archive");
        log.log_msg(&format!("Adding {}...", entry.display()));
        writer.start_file(name, options)?;
        let mut input = File::open(&entry)?;
        io::copy(&mut input, &mut writer)?;
    }
    writer.finish()?;
    Ok(())
}

/// Records one metadata block per archive entry to the run log.
fn log_zip_info(archive_path: &Path, log: &mut RunLog) -> Result<(), ArchiveError> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let modified = match entry.last_modified() {
            Some(m) => format!(
                "{}-{:02}-{:02} {:02}:{:02}:{:02}",
                m.year(),
                m.month(),
                m.day(),
                m.hour(),
                m.minute(),
                m.second()
            ),
            None => "unknown".to_string(),
        };
        let system = if entry.unix_mode().is_some() {
            "Unix"
        } else {
            "MS-DOS"
        };
        let (version_major, version_minor) = entry.version_made_by();
        let entry_name = entry.name().to_string();
        log.log_msg(&entry_name);
        log.log_msg(&format!("\tComment:\t{}", entry.comment()));
        log.log_msg(&format!("\tModified:\t{modified}"));
        log.log_msg(&format!("\tSystem:\t\t{system}"));
        log.log_msg(&format!("\tZIP version:\t{version_major}.{version_minor}"));
        log.log_msg(&format!("\tMethod:\t\t{:?}", entry.compression()));
        log.log_msg(&format!("\tCompressed:\t{} bytes", entry.compressed_size()));
        log.log_msg(&format!("\tUncompressed:\t{} bytes", entry.size()));
    }
    Ok(())
}
