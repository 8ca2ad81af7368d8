//! Shapefile sibling-file discovery.
//!
//! A shapefile is a family of sidecar files sharing one base name and
//! differing by extension. This module finds every sidecar that actually
//! exists next to a given shapefile path, filtered to the known extension
//! set. Files that merely share the stem (a map document, an editor lock)
//! are never part of the file set.

use std::io;
use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::debug;

/// Every file extension that can belong to a shapefile.
pub const SHAPEFILE_EXTENSIONS: [&str; 15] = [
    "shp", "shx", "dbf", "sbn", "sbx", "fbn", "fbx", "ain", "aih", "atx", "ixs", "mxs", "prj",
    "xml", "cpg",
];

/// Returns the existing sidecar files of `shp_name`, in directory enumeration
/// order. The extension of `shp_name` itself is irrelevant; only the stem is
/// matched. An empty result is not an error.
pub fn sibling_files(shp_name: &Path) -> io::Result<Vec<PathBuf>> {
    let dir = match shp_name.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = shp_name
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let matcher = Glob::new(&format!("{stem}.*"))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
        .compile_matcher();

    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        if !matcher.is_match(Path::new(name)) {
            continue;
        }
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if SHAPEFILE_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension))
        {
            files.push(path);
        }
    }
    debug!(stem = %stem, count = files.len(), "Resolved shapefile file set");
    Ok(files)
}
