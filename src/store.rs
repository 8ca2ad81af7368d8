//! # store: Universal interface over dataset storage backends
//!
//! This module defines a single trait ([`DatasetStore`]) abstracting the
//! existence/delete/copy/describe/scratch capabilities the publish pipeline
//! needs from whatever holds the feature data (a folder of shapefiles, a
//! file geodatabase, a database connection).
//!
//! ## Interface & Extensibility
//! - Implement [`DatasetStore`] to plug in a new backend.
//! - All methods are async, returning results and using boxed error types.
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests.
//!
//! One concrete backend ships here: [`FolderStore`], the folder workspace
//! where datasets are shapefiles on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::debug;
use uuid::Uuid;

use crate::shapefile;

/// Error type shared by all dataset store operations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Storage kind reported by a describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetKind {
    Shapefile,
    FeatureClass,
}

/// What a store knows about a dataset: its storage kind and the file name
/// the backing storage uses for it.
#[derive(Debug, Clone)]
pub struct DatasetDescription {
    pub kind: DatasetKind,
    pub file_name: String,
}

impl DatasetDescription {
    pub fn is_shapefile(&self) -> bool {
        self.kind == DatasetKind::Shapefile
    }
}

/// Trait for the storage backend holding feature datasets.
/// The implementor is responsible for talking to the backing storage and for
/// any format conversion a copy implies.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// True when a dataset is present at `dataset`.
    async fn exists(&self, dataset: &Path) -> Result<bool, StoreError>;

    /// Remove the dataset at `dataset`, sidecar files included.
    async fn delete(&self, dataset: &Path) -> Result<(), StoreError>;

    /// Copy the feature dataset at `source` to `destination`, converting
    /// formats as the destination path requires.
    async fn copy_features(&self, source: &Path, destination: &Path) -> Result<(), StoreError>;

    /// Report the storage kind and canonical file name of `dataset`.
    async fn describe(&self, dataset: &Path) -> Result<DatasetDescription, StoreError>;

    /// Produce a scratch shapefile name, unique within this run, for
    /// intermediate artifacts.
    async fn scratch_name(&self, prefix: &str) -> Result<String, StoreError>;
}

/// Folder workspace backend: datasets are shapefiles on disk. Geodatabase and
/// database-connection backends plug in through the same trait.
#[derive(Debug, Default)]
pub struct FolderStore;

impl FolderStore {
    pub fn new() -> Self {
        FolderStore
    }
}

#[async_trait]
impl DatasetStore for FolderStore {
    async fn exists(&self, dataset: &Path) -> Result<bool, StoreError> {
        Ok(dataset.exists() || !shapefile::sibling_files(dataset)?.is_empty())
    }

    async fn delete(&self, dataset: &Path) -> Result<(), StoreError> {
        for file in shapefile::sibling_files(dataset)? {
            debug!(path = %file.display(), "Removing stale file");
            std::fs::remove_file(&file)?;
        }
        Ok(())
    }

    async fn copy_features(&self, source: &Path, destination: &Path) -> Result<(), StoreError> {
        let files = shapefile::sibling_files(source)?;
        if files.is_empty() {
            return Err(format!("no shapefile found at {}", source.display()).into());
        }
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let source_stem = source
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let destination_stem = destination
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        for file in files {
            let file_name = file
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();
            // Keep the full multi-part suffix so `Name.shp.xml` metadata
            // stays distinct from a plain `Name.xml` sibling.
            let suffix = file_name
                .strip_prefix(&format!("{source_stem}."))
                .map(str::to_string)
                .unwrap_or_else(|| {
                    file.extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("")
                        .to_string()
                });
            let target = match destination.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    parent.join(format!("{destination_stem}.{suffix}"))
                }
                _ => PathBuf::from(format!("{destination_stem}.{suffix}")),
            };
            debug!(from = %file.display(), to = %target.display(), "Copying shapefile component");
            std::fs::copy(&file, &target)?;
        }
        Ok(())
    }

    async fn describe(&self, dataset: &Path) -> Result<DatasetDescription, StoreError> {
        let file_name = dataset
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| format!("dataset path has no file name: {}", dataset.display()))?;
        let kind = match dataset.extension().and_then(|e| e.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("shp") => DatasetKind::Shapefile,
            _ => DatasetKind::FeatureClass,
        };
        Ok(DatasetDescription { kind, file_name })
    }

    async fn scratch_name(&self, prefix: &str) -> Result<String, StoreError> {
        Ok(format!("{}_{}.shp", prefix, Uuid::new_v4().simple()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::tempdir;

    fn fake_shapefile(dir: &Path, stem: &str) {
        for extension in ["shp", "shx", "dbf", "prj"] {
            write(dir.join(format!("{stem}.{extension}")), b"data").unwrap();
        }
    }

    #[tokio::test]
    async fn describe_reports_shapefile_kind_and_file_name() {
        let store = FolderStore::new();
        let desc = store
            .describe(Path::new("/data/Airports.shp"))
            .await
            .unwrap();
        assert!(desc.is_shapefile());
        assert_eq!(desc.file_name, "Airports.shp");

        let desc = store
            .describe(Path::new("/data/Test.gdb/Fire_Stations"))
            .await
            .unwrap();
        assert_eq!(desc.kind, DatasetKind::FeatureClass);
        assert_eq!(desc.file_name, "Fire_Stations");
    }

    #[tokio::test]
    async fn exists_sees_partial_file_sets() {
        let dir = tempdir().unwrap();
        let store = FolderStore::new();
        let dataset = dir.path().join("Roads.shp");
        assert!(!store.exists(&dataset).await.unwrap());

        // Only a leftover sidecar, no .shp: still counts as present.
        write(dir.path().join("Roads.dbf"), b"data").unwrap();
        assert!(store.exists(&dataset).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_whole_file_set() {
        let dir = tempdir().unwrap();
        fake_shapefile(dir.path(), "Roads");
        let store = FolderStore::new();
        store.delete(&dir.path().join("Roads.shp")).await.unwrap();
        assert!(!dir.path().join("Roads.shp").exists());
        assert!(!dir.path().join("Roads.dbf").exists());
    }

    #[tokio::test]
    async fn copy_features_renames_components_to_destination_stem() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        fake_shapefile(src.path(), "Airports");
        let store = FolderStore::new();
        store
            .copy_features(
                &src.path().join("Airports.shp"),
                &dst.path().join("out").join("Airfields.shp"),
            )
            .await
            .unwrap();
        for extension in ["shp", "shx", "dbf", "prj"] {
            assert!(dst.path().join("out").join(format!("Airfields.{extension}")).exists());
        }
    }

    #[tokio::test]
    async fn copy_features_keeps_multi_part_suffixes_distinct() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        fake_shapefile(src.path(), "Airports");
        write(src.path().join("Airports.shp.xml"), b"shapefile metadata").unwrap();
        write(src.path().join("Airports.xml"), b"plain metadata").unwrap();

        let store = FolderStore::new();
        store
            .copy_features(
                &src.path().join("Airports.shp"),
                &dst.path().join("Airfields.shp"),
            )
            .await
            .unwrap();

        let shp_xml = std::fs::read(dst.path().join("Airfields.shp.xml")).unwrap();
        let plain_xml = std::fs::read(dst.path().join("Airfields.xml")).unwrap();
        assert_eq!(shp_xml, b"shapefile metadata");
        assert_eq!(plain_xml, b"plain metadata");
    }

    #[tokio::test]
    async fn copy_features_errors_when_source_is_missing() {
        let src = tempdir().unwrap();
        let store = FolderStore::new();
        let err = store
            .copy_features(&src.path().join("Missing.shp"), Path::new("out.shp"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no shapefile found"));
    }

    #[tokio::test]
    async fn scratch_names_are_unique() {
        let store = FolderStore::new();
        let a = store.scratch_name("tmp").await.unwrap();
        let b = store.scratch_name("tmp").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("tmp_") && a.ends_with(".shp"));
    }
}
