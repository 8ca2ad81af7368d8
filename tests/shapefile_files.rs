// Tests for shapefile sibling-file discovery: whitelist membership only,
// no dependence on enumeration order.

use std::collections::HashSet;
use std::fs::write;
use std::path::Path;

use geopublisher::shapefile::{sibling_files, SHAPEFILE_EXTENSIONS};
use tempfile::tempdir;

fn touch(dir: &Path, name: &str) {
    write(dir.join(name), b"x").unwrap();
}

fn names(files: &[std::path::PathBuf]) -> HashSet<String> {
    files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn finds_only_whitelisted_siblings() {
    let dir = tempdir().unwrap();
    for name in [
        "Parcels.shp",
        "Parcels.shx",
        "Parcels.dbf",
        "Parcels.prj",
        "Parcels.cpg",
        "Parcels.shp.xml",
    ] {
        touch(dir.path(), name);
    }
    // Same stem, unknown extensions: never part of the file set.
    touch(dir.path(), "Parcels.mxd");
    touch(dir.path(), "Parcels.lock");
    // Different stem entirely.
    touch(dir.path(), "Roads.shp");

    let files = sibling_files(&dir.path().join("Parcels.shp")).unwrap();
    let expected: HashSet<String> = [
        "Parcels.shp",
        "Parcels.shx",
        "Parcels.dbf",
        "Parcels.prj",
        "Parcels.cpg",
        "Parcels.shp.xml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(names(&files), expected);
}

#[test]
fn extension_of_query_name_is_irrelevant() {
    let dir = tempdir().unwrap();
    for name in ["Bridges.shp", "Bridges.dbf", "Bridges.prj"] {
        touch(dir.path(), name);
    }

    let by_shp = sibling_files(&dir.path().join("Bridges.shp")).unwrap();
    let by_dbf = sibling_files(&dir.path().join("Bridges.dbf")).unwrap();
    assert_eq!(names(&by_shp), names(&by_dbf));
    assert_eq!(by_shp.len(), 3);
}

#[test]
fn missing_shapefile_yields_empty_set() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "Other.shp");
    let files = sibling_files(&dir.path().join("Missing.shp")).unwrap();
    assert!(files.is_empty());
}

#[test]
fn missing_directory_yields_empty_set() {
    let dir = tempdir().unwrap();
    let files = sibling_files(&dir.path().join("nowhere").join("Missing.shp")).unwrap();
    assert!(files.is_empty());
}

#[test]
fn does_not_recurse_into_subdirectories() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "Parcels.shp");
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    touch(&nested, "Parcels.dbf");

    let files = sibling_files(&dir.path().join("Parcels.shp")).unwrap();
    assert_eq!(names(&files), HashSet::from(["Parcels.shp".to_string()]));
}

#[test]
fn whitelist_is_the_fixed_shapefile_family() {
    assert_eq!(SHAPEFILE_EXTENSIONS.len(), 15);
    assert!(SHAPEFILE_EXTENSIONS.contains(&"prj"));
    assert!(SHAPEFILE_EXTENSIONS.contains(&"cpg"));
    assert!(!SHAPEFILE_EXTENSIONS.contains(&"mxd"));
}
