use super::FileUtils;
use crate::error::ForensicsError;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn expand_path_expands_home() {
    let home = dirs::home_dir().expect("home dir");
    let path = FileUtils::expand_path("~/forensics-test").expect("expanded");
    assert_eq!(path, home.join("forensics-test"));
}

#[test]
fn expand_path_leaves_non_tilde_unchanged() {
    let path = FileUtils::expand_path("/tmp/forensics").expect("expanded");
    assert_eq!(path, PathBuf::from("/tmp/forensics"));
}

#[test]
fn check_file_readable_validates_paths() {
    let temp = tempdir().expect("tempdir");
    let file_path = temp.path().join("History");
    fs::write(&file_path, "data").expect("write file");
    FileUtils::check_file_readable(&file_path).expect("readable file");

    let err =
        FileUtils::check_file_readable(&temp.path().join("missing")).expect_err("missing file");
    assert!(matches!(err, ForensicsError::FileNotFound(_)));

    let err = FileUtils::check_file_readable(temp.path()).expect_err("dir path");
    assert!(matches!(err, ForensicsError::Config(_)));
}

#[test]
fn check_dir_readable_validates_paths() {
    let temp = tempdir().expect("tempdir");
    FileUtils::check_dir_readable(temp.path()).expect("readable dir");

    let file_path = temp.path().join("Bookmarks");
    fs::write(&file_path, "{}").expect("write file");
    let err = FileUtils::check_dir_readable(&file_path).expect_err("file path");
    assert!(matches!(err, ForensicsError::Config(_)));

    let err = FileUtils::check_dir_readable(&temp.path().join("missing")).expect_err("missing");
    assert!(matches!(err, ForensicsError::FileNotFound(_)));
}
