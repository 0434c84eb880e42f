/*!
 * Tests for file and directory utilities
 */

use std::fs;
use vid2slides::file_utils::FileManager;
use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_file_exists_withFileAndDirectory_shouldDistinguish() {
    let temp = create_temp_dir().unwrap();
    let file = create_test_file(temp.path(), "a.txt", b"x").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp.path()));
    assert!(FileManager::dir_exists(temp.path()));
    assert!(!FileManager::dir_exists(&file));
}

#[test]
fn test_ensure_dir_withNestedPath_shouldCreateParents() {
    let temp = create_temp_dir().unwrap();
    let nested = temp.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested).unwrap();
    FileManager::ensure_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_clear_dir_withFilesAndSubdirs_shouldLeaveEmptyDir() {
    let temp = create_temp_dir().unwrap();
    let dir = temp.path().join("result");
    fs::create_dir_all(dir.join("nested")).unwrap();
    create_test_file(&dir, "frame_00000.png", b"1234").unwrap();
    create_test_file(&dir.join("nested"), "x", b"12").unwrap();

    assert_eq!(FileManager::dir_size(&dir), 6);
    FileManager::clear_dir(&dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}
