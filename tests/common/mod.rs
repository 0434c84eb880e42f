/*!
 * Common test utilities for the vid2slides test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use image::{Rgb, RgbImage};
use tempfile::TempDir;

use vid2slides::cache::{CacheManager, FixedCacheRoot, UserCacheLocation};


/// Route library logs through env_logger; `RUST_LOG=debug` shows them
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Stand-in for a video file; only its bytes matter to the fingerprint
pub fn create_test_video(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, b"not really a video, but stable bytes")
}

/// Solid gray frame; distinct levels such as 0, 128 and 255 never count as
/// the same slide
pub fn solid_frame(level: u8) -> RgbImage {
    RgbImage::from_pixel(16, 16, Rgb([level, level, level]))
}

/// Gray frame with a checkerboard of the given cell size drawn on top
pub fn textured_frame(level: u8, cell: u32) -> RgbImage {
    RgbImage::from_fn(16, 16, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Rgb([level, level, level])
        } else {
            Rgb([255 - level, 255 - level, 255 - level])
        }
    })
}

/// Cache manager with a single user-cache location rooted at `root`
pub fn cache_manager_at(root: &Path) -> CacheManager {
    CacheManager::new(vec![Box::new(UserCacheLocation::new(FixedCacheRoot(
        root.to_path_buf(),
    )))])
}
