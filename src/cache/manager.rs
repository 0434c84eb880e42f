use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indicatif::ProgressBar;
use log::{debug, info};
use regex::Regex;
use walkdir::WalkDir;

use crate::errors::CacheError;
use crate::file_utils::FileManager;
use crate::slides::frame_set::parse_frame_index;
use crate::slides::{ProcessingParams, read_frame_set};
use super::fingerprint::Fingerprint;
use super::location::{
    CacheLocation, FixedCacheRoot, MARKER_FILE_NAME, UserCacheLocation, WorkingDirLocation,
};

static RESULT_DIR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\[[0-9a-f]{6}\]$").unwrap());

// @checks: Directory holds nothing but frame files and the marker.
// An empty directory counts, since `allocate` leaves one behind.
fn holds_only_cache_files(dir: &Path) -> bool {
    let Ok(mut children) = fs::read_dir(dir) else {
        return false;
    };

    children.all(|child| {
        let Ok(child) = child else {
            return false;
        };
        let is_file = child.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = child.file_name().to_string_lossy().to_string();
        is_file && (name == MARKER_FILE_NAME || parse_frame_index(&name).is_some())
    })
}

/// Outcome of resolving a (video, parameters) pair against the cache
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Result directory; on a miss it exists and is empty
    pub dir: PathBuf,
    pub fingerprint: Fingerprint,
    /// Whether `dir` already holds a complete frame set
    pub hit: bool,
}

impl CacheEntry {
    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(MARKER_FILE_NAME)
    }

    /// Record the fingerprint, declaring the frame set complete.
    /// Call only once every frame has been written.
    pub fn commit(&self) -> Result<(), CacheError> {
        let marker = self.marker_path();
        fs::write(&marker, self.fingerprint.as_str()).map_err(|e| CacheError::io(&marker, e))?;
        debug!("Wrote cache marker {:?}", marker);
        Ok(())
    }

    /// Frames of this entry in index order
    pub fn frames(&self) -> Result<Vec<PathBuf>, CacheError> {
        read_frame_set(&self.dir)
    }

    /// Delete the whole result directory
    pub fn remove(&self) -> Result<(), CacheError> {
        fs::remove_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))
    }
}

/// A result directory found while scanning the cache locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResult {
    pub dir: PathBuf,
    /// Label of the location it was found in
    pub location: &'static str,
    /// Whether a marker is present
    pub complete: bool,
    pub frame_count: usize,
    pub size_bytes: u64,
}

/// What `CacheManager::clean` removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub bytes_freed: u64,
}

/// Maps fingerprints to result directories across an ordered list of locations
pub struct CacheManager {
    locations: Vec<Box<dyn CacheLocation>>,
}

impl CacheManager {
    /// Locations are searched, and new directories placed, in the given order
    pub fn new(locations: Vec<Box<dyn CacheLocation>>) -> Self {
        Self { locations }
    }

    /// User cache root (or `cache_root` when given), then optionally the
    /// current working directory
    pub fn with_default_locations(cache_root: Option<PathBuf>, working_dir_fallback: bool) -> Self {
        let user = match cache_root {
            Some(root) => UserCacheLocation::new(FixedCacheRoot(root)),
            None => UserCacheLocation::system(),
        };

        let mut locations: Vec<Box<dyn CacheLocation>> = vec![Box::new(user)];
        if working_dir_fallback {
            locations.push(Box::new(WorkingDirLocation::current()));
        }

        Self::new(locations)
    }

    pub fn locations(&self) -> &[Box<dyn CacheLocation>] {
        &self.locations
    }

    /// `<file stem>[<fingerprint prefix>]`
    pub fn dir_name<P: AsRef<Path>>(video_path: P, fingerprint: &Fingerprint) -> String {
        let stem = video_path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "video".to_string());
        format!("{}[{}]", stem, fingerprint.prefix())
    }

    /// Fingerprint the video and find or allocate its result directory
    pub fn resolve<P: AsRef<Path>>(
        &self,
        video_path: P,
        params: &ProcessingParams,
        progress: &ProgressBar,
    ) -> Result<CacheEntry, CacheError> {
        let fingerprint = Fingerprint::of_file(video_path.as_ref(), params, progress)?;
        self.resolve_fingerprint(video_path, fingerprint)
    }

    pub fn resolve_fingerprint<P: AsRef<Path>>(
        &self,
        video_path: P,
        fingerprint: Fingerprint,
    ) -> Result<CacheEntry, CacheError> {
        let name = Self::dir_name(video_path, &fingerprint);

        if let Some(dir) = self.lookup(&name, &fingerprint) {
            return Ok(CacheEntry {
                dir,
                fingerprint,
                hit: true,
            });
        }

        let dir = self.allocate(&name)?;
        Ok(CacheEntry {
            dir,
            fingerprint,
            hit: false,
        })
    }

    /// First location, in priority order, holding a matching result directory
    pub fn lookup(&self, dir_name: &str, fingerprint: &Fingerprint) -> Option<PathBuf> {
        self.locations
            .iter()
            .find_map(|location| location.lookup(dir_name, fingerprint))
    }

    /// Create, or empty, `dir_name` in the first available location
    fn allocate(&self, dir_name: &str) -> Result<PathBuf, CacheError> {
        let (location, base) = self
            .locations
            .iter()
            .find_map(|location| location.base_dir().map(|base| (location, base)))
            .ok_or(CacheError::NoLocation)?;

        location.prepare(&base)?;

        let dir = base.join(dir_name);
        FileManager::ensure_dir(&dir).map_err(|e| CacheError::io(&dir, e))?;
        FileManager::clear_dir(&dir).map_err(|e| CacheError::io(&dir, e))?;

        info!("Allocated result directory in {}: {:?}", location.label(), dir);
        Ok(dir)
    }

    /// Every result directory across all locations. Directories whose name
    /// looks like a result directory but hold anything else are not ours and
    /// are skipped.
    pub fn entries(&self) -> Vec<CachedResult> {
        let mut seen: Vec<PathBuf> = Vec::new();
        let mut results = Vec::new();

        for location in &self.locations {
            let Some(base) = location.base_dir() else {
                continue;
            };
            if seen.contains(&base) || !base.is_dir() {
                continue;
            }
            seen.push(base.clone());

            for entry in WalkDir::new(&base)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let name = entry.file_name().to_string_lossy();
                if !entry.file_type().is_dir() || !RESULT_DIR_NAME.is_match(&name) {
                    continue;
                }

                let dir = entry.path().to_path_buf();
                if !holds_only_cache_files(&dir) {
                    debug!("Skipping {:?}: not a result directory", dir);
                    continue;
                }

                let complete = dir.join(MARKER_FILE_NAME).is_file();
                let frame_count = read_frame_set(&dir).map(|f| f.len()).unwrap_or(0);
                let size_bytes = FileManager::dir_size(&dir);

                results.push(CachedResult {
                    dir,
                    location: location.label(),
                    complete,
                    frame_count,
                    size_bytes,
                });
            }
        }

        results
    }

    /// Remove incomplete result directories, or every one when `all` is set
    pub fn clean(&self, all: bool) -> Result<CleanReport, CacheError> {
        let mut report = CleanReport::default();

        for entry in self.entries() {
            if entry.complete && !all {
                continue;
            }
            fs::remove_dir_all(&entry.dir).map_err(|e| CacheError::io(&entry.dir, e))?;
            info!("Removed {:?}", entry.dir);
            report.bytes_freed += entry.size_bytes;
            report.removed.push(entry.dir);
        }

        Ok(report)
    }
}
