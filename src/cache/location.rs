/*!
 * Places where result directories may live.
 *
 * The cache manager tries an ordered list of `CacheLocation`s. Each one can
 * report an existing result directory whose marker matches the full
 * fingerprint, and can host a fresh directory on a miss.
 */

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::CacheError;
use super::fingerprint::Fingerprint;

/// Directory created under the user cache root
pub const APP_DIR_NAME: &str = "vid2slides";

/// File inside a result directory holding the full fingerprint
pub const MARKER_FILE_NAME: &str = "fingerprint";

/// Notice dropped at the root of the user cache
pub const WARNING_FILE_NAME: &str = "DO NOT MODIFY THIS FOLDER.txt";

const WARNING_TEXT: &str = "FILES IN THIS FOLDER ARE MANAGED BY VID2SLIDES AND MAY BE DELETED. \
PLEASE DO NOT MODIFY THIS FOLDER OR STORE IMPORTANT FILES HERE.\n";

/// Supplies the process-wide cache root
pub trait CacheRootProvider {
    fn cache_root(&self) -> Option<PathBuf>;
}

/// `$XDG_CACHE_HOME/vid2slides` or the platform equivalent
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCacheRoot;

impl CacheRootProvider for SystemCacheRoot {
    fn cache_root(&self) -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(APP_DIR_NAME))
    }
}

/// A root chosen up front, from configuration or by a test
#[derive(Debug, Clone)]
pub struct FixedCacheRoot(pub PathBuf);

impl CacheRootProvider for FixedCacheRoot {
    fn cache_root(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// One candidate base directory for result directories
pub trait CacheLocation {
    /// Human-readable name for logs
    fn label(&self) -> &'static str;

    /// Base directory, or `None` when this location is unavailable
    fn base_dir(&self) -> Option<PathBuf>;

    /// Make sure the base directory exists before hosting a result directory
    fn prepare(&self, base: &Path) -> Result<(), CacheError> {
        fs::create_dir_all(base).map_err(|e| CacheError::io(base, e))
    }

    /// The result directory `dir_name` if its marker holds exactly `fingerprint`
    fn lookup(&self, dir_name: &str, fingerprint: &Fingerprint) -> Option<PathBuf> {
        let dir = self.base_dir()?.join(dir_name);
        let marker = dir.join(MARKER_FILE_NAME);

        match fs::read_to_string(&marker) {
            Ok(stored) if stored == fingerprint.as_str() => {
                debug!("Cache hit in {}: {:?}", self.label(), dir);
                Some(dir)
            }
            Ok(_) => {
                debug!("Marker in {:?} belongs to another fingerprint", dir);
                None
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Ignoring unreadable cache marker {:?}: {}", marker, e);
                None
            }
        }
    }
}

/// The per-user cache root; the preferred home for new result directories
pub struct UserCacheLocation {
    provider: Box<dyn CacheRootProvider>,
}

impl UserCacheLocation {
    pub fn new<P: CacheRootProvider + 'static>(provider: P) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    pub fn system() -> Self {
        Self::new(SystemCacheRoot)
    }
}

impl CacheLocation for UserCacheLocation {
    fn label(&self) -> &'static str {
        "user cache"
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.provider.cache_root()
    }

    fn prepare(&self, base: &Path) -> Result<(), CacheError> {
        fs::create_dir_all(base).map_err(|e| CacheError::io(base, e))?;

        let warning = base.join(WARNING_FILE_NAME);
        if !warning.exists() {
            fs::write(&warning, WARNING_TEXT).map_err(|e| CacheError::io(&warning, e))?;
        }
        Ok(())
    }
}

/// Result directories next to where the tool is run
#[derive(Debug, Clone)]
pub struct WorkingDirLocation {
    dir: Option<PathBuf>,
}

impl WorkingDirLocation {
    pub fn current() -> Self {
        Self {
            dir: std::env::current_dir().ok(),
        }
    }

    pub fn at<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: Some(dir.as_ref().to_path_buf()),
        }
    }
}

impl CacheLocation for WorkingDirLocation {
    fn label(&self) -> &'static str {
        "working directory"
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.dir.clone()
    }
}
