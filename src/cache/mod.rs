/*!
 * Content-addressed cache of extracted frame sets.
 *
 * A result directory is identified by the fingerprint of the video bytes and
 * the processing parameters. It only counts as complete once its marker file
 * holds the full fingerprint, and the marker is written last.
 *
 * Two processes working on the same fingerprint at the same time are not
 * coordinated and may clobber each other's directory.
 */

pub mod fingerprint;
pub mod location;
pub mod manager;

pub use fingerprint::Fingerprint;
pub use location::{
    CacheLocation, CacheRootProvider, FixedCacheRoot, SystemCacheRoot, UserCacheLocation,
    WorkingDirLocation, APP_DIR_NAME, MARKER_FILE_NAME, WARNING_FILE_NAME,
};
pub use manager::{CacheEntry, CacheManager, CachedResult, CleanReport};
