use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use indicatif::ProgressBar;
use sha2::{Digest, Sha256};

use crate::errors::CacheError;
use crate::slides::ProcessingParams;

/// Bytes read per hashing step
const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 of the video bytes followed by the canonical processing parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hex characters used to name result directories
    pub const PREFIX_LEN: usize = 6;

    /// Hash a video file in bounded chunks, reporting bytes to `progress`
    pub fn of_file<P: AsRef<Path>>(
        path: P,
        params: &ProcessingParams,
        progress: &ProgressBar,
    ) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CacheError::io(path, e))?;
        if let Ok(metadata) = file.metadata() {
            progress.set_length(metadata.len());
        }

        Self::digest(file, params, progress).map_err(|e| CacheError::io(path, e))
    }

    pub fn of_reader<R: Read>(reader: R, params: &ProcessingParams) -> io::Result<Self> {
        Self::digest(reader, params, &ProgressBar::hidden())
    }

    fn digest<R: Read>(
        mut reader: R,
        params: &ProcessingParams,
        progress: &ProgressBar,
    ) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..bytes_read]);
            progress.inc(bytes_read as u64);
        }

        hasher.update(params.canonical().as_bytes());
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    /// Wrap a stored hex digest, e.g. the content of a marker file
    pub fn from_hex(hex: &str) -> Self {
        Self(hex.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for directory names only; never compare on it
    pub fn prefix(&self) -> &str {
        let end = Self::PREFIX_LEN.min(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
