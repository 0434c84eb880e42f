/*!
 * Persisted frame sets.
 *
 * Frames are written as `frame_00000.png`, `frame_00001.png`, ... and read
 * back by their parsed numeric index, so ordering never depends on
 * lexicographic sorting even past the padded width.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use image::RgbImage;
use log::debug;
use regex::Regex;

use crate::errors::{CacheError, ExtractError};
use super::frame::SampledFrame;

/// Zero-padded width of the index in frame file names
pub const FRAME_INDEX_WIDTH: usize = 5;

static FRAME_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^frame_(\d+)\.png$").unwrap());

/// File name for the frame at `index`
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:0width$}.png", index, width = FRAME_INDEX_WIDTH)
}

/// Numeric index encoded in a frame file name, if it is one
pub fn parse_frame_index(file_name: &str) -> Option<usize> {
    FRAME_NAME
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

/// Receives each chosen frame as soon as its run closes
pub trait SlideSink {
    fn accept(&mut self, frame: &SampledFrame) -> Result<(), ExtractError>;

    /// Frames accepted so far
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory sink, mostly useful to inspect a segmentation
impl SlideSink for Vec<RgbImage> {
    fn accept(&mut self, frame: &SampledFrame) -> Result<(), ExtractError> {
        self.push(frame.image.clone());
        Ok(())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Writes chosen frames into a result directory with contiguous indices
#[derive(Debug)]
pub struct FrameSetWriter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FrameSetWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in index order
    pub fn paths(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.written
    }
}

impl SlideSink for FrameSetWriter {
    fn accept(&mut self, frame: &SampledFrame) -> Result<(), ExtractError> {
        let path = self.dir.join(frame_file_name(self.written.len()));
        frame
            .image
            .save(&path)
            .map_err(|source| ExtractError::WriteFrame {
                path: path.clone(),
                source,
            })?;
        debug!("Saved source frame {} as {:?}", frame.index, path);
        self.written.push(path);
        Ok(())
    }

    fn len(&self) -> usize {
        self.written.len()
    }
}

/// List the frames of a result directory in index order.
///
/// Fails when the indices are not exactly `0..n`.
pub fn read_frame_set<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, CacheError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))?;

    let mut frames: Vec<(usize, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io(dir, e))?;
        let name = entry.file_name();
        if let Some(index) = parse_frame_index(&name.to_string_lossy()) {
            frames.push((index, entry.path()));
        }
    }

    frames.sort_by_key(|(index, _)| *index);

    for (expected, (index, _)) in frames.iter().enumerate() {
        if *index != expected {
            return Err(CacheError::CorruptFrameSet {
                dir: dir.to_path_buf(),
                reason: format!("expected frame {} but found frame {}", expected, index),
            });
        }
    }

    Ok(frames.into_iter().map(|(_, path)| path).collect())
}
