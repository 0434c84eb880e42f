/*!
 * Error types for the vid2slides application.
 *
 * This module contains custom error types for the different parts of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a frame source
#[derive(Error, Debug)]
pub enum VideoError {
    /// The input video does not exist or is not a regular file
    #[error("Video file not found: {0:?}")]
    NotFound(PathBuf),

    /// An external tool (ffmpeg/ffprobe) could not be started
    #[error("Required tool '{tool}' is not available: {source}")]
    ToolMissing {
        /// Name of the binary
        tool: &'static str,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// The container could not be probed for a video stream
    #[error("Failed to probe video: {0}")]
    Probe(String),

    /// A frame could not be decoded for a reason other than end of stream
    #[error("Failed to decode frame {index}: {message}")]
    Decode {
        /// Absolute frame index that failed
        index: u64,
        /// Decoder message
        message: String,
    },
}

/// Errors that can occur while segmenting a video into slides
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Processing parameters are out of range
    #[error("Invalid processing parameters: {0}")]
    InvalidParameters(String),

    /// The frame source reported zero frames up front
    #[error("Video has no frames: {0:?}")]
    EmptyVideo(PathBuf),

    /// No frame could be read at all, so there is nothing to emit
    #[error("No decodable frames were found in the video")]
    NoFrames,

    /// Error from the frame source
    #[error("Frame source error: {0}")]
    Source(#[from] VideoError),

    /// A chosen frame could not be written to the result directory
    #[error("Failed to write frame {path:?}: {source}")]
    WriteFrame {
        /// Destination path
        path: PathBuf,
        /// Encoder error
        source: image::ImageError,
    },
}

/// Errors that can occur in the result-directory cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem operation on a cache path failed
    #[error("Cache I/O error at {path:?}: {source}")]
    Io {
        /// Path involved in the failing operation
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// None of the configured locations can hold a result directory
    #[error("No usable cache location is available")]
    NoLocation,

    /// A cached frame set is not a contiguous zero-based sequence
    #[error("Corrupt frame set in {dir:?}: {reason}")]
    CorruptFrameSet {
        /// Result directory
        dir: PathBuf,
        /// What is wrong with it
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur while assembling the PDF
#[derive(Error, Debug)]
pub enum PdfError {
    /// The frame set is empty
    #[error("Cannot build a PDF without at least one frame")]
    NoFrames,

    /// A frame image could not be loaded
    #[error("Failed to load frame {path:?}: {source}")]
    Image {
        /// Frame path
        path: PathBuf,
        /// Decoder error
        source: image::ImageError,
    },

    /// The PDF document could not be encoded
    #[error("Failed to encode PDF: {0}")]
    Encode(String),

    /// The output file could not be written
    #[error("Failed to write PDF {path:?}: {source}")]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Error returned by the application controller
#[derive(Error, Debug)]
pub enum AppError {
    /// The configuration was rejected before any work started
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the frame source
    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    /// Error from slide extraction
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Error from the cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from PDF assembly
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),
}
