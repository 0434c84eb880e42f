/*!
 * Video frame access.
 *
 * The extraction engine only sees the `FrameSource` trait; the ffmpeg-backed
 * implementation lives alongside it.
 */

pub mod probe;
pub mod source;

pub use probe::{VideoInfo, parse_probe_output, parse_rational};
pub use source::{FfmpegFrameSource, FrameSource};
