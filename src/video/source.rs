use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbImage;
use log::{debug, info};

use crate::errors::VideoError;
use super::probe::{self, VideoInfo};

/// Random access to the decoded frames of a video.
///
/// Dropping the source releases it.
pub trait FrameSource {
    /// Native frames per second
    fn native_rate(&self) -> f64;

    /// Declared number of frames
    fn frame_count(&self) -> u64;

    /// Pixel size of decoded frames
    fn dimensions(&self) -> (u32, u32);

    /// Seek to `index` and decode that frame. `Ok(None)` means end of stream,
    /// which may arrive before `frame_count()` on truncated files.
    fn read_frame(&mut self, index: u64) -> Result<Option<RgbImage>, VideoError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn native_rate(&self) -> f64 {
        (**self).native_rate()
    }

    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn read_frame(&mut self, index: u64) -> Result<Option<RgbImage>, VideoError> {
        (**self).read_frame(index)
    }
}

/// Frame source backed by the ffprobe and ffmpeg binaries.
///
/// Each read spawns one ffmpeg process that seeks to the frame's timestamp
/// and writes a single raw RGB frame to stdout.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    path: PathBuf,
    info: VideoInfo,
}

impl FfmpegFrameSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VideoError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(VideoError::NotFound(path.to_path_buf()));
        }

        let info = probe::probe(path)?;
        info!(
            "Opened {:?}: {}x{} @ {:.3} fps, {} frames",
            path.file_name().unwrap_or_default(),
            info.width,
            info.height,
            info.frame_rate,
            info.frame_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            info,
        })
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp(&self, index: u64) -> f64 {
        index as f64 / self.info.frame_rate
    }
}

impl FrameSource for FfmpegFrameSource {
    fn native_rate(&self) -> f64 {
        self.info.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.info.frame_count
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn read_frame(&mut self, index: u64) -> Result<Option<RgbImage>, VideoError> {
        let (width, height) = self.dimensions();
        let timestamp = format!("{:.6}", self.timestamp(index));

        let output = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-ss", &timestamp, "-i"])
            .arg(&self.path)
            .args(["-frames:v", "1"])
            .args(["-vf", &format!("scale={}:{}", width, height)])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .output()
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => VideoError::ToolMissing {
                    tool: "ffmpeg",
                    source,
                },
                _ => VideoError::Decode {
                    index,
                    message: source.to_string(),
                },
            })?;

        let expected = width as usize * height as usize * 3;
        if output.stdout.len() < expected {
            // Past the last decodable frame ffmpeg produces no output; a
            // corrupt tail behaves the same and is treated as end of stream.
            debug!(
                "No frame at index {} (t={}s, status {}): {}",
                index,
                timestamp,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let mut pixels = output.stdout;
        pixels.truncate(expected);
        RgbImage::from_raw(width, height, pixels)
            .map(Some)
            .ok_or_else(|| VideoError::Decode {
                index,
                message: "frame buffer does not match the probed dimensions".to_string(),
            })
    }
}
