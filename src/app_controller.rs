use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::cache::{CacheEntry, CacheManager, CachedResult, CleanReport};
use crate::errors::{AppError, ExtractError, PdfError, VideoError};
use crate::file_utils::FileManager;
use crate::pdf;
use crate::slides::{
    ExtractionStats, FrameSampler, FrameSetWriter, SsimComparator, extract_slides,
};
use crate::video::{FfmpegFrameSource, FrameSource};

// @module: Application controller for slide extraction

/// Result of turning one video into a frame set
#[derive(Debug)]
pub struct ProcessOutcome {
    /// Result directory and fingerprint
    pub entry: CacheEntry,
    /// Chosen frames in slide order
    pub frames: Vec<PathBuf>,
    /// Segmentation summary; `None` when the frames came from the cache
    pub stats: Option<ExtractionStats>,
}

impl ProcessOutcome {
    pub fn cache_hit(&self) -> bool {
        self.entry.hit
    }
}

/// Main application controller for video to slide PDF conversion
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Result directory cache
    cache: CacheManager,

    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let cache =
            CacheManager::with_default_locations(config.cache_dir.clone(), config.working_dir_fallback);
        Self::with_cache(config, cache)
    }

    /// Create a controller over an explicit cache, e.g. one rooted in a temp dir
    pub fn with_cache(config: Config, cache: CacheManager) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;

        Ok(Self {
            config,
            cache,
            show_progress: true,
        })
    }

    /// Disable progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Run the main workflow: video in, slide PDF out. Returns the PDF path.
    pub fn run(
        &self,
        input_file: PathBuf,
        output_path: Option<PathBuf>,
    ) -> Result<PathBuf, AppError> {
        let start_time = Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(VideoError::NotFound(input_file).into());
        }

        let mut source = FfmpegFrameSource::open(&input_file)?;

        let outcome = self.process(&input_file, &mut source)?;

        let output_path =
            output_path.unwrap_or_else(|| FileManager::generate_output_path(&input_file, "."));
        self.write_pdf(&outcome.frames, &output_path)?;

        if self.config.delete_frames {
            outcome.entry.remove()?;
            info!("Deleted result directory {:?}", outcome.entry.dir);
        }

        info!(
            "Success: {} ({} slide(s) in {})",
            output_path.display(),
            outcome.frames.len(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(output_path)
    }

    /// Produce the frame set for `video_path`, reusing a cached one when the
    /// fingerprint matches.
    ///
    /// Input problems are reported before any result directory is touched,
    /// and the marker is written only after every frame has been saved.
    pub fn process<S: FrameSource + ?Sized>(
        &self,
        video_path: &Path,
        source: &mut S,
    ) -> Result<ProcessOutcome, AppError> {
        let params = self.config.params();
        params.validate()?;

        if !FileManager::file_exists(video_path) {
            return Err(VideoError::NotFound(video_path.to_path_buf()).into());
        }

        if source.frame_count() == 0 {
            return Err(ExtractError::EmptyVideo(video_path.to_path_buf()).into());
        }

        let hash_pb = self.progress_bar(0, "bytes", "Fingerprinting");
        let entry = self.cache.resolve(video_path, &params, &hash_pb)?;
        hash_pb.finish_and_clear();

        if entry.hit {
            let frames = entry.frames()?;
            info!(
                "Reusing {} cached slide(s) from {:?}",
                frames.len(),
                entry.dir
            );
            return Ok(ProcessOutcome {
                entry,
                frames,
                stats: None,
            });
        }

        let sampler = FrameSampler::new(
            source.native_rate(),
            source.frame_count(),
            params.processing_rate,
        );
        debug!(
            "Sampling every {} frame(s) out of {} ({} to examine)",
            sampler.stride(),
            sampler.total_frames(),
            sampler.len()
        );

        let extract_pb = self.progress_bar(sampler.len(), "frames", "Extracting slides");
        let mut writer = FrameSetWriter::new(&entry.dir);
        let stats = extract_slides(
            source,
            sampler.indices(),
            SsimComparator::new(params.similarity_threshold),
            &mut writer,
            &extract_pb,
        )?;
        extract_pb.finish_and_clear();

        entry.commit()?;
        info!(
            "Extracted {} slide(s) from {} sampled frame(s) into {:?}",
            stats.slides_emitted, stats.frames_examined, entry.dir
        );

        Ok(ProcessOutcome {
            entry,
            frames: writer.into_paths(),
            stats: Some(stats),
        })
    }

    /// Assemble the PDF for a frame set
    pub fn write_pdf(&self, frames: &[PathBuf], output_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = output_path.parent() {
            FileManager::ensure_dir(parent).map_err(|source| PdfError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let pb = self.progress_bar(frames.len() as u64, "pages", "Writing PDF");
        pdf::write_pdf(frames, output_path, &pb)?;
        pb.finish_and_clear();
        Ok(())
    }

    /// Result directories across all cache locations
    pub fn cache_entries(&self) -> Vec<CachedResult> {
        self.cache.entries()
    }

    /// Remove incomplete result directories, or all of them
    pub fn clean_cache(&self, all: bool) -> Result<CleanReport, AppError> {
        let report = self.cache.clean(all)?;
        info!(
            "Removed {} result director{} ({})",
            report.removed.len(),
            if report.removed.len() == 1 { "y" } else { "ies" },
            Self::format_size(report.bytes_freed)
        );
        Ok(report)
    }

    fn progress_bar(&self, len: u64, unit: &str, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(message);
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Byte count with a binary unit suffix
    pub fn format_size(bytes: u64) -> String {
        const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
        let mut value = bytes as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", bytes, UNITS[0])
        } else {
            format!("{:.1} {}", value, UNITS[unit])
        }
    }
}
