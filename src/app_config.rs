use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::slides::{ProcessingParams, DEFAULT_PROCESSING_RATE, DEFAULT_SIMILARITY_THRESHOLD};

/// Application configuration module
/// This module handles the application configuration including loading
/// and validating configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Frames examined per second of playback
    #[serde(default = "default_processing_rate")]
    pub processing_rate: f64,

    /// Minimum SSIM for two frames to be the same slide
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Overrides the per-user cache root
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Also look for, and fall back to creating, result directories in the
    /// current working directory
    #[serde(default = "default_true")]
    pub working_dir_fallback: bool,

    /// Remove the result directory once the PDF is written
    #[serde(default)]
    pub delete_frames: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_processing_rate() -> f64 {
    DEFAULT_PROCESSING_RATE
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, or fall back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.params()
            .validate()
            .map_err(|e| anyhow!("{}", e))?;

        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().is_empty() {
                return Err(anyhow!("cache_dir must not be empty when set"));
            }
        }

        Ok(())
    }

    /// Parameters that take part in the cache fingerprint
    pub fn params(&self) -> ProcessingParams {
        ProcessingParams::new(self.processing_rate, self.similarity_threshold)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            processing_rate: default_processing_rate(),
            similarity_threshold: default_similarity_threshold(),
            cache_dir: None,
            working_dir_fallback: true,
            delete_frames: false,
            log_level: LogLevel::default(),
        }
    }
}
