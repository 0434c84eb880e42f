use serde::{Deserialize, Serialize};

use crate::errors::ExtractError;
use super::comparator::DEFAULT_SIMILARITY_THRESHOLD;

/// Default number of frames examined per second of playback
pub const DEFAULT_PROCESSING_RATE: f64 = 0.25;

/// Parameters that influence which frames end up in a result directory.
///
/// Every field participates in the cache fingerprint through
/// [`ProcessingParams::canonical`], so adding a field here without adding it
/// there would let stale frame sets be reused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParams {
    /// Frames examined per second of source playback
    pub processing_rate: f64,

    /// Minimum similarity for two frames to count as the same slide
    pub similarity_threshold: f64,
}

impl ProcessingParams {
    pub fn new(processing_rate: f64, similarity_threshold: f64) -> Self {
        Self {
            processing_rate,
            similarity_threshold,
        }
    }

    pub fn with_rate(processing_rate: f64) -> Self {
        Self::new(processing_rate, DEFAULT_SIMILARITY_THRESHOLD)
    }

    /// Stable byte encoding fed to the fingerprint digest after the video bytes
    pub fn canonical(&self) -> String {
        format!(
            "rate={};threshold={}",
            self.processing_rate, self.similarity_threshold
        )
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if !self.processing_rate.is_finite() || self.processing_rate <= 0.0 {
            return Err(ExtractError::InvalidParameters(format!(
                "processing rate must be a positive number, got {}",
                self.processing_rate
            )));
        }

        if !self.similarity_threshold.is_finite()
            || !(-1.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(ExtractError::InvalidParameters(format!(
                "similarity threshold must lie in [-1, 1], got {}",
                self.similarity_threshold
            )));
        }

        Ok(())
    }
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSING_RATE, DEFAULT_SIMILARITY_THRESHOLD)
    }
}
