/*!
 * Slide extraction engine.
 *
 * - `sampler`: picks which frame indices to examine
 * - `comparator`: similarity and sharpness scores between frames
 * - `segmenter`: groups sampled frames into slide runs and keeps the best one
 * - `frame_set`: writes and reads the chosen frames of a result directory
 */

pub mod comparator;
pub mod frame;
pub mod frame_set;
pub mod params;
pub mod sampler;
pub mod segmenter;

pub use comparator::{FrameComparator, SsimComparator, DEFAULT_SIMILARITY_THRESHOLD};
pub use frame::SampledFrame;
pub use frame_set::{FrameSetWriter, SlideSink, frame_file_name, read_frame_set};
pub use params::{ProcessingParams, DEFAULT_PROCESSING_RATE};
pub use sampler::FrameSampler;
pub use segmenter::{ExtractionStats, RunState, SlideSegmenter, extract_slides};
