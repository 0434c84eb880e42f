use indicatif::ProgressBar;
use log::{debug, info};

use crate::errors::ExtractError;
use crate::video::FrameSource;
use super::comparator::FrameComparator;
use super::frame::SampledFrame;
use super::frame_set::SlideSink;

/// State of the run currently being accumulated
#[derive(Debug, Clone)]
pub enum RunState {
    /// Nothing sampled yet
    NoAnchor,
    /// A run is open; `anchor` is its best frame so far
    OpenRun {
        anchor: SampledFrame,
        members: usize,
    },
}

impl RunState {
    pub fn new() -> Self {
        RunState::NoAnchor
    }

    /// Feed the next sampled frame. Returns the new state and, when the frame
    /// starts a new run, the chosen frame of the run that just closed.
    pub fn transition<C: FrameComparator + ?Sized>(
        self,
        frame: SampledFrame,
        comparator: &C,
    ) -> (RunState, Option<SampledFrame>) {
        match self {
            RunState::NoAnchor => (
                RunState::OpenRun {
                    anchor: frame,
                    members: 1,
                },
                None,
            ),

            RunState::OpenRun { anchor, members } => {
                if comparator.is_same_slide(&anchor, &frame) {
                    let anchor = if comparator.is_better(&frame, &anchor) {
                        frame
                    } else {
                        anchor
                    };
                    (
                        RunState::OpenRun {
                            anchor,
                            members: members + 1,
                        },
                        None,
                    )
                } else {
                    debug!(
                        "Slide boundary at frame {}: closing run of {} frame(s), keeping frame {}",
                        frame.index, members, anchor.index
                    );
                    (
                        RunState::OpenRun {
                            anchor: frame,
                            members: 1,
                        },
                        Some(anchor),
                    )
                }
            }
        }
    }

    /// End of input: the open run, however short, is always emitted
    pub fn finish(self) -> Option<SampledFrame> {
        match self {
            RunState::NoAnchor => None,
            RunState::OpenRun { anchor, .. } => Some(anchor),
        }
    }

    pub fn anchor(&self) -> Option<&SampledFrame> {
        match self {
            RunState::NoAnchor => None,
            RunState::OpenRun { anchor, .. } => Some(anchor),
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups consecutive similar frames into runs and keeps the best of each
pub struct SlideSegmenter<C> {
    comparator: C,
    state: RunState,
    frames_seen: u64,
}

impl<C: FrameComparator> SlideSegmenter<C> {
    pub fn new(comparator: C) -> Self {
        Self {
            comparator,
            state: RunState::NoAnchor,
            frames_seen: 0,
        }
    }

    pub fn push(&mut self, frame: SampledFrame) -> Option<SampledFrame> {
        self.frames_seen += 1;

        let state = std::mem::take(&mut self.state);
        let (next, emitted) = state.transition(frame, &self.comparator);
        self.state = next;

        emitted
    }

    pub fn finish(&mut self) -> Option<SampledFrame> {
        std::mem::take(&mut self.state).finish()
    }

    pub fn current_state(&self) -> &RunState {
        &self.state
    }

    pub fn frame_count(&self) -> u64 {
        self.frames_seen
    }
}

/// Summary of one segmentation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Sampled frames actually decoded
    pub frames_examined: u64,
    /// Chosen frames handed to the sink
    pub slides_emitted: usize,
    /// The source ran out before the sampled indices did
    pub stopped_early: bool,
    /// Last frame index that was decoded
    pub last_index: Option<u64>,
}

/// Walk `indices`, pull each frame from `source` and hand one chosen frame
/// per slide run to `sink`, in temporal order.
///
/// End of stream before the indices are exhausted is not an error: the open
/// run is closed and emitted. Reading no frame at all is.
pub fn extract_slides<S, C, K, I>(
    source: &mut S,
    indices: I,
    comparator: C,
    sink: &mut K,
    progress: &ProgressBar,
) -> Result<ExtractionStats, ExtractError>
where
    S: FrameSource + ?Sized,
    C: FrameComparator,
    K: SlideSink + ?Sized,
    I: IntoIterator<Item = u64>,
{
    let mut segmenter = SlideSegmenter::new(comparator);
    let mut stats = ExtractionStats::default();

    for index in indices {
        let Some(image) = source.read_frame(index)? else {
            info!(
                "Frame source ended at frame {} (declared {} frames)",
                index,
                source.frame_count()
            );
            stats.stopped_early = true;
            break;
        };

        stats.frames_examined += 1;
        stats.last_index = Some(index);

        if let Some(chosen) = segmenter.push(SampledFrame::new(index, image)) {
            sink.accept(&chosen)?;
            stats.slides_emitted += 1;
        }

        progress.inc(1);
    }

    let last = segmenter.finish().ok_or(ExtractError::NoFrames)?;
    sink.accept(&last)?;
    stats.slides_emitted += 1;

    debug!(
        "Examined {} frame(s), emitted {} slide(s)",
        stats.frames_examined, stats.slides_emitted
    );

    Ok(stats)
}
