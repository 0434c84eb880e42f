/*!
 * Tests for slide segmentation over a frame source
 */

use image::{Rgb, RgbImage};
use indicatif::ProgressBar;

use vid2slides::errors::{ExtractError, VideoError};
use vid2slides::slides::{FrameComparator, SampledFrame, SsimComparator, extract_slides};
use crate::common::mock_sources::MockFrameSource;
use crate::common::{solid_frame, textured_frame};

/// Red channel identifies the slide, green channel is its sharpness
struct ChannelComparator;

impl FrameComparator for ChannelComparator {
    fn is_same_slide(&self, anchor: &SampledFrame, candidate: &SampledFrame) -> bool {
        anchor.image.get_pixel(0, 0)[0] == candidate.image.get_pixel(0, 0)[0]
    }

    fn is_better(&self, candidate: &SampledFrame, anchor: &SampledFrame) -> bool {
        candidate.image.get_pixel(0, 0)[1] > anchor.image.get_pixel(0, 0)[1]
    }
}

fn slide(id: u8, sharpness: u8) -> RgbImage {
    RgbImage::from_pixel(4, 4, Rgb([id, sharpness, 0]))
}

fn run(source: &mut MockFrameSource, indices: Vec<u64>) -> Result<Vec<RgbImage>, ExtractError> {
    let mut chosen = Vec::new();
    extract_slides(source, indices, ChannelComparator, &mut chosen, &ProgressBar::hidden())?;
    Ok(chosen)
}

#[test]
fn test_extract_slides_withThreeRuns_shouldKeepBestOfEach() {
    // A, A', B, B', C where the primed frames are sharper
    let frames = vec![slide(1, 10), slide(1, 20), slide(2, 30), slide(2, 5), slide(3, 1)];
    let mut source = MockFrameSource::new(frames);

    let chosen = run(&mut source, (0..5).collect()).unwrap();

    assert_eq!(chosen, vec![slide(1, 20), slide(2, 30), slide(3, 1)]);
}

#[test]
fn test_extract_slides_withSingleFrame_shouldEmitIt() {
    let mut source = MockFrameSource::new(vec![slide(9, 1)]);
    let chosen = run(&mut source, vec![0]).unwrap();
    assert_eq!(chosen, vec![slide(9, 1)]);
}

#[test]
fn test_extract_slides_withSameInput_shouldBeDeterministic() {
    let frames: Vec<RgbImage> = (0..12u8).map(|i| slide(i / 4, i % 4)).collect();

    let first = run(&mut MockFrameSource::new(frames.clone()), (0..12).collect()).unwrap();
    let second = run(&mut MockFrameSource::new(frames), (0..12).collect()).unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_extract_slides_withEarlyEndOfStream_shouldEmitOpenRun() {
    let mut source =
        MockFrameSource::new(vec![slide(1, 1), slide(2, 1), slide(2, 3)]).with_declared_count(10);
    let mut chosen = Vec::new();

    let stats = extract_slides(
        &mut source,
        0..10,
        ChannelComparator,
        &mut chosen,
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert!(stats.stopped_early);
    assert_eq!(stats.frames_examined, 3);
    assert_eq!(stats.last_index, Some(2));
    assert_eq!(chosen, vec![slide(1, 1), slide(2, 3)]);
    // The index past the end was attempted once, then the loop stopped
    assert_eq!(source.reads(), 4);
}

#[test]
fn test_extract_slides_withNoDecodableFrames_shouldFail() {
    let mut source = MockFrameSource::new(Vec::new()).with_declared_count(5);
    let result = run(&mut source, (0..5).collect());
    assert!(matches!(result, Err(ExtractError::NoFrames)));
}

#[test]
fn test_extract_slides_withDecodeError_shouldPropagate() {
    let mut source = MockFrameSource::new(vec![slide(1, 1), slide(1, 2)]).failing_at(1);
    let result = run(&mut source, vec![0, 1]);
    assert!(matches!(
        result,
        Err(ExtractError::Source(VideoError::Decode { index: 1, .. }))
    ));
}

#[test]
fn test_extract_slides_withSsimComparator_shouldSplitOnSlideChanges() {
    let frames = vec![
        solid_frame(0),
        solid_frame(0),
        solid_frame(128),
        solid_frame(255),
        solid_frame(255),
    ];
    let mut source = MockFrameSource::new(frames);
    let mut chosen = Vec::new();

    let stats = extract_slides(
        &mut source,
        0..5,
        SsimComparator::default(),
        &mut chosen,
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(stats.slides_emitted, 3);
    assert_eq!(chosen, vec![solid_frame(0), solid_frame(128), solid_frame(255)]);
}

#[test]
fn test_extract_slides_withSsimComparatorAndBlurredFrames_shouldKeepSharpestOfEachRun() {
    let a = textured_frame(0, 2);
    let b = textured_frame(0, 4);
    let c = textured_frame(0, 8);
    let blurred = |image: &RgbImage| image::imageops::blur(image, 0.35);

    // Blurred copy opens the first run, and closes the second
    let frames = vec![blurred(&a), a.clone(), b.clone(), blurred(&b), c.clone()];
    let mut source = MockFrameSource::new(frames);
    let mut chosen = Vec::new();

    let stats = extract_slides(
        &mut source,
        0..5,
        SsimComparator::default(),
        &mut chosen,
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(stats.slides_emitted, 3);
    assert_eq!(chosen, vec![a, b, c]);
}
