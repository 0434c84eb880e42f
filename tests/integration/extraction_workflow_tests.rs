/*!
 * End-to-end tests of the extraction workflow over a mock frame source
 */

use std::fs;
use anyhow::Result;
use lopdf::Document;

use vid2slides::app_config::Config;
use vid2slides::app_controller::Controller;
use vid2slides::cache::MARKER_FILE_NAME;
use vid2slides::errors::{AppError, ExtractError, VideoError};
use crate::common::mock_sources::MockFrameSource;
use crate::common::{
    cache_manager_at, create_temp_dir, create_test_file, create_test_video, init_test_logging,
    solid_frame,
};

fn three_slides() -> Vec<image::RgbImage> {
    vec![
        solid_frame(0),
        solid_frame(0),
        solid_frame(128),
        solid_frame(128),
        solid_frame(255),
        solid_frame(255),
    ]
}

fn controller(root: &std::path::Path, config: Config) -> Result<Controller> {
    init_test_logging();
    Ok(Controller::with_cache(config, cache_manager_at(root))?.without_progress())
}

fn config_with_rate(rate: f64) -> Config {
    Config {
        processing_rate: rate,
        ..Config::default()
    }
}

#[test]
fn test_process_withFreshCache_shouldExtractAndCommit() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "talk.mp4")?;
    let controller = controller(&temp.path().join("cache"), config_with_rate(1.0))?;
    let mut source = MockFrameSource::new(three_slides());

    let outcome = controller.process(&video, &mut source)?;

    assert!(!outcome.cache_hit());
    assert_eq!(outcome.frames.len(), 3);
    assert_eq!(source.reads(), 6);
    let stats = outcome.stats.expect("a miss runs the segmenter");
    assert_eq!(stats.slides_emitted, 3);
    assert!(!stats.stopped_early);

    let marker = fs::read_to_string(outcome.entry.dir.join(MARKER_FILE_NAME))?;
    assert_eq!(marker, outcome.entry.fingerprint.as_str());
    Ok(())
}

#[test]
fn test_process_withSameInputsTwice_shouldHitWithoutReadingFrames() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "talk.mp4")?;
    let controller = controller(&temp.path().join("cache"), config_with_rate(1.0))?;

    let first = controller.process(&video, &mut MockFrameSource::new(three_slides()))?;

    let mut second_source = MockFrameSource::new(three_slides());
    let second = controller.process(&video, &mut second_source)?;

    assert!(second.cache_hit());
    assert!(second.stats.is_none());
    assert_eq!(second_source.reads(), 0);
    assert_eq!(second.entry.dir, first.entry.dir);
    assert_eq!(second.frames, first.frames);
    Ok(())
}

#[test]
fn test_process_withDifferentRate_shouldMissIntoNewDirectory() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "talk.mp4")?;
    let root = temp.path().join("cache");

    let slow = controller(&root, config_with_rate(0.5))?
        .process(&video, &mut MockFrameSource::new(three_slides()))?;

    let mut source = MockFrameSource::new(three_slides());
    let fast = controller(&root, config_with_rate(1.0))?.process(&video, &mut source)?;

    assert!(!fast.cache_hit());
    assert!(source.reads() > 0);
    assert_ne!(fast.entry.fingerprint, slow.entry.fingerprint);
    assert_ne!(fast.entry.dir, slow.entry.dir);
    // Stride 2 samples frames 0, 2 and 4, one per slide
    assert_eq!(slow.frames.len(), 3);
    Ok(())
}

#[test]
fn test_process_withFailingSource_shouldLeaveNoMarkerAndRetryMisses() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "talk.mp4")?;
    let controller = controller(&temp.path().join("cache"), config_with_rate(1.0))?;

    let mut failing = MockFrameSource::new(three_slides()).failing_at(4);
    let error = controller.process(&video, &mut failing).unwrap_err();
    assert!(matches!(
        error,
        AppError::Extract(ExtractError::Source(VideoError::Decode { index: 4, .. }))
    ));

    let entries = controller.cache_entries();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].complete);
    assert!(!entries[0].dir.join(MARKER_FILE_NAME).exists());

    let mut retry_source = MockFrameSource::new(three_slides());
    let retry = controller.process(&video, &mut retry_source)?;
    assert!(!retry.cache_hit());
    assert_eq!(retry_source.reads(), 6);
    assert_eq!(retry.frames.len(), 3);
    assert_eq!(retry.entry.dir, entries[0].dir);
    Ok(())
}

#[test]
fn test_process_withSameVideoInTwoCaches_shouldWriteIdenticalFrames() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "talk.mp4")?;

    let a = controller(&temp.path().join("a"), config_with_rate(1.0))?
        .process(&video, &mut MockFrameSource::new(three_slides()))?;
    let b = controller(&temp.path().join("b"), config_with_rate(1.0))?
        .process(&video, &mut MockFrameSource::new(three_slides()))?;

    assert_eq!(a.frames.len(), b.frames.len());
    for (x, y) in a.frames.iter().zip(&b.frames) {
        assert_eq!(x.file_name(), y.file_name());
        assert_eq!(fs::read(x)?, fs::read(y)?);
    }
    Ok(())
}

#[test]
fn test_process_withEmptyVideo_shouldFailBeforeTouchingCache() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "empty.mp4")?;
    let root = temp.path().join("cache");
    let controller = controller(&root, Config::default())?;

    let mut source = MockFrameSource::new(Vec::new());
    let error = controller.process(&video, &mut source).unwrap_err();

    assert!(matches!(error, AppError::Extract(ExtractError::EmptyVideo(_))));
    assert_eq!(source.reads(), 0);
    assert!(!root.exists());
    Ok(())
}

#[test]
fn test_process_withMissingVideo_shouldFailBeforeTouchingCache() -> Result<()> {
    let temp = create_temp_dir()?;
    let root = temp.path().join("cache");
    let controller = controller(&root, Config::default())?;

    let error = controller
        .process(&temp.path().join("missing.mp4"), &mut MockFrameSource::new(three_slides()))
        .unwrap_err();

    assert!(matches!(error, AppError::Video(VideoError::NotFound(_))));
    assert!(!root.exists());
    Ok(())
}

#[test]
fn test_controller_withInvalidRate_shouldRefuseToStart() -> Result<()> {
    let temp = create_temp_dir()?;
    let result = Controller::with_cache(config_with_rate(0.0), cache_manager_at(temp.path()));
    assert!(matches!(result, Err(AppError::Config(message)) if message.contains("rate")));
    Ok(())
}

#[test]
fn test_write_pdf_afterProcess_shouldHaveOnePagePerSlide() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_video(temp.path(), "talk.mp4")?;
    let controller = controller(&temp.path().join("cache"), config_with_rate(1.0))?;

    let outcome = controller.process(&video, &mut MockFrameSource::new(three_slides()))?;
    let output = temp.path().join("out").join("talk.pdf");
    controller.write_pdf(&outcome.frames, &output)?;

    let doc = Document::load(&output)?;
    assert_eq!(doc.get_pages().len(), 3);

    // Deleting the frames removes the directory as a unit; the next run misses
    outcome.entry.remove()?;
    assert!(!outcome.entry.dir.exists());
    let again = controller.process(&video, &mut MockFrameSource::new(three_slides()))?;
    assert!(!again.cache_hit());
    Ok(())
}

#[test]
fn test_process_withChangedVideoBytes_shouldMiss() -> Result<()> {
    let temp = create_temp_dir()?;
    let video = create_test_file(temp.path(), "talk.mp4", b"version one")?;
    let controller = controller(&temp.path().join("cache"), config_with_rate(1.0))?;

    let first = controller.process(&video, &mut MockFrameSource::new(three_slides()))?;

    fs::write(&video, b"version two")?;
    let second = controller.process(&video, &mut MockFrameSource::new(three_slides()))?;

    assert!(!second.cache_hit());
    assert_ne!(first.entry.fingerprint, second.entry.fingerprint);
    Ok(())
}
