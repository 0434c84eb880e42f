/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;
use vid2slides::app_config::{Config, LogLevel};
use vid2slides::slides::{DEFAULT_PROCESSING_RATE, DEFAULT_SIMILARITY_THRESHOLD};
use crate::common::{create_temp_dir, create_test_file};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.processing_rate, DEFAULT_PROCESSING_RATE);
    assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(config.cache_dir, None);
    assert!(config.working_dir_fallback);
    assert!(!config.delete_frames);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_serialization_withCustomValues_shouldRoundTrip() {
    let config = Config {
        processing_rate: 2.0,
        similarity_threshold: 0.8,
        cache_dir: Some(PathBuf::from("/tmp/slides-cache")),
        working_dir_fallback: false,
        delete_frames: true,
        log_level: LogLevel::Debug,
    };

    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"log_level\": \"debug\""));

    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_load_or_default_withMissingFile_shouldUseDefaults() {
    let temp = create_temp_dir().unwrap();
    let config = Config::load_or_default(temp.path().join("conf.json")).unwrap();
    assert_eq!(config, Config::default());
    assert!(!temp.path().join("conf.json").exists());
}

#[test]
fn test_load_or_default_withFile_shouldReadValues() {
    let temp = create_temp_dir().unwrap();
    let path = create_test_file(
        temp.path(),
        "conf.json",
        br#"{ "processing_rate": 0.5, "log_level": "warn" }"#,
    )
    .unwrap();

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.processing_rate, 0.5);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
}

#[test]
fn test_load_or_default_withInvalidJson_shouldFail() {
    let temp = create_temp_dir().unwrap();
    let path = create_test_file(temp.path(), "conf.json", b"{ not json").unwrap();
    assert!(Config::load_or_default(&path).is_err());
}

#[test]
fn test_validate_withOutOfRangeValues_shouldFail() {
    let negative_rate = Config {
        processing_rate: -1.0,
        ..Config::default()
    };
    assert!(negative_rate.validate().is_err());

    let nan_rate = Config {
        processing_rate: f64::NAN,
        ..Config::default()
    };
    assert!(nan_rate.validate().is_err());

    let threshold = Config {
        similarity_threshold: 1.5,
        ..Config::default()
    };
    assert!(threshold.validate().is_err());

    let empty_dir = Config {
        cache_dir: Some(PathBuf::new()),
        ..Config::default()
    };
    assert!(empty_dir.validate().is_err());
}

#[test]
fn test_log_level_to_level_filter_shouldMatch() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
