// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use vid2slides::app_config::{self, Config};
use vid2slides::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract slides from a video into a PDF (default command)
    Extract(ExtractArgs),

    /// Inspect or clean cached result directories
    Cache {
        #[command(subcommand)]
        action: CacheCommand,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Generate shell completions for vid2slides
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// List result directories and whether they are complete
    List,

    /// Remove incomplete result directories
    Clean {
        /// Remove complete result directories as well
        #[arg(long)]
        all: bool,
    },
}

/// Options shared by every command that touches the cache
#[derive(Args, Debug, Clone)]
struct SettingsArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Directory holding cached result directories
    #[arg(long, env = "VID2SLIDES_CACHE_DIR", value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

/// Options controlling a single extraction
#[derive(Args, Debug, Clone)]
struct ExtractOptions {
    /// Frames examined per second of playback
    #[arg(short, long)]
    rate: Option<f64>,

    /// Minimum similarity (SSIM) for two frames to be the same slide
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Output PDF path (defaults to ./<video name>.pdf)
    #[arg(short, long, value_name = "PDF")]
    output: Option<PathBuf>,

    /// Delete the extracted frames once the PDF is written
    #[arg(long)]
    delete_frames: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Input video file
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    #[command(flatten)]
    options: ExtractOptions,

    #[command(flatten)]
    settings: SettingsArgs,
}

/// vid2slides - turn recorded presentations into slide PDFs
///
/// Samples a video, keeps one sharp frame per distinct slide and writes them
/// as a PDF. Extracted frames are cached per video and parameters.
#[derive(Parser, Debug)]
#[command(name = "vid2slides")]
#[command(version)]
#[command(about = "Extract presentation slides from a video into a PDF")]
#[command(long_about = "vid2slides samples a video, keeps one sharp frame per distinct slide and writes them as a PDF.

EXAMPLES:
    vid2slides talk.mp4                         # Write ./talk.pdf with default settings
    vid2slides -r 1 talk.mp4                    # Examine one frame per second
    vid2slides -t 0.95 -o slides.pdf talk.mp4   # Stricter slide matching, custom output
    vid2slides --delete-frames talk.mp4         # Do not keep extracted frames
    vid2slides cache list                       # Show cached result directories
    vid2slides cache clean --all                # Remove every cached result directory
    vid2slides completions bash > vid2slides.bash

CONFIGURATION:
    Settings are read from conf.json when it exists. You can specify a different
    config file with --config. Command line options override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file
    #[arg(value_name = "VIDEO")]
    video: Option<PathBuf>,

    #[command(flatten)]
    options: ExtractOptions,

    #[command(flatten)]
    settings: SettingsArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Accept everything here; the effective level is applied with set_max_level
    // once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vid2slides", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Extract(args)) => run_extract(args),
        Some(Commands::Cache { action, settings }) => run_cache(action, settings),
        None => {
            // Default behavior - use top-level args
            let video = cli
                .video
                .ok_or_else(|| anyhow!("VIDEO is required when no subcommand is specified"))?;

            run_extract(ExtractArgs {
                video,
                options: cli.options,
                settings: cli.settings,
            })
        }
    }
}

// @loads: Config file (if present) with command line overrides applied
fn load_config(settings: &SettingsArgs, options: Option<&ExtractOptions>) -> Result<Config> {
    if let Some(level) = settings.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_default(&settings.config_path)?;

    if let Some(level) = settings.log_level {
        config.log_level = level.into();
    }

    if let Some(cache_dir) = &settings.cache_dir {
        config.cache_dir = Some(cache_dir.clone());
    }

    if let Some(options) = options {
        if let Some(rate) = options.rate {
            config.processing_rate = rate;
        }
        if let Some(threshold) = options.threshold {
            config.similarity_threshold = threshold;
        }
        if options.delete_frames {
            config.delete_frames = true;
        }
    }

    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let config = load_config(&args.settings, Some(&args.options))?;

    info!(
        "Processing {:?} at {} frame(s)/s, threshold {}",
        args.video, config.processing_rate, config.similarity_threshold
    );

    let controller = Controller::with_config(config)?;
    controller.run(args.video, args.options.output)?;
    Ok(())
}

fn run_cache(action: CacheCommand, settings: SettingsArgs) -> Result<()> {
    let config = load_config(&settings, None)?;
    let controller = Controller::with_config(config)?;

    match action {
        CacheCommand::List => {
            let entries = controller.cache_entries();
            if entries.is_empty() {
                warn!("No cached result directories found");
                return Ok(());
            }

            for entry in entries {
                println!(
                    "{:<10} {:>4} frame(s) {:>10}  [{}] {}",
                    if entry.complete { "complete" } else { "incomplete" },
                    entry.frame_count,
                    Controller::format_size(entry.size_bytes),
                    entry.location,
                    entry.dir.display()
                );
            }
        }
        CacheCommand::Clean { all } => {
            controller.clean_cache(all)?;
        }
    }

    Ok(())
}
