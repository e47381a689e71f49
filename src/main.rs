// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use hocr2iiif::app_config::{self, Config};
use hocr2iiif::{ConversionRequest, Controller, Granularity, LinkOutcome};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
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
    /// Convert an hOCR file and link it into a manifest (default command)
    Convert(ConvertArgs),

    /// Generate shell completions for hocr2iiif
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// hOCR file to convert
    #[arg(value_name = "HOCR_PATH")]
    input_path: PathBuf,

    /// Manifest to link the annotation list into
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Text granularity: word, line or paragraph
    #[arg(short, long)]
    granularity: Option<String>,

    /// Page identifier (default: hOCR file name without its .hocr suffix)
    #[arg(short, long)]
    identifier: Option<String>,

    /// Annotation list output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// hocr2iiif - hOCR to IIIF annotation lists
///
/// Converts OCR output into IIIF Open Annotation lists and links them into
/// the matching canvas of a presentation manifest.
#[derive(Parser, Debug)]
#[command(name = "hocr2iiif")]
#[command(version)]
#[command(about = "Convert hOCR into IIIF annotation lists")]
#[command(long_about = "hocr2iiif turns an hOCR page into an IIIF annotation list and links it into a manifest.

EXAMPLES:
    hocr2iiif 002.hocr                              # Paragraph annotations next to the input
    hocr2iiif -g word 002.hocr                      # One annotation per word
    hocr2iiif -m manifest.json 002.hocr             # Also link the list into the manifest
    hocr2iiif -i page-2 -o out/list.json 002.hocr   # Explicit identifier and output path
    hocr2iiif completions bash > hocr2iiif.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. It holds the canvas and
    annotation-list URI templates, both expanded with {id}. If the config file
    doesn't exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// hOCR file to convert
    #[arg(value_name = "HOCR_PATH")]
    input_path: Option<PathBuf>,

    /// Manifest to link the annotation list into
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Text granularity: word, line or paragraph
    #[arg(short, long)]
    granularity: Option<String>,

    /// Page identifier (default: hOCR file name without its .hocr suffix)
    #[arg(short, long)]
    identifier: Option<String>,

    /// Annotation list output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Accept everything here; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "hocr2iiif", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            // Default behavior - top-level args stand in for the convert subcommand
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("HOCR_PATH is required when no subcommand is specified")
            })?;

            run_convert(ConvertArgs {
                input_path,
                manifest: cli.manifest,
                granularity: cli.granularity,
                identifier: cli.identifier,
                output: cli.output,
                config_path: cli.config_path,
                log_level: cli.log_level,
            })
        }
    }
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    // Parsed here so an unknown value surfaces as UnsupportedGranularity
    let granularity = options
        .granularity
        .as_deref()
        .map(str::parse::<Granularity>)
        .transpose()
        .context("Invalid --granularity")?;

    let controller = Controller::with_config(config)?;

    let request = ConversionRequest {
        hocr_path: options.input_path,
        granularity,
        identifier: options.identifier,
        output_path: options.output,
        manifest_path: options.manifest.clone(),
    };

    let report = controller.run(&request)?;

    info!(
        "Success: {} annotations in {}",
        report.annotation_count,
        report.output_path.display()
    );

    match (report.link, &options.manifest) {
        (Some(LinkOutcome::AlreadyLinked), _) => {
            println!("AnnotationList {} already linked in Manifest", report.identifier);
        }
        (Some(LinkOutcome::Linked), Some(manifest)) => {
            println!("Linked AnnotationList {} into {}", report.identifier, manifest.display());
        }
        _ => {}
    }

    println!("done");
    Ok(())
}
