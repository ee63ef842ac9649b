// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use otapack::app_config::{self, Config};
use otapack::{BuildError, Controller};

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
    /// Generate shell completions for otapack
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// otapack - OTA page packer
///
/// Inlines, minifies and gzips the OTA update page, then writes it as a
/// PROGMEM byte array header for the firmware build.
#[derive(Parser, Debug)]
#[command(name = "otapack")]
#[command(version)]
#[command(about = "Pack the OTA update page into a firmware header")]
#[command(long_about = "otapack inlines the page's script dependency, minifies the HTML, gzips it and
writes the result as a guarded C header holding a PROGMEM byte array.

EXAMPLES:
    otapack                                   # Build with defaults (or otapack.json)
    otapack --check                           # Run every stage without writing
    otapack -i page.html -o include/Page.h    # Override input and output
    otapack --no-shorten-class-names          # Keep class names as written
    otapack completions bash > otapack.bash   # Generate bash completions

CONFIGURATION:
    Settings are read from otapack.json when it exists. Without a config file
    the built-in defaults reproduce the stock build step:
    frontend/index.html -> src/OtaHTML.h")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "FILE", default_value = "otapack.json")]
    config_path: PathBuf,

    /// HTML source document
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Script payload inlined in place of the build marker
    #[arg(short, long, value_name = "FILE")]
    payload: Option<PathBuf>,

    /// Header file to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Keep class names as written
    #[arg(long)]
    no_shorten_class_names: bool,

    /// Skip decoding the rendered header before writing it
    #[arg(long)]
    no_verify: bool,

    /// Run every stage but do not write the header
    #[arg(long)]
    check: bool,
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

    // @returns: ANSI colour and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "error"),
            Level::Warn => ("\x1B[1;33m", "warn "),
            Level::Info => ("\x1B[1;32m", "info "),
            Level::Debug => ("\x1B[1;36m", "debug"),
            Level::Trace => ("\x1B[1;35m", "trace"),
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
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    // The logger accepts everything; log::set_max_level does the filtering
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    if let Err(e) = run(CommandLineOptions::parse()) {
        match e.downcast_ref::<BuildError>() {
            Some(build_error) => error!("Build failed in {} stage: {:#}", build_error.stage(), e),
            None => error!("Build failed: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(Commands::Completions { shell }) = options.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "otapack", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(input) = &options.input {
        config.input.html_path = input.clone();
    }
    if let Some(payload) = &options.payload {
        config.input.payload_path = payload.clone();
    }
    if let Some(output) = &options.output {
        config.output.path = output.clone();
    }
    if options.no_shorten_class_names {
        config.minify.shorten_class_names = false;
    }
    if options.no_verify {
        config.verify_output = false;
    }
    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    let controller = Controller::with_config(config)?;

    if options.check {
        controller.check()?;
    } else {
        controller.run()?;
    }

    Ok(())
}

/// Load the JSON config at `path`, or the defaults when it does not exist
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
    let reader = BufReader::new(file);
    let config: Config = serde_json::from_reader(reader)
        .context(format!("Failed to parse config file: {:?}", path))?;

    debug!("Loaded config from {:?}", path);
    Ok(config)
}
