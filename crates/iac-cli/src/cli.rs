//! CLI argument definitions for the image authenticity checker.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "iac",
    version,
    about = "Image Authenticity Checker - fingerprint an image and inspect its metadata",
    long_about = "Upload an image to the analysis backend, show its hashes, metadata and \
                  consistency warnings, and optionally run AI metadata analysis, \
                  authenticity verification and a manipulation simulation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Analysis backend base URL (overrides IAC_BACKEND_URL and the settings file).
    #[arg(long = "backend-url", value_name = "URL", global = true)]
    pub backend_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload an image and run the requested analysis stages.
    Analyze(AnalyzeArgs),

    /// Inspect or create the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings and the settings file location.
    Show,

    /// Write a settings file with default values.
    Init {
        /// Overwrite an existing settings file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Image file to analyze.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected SHA-256 of the image; the backend reports whether it matches.
    #[arg(long = "known-sha256", value_name = "HEX")]
    pub known_sha256: Option<String>,

    /// Expected MD5 of the image; the backend reports whether it matches.
    #[arg(long = "known-md5", value_name = "HEX")]
    pub known_md5: Option<String>,

    /// Run authenticity verification after the upload.
    #[arg(long)]
    pub verify: bool,

    /// Run AI metadata analysis after the upload.
    #[arg(long)]
    pub ai: bool,

    /// Edit a metadata field and run a manipulation simulation.
    ///
    /// May be repeated. Fields not named keep their extracted values.
    #[arg(long = "simulate", value_name = "FIELD=VALUE", value_parser = parse_edit)]
    pub simulate: Vec<(String, String)>,

    /// Run every secondary stage (simulation uses the unedited metadata
    /// unless --simulate is given).
    #[arg(long)]
    pub all: bool,

    /// Download the error level analysis image to this path.
    #[arg(long = "save-ela", value_name = "PATH")]
    pub save_ela: Option<PathBuf>,

    /// Output format for the results.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

impl AnalyzeArgs {
    pub fn wants_ai(&self) -> bool {
        self.ai || self.all
    }

    pub fn wants_verification(&self) -> bool {
        self.verify || self.all
    }

    pub fn wants_simulation(&self) -> bool {
        self.all || !self.simulate.is_empty()
    }
}

fn parse_edit(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    Ok((field.to_string(), value.to_string()))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
