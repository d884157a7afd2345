//! Image Authenticity Checker CLI.

use clap::{ColorChoice, Parser};
use iac_cli::logging::{LogConfig, LogFormat, init_logging};
use iac_cli::settings::{BACKEND_URL_ENV, Settings};
use std::io::{self, IsTerminal};
use tracing::Instrument;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, ConfigCommand, LogFormatArg, LogLevelArg};
use crate::commands::{run_analyze, run_config_init, run_config_show};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let settings_path = Settings::config_path();
    let settings = Settings::load_from(&settings_path);
    let env_url = std::env::var(BACKEND_URL_ENV).ok();
    let backend = settings.resolve_backend(cli.backend_url.as_deref(), env_url.as_deref());

    match cli.command {
        Command::Analyze(args) => {
            let styled = tables_styled(cli.color.color);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let span = tracing::info_span!(
                "analyze",
                file = %args.file.display(),
                backend = %backend.base_url
            );
            runtime.block_on(run_analyze(&args, &backend, styled).instrument(span))
        }
        Command::Config(ConfigCommand::Show) => {
            run_config_show(&settings_path, &backend)?;
            Ok(0)
        }
        Command::Config(ConfigCommand::Init { force }) => {
            run_config_init(&settings_path, force)?;
            Ok(0)
        }
    }
}

fn tables_styled(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stdout().is_terminal(),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
