pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use virtuoso_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "virtuoso",
    about = "VIRTUOSO storefront CLI",
    long_about = "Browse the VIRTUOSO catalog, replay cart and storefront sessions, and inspect configuration.",
    after_help = "Examples:\n  virtuoso catalog\n  virtuoso cart add:1 add:1 add:2 dec:1\n  virtuoso session menu nav:catalog try-on:3 add:3\n  virtuoso doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a virtuoso.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override store.name")]
    store_name: Option<String>,
    #[arg(long, global = true, help = "Override store.currency")]
    currency: Option<String>,
    #[arg(long, global = true, help = "Override catalog.path with a TOML catalog file")]
    catalog: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the catalog in display order")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Replay cart actions against an empty cart",
        long_about = "Replay cart actions against an empty cart and print the resulting summary.\nActions: add:<id>, remove:<id>, inc:<id>, dec:<id>"
    )]
    Cart {
        #[arg(value_name = "ACTION")]
        actions: Vec<String>,
    },
    #[command(
        about = "Replay storefront events against a fresh session",
        long_about = "Replay storefront events against a fresh session and print the resulting state.\nEvents: nav:<section>, menu, select:<id>, try-on:<id>, viewer:<control>, add:<id>, remove:<id>, inc:<id>, dec:<id>"
    )]
    Session {
        #[arg(value_name = "EVENT")]
        events: Vec<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config and catalog integrity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        config_path: cli.config.clone(),
        overrides: ConfigOverrides {
            store_name: cli.store_name.clone(),
            currency: cli.currency.clone(),
            catalog_path: cli.catalog.clone(),
            log_level: cli.log_level.clone(),
            log_format: None,
        },
        ..LoadOptions::default()
    };

    init_logging(AppConfig::load(options.clone()).ok().as_ref());

    let result = match cli.command {
        Command::Catalog { json } => commands::catalog::run(options, json),
        Command::Cart { actions } => commands::cart::run(options, &actions),
        Command::Session { events } => commands::session::run(options, &events),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::CommandResult {
            exit_code: 0,
            output: commands::doctor::run(options, json),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable. `RUST_LOG`
/// takes precedence over `logging.level` when set.
fn init_logging(config: Option<&AppConfig>) {
    let log_level = config.map(|config| config.logging.level.as_str()).unwrap_or("warn");
    let format = config.map(|config| config.logging.format).unwrap_or(LogFormat::Compact);

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(log_filter(log_level));

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn log_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}
