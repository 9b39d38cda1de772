//! gliderwatch library root.
//! Exposes the CLI parser, the high-level run() function and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod models;
pub mod source;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::Path;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, config_path: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init { .. } => cli::commands::init::handle(&cli.command, config_path),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg, config_path),
        Commands::Gaps { .. } => cli::commands::gaps::handle(&cli.command, cfg),
        Commands::Binaries { .. } => cli::commands::binaries::handle(&cli.command, cfg),
        Commands::Reformat { .. } => cli::commands::reformat::handle(&cli.command),
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    // RUST_LOG, when set, takes precedence over -v
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config_path = cli
        .config
        .as_deref()
        .map(utils::path::expand_tilde)
        .unwrap_or_else(Config::config_file);

    // `init` writes the file, so it must not fail on a broken one
    let cfg = match cli.command {
        Commands::Init { .. } => Config::default(),
        _ => Config::load(&config_path)?,
    };

    log::debug!("configuration: {}", config_path.display());
    dispatch(&cli, &cfg, &config_path)
}
