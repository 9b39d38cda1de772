use crate::config::Config;
use crate::errors::AppResult;

use crate::cli::parser::Commands;
use crate::ui::messages::{info, success};
use std::path::Path;

/// Handle the `init` command
///
/// Writes the default configuration (creating its directory if missing).
pub fn handle(cmd: &Commands, config_path: &Path) -> AppResult<()> {
    if let Commands::Init { force } = cmd {
        info("Initializing gliderwatch…");

        let cfg = Config::init_at(config_path, *force)?;

        success(format!("Config file : {}", config_path.display()));
        println!("ERDDAP      : {}", cfg.erddap_server);
        println!("Glider API  : {}", cfg.glider_api);
        println!("Set `slocum_dir` to enable tbd lookups and binary audits.");
    }

    Ok(())
}
