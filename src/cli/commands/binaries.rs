use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::binaries::{BinaryLogic, BinaryThresholds};
use crate::errors::AppResult;
use crate::source::glider_api::GliderApiClient;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Binaries {
        deployments,
        slocum_dir,
        binary_info_file,
        gap_warning,
        start_warning,
        end_warning,
    } = cmd
    {
        let thresholds = BinaryThresholds {
            gap_warning_hours: *gap_warning,
            start_warning_hours: *start_warning,
            end_warning_hours: *end_warning,
        };

        let slocum_dir = slocum_dir
            .as_deref()
            .or(cfg.slocum_dir.as_deref())
            .map(expand_tilde);
        let listing = binary_info_file.as_deref().map(expand_tilde);

        let api = GliderApiClient::new(&cfg.glider_api, cfg.http_timeout_secs)?;
        BinaryLogic::run(
            &api,
            deployments,
            slocum_dir.as_deref(),
            listing.as_deref(),
            &thresholds,
        )?;
    }
    Ok(())
}
