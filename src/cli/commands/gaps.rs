use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::gaps::{GapCheckOptions, GapsLogic, ThresholdOverrides};
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::source::erddap::ErddapClient;
use crate::utils::path::expand_tilde;
use chrono::Utc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Gaps {
        deployments,
        max_lag,
        slocum_dir,
        no_tbd_check,
        available_tbds_only,
        check_profiles,
        merge_distance,
        full_gap,
        min_duration,
        sci_ratio,
        export,
        format,
        force,
    } = cmd
    {
        let overrides = ThresholdOverrides {
            max_lag_hours: *max_lag,
            merge_distance_hours: *merge_distance,
            full_gap_threshold_hours: *full_gap,
            duration_threshold_hours: *min_duration,
            sci_density_ratio: *sci_ratio,
        };
        let params = overrides.apply(cfg.analyzer_params(*check_profiles))?;

        let options = GapCheckOptions {
            slocum_dir: slocum_dir
                .as_deref()
                .or(cfg.slocum_dir.as_deref())
                .map(expand_tilde),
            check_tbds: !*no_tbd_check,
            available_tbds_only: *available_tbds_only,
            with_profiles: *check_profiles,
            params,
        };

        let source = ErddapClient::new(&cfg.erddap_server, cfg.http_timeout_secs)?;
        let reports = GapsLogic::run(&source, deployments, &options, Utc::now());

        if let Some(file) = export {
            ExportLogic::export(&reports, format, &expand_tilde(file), *force)?;
        }
    }
    Ok(())
}
