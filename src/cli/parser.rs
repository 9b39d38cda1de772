use crate::export::ExportFormat;
use clap::{ArgAction, Parser, Subcommand};

/// Command-line interface definition for gliderwatch
#[derive(Parser)]
#[command(
    name = "gliderwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Glider deployment monitoring: real-time data gaps, tbd availability and binary file audits",
    long_about = None
)]
pub struct Cli {
    /// Override configuration file path
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// Increase diagnostic output (-v info, -vv debug); RUST_LOG overrides
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        #[arg(long, short = 'f', help = "Overwrite an existing configuration file")]
        force: bool,
    },

    /// Show or edit the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Check real-time deployments for data gaps and stale data
    Gaps {
        /// Deployment name(s) formatted as glider-YYYYmmddTHHMM
        #[arg(required = true)]
        deployments: Vec<String>,

        /// Longest data lag (hours since latest data) before reporting
        #[arg(long = "max-lag", short = 'l', value_name = "HOURS")]
        max_lag: Option<f64>,

        /// Base directory containing slocum data (used to look for tbd files)
        #[arg(long = "slocum-dir", short = 'd', value_name = "DIR")]
        slocum_dir: Option<String>,

        /// Do not look for tbd files in SLOCUM_DIR/deployments/YYYY/DEPLOYMENT/data/in/binary/tbd
        #[arg(long = "no-tbd-check")]
        no_tbd_check: bool,

        /// Only list segments with a tbd file on disk
        #[arg(long = "available-tbds-only", conflicts_with = "no_tbd_check")]
        available_tbds_only: bool,

        /// Also flag segments with temperature data but no profiles
        #[arg(long = "check-profiles")]
        check_profiles: bool,

        /// Bad segments starting within this many hours share a gap window
        #[arg(long = "merge-distance", value_name = "HOURS")]
        merge_distance: Option<f64>,

        /// Silence between segments longer than this is a full gap
        #[arg(long = "full-gap", value_name = "HOURS")]
        full_gap: Option<f64>,

        /// Segments this short or shorter are never flagged
        #[arg(long = "min-duration", value_name = "HOURS")]
        min_duration: Option<f64>,

        /// Temperature samples per profile-metre ratio for the profile check
        #[arg(long = "sci-ratio", value_name = "RATIO", requires = "check_profiles")]
        sci_ratio: Option<f64>,

        /// Write all gap windows to FILE
        #[arg(long, value_name = "FILE")]
        export: Option<String>,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Overwrite export file without confirmation
        #[arg(long, short = 'f', requires = "export")]
        force: bool,
    },

    /// Check binary file open times against deployment start/end
    Binaries {
        /// Deployment name(s) formatted as glider-YYYYmmddTHHMM
        #[arg(required = true)]
        deployments: Vec<String>,

        /// Base directory containing slocum data
        #[arg(long = "slocum-dir", short = 'd', value_name = "DIR")]
        slocum_dir: Option<String>,

        /// File listing files and fileopen_time (defaults to the deployment's binary directory)
        #[arg(long = "binary-info-file", short = 'f', value_name = "FILE")]
        binary_info_file: Option<String>,

        /// Warn if gap between binary file times is greater than this (hours)
        #[arg(long = "gap-warning", default_value_t = 12.0)]
        gap_warning: f64,

        /// Warn if files exist earlier than deployment start minus this (hours)
        #[arg(long = "start-warning", default_value_t = 2.0)]
        start_warning: f64,

        /// Warn if files exist later than deployment end plus this (hours)
        #[arg(long = "end-warning", default_value_t = 2.0)]
        end_warning: f64,
    },

    /// Update older deployment directory trees to the current layout
    Reformat {
        /// Directory containing `deployments/` and `deployment-template/`
        #[arg(long = "parent-dir", value_name = "DIR")]
        parent_dir: String,

        /// Deployment year(s) to update
        #[arg(long = "year", required = true, num_args = 1..)]
        years: Vec<i32>,

        /// List the changes without applying them
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
}
