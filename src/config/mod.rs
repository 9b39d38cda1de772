use crate::core::calculator::AnalyzerParams;
use crate::errors::{AppError, AppResult};
use crate::models::segment::SciFlagParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_erddap_server")]
    pub erddap_server: String,
    #[serde(default = "default_glider_api")]
    pub glider_api: String,
    /// Base directory of the slocum data tree (`deployments/<year>/...`)
    #[serde(default)]
    pub slocum_dir: Option<String>,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_max_lag")]
    pub max_lag_hours: f64,
    #[serde(default = "default_merge_distance")]
    pub merge_distance_hours: f64,
    #[serde(default = "default_full_gap_threshold")]
    pub full_gap_threshold_hours: f64,
    #[serde(default = "default_duration_threshold")]
    pub duration_threshold_hours: f64,
    #[serde(default = "default_sci_noise_floor")]
    pub sci_noise_floor: u64,
    #[serde(default = "default_sci_density_ratio")]
    pub sci_density_ratio: f64,
}

fn default_erddap_server() -> String {
    "http://slocum-data.marine.rutgers.edu/erddap".to_string()
}
fn default_glider_api() -> String {
    "https://marine.rutgers.edu/cool/data/gliders/api".to_string()
}
fn default_http_timeout() -> u64 {
    60
}
fn default_max_lag() -> f64 {
    6.0
}
fn default_merge_distance() -> f64 {
    12.0
}
fn default_full_gap_threshold() -> f64 {
    6.0
}
fn default_duration_threshold() -> f64 {
    1.0
}
fn default_sci_noise_floor() -> u64 {
    10
}
fn default_sci_density_ratio() -> f64 {
    3.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            erddap_server: default_erddap_server(),
            glider_api: default_glider_api(),
            slocum_dir: None,
            http_timeout_secs: default_http_timeout(),
            max_lag_hours: default_max_lag(),
            merge_distance_hours: default_merge_distance(),
            full_gap_threshold_hours: default_full_gap_threshold(),
            duration_threshold_hours: default_duration_threshold(),
            sci_noise_floor: default_sci_noise_floor(),
            sci_density_ratio: default_sci_density_ratio(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gliderwatch")
    }

    /// Return the full path of the default config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("gliderwatch.conf")
    }

    /// Load configuration from `path`, or return defaults if it does not exist
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::debug!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write the default configuration to `path`, creating parent directories
    pub fn init_at(path: &Path, force: bool) -> AppResult<Self> {
        if path.exists() && !force {
            return Err(AppError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let config = Config::default();
        let yaml = serde_yaml::to_string(&config)?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;

        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        self.analyzer_params(true).validate()
    }

    /// Analyzer thresholds from configuration; the sci check stays off
    /// unless explicitly requested.
    pub fn analyzer_params(&self, with_sci: bool) -> AnalyzerParams {
        AnalyzerParams {
            duration_threshold_hours: self.duration_threshold_hours,
            merge_distance_hours: self.merge_distance_hours,
            full_gap_threshold_hours: self.full_gap_threshold_hours,
            max_lag_hours: self.max_lag_hours,
            sci: with_sci.then(|| SciFlagParams {
                noise_floor: self.sci_noise_floor,
                density_ratio: self.sci_density_ratio,
            }),
        }
    }
}
