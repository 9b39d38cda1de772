use crate::errors::{AppError, AppResult};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{8}T[0-9]{4}$").expect("valid regex"))
}

/// Deployment identifier formatted as `glider-YYYYmmddTHHMM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentName {
    pub name: String,
    pub glider: String,
    pub timestamp: String,
}

impl DeploymentName {
    pub fn parse(name: &str) -> AppResult<Self> {
        let name = name.trim();
        let Some((glider, timestamp)) = name.rsplit_once('-') else {
            return Err(AppError::InvalidDeployment(name.to_string()));
        };

        if glider.is_empty() || !timestamp_re().is_match(timestamp) {
            return Err(AppError::InvalidDeployment(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            glider: glider.to_string(),
            timestamp: timestamp.to_string(),
        })
    }

    pub fn year(&self) -> &str {
        &self.timestamp[..4]
    }

    /// `<slocum_dir>/deployments/<year>/<name>`
    pub fn directory(&self, slocum_dir: &Path) -> PathBuf {
        slocum_dir
            .join("deployments")
            .join(self.year())
            .join(&self.name)
    }

    pub fn raw_trajectory_dataset(&self) -> String {
        format!("{}-trajectory-raw-rt", self.name)
    }

    pub fn profile_dataset(&self) -> String {
        format!("{}-profile-sci-rt", self.name)
    }
}

impl fmt::Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Deployment record returned by the glider REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentInfo {
    pub deployment_name: Option<String>,
    pub start_date_epoch: i64,
    pub end_date_epoch: Option<i64>,
    #[serde(default)]
    pub os: Option<serde_json::Value>,
}

impl DeploymentInfo {
    /// Glider OS version; the API returns it as a number or a string.
    pub fn os_version(&self) -> Option<f64> {
        match self.os.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
