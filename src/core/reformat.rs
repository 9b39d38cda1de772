//! Bring older `deployments/<year>/<deployment>` trees up to the current
//! layout using `deployment-template` as reference.

use crate::errors::AppResult;
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIRS: [&str; 3] = ["ngdac-profile", "sci-profile", "raw-trajectory"];
const QC_DIRS: [&str; 2] = ["ngdac-profile", "sci-profile"];
const MODES: [&str; 2] = ["rt", "delayed"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReformatAction {
    CreateDir(PathBuf),
    CopyFile { from: PathBuf, to: PathBuf },
    CopyTree { from: PathBuf, to: PathBuf },
}

impl fmt::Display for ReformatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir(p) => write!(f, "mkdir {}", p.display()),
            Self::CopyFile { from, to } => write!(f, "copy {} -> {}", from.display(), to.display()),
            Self::CopyTree { from, to } => {
                write!(f, "copy tree {} -> {}", from.display(), to.display())
            }
        }
    }
}

pub struct ReformatLogic;

impl ReformatLogic {
    /// Actions needed for every deployment of `years` under `parent_dir`.
    pub fn plan(parent_dir: &Path, years: &[i32]) -> AppResult<Vec<ReformatAction>> {
        let template = parent_dir.join("deployment-template");
        let mut actions = Vec::new();

        for year in years {
            let year_dir = parent_dir.join("deployments").join(year.to_string());
            if !year_dir.is_dir() {
                debug!("{} not found, skipping", year_dir.display());
                continue;
            }

            let mut deployments: Vec<PathBuf> = fs::read_dir(&year_dir)?
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            deployments.sort();

            for deployment in deployments {
                actions.extend(Self::plan_deployment(&deployment, &template));
            }
        }

        Ok(actions)
    }

    fn plan_deployment(deployment: &Path, template: &Path) -> Vec<ReformatAction> {
        let mut actions = Vec::new();

        let config_dir = deployment.join("config");
        if config_dir.is_dir() {
            let ngdac = config_dir.join("ngdac-profile");
            if !ngdac.is_dir() {
                actions.push(ReformatAction::CreateDir(ngdac));
            }
            for c in CONFIG_DIRS {
                actions.push(ReformatAction::CopyFile {
                    from: template.join("config").join(c).join("sensor_defs.json"),
                    to: config_dir.join(c).join("sensor_defs.json"),
                });
            }
        }

        let nc_dir = deployment.join("data").join("out").join("nc");
        if nc_dir.is_dir() {
            let ngdac = nc_dir.join("ngdac-profile");
            if !ngdac.is_dir() {
                actions.push(ReformatAction::CopyTree {
                    from: template.join("data").join("out").join("nc").join("ngdac-profile"),
                    to: ngdac,
                });
            }
            for c in QC_DIRS {
                for mode in MODES {
                    let qc = nc_dir.join(c).join(mode).join("qc_queue");
                    if !qc.is_dir() {
                        actions.push(ReformatAction::CreateDir(qc));
                    }
                }
            }
        }

        actions
    }

    /// Execute planned actions in order.
    pub fn apply(actions: &[ReformatAction]) -> AppResult<()> {
        for action in actions {
            debug!("{action}");
            match action {
                ReformatAction::CreateDir(p) => fs::create_dir_all(p)?,
                ReformatAction::CopyFile { from, to } => {
                    if let Some(parent) = to.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::copy(from, to)?;
                }
                ReformatAction::CopyTree { from, to } => copy_tree(from, to)?,
            }
        }
        Ok(())
    }
}

fn copy_tree(from: &Path, to: &Path) -> AppResult<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
