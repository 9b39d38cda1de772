//! Audit of the binary files opened during a deployment, based on the
//! `<deployment>_binary_open_times.txt` listing.

use crate::errors::{AppError, AppResult};
use crate::models::binary_file::BinaryFile;
use crate::models::deployment::DeploymentName;
use crate::source::glider_api::DeploymentLookup;
use crate::ui::messages::{error, warning};
use crate::utils::time::from_epoch;
use chrono::{NaiveDateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryThresholds {
    /// Warn on gaps between file open times longer than this.
    pub gap_warning_hours: f64,
    /// Warn on files opened this long before deployment start.
    pub start_warning_hours: f64,
    /// Warn on files opened this long after deployment end.
    pub end_warning_hours: f64,
}

impl Default for BinaryThresholds {
    fn default() -> Self {
        Self {
            gap_warning_hours: 12.0,
            start_warning_hours: 2.0,
            end_warning_hours: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryWarning {
    BeforeStart { hours: f64 },
    NoneNearStart { within: f64 },
    AfterEnd { hours: f64 },
    NoneNearEnd { within: f64 },
    Gaps { count: usize, over: f64 },
}

impl fmt::Display for BinaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeStart { hours } => write!(
                f,
                "these files include times {hours:.2} hours before deployment start time."
            ),
            Self::NoneNearStart { within } => write!(
                f,
                "no files found within {within} hours of deployment start time."
            ),
            Self::AfterEnd { hours } => write!(
                f,
                "these files include times {hours:.2} hours after deployment end time."
            ),
            Self::NoneNearEnd { within } => write!(
                f,
                "no files found within {within} hours of deployment end time."
            ),
            Self::Gaps { count, over } => {
                write!(f, "these files include {count} gaps over {over} hours.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiletypeSummary {
    pub filetype: String,
    pub file_count: usize,
    pub directories: Vec<String>,
    pub warnings: Vec<BinaryWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryAudit {
    pub deployed: NaiveDateTime,
    pub recovered: NaiveDateTime,
    pub os_version: Option<f64>,
    /// OS 7+ logs science data separately, so ebd/tbd files are expected.
    pub missing_science: bool,
    pub filetypes: Vec<FiletypeSummary>,
}

fn hours_between(a: NaiveDateTime, b: NaiveDateTime) -> f64 {
    (b - a).num_seconds() as f64 / 3600.0
}

/// Audit the files of one deployment against its deployed/recovered times.
pub fn audit(
    files: &[BinaryFile],
    deployed: NaiveDateTime,
    recovered: NaiveDateTime,
    os_version: Option<f64>,
    thresholds: &BinaryThresholds,
) -> BinaryAudit {
    let filetypes: BTreeSet<&str> = files.iter().map(|f| f.filetype.as_str()).collect();
    let missing_science = !files.iter().any(BinaryFile::is_science) && os_version.is_some_and(|v| v >= 7.0);

    let summaries = filetypes
        .into_iter()
        .map(|ftype| {
            let mut of_type: Vec<&BinaryFile> = files.iter().filter(|f| f.filetype == ftype).collect();
            of_type.sort_by_key(|f| f.opened);
            summarize_filetype(ftype, of_type, deployed, recovered, thresholds)
        })
        .collect();

    BinaryAudit {
        deployed,
        recovered,
        os_version,
        missing_science,
        filetypes: summaries,
    }
}

fn summarize_filetype(
    filetype: &str,
    mut files: Vec<&BinaryFile>,
    t0: NaiveDateTime,
    t1: NaiveDateTime,
    thresholds: &BinaryThresholds,
) -> FiletypeSummary {
    // A copy of the listing often lives in several directories; when the
    // most populated one already covers the deployment, audit only that one.
    let mut per_dir: BTreeMap<&str, usize> = BTreeMap::new();
    for f in &files {
        *per_dir.entry(f.directory.as_str()).or_default() += 1;
    }
    let mut main_dir: Option<(&str, usize)> = None;
    for (dir, count) in &per_dir {
        if main_dir.is_none_or(|(_, best)| *count > best) {
            main_dir = Some((*dir, *count));
        }
    }

    if let Some((dir, _)) = main_dir {
        let main_names: BTreeSet<&str> = files
            .iter()
            .filter(|f| f.directory == dir)
            .map(|f| f.filename.as_str())
            .collect();
        let covers_deployment = files
            .iter()
            .filter(|f| f.opened >= t0 && f.opened <= t1)
            .all(|f| main_names.contains(f.filename.as_str()));

        if covers_deployment {
            let dir = dir.to_string();
            files.retain(|f| f.directory == dir);
        }
    }

    let directories: Vec<String> = files
        .iter()
        .map(|f| f.directory.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let file_count = files
        .iter()
        .map(|f| f.filename.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let from_start: Vec<f64> = files.iter().map(|f| hours_between(t0, f.opened)).collect();
    let to_end: Vec<f64> = files.iter().map(|f| hours_between(f.opened, t1)).collect();
    let gaps = files
        .windows(2)
        .filter(|w| hours_between(w[0].opened, w[1].opened) > thresholds.gap_warning_hours)
        .count();

    let near = |dt: &f64| *dt > 0.0 && *dt < thresholds.gap_warning_hours;
    let min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);

    let mut warnings = Vec::new();
    if from_start.iter().any(|dt| *dt < -thresholds.start_warning_hours) {
        warnings.push(BinaryWarning::BeforeStart {
            hours: -min(&from_start),
        });
    }
    if !from_start.iter().any(near) {
        warnings.push(BinaryWarning::NoneNearStart {
            within: thresholds.gap_warning_hours,
        });
    }
    if to_end.iter().any(|dt| *dt < -thresholds.end_warning_hours) {
        warnings.push(BinaryWarning::AfterEnd { hours: -min(&to_end) });
    }
    if !to_end.iter().any(near) {
        warnings.push(BinaryWarning::NoneNearEnd {
            within: thresholds.gap_warning_hours,
        });
    }
    if gaps > 0 {
        warnings.push(BinaryWarning::Gaps {
            count: gaps,
            over: thresholds.gap_warning_hours,
        });
    }

    FiletypeSummary {
        filetype: filetype.to_string(),
        file_count,
        directories,
        warnings,
    }
}

pub fn render_audit(audit: &BinaryAudit) -> String {
    let mut out = format!(
        "deployed {}\nrecovered {}\n",
        audit.deployed.format("%Y-%m-%d %H:%M"),
        audit.recovered.format("%Y-%m-%d %H:%M")
    );

    if audit.missing_science {
        out.push_str(&format!(
            "Warning: os version={} but no dbds or tbds found. Science data logging updated in v7.0.\n",
            audit.os_version.unwrap_or_default()
        ));
    }

    for summary in &audit.filetypes {
        out.push_str(&format!("\nfiletype: {}\n", summary.filetype));
        match summary.directories.as_slice() {
            [dir] => out.push_str(&format!("{} files in: {}\n", summary.file_count, dir)),
            dirs => out.push_str(&format!(
                "{} files split between: {}\n",
                summary.file_count,
                dirs.join(", ")
            )),
        }
        for w in &summary.warnings {
            out.push_str(&format!("Warning: {w}\n"));
        }
    }

    out
}

/// Read and parse an open-times listing; unparsable lines are skipped.
pub fn read_open_times(path: &Path, cwd: &str) -> AppResult<Vec<BinaryFile>> {
    let content = fs::read_to_string(path)?;
    let mut files = Vec::new();

    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match BinaryFile::parse_line(line, cwd) {
            Ok(f) => files.push(f),
            Err(e) => log::warn!("{}:{}: {e}", path.display(), n + 1),
        }
    }

    Ok(files)
}

pub struct BinaryLogic;

impl BinaryLogic {
    /// Resolve the listing for one deployment.
    pub fn open_times_file(
        deployment: &DeploymentName,
        slocum_dir: Option<&Path>,
        explicit: Option<&Path>,
    ) -> AppResult<PathBuf> {
        if let Some(file) = explicit {
            return Ok(file.to_path_buf());
        }

        let slocum_dir = slocum_dir.ok_or_else(|| {
            AppError::Config("no open-times file given and no slocum directory configured".into())
        })?;

        Ok(deployment
            .directory(slocum_dir)
            .join("data")
            .join("in")
            .join("binary")
            .join(format!("{}_binary_open_times.txt", deployment.name)))
    }

    pub fn run(
        api: &dyn DeploymentLookup,
        deployments: &[String],
        slocum_dir: Option<&Path>,
        explicit: Option<&Path>,
        thresholds: &BinaryThresholds,
    ) -> AppResult<()> {
        let cwd = std::env::current_dir()?.to_string_lossy().to_string();

        for raw in deployments {
            println!("\nchecking files for deployment: {raw}");

            if let Err(e) = Self::check_one(api, raw, slocum_dir, explicit, thresholds, &cwd) {
                error(format!("{raw}: {e}"));
            }
            println!();
        }

        Ok(())
    }

    fn check_one(
        api: &dyn DeploymentLookup,
        raw: &str,
        slocum_dir: Option<&Path>,
        explicit: Option<&Path>,
        thresholds: &BinaryThresholds,
        cwd: &str,
    ) -> AppResult<()> {
        let deployment = DeploymentName::parse(raw)?;
        let path = Self::open_times_file(&deployment, slocum_dir, explicit)?;

        if !path.is_file() {
            warning(format!("{} not found, skipping deployment.", path.display()));
            return Ok(());
        }

        let info = api.deployment(&deployment.name)?;
        let deployed = from_epoch(info.start_date_epoch)?.naive_utc();
        let recovered = match info.end_date_epoch {
            Some(secs) => from_epoch(secs)?.naive_utc(),
            None => Utc::now().naive_utc(),
        };

        let files = read_open_times(&path, cwd)?;
        let result = audit(&files, deployed, recovered, info.os_version(), thresholds);
        print!("{}", render_audit(&result));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deployment::DeploymentInfo;
    use chrono::{NaiveDate, TimeDelta};

    fn t(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 27)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::hours(h)
    }

    fn file(dir: &str, name: &str, h: i64) -> BinaryFile {
        BinaryFile {
            opened: t(h),
            directory: dir.to_string(),
            filename: name.to_string(),
            filetype: name.rsplit('.').next().unwrap().to_string(),
        }
    }

    #[test]
    fn clean_listing_has_no_warnings() {
        let files = vec![
            file("/g", "a.sbd", 1),
            file("/g", "b.sbd", 10),
            file("/g", "c.sbd", 19),
        ];
        let result = audit(&files, t(0), t(20), Some(7.0), &BinaryThresholds::default());

        assert!(result.missing_science);
        assert_eq!(result.filetypes.len(), 1);
        let s = &result.filetypes[0];
        assert_eq!(s.file_count, 3);
        assert_eq!(s.directories, vec!["/g"]);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn flags_out_of_window_files_and_gaps() {
        let files = vec![
            file("/g", "a.tbd", -5),
            file("/g", "b.tbd", 20),
            file("/g", "c.tbd", 40),
            file("/g", "d.tbd", 63),
        ];
        let result = audit(&files, t(0), t(60), Some(7.0), &BinaryThresholds::default());
        assert!(!result.missing_science);

        let w = &result.filetypes[0].warnings;
        assert_eq!(
            w,
            &vec![
                BinaryWarning::BeforeStart { hours: 5.0 },
                BinaryWarning::NoneNearStart { within: 12.0 },
                BinaryWarning::AfterEnd { hours: 3.0 },
                BinaryWarning::NoneNearEnd { within: 12.0 },
                BinaryWarning::Gaps { count: 3, over: 12.0 },
            ]
        );
    }

    #[test]
    fn restricts_to_main_directory_when_it_covers_deployment() {
        let files = vec![
            file("/main", "a.sbd", 1),
            file("/main", "b.sbd", 5),
            file("/main", "c.sbd", 9),
            file("/copy", "a.sbd", 1),
        ];
        let result = audit(&files, t(0), t(10), None, &BinaryThresholds::default());
        assert_eq!(result.filetypes[0].directories, vec!["/main"]);
        assert_eq!(result.filetypes[0].file_count, 3);

        let files = vec![
            file("/main", "a.sbd", 1),
            file("/main", "b.sbd", 5),
            file("/other", "c.sbd", 9),
        ];
        let result = audit(&files, t(0), t(10), None, &BinaryThresholds::default());
        assert_eq!(result.filetypes[0].directories, vec!["/main", "/other"]);
        let text = render_audit(&result);
        assert!(text.contains("3 files split between: /main, /other"));
    }

    #[test]
    fn renders_warning_lines() {
        let files = vec![file("/g", "a.sbd", -3)];
        let result = audit(&files, t(0), t(1), Some(6.0), &BinaryThresholds::default());
        let text = render_audit(&result);

        assert!(text.starts_with("deployed 2024-05-27 00:00\nrecovered 2024-05-27 01:00\n"));
        assert!(text.contains("filetype: sbd\n1 files in: /g\n"));
        assert!(text.contains("Warning: these files include times 3.00 hours before deployment start time."));
        assert!(!text.contains("os version"));
    }

    #[test]
    fn default_open_times_location() {
        let d = DeploymentName::parse("ru39-20240527T1200").unwrap();
        let p = BinaryLogic::open_times_file(&d, Some(Path::new("/slocum")), None).unwrap();
        assert_eq!(
            p,
            PathBuf::from(
                "/slocum/deployments/2024/ru39-20240527T1200/data/in/binary/ru39-20240527T1200_binary_open_times.txt"
            )
        );
        assert!(BinaryLogic::open_times_file(&d, None, None).is_err());
    }

    struct NoApi;

    impl DeploymentLookup for NoApi {
        fn deployment(&self, _name: &str) -> AppResult<DeploymentInfo> {
            panic!("listing is missing, the API must not be queried")
        }
    }

    #[test]
    fn missing_listing_skips_without_querying() {
        let dir = tempfile::tempdir().unwrap();
        BinaryLogic::run(
            &NoApi,
            &["ru39-20240527T1200".to_string()],
            Some(dir.path()),
            None,
            &BinaryThresholds::default(),
        )
        .unwrap();
    }

    #[test]
    fn reads_listing_skipping_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open_times.txt");
        fs::write(
            &path,
            "/g/01230045.tbd : fileopen_time: Mon_May_27_12:34:56_2024\n\ngarbage line\n/g/01230046.sbd : fileopen_time: Mon_May_27_13:00:00_2024\n",
        )
        .unwrap();

        let files = read_open_times(&path, "/cwd").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].filetype, "sbd");
    }
}
