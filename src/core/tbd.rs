//! Lookup of raw tbd files backing a segment.

use crate::models::deployment::DeploymentName;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub struct TbdLocator {
    dir: PathBuf,
}

impl TbdLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<deployment dir>/data/in/binary/tbd`
    pub fn for_deployment(slocum_dir: &Path, deployment: &DeploymentName) -> Self {
        Self::new(
            deployment
                .directory(slocum_dir)
                .join("data")
                .join("in")
                .join("binary")
                .join("tbd"),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Find a tbd for `source_id`, trying the segment name first and the
    /// eight-character binary name second.
    pub fn locate(&self, source_id: &str) -> Option<PathBuf> {
        let primary = source_id.split('-').take(5).collect::<Vec<_>>().join("-");
        if let Some(found) = self.find_prefixed(&primary) {
            return Some(found);
        }

        let fallback = fallback_name(source_id)?;
        self.find_prefixed(fallback)
    }

    fn find_prefixed(&self, stem: &str) -> Option<PathBuf> {
        if stem.is_empty() {
            return None;
        }
        let prefix = format!("{stem}.");

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("cannot read {}: {e}", self.dir.display());
                return None;
            }
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .map(|e| e.path())
            .collect();
        matches.sort();
        matches.into_iter().next()
    }
}

/// `ru39-2024-148-0-1-sbd(01230001)` -> `01230001`
fn fallback_name(source_id: &str) -> Option<&str> {
    let (_, tail) = source_id.rsplit_once('(')?;
    let mut chars = tail.char_indices();
    let (last, _) = chars.next_back()?;
    Some(&tail[..last])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_strips_parenthesis() {
        assert_eq!(fallback_name("ru39-2024-148-0-1-sbd(01230001)"), Some("01230001"));
        assert_eq!(fallback_name("no-parens"), None);
        assert_eq!(fallback_name("x()"), Some(""));
    }

    #[test]
    fn finds_by_segment_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ru39-2024-148-0-1.tbd"), b"").unwrap();

        let loc = TbdLocator::new(dir.path());
        let found = loc.locate("ru39-2024-148-0-1-sbd(01230001)").unwrap();
        assert!(found.ends_with("ru39-2024-148-0-1.tbd"));
    }

    #[test]
    fn falls_back_to_binary_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01230001.TBD"), b"").unwrap();

        let loc = TbdLocator::new(dir.path());
        assert!(loc.locate("ru39-2024-148-0-1-sbd(01230001)").is_some());
        assert!(loc.locate("ru39-2024-148-0-2-sbd(01230002)").is_none());
    }

    #[test]
    fn prefix_must_end_at_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ru39-2024-148-0-10.tbd"), b"").unwrap();

        let loc = TbdLocator::new(dir.path());
        assert!(loc.locate("ru39-2024-148-0-1-sbd(01230001)").is_none());
    }

    #[test]
    fn missing_directory_is_not_found() {
        let loc = TbdLocator::new("/definitely/not/here");
        assert!(loc.locate("ru39-2024-148-0-1-sbd(01230001)").is_none());
    }

    #[test]
    fn deployment_layout() {
        let d = DeploymentName::parse("ru39-20240527T1200").unwrap();
        let loc = TbdLocator::for_deployment(Path::new("/slocum"), &d);
        assert_eq!(
            loc.dir(),
            Path::new("/slocum/deployments/2024/ru39-20240527T1200/data/in/binary/tbd")
        );
    }
}
