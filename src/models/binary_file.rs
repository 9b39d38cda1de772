use crate::errors::{AppError, AppResult};
use chrono::NaiveDateTime;
use std::path::Path;

const OPEN_TIME_MARKER: &str = ":fileopen_time:";
const OPEN_TIME_FORMAT: &str = "%a_%b_%d_%H:%M:%S_%Y";

/// One line of a `<deployment>_binary_open_times.txt` listing.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryFile {
    pub opened: NaiveDateTime,
    pub directory: String,
    pub filename: String,
    pub filetype: String,
}

impl BinaryFile {
    /// Parse `path/to/01230045.tbd : fileopen_time: Mon_May_27_12:34:56_2024`.
    ///
    /// Relative directories are resolved against `cwd`.
    pub fn parse_line(line: &str, cwd: &str) -> AppResult<Self> {
        let compact: String = line.chars().filter(|c| *c != ' ').collect();
        let (fullfile, time) = compact
            .split_once(OPEN_TIME_MARKER)
            .ok_or_else(|| AppError::InvalidTime(line.to_string()))?;

        let opened = NaiveDateTime::parse_from_str(time.trim(), OPEN_TIME_FORMAT)
            .map_err(|_| AppError::InvalidTime(time.to_string()))?;

        let path = Path::new(fullfile);
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let parent = path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let directory = if parent.is_empty() || parent == "." {
            cwd.to_string()
        } else if let Some(rest) = parent.strip_prefix("./") {
            format!("{cwd}/{rest}")
        } else {
            parent
        };

        let filetype = filename.rsplit('.').next().unwrap_or_default().to_string();

        Ok(Self {
            opened,
            directory,
            filename,
            filetype,
        })
    }

    pub fn is_science(&self) -> bool {
        matches!(self.filetype.to_ascii_lowercase().as_str(), "ebd" | "tbd")
    }
}
