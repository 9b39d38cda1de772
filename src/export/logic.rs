// src/export/logic.rs

use crate::core::gaps::DeploymentReport;
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::reports_to_rows;
use crate::ui::messages::warning;
use std::path::Path;

/// High-level export of gap check results.
pub struct ExportLogic;

impl ExportLogic {
    /// Write every gap window of `reports` to `file`.
    ///
    /// Nothing is written when no deployment produced a window.
    pub fn export(
        reports: &[DeploymentReport],
        format: &ExportFormat,
        file: &Path,
        force: bool,
    ) -> AppResult<()> {
        let rows = reports_to_rows(reports);

        if rows.is_empty() {
            warning("No gap windows found. Nothing to export.");
            return Ok(());
        }

        ensure_writable(file, force)?;
        log::debug!("exporting {} rows as {}", rows.len(), format.as_str());

        match format {
            ExportFormat::Csv => export_csv(&rows, file)?,
            ExportFormat::Json => export_json(&rows, file)?,
        }

        Ok(())
    }
}
