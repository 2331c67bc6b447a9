//! Read/write fit report JSON files.
//!
//! The report is the "portable" record of a fit: the estimates, the points and
//! window that produced them, and the derived depth when a nominal depth is known.
//! The schema is defined by `domain::FitReport`.

use std::fs::File;
use std::path::Path;

use crate::domain::FitReport;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<FitReport, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))
}
