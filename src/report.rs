//! Writes evaluation results as CSV tables: a summary with one row per installation count,
//! and one single-row table per count

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::ReportError, evaluate::EvaluationResult};

pub const SUMMARY_FILE: &str = "results.csv";

/// A flattened `EvaluationResult`, as written to a table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub installed_count: usize,
    pub installed_slots: String,
    pub station_distance: f64,
    pub transfer_distance: f64,
    pub evaluated_pairs: usize,
    pub transfer_distance_per_pair: f64,
    pub improvement_ratio: f64,
}
impl From<&EvaluationResult> for ResultRow {
    fn from(result: &EvaluationResult) -> Self {
        Self {
            installed_count: result.installed_count,
            installed_slots: result.installed_slots.join(","),
            station_distance: result.total_station_distance,
            transfer_distance: result.total_transfer_distance,
            evaluated_pairs: result.evaluated_pairs,
            transfer_distance_per_pair: result.transfer_distance_per_pair,
            improvement_ratio: result.improvement_ratio,
        }
    }
}

/// The default report directory: the prefix followed by the local time, `prefix_YYYYmmdd_HHMMSS`
pub fn timestamped_directory(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}_{}", chrono::Local::now().format("%Y%m%d_%H%M%S")))
}

/// The single-count table name for an installation count
pub fn count_file_name(count: usize) -> String {
    format!("installations_{count}.csv")
}

fn write_rows<'a>(path: &Path, results: impl IntoIterator<Item = &'a EvaluationResult>) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(ResultRow::from(result))?;
    }
    writer.flush().map_err(|source| ReportError::IoError { path: path.to_path_buf(), source })
}

/// Write the summary table and the per-count tables into `directory`, creating it if needed.
/// Returns the path of the summary table.
pub fn write_report(directory: &Path, results: &[EvaluationResult]) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(directory).map_err(|source| ReportError::IoError { path: directory.to_path_buf(), source })?;
    let summary = directory.join(SUMMARY_FILE);
    write_rows(&summary, results)?;
    for result in results {
        write_rows(&directory.join(count_file_name(result.installed_count)), [result])?;
    }
    log::info!("saved {} result rows to {}", results.len(), directory.display());
    Ok(summary)
}
