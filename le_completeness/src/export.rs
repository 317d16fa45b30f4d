//! Report export: one JSON file per report table.

use std::path::{Path, PathBuf};

use serde::Serialize;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::run::RunReport;

/// Errors while writing report files.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ExportError {
    /// The export directory could not be created.
    #[snafu(display("Failed to create export directory {path:?}: {source}"))]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
        /// Capture of where the failure happened.
        backtrace: Backtrace,
    },

    /// A report table could not be serialized.
    #[snafu(display("Failed to serialize {what}: {source}"))]
    Serialize {
        /// Which table was being serialized.
        what: &'static str,
        /// Underlying serializer error.
        source: serde_json::Error,
        /// Capture of where the failure happened.
        backtrace: Backtrace,
    },

    /// A report file could not be written.
    #[snafu(display("Failed to write {path:?}: {source}"))]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
        /// Capture of where the failure happened.
        backtrace: Backtrace,
    },
}

/// Writes the four report datasets into `dir` as pretty-printed JSON
/// (`summary.json`, `devices.json`, `daily.json`, `intervals.json`).
/// Returns the paths written, in that order.
pub fn export_report(report: &RunReport, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).context(CreateDirSnafu { path: dir })?;
    Ok(vec![
        write_json(dir.join("summary.json"), &report.summary, "fleet summary")?,
        write_json(dir.join("devices.json"), &report.device_table, "device table")?,
        write_json(dir.join("daily.json"), &report.daily_table, "daily table")?,
        write_json(dir.join("intervals.json"), &report.rows, "interval rows")?,
    ])
}

fn write_json<T: Serialize>(
    path: PathBuf,
    value: &T,
    what: &'static str,
) -> Result<PathBuf, ExportError> {
    let body = serde_json::to_vec_pretty(value).context(SerializeSnafu { what })?;
    std::fs::write(&path, body).context(WriteSnafu { path: &path })?;
    Ok(path)
}
