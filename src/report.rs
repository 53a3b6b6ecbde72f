//! Run log
//!
//! Appends one JSON line per processed file so conversions across a build
//! can be inspected afterwards.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::transform::TransformReport;

/// Outcome of processing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// At least one value was rewritten
    Converted,
    /// Nothing to rewrite
    Unchanged,
    /// Every option entry excluded the file
    Excluded,
    /// The file could not be read, parsed or written
    Failed,
}

/// A single run log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    /// ISO 8601 timestamp
    pub timestamp: String,
    /// File path, or `<stdin>`
    pub file: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<TransformReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunEntry {
    /// Entry for a file that was transformed (or excluded when `report` is `None`)
    pub fn finished(file: impl Into<String>, report: Option<TransformReport>) -> Self {
        let status = match report {
            None => RunStatus::Excluded,
            Some(r) if r.changes() > 0 => RunStatus::Converted,
            Some(_) => RunStatus::Unchanged,
        };
        Self { timestamp: now_iso8601(), file: file.into(), status, report, error: None }
    }

    /// Entry for a file that failed
    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: now_iso8601(),
            file: file.into(),
            status: RunStatus::Failed,
            report: None,
            error: Some(error.into()),
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`
fn now_iso8601() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format_timestamp(secs)
}

fn format_timestamp(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z", year, month, day, rem / 3600, (rem % 3600) / 60, rem % 60)
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Appends [`RunEntry`] lines to a JSONL file
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append entries, one JSON object per line
    pub fn append(&self, entries: &[RunEntry]) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);

        for entry in entries {
            let json = serde_json::to_string(entry)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
            writeln!(writer, "{}", json)?;
        }

        writer.flush()
    }
}
