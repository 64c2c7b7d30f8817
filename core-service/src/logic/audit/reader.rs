//! Read-back of the audit log (analysis, status endpoint, tests).

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use fs2::FileExt;
use serde::Serialize;

use crate::constants::HIGH_RISK_MESSAGE;
use crate::error::PersistenceError;
use super::record::{COL_TIMESTAMP, PREDICTION_COLUMN};
use super::writer::AuditLog;

/// Raw contents of the log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditRows {
    /// Empty when the log does not exist yet
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Audit log statistics
#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub path: String,
    pub total_entries: usize,
    pub high_risk_entries: usize,
    pub normal_entries: usize,
    pub newest_entry: Option<String>,
}

impl AuditLog {
    /// Read header and data rows. A missing file reads as empty.
    pub fn read_rows(&self) -> Result<AuditRows, PersistenceError> {
        self.with_lock(read_file)
    }

    pub fn stats(&self) -> Result<AuditStats, PersistenceError> {
        let contents = self.read_rows()?;
        let high_risk_entries = contents
            .rows
            .iter()
            .filter(|row| row.get(PREDICTION_COLUMN).map(String::as_str) == Some(HIGH_RISK_MESSAGE))
            .count();
        let timestamp_column = contents.header.iter().position(|c| c == COL_TIMESTAMP);

        Ok(AuditStats {
            path: self.path().display().to_string(),
            total_entries: contents.rows.len(),
            high_risk_entries,
            normal_entries: contents.rows.len() - high_risk_entries,
            newest_entry: timestamp_column
                .and_then(|i| contents.rows.last().and_then(|row| row.get(i).cloned())),
        })
    }
}

fn read_file(path: &Path) -> Result<AuditRows, PersistenceError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AuditRows::default()),
        Err(e) => return Err(e.into()),
    };
    // Waits out an append from another process
    FileExt::lock_shared(&file)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(file);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Ok(AuditRows::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(AuditRows { header, rows })
}
