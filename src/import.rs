// 📂 CSV Import - bulk-load wolves through the validator
//
// Expected headers: Name,BirthDate,Gender,Location
// Rows that fail validation are reported and skipped; they never reach the store.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::service::{ServiceError, WolfService};
use crate::store::WolfStore;
use crate::wolf::WolfRecord;

#[derive(Debug, Deserialize)]
struct CsvWolf {
    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "BirthDate")]
    birth_date: String,

    // Kept as text so a non-numeric code rejects the row, not the file
    #[serde(rename = "Gender")]
    gender: String,

    #[serde(rename = "Location")]
    location: String,
}

/// One parsed CSV row and the line it came from
#[derive(Debug, Clone)]
pub struct CsvRow {
    pub line: u64,
    pub record: Result<WolfRecord, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: u64,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub accepted: Vec<WolfRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "{} accepted, {} rejected",
            self.accepted.len(),
            self.rejected.len()
        )
    }
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<CsvRow>> {
    let rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_rows(rdr)
}

pub fn load_csv_from_reader<R: io::Read>(reader: R) -> Result<Vec<CsvRow>> {
    read_rows(csv::Reader::from_reader(reader))
}

fn read_rows<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<CsvRow>> {
    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result.context("Failed to read CSV row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let wolf: CsvWolf = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Failed to deserialize wolf on line {line}"))?;

        let record = match wolf.gender.trim().parse::<i32>() {
            Ok(gender) => Ok(WolfRecord {
                id: 0,
                name: wolf.name,
                birth_date: wolf.birth_date,
                gender,
                location: wolf.location,
                version: None,
            }),
            Err(_) => Err(format!("gender `{}` is not an integer code", wolf.gender)),
        };

        rows.push(CsvRow { line, record });
    }

    Ok(rows)
}

/// Validate every row and, unless `dry_run`, insert the valid ones.
///
/// Store failures abort the import; validation failures only skip the row.
pub fn import_rows<S: WolfStore>(
    service: &WolfService<S>,
    rows: Vec<CsvRow>,
    dry_run: bool,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for row in rows {
        let record = match row.record {
            Ok(record) => record,
            Err(reason) => {
                warn!(line = row.line, "skipping row: {reason}");
                report.rejected.push(RejectedRow {
                    line: row.line,
                    name: String::new(),
                    reason,
                });
                continue;
            }
        };

        let outcome = if dry_run {
            service
                .check(&record)
                .map(|wolf| wolf.to_record())
                .map_err(ServiceError::from)
        } else {
            service.create(&record)
        };

        match outcome {
            Ok(accepted) => report.accepted.push(accepted),
            Err(ServiceError::ValidationFailed(err)) => {
                warn!(line = row.line, name = %record.name, "skipping row: {err}");
                report.rejected.push(RejectedRow {
                    line: row.line,
                    name: record.name,
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to import line {}", row.line))
            }
        }
    }

    info!(dry_run, "import finished: {}", report.summary());
    Ok(report)
}
