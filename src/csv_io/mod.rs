//! CSV import and export of the roster.
//!
//! Import applies create-or-update per row and keeps going past bad rows,
//! collecting one message per failure.

use crate::db::{Repository, Upserted};
use crate::errors::AppError;
use crate::models::{CsvRecord, ImportReport, Member};

const COLUMNS: [&str; 4] = ["nickname", "name", "big", "year"];

/// `big` may be left out of an import file.
const REQUIRED_COLUMNS: [&str; 3] = ["nickname", "name", "year"];

/// Import a CSV document with a `nickname,name,big,year` header.
pub async fn import_csv(repo: &Repository, body: &[u8]) -> Result<ImportReport, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AppError::BadRequest(format!(
                "CSV header is missing the {} column",
                column
            )));
        }
    }

    let mut report = ImportReport::default();
    for (index, record) in reader.deserialize::<CsvRecord>().enumerate() {
        let row = index + 1;
        let outcome = match record {
            Ok(record) => match record.validate() {
                Ok(member) => repo.upsert_member(&member).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(AppError::BadRequest(e.to_string())),
        };

        match outcome {
            Ok(Upserted::Created) => report.created += 1,
            Ok(Upserted::Updated) => report.updated += 1,
            Err(e) => {
                tracing::warn!("Import row {} failed: {}", row, e);
                report.errors.push(format!("row {}: {}", row, e.message()));
            }
        }
    }

    tracing::info!(
        "Imported CSV: {} created, {} updated, {} failed",
        report.created,
        report.updated,
        report.errors.len()
    );
    Ok(report)
}

/// Render brothers as CSV in the order given. The header is always written.
pub fn export_csv(members: Vec<Member>) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for member in members {
        writer.serialize(CsvRecord::from(member))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to finish CSV export: {}", e)))
}
