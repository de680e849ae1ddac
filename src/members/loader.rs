//! Load member rosters from CSV
//!
//! A roster is a CSV file with a `Name` column, one member per row, in the
//! order the members should join the fund. Blank names are rejected rather
//! than skipped so a roster never silently shrinks.

use csv::{ReaderBuilder, Trim};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster row {row} has a blank member name")]
    BlankName { row: usize },
}

/// Raw CSV row matching roster columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
}

/// Load member names from a roster file
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<String>, RosterError> {
    let reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    collect_names(reader)
}

/// Load member names from any reader (e.g., string buffer, request body)
pub fn load_roster_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<String>, RosterError> {
    let reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    collect_names(reader)
}

fn collect_names<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<String>, RosterError> {
    let mut names = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        if row.name.is_empty() {
            // Header is line 1, so data rows start at 2
            return Err(RosterError::BlankName { row: idx + 2 });
        }
        names.push(row.name);
    }
    Ok(names)
}
