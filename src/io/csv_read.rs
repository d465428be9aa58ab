use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;

use crate::error::Result;
use crate::model::Table;

/// Reads a semicolon-delimited, Windows-1252 encoded export without treating
/// any row as a header. Used for the volume export, whose real header is
/// stitched together later by the normalizer.
pub fn read_raw(path: &Path) -> Result<Table> {
    let records = read_records(path)?;
    Ok(Table::new(Vec::new(), records))
}

/// Reads a semicolon-delimited, Windows-1252 encoded export whose first row
/// is the header. Used for the orders and changed-sectors files.
pub fn read_headered(path: &Path) -> Result<Table> {
    let mut records = read_records(path)?;
    if records.is_empty() {
        return Ok(Table::new(Vec::new(), Vec::new()));
    }
    let headers = records.remove(0);
    Ok(Table::new(headers, records))
}

fn read_records(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path)?;
    let (text, _, _) = WINDOWS_1252.decode(&bytes);

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}
