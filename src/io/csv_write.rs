use std::path::Path;

use csv::WriterBuilder;
use encoding_rs::WINDOWS_1252;

use crate::error::Result;
use crate::model::Table;

/// Writes the report as a semicolon-delimited, Windows-1252 encoded CSV.
///
/// The whole file is serialised in memory first, so a failing table never
/// leaves a partial report on disk.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|error| error.into_error())?;

    let utf8 = String::from_utf8(buffer)
        .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidData, error))?;
    let (encoded, _, _) = WINDOWS_1252.encode(&utf8);
    std::fs::write(path, encoded)?;
    Ok(())
}
