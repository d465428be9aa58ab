use crate::error::{ReportError, Result};
use crate::model::{ChangedSectorSet, Table};
use crate::schema::VolumeSchema;

/// Normalizes the raw volume export into a regular table.
///
/// The export is loaded header-less, so the schema's 1-based physical rows
/// are lowered by one here. The logical header is stitched together from the
/// agent-info segment of the info row and the order-number segment of the
/// order row; everything above the info row is sliced away. Rows whose sector
/// code is not in the changed set (or whose depot is excluded) are dropped,
/// and empty cells become the `"0"` sentinel so later count aggregation
/// treats "no shipments" as zero.
pub fn normalize_volume(
    raw: &Table,
    schema: &VolumeSchema,
    changed: &ChangedSectorSet,
) -> Result<Table> {
    let info_row = physical_row(schema.info_row)?;
    let order_row = physical_row(schema.order_row)?;

    let info_cells = raw.rows.get(info_row).ok_or_else(|| {
        ReportError::NoMatchFound(format!("volume export has no row {}", schema.info_row))
    })?;
    let order_cells = raw.rows.get(order_row).ok_or_else(|| {
        ReportError::NoMatchFound(format!("volume export has no row {}", schema.order_row))
    })?;

    let split = schema.order_col.min(info_cells.len());
    let mut headers: Vec<String> = info_cells[..split].to_vec();
    if order_cells.len() > schema.order_col {
        headers.extend(order_cells[schema.order_col..].iter().cloned());
    }

    let shell = Table::new(headers, Vec::new());
    let sector_idx = shell.column_index(&schema.sector_column)?;
    let depot_idx = if schema.excluded_depots.is_empty() {
        None
    } else {
        Some(shell.column_index(&schema.depot_column)?)
    };

    let width = shell.headers.len();
    let mut rows = Vec::new();
    for row in raw.rows.iter().skip(info_row + 1) {
        let sector = shell.cell(row, sector_idx);
        if !changed.contains(sector) {
            continue;
        }
        if let Some(depot_idx) = depot_idx {
            let depot = shell.cell(row, depot_idx);
            if schema.excluded_depots.iter().any(|d| d == depot) {
                continue;
            }
        }
        let mut cells: Vec<String> = Vec::with_capacity(width);
        for col in 0..width {
            let value = shell.cell(row, col);
            if value.trim().is_empty() {
                cells.push("0".to_string());
            } else {
                cells.push(value.to_string());
            }
        }
        rows.push(cells);
    }

    if rows.is_empty() {
        return Err(ReportError::EmptyResult);
    }

    Ok(Table::new(shell.headers, rows))
}

// Schema rows count from 1, mirroring how the physical spreadsheet is read.
fn physical_row(row: usize) -> Result<usize> {
    row.checked_sub(1)
        .ok_or_else(|| ReportError::NoMatchFound("schema rows are 1-based, got row 0".to_string()))
}
