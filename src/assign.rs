use std::collections::BTreeMap;

use crate::error::{ReportError, Result};
use crate::model::{Order, Table};
use crate::schema::VolumeSchema;

/// Sector code → orders with at least one shipment into that sector.
pub type OrdersPerSector = BTreeMap<String, Vec<Order>>;

/// Assigns candidate orders to sectors by their shipment counts.
///
/// Only candidates whose number actually appears among the volume's order
/// columns take part. Count cells carry a `'` thousands separator which is
/// stripped before integer parsing; a cell that still fails to parse aborts
/// with [`ReportError::MalformedCount`] rather than being read as zero, since
/// a silently misparsed separator would corrupt every downstream count.
pub fn assign_orders_to_sectors(
    volume: &Table,
    candidates: &[Order],
    schema: &VolumeSchema,
) -> Result<OrdersPerSector> {
    let sector_idx = volume.column_index(&schema.sector_column)?;

    // Intersect candidates with the order columns actually present.
    let order_headers = volume.headers.get(schema.order_col..).unwrap_or(&[]);
    let mut order_columns: Vec<(usize, &Order)> = Vec::new();
    for order in candidates {
        let found = order_headers
            .iter()
            .position(|header| *header == order.number);
        if let Some(offset) = found {
            order_columns.push((schema.order_col + offset, order));
        }
    }

    let mut per_sector: OrdersPerSector = BTreeMap::new();
    for row in &volume.rows {
        let sector = volume.cell(row, sector_idx);
        for &(column, order) in &order_columns {
            let count = parse_count(volume.cell(row, column), &order.number)?;
            if count > 0 {
                let entry = per_sector.entry(sector.to_string()).or_default();
                if !entry.iter().any(|existing| existing.number == order.number) {
                    entry.push(order.clone());
                }
            }
        }
    }

    Ok(per_sector)
}

/// Parses a single shipment-count cell.
pub fn parse_count(cell: &str, column: &str) -> Result<i64> {
    let cleaned = cell.trim().replace('\'', "");
    cleaned.parse().map_err(|_| ReportError::MalformedCount {
        column: column.to_string(),
        value: cell.to_string(),
    })
}
