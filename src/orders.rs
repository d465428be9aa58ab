use std::collections::HashSet;

use crate::error::Result;
use crate::model::{ChangedSectorSet, Order, RoutingWeek, Table};
use crate::schema::VolumeSchema;

/// Imports the orders export and keeps orders routed strictly before the
/// cutoff week.
///
/// Duplicate order numbers collapse to the first occurrence by row order. An
/// empty routing-week cell means the order is not routed yet and the row is
/// skipped; a non-empty cell that does not parse fails loudly. When the
/// schema carries an order-name marker (e.g. `"UA"`), orders whose name
/// contains it are skipped as well.
pub fn import_moved_orders(
    orders: &Table,
    cutoff: RoutingWeek,
    schema: &VolumeSchema,
) -> Result<Vec<Order>> {
    let number_idx = orders.column_index(&schema.order_number_column)?;
    let name_idx = orders.column_index(&schema.order_name_column)?;
    let week_idx = orders.column_index(&schema.routing_week_column)?;

    let mut found: HashSet<String> = HashSet::new();
    let mut moved = Vec::new();

    for row in &orders.rows {
        let week_cell = orders.cell(row, week_idx);
        if week_cell.trim().is_empty() {
            continue;
        }
        let week = RoutingWeek::parse(week_cell)?;
        if week >= cutoff {
            continue;
        }

        let number = orders.cell(row, number_idx);
        if number.is_empty() || found.contains(number) {
            continue;
        }

        let name = orders.cell(row, name_idx);
        if let Some(marker) = &schema.order_name_marker {
            if name.contains(marker.as_str()) {
                continue;
            }
        }

        found.insert(number.to_string());
        moved.push(Order::new(number, name));
    }

    Ok(moved)
}

/// Reads the set of sector codes affected by the routing-version cutover.
pub fn import_changed_sectors(sectors: &Table, schema: &VolumeSchema) -> Result<ChangedSectorSet> {
    let sector_idx = sectors.column_index(&schema.sector_column)?;
    let codes = sectors
        .rows
        .iter()
        .map(|row| sectors.cell(row, sector_idx).to_string())
        .filter(|code| !code.is_empty());
    Ok(ChangedSectorSet::from_codes(codes))
}
