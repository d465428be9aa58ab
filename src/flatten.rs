use std::collections::HashSet;

use crate::assign::OrdersPerSector;
use crate::error::Result;
use crate::model::{Agent, Table};
use crate::schema::VolumeSchema;

/// A fully reconciled agent ready for the wide report.
#[derive(Debug)]
struct FlatAgent {
    name: String,
    info: Vec<String>,
    /// `(composite, sector name)` in discovery order, deduplicated.
    sectors: Vec<(String, String)>,
    /// `(order number, order name)` in discovery order, deduplicated.
    orders: Vec<(String, String)>,
}

/// Flattens agents and their sector→order associations into the final report.
///
/// Per agent the sector and order sets are unioned across its sectors in
/// discovery order. Agents whose order union is empty, and agents on the
/// exclusion list, are dropped entirely. The header is synthesized from the
/// maximum sector and order counts across the surviving agents, so the output
/// is rectangular: agents with fewer sectors or orders leave those cells
/// empty.
pub fn flatten_agents(
    agents: &[Agent],
    orders_per_sector: &OrdersPerSector,
    schema: &VolumeSchema,
) -> Result<Table> {
    let mut flat: Vec<FlatAgent> = Vec::new();

    for agent in agents {
        if schema.excluded_agents.iter().any(|id| *id == agent.name) {
            continue;
        }

        let mut sectors = Vec::new();
        let mut seen_sectors: HashSet<&str> = HashSet::new();
        let mut orders = Vec::new();
        let mut seen_orders: HashSet<&str> = HashSet::new();

        for sector in &agent.sectors {
            if seen_sectors.insert(sector.composite.as_str()) {
                sectors.push((sector.composite.clone(), sector.name.clone()));
            }
            if let Some(sector_orders) = orders_per_sector.get(&sector.plz) {
                for order in sector_orders {
                    if seen_orders.insert(order.number.as_str()) {
                        orders.push((order.number.clone(), order.name.clone()));
                    }
                }
            }
        }

        if orders.is_empty() {
            continue;
        }

        flat.push(FlatAgent {
            name: agent.name.clone(),
            info: agent.info.clone(),
            sectors,
            orders,
        });
    }

    let max_sectors = flat.iter().map(|a| a.sectors.len()).max().unwrap_or(0);
    let max_orders = flat.iter().map(|a| a.orders.len()).max().unwrap_or(0);

    let mut headers = Vec::with_capacity(
        1 + schema.agent_columns.len() + 2 * max_sectors + 2 * max_orders,
    );
    headers.push(schema.agent_column.clone());
    headers.extend(schema.agent_columns.iter().cloned());
    for i in 0..max_sectors {
        headers.push(format!("Depot-ZGB_{i}"));
        headers.push(format!("ZGB-Name_{i}"));
    }
    for i in 0..max_orders {
        headers.push(format!("Auftragsnummer_{i}"));
        headers.push(format!("Auftragsname_{i}"));
    }

    let mut rows = Vec::with_capacity(flat.len());
    for agent in flat {
        let mut cells = Vec::with_capacity(headers.len());
        cells.push(agent.name);
        cells.extend(agent.info);
        push_pairs(&mut cells, agent.sectors, max_sectors);
        push_pairs(&mut cells, agent.orders, max_orders);
        rows.push(cells);
    }

    Ok(Table::new(headers, rows))
}

fn push_pairs(cells: &mut Vec<String>, pairs: Vec<(String, String)>, width: usize) {
    let have = pairs.len();
    for (first, second) in pairs {
        cells.push(first);
        cells.push(second);
    }
    for _ in have..width {
        cells.push(String::new());
        cells.push(String::new());
    }
}
