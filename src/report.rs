use std::path::Path;

use tracing::{debug, info, instrument};

use crate::agents::extract_agents;
use crate::assign::assign_orders_to_sectors;
use crate::error::Result;
use crate::flatten::flatten_agents;
use crate::io::csv_read;
use crate::io::mail;
use crate::model::{RoutingWeek, Table};
use crate::normalize::normalize_volume;
use crate::orders::{import_changed_sectors, import_moved_orders};
use crate::schema::VolumeSchema;

/// Builds the moved-orders report: agents with their changed sectors and the
/// orders that moved into those sectors before the cutoff week.
#[instrument(
    level = "info",
    skip_all,
    fields(volume = %volume_path.display(), cutoff = %cutoff)
)]
pub fn moved_orders_report(
    volume_path: &Path,
    sectors_path: &Path,
    orders_path: &Path,
    cutoff: RoutingWeek,
    schema: &VolumeSchema,
) -> Result<Table> {
    let raw = csv_read::read_raw(volume_path)?;
    let sectors_table = csv_read::read_headered(sectors_path)?;
    let changed = import_changed_sectors(&sectors_table, schema)?;
    info!(sector_count = changed.len(), "changed sectors loaded");

    let volume = normalize_volume(&raw, schema, &changed)?;
    debug!(row_count = volume.rows.len(), "volume export normalized");

    let agents = extract_agents(&volume, schema)?;
    info!(agent_count = agents.len(), "agents extracted");

    let orders_table = csv_read::read_headered(orders_path)?;
    let moved = import_moved_orders(&orders_table, cutoff, schema)?;
    info!(order_count = moved.len(), "moved orders before cutoff");

    let per_sector = assign_orders_to_sectors(&volume, &moved, schema)?;
    debug!(sector_count = per_sector.len(), "sectors carrying orders");

    flatten_agents(&agents, &per_sector, schema)
}

/// Builds the routing-confirmation report from a folder of saved mail bodies.
#[instrument(level = "info", skip_all, fields(dir = %mails_dir.display(), cutoff = %cutoff))]
pub fn routing_mails_report(mails_dir: &Path, cutoff: RoutingWeek) -> Result<Table> {
    let orders = mail::scan_mail_dir(mails_dir, cutoff)?;
    info!(order_count = orders.len(), "routing confirmations collected");

    let headers = vec![
        "Auftragsnummer".to_string(),
        "Auftragsname".to_string(),
        "Avisierung".to_string(),
    ];
    let rows = orders
        .into_iter()
        .map(|order| vec![order.number, order.name, order.avisation])
        .collect();
    Ok(Table::new(headers, rows))
}
