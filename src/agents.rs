use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Agent, SectorRef, Table};
use crate::schema::VolumeSchema;

/// Groups the normalized volume rows into one record per distinct agent.
///
/// The first row of each agent supplies the personal info cells; the full
/// ordered list of its sectors is collected across all of its rows. Agents
/// come out in first-occurrence row order so repeated runs produce the same
/// report.
pub fn extract_agents(volume: &Table, schema: &VolumeSchema) -> Result<Vec<Agent>> {
    let agent_idx = volume.column_index(&schema.agent_column)?;
    let sector_idx = volume.column_index(&schema.sector_column)?;
    let depot_idx = volume.column_index(&schema.depot_column)?;
    let number_idx = volume.column_index(&schema.sector_number_column)?;
    let name_idx = volume.column_index(&schema.sector_name_column)?;

    let info_indices: Vec<usize> = schema
        .agent_columns
        .iter()
        .map(|column| volume.column_index(column))
        .collect::<Result<_>>()?;

    let mut agents: Vec<Agent> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in &volume.rows {
        let name = volume.cell(row, agent_idx).to_string();
        let sector = SectorRef::new(
            volume.cell(row, sector_idx),
            volume.cell(row, depot_idx),
            volume.cell(row, number_idx),
            volume.cell(row, name_idx),
        );

        match positions.get(&name) {
            Some(&position) => agents[position].sectors.push(sector),
            None => {
                let info = info_indices
                    .iter()
                    .map(|&idx| volume.cell(row, idx).to_string())
                    .collect();
                positions.insert(name.clone(), agents.len());
                agents.push(Agent {
                    name,
                    info,
                    sectors: vec![sector],
                });
            }
        }
    }

    Ok(agents)
}
