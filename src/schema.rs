use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Describes the layout of the volume export (Volumenauswertung).
///
/// The export's true header spans two physical rows: one carrying the agent
/// info column names and a much earlier one carrying the order numbers. The
/// schema names those rows explicitly instead of burying fixed offsets in the
/// transform code, and can be loaded from a JSON file to track layout changes
/// without a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSchema {
    /// 1-based physical row carrying the agent info column names.
    pub info_row: usize,
    /// 1-based physical row carrying the order numbers.
    pub order_row: usize,
    /// 0-based column where the first order-number column starts.
    pub order_col: usize,

    /// Column holding the agent identity, the grouping key.
    pub agent_column: String,
    /// Personal info columns copied into the report per agent.
    pub agent_columns: Vec<String>,

    /// Column holding the sector postal code.
    pub sector_column: String,
    /// Column holding the depot number.
    pub depot_column: String,
    /// Column holding the sector number within the depot.
    pub sector_number_column: String,
    /// Column holding the sector name.
    pub sector_name_column: String,

    /// Depots whose rows are dropped during normalization (e.g. transit
    /// depots that never carry agent deliveries).
    pub excluded_depots: Vec<String>,
    /// Agent identifiers dropped from the final report.
    pub excluded_agents: Vec<String>,
    /// When set, orders whose name contains this token are skipped.
    pub order_name_marker: Option<String>,

    /// Column names in the orders export.
    pub order_number_column: String,
    pub order_name_column: String,
    pub routing_week_column: String,
}

impl Default for VolumeSchema {
    fn default() -> Self {
        Self {
            info_row: 33,
            order_row: 6,
            order_col: 24,
            agent_column: "Zusteller".to_string(),
            agent_columns: vec![
                "Name".to_string(),
                "Vorname".to_string(),
                "Anrede".to_string(),
            ],
            sector_column: "ZGB-PLZ".to_string(),
            depot_column: "Depot".to_string(),
            sector_number_column: "ZGB".to_string(),
            sector_name_column: "ZGB-Name".to_string(),
            excluded_depots: Vec::new(),
            excluded_agents: Vec::new(),
            order_name_marker: None,
            order_number_column: "Auftragsnummer".to_string(),
            order_name_column: "Auftragsname".to_string(),
            routing_week_column: "Routierung_Zustellwoche".to_string(),
        }
    }
}

impl VolumeSchema {
    /// Loads a schema from a JSON file; absent fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
