use std::collections::BTreeSet;

use crate::error::{ReportError, Result};

/// An in-memory tabular data set: one header row plus string cells.
///
/// All pipeline steps consume a `Table` and return a new one instead of
/// mutating in place, so each transform stays independently testable.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of a named column, or [`ReportError::MissingColumn`].
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
    }

    /// Cell at `(row, column)`, with missing cells reading as empty.
    pub fn cell<'a>(&'a self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }
}

/// A delivery agent grouped out of the normalized volume export.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Value of the agent identity column, the grouping key.
    pub name: String,
    /// Personal info cells in the order of the configured agent columns,
    /// taken from the agent's first row.
    pub info: Vec<String>,
    /// All sectors assigned to the agent, in row order.
    pub sectors: Vec<SectorRef>,
}

/// One sector assignment as it appears on a volume row.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRef {
    /// Sector postal code (ZGB-PLZ), the join key towards orders.
    pub plz: String,
    /// Composite `{depot}-{sector_number}` key shown in the report.
    pub composite: String,
    /// Human-readable sector name.
    pub name: String,
}

impl SectorRef {
    pub fn new(plz: impl Into<String>, depot: &str, number: &str, name: impl Into<String>) -> Self {
        Self {
            plz: plz.into(),
            composite: format!("{depot}-{number}"),
            name: name.into(),
        }
    }
}

/// A shipment order batch identified by its order number.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub number: String,
    pub name: String,
}

impl Order {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
        }
    }
}

/// Set of sector codes affected by the routing-version cutover.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedSectorSet {
    codes: BTreeSet<String>,
}

impl ChangedSectorSet {
    pub fn from_codes(codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }
}

/// A calendar week used for the routing cutover comparison.
///
/// Held as an explicit `(year, week)` pair so that ordering across a year
/// boundary is well defined: `202453 < 202501` numerically, which plain
/// substring comparisons got wrong in places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoutingWeek {
    pub year: u16,
    pub week: u8,
}

impl RoutingWeek {
    /// Parses the `YYYYWW` form used in the orders export and the prompt.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReportError::MalformedWeek(value.to_string()));
        }
        let year: u16 = trimmed[..4]
            .parse()
            .map_err(|_| ReportError::MalformedWeek(value.to_string()))?;
        let week: u8 = trimmed[4..]
            .parse()
            .map_err(|_| ReportError::MalformedWeek(value.to_string()))?;
        Self::from_parts(year, week).ok_or_else(|| ReportError::MalformedWeek(value.to_string()))
    }

    /// Builds a week from already-split parts, e.g. a `WW/YYYY` mail token.
    pub fn from_parts(year: u16, week: u8) -> Option<Self> {
        // ISO weeks run 1..=53.
        if (1..=53).contains(&week) {
            Some(Self { year, week })
        } else {
            None
        }
    }
}

impl std::fmt::Display for RoutingWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.week)
    }
}
