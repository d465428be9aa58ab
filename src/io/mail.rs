use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::WINDOWS_1252;
use regex::Regex;

use crate::error::{ReportError, Result};
use crate::model::RoutingWeek;

/// Subject marker identifying routing-confirmation messages.
pub const SUBJECT_MARKER: &str = "Quickroutierung durchgeführt";

/// How many leading table cells are scanned for the order number.
const SCAN_WINDOW: usize = 10;

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<table[^>]*>(.*?)</table>").expect("static pattern"));
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<tr[^>]*>(.*?)</tr>").expect("static pattern"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)<td[^>]*>(.*?)</td>").expect("static pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static pattern"));
static AVISATION_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2})/(\d{4})\b").expect("static pattern"));

/// One order extracted from a routing-confirmation mail body.
#[derive(Debug, Clone, PartialEq)]
pub struct MailOrder {
    pub number: String,
    pub name: String,
    pub avisation: String,
    pub week: RoutingWeek,
}

/// Scans a directory of saved mail bodies for routing confirmations.
///
/// Only files carrying the subject marker are considered. Messages whose
/// avisation week is at or after the cutoff are dropped.
pub fn scan_mail_dir(dir: &Path, cutoff: RoutingWeek) -> Result<Vec<MailOrder>> {
    let mut orders = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        let is_mail = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "msg" | "htm" | "html"));
        if !is_mail {
            continue;
        }

        let bytes = std::fs::read(&path)?;
        let (text, _, _) = WINDOWS_1252.decode(&bytes);
        if !text.contains(SUBJECT_MARKER) {
            continue;
        }

        let order = extract_order(&text)?;
        if order.week < cutoff {
            orders.push(order);
        }
    }

    Ok(orders)
}

/// Extracts (order number, order name, avisation) from the embedded table.
///
/// The confirmation table lays its values out in the second cell of each row.
/// The first all-numeric value within the scan window is the order number;
/// the order name and the avisation string sit two and four rows below it.
pub fn extract_order(body: &str) -> Result<MailOrder> {
    let tables: Vec<&str> = TABLE
        .captures_iter(body)
        .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
        .collect();
    // The confirmation details live in the second table when the mail
    // carries a preamble table as well.
    let table = tables
        .get(1)
        .or_else(|| tables.first())
        .copied()
        .ok_or_else(|| ReportError::NoMatchFound("no table in mail body".to_string()))?;

    let values: Vec<String> = ROW
        .captures_iter(table)
        .filter_map(|row| {
            let cells: Vec<String> = CELL
                .captures_iter(row.get(1).map(|m| m.as_str()).unwrap_or(""))
                .filter_map(|cell| cell.get(1).map(|m| clean_cell(m.as_str())))
                .collect();
            cells.get(1).cloned()
        })
        .collect();

    let start = values
        .iter()
        .take(SCAN_WINDOW)
        .position(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| ReportError::NoMatchFound("no order number in mail table".to_string()))?;

    let number = values[start].clone();
    let name = values.get(start + 2).cloned().ok_or_else(|| {
        ReportError::NoMatchFound("no order name in mail table".to_string())
    })?;
    let avisation = values.get(start + 4).cloned().ok_or_else(|| {
        ReportError::NoMatchFound("no avisation date in mail table".to_string())
    })?;

    let week = parse_avisation_week(&avisation)?;

    Ok(MailOrder {
        number,
        name,
        avisation,
        week,
    })
}

/// Parses the `WW/YYYY` token out of an avisation string.
pub fn parse_avisation_week(avisation: &str) -> Result<RoutingWeek> {
    let captures = AVISATION_WEEK.captures(avisation).ok_or_else(|| {
        ReportError::NoMatchFound(format!("no avisation week in '{avisation}'"))
    })?;
    let week: u8 = captures[1]
        .parse()
        .map_err(|_| ReportError::MalformedWeek(avisation.to_string()))?;
    let year: u16 = captures[2]
        .parse()
        .map_err(|_| ReportError::MalformedWeek(avisation.to_string()))?;
    RoutingWeek::from_parts(year, week)
        .ok_or_else(|| ReportError::MalformedWeek(avisation.to_string()))
}

fn clean_cell(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, " ");
    stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
