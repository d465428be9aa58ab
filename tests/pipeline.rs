use routing_reports::ReportError;
use routing_reports::agents::extract_agents;
use routing_reports::assign::{assign_orders_to_sectors, parse_count};
use routing_reports::flatten::flatten_agents;
use routing_reports::io::{csv_read, csv_write};
use routing_reports::model::{Agent, ChangedSectorSet, Order, RoutingWeek, SectorRef, Table};
use routing_reports::normalize::normalize_volume;
use routing_reports::orders::{import_changed_sectors, import_moved_orders};
use routing_reports::report;
use routing_reports::schema::VolumeSchema;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn test_schema() -> VolumeSchema {
    VolumeSchema {
        info_row: 4,
        order_row: 2,
        order_col: 8,
        ..VolumeSchema::default()
    }
}

/// Raw volume export as loaded header-less: physical row 2 carries the order
/// numbers from column 8 on, physical row 4 carries the agent info header.
fn raw_volume() -> Table {
    Table::new(
        Vec::new(),
        vec![
            row(&["Volumenauswertung", "Export", "KW 1"]),
            row(&["", "", "", "", "", "", "", "", "4711", "4712", "4713"]),
            row(&["Stand", "Dezember 2024"]),
            row(&[
                "Zusteller", "Name", "Vorname", "Anrede", "ZGB-PLZ", "Depot", "ZGB", "ZGB-Name",
            ]),
            row(&[
                "huber", "Huber", "Anna", "Frau", "8001", "10", "100", "Zürich 1", "5", "1'234",
                "0",
            ]),
            row(&[
                "huber", "Huber", "Anna", "Frau", "8002", "10", "101", "Zürich 2", "0", "", "0",
            ]),
            row(&[
                "meier", "Meier", "Beat", "Herr", "8003", "11", "200", "Bern 1", "0", "2", "0",
            ]),
            row(&[
                "vogel", "Vogel", "Cora", "Frau", "9000", "12", "300", "St. Gallen", "9", "9", "9",
            ]),
            row(&[
                "keller", "Keller", "Dani", "Herr", "8004", "13", "400", "Basel", "0", "0", "0",
            ]),
        ],
    )
}

fn changed_sectors() -> ChangedSectorSet {
    ChangedSectorSet::from_codes(
        ["8001", "8002", "8003", "8004"]
            .into_iter()
            .map(str::to_string),
    )
}

fn orders_table() -> Table {
    Table::new(
        row(&["Auftragsnummer", "Auftragsname", "Routierung_Zustellwoche"]),
        vec![
            row(&["4711", "Frühlingsflyer", "202449"]),
            row(&["4711", "Frühlingsflyer Duplikat", "202448"]),
            row(&["4712", "Sommerkatalog", "202450"]),
            row(&["4713", "Herbstaktion", "202501"]),
            row(&["4798", "UA Spezial", "202440"]),
            row(&["4797", "Noch nicht routiert", ""]),
        ],
    )
}

fn cutoff() -> RoutingWeek {
    RoutingWeek::parse("202501").expect("cutoff week parsed")
}

#[test]
fn normalize_keeps_only_changed_sectors() {
    let schema = test_schema();
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");

    let sector_idx = volume.column_index("ZGB-PLZ").expect("sector column");
    assert_eq!(volume.rows.len(), 4);
    for row in &volume.rows {
        assert!(changed_sectors().contains(volume.cell(row, sector_idx)));
    }
}

#[test]
fn normalize_fills_empty_cells_with_zero() {
    let schema = test_schema();
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");

    let idx_4712 = volume.column_index("4712").expect("order column");
    // huber's 8002 row had an empty 4712 cell.
    assert_eq!(volume.cell(&volume.rows[1], idx_4712), "0");
}

#[test]
fn normalize_drops_excluded_depots() {
    let mut schema = test_schema();
    schema.excluded_depots = vec!["13".to_string()];
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");

    let depot_idx = volume.column_index("Depot").expect("depot column");
    assert!(volume.rows.iter().all(|r| volume.cell(r, depot_idx) != "13"));
}

#[test]
fn normalize_without_sector_column_fails() {
    let mut schema = test_schema();
    schema.sector_column = "PLZ-Gebiet".to_string();

    let err = normalize_volume(&raw_volume(), &schema, &changed_sectors())
        .expect_err("must report the missing column");
    match err {
        ReportError::MissingColumn(column) => assert_eq!(column, "PLZ-Gebiet"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn normalize_with_no_matching_rows_fails() {
    let schema = test_schema();
    let empty = ChangedSectorSet::default();

    let err = normalize_volume(&raw_volume(), &schema, &empty).expect_err("must be empty");
    assert!(matches!(err, ReportError::EmptyResult));
}

#[test]
fn duplicate_orders_keep_first_occurrence() {
    let moved =
        import_moved_orders(&orders_table(), cutoff(), &test_schema()).expect("orders imported");

    let flyer: Vec<&Order> = moved.iter().filter(|o| o.number == "4711").collect();
    assert_eq!(flyer.len(), 1);
    assert_eq!(flyer[0].name, "Frühlingsflyer");
}

#[test]
fn orders_at_or_after_cutoff_are_dropped() {
    let moved =
        import_moved_orders(&orders_table(), cutoff(), &test_schema()).expect("orders imported");

    assert!(moved.iter().all(|o| o.number != "4713"));
    // Empty routing week means "not routed yet".
    assert!(moved.iter().all(|o| o.number != "4797"));
}

#[test]
fn order_name_marker_excludes_orders() {
    let mut schema = test_schema();
    schema.order_name_marker = Some("UA".to_string());

    let moved = import_moved_orders(&orders_table(), cutoff(), &schema).expect("orders imported");
    assert!(moved.iter().all(|o| o.number != "4798"));
}

#[test]
fn malformed_routing_week_fails_loudly() {
    let orders = Table::new(
        row(&["Auftragsnummer", "Auftragsname", "Routierung_Zustellwoche"]),
        vec![row(&["4796", "Kaputt", "20245"])],
    );

    let err = import_moved_orders(&orders, cutoff(), &test_schema()).expect_err("must fail");
    assert!(matches!(err, ReportError::MalformedWeek(_)));
}

#[test]
fn week_comparison_spans_year_boundary() {
    let late = RoutingWeek::parse("202453").expect("week parsed");
    let early = RoutingWeek::parse("202501").expect("week parsed");
    assert!(late < early);
}

#[test]
fn composite_key_concatenates_depot_and_sector() {
    let sector = SectorRef::new("8001", "10", "100", "Zürich 1");
    assert_eq!(sector.composite, "10-100");
}

#[test]
fn count_cells_strip_thousands_separator() {
    assert_eq!(parse_count("1'234", "4712").expect("parses"), 1234);
}

#[test]
fn non_numeric_count_cells_fail_loudly() {
    let err = parse_count("abc", "4712").expect_err("must fail");
    match err {
        ReportError::MalformedCount { column, value } => {
            assert_eq!(column, "4712");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn orders_attach_only_to_positive_count_sectors() {
    let schema = test_schema();
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");
    let moved = import_moved_orders(&orders_table(), cutoff(), &schema).expect("orders imported");

    let per_sector = assign_orders_to_sectors(&volume, &moved, &schema).expect("assigned");

    let zurich = per_sector.get("8001").expect("8001 carries orders");
    let numbers: Vec<&str> = zurich.iter().map(|o| o.number.as_str()).collect();
    assert_eq!(numbers, vec!["4711", "4712"]);
    assert!(!per_sector.contains_key("8002"));
    assert!(!per_sector.contains_key("8004"));
}

#[test]
fn agents_group_in_first_occurrence_order() {
    let schema = test_schema();
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");

    let agents = extract_agents(&volume, &schema).expect("agents extracted");
    let names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["huber", "meier", "keller"]);
    assert_eq!(agents[0].sectors.len(), 2);
    assert_eq!(agents[0].info, row(&["Huber", "Anna", "Frau"]));
}

#[test]
fn agents_without_orders_never_appear_in_the_report() {
    let schema = test_schema();
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");
    let agents = extract_agents(&volume, &schema).expect("agents extracted");
    let moved = import_moved_orders(&orders_table(), cutoff(), &schema).expect("orders imported");
    let per_sector = assign_orders_to_sectors(&volume, &moved, &schema).expect("assigned");

    let export = flatten_agents(&agents, &per_sector, &schema).expect("flattened");

    let agent_idx = export.column_index("Zusteller").expect("agent column");
    let names: Vec<&str> = export
        .rows
        .iter()
        .map(|r| export.cell(r, agent_idx))
        .collect();
    // keller has no orders in any sector.
    assert_eq!(names, vec!["huber", "meier"]);
}

#[test]
fn excluded_agents_are_dropped() {
    let mut schema = test_schema();
    schema.excluded_agents = vec!["huber".to_string()];
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");
    let agents = extract_agents(&volume, &schema).expect("agents extracted");
    let moved = import_moved_orders(&orders_table(), cutoff(), &schema).expect("orders imported");
    let per_sector = assign_orders_to_sectors(&volume, &moved, &schema).expect("assigned");

    let export = flatten_agents(&agents, &per_sector, &schema).expect("flattened");

    let agent_idx = export.column_index("Zusteller").expect("agent column");
    let names: Vec<&str> = export
        .rows
        .iter()
        .map(|r| export.cell(r, agent_idx))
        .collect();
    assert_eq!(names, vec!["meier"]);
}

#[test]
fn header_synthesis_uses_maximum_counts() {
    let schema = test_schema();
    let agents = vec![
        Agent {
            name: "a".to_string(),
            info: row(&["A", "Alpha", "Frau"]),
            sectors: vec![
                SectorRef::new("8001", "10", "100", "Eins"),
                SectorRef::new("8002", "10", "101", "Zwei"),
                SectorRef::new("8003", "10", "102", "Drei"),
            ],
        },
        Agent {
            name: "b".to_string(),
            info: row(&["B", "Beta", "Herr"]),
            sectors: vec![SectorRef::new("8004", "11", "200", "Vier")],
        },
    ];
    let mut per_sector = BTreeMap::new();
    per_sector.insert(
        "8001".to_string(),
        vec![Order::new("1", "Erster"), Order::new("2", "Zweiter")],
    );
    per_sector.insert("8004".to_string(), vec![Order::new("1", "Erster")]);

    let export = flatten_agents(&agents, &per_sector, &schema).expect("flattened");

    assert_eq!(
        export.headers,
        row(&[
            "Zusteller",
            "Name",
            "Vorname",
            "Anrede",
            "Depot-ZGB_0",
            "ZGB-Name_0",
            "Depot-ZGB_1",
            "ZGB-Name_1",
            "Depot-ZGB_2",
            "ZGB-Name_2",
            "Auftragsnummer_0",
            "Auftragsname_0",
            "Auftragsnummer_1",
            "Auftragsname_1",
        ])
    );
    // Rectangular: the one-sector agent pads its remaining cells empty.
    for export_row in &export.rows {
        assert_eq!(export_row.len(), export.headers.len());
    }
    let second = &export.rows[1];
    assert_eq!(second[8], "");
    assert_eq!(second[9], "");
}

#[test]
fn report_round_trips_through_windows_1252_files() {
    let temp_dir = tempdir().expect("temporary directory");
    let schema = test_schema();

    let volume_path = temp_dir.path().join("volumen.csv");
    let sectors_path = temp_dir.path().join("zgb.csv");
    let orders_path = temp_dir.path().join("auftraege.csv");
    let output_path = temp_dir.path().join("export.csv");

    write_raw_fixture(&volume_path, &raw_volume());
    csv_write::write_table(
        &sectors_path,
        &Table::new(
            row(&["ZGB-PLZ"]),
            vec![row(&["8001"]), row(&["8002"]), row(&["8003"]), row(&["8004"])],
        ),
    )
    .expect("sectors written");
    csv_write::write_table(&orders_path, &orders_table()).expect("orders written");

    let export = report::moved_orders_report(
        &volume_path,
        &sectors_path,
        &orders_path,
        cutoff(),
        &schema,
    )
    .expect("report built");
    csv_write::write_table(&output_path, &export).expect("report written");

    // The report encodes as Windows-1252, not UTF-8: 'ü' is a single 0xFC.
    let bytes = std::fs::read(&output_path).expect("report bytes");
    assert!(bytes.contains(&0xFC));

    let restored = csv_read::read_headered(&output_path).expect("report read back");
    assert_eq!(restored, export);
}

#[test]
fn report_output_renormalizes_without_error() {
    let schema = test_schema();
    let volume =
        normalize_volume(&raw_volume(), &schema, &changed_sectors()).expect("normalized");
    let agents = extract_agents(&volume, &schema).expect("agents extracted");
    let moved = import_moved_orders(&orders_table(), cutoff(), &schema).expect("orders imported");
    let per_sector = assign_orders_to_sectors(&volume, &moved, &schema).expect("assigned");
    let export = flatten_agents(&agents, &per_sector, &schema).expect("flattened");

    // The synthesized header is fully rectangular, so reading the report as a
    // raw table and normalizing it against its own columns must not throw.
    let mut raw_rows = vec![export.headers.clone()];
    raw_rows.extend(export.rows.iter().cloned());
    let raw = Table::new(Vec::new(), raw_rows);

    let again = VolumeSchema {
        info_row: 1,
        order_row: 1,
        order_col: export.headers.len(),
        sector_column: "Zusteller".to_string(),
        ..VolumeSchema::default()
    };
    let changed = ChangedSectorSet::from_codes(vec!["huber".to_string(), "meier".to_string()]);

    let renormalized = normalize_volume(&raw, &again, &changed).expect("renormalized");
    assert_eq!(renormalized.rows.len(), export.rows.len());
}

#[test]
fn changed_sector_import_reads_the_plz_column() {
    let table = Table::new(
        row(&["ZGB-PLZ", "Bemerkung"]),
        vec![row(&["8001", "neu"]), row(&["8002", ""]), row(&["", ""])],
    );

    let changed = import_changed_sectors(&table, &test_schema()).expect("sectors imported");
    assert_eq!(changed.len(), 2);
    assert!(changed.contains("8001"));
    assert!(!changed.contains(""));
}

/// Writes a header-less fixture the way the back office exports it: raw
/// semicolon rows, Windows-1252 encoded.
fn write_raw_fixture(path: &std::path::Path, table: &Table) {
    let mut text = String::new();
    for table_row in &table.rows {
        text.push_str(&table_row.join(";"));
        text.push('\n');
    }
    let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(&text);
    std::fs::write(path, encoded).expect("fixture written");
}
