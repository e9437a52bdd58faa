use chrono::NaiveDate;
use sheetmerge_engine::{CellValue, Table};
use sheetmerge_merge::events::{EventCollector, LogLevel, Phase};
use sheetmerge_merge::{run, MatchOutcome, MatchPair, MergeConfig, MergeError, NullReporter};

fn t(s: &str) -> CellValue {
    CellValue::Text(s.into())
}

fn date(y: i32, m: u32, d: u32, h: u32) -> CellValue {
    CellValue::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap())
}

// -------------------------------------------------------------------------
// End-to-end
// -------------------------------------------------------------------------

#[test]
fn id_with_punctuation_matches_plain_reference_id() {
    let primary = Table::from_rows(
        ["id", "name"],
        vec![vec![t("A-1"), t("x")], vec![t("B-2"), t("y")]],
    )
    .unwrap();
    let reference = Table::from_rows(
        ["ref_id", "extra"],
        vec![vec![t("a1"), t("foo")], vec![t("c3"), t("bar")]],
    )
    .unwrap();

    let out = run(&primary, &reference, &[MatchPair::new("id", "ref_id")], &mut NullReporter).unwrap();

    assert_eq!(
        out.outcomes,
        vec![
            MatchOutcome::Matched { primary_row: 0, reference_row: 0 },
            MatchOutcome::Unmatched { primary_row: 1 },
        ]
    );

    let expected = Table::from_rows(
        ["id", "name", "extra"],
        vec![vec![t("A-1"), t("x"), t("foo")], vec![t("B-2"), t("y"), t("")]],
    )
    .unwrap();
    assert_eq!(out.table, expected);

    assert_eq!(out.summary.primary_rows, 2);
    assert_eq!(out.summary.matched, 1);
    assert_eq!(out.summary.unmatched, 1);
    assert_eq!(out.summary.additional_columns, vec!["extra"]);
}

#[test]
fn composite_key_with_dates_and_numbers() {
    // Invoice number stored as a number on one side and text on the other,
    // invoice date as a timestamp on one side and an ISO string on the other.
    let primary = Table::from_rows(
        ["invoice", "issued", "amount"],
        vec![
            vec![CellValue::Number(1001.0), date(2024, 1, 5, 9), CellValue::Number(120.0)],
            vec![CellValue::Number(1002.0), date(2024, 1, 6, 0), CellValue::Number(80.5)],
            vec![CellValue::Number(1003.0), CellValue::Empty, CellValue::Number(10.0)],
        ],
    )
    .unwrap();
    let reference = Table::from_rows(
        ["Invoice No", "Date", "Customer", "Status"],
        vec![
            vec![t("1001"), t("2024-01-05"), t("Acme"), t("paid")],
            vec![t("1002"), t("2024-01-07"), t("Globex"), t("open")],
            vec![t("1003"), CellValue::Empty, t("Initech"), t("void")],
        ],
    )
    .unwrap();
    let pairs = vec![
        MatchPair::new("invoice", "Invoice No"),
        MatchPair::new("issued", "Date"),
    ];

    let out = run(&primary, &reference, &pairs, &mut NullReporter).unwrap();

    assert_eq!(out.table.column_names().collect::<Vec<_>>(), vec![
        "invoice", "issued", "amount", "Customer", "Status"
    ]);
    assert_eq!(out.table.cell(0, "Customer"), Some(&t("Acme")));
    // different calendar day
    assert_eq!(out.table.cell(1, "Customer"), Some(&t("")));
    // two empty cells are equal keys
    assert_eq!(out.table.cell(2, "Status"), Some(&t("void")));
    assert_eq!(out.summary.matched, 2);
}

#[test]
fn pair_order_does_not_change_outcome() {
    let primary = Table::from_rows(
        ["first", "last"],
        vec![vec![t("Ann"), t("Lee")], vec![t("Bob"), t("Kim")]],
    )
    .unwrap();
    let reference = Table::from_rows(
        ["f", "l", "dept"],
        vec![vec![t("bob"), t("kim"), t("ops")], vec![t("ann"), t("lee"), t("hr")]],
    )
    .unwrap();

    let forward = vec![MatchPair::new("first", "f"), MatchPair::new("last", "l")];
    let backward = vec![MatchPair::new("last", "l"), MatchPair::new("first", "f")];

    let a = run(&primary, &reference, &forward, &mut NullReporter).unwrap();
    let b = run(&primary, &reference, &backward, &mut NullReporter).unwrap();
    assert_eq!(a.outcomes, b.outcomes);
    assert_eq!(a.table, b.table);
}

#[test]
fn duplicate_reference_keys_pick_earliest_row() {
    let primary = Table::from_rows(["sku"], vec![vec![t("X-9")], vec![t("x9")]]).unwrap();
    let reference = Table::from_rows(
        ["sku", "bin"],
        vec![vec![t("X_9"), t("A")], vec![t("x.9"), t("B")], vec![t("X9"), t("C")]],
    )
    .unwrap();

    let mut events = EventCollector::new();
    let out = run(&primary, &reference, &[MatchPair::new("sku", "sku")], &mut events).unwrap();

    assert_eq!(out.table.cell(0, "bin"), Some(&t("A")));
    assert_eq!(out.table.cell(1, "bin"), Some(&t("A")));
    assert!(events
        .messages(LogLevel::Warning)
        .iter()
        .any(|m| m.starts_with("2 reference row(s) repeat an earlier key")));
}

#[test]
fn empty_tables() {
    let empty_primary = Table::from_rows(["id"], Vec::<Vec<CellValue>>::new()).unwrap();
    let reference = Table::from_rows(["id", "x"], vec![vec![t("1"), t("a")]]).unwrap();
    let pairs = vec![MatchPair::new("id", "id")];

    let out = run(&empty_primary, &reference, &pairs, &mut NullReporter).unwrap();
    assert!(out.outcomes.is_empty());
    assert_eq!(out.table.row_count(), 0);
    assert_eq!(out.table.column_names().collect::<Vec<_>>(), vec!["id", "x"]);
    assert_eq!(out.summary.match_rate, 0.0);

    let primary = Table::from_rows(["id"], vec![vec![t("1")], vec![t("2")]]).unwrap();
    let empty_reference = Table::from_rows(["id", "x"], Vec::<Vec<CellValue>>::new()).unwrap();
    let out = run(&primary, &empty_reference, &pairs, &mut NullReporter).unwrap();
    assert!(out.outcomes.iter().all(|o| !o.is_matched()));
    assert_eq!(out.table.cell(1, "x"), Some(&t("")));
}

// -------------------------------------------------------------------------
// Configuration errors
// -------------------------------------------------------------------------

#[test]
fn no_pairs_is_a_configuration_error() {
    let table = Table::from_rows(["id"], vec![vec![t("1")]]).unwrap();
    let mut events = EventCollector::new();
    let err = run(&table, &table, &[], &mut events).unwrap_err();
    assert!(matches!(err, MergeError::NoMatchPairs));
    assert!(err.is_configuration());
    assert!(events.phase(Phase::Match).is_empty());
    assert!(events.phase(Phase::Merge).is_empty());
}

#[test]
fn unknown_primary_column_is_a_configuration_error() {
    let table = Table::from_rows(["id"], vec![vec![t("1")]]).unwrap();
    let err = run(&table, &table, &[MatchPair::new("ID", "id")], &mut NullReporter).unwrap_err();
    assert_eq!(err.to_string(), "primary table: missing column 'ID'");
}

// -------------------------------------------------------------------------
// Config file
// -------------------------------------------------------------------------

#[test]
fn config_pairs_drive_a_run() {
    let config = MergeConfig::from_toml(
        r#"
name = "orders"
[primary]
file = "orders.csv"
[reference]
file = "customers.xlsx"
sheet = "Customers"
[[pairs]]
primary = "customer"
reference = "Name"
"#,
    )
    .unwrap();

    let primary = Table::from_rows(["customer"], vec![vec![t("ACME  Corp.")]]).unwrap();
    let reference =
        Table::from_rows(["Name", "Tier"], vec![vec![t("acme corp"), t("gold")]]).unwrap();

    let out = run(&primary, &reference, &config.pairs, &mut NullReporter).unwrap();
    assert_eq!(out.table.cell(0, "Tier"), Some(&t("gold")));
}

#[test]
fn summary_serializes_for_json_output() {
    let primary = Table::from_rows(["id"], vec![vec![t("1")], vec![t("2")]]).unwrap();
    let reference = Table::from_rows(["id", "v"], vec![vec![t("2"), t("b")]]).unwrap();
    let out = run(&primary, &reference, &[MatchPair::new("id", "id")], &mut NullReporter).unwrap();

    let json = serde_json::to_value(&out.summary).unwrap();
    assert_eq!(json["matched"], 1);
    assert_eq!(json["unmatched"], 1);
    assert_eq!(json["match_rate"], 50.0);
    assert_eq!(json["pairs"][0]["reference"], "id");
    assert_eq!(json["additional_columns"][0], "v");
}
