use sheetmerge_engine::Table;

use crate::config::validate_pairs;
use crate::error::MergeError;
use crate::events::{LogEvent, LogLevel, Reporter};
use crate::matcher::{collect_outcomes, Matcher};
use crate::merge::{merge_planned, plan_columns};
use crate::model::{MatchPair, MergeOutput};
use crate::summary::compute_summary;

/// Match `primary` against `reference` on `pairs` and merge the result.
///
/// Configuration problems (no pairs, unknown columns) are reported before any
/// row is touched and no output is produced. Zero matches is not an error:
/// the merged table is still returned, with a warning narrated.
pub fn run<R: Reporter>(
    primary: &Table,
    reference: &Table,
    pairs: &[MatchPair],
    reporter: &mut R,
) -> Result<MergeOutput, MergeError> {
    reporter.info(format!(
        "Primary table: {} rows, {} columns",
        primary.row_count(),
        primary.col_count()
    ));
    reporter.info(format!(
        "Reference table: {} rows, {} columns",
        reference.row_count(),
        reference.col_count()
    ));

    validate_pairs(pairs).map_err(|e| report_error(reporter, e))?;
    for (i, pair) in pairs.iter().enumerate() {
        reporter.info(format!("Match pair #{}: {pair}", i + 1));
    }

    let matcher = Matcher::new(primary, reference, pairs).map_err(|e| report_error(reporter, e))?;

    let plan = plan_columns(primary, reference, pairs);
    reporter.info(format!("Additional columns to merge: {}", plan.additional.len()));
    if !plan.dropped.is_empty() {
        reporter.warning(format!(
            "Reference column(s) already present in primary, keeping primary: {}",
            plan.dropped.join(", ")
        ));
    }
    let shadowed = matcher.shadowed_reference_rows();
    if shadowed > 0 {
        reporter.warning(format!(
            "{shadowed} reference row(s) repeat an earlier key; the first occurrence is used"
        ));
    }

    reporter.info("Starting matching process...");
    let outcomes = collect_outcomes(&matcher, reporter);
    let summary = compute_summary(&outcomes, reference.row_count(), pairs, &plan);

    reporter.success(format!(
        "Matching complete: {}/{} rows matched",
        summary.matched, summary.primary_rows
    ));
    if summary.matched == 0 {
        reporter.warning("No rows matched! Check your column mappings.");
    }

    let table = merge_planned(primary, reference, &plan, &outcomes, reporter)?;

    reporter.info(format!("Total rows: {}", summary.primary_rows));
    reporter.success(format!("Matched rows: {}", summary.matched));
    reporter.info(format!("Unmatched rows: {}", summary.unmatched));

    Ok(MergeOutput { table, outcomes, summary })
}

fn report_error<R: Reporter>(reporter: &mut R, err: MergeError) -> MergeError {
    reporter.log(LogEvent { level: LogLevel::Error, message: err.to_string() });
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventCollector, Phase};
    use sheetmerge_engine::CellValue;

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn tables() -> (Table, Table) {
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
        (primary, reference)
    }

    #[test]
    fn narrates_and_reports_progress() {
        let (p, r) = tables();
        let mut events = EventCollector::new();
        let out = run(&p, &r, &[MatchPair::new("id", "ref_id")], &mut events).unwrap();

        assert_eq!(out.summary.matched, 1);
        assert_eq!(events.phase(Phase::Match).len(), 2);
        assert_eq!(events.phase(Phase::Merge).len(), 2);
        let infos = events.messages(LogLevel::Info);
        assert!(infos.contains(&"Match pair #1: 'id' <-> 'ref_id'"));
        assert!(infos.contains(&"Unmatched rows: 1"));
        assert!(events.messages(LogLevel::Warning).is_empty());
    }

    #[test]
    fn zero_matches_warns_but_merges() {
        let (p, r) = tables();
        let mut events = EventCollector::new();
        let out = run(&p, &r, &[MatchPair::new("name", "ref_id")], &mut events).unwrap();

        assert_eq!(out.summary.matched, 0);
        assert_eq!(out.table.row_count(), 2);
        assert_eq!(out.table.cell(0, "extra"), Some(&t("")));
        assert_eq!(
            events.messages(LogLevel::Warning),
            vec!["No rows matched! Check your column mappings."]
        );
    }

    #[test]
    fn configuration_error_produces_nothing() {
        let (p, r) = tables();
        let mut events = EventCollector::new();

        let err = run(&p, &r, &[MatchPair::new("id", "missing")], &mut events).unwrap_err();
        assert!(err.is_configuration());
        assert!(events.progress_events().is_empty());
        assert_eq!(events.messages(LogLevel::Error), vec!["reference table: missing column 'missing'"]);

        let err = run(&p, &r, &[], &mut events).unwrap_err();
        assert!(matches!(err, MergeError::NoMatchPairs));
    }

    #[test]
    fn warns_on_dropped_columns_and_shadowed_rows() {
        let p = Table::from_rows(["id", "name"], vec![vec![t("1"), t("x")]]).unwrap();
        let r = Table::from_rows(
            ["id", "name"],
            vec![vec![t("1"), t("first")], vec![t("1"), t("second")]],
        )
        .unwrap();
        let mut events = EventCollector::new();
        let out = run(&p, &r, &[MatchPair::new("id", "id")], &mut events).unwrap();

        assert_eq!(out.summary.dropped_columns, vec!["name"]);
        assert_eq!(out.table.col_count(), 2);
        assert_eq!(events.messages(LogLevel::Warning).len(), 2);
    }
}
