use std::collections::HashSet;

use sheetmerge_engine::{CellValue, Table};

use crate::error::MergeError;
use crate::events::{Phase, ProgressEvent, Reporter};
use crate::model::{MatchOutcome, MatchPair, Side};

/// Which reference columns get appended to the primary table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Appended, in reference order.
    pub additional: Vec<String>,
    /// Skipped because the primary table already has a column of that name.
    pub dropped: Vec<String>,
}

/// Reference columns minus match-key columns minus names the primary already uses.
pub fn plan_columns(primary: &Table, reference: &Table, pairs: &[MatchPair]) -> ColumnPlan {
    let key_columns: HashSet<&str> = pairs.iter().map(|p| p.reference.as_str()).collect();
    let mut plan = ColumnPlan::default();

    for name in reference.column_names() {
        if key_columns.contains(name) {
            continue;
        }
        if primary.has_column(name) {
            plan.dropped.push(name.to_string());
        } else {
            plan.additional.push(name.to_string());
        }
    }

    plan
}

/// Build the merged table: a copy of `primary` followed by the planned
/// reference columns, filled from each row's matched reference row.
///
/// Unmatched rows get `""` in every additional column. Row count and order
/// are the primary table's.
pub fn merge<R: Reporter>(
    primary: &Table,
    reference: &Table,
    pairs: &[MatchPair],
    outcomes: &[MatchOutcome],
    reporter: &mut R,
) -> Result<Table, MergeError> {
    let plan = plan_columns(primary, reference, pairs);
    merge_planned(primary, reference, &plan, outcomes, reporter)
}

pub(crate) fn merge_planned<R: Reporter>(
    primary: &Table,
    reference: &Table,
    plan: &ColumnPlan,
    outcomes: &[MatchOutcome],
    reporter: &mut R,
) -> Result<Table, MergeError> {
    let total = primary.row_count();
    if outcomes.len() != total {
        return Err(MergeError::OutcomeCount { expected: total, found: outcomes.len() });
    }

    let sources = plan
        .additional
        .iter()
        .map(|name| {
            reference.column(name).ok_or_else(|| MergeError::MissingColumn {
                side: Side::Reference,
                column: name.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut filled: Vec<Vec<CellValue>> =
        vec![vec![CellValue::Text(String::new()); total]; sources.len()];

    for (row, outcome) in outcomes.iter().enumerate() {
        if outcome.primary_row() != row {
            return Err(MergeError::InvalidOutcome(format!(
                "outcome {row} refers to primary row {}",
                outcome.primary_row()
            )));
        }
        if let Some(ref_row) = outcome.reference_row() {
            for (target, source) in filled.iter_mut().zip(&sources) {
                let value = source.values.get(ref_row).ok_or_else(|| {
                    MergeError::InvalidOutcome(format!(
                        "reference row {ref_row} out of range ({} rows)",
                        reference.row_count()
                    ))
                })?;
                target[row] = value.clone();
            }
        }
        reporter.progress(ProgressEvent {
            phase: Phase::Merge,
            current: row + 1,
            total,
            matched: None,
        });
    }

    let mut merged = primary.clone();
    for (name, values) in plan.additional.iter().zip(filled) {
        merged.push_column(name.clone(), values)?;
    }
    Ok(merged)
}
