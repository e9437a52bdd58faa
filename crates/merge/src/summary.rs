use crate::merge::ColumnPlan;
use crate::model::{MatchOutcome, MatchPair, MergeSummary};

/// Compute run statistics from match outcomes.
pub fn compute_summary(
    outcomes: &[MatchOutcome],
    reference_rows: usize,
    pairs: &[MatchPair],
    plan: &ColumnPlan,
) -> MergeSummary {
    let primary_rows = outcomes.len();
    let matched = outcomes.iter().filter(|o| o.is_matched()).count();
    let match_rate = if primary_rows > 0 {
        matched as f64 / primary_rows as f64 * 100.0
    } else {
        0.0
    };

    MergeSummary {
        primary_rows,
        reference_rows,
        matched,
        unmatched: primary_rows - matched,
        match_rate,
        pairs: pairs.to_vec(),
        additional_columns: plan.additional.clone(),
        dropped_columns: plan.dropped.clone(),
    }
}
