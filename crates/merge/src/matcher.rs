use std::collections::HashMap;
use std::iter::FusedIterator;

use sheetmerge_engine::Table;

use crate::error::MergeError;
use crate::events::{Phase, ProgressEvent, Reporter};
use crate::key::{CompositeKey, KeyBuilder};
use crate::model::{MatchOutcome, MatchPair, Side};

/// First-match-wins lookup of primary rows in a reference table.
///
/// Reference keys are computed once in [`Matcher::new`]; each primary row is
/// then keyed and looked up independently, so outcomes can be produced lazily
/// and in any order.
#[derive(Debug)]
pub struct Matcher<'a> {
    primary: KeyBuilder<'a>,
    primary_rows: usize,
    reference_keys: Vec<CompositeKey>,
    /// Key → earliest reference row carrying it.
    first_row: HashMap<CompositeKey, usize>,
}

impl<'a> Matcher<'a> {
    /// Validates every pair column on both sides before keying anything.
    pub fn new(
        primary: &'a Table,
        reference: &'a Table,
        pairs: &[MatchPair],
    ) -> Result<Self, MergeError> {
        let primary_keys = KeyBuilder::new(primary, pairs, Side::Primary)?;
        let reference_keys = KeyBuilder::new(reference, pairs, Side::Reference)?;

        let reference_keys: Vec<CompositeKey> =
            (0..reference.row_count()).map(|r| reference_keys.key(r)).collect();

        let mut first_row = HashMap::with_capacity(reference_keys.len());
        for (row, key) in reference_keys.iter().enumerate() {
            first_row.entry(key.clone()).or_insert(row);
        }

        Ok(Self {
            primary: primary_keys,
            primary_rows: primary.row_count(),
            reference_keys,
            first_row,
        })
    }

    pub fn primary_rows(&self) -> usize {
        self.primary_rows
    }

    /// Reference rows whose key already appeared on an earlier reference row.
    /// These can never be selected as a match.
    pub fn shadowed_reference_rows(&self) -> usize {
        self.reference_keys.len() - self.first_row.len()
    }

    /// Outcome for one primary row. Panics if `primary_row` is out of range.
    pub fn outcome(&self, primary_row: usize) -> MatchOutcome {
        let key = self.primary.key(primary_row);
        match self.first_row.get(&key) {
            Some(&reference_row) => MatchOutcome::Matched { primary_row, reference_row },
            None => MatchOutcome::Unmatched { primary_row },
        }
    }

    /// Lazy outcomes in primary row order. Call again to restart.
    pub fn outcomes(&self) -> Outcomes<'_, 'a> {
        Outcomes { matcher: self, next: 0 }
    }
}

/// Iterator over [`MatchOutcome`]s, one per primary row.
#[derive(Debug, Clone)]
pub struct Outcomes<'m, 'a> {
    matcher: &'m Matcher<'a>,
    next: usize,
}

impl Iterator for Outcomes<'_, '_> {
    type Item = MatchOutcome;

    fn next(&mut self) -> Option<MatchOutcome> {
        if self.next >= self.matcher.primary_rows {
            return None;
        }
        let outcome = self.matcher.outcome(self.next);
        self.next += 1;
        Some(outcome)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.matcher.primary_rows - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Outcomes<'_, '_> {}

impl FusedIterator for Outcomes<'_, '_> {}

/// Match every primary row, reporting progress once per row.
pub fn match_rows<R: Reporter>(
    primary: &Table,
    reference: &Table,
    pairs: &[MatchPair],
    reporter: &mut R,
) -> Result<Vec<MatchOutcome>, MergeError> {
    let matcher = Matcher::new(primary, reference, pairs)?;
    Ok(collect_outcomes(&matcher, reporter))
}

pub(crate) fn collect_outcomes<R: Reporter>(matcher: &Matcher<'_>, reporter: &mut R) -> Vec<MatchOutcome> {
    let total = matcher.primary_rows();
    let mut matched = 0;
    let mut outcomes = Vec::with_capacity(total);

    for outcome in matcher.outcomes() {
        if outcome.is_matched() {
            matched += 1;
        }
        outcomes.push(outcome);
        reporter.progress(ProgressEvent {
            phase: Phase::Match,
            current: outcomes.len(),
            total,
            matched: Some(matched),
        });
    }

    outcomes
}
