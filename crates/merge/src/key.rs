use sheetmerge_engine::{Column, Table};

use crate::error::MergeError;
use crate::model::{MatchPair, Side};
use crate::normalize::normalize;

/// Normalized values of every match-pair column for one row, in pair order.
///
/// Kept as a tuple of parts rather than a joined string, so no separator
/// can ever collide with cell content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(Vec<String>);

impl CompositeKey {
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" | "))
    }
}

/// Builds composite keys for one side of a match, with the pair columns
/// resolved once up front.
#[derive(Debug)]
pub struct KeyBuilder<'a> {
    columns: Vec<&'a Column>,
}

impl<'a> KeyBuilder<'a> {
    /// Resolve every pair column on `side`. Fails on the first column the
    /// table doesn't have.
    pub fn new(table: &'a Table, pairs: &[MatchPair], side: Side) -> Result<Self, MergeError> {
        if pairs.is_empty() {
            return Err(MergeError::NoMatchPairs);
        }
        let columns = pairs
            .iter()
            .map(|pair| {
                let name = pair.column(side);
                table.column(name).ok_or_else(|| MergeError::MissingColumn {
                    side,
                    column: name.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    /// Key for `row`. Panics if `row` is out of range for the table.
    pub fn key(&self, row: usize) -> CompositeKey {
        CompositeKey(self.columns.iter().map(|c| normalize(&c.values[row])).collect())
    }
}

/// One-shot key for a single row.
pub fn build_key(
    table: &Table,
    row: usize,
    pairs: &[MatchPair],
    side: Side,
) -> Result<CompositeKey, MergeError> {
    Ok(KeyBuilder::new(table, pairs, side)?.key(row))
}
