use serde::{Deserialize, Serialize};
use sheetmerge_engine::Table;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One equality test: a primary column compared against a reference column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPair {
    pub primary: String,
    pub reference: String,
}

impl MatchPair {
    pub fn new(primary: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            reference: reference.into(),
        }
    }

    /// The column name this pair reads on the given side.
    pub fn column(&self, side: Side) -> &str {
        match side {
            Side::Primary => &self.primary,
            Side::Reference => &self.reference,
        }
    }
}

impl std::fmt::Display for MatchPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' <-> '{}'", self.primary, self.reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Primary,
    Reference,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Primary => "primary",
            Side::Reference => "reference",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Outcome for a single primary row. Exactly one per primary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched { primary_row: usize, reference_row: usize },
    Unmatched { primary_row: usize },
}

impl MatchOutcome {
    pub fn primary_row(&self) -> usize {
        match *self {
            Self::Matched { primary_row, .. } | Self::Unmatched { primary_row } => primary_row,
        }
    }

    pub fn reference_row(&self) -> Option<usize> {
        match *self {
            Self::Matched { reference_row, .. } => Some(reference_row),
            Self::Unmatched { .. } => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSummary {
    pub primary_rows: usize,
    pub reference_rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Percentage of primary rows matched, 0.0 for an empty primary table.
    pub match_rate: f64,
    pub pairs: Vec<MatchPair>,
    /// Reference columns appended to the output, in reference order.
    pub additional_columns: Vec<String>,
    /// Non-key reference columns skipped because the primary already has that name.
    pub dropped_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub table: Table,
    pub outcomes: Vec<MatchOutcome>,
    pub summary: MergeSummary,
}
