use std::fmt;

use sheetmerge_engine::TableError;

use crate::model::Side;

#[derive(Debug)]
pub enum MergeError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank column name, etc.).
    ConfigValidation(String),
    /// Matching was requested without any match pairs.
    NoMatchPairs,
    /// A match pair names a column the table does not have.
    MissingColumn { side: Side, column: String },
    /// Match outcomes don't line up with the primary table.
    OutcomeCount { expected: usize, found: usize },
    /// An outcome points at the wrong primary row or past the reference table.
    InvalidOutcome(String),
    /// Output table construction failed.
    Table(TableError),
}

impl MergeError {
    /// Errors raised before matching starts because the job itself is wrong.
    /// No output is produced for these.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_)
                | Self::ConfigValidation(_)
                | Self::NoMatchPairs
                | Self::MissingColumn { .. }
        )
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::NoMatchPairs => write!(f, "at least one match pair is required"),
            Self::MissingColumn { side, column } => {
                write!(f, "{side} table: missing column '{column}'")
            }
            Self::OutcomeCount { expected, found } => write!(
                f,
                "expected {expected} match outcome(s), one per primary row, found {found}"
            ),
            Self::InvalidOutcome(msg) => write!(f, "invalid match outcome: {msg}"),
            Self::Table(e) => write!(f, "output table: {e}"),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for MergeError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}
