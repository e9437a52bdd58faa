use std::fmt;

use sheetmerge_engine::TableError;

#[derive(Debug)]
pub enum IoError {
    /// Extension not recognized as a supported table format.
    UnsupportedFormat(String),
    /// File could not be opened, read or written.
    File { path: String, message: String },
    /// Content could not be parsed as a table.
    Parse { path: String, message: String },
    /// Requested worksheet is not in the workbook.
    SheetNotFound { path: String, sheet: String },
    /// Table does not fit the output format.
    TooLarge { path: String, message: String },
    Table { path: String, source: TableError },
}

impl IoError {
    pub(crate) fn file(path: &std::path::Path, e: impl fmt::Display) -> Self {
        Self::File { path: path.display().to_string(), message: e.to_string() }
    }

    pub(crate) fn parse(path: &std::path::Path, e: impl fmt::Display) -> Self {
        Self::Parse { path: path.display().to_string(), message: e.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(path) => write!(f, "unsupported file format: {path}"),
            Self::File { path, message } => write!(f, "{path}: {message}"),
            Self::Parse { path, message } => write!(f, "cannot parse {path}: {message}"),
            Self::SheetNotFound { path, sheet } => {
                write!(f, "{path}: no sheet named '{sheet}'")
            }
            Self::TooLarge { path, message } => write!(f, "{path}: {message}"),
            Self::Table { path, source } => write!(f, "{path}: {source}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table { source, .. } => Some(source),
            _ => None,
        }
    }
}
