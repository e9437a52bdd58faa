// File I/O: load tables for a merge, save the merged result

pub mod csv;
pub mod error;
pub mod xlsx;

use std::collections::HashSet;
use std::path::Path;

use sheetmerge_engine::Table;

pub use error::IoError;

/// File formats understood by [`import`] / [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    /// Anything calamine opens: xlsx, xlsm, xls, xlsb, ods.
    Spreadsheet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(IoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load a table. `sheet` selects a worksheet for spreadsheet files and is
/// ignored for delimited text.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => csv::import(path),
        FileFormat::Tsv => csv::import_tsv(path),
        FileFormat::Spreadsheet => xlsx::import(path, sheet),
    }
}

/// Write a table. Spreadsheet output is always xlsx.
pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => csv::export(table, path),
        FileFormat::Tsv => csv::export_tsv(table, path),
        FileFormat::Spreadsheet => {
            let is_xlsx = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
            if !is_xlsx {
                return Err(IoError::UnsupportedFormat(format!(
                    "{} (spreadsheet output must be .xlsx)",
                    path.display()
                )));
            }
            xlsx::export(table, path)
        }
    }
}

/// Make header names usable as column names: blank headers become
/// `Unnamed: N`, repeats become `name.1`, `name.2`, ...
pub fn clean_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (i, h) in raw.into_iter().enumerate() {
        let h = h.as_ref().trim();
        let base = if h.is_empty() { format!("Unnamed: {i}") } else { h.to_string() };

        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("a.tsv")).unwrap(), FileFormat::Tsv);
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")).unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_path(Path::new("a.ods")).unwrap(), FileFormat::Spreadsheet);
        assert!(matches!(
            FileFormat::from_path(Path::new("a.json")),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(FileFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn headers_blank_and_duplicate() {
        let cleaned = clean_headers(["id", "", "name", "id", "id", " name "]);
        assert_eq!(cleaned, vec!["id", "Unnamed: 1", "name", "id.1", "id.2", "name.1"]);
    }

    #[test]
    fn export_refuses_legacy_excel() {
        let table = Table::new();
        let err = export(&table, Path::new("out.xls")).unwrap_err();
        assert!(err.to_string().contains("must be .xlsx"));
    }
}
