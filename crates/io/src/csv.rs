// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use sheetmerge_engine::{CellValue, Table};

use crate::clean_headers;
use crate::error::IoError;

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(path, &content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(path, &content, b'\t')
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Header line must split into >1 field for the candidate to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::file(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::file(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// First record is the header row; blank lines are skipped.
fn import_from_string(path: &Path, content: &str, delimiter: u8) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers = match records.next() {
        Some(record) => clean_headers(record.map_err(|e| IoError::parse(path, e))?.iter()),
        None => return Ok(Table::new()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| IoError::parse(path, e))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(CellValue::from_input).collect::<Vec<_>>());
    }

    Table::from_rows(headers, rows).map_err(|source| IoError::Table {
        path: path.display().to_string(),
        source,
    })
}

pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<(), IoError> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IoError::file(path, e))?;

    writer
        .write_record(table.column_names())
        .map_err(|e| IoError::file(path, e))?;

    for row in table.rows() {
        let record: Vec<String> = row.iter().map(|cell| cell.display()).collect();
        writer.write_record(&record).map_err(|e| IoError::file(path, e))?;
    }

    writer.flush().map_err(|e| IoError::file(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sniffs_semicolons() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a,b\n1,2\n"), b',');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn import_types_and_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "id,amount,note\nA-1,12.5,\n\nB-2,7,hello world\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "id"), Some(&CellValue::Text("A-1".into())));
        assert_eq!(table.cell(0, "amount"), Some(&CellValue::Number(12.5)));
        assert_eq!(table.cell(0, "note"), Some(&CellValue::Empty));
        assert_eq!(table.cell(1, "note"), Some(&CellValue::Text("hello world".into())));
    }

    #[test]
    fn import_keeps_id_text_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ids.csv");
        fs::write(&path, "id,qty\n007,3\n12345678901234567,4\n12345678901234568,5\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.cell(0, "id"), Some(&CellValue::Text("007".into())));
        assert_eq!(table.cell(1, "id"), Some(&CellValue::Text("12345678901234567".into())));
        assert_eq!(table.cell(2, "id"), Some(&CellValue::Text("12345678901234568".into())));
        assert_eq!(table.cell(0, "qty"), Some(&CellValue::Number(3.0)));

        let out = dir.path().join("out.csv");
        export(&table, &out).unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "id,qty\n007,3\n12345678901234567,4\n12345678901234568,5\n"
        );
    }

    #[test]
    fn import_bom_and_latin1() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}name,city\nx,y\n").unwrap();
        let table = import(&path).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["name", "city"]);

        let path = dir.path().join("latin1.csv");
        // "café" in Windows-1252
        fs::write(&path, b"name,v\ncaf\xe9,1\n").unwrap();
        let table = import(&path).unwrap();
        assert_eq!(table.cell(0, "name"), Some(&CellValue::Text("café".into())));
    }

    #[test]
    fn import_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        let table = import(&path).unwrap();
        assert_eq!(table.col_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn import_rejects_rows_wider_than_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.csv");
        fs::write(&path, "a,b\n1,2,3\n").unwrap();
        let err = import(&path).unwrap_err();
        assert!(matches!(err, IoError::Table { .. }));
    }

    #[test]
    fn export_writes_header_and_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::from_rows(
            ["id", "extra"],
            vec![
                vec![CellValue::Text("A-1".into()), CellValue::Number(3.0)],
                vec![CellValue::Text("B, 2".into()), CellValue::Text(String::new())],
            ],
        )
        .unwrap();

        export(&table, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,extra\nA-1,3\n\"B, 2\",\n");
    }
}
