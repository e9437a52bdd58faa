// Excel import/export
//
// Import goes through calamine (xlsx, xlsm, xls, xlsb, ods); export writes
// xlsx with rust_xlsxwriter. Only the first row is treated specially (headers).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_xlsxwriter::{Format, Workbook};
use sheetmerge_engine::{CellValue, Table};

use crate::clean_headers;
use crate::error::IoError;

/// Excel worksheet limits.
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLS: usize = 16_384;

/// Import one worksheet (first sheet when `sheet` is `None`).
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| IoError::file(path, format!("failed to open Excel file: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound {
                path: path.display().to_string(),
                sheet: wanted.to_string(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IoError::parse(path, "Excel file contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IoError::parse(path, format!("failed to read sheet '{name}': {e}")))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => clean_headers(header_row.iter().map(|d| cell_value(d).display())),
        None => return Ok(Table::new()),
    };

    let mut data = Vec::new();
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        data.push(cells);
    }

    Table::from_rows(headers, data).map_err(|source| IoError::Table {
        path: path.display().to_string(),
        source,
    })
}

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, IoError> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| IoError::file(path, format!("failed to open Excel file: {e}")))?;
    Ok(workbook.sheet_names().to_vec())
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            // Durations and out-of-range serials keep their raw value
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Write `table` as a single-sheet xlsx: bold header row, typed cells.
pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    if table.row_count() + 1 > MAX_ROWS || table.col_count() > MAX_COLS {
        return Err(IoError::TooLarge {
            path: path.display().to_string(),
            message: format!(
                "{} rows x {} columns exceeds the xlsx limit of {} x {}",
                table.row_count() + 1,
                table.col_count(),
                MAX_ROWS,
                MAX_COLS
            ),
        });
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    let write_err = |row: u32, col: u16, e: rust_xlsxwriter::XlsxError| {
        IoError::file(path, format!("failed to write cell ({row}, {col}): {e}"))
    };

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet
            .write_string_with_format(0, col, &column.name, &header_format)
            .map_err(|e| write_err(0, col, e))?;

        for (row_idx, value) in column.values.iter().enumerate() {
            let row = row_idx as u32 + 1;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    if !s.is_empty() {
                        worksheet.write_string(row, col, s).map_err(|e| write_err(row, col, e))?;
                    }
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row, col, *n).map_err(|e| write_err(row, col, e))?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b).map_err(|e| write_err(row, col, e))?;
                }
                CellValue::DateTime(dt) => {
                    let format = if dt.time() == NaiveTime::MIN { &date_format } else { &datetime_format };
                    worksheet
                        .write_number_with_format(row, col, excel_serial(dt), format)
                        .map_err(|e| write_err(row, col, e))?;
                }
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| IoError::file(path, format!("failed to save workbook: {e}")))?;
    Ok(())
}

/// Days since 1899-12-30 (the 1900 date system), time of day as the fraction.
fn excel_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN);
    let delta = *dt - epoch;
    delta.num_milliseconds() as f64 / 86_400_000.0
}
