//! Location table loading from spreadsheet workbooks.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{
    open_workbook_auto, open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader, Sheets,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;

/// Column holding the location codes
pub const REQUIRED_COLUMN: &str = "Ubicaciones";

/// One row of input: a shelf location code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRecord {
    pub code: String,
}

impl LocationRecord {
    pub fn new(code: impl Into<String>) -> Self {
        LocationRecord { code: code.into() }
    }
}

/// A sheet rendered as text: the first row as headers, the rest as rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        SheetTable {
            headers,
            rows: rows.collect(),
        }
    }
}

/// Load location records from a workbook on disk.
pub fn load_locations(
    path: impl AsRef<Path>,
    sheet: Option<&str>,
) -> Result<Vec<LocationRecord>, AppError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AppError::InputNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::WorkbookError(format!("{}: {}", path.display(), e)))?;
    let range = read_sheet(&mut workbook, sheet)?;
    locations_from_range(&range)
}

/// Load location records from an uploaded workbook held in memory.
pub fn load_locations_from_bytes(
    bytes: Vec<u8>,
    sheet: Option<&str>,
) -> Result<Vec<LocationRecord>, AppError> {
    let range = read_sheet_from_bytes(bytes, sheet)?;
    locations_from_range(&range)
}

/// Load an uploaded workbook, keeping the whole sheet as text alongside the
/// location records so it can be shown back before download.
pub fn load_table_from_bytes(
    bytes: Vec<u8>,
    sheet: Option<&str>,
) -> Result<(SheetTable, Vec<LocationRecord>), AppError> {
    let range = read_sheet_from_bytes(bytes, sheet)?;
    let records = locations_from_range(&range)?;
    Ok((SheetTable::from_range(&range), records))
}

fn read_sheet_from_bytes(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Range<Data>, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::WorkbookError(e.to_string()))?;
    read_sheet(&mut workbook, sheet)
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: Option<&str>,
) -> Result<Range<Data>, AppError> {
    match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .map_err(|e| AppError::WorkbookError(format!("sheet '{}': {}", name, e))),
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::WorkbookError("workbook has no sheets".to_string()))?
            .map_err(|e| AppError::WorkbookError(e.to_string())),
    }
}

/// Extract the location column from a sheet whose first row holds headers.
/// Headers are trimmed before matching; blank location cells are skipped.
pub fn locations_from_range(range: &Range<Data>) -> Result<Vec<LocationRecord>, AppError> {
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| AppError::MissingColumn(REQUIRED_COLUMN.to_string()))?;
    let column = header
        .iter()
        .position(|cell| cell_to_string(cell).trim() == REQUIRED_COLUMN)
        .ok_or_else(|| AppError::MissingColumn(REQUIRED_COLUMN.to_string()))?;
    debug!("Column '{}' found at index {}", REQUIRED_COLUMN, column);

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        let code = row.get(column).map(cell_to_string).unwrap_or_default();
        if code.is_empty() {
            // +2: header row and 1-based numbering
            warn!("Row {} has no location, skipping", idx + 2);
            continue;
        }
        records.push(LocationRecord { code });
    }

    Ok(records)
}

/// Convert a calamine cell to text
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERROR: {:?}", e),
        Data::DateTime(dt) => excel_datetime_to_string(dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Date cells read as `YYYY-MM-DD HH:MM:SS`. Durations keep their serial value.
fn excel_datetime_to_string(dt: &ExcelDateTime) -> String {
    if !dt.is_datetime() {
        return dt.to_string();
    }

    let (year, month, day, hour, min, sec, milli) = dt.to_ymd_hms_milli();
    let mut text = format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year, month, day, hour, min, sec
    );
    if milli > 0 {
        text.push_str(&format!(".{:03}", milli));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[Data]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn test_reads_location_column_in_order() {
        let range = sheet(&[
            &[s("Pasillo"), s("Ubicaciones")],
            &[s("1"), s("A011-05")],
            &[s("1"), s("B022-10")],
            &[s("2"), s("C039-01")],
        ]);
        let records = locations_from_range(&range).unwrap();
        let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["A011-05", "B022-10", "C039-01"]);
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let range = sheet(&[&[s("  Ubicaciones ")], &[s("A011-05")]]);
        let records = locations_from_range(&range).unwrap();
        assert_eq!(records, vec![LocationRecord::new("A011-05")]);
    }

    #[test]
    fn test_header_match_is_case_sensitive() {
        let range = sheet(&[&[s("ubicaciones")], &[s("A011-05")]]);
        let err = locations_from_range(&range).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(ref c) if c == "Ubicaciones"));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let range = sheet(&[&[s("Codigo")], &[s("A011-05")]]);
        let err = locations_from_range(&range).unwrap_err();
        assert!(err.to_string().contains("Ubicaciones"));
    }

    #[test]
    fn test_empty_sheet_is_missing_column() {
        let range: Range<Data> = Range::empty();
        assert!(matches!(
            locations_from_range(&range),
            Err(AppError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_header_only_sheet_has_no_records() {
        let range = sheet(&[&[s("Ubicaciones")]]);
        assert!(locations_from_range(&range).unwrap().is_empty());
    }

    #[test]
    fn test_values_are_coerced_to_text() {
        let range = sheet(&[
            &[s("Ubicaciones")],
            &[Data::Int(1012)],
            &[Data::Float(2021.0)],
            &[Data::Float(1.5)],
        ]);
        let codes: Vec<String> = locations_from_range(&range)
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["1012", "2021", "1.5"]);
    }

    #[test]
    fn test_blank_cells_are_skipped() {
        let range = sheet(&[
            &[s("Ubicaciones")],
            &[s("A011-05")],
            &[Data::Empty],
            &[s("B022-10")],
        ]);
        assert_eq!(locations_from_range(&range).unwrap().len(), 2);
    }

    #[test]
    fn test_codes_are_not_trimmed_or_changed() {
        let range = sheet(&[&[s("Ubicaciones")], &[s("a01-x ")]]);
        assert_eq!(locations_from_range(&range).unwrap()[0].code, "a01-x ");
    }

    #[test]
    fn test_sheet_table_keeps_every_column() {
        let range = sheet(&[
            &[s("Pasillo"), s(" Ubicaciones ")],
            &[s("A"), s("A011-05")],
            &[Data::Int(2), s("B022-10")],
        ]);
        let table = SheetTable::from_range(&range);
        assert_eq!(table.headers, vec!["Pasillo", " Ubicaciones "]);
        assert_eq!(
            table.rows,
            vec![vec!["A", "A011-05"], vec!["2", "B022-10"]]
        );
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = load_locations("no-such-workbook.xlsx", None).unwrap_err();
        assert!(matches!(err, AppError::InputNotFound(_)));
    }

    #[test]
    fn test_garbage_bytes_are_workbook_error() {
        let err = load_locations_from_bytes(b"definitely not a workbook".to_vec(), None).unwrap_err();
        assert!(matches!(err, AppError::WorkbookError(_)));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&s("hello")), "hello");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_date_cells_are_written_as_dates() {
        use calamine::ExcelDateTimeType;

        let new_year = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_to_string(&Data::DateTime(new_year)), "2024-01-01 00:00:00");

        let afternoon = ExcelDateTime::new(45943.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_to_string(&Data::DateTime(afternoon)), "2025-10-13 12:00:00");

        let range = sheet(&[&[s("Ubicaciones")], &[Data::DateTime(new_year)]]);
        assert_eq!(locations_from_range(&range).unwrap()[0].code, "2024-01-01 00:00:00");
    }
}
