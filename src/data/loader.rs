use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, Xlsx, open_workbook_auto};

use super::model::{CellValue, Column, Table};

/// Worksheet the source workbook must contain.
pub const REQUIRED_SHEET: &str = "Hoja1";

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Load the analysis table from a spreadsheet file.
///
/// The workbook must contain a worksheet named `Hoja1`; its first row holds
/// the column names. Columns that are empty across all rows are dropped
/// before the table is returned.
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => {}
        other => bail!("Unsupported file extension: .{other}"),
    }

    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range(REQUIRED_SHEET)
        .with_context(|| format!("the workbook has no worksheet named '{REQUIRED_SHEET}'"))?;

    range_to_table(&range)
}

/// Load the analysis table from in-memory xlsx bytes. Same contract as
/// [`load_file`]; used by the tests to round-trip generated workbooks.
pub fn read_workbook<R: Read + Seek>(reader: R) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(reader).context("reading xlsx data")?;
    let range = workbook
        .worksheet_range(REQUIRED_SHEET)
        .with_context(|| format!("the workbook has no worksheet named '{REQUIRED_SHEET}'"))?;

    range_to_table(&range)
}

// ---------------------------------------------------------------------------
// Range → Table
// ---------------------------------------------------------------------------

fn range_to_table(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let header = rows.next().context("the worksheet is empty")?;

    // Header cells become column names; cells without a name are ignored.
    let named: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let name = cell_value(cell).to_string();
            let name = name.trim().to_string();
            (!name.is_empty()).then_some((i, name))
        })
        .collect();
    if named.is_empty() {
        bail!("the worksheet has no column headers");
    }

    let mut columns: Vec<Column> = named
        .iter()
        .map(|(_, name)| Column::new(name.clone(), Vec::new()))
        .collect();

    for row in rows {
        for (col, (idx, _)) in columns.iter_mut().zip(named.iter()) {
            let value = row.get(*idx).map_or(CellValue::Null, cell_value);
            col.values.push(value);
        }
    }

    Ok(Table::from_columns(columns))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(s.to_string())
            }
        }
        Data::Float(v) => CellValue::Float(*v),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                CellValue::Date(ndt.date().format("%Y-%m-%d").to_string())
            }
            Some(ndt) => CellValue::Date(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            // Serial value outside the representable range; keep the raw number.
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rust_xlsxwriter::Workbook;

    use super::*;

    fn workbook_bytes(sheet: &str, header: &[&str], rows: &[&[Data]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name(sheet).unwrap();
        for (c, h) in header.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Data::String(s) => {
                        ws.write_string(r as u32 + 1, c as u16, s).unwrap();
                    }
                    Data::Float(v) => {
                        ws.write_number(r as u32 + 1, c as u16, *v).unwrap();
                    }
                    Data::Empty => {}
                    other => panic!("unsupported test cell {other:?}"),
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_hoja1_into_table() {
        let bytes = workbook_bytes(
            "Hoja1",
            &["Región", "Importe"],
            &[
                &[Data::String("Norte".into()), Data::Float(10.5)],
                &[Data::String("Sur".into()), Data::Float(3.25)],
            ],
        );
        let table = read_workbook(Cursor::new(bytes)).unwrap();
        assert_eq!(table.column_names(), vec!["Región", "Importe"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.column("Importe").unwrap().values,
            vec![CellValue::Float(10.5), CellValue::Float(3.25)]
        );
    }

    #[test]
    fn missing_required_sheet_is_an_error() {
        let bytes = workbook_bytes("Datos", &["a"], &[&[Data::Float(1.0)]]);
        let err = read_workbook(Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("Hoja1"), "{err:#}");
    }

    #[test]
    fn fully_empty_columns_are_dropped() {
        let bytes = workbook_bytes(
            "Hoja1",
            &["a", "hueco", "b"],
            &[
                &[Data::String("x".into()), Data::Empty, Data::Float(1.0)],
                &[Data::String("y".into()), Data::Empty, Data::Float(2.0)],
            ],
        );
        let table = read_workbook(Cursor::new(bytes)).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }
}
