/// Report layer: one canonical formatter, a chart rasteriser and three
/// independent serialisers over the aggregated table. None of them mutate
/// their input, and all cell text flows through [`format`] so the exports
/// stay character-for-character identical to the on-screen table.
pub mod chart;
pub mod excel;
pub mod format;
pub mod pdf;
pub mod word;

/// Title heading shared by the word and pdf documents.
pub const REPORT_TITLE: &str = "Informe de Análisis de Datos";

/// Descriptive paragraph under the word document's heading.
pub const REPORT_INTRO: &str =
    "Este informe presenta un análisis detallado de los datos a partir de las columnas seleccionadas.";

/// Worksheet name of the spreadsheet export.
pub const RESULT_SHEET: &str = "Resultados";

/// A rendered report, ready to be offered as a download.
pub struct ReportFile {
    pub filename: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io::Cursor;

    use calamine::{Reader, Xlsx};

    use crate::color::ColorMap;
    use crate::data::aggregate::{AggregatedRow, AggregatedTable};
    use crate::data::model::CellValue;

    use super::format::{cell_text, total_text};
    use super::*;

    fn sample_aggregate() -> AggregatedTable {
        AggregatedTable {
            group_columns: vec!["Región".into(), "Producto".into()],
            value_column: "Importe".into(),
            rows: vec![
                AggregatedRow {
                    keys: vec![CellValue::Text("Norte".into()), CellValue::Text("A".into())],
                    total: 15.5,
                },
                AggregatedRow {
                    keys: vec![CellValue::Text("Sur".into()), CellValue::Text("B".into())],
                    total: 3.25,
                },
            ],
        }
    }

    /// The header names and cell text of the spreadsheet export must equal
    /// the canonical formatting used on screen.
    #[test]
    fn excel_export_round_trips_canonical_text() {
        let agg = sample_aggregate();
        let report = excel::render(&agg).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(report.bytes)).unwrap();
        let range = workbook.worksheet_range(RESULT_SHEET).unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();

        assert_eq!(rows[0], agg.headers());
        for (read, expected) in rows[1..].iter().zip(agg.rows.iter()) {
            for (cell, key) in read.iter().zip(expected.keys.iter()) {
                assert_eq!(*cell, cell_text(key));
            }
            assert_eq!(read[expected.keys.len()], total_text(expected.total));
        }
    }

    #[test]
    fn word_export_is_a_zip_container() {
        let report = word::render(&sample_aggregate()).unwrap();
        assert_eq!(report.filename, "informe_analisis.docx");
        assert!(report.bytes.starts_with(b"PK"));
    }

    /// The packed document's table must carry the canonical cell text in
    /// table order: headers first, then every key and total row by row.
    #[test]
    fn word_export_table_holds_canonical_text_in_order() {
        use std::io::Read;

        let agg = sample_aggregate();
        let report = word::render(&agg).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(report.bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();

        let mut expected: Vec<String> = agg.headers();
        for row in &agg.rows {
            expected.extend(row.keys.iter().map(cell_text));
            expected.push(total_text(row.total));
        }

        let mut from = 0;
        for text in &expected {
            let needle = format!(">{text}<");
            match xml[from..].find(&needle) {
                Some(at) => from += at + needle.len(),
                None => panic!("'{text}' missing or out of order in document.xml"),
            }
        }
    }

    #[test]
    fn pdf_export_works_with_and_without_the_chart() {
        let agg = sample_aggregate();
        let unique: BTreeSet<CellValue> =
            agg.rows.iter().filter_map(|r| r.keys.first().cloned()).collect();
        let colors = ColorMap::new("Región", &unique);
        // Chart rendering needs a system font; like the app, degrade to a
        // chartless document when none is available.
        let png = chart::render_png(&agg, &colors).ok();

        let plain = pdf::render(&agg, None).unwrap();
        assert_eq!(plain.mime, "application/pdf");
        assert!(plain.bytes.starts_with(b"%PDF"));

        if let Some(png) = png {
            let with_chart = pdf::render(&agg, Some(&png)).unwrap();
            assert!(with_chart.bytes.starts_with(b"%PDF"));
            assert!(plain.bytes.len() < with_chart.bytes.len());
        }
    }

    /// The text lines the pdf grid draws must equal the canonical
    /// formatting, header row first, then every key and total in table
    /// order.
    #[test]
    fn pdf_grid_holds_canonical_text_in_order() {
        let agg = sample_aggregate();
        let grid = pdf::grid_rows(&agg);

        assert_eq!(grid.len(), agg.rows.len() + 1);
        assert_eq!(grid[0], agg.headers());
        for (drawn, row) in grid[1..].iter().zip(agg.rows.iter()) {
            for (cell, key) in drawn.iter().zip(row.keys.iter()) {
                assert_eq!(*cell, cell_text(key));
            }
            assert_eq!(drawn[row.keys.len()], total_text(row.total));
        }
    }
}
