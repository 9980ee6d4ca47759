use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::data::aggregate::AggregatedTable;

use super::format::cell_text;
use super::{RESULT_SHEET, ReportFile};

pub const FILENAME: &str = "informe_analisis.xlsx";
pub const MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Serialise the aggregated table to a single-sheet xlsx workbook.
/// Grouping keys are written as their canonical text, totals as numbers.
pub fn render(agg: &AggregatedTable) -> Result<ReportFile> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(RESULT_SHEET)
        .context("naming the result sheet")?;

    for (col, header) in agg.headers().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header)
            .context("writing header row")?;
    }

    for (idx, row) in agg.rows.iter().enumerate() {
        let excel_row = idx as u32 + 1;
        for (col, key) in row.keys.iter().enumerate() {
            worksheet
                .write_string(excel_row, col as u16, cell_text(key))
                .with_context(|| format!("writing row {idx}"))?;
        }
        worksheet
            .write_number(excel_row, row.keys.len() as u16, row.total)
            .with_context(|| format!("writing total of row {idx}"))?;
    }

    let bytes = workbook
        .save_to_buffer()
        .context("serialising the xlsx workbook")?;

    Ok(ReportFile {
        filename: FILENAME,
        mime: MIME,
        bytes,
    })
}
