use std::io::Cursor;

use anyhow::{Context, Result};
use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

use crate::data::aggregate::AggregatedTable;

use super::format::{cell_text, total_text};
use super::{REPORT_INTRO, REPORT_TITLE, ReportFile};

pub const FILENAME: &str = "informe_analisis.docx";
pub const MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Serialise the aggregated table to a word-processing document: a title
/// heading, one descriptive paragraph, then a grid of header + data rows.
pub fn render(agg: &AggregatedTable) -> Result<ReportFile> {
    let mut rows = Vec::with_capacity(agg.rows.len() + 1);
    rows.push(TableRow::new(
        agg.headers().iter().map(|h| text_cell(h)).collect(),
    ));
    for row in &agg.rows {
        let mut cells: Vec<TableCell> =
            row.keys.iter().map(|k| text_cell(&cell_text(k))).collect();
        cells.push(text_cell(&total_text(row.total)));
        rows.push(TableRow::new(cells));
    }

    let docx = Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(REPORT_TITLE).size(32).bold()),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(REPORT_INTRO)))
        .add_table(Table::new(rows));

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .context("packing the docx container")?;

    Ok(ReportFile {
        filename: FILENAME,
        mime: MIME,
        bytes: cursor.into_inner(),
    })
}

fn text_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}
