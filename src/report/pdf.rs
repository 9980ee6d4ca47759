use std::io::{BufWriter, Cursor};

use anyhow::{Context, Result, anyhow};
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rgb,
};

use crate::data::aggregate::AggregatedTable;

use super::format::{cell_text, total_text};
use super::{REPORT_TITLE, ReportFile};

pub const FILENAME: &str = "informe_analisis.pdf";
pub const MIME: &str = "application/pdf";

// A4 portrait geometry, all in millimetres.
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const CHART_W: f32 = 180.0;
const COL_W: f32 = 40.0;
const ROW_H: f32 = 10.0;
const HEADER_PT: f32 = 10.0;
const BODY_PT: f32 = 8.0;

/// Serialise the aggregated table to a paginated PDF: title, the chart
/// image (if available) scaled to a fixed width, then a bordered grid with
/// a bold header row.
pub fn render(agg: &AggregatedTable, chart_png: Option<&[u8]>) -> Result<ReportFile> {
    let (doc, page, layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_W), Mm(PAGE_H), "contenido");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("loading builtin font: {e}"))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("loading builtin bold font: {e}"))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut cursor_y = PAGE_H - MARGIN - 10.0;

    layer.use_text(
        REPORT_TITLE,
        16.0,
        Mm(centered_x(REPORT_TITLE, 16.0)),
        Mm(cursor_y),
        &font_bold,
    );
    cursor_y -= 10.0;

    if let Some(png) = chart_png {
        let decoder =
            PngDecoder::new(Cursor::new(png)).context("decoding the chart png")?;
        let image = Image::try_from(decoder).context("embedding the chart image")?;

        // Scale the bitmap so it spans a fixed width on the page.
        let natural_w = image.image.width.0 as f32 / 300.0 * 25.4;
        let natural_h = image.image.height.0 as f32 / 300.0 * 25.4;
        let scale = CHART_W / natural_w;
        cursor_y -= natural_h * scale;
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(cursor_y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                ..Default::default()
            },
        );
        cursor_y -= 8.0;
    }

    layer.set_outline_color(Color::Rgb(Rgb::new(0.3, 0.3, 0.3, None)));
    layer.set_outline_thickness(0.4);

    let grid = grid_rows(agg);
    draw_grid_row(&layer, &grid[0], cursor_y, &font_bold, HEADER_PT);
    cursor_y -= ROW_H;

    for cells in &grid[1..] {
        if cursor_y < MARGIN + ROW_H {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "contenido");
            layer = doc.get_page(next_page).get_layer(next_layer);
            layer.set_outline_color(Color::Rgb(Rgb::new(0.3, 0.3, 0.3, None)));
            layer.set_outline_thickness(0.4);
            cursor_y = PAGE_H - MARGIN - ROW_H;
        }
        draw_grid_row(&layer, cells, cursor_y, &font, BODY_PT);
        cursor_y -= ROW_H;
    }

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .context("writing the pdf")?;

    Ok(ReportFile {
        filename: FILENAME,
        mime: MIME,
        bytes,
    })
}

/// The exact text lines the grid draws: the header row followed by one
/// line per aggregated row, every cell in canonical form.
pub(crate) fn grid_rows(agg: &AggregatedTable) -> Vec<Vec<String>> {
    let mut grid = vec![agg.headers()];
    for row in &agg.rows {
        let mut cells: Vec<String> = row.keys.iter().map(cell_text).collect();
        cells.push(total_text(row.total));
        grid.push(cells);
    }
    grid
}

/// One bordered row of fixed-width cells whose top edge sits at `top_y`.
fn draw_grid_row<S: AsRef<str>>(
    layer: &PdfLayerReference,
    cells: &[S],
    top_y: f32,
    font: &IndirectFontRef,
    size_pt: f32,
) {
    for (i, cell) in cells.iter().enumerate() {
        let x = MARGIN + i as f32 * COL_W;
        layer.add_line(cell_border(x, top_y));
        layer.use_text(
            fit_to_column(cell.as_ref()),
            size_pt,
            Mm(x + 2.0),
            Mm(top_y - ROW_H + 3.0),
            font,
        );
    }
}

fn cell_border(x: f32, top_y: f32) -> Line {
    let corners = [
        (x, top_y),
        (x + COL_W, top_y),
        (x + COL_W, top_y - ROW_H),
        (x, top_y - ROW_H),
    ];
    Line {
        points: corners
            .iter()
            .map(|&(px, py)| (Point::new(Mm(px), Mm(py)), false))
            .collect(),
        is_closed: true,
    }
}

/// Truncate text that would overflow the fixed column width.
fn fit_to_column(text: &str) -> String {
    const MAX_CHARS: usize = 24;
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CHARS - 1).collect();
    out.push('…');
    out
}

fn centered_x(text: &str, size_pt: f32) -> f32 {
    // Average Helvetica glyph width is close to half the point size.
    let approx_w = text.chars().count() as f32 * size_pt * 0.5 * 0.3528;
    ((PAGE_W - approx_w) / 2.0).max(MARGIN)
}
