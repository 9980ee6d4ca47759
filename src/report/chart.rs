use anyhow::{Context, Result, anyhow};
use plotters::prelude::*;

use crate::color::ColorMap;
use crate::data::aggregate::AggregatedTable;
use crate::data::model::CellValue;
use crate::report::format::cell_text;

/// Pixel size of the rendered chart. The PDF renderer scales from these.
pub const CHART_WIDTH_PX: u32 = 900;
pub const CHART_HEIGHT_PX: u32 = 500;

/// Render the aggregated rows as a PNG bar chart: one bar per row, coloured
/// by the first grouping column's value. Not meaningful for the scalar case;
/// callers skip the chart when there are no grouping columns.
pub fn render_png(agg: &AggregatedTable, colors: &ColorMap) -> Result<Vec<u8>> {
    let n = agg.rows.len().max(1);
    let first_group = agg
        .group_columns
        .first()
        .cloned()
        .unwrap_or_else(|| agg.value_column.clone());
    let title = format!("Suma de {} por {}", agg.value_column, first_group);

    let labels: Vec<String> = agg
        .rows
        .iter()
        .map(|row| {
            row.keys
                .iter()
                .map(cell_text)
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .collect();

    let y_max = agg.rows.iter().map(|r| r.total).fold(0.0_f64, f64::max);
    let y_min = agg.rows.iter().map(|r| r.total).fold(0.0_f64, f64::min);
    let span = (y_max - y_min).abs().max(1.0);
    let y_range = (y_min.min(0.0) - span * 0.05)..(y_max.max(0.0) + span * 0.1);

    let mut raw = vec![0u8; (CHART_WIDTH_PX * CHART_HEIGHT_PX * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut raw, (CHART_WIDTH_PX, CHART_HEIGHT_PX))
                .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("filling chart background: {e}"))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title.as_str(), ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(-0.5_f64..(n as f64 - 0.5), y_range)
            .map_err(|e| anyhow!("building chart axes: {e}"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n.min(24))
            .x_label_formatter(&|x: &f64| {
                let i = x.round();
                if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
                    labels[i as usize].clone()
                } else {
                    String::new()
                }
            })
            .y_desc(agg.value_column.as_str())
            .draw()
            .map_err(|e| anyhow!("drawing chart mesh: {e}"))?;

        chart
            .draw_series(agg.rows.iter().enumerate().map(|(i, row)| {
                let key = row.keys.first().unwrap_or(&CellValue::Null);
                let c = colors.color_for(key);
                let color = RGBColor(c.r(), c.g(), c.b());
                Rectangle::new(
                    [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, row.total)],
                    color.filled(),
                )
            }))
            .map_err(|e| anyhow!("drawing chart bars: {e}"))?;

        root.present()
            .map_err(|e| anyhow!("finalising chart: {e}"))?;
    }

    let img = image::RgbImage::from_raw(CHART_WIDTH_PX, CHART_HEIGHT_PX, raw)
        .context("assembling chart image buffer")?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encoding chart png")?;
    Ok(png)
}
