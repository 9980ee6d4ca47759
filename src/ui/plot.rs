use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::data::model::CellValue;
use crate::report::format::cell_text;
use crate::state::Analysis;

// ---------------------------------------------------------------------------
// Results bar chart (central panel)
// ---------------------------------------------------------------------------

/// Render the aggregated rows as bars, one per grouping-key tuple, coloured
/// by the first grouping column's value.
pub fn results_chart(ui: &mut Ui, analysis: &Analysis) {
    let result = &analysis.result;

    let labels: Vec<String> = result
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

    let bars: Vec<Bar> = result
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let key = row.keys.first().unwrap_or(&CellValue::Null);
            let color = analysis
                .color_map
                .as_ref()
                .map(|cm| cm.color_for(key))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(i as f64, row.total)
                .name(&labels[i])
                .fill(color)
                .width(0.7)
        })
        .collect();

    let axis_labels = labels;
    Plot::new("results_chart")
        .height(300.0)
        .y_axis_label(&result.value_column)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < axis_labels.len() {
                axis_labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
