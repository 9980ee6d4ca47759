use anyhow::Result;
use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::report::format::{cell_text, currency_text, total_text};
use crate::report::{ReportFile, excel, pdf, word};
use crate::state::{Analysis, AppState};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – analysis results and export buttons
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let mut new_status: Option<String> = None;

    {
        if state.table.is_none() {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Abre un archivo de Excel para comenzar  (Archivo → Abrir…)");
            });
            return;
        }
        if state.selection.is_empty() {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("Selecciona las columnas que deseas analizar para ver los resultados.");
            });
            return;
        }
        let Some(analysis) = &state.analysis else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("Pulsa «Analizar» para agrupar y sumar la selección.");
            });
            return;
        };

        ui.heading("Resultados del Análisis");
        ui.separator();

        if analysis.result.is_scalar() {
            scalar_summary(ui, analysis);
        } else {
            results_table(ui, analysis);
            ui.add_space(8.0);
            plot::results_chart(ui, analysis);
            ui.add_space(8.0);
            grouped_summary(ui, analysis);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.strong("Opciones de Exportación");
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("📥 Descargar Excel").clicked() {
                new_status = offer_download(excel::render(&analysis.result));
            }
            if ui.button("📥 Descargar Word").clicked() {
                new_status = offer_download(word::render(&analysis.result));
            }
            if ui.button("📥 Descargar PDF").clicked() {
                new_status = offer_download(pdf::render(
                    &analysis.result,
                    analysis.chart_png.as_deref(),
                ));
            }
        });
    }

    if new_status.is_some() {
        state.status_message = new_status;
    }
}

/// Exact same rows, order and cell text as every export.
fn results_table(ui: &mut Ui, analysis: &Analysis) {
    let result = &analysis.result;
    let headers = result.headers();

    TableBuilder::new(ui)
        .striped(true)
        .columns(TableColumn::auto().resizable(true), headers.len())
        .header(20.0, |mut header| {
            for name in &headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, result.rows.len(), |mut row| {
                let record = &result.rows[row.index()];
                for key in &record.keys {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell_text(key));
                    });
                }
                row.col(|ui: &mut Ui| {
                    ui.label(total_text(record.total));
                });
            });
        });
}

fn grouped_summary(ui: &mut Ui, analysis: &Analysis) {
    ui.label(format!(
        "El análisis ha sumado los valores de la columna {} agrupados por {}. \
         El total acumulado es de {}.",
        analysis.monetary_column,
        analysis.group_columns.join(", "),
        currency_text(analysis.result.grand_total()),
    ));
}

fn scalar_summary(ui: &mut Ui, analysis: &Analysis) {
    ui.label(format!(
        "Total de la columna {}: {}",
        analysis.monetary_column,
        currency_text(analysis.result.grand_total()),
    ));
}

// ---------------------------------------------------------------------------
// Download handling
// ---------------------------------------------------------------------------

/// Offer a rendered report through a native save dialog. Returns an error
/// message for the status line, or `None` when saved or cancelled.
fn offer_download(report: Result<ReportFile>) -> Option<String> {
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            log::error!("export failed: {e:#}");
            return Some(format!("Error al generar el informe: {e:#}"));
        }
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title("Guardar informe")
        .set_file_name(report.filename)
        .save_file()
    else {
        return None;
    };

    match std::fs::write(&path, &report.bytes) {
        Ok(()) => {
            log::info!(
                "saved {} ({} bytes, {})",
                path.display(),
                report.bytes.len(),
                report.mime
            );
            None
        }
        Err(e) => {
            log::error!("saving {} failed: {e}", path.display());
            Some(format!("Error al guardar {}: {e}", path.display()))
        }
    }
}
