use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::classify::Classification;
use crate::data::loader;
use crate::state::{AppState, Phase};

// ---------------------------------------------------------------------------
// Left side panel – column selection
// ---------------------------------------------------------------------------

/// Render the left panel: one checkbox per table column, the monetary-column
/// picker when classification is ambiguous, and the analyze button.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Columnas");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let columns = match &state.table {
        Some(table) => table.column_names(),
        None => {
            ui.label("No hay archivo cargado.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let mut checked = state.is_selected(col);
                if ui.checkbox(&mut checked, col).changed() {
                    state.toggle_column(col);
                }
            }

            ui.separator();
            monetary_picker(ui, state);
            ui.add_space(8.0);

            let can_analyze = !state.selection.is_empty();
            if ui
                .add_enabled(can_analyze, egui::Button::new("Analizar"))
                .clicked()
            {
                state.analyze();
            }
        });
}

/// Show how the monetary column was resolved; with several candidates the
/// user picks explicitly (first candidate preselected).
fn monetary_picker(ui: &mut Ui, state: &mut AppState) {
    match state.classification() {
        Classification::Unique(col) => {
            ui.label(format!("Columna económica: {col}"));
        }
        Classification::Ambiguous(candidates) => {
            ui.strong("Columna económica");
            let current = state.resolved_monetary().unwrap_or_default();
            egui::ComboBox::from_id_salt("monetary_pick")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for candidate in &candidates {
                        if ui
                            .selectable_label(current == *candidate, candidate)
                            .clicked()
                            && state.monetary_override.as_deref() != Some(candidate)
                        {
                            state.monetary_override = Some(candidate.clone());
                            state.analysis = None;
                            state.phase = Phase::ColumnsChosen;
                        }
                    }
                });
        }
        Classification::None if !state.selection.is_empty() => {
            ui.label(
                RichText::new("Ninguna columna seleccionada parece económica.")
                    .color(Color32::YELLOW),
            );
        }
        Classification::None => {}
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Cerrar").clicked() {
                state.reset();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(path), Some(table)) = (&state.source_path, &state.table) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} filas × {} columnas",
                table.n_rows(),
                table.n_columns()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir archivo de Excel")
        .add_filter("Excel", &["xlsx", "xlsm", "xls", "ods"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "loaded {} rows with columns {:?}",
                    table.n_rows(),
                    table.column_names()
                );
                state.set_table(path, table);
            }
            Err(e) => {
                log::error!("failed to load file: {e:#}");
                // A failed read discards prior session state entirely.
                state.clear();
                state.status_message = Some(format!(
                    "Error al leer el archivo. Asegúrate de que tenga una hoja llamada \
                     '{}'. {e:#}",
                    loader::REQUIRED_SHEET
                ));
            }
        }
    }
}
