use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::color::ColorMap;
use crate::data::aggregate::{AggregatedTable, aggregate};
use crate::data::classify::{Classification, classify, grouping_columns};
use crate::data::model::Table;
use crate::report::chart;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Where the session stands in the upload → select → analyze flow.
/// A new upload always restarts the cycle; a failed interaction never
/// moves the phase backwards past what is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoFile,
    FileLoaded,
    ColumnsChosen,
    Analyzed,
}

/// Result of one successful analysis run, kept until the selection or the
/// file changes.
pub struct Analysis {
    pub monetary_column: String,
    pub group_columns: Vec<String>,
    pub result: AggregatedTable,
    /// PNG of the bar chart; `None` in the scalar case or if rendering failed.
    pub chart_png: Option<Vec<u8>>,
    pub color_map: Option<ColorMap>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub phase: Phase,

    /// Path of the loaded workbook, for display.
    pub source_path: Option<PathBuf>,

    /// Parsed table (None until a file loads successfully).
    pub table: Option<Table>,

    /// Selected column names, in the order the user ticked them.
    pub selection: Vec<String>,

    /// Explicit monetary-column choice when classification is ambiguous.
    pub monetary_override: Option<String>,

    /// Last successful analysis.
    pub analysis: Option<Analysis>,

    /// Error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::NoFile,
            source_path: None,
            table: None,
            selection: Vec::new(),
            monetary_override: None,
            analysis: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table, discarding every piece of derived state.
    pub fn set_table(&mut self, path: PathBuf, table: Table) {
        self.table = Some(table);
        self.source_path = Some(path);
        self.selection.clear();
        self.monetary_override = None;
        self.analysis = None;
        self.status_message = None;
        self.phase = Phase::FileLoaded;
    }

    /// A failed read clears prior session state entirely.
    pub fn clear(&mut self) {
        *self = AppState::default();
    }

    /// Close the current file and return to the initial phase.
    pub fn reset(&mut self) {
        self.clear();
    }

    /// Toggle a column in the selection. Any change invalidates a previous
    /// analysis and the ambiguity override.
    pub fn toggle_column(&mut self, name: &str) {
        match self.selection.iter().position(|c| c == name) {
            Some(idx) => {
                self.selection.remove(idx);
            }
            None => self.selection.push(name.to_string()),
        }
        self.monetary_override = None;
        self.analysis = None;
        self.status_message = None;
        self.phase = if self.selection.is_empty() {
            Phase::FileLoaded
        } else {
            Phase::ColumnsChosen
        };
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.iter().any(|c| c == name)
    }

    /// Classification of the current selection; pure and recomputed on
    /// demand so the UI can offer the candidate picker before analyzing.
    pub fn classification(&self) -> Classification {
        classify(&self.selection)
    }

    /// The monetary column the next analysis will use, if one is resolvable:
    /// the unique candidate, or the override / first candidate when ambiguous.
    pub fn resolved_monetary(&self) -> Option<String> {
        match self.classification() {
            Classification::Unique(col) => Some(col),
            Classification::Ambiguous(candidates) => self
                .monetary_override
                .clone()
                .filter(|o| candidates.contains(o))
                .or_else(|| candidates.first().cloned()),
            Classification::None => None,
        }
    }

    /// Run the analysis for the current selection. On failure the table and
    /// selection survive so the user can re-select and retry.
    pub fn analyze(&mut self) {
        self.analysis = None;
        self.status_message = None;

        let Some(table) = &self.table else {
            return;
        };
        if self.selection.is_empty() {
            return;
        }

        let Some(monetary) = self.resolved_monetary() else {
            self.status_message = Some(
                "No se pudo identificar una columna de valores económicos. Asegúrate de que \
                 el nombre de la columna contenga palabras como 'Euro', '€', 'Valor', \
                 'Importe', etc."
                    .to_string(),
            );
            return;
        };
        let groups = grouping_columns(&self.selection, &monetary);

        let result = match aggregate(table, &groups, &monetary) {
            Ok(result) => result,
            Err(e) => {
                log::error!("analysis failed: {e}");
                self.status_message = Some(format!("Error al procesar los datos: {e}"));
                return;
            }
        };

        // The chart only makes sense for a grouped result; a failure to draw
        // it degrades the PDF, never the analysis.
        let (color_map, chart_png) = if result.is_scalar() {
            (None, None)
        } else {
            let unique: BTreeSet<_> = result
                .rows
                .iter()
                .filter_map(|r| r.keys.first().cloned())
                .collect();
            let color_map = ColorMap::new(&result.group_columns[0], &unique);
            let png = match chart::render_png(&result, &color_map) {
                Ok(png) => Some(png),
                Err(e) => {
                    log::warn!("chart rendering failed: {e:#}");
                    None
                }
            };
            (Some(color_map), png)
        };

        log::info!(
            "analyzed {} rows: sum of '{monetary}' grouped by {:?}",
            table.n_rows(),
            groups
        );
        self.analysis = Some(Analysis {
            monetary_column: monetary,
            group_columns: groups,
            result,
            chart_png,
            color_map,
        });
        self.phase = Phase::Analyzed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn loaded_state() -> AppState {
        let table = Table::from_columns(vec![
            Column::new(
                "Región",
                vec![
                    CellValue::Text("Norte".into()),
                    CellValue::Text("Norte".into()),
                    CellValue::Text("Sur".into()),
                ],
            ),
            Column::new(
                "Importe",
                vec![
                    CellValue::Float(10.5),
                    CellValue::Float(5.0),
                    CellValue::Float(3.25),
                ],
            ),
        ]);
        let mut state = AppState::default();
        state.set_table(PathBuf::from("ventas.xlsx"), table);
        state
    }

    #[test]
    fn upload_select_analyze_walks_the_phases() {
        let mut state = loaded_state();
        assert_eq!(state.phase, Phase::FileLoaded);

        state.toggle_column("Región");
        state.toggle_column("Importe");
        assert_eq!(state.phase, Phase::ColumnsChosen);

        state.analyze();
        assert_eq!(state.phase, Phase::Analyzed);
        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.monetary_column, "Importe");
        assert_eq!(analysis.group_columns, vec!["Región"]);
        assert_eq!(analysis.result.grand_total(), 18.75);
        assert!(analysis.color_map.is_some());
    }

    #[test]
    fn monetary_only_selection_degrades_to_scalar_total() {
        let mut state = loaded_state();
        state.toggle_column("Importe");
        state.analyze();
        let analysis = state.analysis.as_ref().unwrap();
        assert!(analysis.result.is_scalar());
        assert!(analysis.chart_png.is_none());
        assert_eq!(analysis.result.grand_total(), 18.75);
    }

    #[test]
    fn failed_classification_keeps_table_and_selection() {
        let mut state = loaded_state();
        state.toggle_column("Región");
        state.analyze();

        assert!(state.analysis.is_none());
        assert!(state.status_message.is_some());
        assert!(state.table.is_some());
        assert_eq!(state.selection, vec!["Región"]);
        assert_eq!(state.phase, Phase::ColumnsChosen);

        // Retry after fixing the selection.
        state.toggle_column("Importe");
        state.analyze();
        assert_eq!(state.phase, Phase::Analyzed);
    }

    #[test]
    fn reselecting_discards_a_previous_analysis() {
        let mut state = loaded_state();
        state.toggle_column("Región");
        state.toggle_column("Importe");
        state.analyze();
        assert!(state.analysis.is_some());

        state.toggle_column("Región");
        assert!(state.analysis.is_none());
        assert_eq!(state.phase, Phase::ColumnsChosen);
    }

    #[test]
    fn new_table_discards_the_selection() {
        let mut state = loaded_state();
        state.toggle_column("Región");
        let table = state.table.clone().unwrap();
        state.set_table(PathBuf::from("otro.xlsx"), table);
        assert!(state.selection.is_empty());
        assert_eq!(state.phase, Phase::FileLoaded);
    }
}
