use std::collections::HashMap;

use thiserror::Error;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("the table has no column named '{0}'")]
    UnknownColumn(String),
    #[error("column '{column}' holds the non-numeric value '{value}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// AggregatedTable – the grouped-and-summed result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    /// One value per grouping column; empty in the scalar-total case.
    pub keys: Vec<CellValue>,
    pub total: f64,
}

/// One row per distinct grouping-key tuple, in first-encounter order.
/// That order is not sorted, but it is stable within a run so the screen
/// and every export show the same rows in the same sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTable {
    pub group_columns: Vec<String>,
    pub value_column: String,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    /// Column headers, left to right: grouping columns then the value column.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = self.group_columns.clone();
        headers.push(self.value_column.clone());
        headers
    }

    /// Sum over the value column. Equal to the ungrouped sum of the source
    /// monetary column: grouping never changes the total.
    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    /// Whether this is the no-grouping degenerate case (one scalar total).
    pub fn is_scalar(&self) -> bool {
        self.group_columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group rows by `group_columns` and sum `value_column` per group.
///
/// Nulls in the value column contribute zero; any other non-numeric value is
/// fatal and nothing partial is returned. With no grouping columns the result
/// is a single row holding the plain total.
pub fn aggregate(
    table: &Table,
    group_columns: &[String],
    value_column: &str,
) -> Result<AggregatedTable, AggregateError> {
    let values = numeric_column(table, value_column)?;

    let group_cols: Vec<&[CellValue]> = group_columns
        .iter()
        .map(|name| {
            table
                .column(name)
                .map(|c| c.values.as_slice())
                .ok_or_else(|| AggregateError::UnknownColumn(name.clone()))
        })
        .collect::<Result<_, _>>()?;

    if group_cols.is_empty() {
        return Ok(AggregatedTable {
            group_columns: Vec::new(),
            value_column: value_column.to_string(),
            rows: vec![AggregatedRow {
                keys: Vec::new(),
                total: values.iter().sum(),
            }],
        });
    }

    // First-encounter order: the map finds the partition, the Vec keeps
    // the natural grouping order for display/export parity.
    let mut index: HashMap<Vec<CellValue>, usize> = HashMap::new();
    let mut rows: Vec<AggregatedRow> = Vec::new();

    for (row_idx, value) in values.iter().enumerate() {
        let key: Vec<CellValue> = group_cols.iter().map(|col| col[row_idx].clone()).collect();
        match index.get(&key) {
            Some(&slot) => rows[slot].total += value,
            None => {
                index.insert(key.clone(), rows.len());
                rows.push(AggregatedRow {
                    keys: key,
                    total: *value,
                });
            }
        }
    }

    Ok(AggregatedTable {
        group_columns: group_columns.to_vec(),
        value_column: value_column.to_string(),
        rows,
    })
}

/// Pull the monetary column as `f64`s, nulls as zero.
fn numeric_column(table: &Table, name: &str) -> Result<Vec<f64>, AggregateError> {
    let column = table
        .column(name)
        .ok_or_else(|| AggregateError::UnknownColumn(name.to_string()))?;

    column
        .values
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            if cell.is_null() {
                return Ok(0.0);
            }
            cell.as_f64().ok_or_else(|| AggregateError::NonNumeric {
                column: name.to_string(),
                row,
                value: cell.to_string(),
            })
        })
        .collect()
}
