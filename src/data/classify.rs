//! Monetary-column detection over free-text headers.
//!
//! The decision is a pure function of the selected column names so it can be
//! tested without the UI; ambiguity is reported as data, never resolved with
//! a prompt from in here.

/// Header terms that mark a column as holding monetary values
/// (case-insensitive substring match).
pub const MONETARY_TERMS: [&str; 7] = [
    "euro", "€", "coste", "importe", "valor", "ingreso", "precio",
];

/// Outcome of classifying a selection of column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exactly one candidate; chosen automatically.
    Unique(String),
    /// Several candidates, in selection order. The caller must pick one;
    /// the first is the default.
    Ambiguous(Vec<String>),
    /// No selected column matches any recognised term.
    None,
}

/// Whether a single column name looks monetary.
pub fn is_monetary_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    MONETARY_TERMS.iter().any(|term| lower.contains(term))
}

/// Classify a selection of column names into a monetary-column decision.
pub fn classify(selection: &[String]) -> Classification {
    let candidates: Vec<String> = selection
        .iter()
        .filter(|name| is_monetary_name(name))
        .cloned()
        .collect();

    match candidates.len() {
        0 => Classification::None,
        1 => Classification::Unique(candidates.into_iter().next().unwrap_or_default()),
        _ => Classification::Ambiguous(candidates),
    }
}

/// The grouping columns for a resolved monetary column: the selection minus
/// that column, order preserved.
pub fn grouping_columns(selection: &[String], monetary: &str) -> Vec<String> {
    selection
        .iter()
        .filter(|name| name.as_str() != monetary)
        .cloned()
        .collect()
}
