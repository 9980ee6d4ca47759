//! The single to-string rule shared by the on-screen table and every export.

use crate::data::model::CellValue;

/// Canonical text for a grouping-key cell.
pub fn cell_text(value: &CellValue) -> String {
    value.to_string()
}

/// Canonical text for a summed monetary value. Must match what a
/// [`CellValue::Float`] holding the same number would display.
pub fn total_text(total: f64) -> String {
    CellValue::Float(total).to_string()
}

/// Grand total with a currency prefix and thousands/decimal grouping to two
/// decimal places, e.g. `€18.75`, `€1,234.50`.
pub fn currency_text(total: f64) -> String {
    format!("€{}", with_thousands(total, 2))
}

fn with_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

    let mut grouped = String::new();
    for (idx, ch) in int_part.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    if decimals == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_matches_the_worked_example() {
        assert_eq!(currency_text(18.75), "€18.75");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency_text(1234.5), "€1,234.50");
        assert_eq!(currency_text(1_234_567.891), "€1,234,567.89");
        assert_eq!(currency_text(-1000.0), "€-1,000.00");
    }

    #[test]
    fn total_text_matches_float_cell_text() {
        assert_eq!(total_text(15.5), cell_text(&CellValue::Float(15.5)));
        assert_eq!(total_text(3.25), "3.25");
    }
}
