use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet types.
/// Grouping keys live in hash maps and ordered sets, so `CellValue` must be
/// `Eq`, `Ord` and `Hash`; `Null == Null` so that null grouping keys fall
/// into one partition.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord/Hash so we can use CellValue as a grouping key --
//
// Floats compare bitwise (`total_cmp`, `to_bits`): NaN equals itself and
// 0.0 differs from -0.0. Equality, ordering and hashing must agree or the
// grouping map would split one partition key across buckets.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Canonical text form. The on-screen table and every export render cells
/// through this impl, which keeps the three report formats
/// character-for-character identical to the display.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for summation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the source table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Whether every cell in the column is null.
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(CellValue::is_null)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded worksheet
// ---------------------------------------------------------------------------

/// A rectangular table of named columns. Rows are positionally aligned:
/// every column holds exactly `n_rows` values.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from parsed columns, dropping columns that are entirely
    /// null. The drop happens once here and is not re-checked later.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let columns: Vec<Column> = columns.into_iter().filter(|c| !c.is_all_null()).collect();
        debug_assert!(
            columns
                .windows(2)
                .all(|w| w[0].values.len() == w[1].values.len()),
            "columns must be equally long"
        );
        Table { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_drops_all_null_columns() {
        let table = Table::from_columns(vec![
            Column::new("a", vec![CellValue::Text("x".into()), CellValue::Null]),
            Column::new("vacía", vec![CellValue::Null, CellValue::Null]),
            Column::new("b", vec![CellValue::Float(1.0), CellValue::Float(2.0)]),
        ]);
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn null_equals_null_as_grouping_key() {
        assert_eq!(CellValue::Null, CellValue::Null);
        let mut set = std::collections::HashSet::new();
        set.insert(CellValue::Null);
        set.insert(CellValue::Null);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn float_equality_agrees_with_hashing() {
        use std::collections::HashSet;
        // NaN is a valid grouping key and must equal itself, while the two
        // float zeros carry different bits and stay distinct keys.
        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));

        let mut set = HashSet::new();
        set.insert(CellValue::Float(f64::NAN));
        set.insert(CellValue::Float(f64::NAN));
        set.insert(CellValue::Float(0.0));
        set.insert(CellValue::Float(-0.0));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn canonical_text_forms() {
        assert_eq!(CellValue::Text("Norte".into()).to_string(), "Norte");
        assert_eq!(CellValue::Float(15.5).to_string(), "15.5");
        assert_eq!(CellValue::Float(3.25).to_string(), "3.25");
        assert_eq!(CellValue::Integer(10).to_string(), "10");
        assert_eq!(CellValue::Null.to_string(), "");
    }
}
