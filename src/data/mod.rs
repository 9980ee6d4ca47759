/// Data layer: core types, loading, classification and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx (worksheet "Hoja1")
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse workbook → Table (all-null columns dropped)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  selected names → monetary column + grouping columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  group-by-sum → AggregatedTable
///   └──────────┘
/// ```

pub mod aggregate;
pub mod classify;
pub mod loader;
pub mod model;
