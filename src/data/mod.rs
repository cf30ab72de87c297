/// Data layer: core series types and loading.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  file → RawTable (header row + cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  table    │  column letter / name → Vec<f64>, "NA" → NaN
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ CoreDataset │  age model, titanium, extra profiles
///   └────────────┘
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod table;
