/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet   (local or https://)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → PitchDataset (cached per session)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  active predicates → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  group by pitch type → PitchSummary rows
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered rows → CSV
///   └──────────┘
/// ```
///
/// `pipeline` ties filter and aggregate together behind the Run button.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
