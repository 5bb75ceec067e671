// Underwriting report - segment tables over premium, claims and sum-insured
// records.
//
// The pipeline runs strictly forward, each stage a pure function of the
// previous stage's output and the current `QueryParams`:
//
// 1. `loader` parses raw snapshot cells into `NormalizedRecord`s
// 2. `period` orders `(month, financial year)` pairs
// 3. `filters` selects records by occupancy, period range and column values
// 4. `aggregate` sums records per segment and recomputes the ratios
// 5. `multiyear` lines a year up against the two before it
// 6. `table` sorts and filters the aggregated rows
// 7. `pager` slices the result into pages
//
// `Dashboard` wires the stages together over one loaded snapshot.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filters;
pub mod loader;
pub mod multiyear;
pub mod output;
pub mod pager;
pub mod period;
pub mod query;
pub mod reports;
pub mod schema;
pub mod table;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use filters::{ColumnFilters, OccupancySelection};
pub use pager::{Page, PageSize};
pub use period::{FinancialMonthRange, FinancialYear, Period};
pub use query::QueryParams;
pub use reports::{Dashboard, MultiYearView, ReportView};
pub use table::{SortDirection, SortSpec};
pub use types::{AggregatedRow, Column, DisplayRow, Metrics, NormalizedRecord, RawRecord, RawValue};
