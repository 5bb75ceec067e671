// Ordering and filtering of aggregated rows. Both operate on the values a
// reader actually sees, after aggregation.

use crate::filters::ColumnFilters;
use crate::types::{Column, ColumnSource};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(column: Column) -> Self {
        SortSpec {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: Column) -> Self {
        SortSpec {
            column,
            direction: SortDirection::Descending,
        }
    }

    /// The sort after a click on `column`: a new column starts ascending, a
    /// repeated click flips the direction.
    pub fn toggled(current: Option<SortSpec>, column: Column) -> SortSpec {
        match current {
            Some(spec) if spec.column == column => match spec.direction {
                SortDirection::Ascending => SortSpec::descending(column),
                SortDirection::Descending => SortSpec::ascending(column),
            },
            _ => SortSpec::ascending(column),
        }
    }
}

/// Stable sort: rows with equal keys keep their relative order in either
/// direction. `None` leaves the order as given.
pub fn sort_rows<R: ColumnSource + Clone>(rows: &[R], sort: Option<SortSpec>) -> Vec<R> {
    let mut out = rows.to_vec();
    if let Some(spec) = sort {
        out.sort_by(|a, b| {
            let ord = spec.column.sort_value(a).compare(&spec.column.sort_value(b));
            match spec.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
    out
}

pub fn apply_column_filters<R>(rows: &[R], filters: &ColumnFilters) -> Vec<R>
where
    R: ColumnSource + Clone,
{
    rows.iter().filter(|r| filters.matches(*r)).cloned().collect()
}

/// Distinct displayed values of `column`, in row order.
pub fn distinct_values<R: ColumnSource>(rows: &[R], column: Column) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|r| column.display(r))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Option lists for every column's filter picker.
pub fn filter_options<R: ColumnSource>(rows: &[R]) -> BTreeMap<Column, Vec<String>> {
    Column::ALL
        .into_iter()
        .map(|c| (c, distinct_values(rows, c)))
        .collect()
}
