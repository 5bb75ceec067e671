// Record-level selection: occupancy membership, financial-period range and
// per-column equality. Each predicate passes everything through when unset.

use crate::period::{FinancialYear, PeriodRange};
use crate::types::{Column, ColumnSource, NormalizedRecord};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum OccupancySelection {
    #[default]
    All,
    /// Exact matches against [`NormalizedRecord::occupancy_key`].
    Only(BTreeSet<String>),
}

impl OccupancySelection {
    /// An empty list means "All".
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if set.is_empty() {
            OccupancySelection::All
        } else {
            OccupancySelection::Only(set)
        }
    }

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        match self {
            OccupancySelection::All => true,
            OccupancySelection::Only(keys) => keys.contains(&record.occupancy_key),
        }
    }
}

/// Active equality filters by column. A column with no entry is unfiltered;
/// there is no reserved "Select" value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ColumnFilters {
    values: BTreeMap<Column, String>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        ColumnFilters::default()
    }

    /// Set or, with `None`, clear the filter on `column`.
    pub fn set(&mut self, column: Column, value: Option<String>) {
        match value {
            Some(v) => {
                self.values.insert(column, v);
            }
            None => {
                self.values.remove(&column);
            }
        }
    }

    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.values.get(&column).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &str)> {
        self.values.iter().map(|(c, v)| (*c, v.as_str()))
    }

    /// All active filters hold for `row` (compared on displayed text).
    pub fn matches<R: ColumnSource>(&self, row: &R) -> bool {
        self.values.iter().all(|(column, wanted)| column.display(row) == *wanted)
    }
}

/// The record-level inputs of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub occupancy: OccupancySelection,
    pub period: Option<PeriodRange>,
    pub columns: ColumnFilters,
}

pub fn filter_occupancy<'a>(
    records: impl IntoIterator<Item = &'a NormalizedRecord>,
    occupancy: &OccupancySelection,
) -> Vec<&'a NormalizedRecord> {
    records.into_iter().filter(|r| occupancy.matches(r)).collect()
}

/// Inclusive range on period index. Unclassified records never match an
/// active range.
pub fn filter_period<'a>(
    records: impl IntoIterator<Item = &'a NormalizedRecord>,
    range: Option<&PeriodRange>,
) -> Vec<&'a NormalizedRecord> {
    match range {
        None => records.into_iter().collect(),
        Some(range) => records
            .into_iter()
            .filter(|r| r.period_index().is_some_and(|i| range.contains_index(i)))
            .collect(),
    }
}

pub fn filter_columns<'a>(
    records: impl IntoIterator<Item = &'a NormalizedRecord>,
    columns: &ColumnFilters,
) -> Vec<&'a NormalizedRecord> {
    records.into_iter().filter(|r| columns.matches(*r)).collect()
}

/// Occupancy, then period, then column filters.
pub fn select<'a>(
    records: &'a [NormalizedRecord],
    selection: &Selection,
) -> Vec<&'a NormalizedRecord> {
    let by_occupancy = filter_occupancy(records, &selection.occupancy);
    let by_period = filter_period(by_occupancy, selection.period.as_ref());
    filter_columns(by_period, &selection.columns)
}

/// Distinct occupancy keys in first-seen order, for the occupancy picker.
pub fn occupancy_options(records: &[NormalizedRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|&r| seen.insert(r.occupancy_key.as_str()))
        .map(|r| r.occupancy_key.clone())
        .collect()
}

/// Financial years with at least one classified record, newest first.
pub fn available_years(records: &[NormalizedRecord]) -> Vec<FinancialYear> {
    let years: BTreeSet<FinancialYear> =
        records.iter().filter_map(|r| r.financial_year()).collect();
    years.into_iter().rev().collect()
}
