// Side-by-side comparison of a financial year with the two before it.
//
// Each year goes through the same selection and aggregation on its own,
// with the month range applied relative to that year. The rows shown are
// the segments of the occupancy-filtered data as a whole, so a segment that
// was quiet in one year still gets a zero row there. Rows are ordered once,
// by the selected year's values, and every year uses that order.

use crate::aggregate::aggregate_by_segment;
use crate::filters::{filter_occupancy, select, Selection};
use crate::period::{FinancialMonthRange, FinancialYear, PeriodRange};
use crate::query::QueryParams;
use crate::table::{apply_column_filters, sort_rows};
use crate::types::{AggregatedRow, NormalizedRecord};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Number of financial years in the comparison, selected year included.
pub const YEARS_COMPARED: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct YearTable {
    pub year: FinancialYear,
    pub period: PeriodRange,
    /// Every segment, zero-filled, in the shared order. Used for filter
    /// options and totals.
    pub all_rows: Vec<AggregatedRow>,
    /// `all_rows` after this year's column filters.
    pub rows: Vec<AggregatedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiYearTable {
    /// Shared row order, taken from the selected year.
    pub segments: Vec<String>,
    /// Selected year first, then the preceding years.
    pub years: Vec<YearTable>,
}

/// The selected year followed by the years before it, newest first.
pub fn compared_years(selected: FinancialYear) -> Vec<FinancialYear> {
    std::iter::successors(Some(selected), |y| Some(y.previous()))
        .take(YEARS_COMPARED)
        .collect()
}

/// Segments present under the occupancy selection, in first-seen order,
/// regardless of period.
pub fn segment_universe(records: &[NormalizedRecord], params: &QueryParams) -> Vec<String> {
    let mut seen = HashSet::new();
    filter_occupancy(records, &params.occupancy)
        .into_iter()
        .filter(|&r| seen.insert(r.segment.as_str()))
        .map(|r| r.segment.clone())
        .collect()
}

pub fn compose_multi_year(records: &[NormalizedRecord], params: &QueryParams) -> MultiYearTable {
    compose_multi_year_with(records, params, |selection| {
        aggregate_by_segment(&select(records, selection))
    })
}

/// As [`compose_multi_year`], with the per-year selection and aggregation
/// supplied by the caller (for memoization).
pub fn compose_multi_year_with<F>(
    records: &[NormalizedRecord],
    params: &QueryParams,
    mut aggregate: F,
) -> MultiYearTable
where
    F: FnMut(&Selection) -> Vec<AggregatedRow>,
{
    let universe = segment_universe(records, params);

    let years = compared_years(params.year);
    let zero_filled: Vec<(FinancialYear, Selection, Vec<AggregatedRow>)> = years
        .into_iter()
        .map(|year| {
            let selection = params.selection_for_year(year);
            let mut by_segment: HashMap<String, AggregatedRow> = aggregate(&selection)
                .into_iter()
                .map(|row| (row.segment.clone(), row))
                .collect();
            let rows: Vec<AggregatedRow> = universe
                .iter()
                .map(|segment| {
                    by_segment
                        .remove(segment)
                        .unwrap_or_else(|| AggregatedRow::empty(segment.as_str()))
                })
                .collect();
            (year, selection, rows)
        })
        .collect();

    // The selected year is first; its sorted order is everyone's order.
    let segments: Vec<String> = zero_filled
        .first()
        .map(|(_, _, rows)| {
            sort_rows(rows, params.sort)
                .into_iter()
                .map(|r| r.segment)
                .collect()
        })
        .unwrap_or_default();
    let position: HashMap<&str, usize> = segments
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let years = zero_filled
        .into_iter()
        .map(|(year, selection, mut rows)| {
            rows.sort_by_key(|r| position.get(r.segment.as_str()).copied().unwrap_or(usize::MAX));
            let filtered = apply_column_filters(&rows, &params.filters_for_year(year));
            debug!(
                "Year {}: {} segments, {} after column filters",
                year,
                rows.len(),
                filtered.len()
            );
            let months = params.months.unwrap_or_else(FinancialMonthRange::full_year);
            YearTable {
                year,
                period: selection.period.unwrap_or_else(|| months.in_year(year)),
                all_rows: rows,
                rows: filtered,
            }
        })
        .collect();

    MultiYearTable { segments, years }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ColumnFilters, OccupancySelection};
    use crate::period::Period;
    use crate::types::{Column, Metrics};

    fn record(
        segment: &str,
        occupancy: &str,
        month: u32,
        year: i32,
        premium: f64,
    ) -> NormalizedRecord {
        let metrics = Metrics {
            premium,
            earned_premium: premium,
            ..Metrics::default()
        };
        NormalizedRecord {
            segment: segment.to_string(),
            occupancy_code: occupancy.to_string(),
            occupancy_name: None,
            occupancy_key: occupancy.to_string(),
            claims_to_earned_ratio: metrics.claims_to_earned_ratio(),
            avg_rate: metrics.avg_rate(),
            metrics,
            period: Period::new(month, FinancialYear::new(year)),
        }
    }

    fn sample() -> Vec<NormalizedRecord> {
        vec![
            record("A", "100", 5, 2025, 10.0),
            record("B", "100", 6, 2025, 30.0),
            record("New", "101", 7, 2025, 20.0),
            record("A", "100", 5, 2024, 50.0),
            record("B", "100", 2, 2024, 5.0),
            record("A", "100", 1, 2023, 7.0),
            record("Old", "101", 8, 2021, 99.0),
        ]
    }

    fn premiums(table: &YearTable) -> Vec<(&str, f64)> {
        table
            .rows
            .iter()
            .map(|r| (r.segment.as_str(), r.metrics.premium))
            .collect()
    }

    #[test]
    fn test_compared_years() {
        let years = compared_years(FinancialYear::new(2025));
        let expected: Vec<FinancialYear> = [2025, 2024, 2023].map(FinancialYear::new).to_vec();
        assert_eq!(years, expected);
    }

    #[test]
    fn test_segment_only_in_selected_year_is_zero_filled() {
        let records = sample();
        let params = QueryParams::new(FinancialYear::new(2025));
        let table = compose_multi_year(&records, &params);
        assert_eq!(table.years.len(), YEARS_COMPARED);
        for year in &table.years {
            assert_eq!(year.rows.len(), 4, "year {}", year.year);
        }
        let prior = &table.years[1];
        let new_row = prior.rows.iter().find(|r| r.segment == "New").unwrap();
        assert_eq!(new_row.metrics, Metrics::default());
        assert_eq!(new_row.record_count, 0);
        let oldest = premiums(&table.years[2]);
        assert_eq!(oldest, vec![("A", 7.0), ("B", 0.0), ("New", 0.0), ("Old", 0.0)]);
    }

    #[test]
    fn test_order_comes_from_selected_year() {
        let records = sample();
        let params = QueryParams::new(FinancialYear::new(2025))
            .with_sort_click(Column::Premium)
            .with_sort_click(Column::Premium);
        let table = compose_multi_year(&records, &params);
        assert_eq!(table.segments, vec!["B", "New", "A", "Old"]);
        for year in &table.years {
            let order: Vec<&str> = year.rows.iter().map(|r| r.segment.as_str()).collect();
            assert_eq!(order, vec!["B", "New", "A", "Old"]);
        }
    }

    #[test]
    fn test_year_filters_are_independent() {
        let records = sample();
        let params = QueryParams::new(FinancialYear::new(2025)).with_year_filter(
            FinancialYear::new(2024),
            Column::Premium,
            Some("50".to_string()),
        );
        let table = compose_multi_year(&records, &params);
        assert_eq!(premiums(&table.years[1]), vec![("A", 50.0)]);
        assert_eq!(table.years[0].rows.len(), 4);
        assert_eq!(table.years[1].all_rows.len(), 4);
        assert_eq!(table.segments.len(), 4);
    }

    #[test]
    fn test_month_range_is_year_relative() {
        let records = sample();
        let params =
            QueryParams::new(FinancialYear::new(2025)).with_months(FinancialMonthRange::new(4, 5));
        let table = compose_multi_year(&records, &params);
        assert_eq!(table.years[0].rows[0].metrics.premium, 10.0);
        assert_eq!(table.years[1].rows[0].metrics.premium, 50.0);
        // B's February 2024-25 record is outside April-May.
        assert_eq!(table.years[1].rows[1].metrics.premium, 0.0);
        assert_eq!(table.years[2].period.label(), "April, 2023-24 to May, 2023-24");
    }

    #[test]
    fn test_universe_follows_occupancy_selection() {
        let records = sample();
        let params = QueryParams::new(FinancialYear::new(2025))
            .with_occupancy(OccupancySelection::from_keys(["101"]));
        assert_eq!(segment_universe(&records, &params), vec!["New", "Old"]);
        let table = compose_multi_year(&records, &params);
        assert!(table.years.iter().all(|y| y.rows.len() == 2));
        assert_eq!(params.filters_for_year(FinancialYear::new(2025)), ColumnFilters::new());
    }
}
