use crate::aggregate::{aggregate_by_segment, grand_total};
use crate::filters::{available_years, occupancy_options, select, Selection};
use crate::loader::{normalize_records, LoadReport};
use crate::multiyear::compose_multi_year_with;
use crate::pager::{paginate, Page};
use crate::period::FinancialYear;
use crate::query::QueryParams;
use crate::table::{apply_column_filters, filter_options, sort_rows};
use crate::types::{AggregatedRow, Column, DisplayRow, NormalizedRecord, RawRecord};
use log::debug;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Aggregations kept before the memo is dropped and rebuilt.
const MEMO_CAPACITY: usize = 64;

/// One rendered table: the page to show plus what the pickers and footer
/// need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub year: FinancialYear,
    pub period_label: String,
    /// Distinct displayed values per column, taken before column filters.
    pub filter_options: BTreeMap<Column, Vec<String>>,
    /// Sorted and filtered rows, all pages.
    pub rows: Vec<AggregatedRow>,
    pub page: Page<DisplayRow>,
    pub total: AggregatedRow,
}

/// Totals per table, as written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_records: usize,
    pub unclassified_periods: usize,
    pub years: Vec<YearSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: FinancialYear,
    pub period: String,
    pub segments_shown: usize,
    pub total: DisplayRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiYearView {
    pub segments: Vec<String>,
    pub years: Vec<ReportView>,
}

/// The report pipeline over one loaded snapshot.
///
/// Records are normalized once, when the dashboard is built. Selection and
/// aggregation results are memoized by their exact [`Selection`]; sorting,
/// column filters and paging are cheap and always recomputed.
pub struct Dashboard {
    records: Vec<NormalizedRecord>,
    load_report: LoadReport,
    memo: RefCell<HashMap<Selection, Vec<AggregatedRow>>>,
}

impl Dashboard {
    pub fn new(raw: &[RawRecord]) -> Self {
        let (records, load_report) = normalize_records(raw);
        Dashboard {
            records,
            load_report,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn occupancy_options(&self) -> Vec<String> {
        occupancy_options(&self.records)
    }

    pub fn available_years(&self) -> Vec<FinancialYear> {
        available_years(&self.records)
    }

    fn aggregate(&self, selection: &Selection) -> Vec<AggregatedRow> {
        if let Some(rows) = self.memo.borrow().get(selection) {
            return rows.clone();
        }
        let selected = select(&self.records, selection);
        let rows = aggregate_by_segment(&selected);
        debug!("Selected {} records into {} segments", selected.len(), rows.len());
        let mut memo = self.memo.borrow_mut();
        if memo.len() >= MEMO_CAPACITY {
            memo.clear();
        }
        memo.insert(selection.clone(), rows.clone());
        rows
    }

    /// The segment table for the selected financial year.
    pub fn single_year(&self, params: &QueryParams) -> ReportView {
        let aggregated = self.aggregate(&params.selection());
        let options = filter_options(&aggregated);
        let sorted = sort_rows(&aggregated, params.sort);
        let rows = apply_column_filters(&sorted, &params.column_filters);
        let period_label = match params.months {
            Some(months) => months.in_year(params.year).label(),
            None => "All periods".to_string(),
        };
        build_view(params, params.year, period_label, options, rows)
    }

    /// The selected year and the two before it, in a shared row order.
    pub fn multi_year(&self, params: &QueryParams) -> MultiYearView {
        let table =
            compose_multi_year_with(&self.records, params, |selection| self.aggregate(selection));
        let years = table
            .years
            .into_iter()
            .map(|year| {
                let options = filter_options(&year.all_rows);
                build_view(params, year.year, year.period.label(), options, year.rows)
            })
            .collect();
        MultiYearView {
            segments: table.segments,
            years,
        }
    }
}

pub fn summarize(load_report: &LoadReport, views: &[ReportView]) -> ReportSummary {
    ReportSummary {
        total_records: load_report.total_rows,
        unclassified_periods: load_report.unclassified_periods,
        years: views
            .iter()
            .map(|v| YearSummary {
                year: v.year,
                period: v.period_label.clone(),
                segments_shown: v.rows.len(),
                total: DisplayRow::from_row(0, &v.total),
            })
            .collect(),
    }
}

fn build_view(
    params: &QueryParams,
    year: FinancialYear,
    period_label: String,
    filter_options: BTreeMap<Column, Vec<String>>,
    rows: Vec<AggregatedRow>,
) -> ReportView {
    let display: Vec<DisplayRow> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| DisplayRow::from_row(i + 1, row))
        .collect();
    let page = paginate(&display, params.page_size, params.page);
    debug!(
        "{}: {} rows, page {} of {}",
        year, page.total_items, page.page, page.total_pages
    );
    ReportView {
        year,
        period_label,
        filter_options,
        total: grand_total(&rows),
        rows,
        page,
    }
}
