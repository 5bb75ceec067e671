// Everything that decides what a report shows, as one immutable value.
//
// Each `with_*` method returns a new `QueryParams`. Changing what is
// selected (year, months, occupancy, any filter, page size) sends the view
// back to page 1; changing the sort or the page does not.

use crate::filters::{ColumnFilters, OccupancySelection, Selection};
use crate::pager::PageSize;
use crate::period::{FinancialMonthRange, FinancialYear};
use crate::table::SortSpec;
use crate::types::Column;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub year: FinancialYear,
    /// `None` leaves the single-year view unbounded by period; the
    /// multi-year view then uses the whole financial year.
    pub months: Option<FinancialMonthRange>,
    pub occupancy: OccupancySelection,
    /// Applied to records before aggregation.
    pub record_filters: ColumnFilters,
    /// Applied to aggregated rows of the single-year view.
    pub column_filters: ColumnFilters,
    /// Applied to aggregated rows of one year of the multi-year view.
    pub year_filters: BTreeMap<FinancialYear, ColumnFilters>,
    pub sort: Option<SortSpec>,
    pub page_size: PageSize,
    pub page: usize,
}

impl QueryParams {
    pub fn new(year: FinancialYear) -> Self {
        QueryParams {
            year,
            months: Some(FinancialMonthRange::full_year()),
            occupancy: OccupancySelection::All,
            record_filters: ColumnFilters::new(),
            column_filters: ColumnFilters::new(),
            year_filters: BTreeMap::new(),
            sort: None,
            page_size: PageSize::default(),
            page: 1,
        }
    }

    fn reset_page(mut self) -> Self {
        self.page = 1;
        self
    }

    pub fn with_year(mut self, year: FinancialYear) -> Self {
        self.year = year;
        self.reset_page()
    }

    pub fn with_months(mut self, months: Option<FinancialMonthRange>) -> Self {
        self.months = months;
        self.reset_page()
    }

    pub fn with_occupancy(mut self, occupancy: OccupancySelection) -> Self {
        self.occupancy = occupancy;
        self.reset_page()
    }

    pub fn with_record_filter(mut self, column: Column, value: Option<String>) -> Self {
        self.record_filters.set(column, value);
        self.reset_page()
    }

    pub fn with_column_filter(mut self, column: Column, value: Option<String>) -> Self {
        self.column_filters.set(column, value);
        self.reset_page()
    }

    pub fn with_year_filter(
        mut self,
        year: FinancialYear,
        column: Column,
        value: Option<String>,
    ) -> Self {
        let filters = self.year_filters.entry(year).or_default();
        filters.set(column, value);
        if filters.is_empty() {
            self.year_filters.remove(&year);
        }
        self.reset_page()
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self.reset_page()
    }

    /// A click on a column header.
    pub fn with_sort_click(mut self, column: Column) -> Self {
        self.sort = Some(SortSpec::toggled(self.sort, column));
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Record-level inputs of the single-year view.
    pub fn selection(&self) -> Selection {
        Selection {
            occupancy: self.occupancy.clone(),
            period: self.months.map(|m| m.in_year(self.year)),
            columns: self.record_filters.clone(),
        }
    }

    /// Record-level inputs of one year of the multi-year view.
    pub fn selection_for_year(&self, year: FinancialYear) -> Selection {
        let months = self.months.unwrap_or_else(FinancialMonthRange::full_year);
        Selection {
            occupancy: self.occupancy.clone(),
            period: Some(months.in_year(year)),
            columns: self.record_filters.clone(),
        }
    }

    pub fn filters_for_year(&self, year: FinancialYear) -> ColumnFilters {
        self.year_filters.get(&year).cloned().unwrap_or_default()
    }
}
