// Command-line configuration.

use crate::error::{ReportError, Result};
use crate::filters::OccupancySelection;
use crate::pager::PageSize;
use crate::period::{FinancialMonthRange, FinancialYear};
use crate::query::QueryParams;
use crate::types::Column;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "data/sample_records.json";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "underwriting_report",
    version,
    about = "Segment reports over underwriting records"
)]
pub struct Cli {
    /// Snapshot to report on (.json array of records or .csv with headers)
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Financial year, e.g. 2025-26 (defaults to the current one)
    #[arg(long)]
    pub year: Option<FinancialYear>,

    /// First month of the range (1-12, walked April to March)
    #[arg(long, requires = "to_month", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub from_month: Option<u32>,

    /// Last month of the range (1-12)
    #[arg(long, requires = "from_month", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub to_month: Option<u32>,

    /// Don't bound the single-year table by period
    #[arg(long, conflicts_with_all = ["from_month", "to_month"])]
    pub all_periods: bool,

    /// Occupancy key to include; repeat for several (default: all)
    #[arg(long = "occupancy")]
    pub occupancies: Vec<String>,

    /// Column filter on the aggregated table, COLUMN=VALUE
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(Column, String)>,

    /// Column to sort by; repeating a column flips it to descending
    #[arg(long = "sort")]
    pub sort: Vec<Column>,

    #[arg(long, default_value = "50")]
    pub page_size: PageSize,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Compare the year with the two before it
    #[arg(long)]
    pub multi_year: bool,

    /// Directory for CSV exports and summary.json
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Rows to print per table
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}

fn parse_filter(s: &str) -> std::result::Result<(Column, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got {:?}", s))?;
    Ok((column.parse()?, value.trim().to_string()))
}

impl Cli {
    pub fn financial_year(&self) -> FinancialYear {
        self.year
            .unwrap_or_else(|| FinancialYear::containing(Local::now().date_naive()))
    }

    pub fn months(&self) -> Result<Option<FinancialMonthRange>> {
        if self.all_periods {
            return Ok(None);
        }
        match (self.from_month, self.to_month) {
            (Some(from), Some(to)) => FinancialMonthRange::new(from, to)
                .map(Some)
                .ok_or_else(|| {
                    ReportError::InvalidArgument(format!("invalid month range {}..{}", from, to))
                }),
            (None, None) => Ok(Some(FinancialMonthRange::full_year())),
            _ => Err(ReportError::InvalidArgument(
                "--from-month and --to-month must be given together".to_string(),
            )),
        }
    }

    /// Replay the options as dashboard interactions. Filters land on the
    /// selected year's table in multi-year mode.
    pub fn query(&self) -> Result<QueryParams> {
        let year = self.financial_year();
        let mut q = QueryParams::new(year)
            .with_months(self.months()?)
            .with_occupancy(OccupancySelection::from_keys(self.occupancies.iter().cloned()))
            .with_page_size(self.page_size);
        for (column, value) in &self.filters {
            q = if self.multi_year {
                q.with_year_filter(year, *column, Some(value.clone()))
            } else {
                q.with_column_filter(*column, Some(value.clone()))
            };
        }
        for column in &self.sort {
            q = q.with_sort_click(*column);
        }
        Ok(q.with_page(self.page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SortSpec;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["underwriting_report"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--year", "2025-26"]);
        let q = cli.query().unwrap();
        assert_eq!(q.year, FinancialYear::new(2025));
        assert_eq!(q.months, Some(FinancialMonthRange::full_year()));
        assert_eq!(q.occupancy, OccupancySelection::All);
        assert_eq!(q.page_size, PageSize::Fifty);
        assert_eq!(q.page, 1);
        assert_eq!(cli.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn test_full_query() {
        let cli = parse(&[
            "--year", "2024-25", "--from-month", "10", "--to-month", "3",
            "--occupancy", "100", "--occupancy", "101",
            "--filter", "GWP=1,000", "--sort", "gwp", "--sort", "gwp",
            "--page-size", "100", "--page", "2",
        ]);
        let q = cli.query().unwrap();
        assert_eq!(q.months, FinancialMonthRange::new(10, 3));
        assert_eq!(q.occupancy, OccupancySelection::from_keys(["100", "101"]));
        assert_eq!(q.column_filters.get(Column::Premium), Some("1,000"));
        assert_eq!(q.sort, Some(SortSpec::descending(Column::Premium)));
        assert_eq!(q.page_size, PageSize::Hundred);
        assert_eq!(q.page, 2);
    }

    #[test]
    fn test_multi_year_filters_target_selected_year() {
        let cli = parse(&["--year", "2025-26", "--multi-year", "--filter", "segment=A"]);
        let q = cli.query().unwrap();
        assert!(q.column_filters.is_empty());
        assert_eq!(q.filters_for_year(FinancialYear::new(2025)).get(Column::Segment), Some("A"));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let bad = |args: &[&str]| {
            let mut argv = vec!["underwriting_report"];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).is_err()
        };
        assert!(bad(&["--from-month", "4"]));
        assert!(bad(&["--from-month", "13", "--to-month", "3"]));
        assert!(bad(&["--page-size", "75"]));
        assert!(bad(&["--year", "2025-27"]));
        assert!(bad(&["--filter", "nonsense"]));
        assert!(bad(&["--all-periods", "--from-month", "4", "--to-month", "5"]));
    }

    #[test]
    fn test_all_periods() {
        let cli = parse(&["--all-periods"]);
        assert_eq!(cli.months().unwrap(), None);
    }
}
