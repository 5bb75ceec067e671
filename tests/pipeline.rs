use approx::assert_relative_eq;
use underwriting_report::loader::{load_json_str, load_path};
use underwriting_report::multiyear::compose_multi_year;
use underwriting_report::*;

const SAMPLE: &str = include_str!("../data/sample_records.json");

fn sample_dashboard() -> Dashboard {
    let raw = load_json_str(SAMPLE).expect("sample snapshot parses");
    Dashboard::new(&raw)
}

fn fy(start: i32) -> FinancialYear {
    FinancialYear::new(start)
}

fn segments(rows: &[AggregatedRow]) -> Vec<&str> {
    rows.iter().map(|r| r.segment.as_str()).collect()
}

#[test]
fn test_single_record_end_to_end() {
    let json = r#"[{
        "Segments": "A",
        "Prem": "1,000",
        "Net Pol": 1,
        "Earned Prem": "500",
        "Claim incurred in period": "(100)",
        "Num claim registered": 0,
        "Delta risk SI": "10000"
    }]"#;
    let dashboard = Dashboard::new(&load_json_str(json).unwrap());
    let view = dashboard.single_year(&QueryParams::new(fy(2025)).with_months(None));

    assert_eq!(view.rows.len(), 1);
    let row = &view.rows[0];
    assert_eq!(row.segment, "A");
    assert_eq!(row.metrics.premium, 1000.0);
    assert_eq!(row.metrics.policy_count, 1.0);
    assert_eq!(row.metrics.earned_premium, 500.0);
    assert_eq!(row.metrics.claims_incurred, -100.0);
    assert_eq!(row.metrics.claim_count, 0.0);
    assert_relative_eq!(row.claims_to_earned_ratio, -0.2);
    assert_relative_eq!(row.avg_rate, 100.0);

    let shown = &view.page.items[0];
    assert_eq!(shown.serial, 1);
    assert_eq!(shown.gwp, "1,000");
    assert_eq!(shown.nop, "1");
    assert_eq!(shown.gep, "500");
    assert_eq!(shown.gic, "-100");
    assert_eq!(shown.gic_over_gep, "-20.00%");
    assert_eq!(shown.noc, "0");
    assert_eq!(shown.delta_si, "10,000");
    assert_eq!(shown.avg_rate, "100");
}

#[test]
fn test_unclassified_record_is_excluded_from_period_views() {
    let dashboard = sample_dashboard();
    assert_eq!(dashboard.load_report().total_rows, 13);
    assert_eq!(dashboard.load_report().unclassified_periods, 1);

    let bounded = dashboard.single_year(&QueryParams::new(fy(2025)));
    assert!(!segments(&bounded.rows).contains(&"Broker"));

    let unbounded = dashboard.single_year(&QueryParams::new(fy(2025)).with_months(None));
    assert!(segments(&unbounded.rows).contains(&"Broker"));
    assert_eq!(unbounded.total.record_count, 13);
}

#[test]
fn test_financial_year_view() {
    let dashboard = sample_dashboard();
    let view = dashboard.single_year(&QueryParams::new(fy(2025)));
    assert_eq!(segments(&view.rows), vec!["(None)", "Banca PSU", "Agency"]);
    assert_eq!(view.period_label, "April, 2025-26 to March, 2025-26");

    let none = &view.page.items[0];
    assert_eq!(none.gep, "179,356");
    assert_eq!(none.avg_rate, "-");

    let banca = &view.rows[1];
    assert_eq!(banca.record_count, 3);
    assert_eq!(banca.metrics.premium, 70744.0);
    assert_relative_eq!(banca.claims_to_earned_ratio, 1669380.0 / 352798.0);

    let agency = &view.page.items[2];
    assert_eq!(agency.gic_over_gep, "60.00%");
    assert_eq!(agency.avg_rate, "0.5");

    assert_eq!(view.total.metrics.premium, 88994.0);
    assert_relative_eq!(view.total.claims_to_earned_ratio, 1591954.0 / 548054.0);
}

#[test]
fn test_month_range_wraps_within_financial_year() {
    let dashboard = sample_dashboard();
    let params = QueryParams::new(fy(2025)).with_months(FinancialMonthRange::new(10, 3));
    let view = dashboard.single_year(&params);
    assert_eq!(segments(&view.rows), vec!["Banca PSU", "Agency"]);
    assert_eq!(view.rows[0].metrics.claims_incurred, 1661380.0);
    assert_eq!(view.period_label, "October, 2025-26 to March, 2025-26");
}

#[test]
fn test_occupancy_selection() {
    let dashboard = sample_dashboard();
    let options = dashboard.occupancy_options();
    assert_eq!(options[0], "(None)");
    assert!(options.contains(&"101 - Dwellings".to_string()));
    assert_eq!(options.len(), 6);

    let params = QueryParams::new(fy(2025))
        .with_occupancy(OccupancySelection::from_keys(["101 - Dwellings"]));
    let view = dashboard.single_year(&params);
    assert_eq!(segments(&view.rows), vec!["(None)", "Agency"]);
    assert_eq!(view.rows[1].metrics.premium, 18250.0);
}

#[test]
fn test_sort_toggle_and_clear_filter() {
    let dashboard = sample_dashboard();
    let asc = QueryParams::new(fy(2025)).with_sort_click(Column::Premium);
    assert_eq!(segments(&dashboard.single_year(&asc).rows), vec!["(None)", "Agency", "Banca PSU"]);

    let desc = asc.with_sort_click(Column::Premium);
    let view = dashboard.single_year(&desc);
    assert_eq!(segments(&view.rows), vec!["Banca PSU", "Agency", "(None)"]);

    let filtered = desc.clone().with_column_filter(Column::AvgRate, Some("-".to_string()));
    assert_eq!(segments(&dashboard.single_year(&filtered).rows), vec!["(None)"]);

    let cleared = filtered.with_column_filter(Column::AvgRate, None);
    assert_eq!(dashboard.single_year(&cleared), view);
}

#[test]
fn test_multi_year_alignment() {
    let dashboard = sample_dashboard();
    let params = QueryParams::new(fy(2025))
        .with_sort_click(Column::Premium)
        .with_sort_click(Column::Premium);
    let view = dashboard.multi_year(&params);

    assert_eq!(view.segments, vec!["Banca PSU", "Agency", "(None)", "Broker"]);
    for year in &view.years {
        assert_eq!(segments(&year.rows), vec!["Banca PSU", "Agency", "(None)", "Broker"]);
    }

    let prior = &view.years[1];
    assert_eq!(prior.year, fy(2024));
    assert_eq!(prior.page.items[1].gic_over_gep, "19.43%");
    assert_eq!(prior.rows[2].record_count, 0);
    assert_eq!(prior.page.items[2].gwp, "0");

    let oldest = &view.years[2];
    assert_eq!(oldest.rows[3].metrics.premium, 44000.0);
    assert_eq!(oldest.rows[0].record_count, 0);
}

#[test]
fn test_segment_only_in_selected_year_gets_prior_zero_rows() {
    let json = r#"[
        {"Segments": "Only2025", "Financial Period": "06, 2025-26", "Prem": "10"},
        {"Segments": "Steady", "Financial Period": "06, 2024-25", "Prem": "20"},
        {"Segments": "Steady", "Financial Period": "06, 2023-24", "Prem": "30"}
    ]"#;
    let raw = load_json_str(json).unwrap();
    let (records, _) = loader::normalize_records(&raw);
    let table = compose_multi_year(&records, &QueryParams::new(fy(2025)));
    for year in &table.years {
        let row = year.rows.iter().find(|r| r.segment == "Only2025").unwrap();
        if year.year == fy(2025) {
            assert_eq!(row.metrics.premium, 10.0);
        } else {
            assert_eq!(row.metrics, Metrics::default());
        }
    }
}

#[test]
fn test_multi_year_filter_leaves_other_years_alone() {
    let dashboard = sample_dashboard();
    let params = QueryParams::new(fy(2025)).with_year_filter(
        fy(2024),
        Column::Segment,
        Some("Agency".into()),
    );
    let view = dashboard.multi_year(&params);
    assert_eq!(segments(&view.years[1].rows), vec!["Agency"]);
    assert_eq!(view.years[0].rows.len(), 4);
    assert_eq!(view.years[2].rows.len(), 4);
    assert!(view.years[1].filter_options[&Column::Segment].contains(&"Broker".to_string()));
}

#[test]
fn test_load_csv_snapshot_from_disk() {
    let dir = std::env::temp_dir().join(format!("uw_report_in_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("snapshot.csv");
    std::fs::write(
        &path,
        "Segments,Occupancy Code,Financial Period,Prem,Earned Prem,Claim incurred in period\n\
         Agency,101,\"04, 2025-26\",\"1,500\",\"1,000\",(250)\n\
         Agency,101,\"05, 2025-26\",500,0,0\n",
    )
    .unwrap();

    let raw = load_path(&path).unwrap();
    let dashboard = Dashboard::new(&raw);
    let view = dashboard.single_year(&QueryParams::new(fy(2025)));
    assert_eq!(view.page.items[0].gwp, "2,000");
    assert_eq!(view.page.items[0].gic_over_gep, "-25.00%");
    std::fs::remove_dir_all(&dir).ok();
}
