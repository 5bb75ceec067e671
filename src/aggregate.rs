use crate::types::{AggregatedRow, Metrics, NormalizedRecord};
use std::collections::HashMap;

pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

/// Sum records per segment, in order of first appearance. Ratios are
/// computed from the group sums, never averaged from per-record ratios.
/// Segments with no records produce no row.
pub fn aggregate_by_segment(records: &[&NormalizedRecord]) -> Vec<AggregatedRow> {
    #[derive(Default)]
    struct Acc {
        metrics: Metrics,
        count: usize,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in records {
        let e = map.entry(r.segment.as_str()).or_insert_with(|| {
            order.push(r.segment.as_str());
            Acc::default()
        });
        e.metrics.add(&r.metrics);
        e.count += 1;
    }

    order
        .into_iter()
        .filter_map(|segment| {
            map.remove(segment)
                .map(|acc| AggregatedRow::new(segment, acc.metrics, acc.count))
        })
        .collect()
}

/// One row summing every row given, ratios recomputed from the totals.
pub fn grand_total(rows: &[AggregatedRow]) -> AggregatedRow {
    let metrics: Metrics = rows.iter().map(|r| &r.metrics).sum();
    let count = rows.iter().map(|r| r.record_count).sum();
    AggregatedRow::new(GRAND_TOTAL_LABEL, metrics, count)
}
