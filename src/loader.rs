use crate::error::{ReportError, Result};
use crate::period::parse_period;
use crate::schema::Field;
use crate::types::{Metrics, NormalizedRecord, RawRecord, RawValue};
use crate::util::{parse_number, NONE_LABEL};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Rows missing a required field (see [`Field::is_required`]); they are
    /// kept under the `(None)` fallback.
    pub missing_required: usize,
    /// Rows whose financial period could not be parsed; excluded from every
    /// period-bounded view.
    pub unclassified_periods: usize,
}

/// Load a snapshot, picking the format from the file extension.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let records = match ext.as_deref() {
        Some("json") => load_json(std::fs::File::open(path)?),
        Some("csv") => load_csv(std::fs::File::open(path)?),
        _ => Err(ReportError::UnsupportedInput {
            path: path.display().to_string(),
            reason: "expected a .json or .csv file".to_string(),
        }),
    }?;
    info!("Loaded {} raw records from {}", records.len(), path.display());
    Ok(records)
}

/// A JSON array of flat objects.
pub fn load_json<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_reader(reader)?;
    Ok(rows.into_iter().map(record_from_json).collect())
}

pub fn load_json_str(s: &str) -> Result<Vec<RawRecord>> {
    load_json(s.as_bytes())
}

fn record_from_json(row: serde_json::Map<String, serde_json::Value>) -> RawRecord {
    row.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect()
}

/// A CSV export with a header row. Every cell arrives as text.
pub fn load_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), RawValue::Text(v.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn label_or_none(value: Option<&&RawValue>) -> Option<String> {
    value.and_then(|v| v.as_label())
}

/// Turn one raw record into its typed form. Never fails: unusable numbers
/// become zero, a missing segment becomes `(None)` and an unreadable period
/// leaves the record unclassified.
pub fn normalize_record(raw: &RawRecord) -> NormalizedRecord {
    let fields = raw.resolve();
    let number = |field: Field| fields.get(&field).map(|v| parse_number(v)).unwrap_or(0.0);

    let segment =
        label_or_none(fields.get(&Field::Segment)).unwrap_or_else(|| NONE_LABEL.to_string());
    let occupancy_code =
        label_or_none(fields.get(&Field::OccupancyCode)).unwrap_or_else(|| NONE_LABEL.to_string());
    let occupancy_name = label_or_none(fields.get(&Field::OccupancyName));
    let occupancy_key = match &occupancy_name {
        Some(name) => format!("{} - {}", occupancy_code, name),
        None => occupancy_code.clone(),
    };

    let metrics = Metrics {
        policy_count: number(Field::PolicyCount),
        premium: number(Field::Premium),
        claims_incurred: number(Field::ClaimsIncurred),
        earned_premium: number(Field::EarnedPremium),
        claim_count: number(Field::ClaimCount),
        sum_insured_delta: number(Field::SumInsuredDelta),
    };
    let period = fields
        .get(&Field::FinancialPeriod)
        .and_then(|v| v.as_label())
        .and_then(|s| parse_period(&s));

    NormalizedRecord {
        segment,
        occupancy_code,
        occupancy_name,
        occupancy_key,
        claims_to_earned_ratio: metrics.claims_to_earned_ratio(),
        avg_rate: metrics.avg_rate(),
        metrics,
        period,
    }
}

/// Normalize a whole snapshot, in input order.
pub fn normalize_records(raw: &[RawRecord]) -> (Vec<NormalizedRecord>, LoadReport) {
    let mut report = LoadReport {
        total_rows: raw.len(),
        ..LoadReport::default()
    };
    let mut out = Vec::with_capacity(raw.len());
    for record in raw {
        let fields = record.resolve();
        if Field::ALL
            .iter()
            .any(|f| f.is_required() && label_or_none(fields.get(f)).is_none())
        {
            report.missing_required += 1;
        }
        let normalized = normalize_record(record);
        if normalized.period.is_none() {
            report.unclassified_periods += 1;
        }
        out.push(normalized);
    }
    if report.unclassified_periods > 0 {
        warn!(
            "{} of {} records have no readable financial period",
            report.unclassified_periods, report.total_rows
        );
    }
    debug!("Normalized {} records ({} missing a segment)", out.len(), report.missing_required);
    (out, report)
}
