use crate::period::{FinancialYear, Period};
use crate::schema::{resolve_header, Field};
use crate::util::{format_display, format_percent, safe_ratio, DASH};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// A single cell of the input snapshot, as supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Categorical reading of the value: trimmed text, or a number printed
    /// without a trailing `.0`. Empty text and nulls are `None`.
    pub fn as_label(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            RawValue::Number(n) => Some(n.to_string()),
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => {
                n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null)
            }
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Bool(b) => RawValue::Text(b.to_string()),
            // Nested structures carry nothing the report can use.
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => RawValue::Null,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// A flat record from the input snapshot: header text to value, in source
/// column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        RawRecord::default()
    }

    pub fn with(mut self, header: &str, value: impl Into<RawValue>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: &str, value: impl Into<RawValue>) {
        self.fields.push((header.to_string(), value.into()));
    }

    /// Map recognised headers to their fields. When two headers resolve to
    /// the same field the first one in column order wins.
    pub fn resolve(&self) -> HashMap<Field, &RawValue> {
        let mut out = HashMap::new();
        for (header, value) in &self.fields {
            if let Some(field) = resolve_header(header) {
                out.entry(field).or_insert(value);
            }
        }
        out
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        RawRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

/// The six additive measures carried by every record and every group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub policy_count: f64,
    pub premium: f64,
    pub claims_incurred: f64,
    pub earned_premium: f64,
    pub claim_count: f64,
    pub sum_insured_delta: f64,
}

impl Metrics {
    pub fn add(&mut self, other: &Metrics) {
        self.policy_count += other.policy_count;
        self.premium += other.premium;
        self.claims_incurred += other.claims_incurred;
        self.earned_premium += other.earned_premium;
        self.claim_count += other.claim_count;
        self.sum_insured_delta += other.sum_insured_delta;
    }

    /// GIC / GEP, `0` when nothing was earned.
    pub fn claims_to_earned_ratio(&self) -> f64 {
        safe_ratio(self.claims_incurred, self.earned_premium)
    }

    /// Premium per thousand of sum-insured delta, `0` when the delta is zero.
    pub fn avg_rate(&self) -> f64 {
        safe_ratio(self.premium, self.sum_insured_delta) * 1000.0
    }
}

impl<'a> std::iter::Sum<&'a Metrics> for Metrics {
    fn sum<I: Iterator<Item = &'a Metrics>>(iter: I) -> Self {
        let mut total = Metrics::default();
        for m in iter {
            total.add(m);
        }
        total
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub segment: String,
    pub occupancy_code: String,
    pub occupancy_name: Option<String>,
    /// Code and name combined, the value occupancy filters match against.
    pub occupancy_key: String,
    pub metrics: Metrics,
    pub claims_to_earned_ratio: f64,
    pub avg_rate: f64,
    pub period: Option<Period>,
}

impl NormalizedRecord {
    pub fn financial_month(&self) -> Option<u32> {
        self.period.map(|p| p.month)
    }

    pub fn financial_year(&self) -> Option<FinancialYear> {
        self.period.map(|p| p.year)
    }

    pub fn period_index(&self) -> Option<i64> {
        self.period.map(Period::index)
    }
}

/// One group of the report: a segment's summed metrics with the ratios
/// recomputed from the sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub segment: String,
    pub metrics: Metrics,
    pub record_count: usize,
    pub claims_to_earned_ratio: f64,
    pub avg_rate: f64,
}

impl AggregatedRow {
    pub fn new(segment: impl Into<String>, metrics: Metrics, record_count: usize) -> Self {
        AggregatedRow {
            segment: segment.into(),
            claims_to_earned_ratio: metrics.claims_to_earned_ratio(),
            avg_rate: metrics.avg_rate(),
            metrics,
            record_count,
        }
    }

    /// Placeholder for a segment with no data in the selected window.
    pub fn empty(segment: impl Into<String>) -> Self {
        AggregatedRow::new(segment, Metrics::default(), 0)
    }
}

/// Anything a report column can be read from.
pub trait ColumnSource {
    fn segment(&self) -> &str;
    fn metrics(&self) -> &Metrics;
}

impl ColumnSource for NormalizedRecord {
    fn segment(&self) -> &str {
        &self.segment
    }

    fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl ColumnSource for AggregatedRow {
    fn segment(&self) -> &str {
        &self.segment
    }

    fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Displayed report columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Column {
    Segment,
    PolicyCount,
    Premium,
    ClaimsIncurred,
    EarnedPremium,
    ClaimsToEarned,
    ClaimCount,
    SumInsuredDelta,
    AvgRate,
}

/// A column's value in sortable form.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortValue<'_> {
    /// Total order over numbers: `-0.0` ties with `0.0` and NaN sorts after
    /// every other value.
    pub fn compare(&self, other: &SortValue<'_>) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                zero_signless(*a).total_cmp(&zero_signless(*b))
            }
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

fn zero_signless(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else {
        n
    }
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Segment,
        Column::PolicyCount,
        Column::Premium,
        Column::ClaimsIncurred,
        Column::EarnedPremium,
        Column::ClaimsToEarned,
        Column::ClaimCount,
        Column::SumInsuredDelta,
        Column::AvgRate,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Segment => "Segment",
            Column::PolicyCount => "NOP",
            Column::Premium => "GWP",
            Column::ClaimsIncurred => "GIC",
            Column::EarnedPremium => "GEP",
            Column::ClaimsToEarned => "GIC/GEP",
            Column::ClaimCount => "NOC",
            Column::SumInsuredDelta => "Delta SI",
            Column::AvgRate => "Avg Rate",
        }
    }

    /// Short command-line name.
    pub fn key(self) -> &'static str {
        match self {
            Column::Segment => "segment",
            Column::PolicyCount => "nop",
            Column::Premium => "gwp",
            Column::ClaimsIncurred => "gic",
            Column::EarnedPremium => "gep",
            Column::ClaimsToEarned => "gic_gep",
            Column::ClaimCount => "noc",
            Column::SumInsuredDelta => "delta_si",
            Column::AvgRate => "avg_rate",
        }
    }

    pub fn sort_value<'a, R: ColumnSource>(self, row: &'a R) -> SortValue<'a> {
        let m = row.metrics();
        match self {
            Column::Segment => SortValue::Text(row.segment()),
            Column::PolicyCount => SortValue::Number(m.policy_count),
            Column::Premium => SortValue::Number(m.premium),
            Column::ClaimsIncurred => SortValue::Number(m.claims_incurred),
            Column::EarnedPremium => SortValue::Number(m.earned_premium),
            Column::ClaimsToEarned => SortValue::Number(m.claims_to_earned_ratio()),
            Column::ClaimCount => SortValue::Number(m.claim_count),
            Column::SumInsuredDelta => SortValue::Number(m.sum_insured_delta),
            Column::AvgRate => SortValue::Number(m.avg_rate()),
        }
    }

    /// The text a reader sees in this column. Ratios with a zero
    /// denominator show a dash instead of their sentinel zero.
    pub fn display<R: ColumnSource>(self, row: &R) -> String {
        let m = row.metrics();
        match self {
            Column::Segment => row.segment().to_string(),
            Column::PolicyCount => format_display(m.policy_count),
            Column::Premium => format_display(m.premium),
            Column::ClaimsIncurred => format_display(m.claims_incurred),
            Column::EarnedPremium => format_display(m.earned_premium),
            Column::ClaimsToEarned if m.earned_premium == 0.0 => DASH.to_string(),
            Column::ClaimsToEarned => format_percent(m.claims_to_earned_ratio()),
            Column::ClaimCount => format_display(m.claim_count),
            Column::SumInsuredDelta => format_display(m.sum_insured_delta),
            Column::AvgRate if m.sum_insured_delta == 0.0 => DASH.to_string(),
            Column::AvgRate => format_display(m.avg_rate()),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = String;

    /// Accepts the short key (`gic_gep`) or the header (`GIC/GEP`), in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squash = |t: &str| -> String {
            t.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect()
        };
        let wanted = squash(s);
        Column::ALL
            .into_iter()
            .find(|c| squash(c.key()) == wanted || squash(c.header()) == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Column::ALL.iter().map(|c| c.key()).collect();
                format!("unknown column {:?} (expected one of {})", s, known.join(", "))
            })
    }
}

/// A row as handed to the rendering layer: every cell pre-formatted.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DisplayRow {
    #[serde(rename = "Sl. No")]
    #[tabled(rename = "Sl. No")]
    pub serial: usize,
    #[serde(rename = "Segment")]
    #[tabled(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "NOP")]
    #[tabled(rename = "NOP")]
    pub nop: String,
    #[serde(rename = "GWP")]
    #[tabled(rename = "GWP")]
    pub gwp: String,
    #[serde(rename = "GIC")]
    #[tabled(rename = "GIC")]
    pub gic: String,
    #[serde(rename = "GEP")]
    #[tabled(rename = "GEP")]
    pub gep: String,
    #[serde(rename = "GIC/GEP")]
    #[tabled(rename = "GIC/GEP")]
    pub gic_over_gep: String,
    #[serde(rename = "NOC")]
    #[tabled(rename = "NOC")]
    pub noc: String,
    #[serde(rename = "Delta SI")]
    #[tabled(rename = "Delta SI")]
    pub delta_si: String,
    #[serde(rename = "Avg Rate")]
    #[tabled(rename = "Avg Rate")]
    pub avg_rate: String,
}

impl DisplayRow {
    pub fn from_row(serial: usize, row: &AggregatedRow) -> Self {
        DisplayRow {
            serial,
            segment: Column::Segment.display(row),
            nop: Column::PolicyCount.display(row),
            gwp: Column::Premium.display(row),
            gic: Column::ClaimsIncurred.display(row),
            gep: Column::EarnedPremium.display(row),
            gic_over_gep: Column::ClaimsToEarned.display(row),
            noc: Column::ClaimCount.display(row),
            delta_si: Column::SumInsuredDelta.display(row),
            avg_rate: Column::AvgRate.display(row),
        }
    }
}
