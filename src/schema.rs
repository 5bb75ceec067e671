// Field schema for raw snapshot records.
//
// Exports of the same report disagree on column headers ("Sum of Prem" vs
// "Prem", "Num claims registered" vs "Num claim registered", different
// casing and spacing). Headers are resolved to a `Field` once, when a
// record is normalized; nothing downstream looks at header text again.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Segment,
    OccupancyCode,
    OccupancyName,
    FinancialPeriod,
    Premium,
    PolicyCount,
    ClaimsIncurred,
    EarnedPremium,
    ClaimCount,
    SumInsuredDelta,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Segment,
        Field::OccupancyCode,
        Field::OccupancyName,
        Field::FinancialPeriod,
        Field::Premium,
        Field::PolicyCount,
        Field::ClaimsIncurred,
        Field::EarnedPremium,
        Field::ClaimCount,
        Field::SumInsuredDelta,
    ];

    /// Whether a record without this field is still usable. Only the segment
    /// is required; everything else falls back to zero / unclassified.
    pub fn is_required(self) -> bool {
        matches!(self, Field::Segment)
    }

    /// Known header spellings, in the form they appear in exports.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Segment => &["UW Sub Channel", "Segments", "Segment", "Sub Channel"],
            Field::OccupancyCode => {
                &["GC Occupancies", "GC Occupancy", "Occupancy Code", "Occupancy"]
            }
            Field::OccupancyName => {
                &["GC Occupancy Name", "Occupancy Name", "Occupancy Description"]
            }
            Field::FinancialPeriod => &["Financial Period", "Fin Period", "Period"],
            Field::Premium => &["Prem", "Premium", "GWP"],
            Field::PolicyCount => &["Net Pol", "Policy Count", "NOP"],
            Field::ClaimsIncurred => &["Claim incurred in period", "Claims Incurred", "GIC"],
            Field::EarnedPremium => &["Earned Prem", "Earned Premium", "GEP"],
            Field::ClaimCount => {
                &["Num claims registered", "Num claim registered", "Claim Count", "NOC"]
            }
            Field::SumInsuredDelta => &["Delta risk SI", "Sum Insured Delta", "Delta SI"],
        }
    }
}

/// Lower-cased header with whitespace and punctuation removed and a leading
/// pivot-table "Sum of" dropped, so `"Sum of Earned Prem"`, `"earned prem"`
/// and `"EarnedPrem"` all compare equal.
pub fn canonical_header(header: &str) -> String {
    let squashed: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    match squashed.strip_prefix("sumof") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => squashed,
    }
}

static ALIAS_TABLE: Lazy<HashMap<String, Field>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for field in Field::ALL {
        for alias in field.aliases() {
            table.insert(canonical_header(alias), field);
        }
    }
    table
});

/// Resolve an export header to the field it carries, if any.
pub fn resolve_header(header: &str) -> Option<Field> {
    ALIAS_TABLE.get(&canonical_header(header)).copied()
}
