use crate::domain::model::{FilterSpec, GenderFilter, PlatformFilter, Record};

/// Column names the sidebar filters read. Fixed by the source dataset.
pub const GENDER_COLUMN: &str = "Gender";
pub const AGE_COLUMN: &str = "Age";
pub const PLATFORM_COLUMN: &str = "Platform";

/// Apply the sidebar selections to the dataset.
///
/// A record is retained iff all three predicates hold: gender matches (or the
/// filter is `Any`), integer age lies within `[age_min, age_max]` inclusive,
/// and platform is selected (or the filter is `Any`). Relative order is
/// preserved and the input is never mutated. No match is not a fault: an
/// inverted age range, an empty platform set, or a gender value absent from
/// the dataset all legitimately produce an empty result.
pub fn filter_records(records: &[Record], spec: &FilterSpec) -> Vec<Record> {
    records
        .iter()
        .filter(|record| retains(record, spec))
        .cloned()
        .collect()
}

fn retains(record: &Record, spec: &FilterSpec) -> bool {
    match &spec.gender {
        GenderFilter::Any => {}
        GenderFilter::Exact(wanted) => {
            // A missing or non-string gender cell fails an exact match.
            match record.get(GENDER_COLUMN).and_then(|v| v.as_str()) {
                Some(gender) if gender == wanted => {}
                _ => return false,
            }
        }
    }

    match record.get(AGE_COLUMN).and_then(|v| v.as_i64()) {
        Some(age) if age >= spec.age_min && age <= spec.age_max => {}
        _ => return false,
    }

    match &spec.platforms {
        PlatformFilter::Any => true,
        PlatformFilter::Only(selected) => record
            .get(PLATFORM_COLUMN)
            .and_then(|v| v.as_str())
            .is_some_and(|platform| selected.contains(platform)),
    }
}
