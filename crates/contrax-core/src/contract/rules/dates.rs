//! Contract period extraction and date normalization.

use super::patterns::{DATE_RANGE, LONG_DATE, NON_DIGIT_RUN};
use super::{FieldExtraction, FieldExtractor};
use crate::models::log::ExtractionLog;

/// Start and end of the contract period, normalized where possible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Normalize a date token to `YYYY-MM-DD`.
///
/// Accepts the long form (`2024년 3월 5일`) and any digit groups split by
/// non-digits (`2024/3/5`, `2024.03.05`). Input that does not fit either
/// shape is returned unchanged.
pub fn normalize_date(raw: &str) -> String {
    if let Some(caps) = LONG_DATE.captures(raw) {
        return format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]);
    }

    let hyphenated = NON_DIGIT_RUN.replace_all(raw, "-");
    let parts: Vec<&str> = hyphenated.trim_matches('-').split('-').collect();
    match parts.as_slice() {
        [year, month, day] if year.len() == 4 => match (month.parse::<u32>(), day.parse::<u32>()) {
            (Ok(month), Ok(day)) => format!("{}-{:02}-{:02}", year, month, day),
            _ => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Extracts the contract period from `계약 기간은 … 부터 … 까지`.
#[derive(Debug, Clone, Default)]
pub struct DateRangeExtractor;

impl DateRangeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for DateRangeExtractor {
    type Output = DateRange;

    fn extract(&self, text: &str) -> FieldExtraction<DateRange> {
        let mut log = ExtractionLog::new();

        let Some(caps) = DATE_RANGE.captures(text) else {
            log.warn("Regex pattern [DATE_RANGE] did not match; contract period not found");
            return FieldExtraction::new(DateRange::default(), log);
        };

        let mut range = DateRange::default();
        for (label, slot, raw) in [
            ("Start", &mut range.start, caps[1].trim()),
            ("End", &mut range.end, caps[2].trim()),
        ] {
            let normalized = normalize_date(raw);
            log.info(format!(
                "Regex pattern [DATE_RANGE] matched. {} date: {} -> {}",
                label, raw, normalized
            ));
            *slot = Some(normalized);
        }

        FieldExtraction::new(range, log)
    }
}
