//! Rule-based contract parser combining the field extractors.

use std::time::Instant;

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::log::ExtractionLog;
use crate::models::result::ContractFields;

use super::rules::{
    AmountExtractor, DateRangeExtractor, FieldExtraction, FieldExtractor, PartyExtractor,
};

/// Runs the party, period and amount extractors over normalized text.
///
/// The extractors read the same text and fill disjoint fields. They run in a
/// fixed order (parties, period, amount) so the combined log is the same on
/// every run.
#[derive(Debug, Clone)]
pub struct ContractParser {
    parties: PartyExtractor,
    dates: DateRangeExtractor,
    amounts: AmountExtractor,
}

impl ContractParser {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            parties: PartyExtractor::new(),
            dates: DateRangeExtractor::new(),
            amounts: AmountExtractor::new(config),
        }
    }

    /// Extract all five fields from whitespace-normalized text.
    pub fn parse(&self, normalized: &str) -> FieldExtraction<ContractFields> {
        let start = Instant::now();
        let mut log = ExtractionLog::new();

        let parties = self.parties.extract(normalized);
        log.append(parties.log);

        let period = self.dates.extract(normalized);
        log.append(period.log);

        let amount = self.amounts.extract(normalized);
        log.append(amount.log);

        let fields = ContractFields {
            contractor_a: parties.value.first,
            contractor_b: parties.value.second,
            start_date: period.value.start,
            end_date: period.value.end,
            amount: amount.value,
        };

        debug!(
            "Parsed {} of 5 contract fields in {}us",
            fields.filled_count(),
            start.elapsed().as_micros()
        );

        FieldExtraction::new(fields, log)
    }
}

impl Default for ContractParser {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}
