//! Rule-based field extractors for Korean contracts.

pub mod amounts;
pub mod dates;
pub mod parties;
pub mod patterns;

pub use amounts::{AmountExtractor, parse_amount};
pub use dates::{DateRange, DateRangeExtractor, normalize_date};
pub use parties::{Parties, PartyExtractor, PartyMatch, PartyRole, canonical_prefix, find_party_clauses};

use crate::models::log::ExtractionLog;

/// Trait for field extractors.
///
/// Extractors never fail: an unmatched or rejected field comes back absent,
/// with the reason in the returned log.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from whitespace-normalized text.
    fn extract(&self, text: &str) -> FieldExtraction<Self::Output>;
}

/// A stage result together with the log entries it produced, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExtraction<T> {
    pub value: T,
    pub log: ExtractionLog,
}

impl<T> FieldExtraction<T> {
    pub fn new(value: T, log: ExtractionLog) -> Self {
        Self { value, log }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldExtraction<U> {
        FieldExtraction {
            value: f(self.value),
            log: self.log,
        }
    }
}
