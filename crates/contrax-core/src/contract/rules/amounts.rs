//! Contract amount extraction.

use super::patterns::{AMOUNT_CLAUSE, CLAUSE_NUMBER, CURRENCY_MARKED, PARENTHESIZED_NUMBER};
use super::{FieldExtraction, FieldExtractor};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::log::ExtractionLog;

/// Parse an amount token such as `55,000,000` and check it against `[min, max]`.
pub fn parse_amount(token: &str, min: u64, max: u64) -> Result<u64, ExtractionError> {
    let digits: String = token
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ExtractionError::Parse {
            field: "amount".to_string(),
            value: token.to_string(),
        });
    }

    let value: u64 = digits.parse().map_err(|_| ExtractionError::Parse {
        field: "amount".to_string(),
        value: token.to_string(),
    })?;

    if value < min || value > max {
        return Err(ExtractionError::OutOfRange {
            field: "amount".to_string(),
            value,
            min,
            max,
        });
    }

    Ok(value)
}

/// One amount rule: a name for the log and the first candidate token it finds.
struct AmountRule {
    name: &'static str,
    find: fn(&str) -> Option<&str>,
}

/// Rules from most to least specific.
const RULES: [AmountRule; 3] = [
    AmountRule {
        name: "AMOUNT_CLAUSE",
        find: clause_amount,
    },
    AmountRule {
        name: "CURRENCY_MARKED",
        find: currency_marked_amount,
    },
    AmountRule {
        name: "PARENTHESIZED_AMOUNT",
        find: parenthesized_amount,
    },
];

/// First number inside `총 계약 금액은 … 원정`.
fn clause_amount(text: &str) -> Option<&str> {
    let clause = AMOUNT_CLAUSE.captures(text)?.get(1)?;
    CLAUSE_NUMBER.find(clause.as_str()).map(|m| m.as_str())
}

/// `₩N`, `KRW N` or `N원`, whichever comes first.
fn currency_marked_amount(text: &str) -> Option<&str> {
    let caps = CURRENCY_MARKED.captures(text)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// `(55,000,000)` or `(1200)`.
fn parenthesized_amount(text: &str) -> Option<&str> {
    PARENTHESIZED_NUMBER.captures(text)?.get(1).map(|m| m.as_str())
}

/// Extracts the total contract amount.
///
/// Rules are tried in order. A candidate that does not parse is logged and the
/// next rule is tried; the first parseable candidate ends the search, and is
/// dropped with a warning when it falls outside the configured bounds.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    min: u64,
    max: u64,
}

impl AmountExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min: config.min_amount,
            max: config.max_amount,
        }
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = Option<u64>;

    fn extract(&self, text: &str) -> FieldExtraction<Option<u64>> {
        let mut log = ExtractionLog::new();

        for rule in &RULES {
            let Some(token) = (rule.find)(text) else {
                continue;
            };

            match parse_amount(token, self.min, self.max) {
                Ok(amount) => {
                    log.info(format!(
                        "Regex pattern [{}] matched. Money format extracted: {} -> {}",
                        rule.name, token, amount
                    ));
                    return FieldExtraction::new(Some(amount), log);
                }
                Err(e @ ExtractionError::OutOfRange { .. }) => {
                    log.warn(format!(
                        "Regex pattern [{}] candidate '{}' rejected: {}",
                        rule.name, token, e
                    ));
                    return FieldExtraction::new(None, log);
                }
                Err(e) => {
                    log.warn(format!(
                        "Regex pattern [{}] candidate '{}' rejected: {}",
                        rule.name, token, e
                    ));
                }
            }
        }

        log.warn("No acceptable contract amount found");
        FieldExtraction::new(None, log)
    }
}
