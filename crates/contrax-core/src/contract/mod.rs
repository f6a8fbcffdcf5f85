//! Contract field extraction: parties, period, amount, and the confidence score.

pub mod confidence;
mod parser;
pub mod rules;

pub use parser::ContractParser;
pub use rules::{FieldExtraction, FieldExtractor};
