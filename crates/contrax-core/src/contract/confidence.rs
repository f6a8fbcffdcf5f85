//! Completeness score over the five expected contract fields.

use crate::models::result::ContractFields;

/// Number of fields the score is computed over.
pub const EXPECTED_FIELDS: usize = 5;

/// `round(filled / 5, 2)`. Pure function of which fields are present.
pub fn score(fields: &ContractFields) -> f64 {
    let ratio = fields.filled_count() as f64 / EXPECTED_FIELDS as f64;
    (ratio * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields_from_mask(mask: u8) -> ContractFields {
        let bit = |i: u8| mask & (1 << i) != 0;
        ContractFields {
            contractor_a: bit(0).then(|| "주식회사 알파".to_string()),
            contractor_b: bit(1).then(|| "(주) 베타".to_string()),
            start_date: bit(2).then(|| "2024-01-01".to_string()),
            end_date: bit(3).then(|| "2024-12-31".to_string()),
            amount: bit(4).then_some(55_000_000),
        }
    }

    #[test]
    fn test_score_over_every_field_subset() {
        let expected = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        for mask in 0u8..32 {
            let fields = fields_from_mask(mask);
            let filled = mask.count_ones() as usize;
            assert_eq!(fields.filled_count(), filled);
            assert_eq!(score(&fields), expected[filled], "mask {:05b}", mask);
        }
    }

    #[test]
    fn test_score_is_idempotent() {
        let fields = fields_from_mask(0b10110);
        assert_eq!(score(&fields), score(&fields));
        assert_eq!(score(&fields), 0.6);
    }

    #[test]
    fn test_empty_fields_score_zero() {
        assert_eq!(score(&ContractFields::default()), 0.0);
    }
}
