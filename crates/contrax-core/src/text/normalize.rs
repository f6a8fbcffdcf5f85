/// Collapse line breaks and whitespace runs into single spaces and trim the
/// ends. Pattern matching runs on this form; the raw transcript is kept
/// separately.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_lines_and_runs() {
        let raw = "  계약서\r\n\r\n주식회사   알파\t(이하 \"갑\"이라 한다)\n\n";
        assert_eq!(normalize_whitespace(raw), "계약서 주식회사 알파 (이하 \"갑\"이라 한다)");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n\t \r\n"), "");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_whitespace("a \n b\u{3000}c");
        assert_eq!(normalize_whitespace(&once), once);
    }
}
