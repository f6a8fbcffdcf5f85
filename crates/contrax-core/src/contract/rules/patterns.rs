//! Common regex patterns for Korean contract extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Party designation: `주식회사 알파 (이하 "갑"이라 한다)`
    // Groups: 1 = prefix, 2 = name, 3 = role (갑|을)
    pub static ref CONTRACT_PARTY: Regex = Regex::new(
        r#"(주식회사|\(\s*주\s*\)|㈜)\s*([가-힣A-Za-z0-9\s]{2,20})\s*\(\s*이하\s*["“”'‘’]?\s*(갑|을)\s*["“”'‘’]?\s*이?라\s*한다\s*\)"#
    ).unwrap();

    // Contract period: keyword, start date, 부터, end date, 까지
    // Groups: 1 = start token, 2 = end token
    pub static ref DATE_RANGE: Regex = Regex::new(
        r"(?s)(?:계약\s*기간은|기간은|계약\s*기간\s*[:：]).*?([0-9]{4}\s*년\s*[0-9]{1,2}\s*월\s*[0-9]{1,2}\s*일|[0-9]{4}\s*[-/.]\s*[0-9]{1,2}\s*[-/.]\s*[0-9]{1,2}).*?부터.*?([0-9]{4}\s*년\s*[0-9]{1,2}\s*월\s*[0-9]{1,2}\s*일|[0-9]{4}\s*[-/.]\s*[0-9]{1,2}\s*[-/.]\s*[0-9]{1,2}).*?까지"
    ).unwrap();

    // Long-form date: 2024년 3월 5일
    pub static ref LONG_DATE: Regex = Regex::new(
        r"([0-9]{4})\s*년\s*([0-9]{1,2})\s*월\s*([0-9]{1,2})\s*일"
    ).unwrap();

    pub static ref NON_DIGIT_RUN: Regex = Regex::new(r"[^0-9]+").unwrap();

    // Amount clause: `총 계약 금액은 금 55,000,000원정`
    pub static ref AMOUNT_CLAUSE: Regex = Regex::new(
        r"(?s)(?:총\s*계약\s*금액은|계약\s*금액은|금액은)\s*(.*?)(?:원\s*정|으로\s*하며)"
    ).unwrap();

    pub static ref CLAUSE_NUMBER: Regex = Regex::new(r"[0-9][0-9,]*").unwrap();

    // Currency-marked number: ₩55,000,000 / KRW 55000000 / 55,000,000원
    pub static ref CURRENCY_MARKED: Regex = Regex::new(
        r"(?:[₩￦]|KRW)\s*([0-9][0-9,]*)|([0-9][0-9,]*)\s*원"
    ).unwrap();

    // Parenthesized bare number with a thousands separator or 4+ digits
    pub static ref PARENTHESIZED_NUMBER: Regex = Regex::new(
        r"\(\s*([0-9]{1,3}(?:,[0-9]{3})+|[0-9]{4,})\s*\)"
    ).unwrap();
}
