//! Common regex patterns for tax document extraction.
//!
//! The `regex` crate matches in linear time, so none of these can backtrack
//! catastrophically on adversarial OCR output.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Employer identification number: 2 digits, hyphen, 7 digits
    pub static ref EIN_PATTERN: Regex = Regex::new(
        r"\d{2}-\d{7}"
    ).unwrap();

    // W-2 boxes: first amount anywhere after the anchor word, grouped or not
    pub static ref WAGES_AMOUNT: Regex = Regex::new(
        r"(?s)Wages.*?(\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2})"
    ).unwrap();

    pub static ref FEDERAL_AMOUNT: Regex = Regex::new(
        r"(?s)Federal.*?(\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2})"
    ).unwrap();

    // Receipt date, M/D/YYYY
    pub static ref RECEIPT_DATE: Regex = Regex::new(
        r"\d{1,2}/\d{1,2}/\d{4}"
    ).unwrap();

    // Amount after a TOTAL label on the same line, SUBTOTAL included
    pub static ref RECEIPT_TOTAL: Regex = Regex::new(
        r"(?i)TOTAL[^\n]*?(\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2})"
    ).unwrap();

    // Bare amount closing the text
    pub static ref TRAILING_AMOUNT: Regex = Regex::new(
        r"(\d+\.\d{2})\s*$"
    ).unwrap();
}
