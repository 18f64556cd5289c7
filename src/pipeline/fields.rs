//! Scalar label extraction (`Full Name: …`, `Report Date: …`).
//!
//! Labels are matched against the whole document, not a section. Matching is
//! case-insensitive and tolerant of markdown emphasis on either side of the
//! colon, which is how chat models like to decorate key/value lines.

use crate::sections::{FULL_NAME_LABEL, REPORT_DATE_LABEL};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_FULL_NAME: Lazy<Regex> = Lazy::new(|| label_regex(FULL_NAME_LABEL));
static RE_REPORT_DATE: Lazy<Regex> = Lazy::new(|| label_regex(REPORT_DATE_LABEL));

/// Build the matcher for `label`.
///
/// Captures the rest of the line after `Label:`; the value must start on the
/// same line.
fn label_regex(label: &str) -> Regex {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let pattern = format!(
        r"(?mi)\b{}[*_]*[ \t]*:[*_]*[ \t]*(\S.*)$",
        words.join(r"[ \t]+")
    );
    Regex::new(&pattern).unwrap()
}

/// First non-empty value for the label matched by `re`.
fn extract_label(text: &str, re: &Regex) -> Option<String> {
    re.captures_iter(text)
        .map(|caps| clean_value(&caps[1]))
        .find(|v| !v.is_empty())
}

fn clean_value(raw: &str) -> String {
    raw.trim().trim_matches(['*', '_']).trim().to_string()
}

/// The subject's name, if a `Full Name:` line is present.
pub fn full_name(text: &str) -> Option<String> {
    extract_label(text, &RE_FULL_NAME)
}

/// The report date, if a `Report Date:` line is present.
pub fn report_date(text: &str) -> Option<String> {
    extract_label(text, &RE_REPORT_DATE)
}
