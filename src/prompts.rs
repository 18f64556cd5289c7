//! The report-template prompt for the upstream AI call.
//!
//! Extraction only works when the model writes the headings and labels this
//! crate looks for. Keeping the prompt next to [`crate::sections::SECTIONS`]
//! means a renamed heading shows up as a failing unit test instead of a
//! report full of empty tables.
//!
//! This crate does not call any model itself; callers send this text as the
//! system prompt and feed the reply to [`crate::extract::extract_with`].

/// System prompt asking the model to answer in the fixed report template.
pub const REPORT_TEMPLATE_PROMPT: &str = r#"You are a credit-education coach. Analyse the credit report provided by the user and answer using EXACTLY the template below.

Rules:
- Keep every heading exactly as written, one blank line before and after each section.
- Fill tables with one row per item; never merge rows or add extra columns.
- Write bullets as single lines starting with "- ".
- If a section has no data, keep the heading and write "None" on the next line.
- Do not wrap the answer in a code block.

Full Name: <full name as printed on the report>
Report Date: <date of the report>

## Credit Scores
| Bureau | Score | Range |
|---|---|---|

## Account Summary
| Metric | Value |
|---|---|

## Open Revolving Accounts
| Creditor | Balance | Credit Limit | Utilization | Status | Opened |
|---|---|---|---|---|---|

## Summary Stats
| Metric | Value |
|---|---|

## Estimated FICO Score Increase
- <action>: <estimated point increase>

## Flags or Alerts
- <late payment, collection, high utilization, …>

## Non-Revolving Installment Accounts
| Lender | Loan Type | Balance | Monthly Payment | Status | Opened |
|---|---|---|---|---|---|
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{ContentKind, FULL_NAME_LABEL, REPORT_DATE_LABEL, SECTIONS};
    use crate::typed::{
        AccountSummaryRow, InstallmentAccountRow, RevolvingAccountRow, ScoreRow, SummaryStatRow,
        TableRecord,
    };

    fn header_line(columns: &[&str]) -> String {
        format!("| {} |", columns.join(" | "))
    }

    #[test]
    fn prompt_has_every_heading() {
        for spec in &SECTIONS {
            assert!(
                REPORT_TEMPLATE_PROMPT.contains(&format!("{}\n", spec.marker())),
                "missing heading {:?}",
                spec.title
            );
        }
    }

    #[test]
    fn prompt_has_scalar_labels() {
        assert!(REPORT_TEMPLATE_PROMPT.contains(&format!("{FULL_NAME_LABEL}:")));
        assert!(REPORT_TEMPLATE_PROMPT.contains(&format!("{REPORT_DATE_LABEL}:")));
    }

    #[test]
    fn prompt_table_headers_match_records() {
        for columns in [
            ScoreRow::COLUMNS,
            AccountSummaryRow::COLUMNS,
            RevolvingAccountRow::COLUMNS,
            SummaryStatRow::COLUMNS,
            InstallmentAccountRow::COLUMNS,
        ] {
            assert!(
                REPORT_TEMPLATE_PROMPT.contains(&header_line(columns)),
                "missing header {columns:?}"
            );
        }
    }

    #[test]
    fn bullet_sections_show_bullet_marker() {
        for spec in SECTIONS.iter().filter(|s| s.content == ContentKind::Bullets) {
            let needle = format!("{}\n- ", spec.marker());
            assert!(REPORT_TEMPLATE_PROMPT.contains(&needle), "{}", spec.title);
        }
    }

    #[test]
    fn prompt_is_extractable_template() {
        let out = crate::extract::extract_with(REPORT_TEMPLATE_PROMPT, &Default::default());
        // Empty tables are header-only, so every table section is located but empty.
        for spec in SECTIONS.iter().filter(|s| s.content == ContentKind::Table) {
            assert_eq!(
                out.report.presence_of(spec.field),
                crate::report::Presence::Empty,
                "{}",
                spec.title
            );
        }
    }
}
