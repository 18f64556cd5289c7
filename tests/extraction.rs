//! Integration tests for credit-report-md.
//!
//! Everything here goes through the public API only. File-level tests write
//! into a `tempfile::TempDir`, so they need no fixtures and no network.
//!
//! Run with:
//!   cargo test --test extraction -- --nocapture

use credit_report_md::{
    extract_batch, extract_file, extract_file_sync, extract_report, extract_to_file, extract_with,
    write_json, BatchProgressCallback, ExtractionConfig, HeadingStrategy, Presence, ReportError,
    ReportField, SectionIssue, StructuredReport, SECTIONS,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A report the way the upstream model writes it when it follows the template.
const FULL_REPORT: &str = "\
Full Name: Jane Doe
Report Date: 2024-01-15

## Credit Scores
| Bureau | Score | Range |
|---|---|---|
| Experian | 720 | 300-850 |
| Equifax | 705 | 300-850 |
| TransUnion | 712 | 300-850 |

## Account Summary
| Metric | Value |
|---|---|
| Open Accounts | 6 |
| Total Balance | $18,400 |

## Open Revolving Accounts
| Creditor | Balance | Credit Limit | Utilization | Status | Opened |
|---|---|---|---|---|---|
| Chase Freedom | $2,300 | $5,000 | 46% | Current | 2018-04 |
| Amex Gold | $900 | $10,000 | 9% | Current | 2020-11 |

## Summary Stats
| Metric | Value |
|---|---|
| Overall Utilization | 21% |

## Estimated FICO Score Increase
- Pay Chase Freedom below 30%: +15 to +25 points
- Keep Amex Gold open: +5 points

## Flags or Alerts
- Late payment in March
- High utilization

## Non-Revolving Installment Accounts
| Lender | Loan Type | Balance | Monthly Payment | Status | Opened |
|---|---|---|---|---|---|
| Toyota Financial | Auto | $12,100 | $345 | Current | 2022-06 |
";

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn config_with(strategy: HeadingStrategy, preclean: bool) -> ExtractionConfig {
    ExtractionConfig::builder()
        .heading_strategy(strategy)
        .preclean(preclean)
        .build()
        .unwrap()
}

fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ── Documented scenarios ─────────────────────────────────────────────────────

#[test]
fn scores_table_scenario() {
    let md = "## Credit Scores\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |\n\n";
    let report = extract_report(md);
    assert_eq!(report.scores, vec![row(&["Experian", "720", "300-850"])]);
}

#[test]
fn alerts_bullets_scenario() {
    let md = "## Flags or Alerts\n- Late payment in March\n- High utilization\n\n";
    let report = extract_report(md);
    assert_eq!(report.alerts, vec!["Late payment in March", "High utilization"]);
}

#[test]
fn missing_scores_heading_scenario() {
    let md = "## Flags or Alerts\n- Late payment in March\n\n";
    let report = extract_report(md);
    assert!(report.scores.is_empty());
}

#[test]
fn scalar_labels_scenario() {
    let report = extract_report("Full Name: Jane Doe\nReport Date: 2024-01-15\n");
    assert_eq!(report.full_name, "Jane Doe");
    assert_eq!(report.report_date, "2024-01-15");
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn every_missing_field_takes_its_default() {
    for md in ["", "\n\n", "Just some prose without any headings.\n"] {
        let report = extract_report(md);
        assert_eq!(report, StructuredReport::default(), "input {md:?}");
        assert_eq!(report.full_name, "Unknown");
        assert_eq!(report.report_date, "Unknown");
        assert_eq!(report.missing_fields(), ReportField::ALL.to_vec());
    }
}

#[test]
fn one_row_per_data_line_with_trimmed_cells() {
    let md = "## Summary Stats\n|  Metric  |Value|\n| --- | --- |\n|   Utilization   |  21%  |\n| Age |9 yrs|\n\n";
    let report = extract_report(md);
    assert_eq!(
        report.revolving_stats,
        vec![row(&["Utilization", "21%"]), row(&["Age", "9 yrs"])]
    );
}

#[test]
fn header_only_table_is_empty_not_one_empty_row() {
    let md = "## Open Revolving Accounts\n| Creditor | Balance | Credit Limit | Utilization | Status | Opened |\n|---|---|---|---|---|---|\n\n";
    let out = extract_with(md, &ExtractionConfig::default());
    assert_eq!(out.report.revolving_accounts, Vec::<Vec<String>>::new());
    assert_eq!(
        out.report.presence_of(ReportField::RevolvingAccounts),
        Presence::Empty
    );
}

#[test]
fn bullet_prefix_removed_and_trimmed() {
    let md = "## Estimated FICO Score Increase\n-   Pay down revolving balances   \n- Dispute the old collection\n\n";
    let report = extract_report(md);
    assert_eq!(
        report.score_improvement_tips,
        vec!["Pay down revolving balances", "Dispute the old collection"]
    );
}

#[test]
fn extraction_is_idempotent() {
    for config in [
        ExtractionConfig::default(),
        config_with(HeadingStrategy::FirstOccurrence, false),
    ] {
        let a = extract_with(FULL_REPORT, &config);
        let b = extract_with(FULL_REPORT, &config);
        assert_eq!(a.report, b.report);
        assert_eq!(a.issues, b.issues);
    }
}

// ── Full document ────────────────────────────────────────────────────────────

#[test]
fn full_report_fills_every_field() {
    let out = extract_with(FULL_REPORT, &ExtractionConfig::default());
    let r = &out.report;

    assert_eq!(r.full_name, "Jane Doe");
    assert_eq!(r.report_date, "2024-01-15");
    assert_eq!(r.scores.len(), 3);
    assert_eq!(r.summary[1], row(&["Total Balance", "$18,400"]));
    assert_eq!(
        r.revolving_accounts[0],
        row(&["Chase Freedom", "$2,300", "$5,000", "46%", "Current", "2018-04"])
    );
    assert_eq!(r.revolving_stats, vec![row(&["Overall Utilization", "21%"])]);
    assert_eq!(r.score_improvement_tips.len(), 2);
    assert_eq!(r.alerts, vec!["Late payment in March", "High utilization"]);
    assert_eq!(
        r.installment_accounts,
        vec![row(&["Toyota Financial", "Auto", "$12,100", "$345", "Current", "2022-06"])]
    );

    assert!(out.is_complete());
    assert!(out.issues.is_empty(), "unexpected issues: {:?}", out.issues);
    assert_eq!(out.stats.found_fields, ReportField::ALL.len());
}

#[test]
fn both_strategies_agree_on_template_output() {
    let structural = extract_with(FULL_REPORT, &ExtractionConfig::default()).report;
    let substring =
        extract_with(FULL_REPORT, &config_with(HeadingStrategy::FirstOccurrence, false)).report;
    assert_eq!(structural, substring);
}

#[test]
fn json_uses_camel_case_field_names() {
    let report = extract_report(FULL_REPORT);
    let value = serde_json::to_value(&report).unwrap();
    for field in ReportField::ALL {
        assert!(
            value.get(field.json_name()).is_some(),
            "missing key {}",
            field.json_name()
        );
    }
    assert_eq!(value["presence"]["scoreImprovementTips"], "found");

    let back: StructuredReport = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);
}

// ── Heading strategies ───────────────────────────────────────────────────────

#[test]
fn fenced_heading_only_fools_first_occurrence() {
    let md = "Example of the expected format:\n\n\
```text\n## Credit Scores\n| Bureau | Score | Range |\n```\n\n\
## Credit Scores\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |\n\n";

    let structural = extract_report(md);
    assert_eq!(structural.scores, vec![row(&["Experian", "720", "300-850"])]);

    let substring = extract_with(md, &config_with(HeadingStrategy::FirstOccurrence, false));
    assert!(substring.report.scores.is_empty());
}

#[test]
fn structural_tolerates_heading_variations() {
    let md = "### credit scores:\n| Bureau | Score | Range |\n|---|---|---|\n| Equifax | 705 | 300-850 |\n\n\
## **Estimated FICO Score Increase** (next 6 months)\n- Lower utilization: +20 points\n";
    let report = extract_report(md);
    assert_eq!(report.scores, vec![row(&["Equifax", "705", "300-850"])]);
    assert_eq!(report.score_improvement_tips, vec!["Lower utilization: +20 points"]);
}

#[test]
fn structural_rejects_partial_words() {
    // "Account Summaries" extends the title mid-word; "Summary" is shorter than
    // "Summary Stats".
    let md = "## Account Summaries\n| Metric | Value |\n|---|---|\n| A | 1 |\n\n\
## Summary\n| Metric | Value |\n|---|---|\n| B | 2 |\n\n";
    let report = extract_report(md);
    assert_eq!(report.presence_of(ReportField::Summary), Presence::Missing);
    assert_eq!(report.presence_of(ReportField::RevolvingStats), Presence::Missing);
}

#[test]
fn duplicate_heading_keeps_first_and_is_reported() {
    let md = "## Flags or Alerts\n- first\n\n## Flags or Alerts\n- second\n\n";
    for config in [
        ExtractionConfig::default(),
        config_with(HeadingStrategy::FirstOccurrence, false),
    ] {
        let out = extract_with(md, &config);
        assert_eq!(out.report.alerts, vec!["first"]);
        assert!(out.issues.contains(&SectionIssue::DuplicateHeading {
            field: ReportField::Alerts,
            heading: "Flags or Alerts".to_string(),
            occurrences: 2,
        }));
    }
}

#[test]
fn section_ends_at_first_blank_line() {
    let md = "## Flags or Alerts\n- kept\n\n- dropped after the blank line\n";
    for config in [
        ExtractionConfig::default(),
        config_with(HeadingStrategy::FirstOccurrence, false),
    ] {
        assert_eq!(extract_with(md, &config).report.alerts, vec!["kept"]);
    }
}

// ── Pre-cleaning ─────────────────────────────────────────────────────────────

#[test]
fn crlf_input_matches_lf_input() {
    let crlf = FULL_REPORT.replace('\n', "\r\n");
    assert_eq!(extract_report(&crlf), extract_report(FULL_REPORT));
}

#[test]
fn outer_markdown_fence_is_stripped() {
    let fenced = format!("```markdown\n{FULL_REPORT}```\n");
    assert_eq!(extract_report(&fenced), extract_report(FULL_REPORT));
}

#[test]
fn reply_cut_off_inside_opening_fence_is_still_read() {
    let truncated = format!("```markdown\n{FULL_REPORT}");
    for config in [
        ExtractionConfig::default(),
        config_with(HeadingStrategy::Structural, false),
    ] {
        let out = extract_with(&truncated, &config);
        assert_eq!(out.report, extract_report(FULL_REPORT));
        assert!(out.is_complete(), "issues: {:?}", out.issues);
    }
}

#[test]
fn separate_leading_and_trailing_code_blocks_are_not_a_wrapper() {
    let md = format!("```\nexample\n```\n\n{FULL_REPORT}\n```\nfooter\n```\n");
    let out = extract_with(&md, &ExtractionConfig::default());
    assert_eq!(out.report, extract_report(FULL_REPORT));
    assert!(out.is_complete(), "issues: {:?}", out.issues);
}

#[test]
fn whitespace_only_line_ends_a_section() {
    let md = "## Flags or Alerts\n- kept\n   \n- dropped\n";
    assert_eq!(extract_report(md).alerts, vec!["kept"]);
}

#[test]
fn emphasised_labels_are_read() {
    let report = extract_report("**Full Name:** Jane Doe\nReport Date: **2024-01-15**\n");
    assert_eq!(report.full_name, "Jane Doe");
    assert_eq!(report.report_date, "2024-01-15");
}

// ── Presence and diagnostics ─────────────────────────────────────────────────

#[test]
fn presence_separates_absent_from_empty() {
    let md = "Full Name: Jane Doe\n\n## Flags or Alerts\nNone\n\n## Credit Scores\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |\n\n";
    let out = extract_with(md, &ExtractionConfig::default());
    let r = &out.report;

    assert_eq!(r.presence_of(ReportField::FullName), Presence::Found);
    assert_eq!(r.presence_of(ReportField::ReportDate), Presence::Missing);
    assert_eq!(r.presence_of(ReportField::Scores), Presence::Found);
    assert_eq!(r.presence_of(ReportField::Alerts), Presence::Empty);
    assert_eq!(r.presence_of(ReportField::Summary), Presence::Missing);

    assert_eq!(r.presence.len(), ReportField::ALL.len());
    assert_eq!(out.stats.found_fields, 2);
    assert_eq!(out.stats.empty_fields, 1);
    assert_eq!(out.stats.missing_fields, ReportField::ALL.len() - 3);
}

#[test]
fn every_missing_section_produces_an_issue() {
    let out = extract_with(
        "Full Name: Jane Doe\nReport Date: 2024-01-15\n",
        &ExtractionConfig::default(),
    );
    let missing: Vec<ReportField> = out
        .issues
        .iter()
        .filter(|i| matches!(i, SectionIssue::MissingSection { .. }))
        .map(SectionIssue::field)
        .collect();
    let expected: Vec<ReportField> = SECTIONS.iter().map(|s| s.field).collect();
    assert_eq!(missing, expected);
}

#[test]
fn custom_sentinel_replaces_unknown() {
    let config = ExtractionConfig::builder()
        .unknown_sentinel("Not provided")
        .build()
        .unwrap();
    let out = extract_with("## Flags or Alerts\n- x\n", &config);
    assert_eq!(out.report.full_name, "Not provided");
    assert_eq!(out.report.report_date, "Not provided");
}

// ── Typed rows ───────────────────────────────────────────────────────────────

#[test]
fn typed_report_names_every_column() {
    let typed = extract_report(FULL_REPORT).to_typed();

    assert_eq!(typed.scores.rows[0].bureau, "Experian");
    assert_eq!(typed.scores.rows[0].numeric_score(), Some(720));
    assert_eq!(typed.summary.rows[0].metric, "Open Accounts");
    assert_eq!(typed.revolving_accounts.rows[1].credit_limit, "$10,000");
    assert_eq!(typed.revolving_stats.rows[0].value, "21%");
    assert_eq!(typed.installment_accounts.rows[0].loan_type, "Auto");
    assert!(typed.rejected_rows().is_empty());
}

#[test]
fn typed_report_sets_aside_ragged_rows() {
    let md = "## Credit Scores\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |\n| Equifax | 705 |\n\n";
    let out = extract_with(md, &ExtractionConfig::default());

    // The grid keeps the short row; the typed view rejects it.
    assert_eq!(out.report.scores.len(), 2);
    let typed = out.report.to_typed();
    assert_eq!(typed.scores.rows.len(), 1);
    let rejected = typed.rejected_rows();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].row, 1);
    assert_eq!(rejected[0].expected, 3);
    assert_eq!(rejected[0].found, 2);
}

// ── File entry points ────────────────────────────────────────────────────────

#[tokio::test]
async fn extract_file_reads_utf8_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "jane.md", FULL_REPORT);

    let out = extract_file(&path, &ExtractionConfig::default()).await.unwrap();
    assert_eq!(out.report, extract_report(FULL_REPORT));
    assert_eq!(out.stats.input_bytes, FULL_REPORT.len());
}

#[tokio::test]
async fn extract_to_file_writes_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "jane.md", FULL_REPORT);
    let output = dir.path().join("nested/out/jane.json");

    let stats = extract_to_file(&input, &output, &ExtractionConfig::default())
        .await
        .unwrap();
    assert_eq!(stats.missing_fields, 0);

    let json = std::fs::read_to_string(&output).unwrap();
    assert!(json.starts_with("{\n"));
    let back: StructuredReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, extract_report(FULL_REPORT));
    assert!(!output.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn write_json_compact_is_single_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_json(&path, &extract_report(""), false).await.unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    assert_eq!(json.lines().count(), 1);
    assert!(json.contains("\"fullName\":\"Unknown\""));
}

#[tokio::test]
async fn missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract_file(dir.path().join("nope.md"), &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::FileNotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "big.md", FULL_REPORT);
    let config = ExtractionConfig::builder()
        .max_input_bytes(64)
        .build()
        .unwrap();

    let err = extract_file(&path, &config).await.unwrap_err();
    match err {
        ReportError::InputTooLarge { size, limit, .. } => {
            assert_eq!(size, FULL_REPORT.len() as u64);
            assert_eq!(limit, 64);
        }
        other => panic!("expected InputTooLarge, got {other:?}"),
    }
}

#[tokio::test]
async fn non_utf8_file_reports_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "latin1.md", b"Full Name: Ren\xe9\n");

    let err = extract_file(&path, &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReportError::NotUtf8 { offset: 14, .. }),
        "{err:?}"
    );
}

#[test]
fn sync_wrapper_matches_async() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "jane.md", FULL_REPORT);
    let out = extract_file_sync(&path, &ExtractionConfig::default()).unwrap();
    assert_eq!(out.report.full_name, "Jane Doe");
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingCallback {
    started: AtomicUsize,
    completed: AtomicUsize,
    errors: AtomicUsize,
    summary: Mutex<Option<(usize, usize)>>,
}

impl BatchProgressCallback for RecordingCallback {
    fn on_document_start(&self, _index: usize, _total: usize, _path: &Path) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_document_complete(&self, _index: usize, _total: usize, _missing: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_document_error(&self, _index: usize, _total: usize, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        *self.summary.lock().unwrap() = Some((total, success_count));
    }
}

#[tokio::test]
async fn batch_keeps_input_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_file(dir.path(), "a.md", FULL_REPORT),
        dir.path().join("missing.md"),
        write_file(dir.path(), "c.md", "Full Name: Carol\n"),
        write_file(dir.path(), "d.md", ""),
    ];

    let cb = Arc::new(RecordingCallback::default());
    let config = ExtractionConfig::builder()
        .concurrency(2)
        .progress_callback(cb.clone())
        .build()
        .unwrap();

    let items = extract_batch(&paths, &config).await;

    let got: Vec<&PathBuf> = items.iter().map(|i| &i.path).collect();
    assert_eq!(got, paths.iter().collect::<Vec<_>>());

    assert!(items[0].result.as_ref().unwrap().is_complete());
    assert!(matches!(
        items[1].result,
        Err(ReportError::FileNotFound { .. })
    ));
    assert_eq!(items[2].result.as_ref().unwrap().report.full_name, "Carol");
    assert_eq!(
        items[3].result.as_ref().unwrap().report,
        StructuredReport::default()
    );

    assert_eq!(cb.started.load(Ordering::SeqCst), 4);
    assert_eq!(cb.completed.load(Ordering::SeqCst), 3);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
    assert_eq!(*cb.summary.lock().unwrap(), Some((4, 3)));
}

#[tokio::test]
async fn empty_batch_is_empty() {
    let paths: Vec<PathBuf> = Vec::new();
    let items = extract_batch(&paths, &ExtractionConfig::default()).await;
    assert!(items.is_empty());
}
