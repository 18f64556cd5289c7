//! # credit-report-md
//!
//! Turn an AI-generated credit report (loosely structured Markdown) into a
//! [`StructuredReport`] ready for a PDF renderer.
//!
//! The upstream model is prompted with a fixed template
//! ([`prompts::REPORT_TEMPLATE_PROMPT`]); this crate reads the answer back:
//! two `Label: value` lines, five pipe tables and two bullet lists, each
//! under a known `## ` heading. Extraction is best-effort: a missing or
//! malformed section degrades to an empty field, never to an error, and is
//! recorded so callers can tell "absent" from "empty".
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Preclean  strip fences, CRLF → LF, invisible chars, trailing spaces
//!  ├─ 2. Labels    Full Name / Report Date (whole document)
//!  ├─ 3. Sections  locate each template heading
//!  ├─ 4. Parse     pipe table → rows, or "- " lines → items
//!  └─ 5. Assemble  StructuredReport + presence flags + issues
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use credit_report_md::{extract_report, ReportField, Presence};
//!
//! let md = "Full Name: Jane Doe\nReport Date: 2024-01-15\n\n\
//!           ## Credit Scores\n\
//!           | Bureau | Score | Range |\n|---|---|---|\n\
//!           | Experian | 720 | 300-850 |\n\n";
//!
//! let report = extract_report(md);
//! assert_eq!(report.full_name, "Jane Doe");
//! assert_eq!(report.scores, vec![vec!["Experian", "720", "300-850"]]);
//! assert_eq!(report.presence_of(ReportField::Alerts), Presence::Missing);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `report2json` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! credit-report-md = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod sections;
pub mod typed;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, HeadingStrategy, DEFAULT_SENTINEL};
pub use error::{ReportError, RowShapeError, SectionIssue};
pub use extract::{
    extract_batch, extract_file, extract_file_sync, extract_report, extract_to_file, extract_with,
    write_json, BatchItem,
};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::REPORT_TEMPLATE_PROMPT;
pub use report::{ExtractionOutput, ExtractionStats, Presence, StructuredReport};
pub use sections::{ContentKind, ReportField, SectionSpec, SECTIONS};
pub use typed::{
    AccountSummaryRow, InstallmentAccountRow, RevolvingAccountRow, ScoreRow, SummaryStatRow,
    TableRecord, TypedReport, TypedTable,
};
