//! Error types for the credit-report-md library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`ReportError`]: **Fatal**: a file-level operation cannot proceed at all
//!   (input missing, not UTF-8, output not writable, bad configuration).
//!   Only the file and batch entry points return it; extracting from an
//!   in-memory string never fails.
//!
//! * [`SectionIssue`]: **Non-fatal**: one section was absent or malformed.
//!   The affected field falls back to its default and the issue is recorded
//!   in [`crate::report::ExtractionOutput::issues`] so callers can tell
//!   "the AI omitted this" apart from "there was nothing to report".

use crate::sections::ReportField;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the credit-report-md library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Report file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not valid UTF-8 text.
    #[error("File '{path}' is not valid UTF-8 (first invalid byte at offset {offset})")]
    NotUtf8 { path: PathBuf, offset: usize },

    /// The file exceeds the configured size cap.
    #[error("File '{path}' is {size} bytes, above the {limit}-byte limit\nRaise --max-input-bytes if this is expected.")]
    InputTooLarge {
        path: PathBuf,
        size: u64,
        limit: usize,
    },

    /// Any other I/O failure while reading the input.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialisation of the report failed.
    #[error("Failed to serialise report: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal finding about one field of the report.
///
/// The field concerned still holds a valid value (its default, or the rows
/// that could be read); the issue only explains why it looks the way it does.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SectionIssue {
    /// The section heading does not appear in the document.
    #[error("{field}: heading '{heading}' not found")]
    MissingSection { field: ReportField, heading: String },

    /// The `Label:` line for a scalar field is absent or has no value.
    #[error("{field}: label '{label}' not found")]
    MissingLabel { field: ReportField, label: String },

    /// The heading appears more than once; the first occurrence was used.
    #[error("{field}: heading '{heading}' appears {occurrences} times, using the first")]
    DuplicateHeading {
        field: ReportField,
        heading: String,
        occurrences: usize,
    },

    /// A table had a header (and possibly a separator) but no data rows.
    #[error("{field}: table has {lines} pipe line(s) and no data rows")]
    HeaderOnlyTable { field: ReportField, lines: usize },

    /// A data row's cell count differs from the header's.
    #[error("{field}: row {row} has {found} cells, header has {expected}")]
    RaggedRow {
        field: ReportField,
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl SectionIssue {
    /// The report field this issue concerns.
    pub fn field(&self) -> ReportField {
        match self {
            SectionIssue::MissingSection { field, .. }
            | SectionIssue::MissingLabel { field, .. }
            | SectionIssue::DuplicateHeading { field, .. }
            | SectionIssue::HeaderOnlyTable { field, .. }
            | SectionIssue::RaggedRow { field, .. } => *field,
        }
    }
}

/// A table row whose width does not fit its named record type.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{record}: row {row} has {found} cells, expected {expected}")]
pub struct RowShapeError {
    /// Record type name, e.g. `"ScoreRow"`.
    pub record: String,
    /// 0-based index of the data row within its table.
    pub row: usize,
    pub expected: usize,
    pub found: usize,
    /// The raw cells, kept so nothing is lost.
    pub cells: Vec<String>,
}
