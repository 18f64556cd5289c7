//! Report assembly and the library's entry points.
//!
//! [`extract_with`] is the core: a pure, synchronous pass over one Markdown
//! string that never fails. The async functions wrap it with file I/O
//! ([`extract_file`], [`extract_to_file`]) and bounded-concurrency batching
//! ([`extract_batch`]); only those can return a [`ReportError`].

use crate::config::ExtractionConfig;
use crate::error::{ReportError, SectionIssue};
use crate::pipeline::{bullets, fields, preclean, section, table};
use crate::report::{ExtractionOutput, ExtractionStats, Presence, StructuredReport};
use crate::sections::{ContentKind, ReportField, FULL_NAME_LABEL, REPORT_DATE_LABEL, SECTIONS};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract a report with the default configuration.
///
/// # Example
/// ```rust
/// use credit_report_md::extract_report;
///
/// let md = "## Flags or Alerts\n- Late payment in March\n- High utilization\n\n";
/// let report = extract_report(md);
/// assert_eq!(report.alerts, vec!["Late payment in March", "High utilization"]);
/// assert_eq!(report.full_name, "Unknown");
/// ```
pub fn extract_report(markdown: &str) -> StructuredReport {
    extract_with(markdown, &ExtractionConfig::default()).report
}

/// Extract a report, returning diagnostics and counters alongside it.
///
/// Every field is populated whatever the input; absent or malformed
/// sections are reported in [`ExtractionOutput::issues`].
pub fn extract_with(markdown: &str, config: &ExtractionConfig) -> ExtractionOutput {
    let start = Instant::now();

    let text: Cow<'_, str> = if config.preclean {
        Cow::Owned(preclean::preclean(markdown))
    } else {
        Cow::Borrowed(markdown)
    };
    let text = text.as_ref();

    let mut report = StructuredReport::empty(&config.unknown_sentinel);
    let mut issues = Vec::new();

    // ── Scalars: label match over the whole document ─────────────────────
    for (field, label, value) in [
        (ReportField::FullName, FULL_NAME_LABEL, fields::full_name(text)),
        (ReportField::ReportDate, REPORT_DATE_LABEL, fields::report_date(text)),
    ] {
        match value {
            Some(v) => {
                if let Some(slot) = report.scalar_mut(field) {
                    *slot = v;
                }
                report.presence.insert(field, Presence::Found);
            }
            None => {
                debug!(%field, "label not found, using sentinel");
                issues.push(SectionIssue::MissingLabel {
                    field,
                    label: label.to_string(),
                });
            }
        }
    }

    // ── Sections: heading-scoped tables and bullet lists ─────────────────
    for spec in &SECTIONS {
        let Some(found) = section::locate(text, spec, config.heading_strategy) else {
            debug!(field = %spec.field, heading = spec.title, "section not found");
            issues.push(SectionIssue::MissingSection {
                field: spec.field,
                heading: spec.title.to_string(),
            });
            continue;
        };

        if found.occurrences > 1 {
            warn!(
                heading = spec.title,
                occurrences = found.occurrences,
                "duplicate heading, using the first"
            );
            issues.push(SectionIssue::DuplicateHeading {
                field: spec.field,
                heading: spec.title.to_string(),
                occurrences: found.occurrences,
            });
        }

        let items = match spec.content {
            ContentKind::Table => {
                let parsed = table::parse_table_detailed(found.body);
                if parsed.rows.is_empty() && parsed.pipe_lines > 0 {
                    issues.push(SectionIssue::HeaderOnlyTable {
                        field: spec.field,
                        lines: parsed.pipe_lines,
                    });
                }
                let expected = parsed.header.as_ref().map_or(0, Vec::len);
                for (row, width) in parsed.ragged_rows() {
                    issues.push(SectionIssue::RaggedRow {
                        field: spec.field,
                        row,
                        expected,
                        found: width,
                    });
                }
                let n = parsed.rows.len();
                if let Some(slot) = report.table_mut(spec.field) {
                    *slot = parsed.rows;
                }
                n
            }
            ContentKind::Bullets => {
                let items = bullets::parse_bullets(found.body);
                let n = items.len();
                if let Some(slot) = report.bullets_mut(spec.field) {
                    *slot = items;
                }
                n
            }
            // Scalars are label-scoped and never listed in SECTIONS.
            ContentKind::Scalar => continue,
        };

        let presence = if items == 0 {
            Presence::Empty
        } else {
            Presence::Found
        };
        debug!(field = %spec.field, items, ?presence, "section parsed");
        report.presence.insert(spec.field, presence);
    }

    let count = |p: Presence| report.presence.values().filter(|&&v| v == p).count();
    let stats = ExtractionStats {
        input_bytes: markdown.len(),
        found_fields: count(Presence::Found),
        empty_fields: count(Presence::Empty),
        missing_fields: count(Presence::Missing),
        issue_count: issues.len(),
        duration_us: start.elapsed().as_micros() as u64,
    };

    debug!(
        "Extraction complete: {} found, {} empty, {} missing",
        stats.found_fields, stats.empty_fields, stats.missing_fields
    );

    ExtractionOutput {
        report,
        issues,
        stats,
    }
}

/// Read a Markdown report from disk and extract it.
///
/// # Errors
/// Returns `Err(ReportError)` when the file is missing, unreadable, larger
/// than [`ExtractionConfig::max_input_bytes`], or not UTF-8.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ReportError> {
    let path = path.as_ref();
    info!("Extracting report: {}", path.display());
    let text = read_report(path, config.max_input_bytes).await?;
    Ok(extract_with(&text, config))
}

/// Synchronous wrapper around [`extract_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_file_sync(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_file(path, config))
}

/// Extract a report file and write the [`StructuredReport`] as pretty JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ReportError> {
    let output = extract_file(input, config).await?;
    write_json(output_path, &output.report, true).await?;
    Ok(output.stats)
}

/// Serialise `value` as JSON and write it atomically to `path`.
pub async fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
    pretty: bool,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');

    let write_err = |e| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Outcome for one document of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<ExtractionOutput, ReportError>,
}

/// Extract many report files concurrently.
///
/// Documents are independent: at most [`ExtractionConfig::concurrency`] are
/// in flight at once, a failure in one does not affect the others, and the
/// returned items are in input order.
pub async fn extract_batch<P: AsRef<Path>>(
    paths: &[P],
    config: &ExtractionConfig,
) -> Vec<BatchItem> {
    let total = paths.len();
    info!("Starting batch extraction of {} documents", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut items: Vec<(usize, BatchItem)> = stream::iter(paths.iter().enumerate().map(
        |(i, path)| async move {
            let path = path.as_ref();
            let index = i + 1;
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_start(index, total, path);
            }
            let result = extract_file(path, config).await;
            match &result {
                Ok(out) => {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_document_complete(index, total, out.stats.missing_fields);
                    }
                }
                Err(e) => {
                    warn!("Failed to extract {}: {}", path.display(), e);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_document_error(index, total, &e.to_string());
                    }
                }
            }
            (
                i,
                BatchItem {
                    path: path.to_path_buf(),
                    result,
                },
            )
        },
    ))
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    items.sort_by_key(|(i, _)| *i);
    let success = items.iter().filter(|(_, it)| it.result.is_ok()).count();
    info!("Batch complete: {}/{} documents extracted", success, total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, success);
    }

    items.into_iter().map(|(_, it)| it).collect()
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Read `path` as UTF-8, enforcing the size cap before loading it.
async fn read_report(path: &Path, limit: usize) -> Result<String, ReportError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| read_error(path, e))?;
    if meta.len() > limit as u64 {
        return Err(ReportError::InputTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            limit,
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| ReportError::NotUtf8 {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

fn read_error(path: &Path, e: std::io::Error) -> ReportError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ReportError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ReportError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ReportError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    }
}
