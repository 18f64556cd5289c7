//! Configuration types for report extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The defaults reproduce the report
//! template's expectations; most callers never touch them.

use crate::error::ReportError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default sentinel for `fullName` / `reportDate` when the label is absent.
pub const DEFAULT_SENTINEL: &str = "Unknown";

/// Configuration for extracting a [`crate::report::StructuredReport`].
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use credit_report_md::{ExtractionConfig, HeadingStrategy};
///
/// let config = ExtractionConfig::builder()
///     .heading_strategy(HeadingStrategy::FirstOccurrence)
///     .preclean(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// How section headings are located. Default: [`HeadingStrategy::Structural`].
    pub heading_strategy: HeadingStrategy,

    /// Run the pre-cleaning rules before extraction. Default: true.
    ///
    /// Pre-cleaning strips an outer code fence, normalises line endings,
    /// removes invisible Unicode and trims trailing whitespace. Without it,
    /// under [`HeadingStrategy::FirstOccurrence`], a CRLF document has no
    /// `"\n\n"` boundaries and every section runs to the end of the text.
    pub preclean: bool,

    /// Value used for `fullName` / `reportDate` when no label is found. Default: `"Unknown"`.
    pub unknown_sentinel: String,

    /// Upper bound on the size of an input file in bytes. Default: 4 MiB.
    ///
    /// Only enforced by the file-level entry points. Generated reports are a
    /// few kilobytes; anything near the cap is almost certainly the wrong file.
    pub max_input_bytes: usize,

    /// Number of documents processed at once by
    /// [`crate::extract::extract_batch`]. Default: 8.
    pub concurrency: usize,

    /// Optional batch progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            heading_strategy: HeadingStrategy::default(),
            preclean: true,
            unknown_sentinel: DEFAULT_SENTINEL.to_string(),
            max_input_bytes: 4 * 1024 * 1024,
            concurrency: 8,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("heading_strategy", &self.heading_strategy)
            .field("preclean", &self.preclean)
            .field("unknown_sentinel", &self.unknown_sentinel)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn heading_strategy(mut self, strategy: HeadingStrategy) -> Self {
        self.config.heading_strategy = strategy;
        self
    }

    pub fn preclean(mut self, v: bool) -> Self {
        self.config.preclean = v;
        self
    }

    pub fn unknown_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.config.unknown_sentinel = sentinel.into();
        self
    }

    pub fn max_input_bytes(mut self, n: usize) -> Self {
        self.config.max_input_bytes = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ReportError> {
        let c = &self.config;
        if c.max_input_bytes == 0 {
            return Err(ReportError::InvalidConfig(
                "max_input_bytes must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(ReportError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.unknown_sentinel.contains('\n') {
            return Err(ReportError::InvalidConfig(
                "Sentinel must be a single line".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the section extractor finds a heading in the document.
///
/// | Strategy | Matches | Body ends at |
/// |----------|---------|--------------|
/// | `Structural` | ATX heading lines outside code fences and quotes, any level, case-insensitive | blank line or next heading |
/// | `FirstOccurrence` | first raw substring `"## <title>"` anywhere | first `"\n\n"` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingStrategy {
    /// Line-anchored heading match that ignores fenced code and quotes. (default)
    #[default]
    Structural,
    /// Plain substring search for `"## <title>"`; the first hit wins even if
    /// it sits inside a quoted example.
    FirstOccurrence,
}
