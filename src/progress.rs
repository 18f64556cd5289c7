//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events while [`crate::extract::extract_batch`] works through its inputs.
//! The trait is `Send + Sync` because documents are processed concurrently.
//!
//! # Example
//!
//! ```rust
//! use credit_report_md::{BatchProgressCallback, ExtractionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, missing_fields: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}/{total} done (#{index}, {missing_fields} missing)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by [`crate::extract::extract_batch`] as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `on_document_*` may be called concurrently from
/// different tasks and in any order.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is read.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a document is read.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position of the document in the batch
    /// * `total`: number of documents in the batch
    /// * `path`: the input path
    fn on_document_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a document was extracted.
    ///
    /// # Arguments
    /// * `missing_fields`: fields that fell back to their default
    fn on_document_complete(&self, index: usize, total: usize, missing_fields: usize) {
        let _ = (index, total, missing_fields);
    }

    /// Called when a document could not be read.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
