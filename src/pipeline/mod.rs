//! Pipeline stages for Markdown-to-report extraction.
//!
//! Each submodule implements exactly one transformation step and is a pure
//! function of its input.
//!
//! ## Data Flow
//!
//! ```text
//! preclean ──▶ section ──┬──▶ table    (pipe rows → grid)
//! (cleanup)    (heading) └──▶ bullets  ("- " lines → list)
//!      └─────▶ fields   (Label: value, whole document)
//! ```
//!
//! 1. [`preclean`]: strip fences, normalise line endings and whitespace
//! 2. [`section`]: isolate the block under a named heading
//! 3. [`table`]: parse pipe-delimited rows, skipping header and separator
//! 4. [`bullets`]: collect hyphen bullet items
//! 5. [`fields`]: read `Full Name:` / `Report Date:` labels
//!
//! The assembler in [`crate::extract`] wires these together per
//! [`crate::sections::SECTIONS`].

pub mod bullets;
pub mod fields;
pub mod preclean;
pub mod section;
pub mod table;
