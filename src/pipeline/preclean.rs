//! Pre-cleaning: deterministic normalisation of AI-generated Markdown.
//!
//! Chat models produce reports that are *semantically* in the template but
//! *textually* noisy: the whole answer wrapped in a ` ```markdown ` fence,
//! Windows line endings, a zero-width space glued to a heading, blank lines
//! that are really `"   "`. Every one of those breaks the blank-line section
//! boundary the extractor relies on.
//!
//! ## Rule Order
//!
//! Strip the outer fence first (it is matched on the raw text), then
//! normalise line endings so later rules only see `\n`, then drop invisible
//! characters, and trim trailing whitespace last so whitespace-only lines
//! become truly blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all pre-cleaning rules to the raw report text.
///
/// Rules (applied in order):
/// 1. Strip an outer markdown fence
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 4. Trim trailing whitespace per line
pub fn preclean(input: &str) -> String {
    let s = strip_markdown_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    trim_trailing_whitespace(&s)
}

// ── Rule 1: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:markdown|md)?[ \t]*\r?\n(.*)\r?\n```\s*$").unwrap()
});

fn strip_markdown_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) if wraps_whole_document(&caps[1]) => caps[1].to_string(),
        _ => input.to_string(),
    }
}

/// `true` when the first and last fence of the document are one pair.
///
/// Inside the wrapper, a bare ```` ``` ```` with no block open would close the
/// wrapper early, so the outer lines belong to two different blocks.
/// Nested blocks must open with an info string (```` ```python ````).
fn wraps_whole_document(inner: &str) -> bool {
    let mut depth = 0usize;
    for line in inner.lines() {
        let Some(info) = line.trim().strip_prefix("```") else {
            continue;
        };
        if info.trim_start_matches('`').trim().is_empty() {
            match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            }
        } else {
            depth += 1;
        }
    }
    depth == 0
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    // `split` rather than `lines` so a trailing newline survives.
    input
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────
