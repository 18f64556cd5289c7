//! Bullet parsing: hyphen-prefixed lines → list of items.
//!
//! Only lines whose trimmed form starts with [`BULLET_MARKER`] count. A bullet
//! wrapped onto a second line loses its continuation; nested bullets are
//! flattened because indentation is trimmed away.

pub const BULLET_MARKER: &str = "- ";

/// Extract bullet items from a section body.
pub fn parse_bullets(section: &str) -> Vec<String> {
    section
        .lines()
        .map(str::trim)
        .filter_map(|l| l.strip_prefix(BULLET_MARKER))
        .map(|item| item.trim().to_string())
        .collect()
}
