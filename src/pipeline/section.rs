//! Section extraction: isolate the block of text under a named heading.
//!
//! Two strategies, selected by [`HeadingStrategy`]:
//!
//! * [`first_occurrence`]: split on the first raw occurrence of
//!   `"## <title>"` and cut at the first `"\n\n"` after it. Cheap and
//!   faithful to the template, but a heading quoted inside a code block or
//!   an example locks extraction onto the wrong place.
//!
//! * [`structural`]: scan line by line, only accept real ATX heading lines
//!   outside fenced code and block quotes, and cut the body at the first
//!   blank line or the next heading.
//!
//! Both return a slice of the input; neither allocates nor fails.

use crate::config::HeadingStrategy;
use crate::sections::SectionSpec;

/// A located section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMatch<'a> {
    /// Text following the heading, up to the section boundary. May be empty.
    pub body: &'a str,
    /// How many times the heading occurs in the document (≥ 1).
    pub occurrences: usize,
}

/// Locate `spec` in `text` using `strategy`. `None` when the heading is absent.
pub fn locate<'a>(
    text: &'a str,
    spec: &SectionSpec,
    strategy: HeadingStrategy,
) -> Option<SectionMatch<'a>> {
    match strategy {
        HeadingStrategy::Structural => structural(text, spec.title),
        HeadingStrategy::FirstOccurrence => first_occurrence(text, &spec.marker()),
    }
}

/// The section body as a plain string: `""` when the heading is absent.
pub fn section_text<'a>(text: &'a str, spec: &SectionSpec, strategy: HeadingStrategy) -> &'a str {
    locate(text, spec, strategy).map_or("", |m| m.body)
}

// ── Substring strategy ───────────────────────────────────────────────────────

/// Split on the first occurrence of `marker`, then keep everything up to the
/// first double newline.
///
/// The remainder of the heading line (if any) is part of the body; a heading
/// immediately followed by a blank line yields an empty body.
pub fn first_occurrence<'a>(text: &'a str, marker: &str) -> Option<SectionMatch<'a>> {
    if marker.is_empty() {
        return None;
    }
    let start = text.find(marker)?;
    let after = &text[start + marker.len()..];
    let body = match after.find("\n\n") {
        Some(end) => &after[..end],
        None => after,
    };
    Some(SectionMatch {
        body,
        occurrences: text.matches(marker).count(),
    })
}

// ── Structural strategy ──────────────────────────────────────────────────────

/// One physical line of the document with its byte offset.
struct Line<'a> {
    offset: usize,
    blank: bool,
    /// Heading text when this line is an ATX heading outside fences/quotes.
    heading: Option<&'a str>,
}

/// Find the first heading line whose text matches `title` and return the
/// block that follows it.
///
/// Leading blank lines after the heading are skipped; the body then runs to
/// the next blank line or heading line. A heading followed directly by
/// another heading has an empty body.
pub fn structural<'a>(text: &'a str, title: &str) -> Option<SectionMatch<'a>> {
    let lines = scan_lines(text);
    let mut hits = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.heading.is_some_and(|h| title_matches(h, title)))
        .map(|(i, _)| i);

    let first = hits.next()?;
    let occurrences = 1 + hits.count();
    let empty = SectionMatch {
        body: "",
        occurrences,
    };

    let rest = &lines[first + 1..];
    let Some(start) = rest.iter().position(|l| !l.blank) else {
        return Some(empty);
    };
    if rest[start].heading.is_some() {
        return Some(empty);
    }

    let body_start = rest[start].offset;
    let body_end = rest[start..]
        .iter()
        .find(|l| l.blank || l.heading.is_some())
        .map_or(text.len(), |l| l.offset);

    Some(SectionMatch {
        body: text[body_start..body_end].trim_end_matches(['\n', '\r']),
        occurrences,
    })
}

fn scan_lines(text: &str) -> Vec<Line<'_>> {
    let mut ignored: Vec<usize> = Vec::new();
    loop {
        let (lines, unclosed) = scan_with(text, &ignored);
        match unclosed {
            // A fence still open at the end of the text is a stray marker
            // (typically a reply cut off after ```` ```markdown ````), not code.
            Some(index) => ignored.push(index),
            None => return lines,
        }
    }
}

/// One pass over `text`, treating the fence lines at `ignored` indices as
/// plain text. Also returns the index of a fence left open at the end.
fn scan_with<'a>(text: &'a str, ignored: &[usize]) -> (Vec<Line<'a>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut open_fence: Option<(char, usize)> = None;

    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let content = raw.trim_end_matches(['\n', '\r']);
        let fence = fence_char(content).filter(|_| !ignored.contains(&index));
        let heading = match fence {
            Some(fence) => {
                match open_fence {
                    None => open_fence = Some((fence, index)),
                    Some((open, _)) if open == fence => open_fence = None,
                    Some(_) => {}
                }
                None
            }
            None if open_fence.is_some() => None,
            None => heading_text(content),
        };
        lines.push(Line {
            offset,
            blank: content.trim().is_empty(),
            heading,
        });
        offset += raw.len();
    }
    (lines, open_fence.map(|(_, index)| index))
}

/// `` ` `` or `~` when the line opens or closes a fenced code block.
fn fence_char(line: &str) -> Option<char> {
    let t = line.trim_start();
    if t.starts_with("```") {
        Some('`')
    } else if t.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

/// Text of an ATX heading (`#`..`######`), or `None` for any other line.
///
/// At most three spaces of indentation are allowed; deeper indentation is an
/// indented code block.
fn heading_text(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let t = &line[indent..];
    let hashes = t.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &t[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim().trim_end_matches('#').trim_end())
}

/// Case-insensitive title match, tolerant of emphasis, a trailing colon, and
/// a suffix such as `" (next 6 months)"`.
fn title_matches(heading: &str, title: &str) -> bool {
    let h = heading.trim_matches(['*', '_']).trim();
    let h = h.trim_end_matches(':').trim_end();
    let h = h.trim_matches(['*', '_']).trim();

    let Some(head) = h.get(..title.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(title) {
        return false;
    }
    h[title.len()..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: &str =
        "## Credit Scores\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |\n\n";

    // ── first_occurrence ────────────────────────────────────────────────────

    #[test]
    fn substring_takes_text_up_to_blank_line() {
        let m = first_occurrence(SCORES, "## Credit Scores").unwrap();
        assert_eq!(
            m.body,
            "\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |"
        );
        assert_eq!(m.occurrences, 1);
    }

    #[test]
    fn substring_missing_heading() {
        assert!(first_occurrence("no headings here", "## Credit Scores").is_none());
    }

    #[test]
    fn substring_without_blank_line_runs_to_end() {
        let m = first_occurrence("## Flags or Alerts\n- a\n- b", "## Flags or Alerts").unwrap();
        assert_eq!(m.body, "\n- a\n- b");
    }

    #[test]
    fn substring_blank_line_after_heading_gives_empty_body() {
        let m = first_occurrence("## Flags or Alerts\n\n- a\n", "## Flags or Alerts").unwrap();
        assert_eq!(m.body, "");
    }

    #[test]
    fn substring_locks_onto_quoted_example() {
        let text = "> e.g. ## Flags or Alerts\n> - fake\n\n## Flags or Alerts\n- real\n";
        let m = first_occurrence(text, "## Flags or Alerts").unwrap();
        assert_eq!(m.body, "\n> - fake");
        assert_eq!(m.occurrences, 2);
    }

    // ── section_text ────────────────────────────────────────────────────────

    fn alerts_spec() -> &'static SectionSpec {
        crate::sections::ReportField::Alerts.section().unwrap()
    }

    #[test]
    fn section_text_absent_heading_is_empty_string() {
        for strategy in [HeadingStrategy::Structural, HeadingStrategy::FirstOccurrence] {
            assert_eq!(section_text(SCORES, alerts_spec(), strategy), "");
        }
    }

    #[test]
    fn section_text_present_heading() {
        let text = "## Flags or Alerts\n- a\n- b\n\ntrailer";
        assert_eq!(
            section_text(text, alerts_spec(), HeadingStrategy::Structural),
            "- a\n- b"
        );
        assert_eq!(
            section_text(text, alerts_spec(), HeadingStrategy::FirstOccurrence),
            "\n- a\n- b"
        );
    }

    // ── structural ──────────────────────────────────────────────────────────

    #[test]
    fn structural_table_body() {
        let m = structural(SCORES, "Credit Scores").unwrap();
        assert_eq!(
            m.body,
            "| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |"
        );
    }

    #[test]
    fn structural_skips_quoted_and_fenced_headings() {
        let text = "> ## Flags or Alerts\n> - quoted\n\n```\n## Flags or Alerts\n- fenced\n```\n\n## Flags or Alerts\n- real\n";
        let m = structural(text, "Flags or Alerts").unwrap();
        assert_eq!(m.body, "- real");
        assert_eq!(m.occurrences, 1);
    }

    #[test]
    fn structural_unclosed_fence_is_not_code() {
        let text = "```markdown\nFull Name: Jane Doe\n\n## Credit Scores\n| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |\n\n## Flags or Alerts\n- a\n";
        let m = structural(text, "Credit Scores").unwrap();
        assert_eq!(
            m.body,
            "| Bureau | Score | Range |\n|---|---|---|\n| Experian | 720 | 300-850 |"
        );
        assert_eq!(structural(text, "Flags or Alerts").unwrap().body, "- a");
    }

    #[test]
    fn structural_closed_fence_after_unclosed_one_still_hides() {
        // The stray opener is dropped; the balanced block below still hides its heading.
        let text = "```markdown\n## Flags or Alerts\n- real\n\n~~~\n## Flags or Alerts\n- fenced\n~~~\n";
        let m = structural(text, "Flags or Alerts").unwrap();
        assert_eq!(m.body, "- real");
        assert_eq!(m.occurrences, 1);
    }

    #[test]
    fn structural_skips_blank_lines_after_heading() {
        let m = structural("## Flags or Alerts\n\n\n- a\n- b\n\ntrailer", "Flags or Alerts").unwrap();
        assert_eq!(m.body, "- a\n- b");
    }

    #[test]
    fn structural_stops_at_next_heading() {
        let text = "## Flags or Alerts\n- a\n## Credit Scores\n| x |";
        assert_eq!(structural(text, "Flags or Alerts").unwrap().body, "- a");
    }

    #[test]
    fn structural_heading_followed_by_heading_is_empty() {
        let text = "## Flags or Alerts\n\n## Credit Scores\n| x |\n";
        let m = structural(text, "Flags or Alerts").unwrap();
        assert_eq!(m.body, "");
    }

    #[test]
    fn structural_ignores_level_case_and_decoration() {
        for heading in [
            "### flags or alerts",
            "## **Flags or Alerts**",
            "## Flags or Alerts:",
            "# Flags or Alerts ##",
            "## Flags or Alerts (review these)",
        ] {
            let text = format!("{heading}\n- a\n");
            let m = structural(&text, "Flags or Alerts");
            assert_eq!(m.map(|m| m.body), Some("- a"), "heading {heading:?}");
        }
    }

    #[test]
    fn structural_rejects_longer_word() {
        assert!(structural("## Summary Statistics\n| a |\n", "Summary Stats").is_none());
    }

    #[test]
    fn structural_requires_space_after_hashes() {
        assert!(structural("##Flags or Alerts\n- a\n", "Flags or Alerts").is_none());
    }

    #[test]
    fn structural_counts_duplicates_and_uses_first() {
        let text = "## Flags or Alerts\n- first\n\n## Flags or Alerts\n- second\n";
        let m = structural(text, "Flags or Alerts").unwrap();
        assert_eq!(m.body, "- first");
        assert_eq!(m.occurrences, 2);
    }

    #[test]
    fn structural_handles_crlf() {
        let m = structural("## Flags or Alerts\r\n- a\r\n\r\nafter", "Flags or Alerts").unwrap();
        assert_eq!(m.body, "- a");
    }

    #[test]
    fn structural_heading_at_end_of_text() {
        let m = structural("intro\n## Flags or Alerts", "Flags or Alerts").unwrap();
        assert_eq!(m.body, "");
    }

    #[test]
    fn structural_non_ascii_heading_does_not_panic() {
        assert!(structural("## Crédit\n- a\n", "Credit Scores").is_none());
    }
}
