//! Table parsing: pipe-delimited markdown rows → grid of trimmed cells.
//!
//! The first pipe line is the header and the second the `|---|` separator;
//! both are discarded. A table needs at least one data row to count, so a
//! section with fewer than [`MIN_TABLE_LINES`] pipe lines yields no rows.
//! Rows are not width-checked here: a ragged row passes through as-is and
//! [`ParsedTable::header`] is kept so the caller can report it.

/// Header + separator + one data row.
pub const MIN_TABLE_LINES: usize = 3;

/// A row of cell strings.
pub type Row = Vec<String>;

/// Result of [`parse_table_detailed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    /// Cells of the first pipe line, when there is one.
    pub header: Option<Row>,
    /// Data rows (everything after the separator).
    pub rows: Vec<Row>,
    /// Number of pipe lines seen in the section.
    pub pipe_lines: usize,
}

impl ParsedTable {
    /// Indices and widths of data rows whose cell count differs from the header's.
    pub fn ragged_rows(&self) -> Vec<(usize, usize)> {
        let Some(width) = self.header.as_ref().map(Vec::len) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.len() != width)
            .map(|(i, r)| (i, r.len()))
            .collect()
    }
}

/// Parse the data rows of the table in `section`.
pub fn parse_table(section: &str) -> Vec<Row> {
    parse_table_detailed(section).rows
}

/// Parse the table in `section`, keeping the header and line count.
pub fn parse_table_detailed(section: &str) -> ParsedTable {
    let lines: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('|'))
        .collect();

    let header = lines.first().map(|l| split_row(l));
    let rows = if lines.len() < MIN_TABLE_LINES {
        Vec::new()
    } else {
        lines[2..].iter().map(|l| split_row(l)).collect()
    };

    ParsedTable {
        header,
        rows,
        pipe_lines: lines.len(),
    }
}

/// Split one pipe line into trimmed cells.
///
/// The empty field before the leading pipe is dropped, and so is the empty
/// field after a trailing pipe. A line missing its trailing pipe keeps its
/// last cell.
pub fn split_row(line: &str) -> Row {
    let line = line.trim();
    let mut cells: Vec<&str> = line.split('|').collect();
    if line.starts_with('|') {
        cells.remove(0);
    }
    if line.ends_with('|') {
        cells.pop();
    }
    cells.into_iter().map(|c| c.trim().to_string()).collect()
}
