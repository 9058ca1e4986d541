//! Plain comma-separated exchange of numeric columns.
//!
//! The layout is the one the surrounding tooling reads and writes: a header
//! row of field names, then one value per column per row. Empty cells are
//! skipped, which is how shorter columns (e.g. sparse orientation samples in
//! experimental files) are represented.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::table::{Column, Fields, Table};
use crate::{Error, Result};

/// Parse CSV text into columns in header order. Columns may be ragged.
///
/// # Errors
/// `Error::InvalidData` on an empty header or an unparsable cell.
pub fn parse_columns(text: &str) -> Result<Vec<Column>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| Error::InvalidData("CSV input has no header row".to_string()))?;
    let mut columns: Vec<Column> = header
        .split(',')
        .map(|name| Column::new(name.trim(), Vec::new()))
        .collect();

    for (row, line) in lines.enumerate() {
        for (col, cell) in line.split(',').enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let column = columns.get_mut(col).ok_or_else(|| {
                Error::InvalidData(format!("row {} has more cells than the header", row + 1))
            })?;
            let value = cell.parse::<f64>().map_err(|e| {
                Error::InvalidData(format!(
                    "row {}, column `{}`: cannot parse `{cell}` ({e})",
                    row + 1,
                    column.name
                ))
            })?;
            column.values.push(value);
        }
    }
    Ok(columns)
}

/// Read a possibly ragged CSV file into [`Fields`].
///
/// # Errors
/// IO failures and the parse errors of [`parse_columns`].
pub fn read_fields(path: impl AsRef<Path>) -> Result<Fields> {
    let text = fs::read_to_string(path)?;
    Ok(parse_columns(&text)?.into_iter().map(|c| (c.name, c.values)).collect())
}

/// Read a CSV file that must be rectangular.
///
/// # Errors
/// As [`read_fields`], plus `Error::Schema` for ragged columns.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let text = fs::read_to_string(path)?;
    Table::from_columns(parse_columns(&text)?)
}

/// Render a table as CSV text.
#[must_use]
pub fn render_table(table: &Table) -> String {
    let mut out = table.names().collect::<Vec<_>>().join(",");
    out.push('\n');
    for i in 0..table.num_rows() {
        let mut line = String::new();
        for (j, c) in table.columns().enumerate() {
            if j > 0 {
                line.push(',');
            }
            // `{}` on f64 prints the shortest representation that parses back
            // to the same bits.
            let _ = write!(line, "{}", c.values[i]);
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write a table to `path`, replacing any previous file.
///
/// # Errors
/// IO failures.
pub fn write_table(path: impl AsRef<Path>, table: &Table) -> Result<()> {
    fs::write(path, render_table(table))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_files_parse_column_wise() {
        let cols = parse_columns("strain,stress,strain_intervals\n0.0,0,0.0\n0.1,10,\n0.2,20,\n").unwrap();
        assert_eq!(cols[0].values, vec![0.0, 0.1, 0.2]);
        assert_eq!(cols[2].values, vec![0.0]);
    }

    #[test]
    fn render_then_parse_keeps_bits() {
        let t = Table::from_pairs([("a", vec![0.1 + 0.2, 1e-7]), ("b", vec![-3.0, 12345.678])]).unwrap();
        let back = Table::from_columns(parse_columns(&render_table(&t)).unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn bad_cell_names_row_and_column() {
        let err = parse_columns("a,b\n1,x\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 1"), "{msg}");
        assert!(msg.contains("`b`"), "{msg}");
    }
}
