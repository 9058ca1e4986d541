//! Best-parameter history files: one `name: value` line per parameter.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::params::ParameterVector;
use crate::{Error, Result};

/// Parse `name: value` lines. Blank lines are ignored.
///
/// # Errors
/// `Error::InvalidData` for a line without `:` or with an unparsable value.
pub fn parse_history(text: &str) -> Result<ParameterVector> {
    let mut out = ParameterVector::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidData(format!("history line {} lacks `name: value`", i + 1)))?;
        let value = value.trim().parse::<f64>().map_err(|e| {
            Error::InvalidData(format!("history line {}: bad value for `{}` ({e})", i + 1, name.trim()))
        })?;
        out.set(name.trim(), value);
    }
    Ok(out)
}

#[must_use]
pub fn render_history(params: &ParameterVector) -> String {
    let mut out = String::new();
    for (name, value) in params.iter() {
        let _ = writeln!(out, "{name}: {value}");
    }
    out
}

/// # Errors
/// IO failures and the parse errors of [`parse_history`].
pub fn read_history(path: impl AsRef<Path>) -> Result<ParameterVector> {
    parse_history(&fs::read_to_string(path)?)
}

/// # Errors
/// IO failures.
pub fn write_history(path: impl AsRef<Path>, params: &ParameterVector) -> Result<()> {
    fs::write(path, render_history(params))?;
    Ok(())
}
