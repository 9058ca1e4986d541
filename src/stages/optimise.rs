//! Optimisation stage: run the search, persist the ranked candidate table
//! and read the winner back under the schema.

use std::path::Path;

use tracing::info;

use super::sdk::{Candidate, Optimiser, SearchSettings, Surrogate};
use crate::data::{csv, display_name, Column, ParameterSchema, ParameterVector, Reference, Table};
use crate::objective::Objective;
use crate::{Error, Result};

/// Ranked candidate table written into the optimisation directory.
pub const CANDIDATES_FILE: &str = "params.csv";

/// Header of the total-error column in candidate tables.
pub const TOTAL_ERROR_COLUMN: &str = "Error (total)";

/// One `Param (name)` column per schema parameter plus the total error;
/// rows best-first. Values the candidate lacks are written as NaN.
///
/// # Errors
/// `Error::Schema` if two schema names render to the same header.
pub fn candidate_table(candidates: &[Candidate], schema: &ParameterSchema) -> Result<Table> {
    let mut columns: Vec<Column> = schema
        .names()
        .map(|name| {
            Column::new(
                display_name(name),
                candidates.iter().map(|c| c.params.get(name).unwrap_or(f64::NAN)).collect(),
            )
        })
        .collect();
    columns.push(Column::new(TOTAL_ERROR_COLUMN, candidates.iter().map(|c| c.objective.total).collect()));
    Table::from_columns(columns)
}

/// The first (best) value of every declared parameter, validated.
///
/// # Errors
/// `Error::Schema` for a missing column or an empty table,
/// `Error::BoundsViolation` when the winner lies outside the schema.
pub fn best_from_table(table: &Table, schema: &ParameterSchema) -> Result<ParameterVector> {
    let mut best = ParameterVector::new();
    for name in schema.names() {
        let header = display_name(name);
        let column = table
            .get(&header)
            .ok_or_else(|| Error::schema(&header, "column missing from candidate table"))?;
        let value = *column
            .first()
            .ok_or_else(|| Error::schema(&header, "candidate table has no rows"))?;
        best.set(name, value);
    }
    schema.validate(&best)?;
    Ok(best)
}

/// Run the optimiser, write `params.csv` into `out_dir` and return the
/// ranked candidates with the validated winner.
///
/// # Errors
/// Optimiser failures, `Error::InvalidData` for an empty ranking, IO, and
/// `Error::BoundsViolation` when the optimiser broke its bounds guarantee.
#[allow(clippy::too_many_arguments)]
pub fn search<O: Optimiser + ?Sized>(
    optimiser: &mut O,
    surrogate: &dyn Surrogate,
    reference: &Reference,
    schema: &ParameterSchema,
    objective: &Objective,
    settings: &SearchSettings,
    warm_start: Option<&ParameterVector>,
    out_dir: &Path,
) -> Result<(Vec<Candidate>, ParameterVector)> {
    let candidates = optimiser.optimise(surrogate, reference, schema, objective, settings, warm_start)?;
    if candidates.is_empty() {
        return Err(Error::InvalidData("optimiser returned no candidates".to_string()));
    }
    let table = candidate_table(&candidates, schema)?;
    csv::write_table(out_dir.join(CANDIDATES_FILE), &table)?;
    let best = best_from_table(&table, schema)?;
    info!(total = candidates[0].objective.total, ranked = candidates.len(), "search finished");
    Ok((candidates, best))
}
