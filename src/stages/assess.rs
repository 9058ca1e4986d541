//! Convergence assessment: pick a warm-start seed from previous optima.
//!
//! Every earlier round's best parameters are re-scored on the freshly
//! retrained surrogate with the optimiser's own objective. The best one
//! seeds the next search. It is never blended and never authoritative.

use std::path::Path;

use tracing::debug;

use super::sdk::Surrogate;
use crate::data::{csv, Column, ParameterSchema, ParameterVector, Reference, Table};
use crate::objective::{Objective, ObjectiveValue};
use crate::Result;

/// Error table written next to the surrogate.
pub const ASSESSMENT_FILE: &str = "errors.csv";

/// Chosen seed plus the scores of the whole history.
#[derive(Clone, Debug, PartialEq)]
pub struct WarmStart {
    /// Copy of `history[history_index]`.
    pub params: ParameterVector,
    pub history_index: usize,
    /// One score per history entry, in history order.
    pub scores: Vec<ObjectiveValue>,
}

/// Score every historical optimum on `surrogate`; `None` on a cold start.
/// Ties go to the earliest entry.
///
/// # Errors
/// Schema errors for a history entry that no longer fits the schema, and
/// surrogate or objective failures.
pub fn assess(
    history: &[ParameterVector],
    surrogate: &dyn Surrogate,
    reference: &Reference,
    objective: &Objective,
    schema: &ParameterSchema,
) -> Result<Option<WarmStart>> {
    if history.is_empty() {
        return Ok(None);
    }
    let mut scores = Vec::with_capacity(history.len());
    for params in history {
        let aligned = schema.align(params)?;
        let response = surrogate.respond(&aligned)?;
        scores.push(objective.evaluate(reference, &response)?);
    }
    let mut best = 0;
    for (i, s) in scores.iter().enumerate().skip(1) {
        if s.rank_key() < scores[best].rank_key() {
            best = i;
        }
    }
    debug!(seed = best, total = scores[best].total, "warm start selected");
    Ok(Some(WarmStart { params: history[best].clone(), history_index: best, scores }))
}

/// Tabulate history scores: `iteration`, parameters, one column per term, `total`.
///
/// # Errors
/// `Error::Schema` when `history` and `scores` disagree in length.
pub fn assessment_table(
    history: &[ParameterVector],
    scores: &[ObjectiveValue],
    schema: &ParameterSchema,
    objective: &Objective,
) -> Result<Table> {
    let rows = history.len().min(scores.len());
    let mut columns = vec![Column::new("iteration", (1..=rows).map(|i| i as f64).collect())];
    for name in schema.names() {
        columns.push(Column::new(
            name,
            history.iter().map(|p| p.get(name).unwrap_or(f64::NAN)).collect(),
        ));
    }
    for (k, label) in objective.labels().enumerate() {
        columns.push(Column::new(label, scores.iter().map(|s| s.terms.get(k).copied().unwrap_or(f64::NAN)).collect()));
    }
    columns.push(Column::new("total", scores.iter().map(|s| s.total).collect()));
    Table::from_columns(columns)
}

/// Persist [`assessment_table`] as `out_dir/errors.csv`.
///
/// # Errors
/// Table construction and IO failures.
pub fn write_assessment(
    out_dir: &Path,
    history: &[ParameterVector],
    warm: &WarmStart,
    schema: &ParameterSchema,
    objective: &Objective,
) -> Result<()> {
    let table = assessment_table(history, &warm.scores, schema, objective)?;
    csv::write_table(out_dir.join(ASSESSMENT_FILE), &table)
}
