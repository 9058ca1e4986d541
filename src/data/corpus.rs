//! The training corpus and its fusion rule.
//!
//! A corpus only ever grows, by [`fuse`]-ing a freshly extracted record into
//! the previous round's corpus. The base corpus governs the schema:
//!
//! - fields in both: concatenated, base rows first;
//! - fields only in the new record: dropped (a later simulator emitting
//!   extra diagnostics cannot widen the corpus);
//! - fields only in the base: kept unchanged, which is only rectangular
//!   when the new record has no rows, so a non-empty record that lacks a
//!   base field is rejected with `Error::Schema`;
//! - an empty base (no columns) adopts the new record verbatim.

use std::collections::HashSet;

use tracing::debug;

use super::params::{ParameterSchema, ParameterVector};
use super::table::{Column, Table};
use crate::{Error, Result};

/// Growing columnar training data.
pub type Corpus = Table;

/// One high-fidelity evaluation expressed as corpus rows.
pub type TrainingRecord = Table;

/// Fuse `new` into `base`, returning the successor corpus. Neither input is
/// modified.
///
/// # Errors
/// `Error::Schema` naming a base field that a non-empty record lacks.
pub fn fuse(base: &Corpus, new: &TrainingRecord) -> Result<Corpus> {
    if base.is_empty() {
        return Ok(new.clone());
    }
    let added = new.num_rows();
    let mut columns = Vec::with_capacity(base.num_columns());
    for column in base.columns() {
        match new.get(&column.name) {
            Some(extra) => {
                let mut values = Vec::with_capacity(column.values.len() + extra.len());
                values.extend_from_slice(&column.values);
                values.extend_from_slice(extra);
                columns.push(Column::new(column.name.clone(), values));
            }
            None if added == 0 => columns.push(column.clone()),
            None => {
                return Err(Error::schema(
                    &column.name,
                    format!("present in the corpus but absent from a new record of {added} rows"),
                ));
            }
        }
    }
    for dropped in new.names().filter(|n| !base.contains(n)) {
        debug!(field = dropped, "dropping field absent from the corpus schema");
    }
    Table::from_columns(columns)
}

/// Parameter columns holding `params` repeated `rows` times, in vector order.
///
/// # Errors
/// `Error::Schema` if the vector repeats a name.
pub fn broadcast(params: &ParameterVector, rows: usize) -> Result<Table> {
    Table::from_columns(params.iter().map(|(n, v)| Column::new(n, vec![v; rows])).collect())
}

/// Number of distinct parameter settings (rows compared on the schema's
/// parameter columns only).
///
/// # Errors
/// `Error::Schema` if a schema parameter has no column.
pub fn distinct_settings(corpus: &Corpus, schema: &ParameterSchema) -> Result<usize> {
    if corpus.is_empty() {
        return Ok(0);
    }
    let columns = schema
        .names()
        .map(|name| corpus.get(name).ok_or_else(|| Error::schema(name, "parameter column missing from corpus")))
        .collect::<Result<Vec<_>>>()?;
    let settings: HashSet<Vec<u64>> = (0..corpus.num_rows())
        .map(|i| columns.iter().map(|c| c[i].to_bits()).collect())
        .collect();
    Ok(settings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::params::ParamSpec;

    #[test]
    fn base_only_field_survives_an_empty_record() {
        let base = Table::from_pairs([("a", vec![1.0]), ("b", vec![2.0])]).unwrap();
        let empty = Table::from_pairs([("a", Vec::new())]).unwrap();
        assert_eq!(fuse(&base, &empty).unwrap(), base);
    }

    #[test]
    fn non_empty_record_missing_a_base_field_is_rejected() {
        let base = Table::from_pairs([("a", vec![1.0]), ("b", vec![2.0])]).unwrap();
        let new = Table::from_pairs([("a", vec![3.0])]).unwrap();
        let err = fuse(&base, &new).unwrap_err();
        assert!(matches!(err, Error::Schema { ref field, .. } if field == "b"), "{err}");
    }

    #[test]
    fn distinct_settings_ignores_response_columns() {
        let schema = ParameterSchema::new(vec![ParamSpec::new("p", 0.0, 10.0)]).unwrap();
        let corpus =
            Table::from_pairs([("p", vec![1.0, 1.0, 2.0]), ("stress", vec![5.0, 6.0, 7.0])]).unwrap();
        assert_eq!(distinct_settings(&corpus, &schema).unwrap(), 2);
        assert_eq!(distinct_settings(&Table::new(), &schema).unwrap(), 0);
    }
}
