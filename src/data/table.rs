//! Rectangular columnar tables.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Ragged, name-keyed field data: raw simulator output, experimental
/// references and surrogate responses. Columns may differ in length.
pub type Fields = BTreeMap<String, Vec<f64>>;

/// One named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self { name: name.into(), values }
    }
}

/// Ordered set of equally long, uniquely named columns.
///
/// Every constructor and mutator checks the rectangular invariant, so a
/// `Table` value is always well-formed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Empty table (no columns, no rows).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from columns, rejecting duplicate names and ragged lengths.
    ///
    /// # Errors
    /// `Error::Schema` naming the first offending column.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for c in columns {
            table.push_column(c)?;
        }
        Ok(table)
    }

    /// Build from `(name, values)` pairs.
    ///
    /// # Errors
    /// See [`Table::from_columns`].
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Vec<f64>)>) -> Result<Self> {
        Self::from_columns(pairs.into_iter().map(|(n, v)| Column::new(n, v)).collect())
    }

    /// Append a column at the end.
    ///
    /// # Errors
    /// `Error::Schema` if the name exists or the length differs.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.contains(&column.name) {
            return Err(Error::schema(&column.name, "duplicate column"));
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != column.values.len() {
                return Err(Error::schema(
                    &column.name,
                    format!(
                        "length {} does not match `{}` ({})",
                        column.values.len(),
                        first.name,
                        first.values.len()
                    ),
                ));
            }
        }
        self.columns.push(column);
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.values.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of one row in column order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }

    /// Copy into the ragged representation.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        self.columns.iter().map(|c| (c.name.clone(), c.values.clone())).collect()
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}
