//! Experimental reference data and the orientation field naming it shares
//! with simulator output.

use std::path::Path;

use super::csv;
use super::table::Fields;
use crate::{Error, Result};

/// Euler-angle suffixes of a tracked grain, in Bunge order.
pub const EULER_SUFFIXES: [&str; 3] = ["phi_1", "Phi", "phi_2"];

/// `g{grain}_phi_1`, `g{grain}_Phi`, `g{grain}_phi_2`.
#[must_use]
pub fn euler_fields(grain: u32) -> [String; 3] {
    EULER_SUFFIXES.map(|s| format!("g{grain}_{s}"))
}

/// Grain ids that have a `g{id}_phi_1` field, ascending.
pub fn grains_in<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<u32> {
    let mut ids: Vec<u32> = names
        .into_iter()
        .filter_map(|n| n.strip_prefix('g')?.strip_suffix("_phi_1")?.parse().ok())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Experimental curves the campaign calibrates against. Columns may be
/// ragged (stress sampled more densely than orientations).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reference {
    fields: Fields,
}

impl Reference {
    #[must_use]
    pub fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    /// # Errors
    /// IO and CSV parse failures.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_fields(csv::read_fields(path)?))
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// # Errors
    /// `Error::MissingField` when absent.
    pub fn field(&self, name: &str) -> Result<&[f64]> {
        self.fields.get(name).map(Vec::as_slice).ok_or_else(|| Error::missing(name))
    }

    /// Last sample of a field, e.g. the final strain interval.
    ///
    /// # Errors
    /// `Error::MissingField` when absent, `Error::InvalidData` when empty.
    pub fn last(&self, name: &str) -> Result<f64> {
        self.field(name)?
            .last()
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("reference field `{name}` is empty")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grain_detection() {
        let names = ["strain", "g207_phi_1", "g207_Phi", "g79_phi_1", "gx_phi_1", "g79_phi_2"];
        assert_eq!(grains_in(names), vec![79, 207]);
        assert_eq!(euler_fields(5)[1], "g5_Phi");
    }
}
