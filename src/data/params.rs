//! Parameter schemas and parameter vectors.

use serde::{Deserialize, Serialize};

use crate::numerics::control;
use crate::{Error, Result};

/// One tunable parameter and its admissible range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self { name: name.into(), lower, upper }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }
}

/// The fixed, ordered set of parameters a campaign calibrates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParamSpec>", into = "Vec<ParamSpec>")]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl TryFrom<Vec<ParamSpec>> for ParameterSchema {
    type Error = Error;

    fn try_from(params: Vec<ParamSpec>) -> Result<Self> {
        Self::new(params)
    }
}

impl From<ParameterSchema> for Vec<ParamSpec> {
    fn from(schema: ParameterSchema) -> Self {
        schema.params
    }
}

impl ParameterSchema {
    /// # Errors
    /// `Error::Config` for an empty schema, duplicate names or bad bounds.
    pub fn new(params: Vec<ParamSpec>) -> Result<Self> {
        if params.is_empty() {
            return Err(Error::Config("parameter schema is empty".to_string()));
        }
        for (i, p) in params.iter().enumerate() {
            if params[..i].iter().any(|q| q.name == p.name) {
                return Err(Error::Config(format!("parameter `{}` declared twice", p.name)));
            }
            if !(p.lower.is_finite() && p.upper.is_finite() && p.lower <= p.upper) {
                return Err(Error::Config(format!(
                    "parameter `{}` has invalid bounds [{}, {}]",
                    p.name, p.lower, p.upper
                )));
            }
        }
        Ok(Self { params })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn specs(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Check that `vector` names every schema parameter exactly once, nothing
    /// else, and that each value lies within bounds.
    ///
    /// # Errors
    /// `Error::Schema` for naming problems, `Error::BoundsViolation` for range problems.
    pub fn validate(&self, vector: &ParameterVector) -> Result<()> {
        for (i, (name, _)) in vector.entries.iter().enumerate() {
            if vector.entries[..i].iter().any(|(n, _)| n == name) {
                return Err(Error::schema(name, "parameter given more than once"));
            }
            if self.spec(name).is_none() {
                return Err(Error::schema(name, "parameter not declared in the schema"));
            }
        }
        for p in &self.params {
            let value = vector
                .get(&p.name)
                .ok_or_else(|| Error::schema(&p.name, "parameter missing from vector"))?;
            if !p.contains(value) {
                return Err(Error::BoundsViolation {
                    name: p.name.clone(),
                    value,
                    lower: p.lower,
                    upper: p.upper,
                });
            }
        }
        Ok(())
    }

    /// Validate and return a copy in schema order.
    ///
    /// # Errors
    /// See [`ParameterSchema::validate`].
    pub fn align(&self, vector: &ParameterVector) -> Result<ParameterVector> {
        self.validate(vector)?;
        Ok(self
            .params
            .iter()
            .map(|p| (p.name.clone(), vector.get(&p.name).unwrap_or(p.lower)))
            .collect())
    }

    /// Zip schema names with positional values.
    ///
    /// # Errors
    /// `Error::Schema` on a length mismatch, `Error::BoundsViolation` on range problems.
    pub fn vector(&self, values: &[f64]) -> Result<ParameterVector> {
        if values.len() != self.params.len() {
            return Err(Error::schema(
                "<parameters>",
                format!("expected {} values, got {}", self.params.len(), values.len()),
            ));
        }
        let v: ParameterVector =
            self.params.iter().zip(values).map(|(p, &x)| (p.name.clone(), x)).collect();
        self.validate(&v)?;
        Ok(v)
    }

    /// Project positional values into the box, in schema order.
    #[must_use]
    pub fn project(&self, values: &[f64]) -> ParameterVector {
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = values.get(i).copied().unwrap_or(p.lower);
                (p.name.clone(), control::project(x, p.lower, p.upper))
            })
            .collect()
    }

    /// Positional values of `vector` in schema order, projected into bounds;
    /// names the vector lacks fall back to the lower bound.
    #[must_use]
    pub fn coordinates(&self, vector: &ParameterVector) -> Vec<f64> {
        self.params
            .iter()
            .map(|p| control::project(vector.get(&p.name).unwrap_or(p.lower), p.lower, p.upper))
            .collect()
    }
}

/// Column header used for a parameter in candidate tables.
#[must_use]
pub fn display_name(name: &str) -> String {
    format!("Param ({name})")
}

/// Ordered `name -> value` mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterVector {
    entries: Vec<(String, f64)>,
}

impl ParameterVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces an existing entry of the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }
}

impl FromIterator<(String, f64)> for ParameterVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
