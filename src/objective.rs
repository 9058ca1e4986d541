//! Discrepancy between a predicted response and the experimental reference.
//!
//! Each [`ErrorTerm`] is computed on its own and the terms are combined by
//! the fixed weights carried in configuration. The optimiser and the
//! convergence assessor score candidates with the same [`Objective`], so a
//! warm-start seed is ranked exactly as the search would rank it.

use serde::{Deserialize, Serialize};

use crate::data::{euler_fields, Fields, Reference};
use crate::numerics::{geodesic, linspace, resample};
use crate::{Error, Result};

/// Curve discrepancies are evaluated on this many evenly spaced points.
pub const CURVE_EVAL_POINTS: usize = 50;

fn unit_weight() -> f64 {
    1.0
}

fn default_reference_x() -> String {
    "strain_intervals".to_string()
}

fn default_response_x() -> String {
    "strain".to_string()
}

/// One term of the calibration objective.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorTerm {
    /// Normalised RMS gap between the `y(x)` curves of reference and response.
    Curve {
        x: String,
        y: String,
        #[serde(default = "unit_weight")]
        weight: f64,
    },
    /// RMS misorientation of one grain's trajectory at fixed `x` positions.
    Geodesic {
        grain: u32,
        eval_x: Vec<f64>,
        #[serde(default = "default_reference_x")]
        reference_x: String,
        #[serde(default = "default_response_x")]
        response_x: String,
        #[serde(default = "unit_weight")]
        weight: f64,
    },
}

impl ErrorTerm {
    #[must_use]
    pub const fn weight(&self) -> f64 {
        match self {
            Self::Curve { weight, .. } | Self::Geodesic { weight, .. } => *weight,
        }
    }

    /// Column label in assessment tables.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Curve { y, .. } => format!("{y}_error"),
            Self::Geodesic { grain, .. } => format!("g{grain}_geodesic_error"),
        }
    }

    /// Unweighted value of this term.
    ///
    /// # Errors
    /// `Error::MissingField` when either side lacks a field the term reads,
    /// `Error::InvalidData` when a curve is empty.
    pub fn evaluate(&self, reference: &Reference, response: &Fields, max_x: f64) -> Result<f64> {
        match self {
            Self::Curve { x, y, .. } => {
                let (rx, ry) = (reference.field(x)?, reference.field(y)?);
                let (sx, sy) = (lookup(response, x)?, lookup(response, y)?);
                curve_error(rx, ry, sx, sy, max_x)
            }
            Self::Geodesic { grain, eval_x, reference_x, response_x, .. } => {
                if eval_x.is_empty() {
                    return Err(Error::InvalidData(format!("geodesic term for g{grain} has no evaluation points")));
                }
                let names = euler_fields(*grain);
                let rx = reference.field(reference_x)?;
                let sx = lookup(response, response_x)?;
                let mut ref_angles = Vec::with_capacity(3);
                let mut sim_angles = Vec::with_capacity(3);
                for name in &names {
                    ref_angles.push(resampled(rx, reference.field(name)?, eval_x, name)?);
                    sim_angles.push(resampled(sx, lookup(response, name)?, eval_x, name)?);
                }
                let sq: f64 = (0..eval_x.len())
                    .map(|i| {
                        let a = [ref_angles[0][i], ref_angles[1][i], ref_angles[2][i]];
                        let b = [sim_angles[0][i], sim_angles[1][i], sim_angles[2][i]];
                        geodesic(a, b).powi(2)
                    })
                    .sum();
                Ok((sq / eval_x.len() as f64).sqrt())
            }
        }
    }
}

fn lookup<'a>(fields: &'a Fields, name: &str) -> Result<&'a [f64]> {
    fields.get(name).map(Vec::as_slice).ok_or_else(|| Error::missing(name))
}

fn resampled(xs: &[f64], ys: &[f64], at: &[f64], name: &str) -> Result<Vec<f64>> {
    resample(xs, ys, at).ok_or_else(|| Error::InvalidData(format!("curve `{name}` is empty")))
}

fn curve_error(rx: &[f64], ry: &[f64], sx: &[f64], sy: &[f64], max_x: f64) -> Result<f64> {
    let top = |xs: &[f64]| xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let hi = top(rx).min(top(sx)).min(max_x);
    if !hi.is_finite() {
        return Err(Error::InvalidData("curve discrepancy over an empty strain range".to_string()));
    }
    let grid = linspace(0.0, hi.max(0.0), CURVE_EVAL_POINTS);
    let r = resampled(rx, ry, &grid, "reference")?;
    let s = resampled(sx, sy, &grid, "response")?;
    let n = grid.len() as f64;
    let gap = (r.iter().zip(&s).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / n).sqrt();
    let scale = (r.iter().map(|a| a * a).sum::<f64>() / n).sqrt();
    Ok(gap / scale.max(1e-12))
}

/// Per-term values and their weighted sum.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectiveValue {
    pub terms: Vec<f64>,
    pub total: f64,
}

impl ObjectiveValue {
    /// Total usable for ranking: non-finite totals sort last.
    #[must_use]
    pub fn rank_key(&self) -> f64 {
        if self.total.is_finite() { self.total } else { f64::INFINITY }
    }
}

/// Weighted multi-term discrepancy, truncated at `max_strain`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub terms: Vec<ErrorTerm>,
    pub max_strain: f64,
}

impl Objective {
    /// # Errors
    /// `Error::Config` for no terms, negative or non-finite weights, a
    /// non-positive strain cutoff or a geodesic term without points.
    pub fn validate(&self) -> Result<()> {
        if self.terms.is_empty() {
            return Err(Error::Config("objective has no error terms".to_string()));
        }
        if !(self.max_strain.is_finite() && self.max_strain > 0.0) {
            return Err(Error::Config(format!("max_strain must be positive, got {}", self.max_strain)));
        }
        for t in &self.terms {
            if !(t.weight().is_finite() && t.weight() >= 0.0) {
                return Err(Error::Config(format!("term `{}` has weight {}", t.label(), t.weight())));
            }
            if let ErrorTerm::Geodesic { grain, eval_x, .. } = t {
                if eval_x.is_empty() {
                    return Err(Error::Config(format!("geodesic term for g{grain} has no eval_x")));
                }
            }
        }
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.terms.iter().map(ErrorTerm::label)
    }

    /// Score one response.
    ///
    /// # Errors
    /// Propagates the first failing term.
    pub fn evaluate(&self, reference: &Reference, response: &Fields) -> Result<ObjectiveValue> {
        let terms = self
            .terms
            .iter()
            .map(|t| t.evaluate(reference, response, self.max_strain))
            .collect::<Result<Vec<_>>>()?;
        let total = self.terms.iter().zip(&terms).map(|(t, v)| t.weight() * v).sum();
        Ok(ObjectiveValue { terms, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Vec<f64>)]) -> Fields {
        pairs.iter().map(|(n, v)| ((*n).to_string(), v.clone())).collect()
    }

    fn reference() -> Reference {
        Reference::from_fields(fields(&[
            ("strain", vec![0.0, 0.05, 0.1]),
            ("stress", vec![0.0, 50.0, 100.0]),
            ("strain_intervals", vec![0.0, 0.1]),
            ("g1_phi_1", vec![0.1, 0.2]),
            ("g1_Phi", vec![0.5, 0.5]),
            ("g1_phi_2", vec![1.0, 1.0]),
        ]))
    }

    fn objective() -> Objective {
        Objective {
            terms: vec![
                ErrorTerm::Curve { x: "strain".into(), y: "stress".into(), weight: 2.0 },
                ErrorTerm::Geodesic {
                    grain: 1,
                    eval_x: vec![0.05, 0.1],
                    reference_x: "strain_intervals".into(),
                    response_x: "strain".into(),
                    weight: 1.0,
                },
            ],
            max_strain: 0.1,
        }
    }

    #[test]
    fn identical_response_scores_zero() {
        let response = fields(&[
            ("strain", vec![0.0, 0.1]),
            ("stress", vec![0.0, 100.0]),
            ("g1_phi_1", vec![0.1, 0.2]),
            ("g1_Phi", vec![0.5, 0.5]),
            ("g1_phi_2", vec![1.0, 1.0]),
        ]);
        let v = objective().evaluate(&reference(), &response).unwrap();
        assert!(v.total < 1e-6, "{v:?}");
    }

    #[test]
    fn weights_scale_terms() {
        let response = fields(&[
            ("strain", vec![0.0, 0.1]),
            ("stress", vec![0.0, 50.0]),
            ("g1_phi_1", vec![0.1, 0.2]),
            ("g1_Phi", vec![0.5, 0.5]),
            ("g1_phi_2", vec![1.0, 1.0]),
        ]);
        let v = objective().evaluate(&reference(), &response).unwrap();
        assert!(v.terms[0] > 0.1);
        assert!((v.total - (2.0 * v.terms[0] + v.terms[1])).abs() < 1e-12);
    }

    #[test]
    fn missing_response_field_is_named() {
        let response = fields(&[("strain", vec![0.0, 0.1])]);
        let err = objective().evaluate(&reference(), &response).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref field } if field == "stress"));
    }

    #[test]
    fn terms_deserialise_with_defaults() {
        let t: ErrorTerm = serde_json::from_str(r#"{"kind":"geodesic","grain":207,"eval_x":[0.02,0.04]}"#).unwrap();
        assert_eq!(t.weight(), 1.0);
        assert_eq!(t.label(), "g207_geodesic_error");
        assert!(objective().validate().is_ok());
    }
}
