//! Feature extraction: raw oracle output → one training record.

use serde::{Deserialize, Serialize};

use super::sdk::HighFidelityResult;
use crate::data::{broadcast, euler_fields, grains_in, Column, ParameterSchema, TrainingRecord};
use crate::numerics::{linspace, resample, round_sf, wrap_bunge};
use crate::{Error, Result};

/// Significant figures kept in extracted records.
pub const RECORD_SIG_FIGS: u32 = 5;

/// Field names and resampling grid of the extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub strain_field: String,
    pub stress_field: String,
    /// Samples per evaluation (N).
    pub num_samples: usize,
    /// Strain cutoff; `None` means the reference's final strain interval.
    pub max_strain: Option<f64>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            strain_field: "average_strain".to_string(),
            stress_field: "average_stress".to_string(),
            num_samples: 32,
            max_strain: None,
        }
    }
}

/// Resamples strain/stress/orientation curves onto N strains and broadcasts
/// the parameters alongside.
///
/// Output columns: schema parameters, strain, stress, then each detected
/// grain's `phi_1`, `Phi`, `phi_2`. Identical inputs give bit-identical
/// records.
#[derive(Clone, Debug)]
pub struct FeatureExtractor {
    strain_field: String,
    stress_field: String,
    num_samples: usize,
    max_strain: f64,
    schema: ParameterSchema,
}

impl FeatureExtractor {
    /// # Errors
    /// `Error::Config` for zero samples or a non-positive cutoff.
    pub fn new(settings: &ExtractionSettings, max_strain: f64, schema: ParameterSchema) -> Result<Self> {
        if settings.num_samples == 0 {
            return Err(Error::Config("num_samples must be positive".to_string()));
        }
        if !(max_strain.is_finite() && max_strain > 0.0) {
            return Err(Error::Config(format!("max_strain must be positive, got {max_strain}")));
        }
        Ok(Self {
            strain_field: settings.strain_field.clone(),
            stress_field: settings.stress_field.clone(),
            num_samples: settings.num_samples,
            max_strain,
            schema,
        })
    }

    #[must_use]
    pub const fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// # Errors
    /// `Error::MissingField` for absent strain, stress or Euler fields,
    /// `Error::InvalidData` when no strain lies under the cutoff, and the
    /// schema errors of the result's parameter vector.
    pub fn extract(&self, result: &HighFidelityResult) -> Result<TrainingRecord> {
        let field = |name: &str| {
            result.fields.get(name).map(Vec::as_slice).ok_or_else(|| Error::missing(name))
        };
        let strain = field(&self.strain_field)?;
        let stress = field(&self.stress_field)?;

        let cutoff = strain
            .iter()
            .copied()
            .filter(|s| *s <= self.max_strain)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "no `{}` sample at or below {}",
                    self.strain_field, self.max_strain
                ))
            })?;
        let grid: Vec<f64> = linspace(0.0, cutoff, self.num_samples + 1).into_iter().skip(1).collect();
        let resample_at = |ys: &[f64], name: &str| {
            resample(strain, ys, &grid)
                .ok_or_else(|| Error::InvalidData(format!("field `{name}` is empty")))
        };

        let params = self.schema.align(&result.params)?;
        let mut record = broadcast(&params, self.num_samples)?.into_columns();
        record.push(Column::new(self.strain_field.clone(), grid.clone()));
        record.push(Column::new(self.stress_field.clone(), resample_at(stress, &self.stress_field)?));

        for grain in grains_in(result.fields.keys().map(String::as_str)) {
            for name in euler_fields(grain) {
                let angles = resample_at(field(&name)?, &name)?;
                record.push(Column::new(name, angles.into_iter().map(wrap_bunge).collect()));
            }
        }

        for column in &mut record {
            for v in &mut column.values {
                *v = round_sf(*v, RECORD_SIG_FIGS);
            }
        }
        TrainingRecord::from_columns(record)
    }
}
