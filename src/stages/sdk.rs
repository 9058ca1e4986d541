// src/stages/sdk.rs

//! # Stages SDK
//!
//! Capability protocol for the four external collaborators a round drives.
//! The loop never looks inside them; it only relies on the contracts below,
//! so a neural surrogate, a genetic search and a finite-element solver can
//! be swapped for deterministic fakes (see `crate::testkit`) without the
//! controller noticing.
//!
//! ## The capabilities
//!
//! 1) **[`Trainer`]**: `(&Corpus, &ParameterSchema, out_dir) -> Model`
//!    - Fit a surrogate to the whole corpus. Fail with `Error::Training` when
//!      the corpus is too thin (see `stages::train::ensure_trainable`).
//!    - The returned model is an opaque [`Surrogate`] handle.
//!
//! 2) **[`Surrogate`]**: `(&ParameterVector) -> Fields`
//!    - Cheap prediction of the response curves at one parameter vector.
//!      Must return the strain axis and every field the objective reads.
//!
//! 3) **[`Optimiser`]**: `(&dyn Surrogate, &Reference, schema, objective, settings, warm) -> Vec<Candidate>`
//!    - Search the surrogate for low-discrepancy parameters. Candidates come
//!      back best-first and every candidate lies inside the schema bounds.
//!    - Budget is a fixed number of generations, not a convergence test.
//!    - Population searches are stochastic: runs repeat only when
//!      `SearchSettings::seed` is fixed.
//!    - A warm start is a hint; the search may move away from it.
//!
//! 4) **[`Evaluator`]**: `(&ParameterVector, &EvaluationRequest, out_dir) -> HighFidelityResult`
//!    - Blocking call into the expensive oracle. Any failure, including
//!      running past `EvaluationRequest::time_budget`, is `Error::Evaluation`.
//!    - May fan out internally over `workers`; the loop sees one call.
//!
//! ## Output locations
//! Every capability that writes files gets its own `out_dir`, allocated per
//! round and per stage by `campaign::layout`. Never write elsewhere.
//!
//! ## Retry
//! None of the capabilities is retried by the loop. Retrying is a caller
//! policy layered on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::{Corpus, Fields, ParameterSchema, ParameterVector, Reference};
use crate::objective::{Objective, ObjectiveValue};
use crate::{Error, Result};

/// Cheap approximate predictor.
pub trait Surrogate {
    /// Predicted response curves at `params`.
    fn respond(&self, params: &ParameterVector) -> Result<Fields>;
}

/// Fits a surrogate to the corpus.
pub trait Trainer {
    type Model: Surrogate;

    fn train(&mut self, corpus: &Corpus, schema: &ParameterSchema, out_dir: &Path) -> Result<Self::Model>;
}

/// Budget and operator rates of a population search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub generations: usize,
    pub population: usize,
    pub offspring: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Fixes the random stream; `None` draws a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            generations: 1_000,
            population: 100,
            offspring: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.01,
            seed: None,
        }
    }
}

impl SearchSettings {
    /// # Errors
    /// `Error::Config` for an empty population or rates outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(Error::Config("search population must be positive".to_string()));
        }
        for (name, rate) in [("crossover_rate", self.crossover_rate), ("mutation_rate", self.mutation_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::Config(format!("{name} must lie in [0, 1], got {rate}")));
            }
        }
        Ok(())
    }
}

/// One ranked search result.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub params: ParameterVector,
    pub objective: ObjectiveValue,
}

/// Searches a surrogate for parameters reproducing the reference.
pub trait Optimiser {
    /// Ranked candidates, best first, never empty on success.
    fn optimise(
        &mut self,
        surrogate: &dyn Surrogate,
        reference: &Reference,
        schema: &ParameterSchema,
        objective: &Objective,
        settings: &SearchSettings,
        warm_start: Option<&ParameterVector>,
    ) -> Result<Vec<Candidate>>;
}

/// What the oracle is asked to run, besides the parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub mesh: PathBuf,
    pub material_model: String,
    pub time_budget: Duration,
    pub workers: usize,
}

/// Raw oracle output, strain-indexed and keyed by field name.
#[derive(Clone, Debug, PartialEq)]
pub struct HighFidelityResult {
    /// Parameters the oracle actually ran with.
    pub params: ParameterVector,
    pub fields: Fields,
    /// Directory holding the raw artifacts.
    pub location: PathBuf,
}

/// The expensive ground-truth model.
pub trait Evaluator {
    fn evaluate(
        &mut self,
        params: &ParameterVector,
        request: &EvaluationRequest,
        out_dir: &Path,
    ) -> Result<HighFidelityResult>;
}
