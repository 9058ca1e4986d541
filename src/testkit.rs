//! Deterministic stand-ins for the external collaborators.
//!
//! [`Analytic`] is a closed-form "material": stress grows linearly with
//! strain plus a saturating term, both scaled by where the parameters sit in
//! their bounds. [`FakeEvaluator`] runs it as the oracle, [`FakeSurrogate`]
//! reproduces it with a bias that shrinks as the corpus grows, so a campaign
//! over these fakes behaves like the real thing in miniature.

use std::path::Path;

use serde::Serialize;

use crate::data::{csv, Fields, ParameterSchema, ParameterVector, Reference, Table};
use crate::numerics::{linspace, to_unit};
use crate::objective::Objective;
use crate::stages::train::ensure_trainable;
use crate::stages::{
    Candidate, EvaluationRequest, Evaluator, HighFidelityResult, Optimiser, SearchSettings, Surrogate, Trainer,
};
use crate::{Error, Result};

/// Strain range every fake curve covers.
pub const FAKE_MAX_STRAIN: f64 = 0.2;
/// Points per fake curve.
pub const FAKE_POINTS: usize = 41;

/// Closed-form response over a schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Analytic {
    schema: ParameterSchema,
}

impl Analytic {
    #[must_use]
    pub const fn new(schema: ParameterSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    #[must_use]
    pub fn strains(&self) -> Vec<f64> {
        linspace(0.0, FAKE_MAX_STRAIN, FAKE_POINTS)
    }

    /// Stress at `strains` for `params`.
    #[must_use]
    pub fn stress(&self, params: &ParameterVector, strains: &[f64]) -> Vec<f64> {
        let units: Vec<f64> = self
            .schema
            .specs()
            .map(|s| to_unit(params.get(&s.name).unwrap_or(s.lower), s.lower, s.upper))
            .collect();
        let slope = 1_000.0 * (1.0 + units[0]);
        let rest = &units[1..];
        let plateau = 100.0 * (1.0 + rest.iter().sum::<f64>() / rest.len().max(1) as f64);
        strains.iter().map(|e| slope * e + plateau * (1.0 - (-e / 0.01).exp())).collect()
    }

    /// Reference curves produced by `truth`, with `strain_intervals` ending
    /// at `max_strain`.
    #[must_use]
    pub fn reference(&self, truth: &ParameterVector, max_strain: f64) -> Reference {
        let strains = self.strains();
        let stress = self.stress(truth, &strains);
        Reference::from_fields(Fields::from([
            ("strain".to_string(), strains),
            ("stress".to_string(), stress),
            ("strain_intervals".to_string(), linspace(0.0, max_strain, 5)),
        ]))
    }
}

#[derive(Serialize)]
struct ModelCard {
    rows: usize,
    settings: usize,
    bias: f64,
}

/// Trainer that refuses corpora with fewer than `min_settings` distinct
/// parameter settings.
#[derive(Clone, Debug)]
pub struct FakeTrainer {
    law: Analytic,
    min_settings: usize,
    pub calls: usize,
}

impl FakeTrainer {
    #[must_use]
    pub const fn new(law: Analytic, min_settings: usize) -> Self {
        Self { law, min_settings, calls: 0 }
    }
}

impl Trainer for FakeTrainer {
    type Model = FakeSurrogate;

    fn train(&mut self, corpus: &Table, schema: &ParameterSchema, out_dir: &Path) -> Result<FakeSurrogate> {
        self.calls += 1;
        let settings = ensure_trainable(corpus, schema, self.min_settings)?;
        let bias = 0.5 / (1.0 + settings as f64);
        let card = ModelCard { rows: corpus.num_rows(), settings, bias };
        std::fs::write(out_dir.join("model.json"), serde_json::to_string_pretty(&card)?)?;
        Ok(FakeSurrogate { law: self.law.clone(), bias })
    }
}

/// [`Analytic`] with a multiplicative bias.
#[derive(Clone, Debug)]
pub struct FakeSurrogate {
    law: Analytic,
    pub bias: f64,
}

impl FakeSurrogate {
    #[must_use]
    pub const fn new(law: Analytic, bias: f64) -> Self {
        Self { law, bias }
    }
}

impl Surrogate for FakeSurrogate {
    fn respond(&self, params: &ParameterVector) -> Result<Fields> {
        let strains = self.law.strains();
        let stress = self.law.stress(params, &strains).into_iter().map(|s| s * (1.0 + self.bias)).collect();
        Ok(Fields::from([("strain".to_string(), strains), ("stress".to_string(), stress)]))
    }
}

/// Oracle running [`Analytic`]. Writes `summary.csv` like a solver would.
#[derive(Clone, Debug)]
pub struct FakeEvaluator {
    law: Analytic,
    /// 1-based call numbers that fail with `Error::Evaluation`.
    pub fail_on: Vec<usize>,
    pub calls: usize,
}

impl FakeEvaluator {
    #[must_use]
    pub const fn new(law: Analytic) -> Self {
        Self { law, fail_on: Vec::new(), calls: 0 }
    }

    #[must_use]
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }
}

impl Evaluator for FakeEvaluator {
    fn evaluate(
        &mut self,
        params: &ParameterVector,
        request: &EvaluationRequest,
        out_dir: &Path,
    ) -> Result<HighFidelityResult> {
        self.calls += 1;
        if self.fail_on.contains(&self.calls) {
            return Err(Error::Evaluation(format!(
                "fake solver diverged on call {} ({})",
                self.calls, request.material_model
            )));
        }
        let strains = self.law.strains();
        let stress = self.law.stress(params, &strains);
        let table = Table::from_pairs([("average_strain", strains), ("average_stress", stress)])?;
        csv::write_table(out_dir.join("summary.csv"), &table)?;
        Ok(HighFidelityResult { params: params.clone(), fields: table.to_fields(), location: out_dir.to_path_buf() })
    }
}

/// Optimiser that always proposes `params`, scored on the surrogate.
#[derive(Clone, Debug)]
pub struct FixedOptimiser {
    pub params: ParameterVector,
    pub seen_warm_starts: Vec<Option<ParameterVector>>,
}

impl FixedOptimiser {
    #[must_use]
    pub const fn new(params: ParameterVector) -> Self {
        Self { params, seen_warm_starts: Vec::new() }
    }
}

impl Optimiser for FixedOptimiser {
    fn optimise(
        &mut self,
        surrogate: &dyn Surrogate,
        reference: &Reference,
        _schema: &ParameterSchema,
        objective: &Objective,
        _settings: &SearchSettings,
        warm_start: Option<&ParameterVector>,
    ) -> Result<Vec<Candidate>> {
        self.seen_warm_starts.push(warm_start.cloned());
        let response = surrogate.respond(&self.params)?;
        let objective = objective.evaluate(reference, &response)?;
        Ok(vec![Candidate { params: self.params.clone(), objective }])
    }
}
