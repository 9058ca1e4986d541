//! Initial corpus from a Latin-hypercube design.

use std::fs;

use bevy_prng::WyRand;
use rand_core::SeedableRng;
use tracing::{info, warn};

use super::layout::CampaignLayout;
use crate::data::{fuse, Corpus, ParameterSchema, ParameterVector};
use crate::numerics::{from_unit, shuffle, uniform01};
use crate::stages::{EvaluationRequest, Evaluator, FeatureExtractor};
use crate::{Error, Result};

/// `n` parameter vectors such that, on every axis, each of the `n` equal
/// strata of `[lower, upper]` holds exactly one sample.
#[must_use]
pub fn latin_hypercube(schema: &ParameterSchema, n: usize, seed: u64) -> Vec<ParameterVector> {
    let mut rng = WyRand::from_seed(seed.to_le_bytes());
    let axes: Vec<Vec<f64>> = schema
        .specs()
        .map(|spec| {
            let mut strata: Vec<usize> = (0..n).collect();
            shuffle(&mut rng, &mut strata);
            strata
                .into_iter()
                .map(|k| from_unit((k as f64 + uniform01(&mut rng)) / n as f64, spec.lower, spec.upper))
                .collect()
        })
        .collect();
    (0..n)
        .map(|i| schema.project(&axes.iter().map(|axis| axis[i]).collect::<Vec<_>>()))
        .collect()
}

/// Evaluate every sample in its own `{prefix}_i0_initial_{k}` directory and
/// fuse the extracted records into a seed corpus. Samples whose evaluation
/// fails are skipped with a warning.
///
/// # Errors
/// `Error::Evaluation` when no sample succeeds; extraction, fusion and IO
/// errors abort immediately.
pub fn bootstrap_corpus<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    extractor: &FeatureExtractor,
    samples: &[ParameterVector],
    layout: &CampaignLayout,
    request: &EvaluationRequest,
) -> Result<Corpus> {
    let mut corpus = Corpus::new();
    let mut evaluated = 0;
    for (k, params) in samples.iter().enumerate() {
        let dir = layout.initial(k);
        fs::create_dir_all(&dir)?;
        let result = match evaluator.evaluate(params, request, &dir) {
            Ok(result) => result,
            Err(e) if e.is_round_fatal() => {
                warn!(sample = k, error = %e, "initial sample failed, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };
        corpus = fuse(&corpus, &extractor.extract(&result)?)?;
        evaluated += 1;
        info!(sample = k + 1, of = samples.len(), rows = corpus.num_rows(), "initial sample fused");
    }
    if evaluated == 0 {
        return Err(Error::Evaluation(format!("none of {} initial samples could be evaluated", samples.len())));
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ParamSpec;

    #[test]
    fn zero_samples_is_empty() {
        let schema = ParameterSchema::new(vec![ParamSpec::new("a", 0.0, 1.0)]).unwrap();
        assert!(latin_hypercube(&schema, 0, 1).is_empty());
    }
}
