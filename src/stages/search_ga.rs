//! Reference [`Optimiser`]: a bounded (μ + λ) genetic search.
//!
//! Parents are chosen by binary tournament, recombined by a random blend
//! toward each other and mutated with a Gaussian step of a tenth of the
//! parameter span. Every child is projected back into the schema box, so
//! candidates never leave the declared bounds.

use std::time::{SystemTime, UNIX_EPOCH};

use bevy_prng::WyRand;
use rand_core::SeedableRng;
use tracing::debug;

use super::sdk::{Candidate, Optimiser, SearchSettings, Surrogate};
use crate::data::{ParameterSchema, ParameterVector, Reference};
use crate::numerics::{approach, bernoulli, gaussian01, index, project, uniform01, uniform_in};
use crate::objective::Objective;
use crate::Result;

/// Mutation step as a fraction of each parameter's span.
const MUTATION_SCALE: f64 = 0.1;

/// Population search over the surrogate. Stateless; all randomness comes
/// from `SearchSettings::seed`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneticOptimiser;

fn fresh_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn tournament(rng: &mut WyRand, pop: &[Candidate]) -> usize {
    let a = index(rng, pop.len());
    let b = index(rng, pop.len());
    if pop[b].objective.rank_key() < pop[a].objective.rank_key() { b } else { a }
}

impl Optimiser for GeneticOptimiser {
    fn optimise(
        &mut self,
        surrogate: &dyn Surrogate,
        reference: &Reference,
        schema: &ParameterSchema,
        objective: &Objective,
        settings: &SearchSettings,
        warm_start: Option<&ParameterVector>,
    ) -> Result<Vec<Candidate>> {
        settings.validate()?;
        let seed = settings.seed.unwrap_or_else(fresh_seed);
        debug!(seed, generations = settings.generations, population = settings.population, "genetic search");
        let mut rng = WyRand::from_seed(seed.to_le_bytes());
        let bounds: Vec<(f64, f64)> = schema.specs().map(|s| (s.lower, s.upper)).collect();

        let score = |genes: &[f64]| -> Result<Candidate> {
            let params = schema.project(genes);
            let response = surrogate.respond(&params)?;
            let objective = objective.evaluate(reference, &response)?;
            Ok(Candidate { params, objective })
        };

        let mut pop = Vec::with_capacity(settings.population + settings.offspring);
        if let Some(warm) = warm_start {
            pop.push(score(&schema.coordinates(warm))?);
        }
        while pop.len() < settings.population {
            let genes: Vec<f64> = bounds.iter().map(|&(lo, hi)| uniform_in(&mut rng, lo, hi)).collect();
            pop.push(score(&genes)?);
        }

        for _ in 0..settings.generations {
            let mut children = Vec::with_capacity(settings.offspring);
            for _ in 0..settings.offspring {
                let mut genes = schema.coordinates(&pop[tournament(&mut rng, &pop)].params);
                let father = schema.coordinates(&pop[tournament(&mut rng, &pop)].params);
                if bernoulli(&mut rng, settings.crossover_rate) {
                    for ((g, &f), &(lo, hi)) in genes.iter_mut().zip(&father).zip(&bounds) {
                        *g = approach(*g, f, uniform01(&mut rng), lo, hi);
                    }
                }
                for (g, &(lo, hi)) in genes.iter_mut().zip(&bounds) {
                    if bernoulli(&mut rng, settings.mutation_rate) {
                        *g += MUTATION_SCALE * (hi - lo) * gaussian01(&mut rng);
                    }
                    *g = project(*g, lo, hi);
                }
                children.push(score(&genes)?);
            }
            pop.extend(children);
            pop.sort_by(|a, b| a.objective.rank_key().total_cmp(&b.objective.rank_key()));
            pop.truncate(settings.population);
        }

        pop.sort_by(|a, b| a.objective.rank_key().total_cmp(&b.objective.rank_key()));
        Ok(pop)
    }
}
