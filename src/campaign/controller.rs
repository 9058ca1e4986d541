//! Round controller: drives train → assess → optimise → evaluate → extract
//! → fuse and threads the campaign state between rounds.
//!
//! The controller is a single sequential loop. State flows explicitly: a
//! round reads a [`CampaignState`] and, when it completes, yields the
//! material for its successor. Nothing is mutated in place, so an aborted
//! round leaves the previous corpus and history exactly as they were.

use std::fs;
use std::path::Path;
use std::time::Instant;

use thiserror::Error as ThisError;
use tracing::{error, info, info_span, warn};

use super::config::{CampaignConfig, FailurePolicy};
use super::layout::{CampaignLayout, RoundPaths};
use super::sdk::{RoundHook, RoundPhase};
use crate::data::{csv, fuse, read_history, write_history, Corpus, ParameterSchema, ParameterVector, Reference};
use crate::objective::{Objective, ObjectiveValue};
use crate::stages::{
    assess, optimise, train, write_assessment, EvaluationRequest, Evaluator, FeatureExtractor, Optimiser,
    SearchSettings, Trainer, WarmStart,
};
use crate::{Error, Result};

/// Fused corpus after a completed round.
pub const CORPUS_FILE: &str = "corpus.csv";
/// Best parameters of a completed round.
pub const BEST_PARAMS_FILE: &str = "params.txt";

/// State carried from one round to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignState {
    pub corpus: Corpus,
    /// Best parameters of every completed round, oldest first.
    pub history: Vec<ParameterVector>,
    /// Index of the round to run next (rounds count from 1).
    pub next_round: usize,
}

impl CampaignState {
    #[must_use]
    pub const fn new(corpus: Corpus) -> Self {
        Self { corpus, history: Vec::new(), next_round: 1 }
    }

    /// Successor after `outcome` completed.
    #[must_use]
    pub fn advance(mut self, outcome: &RoundOutcome) -> Self {
        self.corpus = outcome.corpus.clone();
        self.history.push(outcome.best.clone());
        self.next_round = outcome.round + 1;
        self
    }

    /// Successor after an aborted round was skipped.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.next_round += 1;
        self
    }

    /// Rebuild the state from a results tree. Completed rounds are those whose
    /// evaluation directory holds both `corpus.csv` and `params.txt`; the corpus
    /// is the latest one, the history every `params.txt` in round order.
    /// `None` when no round completed.
    ///
    /// # Errors
    /// IO and parse failures, and history entries that no longer fit `schema`.
    pub fn resume(layout: &CampaignLayout, schema: &ParameterSchema) -> Result<Option<Self>> {
        let mut history = Vec::new();
        let mut latest = None;
        let mut round = 1;
        while layout.round(round).any_exists() {
            let sim = layout.round(round).simulate;
            let (corpus, params) = (sim.join(CORPUS_FILE), sim.join(BEST_PARAMS_FILE));
            if corpus.is_file() && params.is_file() {
                history.push(schema.align(&read_history(&params)?)?);
                latest = Some(corpus);
            }
            round += 1;
        }
        let Some(corpus) = latest else {
            return Ok(None);
        };
        info!(completed = history.len(), next_round = round, "resuming campaign");
        Ok(Some(Self { corpus: csv::read_table(corpus)?, history, next_round: round }))
    }
}

/// Working state of one round. Created at round start and consumed by it.
#[derive(Clone, Debug)]
pub struct RoundState {
    pub index: usize,
    pub corpus: Corpus,
    pub warm_start: Option<WarmStart>,
    pub paths: RoundPaths,
}

/// A completed round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundOutcome {
    pub round: usize,
    /// Evaluated parameters, now the newest history entry.
    pub best: ParameterVector,
    /// Surrogate score of `best` when it was chosen.
    pub predicted: ObjectiveValue,
    /// History index of the warm-start seed, if any.
    pub warm_start: Option<usize>,
    /// Rows contributed by this round's evaluation.
    pub record_rows: usize,
    /// Fused successor corpus.
    pub corpus: Corpus,
    pub paths: RoundPaths,
}

/// A round that failed in `phase`.
#[derive(Debug, ThisError)]
#[error("round {round} aborted while {phase}: {error}")]
pub struct RoundAbort {
    pub round: usize,
    pub phase: RoundPhase,
    #[source]
    pub error: Error,
}

/// Result of [`Campaign::run`].
#[derive(Debug)]
pub struct CampaignReport {
    /// State to continue from; holds the last successfully fused corpus.
    pub state: CampaignState,
    pub completed: Vec<RoundOutcome>,
    pub aborted: Vec<RoundAbort>,
    /// True when an abort stopped the campaign before its round budget.
    pub halted: bool,
}

impl CampaignReport {
    /// Parameters of the most recent completed round.
    #[must_use]
    pub fn best(&self) -> Option<&ParameterVector> {
        self.state.history.last()
    }
}

/// The adaptive optimisation loop around three collaborators.
pub struct Campaign<T, O, E> {
    trainer: T,
    optimiser: O,
    evaluator: E,
    schema: ParameterSchema,
    reference: Reference,
    objective: Objective,
    search: SearchSettings,
    extractor: FeatureExtractor,
    request: EvaluationRequest,
    layout: CampaignLayout,
    rounds: usize,
    failure_policy: FailurePolicy,
    hooks: Vec<Box<dyn RoundHook>>,
}

impl<T: Trainer, O: Optimiser, E: Evaluator> Campaign<T, O, E> {
    /// # Errors
    /// `Error::Config` and reference errors while resolving the configuration.
    pub fn from_config(
        config: &CampaignConfig,
        reference: Reference,
        trainer: T,
        optimiser: O,
        evaluator: E,
    ) -> Result<Self> {
        config.validate()?;
        let schema = config.schema()?;
        let objective = config.objective(&reference)?;
        let extractor = FeatureExtractor::new(&config.extraction, objective.max_strain, schema.clone())?;
        Ok(Self {
            trainer,
            optimiser,
            evaluator,
            schema,
            reference,
            objective,
            search: config.search,
            extractor,
            request: config.request()?,
            layout: config.layout(),
            rounds: config.rounds,
            failure_policy: config.failure_policy,
            hooks: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn RoundHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn layout(&self) -> &CampaignLayout {
        &self.layout
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn request(&self) -> &EvaluationRequest {
        &self.request
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    fn abort(&mut self, round: usize, phase: RoundPhase, error: Error) -> RoundAbort {
        error!(round, %phase, %error, "round aborted");
        let abort = RoundAbort { round, phase, error };
        for h in &mut self.hooks {
            h.on_round_abort(&abort);
        }
        abort
    }

    fn phase<R>(
        &mut self,
        round: usize,
        phase: RoundPhase,
        run: impl FnOnce(&mut Self) -> Result<R>,
    ) -> std::result::Result<R, RoundAbort> {
        for h in &mut self.hooks {
            h.on_phase_start(round, phase);
        }
        let started = Instant::now();
        match run(self) {
            Ok(value) => {
                let elapsed = started.elapsed();
                info!(%phase, elapsed_ms = elapsed.as_millis() as u64, "phase finished");
                for h in &mut self.hooks {
                    h.on_phase_end(round, phase, elapsed);
                }
                Ok(value)
            }
            Err(error) => Err(self.abort(round, phase, error)),
        }
    }

    /// Run round `state.next_round` against `state`. The state is only read;
    /// apply the outcome with [`CampaignState::advance`].
    ///
    /// # Errors
    /// [`RoundAbort`] naming the phase that failed. A round whose directories
    /// already exist aborts in `Idle` without touching them.
    pub fn run_round(&mut self, state: &CampaignState) -> std::result::Result<RoundOutcome, RoundAbort> {
        let index = state.next_round;
        let span = info_span!("round", index);
        let _enter = span.enter();

        let paths = self.layout.round(index);
        if let Err(e) = paths.create() {
            return Err(self.abort(index, RoundPhase::Idle, e));
        }
        let mut round = RoundState { index, corpus: state.corpus.clone(), warm_start: None, paths };

        let model = self.phase(index, RoundPhase::Training, |c| {
            train::train_surrogate(&mut c.trainer, &round.corpus, &c.schema, &round.paths.train)
        })?;

        round.warm_start = self.phase(index, RoundPhase::Assessing, |c| {
            let warm = assess(&state.history, &model, &c.reference, &c.objective, &c.schema)?;
            if let Some(w) = &warm {
                write_assessment(&round.paths.train, &state.history, w, &c.schema, &c.objective)?;
            }
            Ok(warm)
        })?;

        let (candidates, best) = self.phase(index, RoundPhase::Optimising, |c| {
            optimise::search(
                &mut c.optimiser,
                &model,
                &c.reference,
                &c.schema,
                &c.objective,
                &c.search,
                round.warm_start.as_ref().map(|w| &w.params),
                &round.paths.optimise,
            )
        })?;

        let result = self.phase(index, RoundPhase::Evaluating, |c| {
            c.schema.validate(&best)?;
            c.evaluator.evaluate(&best, &c.request, &round.paths.simulate)
        })?;

        let record = self.phase(index, RoundPhase::Extracting, |c| c.extractor.extract(&result))?;

        let corpus = self.phase(index, RoundPhase::Fusing, |_| {
            let fused = fuse(&round.corpus, &record)?;
            persist(&round.paths.simulate, &fused, &best)?;
            Ok(fused)
        })?;

        let outcome = RoundOutcome {
            round: index,
            best,
            predicted: candidates[0].objective.clone(),
            warm_start: round.warm_start.as_ref().map(|w| w.history_index),
            record_rows: record.num_rows(),
            corpus,
            paths: round.paths,
        };
        info!(
            predicted = outcome.predicted.total,
            corpus_rows = outcome.corpus.num_rows(),
            "round complete"
        );
        for h in &mut self.hooks {
            h.on_round_end(&outcome);
        }
        Ok(outcome)
    }

    /// Run rounds until the budget is spent or the failure policy halts.
    ///
    /// An aborted round that created its directories is passed over under
    /// either policy, so `report.state` continues where
    /// [`CampaignState::resume`] would.
    pub fn run(&mut self, mut state: CampaignState) -> CampaignReport {
        let mut completed = Vec::new();
        let mut aborted = Vec::new();
        let mut halted = false;
        while state.next_round <= self.rounds {
            match self.run_round(&state) {
                Ok(outcome) => {
                    state = state.advance(&outcome);
                    completed.push(outcome);
                }
                Err(abort) => {
                    let skip = self.failure_policy == FailurePolicy::SkipRound && abort.error.is_round_fatal();
                    aborted.push(abort);
                    if skip || self.layout.round(state.next_round).any_exists() {
                        state = state.skip();
                    }
                    if !skip {
                        halted = true;
                        break;
                    }
                    warn!(round = state.next_round - 1, "skipped aborted round");
                }
            }
        }
        info!(completed = completed.len(), aborted = aborted.len(), halted, "campaign finished");
        CampaignReport { state, completed, aborted, halted }
    }
}

fn persist(dir: &Path, corpus: &Corpus, best: &ParameterVector) -> Result<()> {
    fs::create_dir_all(dir)?;
    csv::write_table(dir.join(CORPUS_FILE), corpus)?;
    write_history(dir.join(BEST_PARAMS_FILE), best)
}
