/*!
`asmbo`: adaptive surrogate-model-based optimisation, a closed-loop
calibration harness around an expensive simulator.

What it does
- Calibrates a fixed, bounded parameter set Θ so that a high-fidelity
  simulation reproduces an experimental reference curve.
- Runs rounds of `train → assess → optimise → evaluate → extract → fuse`:
  * fit a surrogate to the accumulated corpus,
  * re-score earlier optima on it and pick a warm start,
  * search the surrogate for the best Θ (always inside bounds),
  * run the expensive oracle once at that Θ,
  * resample its response into a training record,
  * fuse the record into the corpus for the next round.
- Threads `CampaignState { corpus, history, next_round }` explicitly between
  rounds and persists each completed round so a campaign can resume.

How to use (call surface only)
- Describe the campaign in a `CampaignConfig` (JSON) and load the
  experimental `Reference`.
- Supply a `Trainer`, an `Optimiser` and an `Evaluator` (see `stages::sdk`;
  `GeneticOptimiser` and `CommandEvaluator` ship with the crate, `testkit`
  has deterministic fakes).
- Optionally bootstrap a seed corpus with `latin_hypercube` +
  `bootstrap_corpus`, then `Campaign::from_config(..)?.run(state)`.

What it does NOT do
- No surrogate architecture, no mandated metaheuristic, no solver or mesh
  format, no plotting. Those live behind the capability traits.
*/

pub mod campaign;
pub mod data;
pub mod error;
pub mod models;
pub mod numerics;
pub mod objective;
pub mod stages;
#[cfg(feature = "testkit")]
pub mod testkit;

pub use campaign::{Campaign, CampaignConfig, CampaignReport, CampaignState, FailurePolicy, RoundAbort, RoundPhase};
pub use error::{Error, Result};
