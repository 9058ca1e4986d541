// src/stages/mod.rs

// Stage operations of a round and the capability protocol they drive.

pub mod assess;
pub mod evaluate;
pub mod extract;
pub mod optimise;
pub mod sdk;
#[cfg(feature = "search-ga")]
pub mod search_ga;
pub mod train;

pub use assess::{assess, write_assessment, WarmStart};
pub use evaluate::{CommandEvaluator, CommandSettings};
pub use extract::{ExtractionSettings, FeatureExtractor};
pub use sdk::{Candidate, EvaluationRequest, Evaluator, HighFidelityResult, Optimiser, SearchSettings, Surrogate, Trainer};
#[cfg(feature = "search-ga")]
pub use search_ga::GeneticOptimiser;
