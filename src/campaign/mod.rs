// src/campaign/mod.rs

// Round orchestration: configuration, directory layout, the controller and
// the hook protocol observers plug into.

pub mod config;
pub mod controller;
pub mod layout;
#[cfg(feature = "sampler-lhs")]
pub mod sampling;
pub mod sdk;

pub use config::{CampaignConfig, EvaluationSettings, FailurePolicy};
pub use controller::{Campaign, CampaignReport, CampaignState, RoundAbort, RoundOutcome, RoundState};
pub use layout::{CampaignLayout, RoundPaths};
#[cfg(feature = "sampler-lhs")]
pub use sampling::{bootstrap_corpus, latin_hypercube};
pub use sdk::{PhaseLog, RoundHook, RoundPhase};
