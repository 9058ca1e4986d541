// src/campaign/sdk.rs

//! # Campaign SDK
//!
//! Round-level glue: the phase state machine a round walks through and the
//! hook protocol that lets outside collaborators (progress reporting,
//! plotting, analysis) watch a campaign without touching the controller.
//!
//! ## Phases
//! A round is strictly sequential:
//!
//! `Idle → Training → Assessing → Optimising → Evaluating → Extracting → Fusing → Idle`
//!
//! There are no backward transitions. A failure in any phase aborts the
//! round at that phase (see `RoundAbort`); the corpus of earlier rounds is
//! left untouched because the successor corpus only exists after `Fusing`.
//!
//! ## Hooks
//! Implement [`RoundHook`] for optional observers. Every method has a no-op
//! default, so a hook overrides only what it needs:
//!
//! - `on_phase_start(round, phase)`: before a phase runs.
//! - `on_phase_end(round, phase, elapsed)`: after it succeeded.
//! - `on_round_end(outcome)`: after the fused corpus was persisted.
//! - `on_round_abort(abort)`: after a phase failed.
//!
//! Hooks observe. They cannot veto a phase or alter the state being
//! threaded between rounds; the campaign stays reproducible with or
//! without them.
//!
//! ## Adding a new observer
//! 1. Define a struct holding whatever it accumulates.
//! 2. `impl RoundHook for MyObserver { ... }` overriding the callbacks.
//! 3. `campaign.with_hook(Box::new(MyObserver::default()))`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::controller::{RoundAbort, RoundOutcome};

/// Position of a round inside its pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoundPhase {
    Idle,
    Training,
    Assessing,
    Optimising,
    Evaluating,
    Extracting,
    Fusing,
}

impl RoundPhase {
    /// Working phases in execution order.
    pub const PIPELINE: [Self; 6] =
        [Self::Training, Self::Assessing, Self::Optimising, Self::Evaluating, Self::Extracting, Self::Fusing];

    /// The only legal successor.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::Training,
            Self::Training => Self::Assessing,
            Self::Assessing => Self::Optimising,
            Self::Optimising => Self::Evaluating,
            Self::Evaluating => Self::Extracting,
            Self::Extracting => Self::Fusing,
            Self::Fusing => Self::Idle,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Training => "training",
            Self::Assessing => "assessing",
            Self::Optimising => "optimising",
            Self::Evaluating => "evaluating",
            Self::Extracting => "extracting",
            Self::Fusing => "fusing",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer of a running campaign.
pub trait RoundHook {
    fn on_phase_start(&mut self, _round: usize, _phase: RoundPhase) {}

    fn on_phase_end(&mut self, _round: usize, _phase: RoundPhase, _elapsed: Duration) {}

    fn on_round_end(&mut self, _outcome: &RoundOutcome) {}

    fn on_round_abort(&mut self, _abort: &RoundAbort) {}
}

/// Shared hooks: keep a handle outside the campaign and read it afterwards.
impl<H: RoundHook + ?Sized> RoundHook for Rc<RefCell<H>> {
    fn on_phase_start(&mut self, round: usize, phase: RoundPhase) {
        self.borrow_mut().on_phase_start(round, phase);
    }

    fn on_phase_end(&mut self, round: usize, phase: RoundPhase, elapsed: Duration) {
        self.borrow_mut().on_phase_end(round, phase, elapsed);
    }

    fn on_round_end(&mut self, outcome: &RoundOutcome) {
        self.borrow_mut().on_round_end(outcome);
    }

    fn on_round_abort(&mut self, abort: &RoundAbort) {
        self.borrow_mut().on_round_abort(abort);
    }
}

/// Records every callback; handy in tests and for post-mortems.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseLog {
    pub events: Vec<(usize, RoundPhase, bool)>,
    pub completed: Vec<usize>,
    pub aborted: Vec<(usize, RoundPhase)>,
}

impl RoundHook for PhaseLog {
    fn on_phase_start(&mut self, round: usize, phase: RoundPhase) {
        self.events.push((round, phase, false));
    }

    fn on_phase_end(&mut self, round: usize, phase: RoundPhase, _elapsed: Duration) {
        self.events.push((round, phase, true));
    }

    fn on_round_end(&mut self, outcome: &RoundOutcome) {
        self.completed.push(outcome.round);
    }

    fn on_round_abort(&mut self, abort: &RoundAbort) {
        self.aborted.push((abort.round, abort.phase));
    }
}
