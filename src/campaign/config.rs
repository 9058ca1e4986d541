//! Campaign configuration, loaded once from JSON and never mutated.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::controller::CampaignState;
use super::layout::CampaignLayout;
use crate::data::{csv, ParameterSchema, Reference};
use crate::models;
use crate::objective::{ErrorTerm, Objective};
use crate::stages::{CommandEvaluator, CommandSettings, EvaluationRequest, ExtractionSettings, SearchSettings};
use crate::{Error, Result};

/// Reference column whose last entry bounds the calibrated strain range.
pub const STRAIN_INTERVALS: &str = "strain_intervals";

/// What happens after a round aborts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the campaign at the first aborted round.
    #[default]
    Halt,
    /// Continue with the next round after a training or evaluation failure.
    /// Contract violations still halt.
    SkipRound,
}

/// Oracle budget per evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    pub workers: usize,
    pub time_budget_secs: f64,
    /// External solver; `None` when the caller supplies its own evaluator.
    pub command: Option<CommandSettings>,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self { workers: 1, time_budget_secs: 3_600.0, command: None }
    }
}

fn default_results_root() -> PathBuf {
    PathBuf::from("results")
}

/// Everything a campaign needs besides its collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Experimental reference CSV.
    pub reference: PathBuf,
    /// Seed corpus CSV; without it the campaign starts from an empty corpus
    /// (bootstrap it with `campaign::sampling`).
    #[serde(default)]
    pub initial_corpus: Option<PathBuf>,
    pub mesh: PathBuf,
    /// Material model preset (`vh`, `lh2`, `lh6`). Exclusive with `params`.
    #[serde(default)]
    pub model: Option<String>,
    /// Explicit parameter schema. Exclusive with `model`.
    #[serde(default)]
    pub params: Option<ParameterSchema>,
    /// Overrides the preset's solver material model.
    #[serde(default)]
    pub material_model: Option<String>,
    pub rounds: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    pub objective: Vec<ErrorTerm>,
    /// Number of Latin-hypercube samples for an empty seed corpus.
    #[serde(default)]
    pub initial_samples: usize,
    #[serde(default = "default_results_root")]
    pub results_root: PathBuf,
    /// Directory prefix; `None` stamps the start time.
    #[serde(default)]
    pub prefix: Option<String>,
}

impl CampaignConfig {
    /// # Errors
    /// `Error::Json` for malformed input, `Error::Config` from [`Self::validate`].
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// IO failures and the errors of [`Self::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading campaign configuration");
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// # Errors
    /// `Error::Config` naming the first inconsistent setting.
    pub fn validate(&self) -> Result<()> {
        self.schema()?;
        self.material_model()?;
        self.search.validate()?;
        if self.evaluation.workers == 0 {
            return Err(Error::Config("evaluation.workers must be positive".to_string()));
        }
        let budget = self.evaluation.time_budget_secs;
        if !(budget.is_finite() && budget > 0.0) {
            return Err(Error::Config(format!("evaluation.time_budget_secs must be positive, got {budget}")));
        }
        if self.extraction.num_samples == 0 {
            return Err(Error::Config("extraction.num_samples must be positive".to_string()));
        }
        let probe = Objective { terms: self.objective.clone(), max_strain: self.extraction.max_strain.unwrap_or(1.0) };
        probe.validate()
    }

    /// The calibrated schema, from `params` or the `model` preset.
    ///
    /// # Errors
    /// `Error::Config` when neither or both are given, or the preset is unknown.
    pub fn schema(&self) -> Result<ParameterSchema> {
        match (&self.params, &self.model) {
            (Some(schema), None) => Ok(schema.clone()),
            (None, Some(name)) => Ok(models::preset(name)?.schema),
            (None, None) => Err(Error::Config("either `model` or `params` is required".to_string())),
            (Some(_), Some(_)) => Err(Error::Config("`model` and `params` are mutually exclusive".to_string())),
        }
    }

    /// # Errors
    /// `Error::Config` when no material model can be determined.
    pub fn material_model(&self) -> Result<String> {
        if let Some(m) = &self.material_model {
            return Ok(m.clone());
        }
        match &self.model {
            Some(name) => Ok(models::preset(name)?.material_model.to_string()),
            None => Err(Error::Config("`material_model` is required with explicit `params`".to_string())),
        }
    }

    /// Configured cutoff, else the reference's final strain interval.
    ///
    /// # Errors
    /// `Error::MissingField`/`Error::InvalidData` from the reference.
    pub fn max_strain(&self, reference: &Reference) -> Result<f64> {
        match self.extraction.max_strain {
            Some(m) => Ok(m),
            None => reference.last(STRAIN_INTERVALS),
        }
    }

    /// # Errors
    /// See [`Self::max_strain`].
    pub fn objective(&self, reference: &Reference) -> Result<Objective> {
        let objective = Objective { terms: self.objective.clone(), max_strain: self.max_strain(reference)? };
        objective.validate()?;
        Ok(objective)
    }

    /// # Errors
    /// See [`Self::material_model`].
    pub fn request(&self) -> Result<EvaluationRequest> {
        Ok(EvaluationRequest {
            mesh: self.mesh.clone(),
            material_model: self.material_model()?,
            time_budget: Duration::from_secs_f64(self.evaluation.time_budget_secs),
            workers: self.evaluation.workers,
        })
    }

    /// # Errors
    /// IO and CSV errors reading `reference`.
    pub fn load_reference(&self) -> Result<Reference> {
        debug!(path = %self.reference.display(), "loading reference");
        Reference::load(&self.reference)
    }

    /// Process-backed oracle when `evaluation.command` is set.
    #[must_use]
    pub fn command_evaluator(&self) -> Option<CommandEvaluator> {
        self.evaluation.command.clone().map(CommandEvaluator::new)
    }

    /// Layout of a new campaign. Without a fixed `prefix` every call stamps
    /// the current time, so pass [`Self::resume_layout`] to
    /// [`CampaignState::resume`] instead.
    #[must_use]
    pub fn layout(&self) -> CampaignLayout {
        match &self.prefix {
            Some(prefix) => CampaignLayout::new(&self.results_root, prefix.as_str()),
            None => CampaignLayout::timestamped(&self.results_root),
        }
    }

    /// Layout of the campaign to pick up: the fixed `prefix`, else the newest
    /// timestamped campaign under `results_root`, else a fresh stamp.
    ///
    /// # Errors
    /// IO failures listing `results_root`.
    pub fn resume_layout(&self) -> Result<CampaignLayout> {
        if self.prefix.is_some() {
            return Ok(self.layout());
        }
        Ok(CampaignLayout::latest(&self.results_root)?.unwrap_or_else(|| self.layout()))
    }

    /// Fresh state from `initial_corpus`, or an empty corpus.
    ///
    /// # Errors
    /// IO and CSV errors reading the seed corpus.
    pub fn initial_state(&self) -> Result<CampaignState> {
        let corpus = match &self.initial_corpus {
            Some(path) => csv::read_table(path)?,
            None => crate::data::Corpus::new(),
        };
        Ok(CampaignState::new(corpus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "reference": "exp.csv",
        "mesh": "617_s3.e",
        "model": "vh",
        "rounds": 5,
        "objective": [{ "kind": "curve", "x": "strain", "y": "stress" }]
    }"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let c = CampaignConfig::from_json(MINIMAL).unwrap();
        assert_eq!(c.failure_policy, FailurePolicy::Halt);
        assert_eq!(c.search, SearchSettings::default());
        assert_eq!(c.extraction.num_samples, 32);
        assert_eq!(c.material_model().unwrap(), "deer/cpvh_ae");
        assert_eq!(c.schema().unwrap().len(), 4);
        assert_eq!(c.request().unwrap().workers, 1);
    }

    #[test]
    fn schema_sources_are_exclusive() {
        let both = MINIMAL.replace(
            r#""model": "vh","#,
            r#""model": "vh", "params": [{"name": "a", "lower": 0, "upper": 1}],"#,
        );
        assert!(matches!(CampaignConfig::from_json(&both), Err(Error::Config(_))));
        let neither = MINIMAL.replace(r#""model": "vh","#, "");
        assert!(matches!(CampaignConfig::from_json(&neither), Err(Error::Config(_))));
    }

    #[test]
    fn bad_search_rates_are_rejected() {
        let bad = MINIMAL.replace(r#""rounds": 5,"#, r#""rounds": 5, "search": {"mutation_rate": 1.5},"#);
        assert!(matches!(CampaignConfig::from_json(&bad), Err(Error::Config(_))));
    }

    #[test]
    fn command_evaluator_only_when_configured() {
        assert!(CampaignConfig::from_json(MINIMAL).unwrap().command_evaluator().is_none());
        let with = MINIMAL.replace(
            r#""rounds": 5,"#,
            r#""rounds": 5, "evaluation": {"command": {"program": "deer", "args": ["-i", "{mesh}"]}},"#,
        );
        assert!(CampaignConfig::from_json(&with).unwrap().command_evaluator().is_some());
    }

    #[test]
    fn reference_is_read_from_the_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.csv");
        fs::write(&path, "strain,stress,strain_intervals\n0,0,0.05\n0.1,100,0.1\n0.2,150,\n").unwrap();
        let mut c = CampaignConfig::from_json(MINIMAL).unwrap();
        c.reference = path;
        let reference = c.load_reference().unwrap();
        assert_eq!(reference.field("stress").unwrap(), [0.0, 100.0, 150.0]);
        assert_eq!(c.max_strain(&reference).unwrap(), 0.1);

        c.reference = dir.path().join("missing.csv");
        assert!(matches!(c.load_reference(), Err(Error::Io(_))));
    }

    #[test]
    fn unprefixed_campaigns_resume_the_newest_stamp() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("240305101500_i1_surrogate")).unwrap();
        let mut c = CampaignConfig::from_json(MINIMAL).unwrap();
        c.results_root = dir.path().to_path_buf();
        assert_eq!(c.resume_layout().unwrap().prefix(), "240305101500");
        c.prefix = Some("fixed".into());
        assert_eq!(c.resume_layout().unwrap().prefix(), "fixed");
    }

    #[test]
    fn failure_policy_is_snake_case() {
        let p: FailurePolicy = serde_json::from_str(r#""skip_round""#).unwrap();
        assert_eq!(p, FailurePolicy::SkipRound);
    }
}
