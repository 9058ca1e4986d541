//! High-fidelity evaluation through an external simulator process.
//!
//! [`CommandEvaluator`] writes the material parameters next to the run,
//! launches the solver with templated arguments and blocks until it exits.
//! A run that outlives its time budget is killed and reported as
//! `Error::Evaluation`; it is never left hanging.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::sdk::{EvaluationRequest, Evaluator, HighFidelityResult};
use crate::data::{csv, history, ParameterVector};
use crate::{Error, Result};

/// Material parameters handed to the solver.
pub const SOLVER_PARAMS_FILE: &str = "material_params.txt";
/// Solver stdout/stderr.
pub const SOLVER_LOG_FILE: &str = "simulation.log";

fn default_summary() -> String {
    "summary.csv".to_string()
}

fn default_poll_ms() -> u64 {
    500
}

/// How to launch the solver. Arguments may contain `{mesh}`, `{material}`,
/// `{params}`, `{output}` and `{workers}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSettings {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    /// Strain-indexed output the solver leaves in its output directory.
    #[serde(default = "default_summary")]
    pub summary_file: String,
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: u64,
}

/// [`Evaluator`] backed by an external process.
#[derive(Clone, Debug)]
pub struct CommandEvaluator {
    settings: CommandSettings,
}

impl CommandEvaluator {
    #[must_use]
    pub const fn new(settings: CommandSettings) -> Self {
        Self { settings }
    }

    fn render_args(&self, request: &EvaluationRequest, params_path: &Path, out_dir: &Path) -> Vec<String> {
        let mesh = request.mesh.display().to_string();
        let params = params_path.display().to_string();
        let output = out_dir.display().to_string();
        let workers = request.workers.to_string();
        self.settings
            .args
            .iter()
            .map(|a| {
                a.replace("{mesh}", &mesh)
                    .replace("{material}", &request.material_model)
                    .replace("{params}", &params)
                    .replace("{output}", &output)
                    .replace("{workers}", &workers)
            })
            .collect()
    }

    fn wait_within(&self, child: &mut std::process::Child, budget: Duration) -> Result<ExitStatus> {
        let started = Instant::now();
        let poll = Duration::from_millis(self.settings.poll_interval_ms.max(1));
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    let elapsed = started.elapsed();
                    if elapsed >= budget {
                        warn!(budget_secs = budget.as_secs_f64(), "solver over budget, killing");
                        // Kill can race a natural exit; either way the run is rejected.
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::Evaluation(format!(
                            "solver exceeded its time budget of {:.1}s",
                            budget.as_secs_f64()
                        )));
                    }
                    std::thread::sleep(poll.min(budget - elapsed));
                }
                Err(e) => return Err(Error::Evaluation(format!("cannot poll solver: {e}"))),
            }
        }
    }
}

impl Evaluator for CommandEvaluator {
    fn evaluate(
        &mut self,
        params: &ParameterVector,
        request: &EvaluationRequest,
        out_dir: &Path,
    ) -> Result<HighFidelityResult> {
        let params_path = out_dir.join(SOLVER_PARAMS_FILE);
        history::write_history(&params_path, params)?;

        let log = File::create(out_dir.join(SOLVER_LOG_FILE))?;
        let log_err = log.try_clone()?;
        let args = self.render_args(request, &params_path, out_dir);
        debug!(program = %self.settings.program.display(), ?args, "launching solver");

        let mut child = Command::new(&self.settings.program)
            .args(&args)
            .current_dir(out_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .spawn()
            .map_err(|e| {
                Error::Evaluation(format!("cannot launch `{}`: {e}", self.settings.program.display()))
            })?;

        let status = self.wait_within(&mut child, request.time_budget)?;
        if !status.success() {
            return Err(Error::Evaluation(format!(
                "solver exited with {status}; see {}",
                out_dir.join(SOLVER_LOG_FILE).display()
            )));
        }

        let summary = out_dir.join(&self.settings.summary_file);
        let fields = csv::read_fields(&summary)
            .map_err(|e| Error::Evaluation(format!("cannot read {}: {e}", summary.display())))?;
        Ok(HighFidelityResult { params: params.clone(), fields, location: out_dir.to_path_buf() })
    }
}
