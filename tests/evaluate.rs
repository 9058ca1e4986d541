// tests/evaluate.rs
#![cfg(unix)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use asmbo::data::{read_history, ParameterVector};
use asmbo::stages::evaluate::SOLVER_PARAMS_FILE;
use asmbo::stages::{CommandEvaluator, CommandSettings, EvaluationRequest, Evaluator};
use asmbo::Error;

fn shell(script: &str) -> CommandEvaluator {
    CommandEvaluator::new(CommandSettings {
        program: PathBuf::from("sh"),
        args: vec!["-c".into(), script.into()],
        summary_file: "summary.csv".into(),
        poll_interval_ms: 10,
    })
}

fn request(budget: Duration) -> EvaluationRequest {
    EvaluationRequest {
        mesh: PathBuf::from("617_s3.e"),
        material_model: "deer/cpvh_ae".into(),
        time_budget: budget,
        workers: 4,
    }
}

fn params() -> ParameterVector {
    ParameterVector::new().with("cp_tau_0", 120.5).with("cp_n", 7.0)
}

/* ──────────────────────────────────────────────────────────────────────────
1) Solver runs: templated arguments, parameters file, summary read back
────────────────────────────────────────────────────────────────────────── */

#[test]
fn solver_output_becomes_fields() {
    let dir = tempfile::tempdir().unwrap();
    let script = "printf 'average_strain,average_stress,workers\\n0,0,{workers}\\n0.1,250,\\n' > {output}/summary.csv \
                  && test -f {params} && test {material} = deer/cpvh_ae";
    let mut oracle = shell(script);

    let result = oracle.evaluate(&params(), &request(Duration::from_secs(30)), dir.path()).unwrap();

    assert_eq!(result.fields["average_stress"], vec![0.0, 250.0]);
    assert_eq!(result.fields["workers"], vec![4.0]);
    assert_eq!(result.params, params());
    assert_eq!(result.location, dir.path());
    assert_eq!(read_history(dir.path().join(SOLVER_PARAMS_FILE)).unwrap(), params());
}

/* ──────────────────────────────────────────────────────────────────────────
2) Failures: non-zero exit, missing summary and overrun are rejected
────────────────────────────────────────────────────────────────────────── */

#[test]
fn non_zero_exit_is_an_evaluation_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = shell("exit 3").evaluate(&params(), &request(Duration::from_secs(30)), dir.path()).unwrap_err();
    assert!(matches!(err, Error::Evaluation(_)), "{err}");
}

#[test]
fn missing_summary_is_an_evaluation_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = shell("true").evaluate(&params(), &request(Duration::from_secs(30)), dir.path()).unwrap_err();
    assert!(matches!(err, Error::Evaluation(_)), "{err}");
}

#[test]
fn overrunning_solver_is_killed() {
    let dir = tempfile::tempdir().unwrap();
    let started = Instant::now();
    let err = shell("sleep 30").evaluate(&params(), &request(Duration::from_millis(200)), dir.path()).unwrap_err();
    assert!(matches!(err, Error::Evaluation(ref m) if m.contains("time budget")), "{err}");
    assert!(started.elapsed() < Duration::from_secs(10));
}
