// tests/sampling.rs
use asmbo::campaign::{bootstrap_corpus, latin_hypercube, CampaignLayout};
use asmbo::data::{ParamSpec, ParameterSchema};
use asmbo::stages::{EvaluationRequest, ExtractionSettings, FeatureExtractor};
use asmbo::testkit::{Analytic, FakeEvaluator};
use asmbo::Error;
use proptest::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

fn schema() -> ParameterSchema {
    ParameterSchema::new(vec![
        ParamSpec::new("cp_lh_0", 0.0, 1000.0),
        ParamSpec::new("cp_tau_0", 0.0, 500.0),
        ParamSpec::new("cp_n", 1.0, 20.0),
    ])
    .unwrap()
}

fn request() -> EvaluationRequest {
    EvaluationRequest {
        mesh: PathBuf::from("617_s3.e"),
        material_model: "deer/cplh_ae".into(),
        time_budget: Duration::from_secs(60),
        workers: 2,
    }
}

/* ──────────────────────────────────────────────────────────────────────────
1) Latin hypercube: one sample per stratum on every axis
────────────────────────────────────────────────────────────────────────── */

proptest! {
    #[test]
    fn every_stratum_is_hit_once(n in 1usize..40, seed in any::<u64>()) {
        let schema = schema();
        let samples = latin_hypercube(&schema, n, seed);
        prop_assert_eq!(samples.len(), n);
        for spec in schema.specs() {
            let mut hits = vec![0usize; n];
            for s in &samples {
                let x = s.get(&spec.name).unwrap();
                prop_assert!(spec.contains(x));
                let u = (x - spec.lower) / (spec.upper - spec.lower);
                hits[((u * n as f64) as usize).min(n - 1)] += 1;
            }
            prop_assert!(hits.iter().all(|&h| h == 1), "{}: {:?}", spec.name, hits);
        }
    }
}

#[test]
fn same_seed_same_design() {
    assert_eq!(latin_hypercube(&schema(), 8, 42), latin_hypercube(&schema(), 8, 42));
    assert_ne!(latin_hypercube(&schema(), 8, 42), latin_hypercube(&schema(), 8, 43));
}

/* ──────────────────────────────────────────────────────────────────────────
2) Bootstrap: evaluate, extract, fuse; failed samples skipped
────────────────────────────────────────────────────────────────────────── */

#[test]
fn bootstrap_skips_failed_samples() {
    let dir = tempfile::tempdir().unwrap();
    let layout = CampaignLayout::new(dir.path(), "seed");
    let extractor = FeatureExtractor::new(&ExtractionSettings::default(), 0.1, schema()).unwrap();
    let mut oracle = FakeEvaluator::new(Analytic::new(schema())).failing_on(&[2]);
    let samples = latin_hypercube(&schema(), 3, 5);

    let corpus = bootstrap_corpus(&mut oracle, &extractor, &samples, &layout, &request()).unwrap();

    assert_eq!(corpus.num_rows(), 2 * 32);
    assert_eq!(oracle.calls, 3);
    assert!(layout.initial(0).join("summary.csv").is_file());
    assert!(!layout.initial(1).join("summary.csv").exists());
}

#[test]
fn bootstrap_with_no_successes_is_an_evaluation_error() {
    let dir = tempfile::tempdir().unwrap();
    let layout = CampaignLayout::new(dir.path(), "seed");
    let extractor = FeatureExtractor::new(&ExtractionSettings::default(), 0.1, schema()).unwrap();
    let mut oracle = FakeEvaluator::new(Analytic::new(schema())).failing_on(&[1, 2]);
    let samples = latin_hypercube(&schema(), 2, 5);
    let err = bootstrap_corpus(&mut oracle, &extractor, &samples, &layout, &request()).unwrap_err();
    assert!(matches!(err, Error::Evaluation(_)));
}
