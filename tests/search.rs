// tests/search.rs
use asmbo::data::{ParamSpec, ParameterSchema, ParameterVector};
use asmbo::objective::{ErrorTerm, Objective};
use asmbo::stages::{assess, GeneticOptimiser, Optimiser, SearchSettings};
use asmbo::testkit::{Analytic, FakeSurrogate};
use proptest::prelude::*;

fn schema() -> ParameterSchema {
    ParameterSchema::new(vec![
        ParamSpec::new("cp_tau_0", 0.0, 500.0),
        ParamSpec::new("cp_n", 1.0, 20.0),
        ParamSpec::new("cp_b", 0.0, 10.0),
    ])
    .unwrap()
}

fn objective() -> Objective {
    Objective {
        terms: vec![ErrorTerm::Curve { x: "strain".into(), y: "stress".into(), weight: 1.0 }],
        max_strain: 0.1,
    }
}

fn truth() -> ParameterVector {
    ParameterVector::new().with("cp_tau_0", 120.0).with("cp_n", 8.0).with("cp_b", 2.5)
}

/* ──────────────────────────────────────────────────────────────────────────
1) Bounds guarantee: every candidate inside the schema box, whatever the
   seed and even when the warm start lies outside it
────────────────────────────────────────────────────────────────────────── */

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn candidates_stay_in_bounds(seed in any::<u64>(), wild in -1e4f64..1e4, mutation in 0.0f64..=1.0) {
        let law = Analytic::new(schema());
        let surrogate = FakeSurrogate::new(law.clone(), 0.1);
        let reference = law.reference(&truth(), 0.1);
        let settings = SearchSettings {
            generations: 5,
            population: 8,
            offspring: 8,
            mutation_rate: mutation,
            seed: Some(seed),
            ..SearchSettings::default()
        };
        let warm = ParameterVector::new().with("cp_tau_0", wild).with("cp_n", -wild).with("cp_b", wild);

        let out = GeneticOptimiser
            .optimise(&surrogate, &reference, &schema(), &objective(), &settings, Some(&warm))
            .unwrap();

        prop_assert!(!out.is_empty());
        for c in &out {
            prop_assert!(schema().validate(&c.params).is_ok(), "{:?}", c.params);
        }
    }
}

/* ──────────────────────────────────────────────────────────────────────────
2) Warm start: None on a cold start, otherwise exactly one history entry
────────────────────────────────────────────────────────────────────────── */

#[test]
fn cold_start_has_no_warm_start() {
    let law = Analytic::new(schema());
    let surrogate = FakeSurrogate::new(law.clone(), 0.0);
    let reference = law.reference(&truth(), 0.1);
    assert!(assess(&[], &surrogate, &reference, &objective(), &schema()).unwrap().is_none());
}

#[test]
fn warm_start_is_the_best_history_entry() {
    let law = Analytic::new(schema());
    let surrogate = FakeSurrogate::new(law.clone(), 0.0);
    let reference = law.reference(&truth(), 0.1);
    let far = ParameterVector::new().with("cp_tau_0", 490.0).with("cp_n", 19.0).with("cp_b", 9.0);
    let near = ParameterVector::new().with("cp_tau_0", 121.0).with("cp_n", 8.0).with("cp_b", 2.5);
    let history = vec![far.clone(), near.clone(), far];

    let warm = assess(&history, &surrogate, &reference, &objective(), &schema()).unwrap().unwrap();

    assert_eq!(warm.history_index, 1);
    assert_eq!(warm.params, near);
    assert_eq!(warm.scores.len(), 3);
    assert!(warm.scores[1].total < warm.scores[0].total);
}

#[test]
fn ties_go_to_the_earliest_entry() {
    let law = Analytic::new(schema());
    let surrogate = FakeSurrogate::new(law.clone(), 0.0);
    let reference = law.reference(&truth(), 0.1);
    let history = vec![truth(), truth()];
    let warm = assess(&history, &surrogate, &reference, &objective(), &schema()).unwrap().unwrap();
    assert_eq!(warm.history_index, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn warm_start_is_copied_never_blended(
        raw in prop::collection::vec((0.0f64..500.0, 1.0f64..20.0, 0.0f64..10.0), 1..6),
    ) {
        let law = Analytic::new(schema());
        let surrogate = FakeSurrogate::new(law.clone(), 0.05);
        let reference = law.reference(&truth(), 0.1);
        let history: Vec<ParameterVector> = raw
            .iter()
            .map(|&(t, n, b)| ParameterVector::new().with("cp_tau_0", t).with("cp_n", n).with("cp_b", b))
            .collect();

        let warm = assess(&history, &surrogate, &reference, &objective(), &schema()).unwrap().unwrap();

        prop_assert!(history.contains(&warm.params));
        prop_assert_eq!(&history[warm.history_index], &warm.params);
    }
}
