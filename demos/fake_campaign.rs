// demos/fake_campaign.rs
// Run with:
//   RUST_LOG=asmbo=debug cargo run --example fake_campaign
//
// A complete campaign over the analytic fakes: Latin-hypercube seed corpus,
// four rounds of train → assess → optimise → evaluate → extract → fuse.
// Re-running resumes from the results tree left by the previous run.

use std::cell::RefCell;
use std::rc::Rc;

use asmbo::campaign::{bootstrap_corpus, latin_hypercube, PhaseLog};
use asmbo::data::ParameterVector;
use asmbo::stages::GeneticOptimiser;
use asmbo::testkit::{Analytic, FakeEvaluator, FakeTrainer};
use asmbo::{Campaign, CampaignConfig, CampaignState};
use tracing_subscriber::EnvFilter;

fn main() -> asmbo::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let root = std::env::temp_dir().join("asmbo-demo");
    let config = CampaignConfig::from_json(&format!(
        r#"{{
            "reference": "synthetic",
            "mesh": "617_s3.e",
            "model": "vh",
            "rounds": 4,
            "initial_samples": 6,
            "search": {{ "generations": 60, "population": 40, "offspring": 40, "seed": 2024 }},
            "objective": [{{ "kind": "curve", "x": "strain", "y": "stress" }}],
            "results_root": {root:?},
            "prefix": "demo"
        }}"#
    ))?;

    // The "experiment" is the analytic law at a hidden parameter setting.
    let law = Analytic::new(config.schema()?);
    let truth = ParameterVector::new()
        .with("cp_tau_s", 1_200.0)
        .with("cp_b", 3.0)
        .with("cp_tau_0", 140.0)
        .with("cp_n", 9.0);
    let reference = law.reference(&truth, 0.1);

    let progress = Rc::new(RefCell::new(PhaseLog::default()));
    let mut campaign = Campaign::from_config(
        &config,
        reference,
        FakeTrainer::new(law.clone(), 3),
        GeneticOptimiser,
        FakeEvaluator::new(law),
    )?
    .with_hook(Box::new(Rc::clone(&progress)));

    let state = match CampaignState::resume(campaign.layout(), campaign.schema())? {
        Some(state) => state,
        None => {
            let samples = latin_hypercube(campaign.schema(), config.initial_samples, 7);
            let extractor = campaign.extractor().clone();
            let request = campaign.request().clone();
            let layout = campaign.layout().clone();
            CampaignState::new(bootstrap_corpus(campaign.evaluator_mut(), &extractor, &samples, &layout, &request)?)
        }
    };

    let report = campaign.run(state);

    println!("results under {}", campaign.layout().root().display());
    for outcome in &report.completed {
        println!(
            "round {}: predicted error {:.4}, warm start {:?}, corpus {} rows",
            outcome.round,
            outcome.predicted.total,
            outcome.warm_start,
            outcome.corpus.num_rows()
        );
    }
    for abort in &report.aborted {
        println!("{abort}");
    }
    if let Some(best) = report.best() {
        for (name, value) in best.iter() {
            println!("  {name:>10} = {value:>10.3}   (truth {:.3})", truth.get(name).unwrap_or(f64::NAN));
        }
    }
    println!("phases observed: {}", progress.borrow().events.len());
    Ok(())
}
