//! Crystal-plasticity material model presets.
//!
//! Each preset pairs a parameter schema with the solver material model that
//! goes with it.

use crate::data::{ParamSpec, ParameterSchema};
use crate::{Error, Result};

/// Schema and solver material model of one preset.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPreset {
    pub name: &'static str,
    pub schema: ParameterSchema,
    /// Material model handed to the solver.
    pub material_model: &'static str,
}

/// Known preset names.
pub const PRESETS: [&str; 3] = ["vh", "lh2", "lh6"];

fn power_law() -> [ParamSpec; 2] {
    [ParamSpec::new("cp_tau_0", 0.0, 500.0), ParamSpec::new("cp_n", 1.0, 20.0)]
}

fn latent(count: usize) -> Vec<ParamSpec> {
    (0..count).map(|i| ParamSpec::new(format!("cp_lh_{i}"), 0.0, 1000.0)).collect()
}

/// Look up a preset by name.
///
/// # Errors
/// `Error::Config` for an unknown name.
pub fn preset(name: &str) -> Result<ModelPreset> {
    let (specs, material_model, name) = match name {
        // Voce hardening
        "vh" => {
            let mut specs = vec![ParamSpec::new("cp_tau_s", 0.0, 2000.0), ParamSpec::new("cp_b", 0.0, 10.0)];
            specs.extend(power_law());
            (specs, "deer/cpvh_ae", "vh")
        }
        // latent hardening, 2 and 6 coefficients
        "lh2" => {
            let mut specs = latent(2);
            specs.extend(power_law());
            (specs, "deer/cplh_ae", "lh2")
        }
        "lh6" => {
            let mut specs = latent(6);
            specs.extend(power_law());
            (specs, "deer/cplh6_ae", "lh6")
        }
        other => {
            return Err(Error::Config(format!(
                "unknown material model preset `{other}` (known: {})",
                PRESETS.join(", ")
            )));
        }
    };
    Ok(ModelPreset { name, schema: ParameterSchema::new(specs)?, material_model })
}
