use std::fs;

use anyhow::{Context, Result};

use membrane_topology::IdentifyConfig;

use crate::cli::IdentifyOptions;

/// Loads the settings file (if any) and applies command-line overrides.
pub fn build_identify_config(opts: &IdentifyOptions) -> Result<IdentifyConfig> {
    let mut config = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            IdentifyConfig::from_toml_str(&text)
                .with_context(|| format!("Invalid settings file: {}", path.display()))?
        }
        None => IdentifyConfig::default(),
    };

    apply_overrides(&mut config, opts);
    config.validate().context("Invalid identification settings")?;
    Ok(config)
}

fn apply_overrides(config: &mut IdentifyConfig, opts: &IdentifyOptions) {
    if let Some(cutoff) = opts.cutoff {
        config.cutoff = cutoff;
    }
    if let Some(threshold) = opts.planarity_threshold {
        config.planarity_threshold = threshold;
    }
    if opts.pair_monolayers {
        config.pair_monolayers = true;
    }
    if opts.pairing_cutoff.is_some() {
        config.pairing_cutoff = opts.pairing_cutoff;
    }
}
