use std::io::{self, Write};

use anyhow::{Context, Result};

use membrane_topology::IdentifyConfig;

pub fn run_defaults() -> Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", IdentifyConfig::default().to_toml_string())
        .context("Failed to write default settings")?;
    Ok(())
}
