use std::path::Path;

use anyhow::{bail, Result};
use mecscale_core::MecscaleConfig;

pub fn init(path: &str) -> Result<String> {
    let output = Path::new(path).join("mecscale.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    std::fs::write(&output, MecscaleConfig::scaffold().to_toml_string()?)?;
    Ok(format!("✓ Generated {}", output.display()))
}
