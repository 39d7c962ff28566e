use std::path::Path;

use anyhow::{bail, Result};

use appreel_core::AppConfig;

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    AppConfig::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub fn show(config: &AppConfig, path: &Path) -> Result<()> {
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("defaults ({} not found)", path.display())
    };
    println!("# Configuration from {}\n", source);
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
