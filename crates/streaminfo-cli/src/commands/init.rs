//! Write a default config file.

use std::path::Path;

use anyhow::{Result, bail};
use streaminfo_core::Config;

pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists, not overwriting", path.display());
    }
    Config::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
