pub mod hexagonize;
pub mod replay;
pub mod resolution;

use anyhow::{Context, Result};
use hexmap::HexConfig;

/// Configuration from `--config`, or the built-in defaults.
pub fn load_config(cli: &crate::cli::Cli) -> Result<HexConfig> {
    match &cli.config {
        Some(path) => HexConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(HexConfig::default()),
    }
}
