//! Offline checks for a reference data directory.
//!
//! `itemforge [DATA_DIR] [ENTITY_TYPE]` loads and validates the data, then
//! prints a tier distribution report as JSON. Exits non-zero when the data
//! fails to load or the sampled distribution does not match the weights.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use itemforge::balance::{run_tier_simulation, SimConfig};
use itemforge::config::load_reference_data;
use itemforge::engine::ForgeConfig;
use itemforge::logging::init_tracing_default;

fn main() -> Result<()> {
    init_tracing_default();

    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| ForgeConfig::default().data_dir);
    let entity_type = args.next();

    let data = load_reference_data(&data_dir)
        .with_context(|| format!("loading reference data from {}", data_dir.display()))?;

    let config = SimConfig {
        entity_type,
        ..Default::default()
    };
    let report = run_tier_simulation(&data, &config);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.consistent {
        bail!(
            "tier distribution does not match configured weights (max chi-squared {:.2})",
            report.max_chi_squared
        );
    }
    Ok(())
}
