use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_RNG_SEED;

/// Runtime options for the forge (not reference data).
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Directory holding the RON reference data
    pub data_dir: PathBuf,
    pub rng_seed: u64,
    /// Watch `data_dir` and swap in new reference data on change
    pub hot_reload: bool,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("config"),
            rng_seed: DEFAULT_RNG_SEED,
            hot_reload: false,
        }
    }
}
