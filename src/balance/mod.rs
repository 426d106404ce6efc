//! Monte-Carlo tier distribution check.
//!
//! Rolls tier selection many times at a series of distance bands around the
//! world spawn and compares the observed tier frequencies with the normalized
//! distance weights. Bands run in parallel with rayon, each on its own RNG
//! seeded from the base seed and the band index, so a report is reproducible
//! regardless of thread scheduling.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ReferenceData;
use crate::engine::derive_seed;
use crate::logging::TimingSpan;
use crate::tier::{distance_weight, select_tier, Tier};

/// Standard normal quantile for a one-sided p of 0.0001
const Z_CRITICAL: f64 = 3.719;

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub samples_per_band: u64,
    /// Width of one band in blocks
    pub band_width: f64,
    pub band_count: u32,
    pub base_seed: u64,
    /// Restrict candidates to the tiers this entity type may roll
    pub entity_type: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            samples_per_band: 20_000,
            band_width: 250.0,
            band_count: 12,
            base_seed: 42,
            entity_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierFrequency {
    pub tier: String,
    pub count: u64,
    pub observed: f64,
    /// Normalized distance weight at the band's center
    pub expected: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandReport {
    /// Band center in blocks from spawn
    pub distance: f64,
    pub samples: u64,
    /// Rolls where no tier had positive weight
    pub empty_rolls: u64,
    /// Rolls that landed on a tier with zero expected weight
    pub impossible_rolls: u64,
    pub tiers: Vec<TierFrequency>,
    pub chi_squared: f64,
    pub degrees_of_freedom: u32,
}

impl BandReport {
    /// Is the observed distribution consistent with the weights?
    pub fn is_consistent(&self) -> bool {
        self.impossible_rolls == 0 && self.chi_squared <= chi_squared_critical(self.degrees_of_freedom)
    }
}

/// Results of a tier distribution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionReport {
    pub total_samples: u64,
    pub candidates: Vec<String>,
    pub bands: Vec<BandReport>,
    pub max_chi_squared: f64,
    pub consistent: bool,
}

impl DistributionReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Upper critical value of χ² for `df` degrees of freedom (Wilson-Hilferty).
pub fn chi_squared_critical(df: u32) -> f64 {
    if df == 0 {
        return 0.0;
    }
    let k = f64::from(df);
    let a = 2.0 / (9.0 * k);
    k * (1.0 - a + Z_CRITICAL * a.sqrt()).powi(3)
}

/// Normalized weights of `candidates` at `distance_squared`; all zero when
/// no candidate has positive weight.
pub fn expected_distribution(candidates: &[&Tier], distance_squared: f64) -> Vec<f64> {
    let weights: Vec<f64> = candidates
        .iter()
        .map(|t| distance_weight(t, distance_squared).max(0.0))
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![0.0; weights.len()];
    }
    weights.iter().map(|w| w / total).collect()
}

/// Run the simulation with rayon across distance bands
pub fn run_tier_simulation(data: &ReferenceData, config: &SimConfig) -> DistributionReport {
    let _span = TimingSpan::new("tier_simulation");
    let candidates: Vec<&Tier> = match &config.entity_type {
        Some(entity_type) => data.tiers_for_entity(entity_type),
        None => data.tiers.iter().collect(),
    };

    let bands: Vec<BandReport> = (0..config.band_count)
        .into_par_iter()
        .map(|band| simulate_band(&candidates, band, config))
        .collect();

    let max_chi_squared = bands.iter().map(|b| b.chi_squared).fold(0.0, f64::max);
    let consistent = bands.iter().all(BandReport::is_consistent);
    tracing::info!(
        bands = bands.len(),
        candidates = candidates.len(),
        max_chi_squared,
        consistent,
        "tier simulation finished"
    );

    DistributionReport {
        total_samples: config.samples_per_band * u64::from(config.band_count),
        candidates: candidates.iter().map(|t| t.name.clone()).collect(),
        bands,
        max_chi_squared,
        consistent,
    }
}

fn simulate_band(candidates: &[&Tier], band: u32, config: &SimConfig) -> BandReport {
    let distance = (f64::from(band) + 0.5) * config.band_width;
    let distance_squared = distance * distance;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(derive_seed(config.base_seed, &band.to_le_bytes()));

    let mut counts = vec![0u64; candidates.len()];
    let mut empty_rolls = 0;
    for _ in 0..config.samples_per_band {
        match select_tier(candidates, distance_squared, &mut rng) {
            Some(chosen) => {
                if let Some(i) = candidates.iter().position(|t| std::ptr::eq(*t, chosen)) {
                    counts[i] += 1;
                }
            }
            None => empty_rolls += 1,
        }
    }

    let expected = expected_distribution(candidates, distance_squared);
    let n = config.samples_per_band as f64;
    let mut chi_squared = 0.0;
    let mut impossible_rolls = 0;
    let mut live = 0u32;
    let tiers = candidates
        .iter()
        .zip(&counts)
        .zip(&expected)
        .map(|((tier, &count), &p)| {
            if p > 0.0 {
                let e = n * p;
                chi_squared += (count as f64 - e).powi(2) / e;
                live += 1;
            } else {
                impossible_rolls += count;
            }
            TierFrequency {
                tier: tier.name.clone(),
                count,
                observed: if n > 0.0 { count as f64 / n } else { 0.0 },
                expected: p,
            }
        })
        .collect();

    BandReport {
        distance,
        samples: config.samples_per_band,
        empty_rolls,
        impossible_rolls,
        tiers,
        chi_squared,
        degrees_of_freedom: live.saturating_sub(1),
    }
}
