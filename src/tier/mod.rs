//! Loot tiers and distance-weighted tier selection.
//!
//! A tier is a quality band (Common, Rare, Legendary ...) with its own color,
//! chances and an optional distance window around the world spawn. Tiers
//! with a distance window are most likely near their optimal distance and
//! fade out over `maximum_distance` beyond it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::item::{Enchantment, Material};
use crate::text::ChatColor;
use crate::weighted::choose_weighted;

/// Sentinel for "no distance window configured".
pub const UNBOUNDED_DISTANCE: i32 = -1;

fn unbounded() -> i32 {
    UNBOUNDED_DISTANCE
}

fn full_durability() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub display_name: String,
    pub display_color: ChatColor,
    #[serde(default)]
    pub spawn_chance: f64,
    #[serde(default)]
    pub drop_chance: f64,
    #[serde(default)]
    pub identify_chance: f64,
    #[serde(default = "unbounded")]
    pub optimal_distance: i32,
    #[serde(default = "unbounded")]
    pub maximum_distance: i32,
    /// Fraction of durability left on generated items, lower bound.
    #[serde(default = "full_durability")]
    pub minimum_durability: f64,
    #[serde(default = "full_durability")]
    pub maximum_durability: f64,
    #[serde(default)]
    pub broadcast_on_find: bool,
    #[serde(default)]
    pub minimum_sockets: u32,
    #[serde(default)]
    pub maximum_sockets: u32,
    #[serde(default)]
    pub allowed_materials: Vec<Material>,
    #[serde(default)]
    pub base_lore: Vec<String>,
    #[serde(default)]
    pub base_enchantments: BTreeMap<Enchantment, i32>,
}

impl Tier {
    /// Minimal tier with no distance window; mostly for tests and tooling.
    pub fn new(name: &str, display_color: ChatColor, spawn_chance: f64) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            display_color,
            spawn_chance,
            drop_chance: 1.0,
            identify_chance: spawn_chance,
            optimal_distance: UNBOUNDED_DISTANCE,
            maximum_distance: UNBOUNDED_DISTANCE,
            minimum_durability: 1.0,
            maximum_durability: 1.0,
            broadcast_on_find: false,
            minimum_sockets: 0,
            maximum_sockets: 0,
            allowed_materials: Vec::new(),
            base_lore: Vec::new(),
            base_enchantments: BTreeMap::new(),
        }
    }

    pub fn with_distances(mut self, optimal: i32, maximum: i32) -> Self {
        self.optimal_distance = optimal;
        self.maximum_distance = maximum;
        self
    }

    pub fn with_materials(mut self, materials: &[&str]) -> Self {
        self.allowed_materials = materials.iter().map(|m| Material::new(m)).collect();
        self
    }

    pub fn with_sockets(mut self, min: u32, max: u32) -> Self {
        self.minimum_sockets = min;
        self.maximum_sockets = max;
        self
    }

    pub fn has_distance_window(&self) -> bool {
        self.optimal_distance != UNBOUNDED_DISTANCE && self.maximum_distance != UNBOUNDED_DISTANCE
    }

    pub fn allows(&self, material: &Material) -> bool {
        self.allowed_materials.contains(material)
    }

    /// Trailing lore line that identifies the tier on generated items.
    pub fn lore_line(&self) -> String {
        format!("{}{}", self.display_color, self.display_name)
    }
}

/// Spawn weight of a tier at a squared distance from the world spawn.
///
/// Inside the optimal radius the weight is the base spawn chance. Beyond it
/// the weight decays linearly in squared distance and reaches zero once the
/// overshoot is at least `maximum_distance²`.
pub fn distance_weight(tier: &Tier, distance_squared: f64) -> f64 {
    if !tier.has_distance_window() {
        return tier.spawn_chance;
    }
    let square_max = f64::from(tier.maximum_distance).powi(2);
    let square_opt = f64::from(tier.optimal_distance).powi(2);
    let diff = distance_squared - square_opt;
    let multiplier = if diff <= 0.0 {
        1.0
    } else if diff < square_max {
        1.0 - diff / square_max
    } else {
        0.0
    };
    tier.spawn_chance * multiplier
}

/// Choose a tier for a spawn or death at `distance_squared` from spawn.
pub fn select_tier<'a, R>(candidates: &[&'a Tier], distance_squared: f64, rng: &mut R) -> Option<&'a Tier>
where
    R: Rng + ?Sized,
{
    let weighted = candidates
        .iter()
        .map(|tier| (*tier, distance_weight(tier, distance_squared)));
    let chosen = choose_weighted(weighted, rng);
    tracing::trace!(
        candidates = candidates.len(),
        distance_squared,
        tier = chosen.map(|t| t.name.as_str()).unwrap_or("-"),
        "tier selection"
    );
    chosen
}

/// Choose a tier weighted by identify chance (identification fallback when
/// an unidentified item carries no tier hint).
pub fn random_tier_with_identify_chance<'a, R>(candidates: &[&'a Tier], rng: &mut R) -> Option<&'a Tier>
where
    R: Rng + ?Sized,
{
    choose_weighted(candidates.iter().map(|t| (*t, t.identify_chance)), rng)
}
