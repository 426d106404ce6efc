//! Forge runtime: game clock, seeded randomness and the top-level plugin.
//!
//! The host drives the bevy schedule once per game tick. Everything the forge
//! measures in time is counted in those ticks, never in wall-clock seconds.

pub mod config;
pub mod plugin;

pub use config::ForgeConfig;
pub use plugin::ItemForgePlugin;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use sha3::{Digest, Sha3_256};

pub type GameTick = u64;

/// Current game tick
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    pub tick: GameTick,
}

impl GameClock {
    pub fn now(&self) -> GameTick {
        self.tick
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

/// System: one tick per schedule run
pub fn advance_clock(mut clock: ResMut<GameClock>) {
    clock.advance();
}

/// Shared RNG for every roll the forge makes
#[derive(Resource, Debug, Clone)]
pub struct ForgeRng(pub Xoshiro256PlusPlus);

impl ForgeRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(Xoshiro256PlusPlus::seed_from_u64(derive_seed(seed, b"itemforge")))
    }
}

/// Deterministic sub-seed from a root seed and a label
pub fn derive_seed(root: u64, label: &[u8]) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(root.to_le_bytes());
    hasher.update(label);
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[0..8]);
    u64::from_le_bytes(bytes)
}
