//! Timed status effects applied by socket gems.
//!
//! Gems carry potion-style effects with a duration in game ticks and an
//! intensity level. The host reads [`ActiveEffects`] to drive movement,
//! damage and visuals; the forge only keeps the timers honest.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Status effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    // Damage over time
    Burning,
    Poison,
    Wither,

    // Impairments
    Slowness,
    MiningFatigue,
    Weakness,
    Blindness,
    Nausea,
    Hunger,
    Levitation,
    Glowing,

    // Buffs
    Speed,
    Haste,
    Strength,
    Regeneration,
    Resistance,
    FireResistance,
    Absorption,
    Invisibility,
    NightVision,
}

impl StatusType {
    pub fn is_debuff(self) -> bool {
        matches!(
            self,
            Self::Burning
                | Self::Poison
                | Self::Wither
                | Self::Slowness
                | Self::MiningFatigue
                | Self::Weakness
                | Self::Blindness
                | Self::Nausea
                | Self::Hunger
                | Self::Levitation
                | Self::Glowing
        )
    }
}

/// A single status effect instance
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEffect {
    pub status: StatusType,
    pub remaining_ticks: u32,
    /// Amplifier level, 1 is the weakest
    pub intensity: u8,
    pub source: Option<Entity>,
}

impl StatusEffect {
    pub fn new(status: StatusType, duration_ticks: u32, intensity: u8) -> Self {
        Self {
            status,
            remaining_ticks: duration_ticks,
            intensity: intensity.max(1),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Entity) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ticks == 0
    }
}

/// Component: effects currently running on a living entity
#[derive(Component, Debug, Default)]
pub struct ActiveEffects {
    pub effects: Vec<StatusEffect>,
}

impl ActiveEffects {
    /// Apply an effect. Re-applying a running type keeps the longer duration
    /// and the stronger intensity.
    pub fn apply(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.status == effect.status) {
            existing.remaining_ticks = existing.remaining_ticks.max(effect.remaining_ticks);
            existing.intensity = existing.intensity.max(effect.intensity);
            if effect.source.is_some() {
                existing.source = effect.source;
            }
        } else {
            self.effects.push(effect);
        }
    }

    pub fn has(&self, status: StatusType) -> bool {
        self.effects.iter().any(|e| e.status == status)
    }

    pub fn intensity_of(&self, status: StatusType) -> Option<u8> {
        self.effects
            .iter()
            .find(|e| e.status == status)
            .map(|e| e.intensity)
    }

    pub fn cleanse_debuffs(&mut self) {
        self.effects.retain(|e| !e.status.is_debuff());
    }

    /// Advance every timer by `ticks` and drop what ran out.
    pub fn tick(&mut self, ticks: u32) {
        for effect in &mut self.effects {
            effect.remaining_ticks = effect.remaining_ticks.saturating_sub(ticks);
        }
        self.effects.retain(|e| !e.is_expired());
    }
}

/// System: one game tick per schedule run
pub fn tick_active_effects(mut query: Query<&mut ActiveEffects>) {
    for mut effects in &mut query {
        if !effects.effects.is_empty() {
            effects.tick(1);
        }
    }
}
