//! Spawn preparation that runs ahead of equipment rolls: naming, blank
//! equipment and the pickup flag.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use super::CreatureSpawnEvent;
use crate::config::ReferenceData;
use crate::item::{Item, Material};
use crate::text::colorize;

/// Entity types that spawn holding a bow
const BOW_WIELDERS: [&str; 2] = ["SKELETON", "STRAY"];

/// A display name for the host to show above a creature
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CreatureNamed {
    pub entity: Entity,
    pub name: String,
}

/// Whether a creature may pick up items lying in the world
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanPickupItems(pub bool);

/// What to do to a monster before it rolls for equipment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPreparation {
    pub name: Option<String>,
    /// Remove everything the host equipped
    pub clear_equipment: bool,
    /// Put back in the main hand after clearing
    pub main_hand: Option<Item>,
    pub can_pickup_items: bool,
}

/// Preparation for a spawning monster; `None` for passive creatures and
/// disabled worlds.
pub fn prepare_creature<R>(notice: &CreatureSpawnEvent, data: &ReferenceData, rng: &mut R) -> Option<SpawnPreparation>
where
    R: Rng + ?Sized,
{
    if !notice.hostile || !data.config.is_world_enabled(&notice.world) {
        return None;
    }
    let config = &data.config;
    let name = if config.give_all_mobs_names {
        mob_name(&notice.entity_type, data, rng)
    } else {
        None
    };
    let keeps_bow = BOW_WIELDERS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&notice.entity_type));
    let main_hand = (config.blank_mob_spawn_enabled && keeps_bow && !config.skeletons_spawn_without_bows)
        .then(|| Item::new(Material::new("BOW")));

    Some(SpawnPreparation {
        name,
        clear_equipment: config.blank_mob_spawn_enabled,
        main_hand,
        can_pickup_items: config.mobs_pickup_equipment,
    })
}

/// A random name from the entity type's pool, else the general pool.
pub fn mob_name<R>(entity_type: &str, data: &ReferenceData, rng: &mut R) -> Option<String>
where
    R: Rng + ?Sized,
{
    if !data.config.give_mobs_names {
        return None;
    }
    data.creature_spawning
        .mob_names(entity_type)
        .choose(rng)
        .map(|name| colorize(name))
}
