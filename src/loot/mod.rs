//! Spawn-time equipment and death-time drops.
//!
//! A qualifying monster spawn rolls for an item, picks a tier by distance
//! from the world spawn, builds a tiered item and may swap it for a custom
//! item, a socket gem, an unidentified item or an identity tome (checked in
//! that order, first hit wins). Death either re-rolls a single drop or drops
//! what the monster was already wearing. Spawn wear is only rolled on the
//! death re-roll, so monsters spawn with undamaged gear.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ReferenceData;
use crate::constants::{MAX_CHAIN_ITEMS, MSG_FOUND_ITEM_BROADCAST};
use crate::engine::ForgeRng;
use crate::item::{build_tiered_item, classify, durability_damage_for, templates, CustomItem, Item, ItemKind};
use crate::player::Equipment;
use crate::tier::{select_tier, Tier};

mod prepare;

pub use prepare::{mob_name, prepare_creature, CanPickupItems, CreatureNamed, SpawnPreparation};

pub struct LootPlugin;

impl Plugin for LootPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CreatureSpawnEvent>()
            .add_event::<CreatureDeathEvent>()
            .add_event::<ItemDropEvent>()
            .add_event::<FoundItemBroadcast>()
            .add_event::<CreatureNamed>()
            .add_systems(
                Update,
                ((prepare_spawned_creatures, equip_spawned_creatures).chain(), drop_loot_on_death),
            );
    }
}

// =====================================================
// Events
// =====================================================

/// Why the host spawned a creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpawnReason {
    Natural,
    Spawner,
    SpawnerEgg,
    Custom,
    Reinforcements,
    Breeding,
    Other,
}

#[derive(Event, Debug, Clone)]
pub struct CreatureSpawnEvent {
    pub entity: Entity,
    /// Host entity type name (`ZOMBIE`)
    pub entity_type: String,
    /// Monsters are the only creatures that get equipment
    pub hostile: bool,
    pub world: String,
    pub position: Vec3,
    pub reason: SpawnReason,
    /// Squared distance from the world's spawn point
    pub distance_squared: f64,
}

#[derive(Event, Debug, Clone)]
pub struct CreatureDeathEvent {
    pub entity: Entity,
    pub entity_type: String,
    pub is_player: bool,
    pub world: String,
    pub position: Vec3,
    pub distance_squared: f64,
    /// `None` when the host has no record of the killing blow
    pub last_damage_cancelled: Option<bool>,
    /// Name of the player who landed the killing blow
    pub killer: Option<String>,
    /// What the creature was wearing when it died
    pub equipment: Equipment,
}

/// An item for the host to drop into the world
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ItemDropEvent {
    pub source: Entity,
    pub position: Vec3,
    pub item: Item,
}

/// "Player found item" message for everyone in a world. The host renders
/// `item` as a hoverable tooltip between consecutive `segments`.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FoundItemBroadcast {
    pub world: String,
    pub receiver: String,
    pub segments: Vec<String>,
    pub item: Item,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeathDrops {
    pub drops: Vec<Item>,
    pub broadcasts: Vec<FoundItemBroadcast>,
}

// =====================================================
// Spawn
// =====================================================

fn spawn_allowed(notice: &CreatureSpawnEvent, data: &ReferenceData) -> bool {
    let spawning = &data.creature_spawning;
    if !notice.hostile || !data.config.is_world_enabled(&notice.world) {
        return false;
    }
    let prevented = match notice.reason {
        SpawnReason::Reinforcements => spawning.prevent_reinforcements,
        SpawnReason::Spawner | SpawnReason::Custom => spawning.prevent_spawner,
        SpawnReason::SpawnerEgg => spawning.prevent_spawn_egg,
        _ => false,
    };
    if prevented {
        return false;
    }
    if spawning.spawn_height_limit(&notice.world) <= f64::from(notice.position.y) {
        return false;
    }
    data.config.display_mob_equipment
}

/// Items to equip on a freshly spawned creature; empty when it gets none.
pub fn on_creature_spawn<R>(notice: &CreatureSpawnEvent, data: &ReferenceData, rng: &mut R) -> Vec<Item>
where
    R: Rng + ?Sized,
{
    if !spawn_allowed(notice, data) {
        return Vec::new();
    }
    let chance = data.config.item_chance * data.creature_spawning.entity_type_chance(&notice.entity_type);
    if rng.gen::<f64>() >= chance {
        return Vec::new();
    }

    let candidates = data.tiers_for_entity(&notice.entity_type);
    let Some(tier) = select_tier(&candidates, notice.distance_squared, rng) else {
        tracing::debug!(entity_type = %notice.entity_type, "no tier in range");
        return Vec::new();
    };
    let Some((first, _)) = roll_item(tier, data, false, rng) else {
        return Vec::new();
    };

    let mut items = vec![first];
    while items.len() < MAX_CHAIN_ITEMS && rng.gen::<f64>() <= data.config.chain_item_chance {
        match build_tiered_item(tier, None, false, &data.socketting, rng) {
            Some(item) => items.push(item),
            None => break,
        }
    }
    tracing::info!(
        entity_type = %notice.entity_type,
        tier = %tier.name,
        items = items.len(),
        "equipped creature"
    );
    items
}

/// Which check produced a rolled item
#[derive(Debug, Clone, Copy)]
enum Rolled<'a> {
    Custom(&'a CustomItem),
    SocketGem,
    Unidentified,
    IdentityTome,
    Tiered,
}

/// A tiered item for `tier`, possibly swapped for one of the special kinds.
/// A special kind with nothing configured falls through to the next check.
/// Wear is only applied to the tiered item when `use_durability` is set.
fn roll_item<'a, R>(
    tier: &Tier,
    data: &'a ReferenceData,
    use_durability: bool,
    rng: &mut R,
) -> Option<(Item, Rolled<'a>)>
where
    R: Rng + ?Sized,
{
    let base = build_tiered_item(tier, None, use_durability, &data.socketting, rng)?;
    let config = &data.config;

    if rng.gen::<f64>() <= config.custom_item_chance {
        if let Some(custom) = data.random_custom_item(rng) {
            return Some((custom.to_item(), Rolled::Custom(custom)));
        }
    }
    if config.socketting_enabled && rng.gen::<f64>() <= config.socket_gem_chance {
        let gem = data.random_socket_gem(rng);
        let material = data.random_socket_gem_material(rng);
        if let (Some(gem), Some(material)) = (gem, material) {
            return Some((templates::socket_gem_item(material, gem, &data.socketting), Rolled::SocketGem));
        }
    }
    if config.identifying_enabled && rng.gen::<f64>() <= config.unidentified_item_chance {
        let item = templates::unidentified_item(&base.material, Some(tier), &data.identifying);
        return Some((item, Rolled::Unidentified));
    }
    if config.identifying_enabled && rng.gen::<f64>() <= config.identity_tome_chance {
        return Some((templates::identity_tome(&data.identifying), Rolled::IdentityTome));
    }
    Some((base, Rolled::Tiered))
}

// =====================================================
// Death
// =====================================================

/// Drops and announcements for a creature that just died.
pub fn on_creature_death<R>(notice: &CreatureDeathEvent, data: &ReferenceData, rng: &mut R) -> DeathDrops
where
    R: Rng + ?Sized,
{
    let mut result = DeathDrops::default();
    if notice.is_player || notice.last_damage_cancelled != Some(false) {
        return result;
    }
    if !data.config.is_world_enabled(&notice.world) {
        return result;
    }
    let Some(killer) = notice.killer.as_deref() else {
        return result;
    };

    if data.config.display_mob_equipment {
        drop_equipped(notice, killer, data, rng, &mut result);
    } else {
        drop_rerolled(notice, killer, data, rng, &mut result);
    }

    if !result.drops.is_empty() {
        tracing::info!(
            entity_type = %notice.entity_type,
            killer,
            drops = result.drops.len(),
            broadcasts = result.broadcasts.len(),
            "creature loot dropped"
        );
    }
    result
}

fn drop_equipped<R>(notice: &CreatureDeathEvent, killer: &str, data: &ReferenceData, rng: &mut R, result: &mut DeathDrops)
where
    R: Rng + ?Sized,
{
    for (_, item) in notice.equipment.all() {
        match classify(item, data) {
            ItemKind::Custom(custom) => {
                let fresh = custom.to_item();
                if custom.broadcast_on_find {
                    result.broadcasts.push(found_item(data, &notice.world, killer, &fresh));
                }
                result.drops.push(fresh);
            }
            ItemKind::SocketGem(gem) => {
                result
                    .drops
                    .push(templates::socket_gem_item(&item.material, gem, &data.socketting));
            }
            ItemKind::IdentityTome | ItemKind::Unidentified => {
                result.drops.push(item.clone());
            }
            ItemKind::Tiered(tier) => {
                if rng.gen::<f64>() < tier.drop_chance {
                    let mut dropped = item.clone();
                    dropped.durability = durability_damage_for(
                        &dropped.material,
                        tier.minimum_durability,
                        tier.maximum_durability,
                        rng,
                    );
                    if tier.broadcast_on_find {
                        result.broadcasts.push(found_item(data, &notice.world, killer, &dropped));
                    }
                    result.drops.push(dropped);
                }
            }
            ItemKind::Plain => {}
        }
    }
}

fn drop_rerolled<R>(notice: &CreatureDeathEvent, killer: &str, data: &ReferenceData, rng: &mut R, result: &mut DeathDrops)
where
    R: Rng + ?Sized,
{
    let chance = data.config.item_chance * data.creature_spawning.entity_type_chance(&notice.entity_type);
    if rng.gen::<f64>() > chance {
        return;
    }
    let candidates = data.tiers_for_entity(&notice.entity_type);
    let Some(tier) = select_tier(&candidates, notice.distance_squared, rng) else {
        return;
    };
    let Some((item, rolled)) = roll_item(tier, data, true, rng) else {
        return;
    };

    let announce = match rolled {
        Rolled::Custom(custom) => custom.broadcast_on_find,
        Rolled::Tiered => tier.broadcast_on_find,
        Rolled::SocketGem | Rolled::Unidentified | Rolled::IdentityTome => false,
    };
    if announce {
        result.broadcasts.push(found_item(data, &notice.world, killer, &item));
    }
    result.drops.push(item);
}

/// Build the found-item announcement from the localized template.
pub fn found_item(data: &ReferenceData, world: &str, receiver: &str, item: &Item) -> FoundItemBroadcast {
    let text = data
        .language
        .format(MSG_FOUND_ITEM_BROADCAST, &[("%receiver%", receiver)]);
    FoundItemBroadcast {
        world: world.to_string(),
        receiver: receiver.to_string(),
        segments: text.split("%item%").map(str::to_string).collect(),
        item: item.clone(),
    }
}

// =====================================================
// Systems
// =====================================================

pub fn prepare_spawned_creatures(
    mut events: EventReader<CreatureSpawnEvent>,
    mut equipment: Query<&mut Equipment>,
    mut commands: Commands,
    data: Res<ReferenceData>,
    mut rng: ResMut<ForgeRng>,
    mut named: EventWriter<CreatureNamed>,
) {
    for event in events.read() {
        let Some(prep) = prepare_creature(event, &data, &mut rng.0) else {
            continue;
        };
        if let Some(name) = prep.name {
            named.send(CreatureNamed {
                entity: event.entity,
                name,
            });
        }
        let Some(mut entity) = commands.get_entity(event.entity) else {
            continue;
        };
        entity.insert(CanPickupItems(prep.can_pickup_items));
        if !prep.clear_equipment {
            continue;
        }
        match equipment.get_mut(event.entity) {
            Ok(mut worn) => {
                worn.clear();
                worn.main_hand = prep.main_hand;
            }
            Err(_) => {
                if let Some(bow) = prep.main_hand {
                    entity.insert(Equipment {
                        main_hand: Some(bow),
                        ..Default::default()
                    });
                }
            }
        }
    }
}

pub fn equip_spawned_creatures(
    mut events: EventReader<CreatureSpawnEvent>,
    mut equipment: Query<&mut Equipment>,
    mut commands: Commands,
    data: Res<ReferenceData>,
    mut rng: ResMut<ForgeRng>,
    mut named: EventWriter<CreatureNamed>,
) {
    for event in events.read() {
        let items = on_creature_spawn(event, &data, &mut rng.0);
        if items.is_empty() {
            continue;
        }
        // Already named at spawn when every monster gets a name
        if !data.config.give_all_mobs_names {
            if let Some(name) = mob_name(&event.entity_type, &data, &mut rng.0) {
                named.send(CreatureNamed {
                    entity: event.entity,
                    name,
                });
            }
        }
        match equipment.get_mut(event.entity) {
            Ok(mut worn) => {
                for item in items {
                    worn.equip(item);
                }
            }
            Err(_) => {
                let mut worn = Equipment::default();
                for item in items {
                    worn.equip(item);
                }
                if let Some(mut entity) = commands.get_entity(event.entity) {
                    entity.insert(worn);
                }
            }
        }
    }
}

pub fn drop_loot_on_death(
    mut events: EventReader<CreatureDeathEvent>,
    data: Res<ReferenceData>,
    mut rng: ResMut<ForgeRng>,
    mut drops: EventWriter<ItemDropEvent>,
    mut broadcasts: EventWriter<FoundItemBroadcast>,
) {
    for event in events.read() {
        let result = on_creature_death(event, &data, &mut rng.0);
        for item in result.drops {
            drops.send(ItemDropEvent {
                source: event.entity,
                position: event.position,
                item,
            });
        }
        for broadcast in result.broadcasts {
            broadcasts.send(broadcast);
        }
    }
}
