//! Reference data: settings, tiers, socket gems, custom items and language.
//!
//! Everything in here is immutable once loaded. Systems read it through the
//! [`ReferenceData`] resource; a hot reload swaps the whole resource.

pub mod loader;
pub mod reference;

pub use loader::{load_reference_data, validate, ConfigError, SettingsFile, DATA_FILES, TIERS_FILE};
pub use reference::ReferenceData;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::item::Material;
use crate::text::ChatColor;

/// Global generation switches and roll chances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSettings {
    /// Base chance that a qualifying monster receives (or drops) an item.
    pub item_chance: f64,
    pub custom_item_chance: f64,
    pub socket_gem_chance: f64,
    pub unidentified_item_chance: f64,
    pub identity_tome_chance: f64,
    /// Chance to grant one more chained item after each grant.
    pub chain_item_chance: f64,
    pub socketting_enabled: bool,
    pub identifying_enabled: bool,
    /// When on, items are equipped at spawn and re-rolled on death; when off,
    /// a single item is generated at death instead.
    pub display_mob_equipment: bool,
    pub enabled_worlds: Vec<String>,
    pub allow_equipping_items_via_right_click: bool,
    /// Name monsters that receive equipment.
    pub give_mobs_names: bool,
    /// Name every monster as it spawns, equipped or not. Needs `give_mobs_names`.
    pub give_all_mobs_names: bool,
    /// Strip the host's own equipment from monsters before the forge equips them.
    pub blank_mob_spawn_enabled: bool,
    /// Blank skeletons keep their bow unless this is set.
    pub skeletons_spawn_without_bows: bool,
    pub mobs_pickup_equipment: bool,
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self {
            item_chance: 0.25,
            custom_item_chance: 0.05,
            socket_gem_chance: 0.1,
            unidentified_item_chance: 0.1,
            identity_tome_chance: 0.05,
            chain_item_chance: 0.0,
            socketting_enabled: true,
            identifying_enabled: true,
            display_mob_equipment: true,
            enabled_worlds: vec!["world".to_string()],
            allow_equipping_items_via_right_click: true,
            give_mobs_names: false,
            give_all_mobs_names: false,
            blank_mob_spawn_enabled: false,
            skeletons_spawn_without_bows: false,
            mobs_pickup_equipment: true,
        }
    }
}

impl ConfigSettings {
    pub fn is_world_enabled(&self, world: &str) -> bool {
        self.enabled_worlds.iter().any(|w| w == world)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SockettingSettings {
    /// Display name template of a socket gem item, `%socketgem%` is the gem.
    pub socket_gem_name: String,
    pub socket_gem_lore: Vec<String>,
    /// Lore line marking an open socket; `%tiercolor%` is the item's tier color.
    pub socketted_item_string: String,
    /// Lore lines that accompany open sockets and are pruned once socketed.
    pub socketted_item_lore: Vec<String>,
    pub socket_gem_materials: Vec<Material>,
    pub prevent_multiple_changes_from_sockets: bool,
    /// Reserved prefix tokens; a name carrying any of them takes no new prefix.
    pub socket_gem_prefixes: Vec<String>,
    pub socket_gem_suffixes: Vec<String>,
    pub use_attacker_item_in_hand: bool,
    pub use_attacker_armor_equipped: bool,
    pub use_defender_item_in_hand: bool,
    pub use_defender_armor_equipped: bool,
    /// Color of a socketed gem's lore line when the item has no tier.
    pub default_socket_color: ChatColor,
}

impl Default for SockettingSettings {
    fn default() -> Self {
        Self {
            socket_gem_name: "&6Socket Gem - %socketgem%".to_string(),
            socket_gem_lore: vec![
                "&7Right-click this gem, then".to_string(),
                "&7right-click the item to socket.".to_string(),
            ],
            socketted_item_string: "%tiercolor%(Socket)".to_string(),
            socketted_item_lore: vec!["&7Socket a gem to unlock its power".to_string()],
            socket_gem_materials: vec![Material::new("EMERALD"), Material::new("DIAMOND")],
            prevent_multiple_changes_from_sockets: true,
            socket_gem_prefixes: Vec::new(),
            socket_gem_suffixes: Vec::new(),
            use_attacker_item_in_hand: true,
            use_attacker_armor_equipped: false,
            use_defender_item_in_hand: false,
            use_defender_armor_equipped: true,
            default_socket_color: ChatColor::Gold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyingSettings {
    pub identity_tome_name: String,
    pub identity_tome_lore: Vec<String>,
    pub identity_tome_material: Material,
    pub unidentified_item_name: String,
    pub unidentified_item_lore: Vec<String>,
}

impl Default for IdentifyingSettings {
    fn default() -> Self {
        Self {
            identity_tome_name: "&5Identity Tome".to_string(),
            identity_tome_lore: vec!["&7Right-click to begin identifying".to_string()],
            identity_tome_material: Material::new("BOOK"),
            unidentified_item_name: "&fUnidentified Item".to_string(),
            unidentified_item_lore: vec!["&7Find an Identity Tome to identify".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureSpawningSettings {
    /// Per entity type multiplier on the base item chance. Unlisted types
    /// never receive items.
    pub entity_type_chances: BTreeMap<String, f64>,
    /// Tier names each entity type may roll.
    pub entity_type_tiers: BTreeMap<String, Vec<String>>,
    pub prevent_spawner: bool,
    pub prevent_spawn_egg: bool,
    pub prevent_reinforcements: bool,
    /// Spawns at or above this height receive nothing, per world.
    pub spawn_height_limits: BTreeMap<String, f64>,
    pub default_spawn_height_limit: f64,
    /// Names any monster may be given.
    pub general_mob_names: Vec<String>,
    /// Names for one entity type; these win over the general pool.
    pub entity_type_mob_names: BTreeMap<String, Vec<String>>,
}

impl Default for CreatureSpawningSettings {
    fn default() -> Self {
        Self {
            entity_type_chances: BTreeMap::new(),
            entity_type_tiers: BTreeMap::new(),
            prevent_spawner: true,
            prevent_spawn_egg: true,
            prevent_reinforcements: true,
            spawn_height_limits: BTreeMap::new(),
            default_spawn_height_limit: 256.0,
            general_mob_names: Vec::new(),
            entity_type_mob_names: BTreeMap::new(),
        }
    }
}

impl CreatureSpawningSettings {
    pub fn entity_type_chance(&self, entity_type: &str) -> f64 {
        self.entity_type_chances
            .get(&entity_type.to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn entity_type_tiers(&self, entity_type: &str) -> &[String] {
        self.entity_type_tiers
            .get(&entity_type.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Name pool for `entity_type`, falling back to the general pool.
    pub fn mob_names(&self, entity_type: &str) -> &[String] {
        match self.entity_type_mob_names.get(&entity_type.to_uppercase()) {
            Some(names) if !names.is_empty() => names,
            _ => &self.general_mob_names,
        }
    }

    pub fn spawn_height_limit(&self, world: &str) -> f64 {
        self.spawn_height_limits
            .get(world)
            .copied()
            .unwrap_or(self.default_spawn_height_limit)
    }
}
