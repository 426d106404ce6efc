use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{ConfigSettings, CreatureSpawningSettings, IdentifyingSettings, SockettingSettings};
use crate::item::{templates, CustomItem, Item, Material};
use crate::sockets::SocketGem;
use crate::text::{colorize, strip_color, Language};
use crate::tier::Tier;
use crate::weighted::choose_weighted;

/// All immutable reference data, shared as a resource.
#[derive(Resource, Debug, Clone)]
pub struct ReferenceData {
    pub config: ConfigSettings,
    pub socketting: SockettingSettings,
    pub identifying: IdentifyingSettings,
    pub creature_spawning: CreatureSpawningSettings,
    pub tiers: Vec<Tier>,
    pub socket_gems: Vec<SocketGem>,
    pub custom_items: Vec<CustomItem>,
    pub language: Language,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            config: ConfigSettings::default(),
            socketting: SockettingSettings::default(),
            identifying: IdentifyingSettings::default(),
            creature_spawning: CreatureSpawningSettings::default(),
            tiers: Vec::new(),
            socket_gems: Vec::new(),
            custom_items: Vec::new(),
            language: Language::builtin(),
        }
    }
}

impl ReferenceData {
    pub fn tier_by_name(&self, name: &str) -> Option<&Tier> {
        let wanted = strip_color(name);
        self.tiers
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(&wanted))
    }

    /// Tier named by a stripped lore line: either its key or its display name.
    pub fn tier_by_label(&self, label: &str) -> Option<&Tier> {
        let wanted = strip_color(label);
        let wanted = wanted.trim();
        if wanted.is_empty() {
            return None;
        }
        self.tiers.iter().find(|t| {
            t.name.eq_ignore_ascii_case(wanted)
                || strip_color(&colorize(&t.display_name)).eq_ignore_ascii_case(wanted)
        })
    }

    /// Tier recorded in the item's lore. The tier line is written last, but
    /// socketed gem lore can follow it, so the search runs from the end.
    pub fn tier_by_item(&self, item: &Item) -> Option<&Tier> {
        item.lore().iter().rev().find_map(|line| self.tier_by_label(line))
    }

    /// Tiers an entity type may roll, in configuration order. Unknown names
    /// are skipped.
    pub fn tiers_for_entity(&self, entity_type: &str) -> Vec<&Tier> {
        self.creature_spawning
            .entity_type_tiers(entity_type)
            .iter()
            .filter_map(|name| self.tier_by_name(name))
            .collect()
    }

    pub fn tiers_for_material(&self, material: &Material) -> Vec<&Tier> {
        self.tiers.iter().filter(|t| t.allows(material)).collect()
    }

    pub fn socket_gem_by_name(&self, name: &str) -> Option<&SocketGem> {
        let wanted = strip_color(name);
        self.socket_gems
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(wanted.trim()))
    }

    /// Gem represented by a socket gem item: configured gem material and a
    /// display name built from the gem name template.
    pub fn socket_gem_by_item(&self, item: &Item) -> Option<&SocketGem> {
        if !self.socketting.socket_gem_materials.contains(&item.material) {
            return None;
        }
        let display = item.display_name()?;
        let name = templates::gem_name_from_display(display, &self.socketting)?;
        self.socket_gem_by_name(&name)
    }

    /// Gems socketed into an item, one per lore line naming a known gem.
    pub fn socket_gems_on(&self, item: &Item) -> Vec<&SocketGem> {
        item.lore()
            .iter()
            .filter_map(|line| self.socket_gem_by_name(line))
            .collect()
    }

    pub fn custom_item_by_item(&self, item: &Item) -> Option<&CustomItem> {
        self.custom_items.iter().find(|c| c.matches(item))
    }

    pub fn random_custom_item<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&CustomItem> {
        choose_weighted(
            self.custom_items
                .iter()
                .map(|c| (c, c.chance_to_be_given_to_monster)),
            rng,
        )
    }

    pub fn random_socket_gem<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SocketGem> {
        choose_weighted(self.socket_gems.iter().map(|g| (g, g.weight)), rng)
    }

    pub fn random_socket_gem_material<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Material> {
        self.socketting.socket_gem_materials.choose(rng)
    }
}
