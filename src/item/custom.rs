use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Enchantment, Item, ItemMeta, Material};
use crate::text::{colorize, colorize_all};

/// Hand-authored item that can replace a generated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    pub name: String,
    pub display_name: String,
    pub material: Material,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub enchantments: BTreeMap<Enchantment, i32>,
    /// Weight when a custom item is rolled for a monster
    #[serde(default)]
    pub chance_to_be_given_to_monster: f64,
    #[serde(default)]
    pub broadcast_on_find: bool,
    #[serde(default)]
    pub durability: u16,
}

impl CustomItem {
    pub fn to_item(&self) -> Item {
        let meta = ItemMeta {
            display_name: Some(colorize(&self.display_name)),
            lore: colorize_all(&self.lore),
            enchantments: self.enchantments.clone(),
        };
        let mut item = Item::new(self.material.clone()).with_meta(meta);
        item.durability = self.durability;
        item
    }

    /// Same material, name and lore; wear and enchantments may have changed.
    pub fn matches(&self, item: &Item) -> bool {
        let Some(meta) = item.meta.as_ref() else {
            return false;
        };
        item.material == self.material
            && meta.display_name.as_deref() == Some(colorize(&self.display_name).as_str())
            && meta.lore == colorize_all(&self.lore)
    }
}
