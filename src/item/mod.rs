//! Item model shared with the host.
//!
//! The forge never owns item storage: it reads an [`Item`] handed over by the
//! host (equipment slot, inventory slot, drop) and hands back a rewritten
//! copy. Only the metadata block (display name, lore, enchantments) is
//! interpreted.

pub mod builder;
pub mod classify;
pub mod custom;
pub mod templates;

pub use builder::{build_tiered_item, durability_damage_for};
pub use classify::{classify, ItemKind};
pub use custom::CustomItem;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Host material name, normalised to upper snake case (`DIAMOND_SWORD`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Material(String);

impl Material {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn category(&self) -> ItemCategory {
        ItemCategory::of(self)
    }

    pub fn armor_slot(&self) -> Option<ArmorSlot> {
        let name = self.0.as_str();
        if name.ends_with("_HELMET") {
            Some(ArmorSlot::Head)
        } else if name.ends_with("_CHESTPLATE") {
            Some(ArmorSlot::Chest)
        } else if name.ends_with("_LEGGINGS") {
            Some(ArmorSlot::Legs)
        } else if name.ends_with("_BOOTS") {
            Some(ArmorSlot::Feet)
        } else {
            None
        }
    }

    /// "DIAMOND_SWORD" -> "Diamond Sword"
    pub fn pretty_name(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let lower = w.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    /// Natural maximum durability; 0 for items that do not wear.
    pub fn max_durability(&self) -> u16 {
        let name = self.0.as_str();
        match name {
            "BOW" => return 384,
            "CROSSBOW" => return 465,
            "TRIDENT" => return 250,
            "FISHING_ROD" => return 64,
            "SHEARS" => return 238,
            _ => {}
        }
        if let Some(slot) = self.armor_slot() {
            let base: [u16; 4] = if name.starts_with("LEATHER_") {
                [55, 80, 75, 65]
            } else if name.starts_with("CHAINMAIL_") || name.starts_with("IRON_") {
                [165, 240, 225, 195]
            } else if name.starts_with("GOLDEN_") || name.starts_with("GOLD_") {
                [77, 112, 105, 91]
            } else if name.starts_with("DIAMOND_") {
                [363, 528, 495, 429]
            } else if name.starts_with("NETHERITE_") {
                [407, 592, 555, 481]
            } else {
                return 0;
            };
            return base[slot.index()];
        }
        if self.category() != ItemCategory::Tool {
            return 0;
        }
        if name.starts_with("WOODEN_") || name.starts_with("WOOD_") {
            59
        } else if name.starts_with("STONE_") {
            131
        } else if name.starts_with("IRON_") {
            250
        } else if name.starts_with("GOLDEN_") || name.starts_with("GOLD_") {
            32
        } else if name.starts_with("DIAMOND_") {
            1561
        } else if name.starts_with("NETHERITE_") {
            2031
        } else {
            0
        }
    }
}

impl From<String> for Material {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<Material> for String {
    fn from(m: Material) -> Self {
        m.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an item can carry sockets and which gems fit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Tool,
    Armor,
    Other,
}

const TOOL_SUFFIXES: [&str; 6] = ["_SWORD", "_AXE", "_PICKAXE", "_SHOVEL", "_SPADE", "_HOE"];
const TOOL_NAMES: [&str; 5] = ["BOW", "CROSSBOW", "TRIDENT", "FISHING_ROD", "SHEARS"];

impl ItemCategory {
    pub fn of(material: &Material) -> Self {
        let name = material.as_str();
        if material.armor_slot().is_some() {
            Self::Armor
        } else if TOOL_NAMES.contains(&name) || TOOL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Self::Tool
        } else {
            Self::Other
        }
    }

    /// Tools and armor are the only augmentable categories.
    pub fn is_augmentable(self) -> bool {
        matches!(self, Self::Tool | Self::Armor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorSlot {
    Head,
    Chest,
    Legs,
    Feet,
}

impl ArmorSlot {
    fn index(self) -> usize {
        match self {
            Self::Head => 0,
            Self::Chest => 1,
            Self::Legs => 2,
            Self::Feet => 3,
        }
    }
}

/// Enchantment key (`sharpness`, `protection`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Enchantment(String);

impl Enchantment {
    pub fn new(key: &str) -> Self {
        Self(key.trim().to_lowercase())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl From<String> for Enchantment {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<Enchantment> for String {
    fn from(e: Enchantment) -> Self {
        e.0
    }
}

/// Display metadata block of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub display_name: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    /// Levels are not clamped to an enchantment's natural maximum.
    #[serde(default)]
    pub enchantments: BTreeMap<Enchantment, i32>,
}

impl ItemMeta {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }

    pub fn with_lore(mut self, lore: Vec<String>) -> Self {
        self.lore = lore;
        self
    }

    pub fn has_display_name(&self) -> bool {
        self.display_name.is_some()
    }

    pub fn enchantment_level(&self, enchantment: &Enchantment) -> i32 {
        self.enchantments.get(enchantment).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub material: Material,
    pub amount: u32,
    /// Damage taken; 0 is pristine.
    pub durability: u16,
    pub meta: Option<ItemMeta>,
}

impl Item {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            amount: 1,
            durability: 0,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    pub fn category(&self) -> ItemCategory {
        self.material.category()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.display_name.as_deref())
    }

    pub fn lore(&self) -> &[String] {
        self.meta.as_ref().map(|m| m.lore.as_slice()).unwrap_or(&[])
    }

    /// Same item ignoring stack size.
    pub fn is_similar(&self, other: &Item) -> bool {
        self.material == other.material
            && self.durability == other.durability
            && self.meta == other.meta
    }
}
