//! Inventory and equipment storage.
//!
//! Players have a flat slot inventory and equipment slots; creatures only
//! have equipment. The forge goes through [`InventoryAccess`] when it needs
//! to check for, consume, or swap items.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::item::{ArmorSlot, Item};

/// Inventory capacity
const BASE_INVENTORY_SIZE: usize = 36;

/// Equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
}

impl EquipmentSlot {
    pub const ARMOR: [EquipmentSlot; 4] = [Self::Feet, Self::Legs, Self::Chest, Self::Head];

    pub fn is_armor(self) -> bool {
        !matches!(self, Self::MainHand | Self::OffHand)
    }
}

impl From<ArmorSlot> for EquipmentSlot {
    fn from(slot: ArmorSlot) -> Self {
        match slot {
            ArmorSlot::Head => Self::Head,
            ArmorSlot::Chest => Self::Chest,
            ArmorSlot::Legs => Self::Legs,
            ArmorSlot::Feet => Self::Feet,
        }
    }
}

/// Worn and held items
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub main_hand: Option<Item>,
    pub off_hand: Option<Item>,
    pub head: Option<Item>,
    pub chest: Option<Item>,
    pub legs: Option<Item>,
    pub feet: Option<Item>,
}

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<&Item> {
        match slot {
            EquipmentSlot::MainHand => self.main_hand.as_ref(),
            EquipmentSlot::OffHand => self.off_hand.as_ref(),
            EquipmentSlot::Head => self.head.as_ref(),
            EquipmentSlot::Chest => self.chest.as_ref(),
            EquipmentSlot::Legs => self.legs.as_ref(),
            EquipmentSlot::Feet => self.feet.as_ref(),
        }
    }

    pub fn set(&mut self, slot: EquipmentSlot, item: Option<Item>) {
        let target = match slot {
            EquipmentSlot::MainHand => &mut self.main_hand,
            EquipmentSlot::OffHand => &mut self.off_hand,
            EquipmentSlot::Head => &mut self.head,
            EquipmentSlot::Chest => &mut self.chest,
            EquipmentSlot::Legs => &mut self.legs,
            EquipmentSlot::Feet => &mut self.feet,
        };
        *target = item;
    }

    /// Armor pieces currently worn, feet first
    pub fn armor(&self) -> impl Iterator<Item = &Item> {
        EquipmentSlot::ARMOR.into_iter().filter_map(|slot| self.get(slot))
    }

    /// Put `item` where it belongs: armor to its armor slot, anything else to
    /// the main hand. Returns the replaced item.
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        let slot = item
            .material
            .armor_slot()
            .map(EquipmentSlot::from)
            .unwrap_or(EquipmentSlot::MainHand);
        let previous = self.get(slot).cloned();
        self.set(slot, Some(item));
        previous
    }

    /// Every occupied slot: armor feet first, then main hand and off hand.
    pub fn all(&self) -> Vec<(EquipmentSlot, &Item)> {
        EquipmentSlot::ARMOR
            .into_iter()
            .chain([EquipmentSlot::MainHand, EquipmentSlot::OffHand])
            .filter_map(|slot| self.get(slot).map(|item| (slot, item)))
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Player inventory component
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Inventory {
    pub slots: Vec<Option<Item>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; BASE_INVENTORY_SIZE],
        }
    }
}

impl Inventory {
    /// Put an item in the first empty slot
    pub fn add(&mut self, item: Item) -> bool {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(item);
                true
            }
            None => false,
        }
    }

    /// Index of the first stack equal to `item`, amount included
    pub fn first(&self, item: &Item) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref() == Some(item))
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.first(item).is_some()
    }

    /// Take `amount` off the stack in `index`; an emptied stack frees the slot.
    pub fn decrement(&mut self, index: usize, amount: u32) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if let Some(stack) = slot.as_mut() {
            if stack.amount <= amount {
                *slot = None;
            } else {
                stack.amount -= amount;
            }
        }
    }

    pub fn count_occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// What the interaction protocol needs from a player's storage
pub trait InventoryAccess {
    fn main_hand(&self) -> Option<&Item>;
    fn set_main_hand(&mut self, item: Option<Item>);
    /// Does storage hold this exact stack?
    fn contains(&self, item: &Item) -> bool;
    /// Remove `amount` from the first stack equal to `item`. False when no
    /// such stack exists.
    fn consume(&mut self, item: &Item, amount: u32) -> bool;
}

/// A player's equipment and inventory, borrowed together
pub struct PlayerInventory<'a> {
    pub equipment: &'a mut Equipment,
    pub inventory: &'a mut Inventory,
}

impl InventoryAccess for PlayerInventory<'_> {
    fn main_hand(&self) -> Option<&Item> {
        self.equipment.main_hand.as_ref()
    }

    fn set_main_hand(&mut self, item: Option<Item>) {
        self.equipment.main_hand = item;
    }

    fn contains(&self, item: &Item) -> bool {
        self.inventory.contains(item)
    }

    fn consume(&mut self, item: &Item, amount: u32) -> bool {
        match self.inventory.first(item) {
            Some(index) => {
                self.inventory.decrement(index, amount);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemMeta, Material};

    fn gem() -> Item {
        Item::new(Material::new("EMERALD")).with_meta(ItemMeta::named("Gem"))
    }

    #[test]
    fn test_equip_routes_armor() {
        let mut equipment = Equipment::default();
        equipment.equip(Item::new(Material::new("IRON_HELMET")));
        equipment.equip(Item::new(Material::new("IRON_SWORD")));
        assert!(equipment.head.is_some());
        assert!(equipment.main_hand.is_some());
        assert_eq!(equipment.armor().count(), 1);

        let previous = equipment.equip(Item::new(Material::new("STONE_AXE")));
        assert_eq!(previous.map(|i| i.material), Some(Material::new("IRON_SWORD")));
    }

    #[test]
    fn test_all_slots_order() {
        let mut equipment = Equipment::default();
        equipment.equip(Item::new(Material::new("IRON_SWORD")));
        equipment.equip(Item::new(Material::new("IRON_BOOTS")));
        let slots: Vec<_> = equipment.all().into_iter().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![EquipmentSlot::Feet, EquipmentSlot::MainHand]);
    }

    #[test]
    fn test_inventory_exact_match_and_decrement() {
        let mut inventory = Inventory::default();
        inventory.add(gem().with_amount(3));

        assert!(!inventory.contains(&gem()));
        assert!(inventory.contains(&gem().with_amount(3)));

        inventory.decrement(0, 2);
        assert_eq!(inventory.slots[0].as_ref().map(|i| i.amount), Some(1));
        inventory.decrement(0, 1);
        assert!(inventory.slots[0].is_none());
        inventory.decrement(99, 1);
    }

    #[test]
    fn test_player_inventory_consume() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::default();
        inventory.add(gem().with_amount(2));
        let mut access = PlayerInventory {
            equipment: &mut equipment,
            inventory: &mut inventory,
        };
        assert!(access.consume(&gem().with_amount(2), 1));
        assert!(!access.consume(&gem().with_amount(2), 1));
        assert_eq!(inventory.count_occupied(), 1);
    }
}
