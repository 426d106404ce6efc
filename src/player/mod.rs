//! Host-side actor components the forge reads and writes.
//!
//! The host spawns one entity per living creature. Players additionally carry
//! [`Player`], [`Permissions`] and an [`Inventory`]; every living creature
//! that can hold items carries [`Equipment`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod inventory;

pub use inventory::{Equipment, EquipmentSlot, Inventory, InventoryAccess, PlayerInventory};

/// Marker for living entities (damage, effects and area searches apply)
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Living;

/// A connected player
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Non-player creature, with the host's entity type name (`ZOMBIE`)
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Creature {
    pub entity_type: String,
    pub hostile: bool,
}

/// Granted permission nodes
#[derive(Component, Debug, Default, Clone, Serialize, Deserialize)]
pub struct Permissions {
    nodes: BTreeSet<String>,
    /// Operators hold every node
    pub operator: bool,
}

impl Permissions {
    pub fn operator() -> Self {
        Self {
            nodes: BTreeSet::new(),
            operator: true,
        }
    }

    pub fn with(mut self, node: &str) -> Self {
        self.grant(node);
        self
    }

    pub fn grant(&mut self, node: &str) {
        self.nodes.insert(node.to_lowercase());
    }

    pub fn revoke(&mut self, node: &str) {
        self.nodes.remove(&node.to_lowercase());
    }

    pub fn has(&self, node: &str) -> bool {
        self.operator || self.nodes.contains(&node.to_lowercase())
    }
}
