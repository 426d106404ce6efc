//! Socket gems.
//!
//! A socket gem is reference data: a name, the kind of item it fits, a
//! prefix/suffix for the host item's name, lore, enchantments, and the
//! effects and commands it triggers in combat. Items record sockets purely in
//! their lore: an open socket is a lore line matching the configured socket
//! string, a filled socket is a lore line carrying the gem's name.
//!
//! Gem types:
//! - `Tool`: fits tools, fires from the item in hand
//! - `Armor`: fits armor, fires from worn armor
//! - `Any`: fits and fires from either

pub mod apply;

pub use apply::{apply_socket_gem, SocketApplyError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::combat::status::StatusType;
use crate::item::{Enchantment, ItemCategory};
use crate::text::replace_args;

/// Which item category a gem may be socketed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GemType {
    Tool,
    Armor,
    Any,
}

impl GemType {
    pub fn fits(self, category: ItemCategory) -> bool {
        match self {
            Self::Tool => category == ItemCategory::Tool,
            Self::Armor => category == ItemCategory::Armor,
            Self::Any => category.is_augmentable(),
        }
    }
}

/// Who an effect lands on, relative to the gem's wielder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTarget {
    #[serde(rename = "SELF")]
    Wielder,
    #[serde(rename = "OTHER")]
    Opponent,
    #[serde(rename = "AREA")]
    Area,
}

/// What an effect does to each recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Status {
        status: StatusType,
        duration_ticks: u32,
        intensity: u8,
    },
    Particle {
        particle: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketEffect {
    pub target: EffectTarget,
    /// Half-width of the cube searched by `Area` effects
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub affects_wielder: bool,
    #[serde(default)]
    pub affects_target: bool,
    pub kind: EffectKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandRunner {
    Console,
    PlayerChat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketCommand {
    pub runner: CommandRunner,
    /// May reference `%wielder%` and `%target%`
    pub command: String,
}

impl SocketCommand {
    pub fn needs_target(&self) -> bool {
        self.command.contains("%target%")
    }

    /// Fill in the placeholders. `None` when the command names a target but
    /// the opponent is not a player.
    pub fn render(&self, wielder: &str, target: Option<&str>) -> Option<String> {
        if self.needs_target() && target.is_none() {
            return None;
        }
        Some(replace_args(
            &self.command,
            &[("%wielder%", wielder), ("%target%", target.unwrap_or_default())],
        ))
    }
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketGem {
    pub name: String,
    pub gem_type: GemType,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub enchantments: BTreeMap<Enchantment, i32>,
    #[serde(default)]
    pub effects: Vec<SocketEffect>,
    #[serde(default)]
    pub commands: Vec<SocketCommand>,
    /// Relative weight when a gem is rolled as loot
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl SocketGem {
    pub fn new(name: &str, gem_type: GemType) -> Self {
        Self {
            name: name.to_string(),
            gem_type,
            prefix: String::new(),
            suffix: String::new(),
            lore: Vec::new(),
            enchantments: BTreeMap::new(),
            effects: Vec::new(),
            commands: Vec::new(),
            weight: default_weight(),
        }
    }
}

/// Can `gem` be socketed into an item of `category`?
pub fn gem_type_matches(gem: &SocketGem, category: ItemCategory) -> bool {
    gem.gem_type.fits(category)
}
