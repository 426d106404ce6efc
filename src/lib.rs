//! Tower Item Forge
//!
//! Item augmentation for the Tower MMORPG host:
//! - Loot tiers with distance-weighted selection
//! - Socket gems and the socketting protocol
//! - Identity tomes and unidentified items
//! - Combat dispatch of socketed gem effects and commands
//! - Monster equipment at spawn and loot on death
//! - Reference data loading, validation and hot reload

pub mod balance;
pub mod combat;
pub mod config;
pub mod constants;
pub mod engine;
pub mod hotreload;
pub mod interaction;
pub mod item;
pub mod logging;
pub mod loot;
pub mod player;
pub mod sockets;
pub mod text;
pub mod tier;
pub mod weighted;
