//! Centralized constants for the item forge.
//!
//! Tunables that belong to reference data live in the RON files instead;
//! these are protocol-level numbers and keys shared across modules.

// =====================================================
// Time
// =====================================================

/// Host game ticks per second; one schedule run is one tick
pub const TICKS_PER_SECOND: u64 = 20;

/// A started interaction waits this long for the second click (30 s)
pub const HELD_ITEM_TIMEOUT_TICKS: u64 = 30 * TICKS_PER_SECOND;

// =====================================================
// Loot
// =====================================================

/// Upper bound on chained items granted to one monster
pub const MAX_CHAIN_ITEMS: usize = 16;

/// Default seed for the forge RNG when none is configured
pub const DEFAULT_RNG_SEED: u64 = 42;

// =====================================================
// Permissions
// =====================================================

pub const PERMISSION_SOCKET: &str = "itemforge.socket";
pub const PERMISSION_IDENTIFY: &str = "itemforge.identify";

// =====================================================
// Language keys
// =====================================================

pub const MSG_SOCKET_INSTRUCTIONS: &str = "command.socket-instructions";
pub const MSG_SOCKET_CANNOT_USE: &str = "command.socket-cannot-use";
pub const MSG_SOCKET_DO_NOT_HAVE: &str = "command.socket-do-not-have";
pub const MSG_SOCKET_SUCCESS: &str = "command.socket-success";

pub const MSG_IDENTIFY_INSTRUCTIONS: &str = "command.identifying-instructions";
pub const MSG_IDENTIFY_CANNOT_USE: &str = "command.identifying-cannot-use";
pub const MSG_IDENTIFY_DO_NOT_HAVE: &str = "command.identifying-do-not-have";
pub const MSG_IDENTIFY_SUCCESS: &str = "command.identifying-success";

pub const MSG_FOUND_ITEM_BROADCAST: &str = "command.found-item-broadcast";
