//! Two-step held-item interactions.
//!
//! A player right-clicks with a trigger item (a socket gem, an identity tome)
//! in the main hand; the forge remembers it and waits for a second right-click
//! with the target item. Between the two clicks the player has
//! [`HELD_ITEM_TIMEOUT_TICKS`] ticks. Dying, timing out, or completing the
//! second click (successfully or not) clears the held record.
//!
//! The protocol is written once in [`HeldItemProtocol`] and specialized by a
//! [`HeldItemFeature`]; socketting and identifying are the two features.

pub mod identifying;
pub mod socketting;
pub mod timer;

pub use identifying::Identifying;
pub use socketting::Socketting;
pub use timer::{ExpiryTimers, TimerHandle};

use bevy::prelude::*;
use rand::RngCore;
use std::collections::HashMap;

use crate::config::ReferenceData;
use crate::constants::HELD_ITEM_TIMEOUT_TICKS;
use crate::engine::{ForgeRng, GameClock, GameTick};
use crate::item::{Item, ItemCategory};
use crate::player::{Equipment, Inventory, InventoryAccess, Permissions, Player, PlayerInventory};

// =====================================================
// Plugin
// =====================================================

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HeldItemProtocol::new(Socketting))
            .insert_resource(HeldItemProtocol::new(Identifying))
            .add_event::<PlayerInteractEvent>()
            .add_event::<PlayerDeathEvent>()
            .add_event::<PlayerMessageEvent>()
            .add_event::<InteractOutcomeEvent>()
            .add_systems(
                Update,
                (
                    clear_held_on_death::<Socketting>,
                    clear_held_on_death::<Identifying>,
                    handle_interactions::<Socketting>,
                    handle_interactions::<Identifying>,
                    expire_held_items::<Socketting>,
                    expire_held_items::<Identifying>,
                )
                    .chain(),
            );
    }
}

// =====================================================
// Events
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    RightClickAir,
    RightClickBlock,
    LeftClickAir,
    LeftClickBlock,
    Physical,
}

impl InteractAction {
    pub fn is_right_click(self) -> bool {
        matches!(self, Self::RightClickAir | Self::RightClickBlock)
    }
}

/// A player clicked with whatever is in their main hand
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerInteractEvent {
    pub player: Entity,
    pub action: InteractAction,
}

#[derive(Event, Debug, Clone)]
pub struct PlayerDeathEvent {
    pub name: String,
}

/// Chat line for one player
#[derive(Event, Debug, Clone)]
pub struct PlayerMessageEvent {
    pub player: Entity,
    pub text: String,
}

/// Sent when a feature denied the host's default click handling
#[derive(Event, Debug, Clone)]
pub struct InteractOutcomeEvent {
    pub player: Entity,
    pub feature: &'static str,
    pub outcome: Outcome,
}

// =====================================================
// Outcome
// =====================================================

/// Whether the host should go on with its own click handling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Proceed,
    Deny,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    /// Already formatted and colorized
    pub messages: Vec<String>,
    /// The client's view of the inventory is stale and must be resent
    pub resync_inventory: bool,
}

impl Outcome {
    pub fn is_denied(&self) -> bool {
        self.verdict == Verdict::Deny
    }

    fn deny(&mut self) {
        self.verdict = Verdict::Deny;
        self.resync_inventory = true;
    }

    fn say(&mut self, data: &ReferenceData, key: &str) {
        let text = data.language.format(key, &[]);
        if !text.is_empty() {
            self.messages.push(text);
        }
    }
}

/// Why a second click did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Target is not a named tool or armor piece
    NotAugmentable,
    /// The trigger stack left the player's inventory
    TriggerMissing,
    Incompatible,
    /// More targets in the stack than triggers
    InsufficientQuantity,
    TransformFailed,
}

impl Rejection {
    fn message_key(self, keys: &MessageKeys) -> &'static str {
        match self {
            Self::TriggerMissing | Self::InsufficientQuantity => keys.do_not_have,
            Self::NotAugmentable | Self::Incompatible | Self::TransformFailed => keys.cannot_use,
        }
    }
}

// =====================================================
// Feature
// =====================================================

/// Language keys a feature reports with
#[derive(Debug, Clone, Copy)]
pub struct MessageKeys {
    pub instructions: &'static str,
    pub cannot_use: &'static str,
    pub do_not_have: &'static str,
    pub success: &'static str,
}

/// What varies between held-item interactions.
pub trait HeldItemFeature: Send + Sync + 'static {
    const NAME: &'static str;
    const PERMISSION: &'static str;
    const MESSAGES: MessageKeys;

    /// Label to remember when `item` starts this interaction, or `None` if it
    /// is not this feature's trigger item.
    fn trigger_label(&self, item: &Item, data: &ReferenceData) -> Option<String>;

    fn is_compatible(&self, held: &HeldItem, target: &Item, data: &ReferenceData) -> bool;

    /// How many trigger items one completion uses up
    fn consumed_amount(&self, target: &Item) -> u32;

    fn transform(
        &self,
        held: &HeldItem,
        target: &Item,
        data: &ReferenceData,
        rng: &mut dyn RngCore,
    ) -> Option<Item>;

    /// Should right-clicking a piece of armor be stopped from equipping it?
    fn denies_armor_equip(&self, _data: &ReferenceData) -> bool {
        false
    }
}

// =====================================================
// Protocol
// =====================================================

/// A started interaction waiting for its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldItem {
    pub label: String,
    /// The trigger stack as it was when the interaction started
    pub item: Item,
    pub timer: TimerHandle,
}

impl HeldItem {
    /// Tick at which the record is dropped if no target was clicked
    pub fn expiry(&self) -> GameTick {
        self.timer.due()
    }
}

/// One click as the protocol sees it
#[derive(Debug, Clone, Copy)]
pub struct InteractRequest<'a> {
    pub player: &'a str,
    pub action: InteractAction,
    pub permissions: &'a Permissions,
}

/// Per-feature held-item state: at most one record per player.
pub struct HeldItemProtocol<F: HeldItemFeature> {
    feature: F,
    held: HashMap<String, HeldItem>,
    timers: ExpiryTimers,
    timeout: GameTick,
}

impl<F: HeldItemFeature> Resource for HeldItemProtocol<F> {}

impl<F: HeldItemFeature> HeldItemProtocol<F> {
    pub fn new(feature: F) -> Self {
        Self {
            feature,
            held: HashMap::new(),
            timers: ExpiryTimers::default(),
            timeout: HELD_ITEM_TIMEOUT_TICKS,
        }
    }

    pub fn with_timeout(mut self, ticks: GameTick) -> Self {
        self.timeout = ticks;
        self
    }

    pub fn held(&self, player: &str) -> Option<&HeldItem> {
        self.held.get(player)
    }

    pub fn is_holding(&self, player: &str) -> bool {
        self.held.contains_key(player)
    }

    pub fn holding_count(&self) -> usize {
        self.held.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Handle one click. Left clicks, empty hands and players without the
    /// feature's permission pass through untouched.
    pub fn on_interact<I>(
        &mut self,
        request: InteractRequest<'_>,
        inventory: &mut I,
        data: &ReferenceData,
        now: GameTick,
        rng: &mut dyn RngCore,
    ) -> Outcome
    where
        I: InventoryAccess + ?Sized,
    {
        let mut outcome = Outcome::default();
        if !request.action.is_right_click() {
            return outcome;
        }
        let Some(hand) = inventory.main_hand().cloned() else {
            return outcome;
        };
        if !request.permissions.has(F::PERMISSION) {
            tracing::trace!(feature = F::NAME, player = request.player, "missing permission");
            return outcome;
        }

        if self.feature.denies_armor_equip(data)
            && hand.category() == ItemCategory::Armor
            && hand.meta.is_some()
        {
            outcome.deny();
        }

        if self.held.contains_key(request.player) {
            self.complete(request.player, &hand, inventory, data, rng, &mut outcome);
            self.clear(request.player);
        } else {
            self.begin(request.player, &hand, data, now, &mut outcome);
        }
        outcome
    }

    fn begin(
        &mut self,
        player: &str,
        hand: &Item,
        data: &ReferenceData,
        now: GameTick,
        outcome: &mut Outcome,
    ) {
        let Some(label) = self.feature.trigger_label(hand, data) else {
            return;
        };
        outcome.say(data, F::MESSAGES.instructions);

        let expiry = now + self.timeout;
        let timer = self.timers.schedule(expiry, player);
        tracing::debug!(feature = F::NAME, player, label = %label, expiry, "awaiting target");
        self.held.insert(
            player.to_string(),
            HeldItem {
                label,
                item: hand.clone(),
                timer,
            },
        );
        outcome.deny();
    }

    fn complete<I>(
        &mut self,
        player: &str,
        target: &Item,
        inventory: &mut I,
        data: &ReferenceData,
        rng: &mut dyn RngCore,
        outcome: &mut Outcome,
    ) where
        I: InventoryAccess + ?Sized,
    {
        let Some(held) = self.held.get(player).cloned() else {
            return;
        };
        match self.validate_and_transform(&held, target, &*inventory, data, rng) {
            Ok(result) => {
                let amount = self.feature.consumed_amount(target);
                inventory.consume(&held.item, amount);
                inventory.set_main_hand(Some(result));
                outcome.say(data, F::MESSAGES.success);
                tracing::info!(feature = F::NAME, player, label = %held.label, "interaction completed");
            }
            Err(rejection) => {
                outcome.say(data, rejection.message_key(&F::MESSAGES));
                tracing::debug!(feature = F::NAME, player, ?rejection, "interaction rejected");
            }
        }
        outcome.deny();
    }

    fn validate_and_transform<I>(
        &self,
        held: &HeldItem,
        target: &Item,
        inventory: &I,
        data: &ReferenceData,
        rng: &mut dyn RngCore,
    ) -> Result<Item, Rejection>
    where
        I: InventoryAccess + ?Sized,
    {
        if !target.category().is_augmentable() || target.display_name().is_none() {
            return Err(Rejection::NotAugmentable);
        }
        if !inventory.contains(&held.item) {
            return Err(Rejection::TriggerMissing);
        }
        if !self.feature.is_compatible(held, target, data) {
            return Err(Rejection::Incompatible);
        }
        if target.amount > held.item.amount {
            return Err(Rejection::InsufficientQuantity);
        }
        self.feature
            .transform(held, target, data, rng)
            .ok_or(Rejection::TransformFailed)
    }

    /// Forget a player's held record and cancel its timer.
    pub fn clear(&mut self, player: &str) -> bool {
        match self.held.remove(player) {
            Some(held) => {
                self.timers.cancel(held.timer);
                true
            }
            None => false,
        }
    }

    pub fn on_player_death(&mut self, player: &str) {
        if self.clear(player) {
            tracing::debug!(feature = F::NAME, player, "held item cleared on death");
        }
    }

    /// Drop records whose timer fired at or before `now`. A fired timer only
    /// removes the record it was scheduled for.
    pub fn expire(&mut self, now: GameTick) -> Vec<String> {
        let mut expired = Vec::new();
        for (handle, player) in self.timers.pop_due(now) {
            let current = self.held.get(&player).map(|held| held.timer);
            if current == Some(handle) {
                self.held.remove(&player);
                expired.push(player);
            }
        }
        expired
    }
}

// =====================================================
// Systems
// =====================================================

#[allow(clippy::too_many_arguments)]
pub fn handle_interactions<F: HeldItemFeature>(
    mut events: EventReader<PlayerInteractEvent>,
    mut protocol: ResMut<HeldItemProtocol<F>>,
    mut players: Query<(&Player, &Permissions, &mut Equipment, &mut Inventory)>,
    data: Res<ReferenceData>,
    clock: Res<GameClock>,
    mut rng: ResMut<ForgeRng>,
    mut messages: EventWriter<PlayerMessageEvent>,
    mut outcomes: EventWriter<InteractOutcomeEvent>,
) {
    for event in events.read() {
        let Ok((player, permissions, mut equipment, mut inventory)) = players.get_mut(event.player)
        else {
            continue;
        };
        let mut access = PlayerInventory {
            equipment: &mut *equipment,
            inventory: &mut *inventory,
        };
        let request = InteractRequest {
            player: &player.name,
            action: event.action,
            permissions,
        };
        let outcome = protocol.on_interact(request, &mut access, &data, clock.now(), &mut rng.0);

        for text in &outcome.messages {
            messages.send(PlayerMessageEvent {
                player: event.player,
                text: text.clone(),
            });
        }
        if outcome.is_denied() {
            outcomes.send(InteractOutcomeEvent {
                player: event.player,
                feature: F::NAME,
                outcome,
            });
        }
    }
}

pub fn expire_held_items<F: HeldItemFeature>(
    mut protocol: ResMut<HeldItemProtocol<F>>,
    clock: Res<GameClock>,
) {
    for player in protocol.expire(clock.now()) {
        tracing::debug!(feature = F::NAME, player = %player, "held item expired");
    }
}

pub fn clear_held_on_death<F: HeldItemFeature>(
    mut events: EventReader<PlayerDeathEvent>,
    mut protocol: ResMut<HeldItemProtocol<F>>,
) {
    for event in events.read() {
        protocol.on_player_death(&event.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemMeta, Material};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// Renames a named sword using a book whose name becomes the label.
    struct Rename;

    impl HeldItemFeature for Rename {
        const NAME: &'static str = "rename";
        const PERMISSION: &'static str = "test.rename";
        const MESSAGES: MessageKeys = MessageKeys {
            instructions: "command.socket-instructions",
            cannot_use: "command.socket-cannot-use",
            do_not_have: "command.socket-do-not-have",
            success: "command.socket-success",
        };

        fn trigger_label(&self, item: &Item, _data: &ReferenceData) -> Option<String> {
            (item.material == Material::new("BOOK"))
                .then(|| item.display_name().map(str::to_string))
                .flatten()
        }

        fn is_compatible(&self, _held: &HeldItem, target: &Item, _data: &ReferenceData) -> bool {
            target.category() == ItemCategory::Tool
        }

        fn consumed_amount(&self, _target: &Item) -> u32 {
            1
        }

        fn transform(
            &self,
            held: &HeldItem,
            target: &Item,
            _data: &ReferenceData,
            _rng: &mut dyn RngCore,
        ) -> Option<Item> {
            Some(target.clone().with_meta(ItemMeta::named(held.label.clone())))
        }
    }

    fn book() -> Item {
        Item::new(Material::new("BOOK")).with_meta(ItemMeta::named("Excalibur"))
    }

    fn sword() -> Item {
        Item::new(Material::new("IRON_SWORD")).with_meta(ItemMeta::named("Old Sword"))
    }

    struct Fixture {
        protocol: HeldItemProtocol<Rename>,
        equipment: Equipment,
        inventory: Inventory,
        permissions: Permissions,
        data: ReferenceData,
        rng: Xoshiro256PlusPlus,
    }

    impl Fixture {
        fn new() -> Self {
            let mut inventory = Inventory::default();
            inventory.add(book());
            Self {
                protocol: HeldItemProtocol::new(Rename).with_timeout(10),
                equipment: Equipment::default(),
                inventory,
                permissions: Permissions::default().with("test.rename"),
                data: ReferenceData::default(),
                rng: Xoshiro256PlusPlus::seed_from_u64(1),
            }
        }

        fn click(&mut self, hand: Option<Item>, action: InteractAction, now: GameTick) -> Outcome {
            self.equipment.main_hand = hand;
            let mut access = PlayerInventory {
                equipment: &mut self.equipment,
                inventory: &mut self.inventory,
            };
            let request = InteractRequest {
                player: "ann",
                action,
                permissions: &self.permissions,
            };
            self.protocol
                .on_interact(request, &mut access, &self.data, now, &mut self.rng)
        }
    }

    #[test]
    fn test_two_clicks_complete() {
        let mut f = Fixture::new();
        let first = f.click(Some(book()), InteractAction::RightClickAir, 0);
        assert!(first.is_denied());
        assert!(first.resync_inventory);
        assert_eq!(first.messages.len(), 1);
        assert!(f.protocol.is_holding("ann"));

        let second = f.click(Some(sword()), InteractAction::RightClickBlock, 5);
        assert!(second.is_denied());
        assert!(!f.protocol.is_holding("ann"));
        assert_eq!(f.protocol.pending_timers(), 0);
        assert_eq!(
            f.equipment.main_hand.as_ref().and_then(|i| i.display_name()),
            Some("Excalibur")
        );
        assert_eq!(f.inventory.count_occupied(), 0);
    }

    #[test]
    fn test_left_click_and_empty_hand_pass_through() {
        let mut f = Fixture::new();
        assert_eq!(f.click(Some(book()), InteractAction::LeftClickAir, 0), Outcome::default());
        assert_eq!(f.click(None, InteractAction::RightClickAir, 0), Outcome::default());
        assert!(!f.protocol.is_holding("ann"));
    }

    #[test]
    fn test_permission_required() {
        let mut f = Fixture::new();
        f.permissions = Permissions::default();
        let outcome = f.click(Some(book()), InteractAction::RightClickAir, 0);
        assert_eq!(outcome.verdict, Verdict::Proceed);
        assert!(!f.protocol.is_holding("ann"));
    }

    #[test]
    fn test_non_trigger_item_proceeds() {
        let mut f = Fixture::new();
        let outcome = f.click(Some(sword()), InteractAction::RightClickAir, 0);
        assert_eq!(outcome.verdict, Verdict::Proceed);
        assert!(outcome.messages.is_empty());
    }

    #[test]
    fn test_timeout_clears_record() {
        let mut f = Fixture::new();
        f.click(Some(book()), InteractAction::RightClickAir, 0);
        assert_eq!(f.protocol.held("ann").map(HeldItem::expiry), Some(10));
        assert!(f.protocol.expire(9).is_empty());
        assert_eq!(f.protocol.expire(10), vec!["ann".to_string()]);
        assert!(!f.protocol.is_holding("ann"));

        // A fresh click after the timeout starts over instead of completing
        let outcome = f.click(Some(sword()), InteractAction::RightClickAir, 11);
        assert_eq!(outcome.verdict, Verdict::Proceed);
        assert_eq!(
            f.equipment.main_hand.as_ref().and_then(|i| i.display_name()),
            Some("Old Sword")
        );
    }

    #[test]
    fn test_stale_timer_leaves_newer_record() {
        let mut f = Fixture::new();
        f.click(Some(book()), InteractAction::RightClickAir, 0);
        f.click(Some(Item::new(Material::new("STICK"))), InteractAction::RightClickAir, 1);
        assert!(!f.protocol.is_holding("ann"));

        f.click(Some(book()), InteractAction::RightClickAir, 5);
        assert_eq!(f.protocol.held("ann").map(HeldItem::expiry), Some(15));
        assert!(f.protocol.expire(10).is_empty());
        assert!(f.protocol.is_holding("ann"));
        assert_eq!(f.protocol.expire(15), vec!["ann".to_string()]);
    }

    #[test]
    fn test_failed_completion_still_clears() {
        let mut f = Fixture::new();
        f.click(Some(book()), InteractAction::RightClickAir, 0);
        let outcome = f.click(Some(Item::new(Material::new("STICK"))), InteractAction::RightClickAir, 1);
        assert!(outcome.is_denied());
        assert_eq!(outcome.messages.len(), 1);
        assert!(!f.protocol.is_holding("ann"));
        assert_eq!(f.inventory.count_occupied(), 1);
    }

    #[test]
    fn test_trigger_missing_from_inventory() {
        let mut f = Fixture::new();
        f.click(Some(book()), InteractAction::RightClickAir, 0);
        f.inventory = Inventory::default();
        f.click(Some(sword()), InteractAction::RightClickAir, 1);
        assert_eq!(
            f.equipment.main_hand.as_ref().and_then(|i| i.display_name()),
            Some("Old Sword")
        );
    }

    #[test]
    fn test_target_stack_larger_than_trigger_stack() {
        let mut f = Fixture::new();
        f.click(Some(book()), InteractAction::RightClickAir, 0);
        f.click(Some(sword().with_amount(2)), InteractAction::RightClickAir, 1);
        assert_eq!(f.inventory.count_occupied(), 1);
    }

    #[test]
    fn test_death_clears() {
        let mut f = Fixture::new();
        f.click(Some(book()), InteractAction::RightClickAir, 0);
        f.protocol.on_player_death("ann");
        assert!(!f.protocol.is_holding("ann"));
        assert_eq!(f.protocol.pending_timers(), 0);
    }
}
