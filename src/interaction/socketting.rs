//! Socket gem into item.

use rand::RngCore;

use super::{HeldItem, HeldItemFeature, MessageKeys};
use crate::config::ReferenceData;
use crate::constants::*;
use crate::item::Item;
use crate::sockets::{apply_socket_gem, gem_type_matches};

/// Held item: a socket gem. Target: a tool or armor piece with an open socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct Socketting;

impl HeldItemFeature for Socketting {
    const NAME: &'static str = "socketting";
    const PERMISSION: &'static str = PERMISSION_SOCKET;
    const MESSAGES: MessageKeys = MessageKeys {
        instructions: MSG_SOCKET_INSTRUCTIONS,
        cannot_use: MSG_SOCKET_CANNOT_USE,
        do_not_have: MSG_SOCKET_DO_NOT_HAVE,
        success: MSG_SOCKET_SUCCESS,
    };

    fn trigger_label(&self, item: &Item, data: &ReferenceData) -> Option<String> {
        if !data.config.socketting_enabled {
            return None;
        }
        data.socket_gem_by_item(item).map(|gem| gem.name.clone())
    }

    fn is_compatible(&self, held: &HeldItem, target: &Item, data: &ReferenceData) -> bool {
        data.socket_gem_by_name(&held.label)
            .is_some_and(|gem| gem_type_matches(gem, target.category()))
    }

    /// One gem per item in the target stack
    fn consumed_amount(&self, target: &Item) -> u32 {
        target.amount
    }

    fn transform(
        &self,
        held: &HeldItem,
        target: &Item,
        data: &ReferenceData,
        _rng: &mut dyn RngCore,
    ) -> Option<Item> {
        let gem = data.socket_gem_by_name(&held.label)?;
        let meta = target.meta.as_ref()?;
        let tier_color = data.tier_by_item(target).map(|tier| tier.display_color);
        match apply_socket_gem(meta, gem, tier_color, &data.socketting) {
            Ok(meta) => Some(Item {
                meta: Some(meta),
                ..target.clone()
            }),
            Err(err) => {
                tracing::debug!(gem = %gem.name, %err, "socketting failed");
                None
            }
        }
    }

    fn denies_armor_equip(&self, data: &ReferenceData) -> bool {
        !data.config.allow_equipping_items_via_right_click
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{HeldItemProtocol, InteractAction, InteractRequest, Outcome, Verdict};
    use crate::item::{build_tiered_item, templates, ItemMeta, Material};
    use crate::player::{Equipment, Inventory, Permissions, PlayerInventory};
    use crate::sockets::{GemType, SocketGem};
    use crate::text::{strip_color, ChatColor};
    use crate::tier::Tier;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn data() -> ReferenceData {
        let mut data = ReferenceData::default();
        data.tiers.push(
            Tier::new("Common", ChatColor::White, 1.0)
                .with_materials(&["IRON_SWORD", "IRON_CHESTPLATE"])
                .with_sockets(1, 1),
        );
        let mut fire = SocketGem::new("Fireheart", GemType::Tool);
        fire.lore = vec!["&cBurns foes".into()];
        data.socket_gems.push(fire);
        data.socket_gems.push(SocketGem::new("Stoneskin", GemType::Armor));
        data
    }

    struct Tester {
        protocol: HeldItemProtocol<Socketting>,
        equipment: Equipment,
        inventory: Inventory,
        permissions: Permissions,
        rng: Xoshiro256PlusPlus,
    }

    impl Tester {
        fn new() -> Self {
            Self {
                protocol: HeldItemProtocol::new(Socketting),
                equipment: Equipment::default(),
                inventory: Inventory::default(),
                permissions: Permissions::default().with(PERMISSION_SOCKET),
                rng: Xoshiro256PlusPlus::seed_from_u64(3),
            }
        }

        fn right_click(&mut self, hand: Item, data: &ReferenceData) -> Outcome {
            self.equipment.main_hand = Some(hand);
            let mut access = PlayerInventory {
                equipment: &mut self.equipment,
                inventory: &mut self.inventory,
            };
            let request = InteractRequest {
                player: "ann",
                action: InteractAction::RightClickAir,
                permissions: &self.permissions,
            };
            self.protocol.on_interact(request, &mut access, data, 0, &mut self.rng)
        }

        fn hand(&self) -> &Item {
            self.equipment.main_hand.as_ref().expect("main hand")
        }
    }

    fn gem_item(data: &ReferenceData, name: &str) -> Item {
        let gem = data.socket_gem_by_name(name).expect("gem");
        templates::socket_gem_item(&Material::new("EMERALD"), gem, &data.socketting)
    }

    fn tiered(data: &ReferenceData, material: &str) -> Item {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        build_tiered_item(&data.tiers[0], Some(&Material::new(material)), false, &data.socketting, &mut rng)
            .expect("tiered item")
    }

    #[test]
    fn test_socket_gem_into_sword() {
        let data = data();
        let mut player = Tester::new();
        let gem = gem_item(&data, "Fireheart");
        player.inventory.add(gem.clone());

        let first = player.right_click(gem, &data);
        assert!(first.is_denied());
        assert_eq!(player.protocol.held("ann").map(|h| h.label.as_str()), Some("Fireheart"));

        let second = player.right_click(tiered(&data, "IRON_SWORD"), &data);
        assert!(second.is_denied());
        assert_eq!(second.messages, vec![data.language.format(MSG_SOCKET_SUCCESS, &[])]);

        let lore: Vec<String> = player.hand().lore().iter().map(|l| strip_color(l)).collect();
        assert!(lore.contains(&"Fireheart".to_string()));
        assert!(lore.contains(&"Burns foes".to_string()));
        assert!(!lore.contains(&"(Socket)".to_string()));
        assert_eq!(player.inventory.count_occupied(), 0);
        assert_eq!(data.socket_gems_on(player.hand()).len(), 1);
    }

    #[test]
    fn test_gem_type_mismatch_leaves_item() {
        let data = data();
        let mut player = Tester::new();
        let gem = gem_item(&data, "Stoneskin");
        player.inventory.add(gem.clone());
        player.right_click(gem, &data);

        let sword = tiered(&data, "IRON_SWORD");
        let outcome = player.right_click(sword.clone(), &data);
        assert_eq!(outcome.messages, vec![data.language.format(MSG_SOCKET_CANNOT_USE, &[])]);
        assert_eq!(player.hand(), &sword);
        assert_eq!(player.inventory.count_occupied(), 1);
        assert!(!player.protocol.is_holding("ann"));
    }

    #[test]
    fn test_stack_needs_one_gem_per_item() {
        let data = data();
        let mut player = Tester::new();
        let gems = gem_item(&data, "Fireheart").with_amount(2);
        player.inventory.add(gems.clone());
        player.right_click(gems, &data);

        let swords = tiered(&data, "IRON_SWORD").with_amount(3);
        let outcome = player.right_click(swords.clone(), &data);
        assert_eq!(outcome.messages, vec![data.language.format(MSG_SOCKET_DO_NOT_HAVE, &[])]);
        assert_eq!(player.hand(), &swords);
    }

    #[test]
    fn test_no_open_socket_is_rejected() {
        let data = data();
        let mut player = Tester::new();
        let gem = gem_item(&data, "Fireheart");
        player.inventory.add(gem.clone().with_amount(1));
        player.right_click(gem.clone(), &data);

        let named = Item::new(Material::new("IRON_SWORD")).with_meta(ItemMeta::named("Plain Sword"));
        let outcome = player.right_click(named.clone(), &data);
        assert_eq!(outcome.messages, vec![data.language.format(MSG_SOCKET_CANNOT_USE, &[])]);
        assert_eq!(player.hand(), &named);
    }

    #[test]
    fn test_armor_equip_denied_when_disallowed() {
        let mut data = data();
        data.config.allow_equipping_items_via_right_click = false;
        let mut player = Tester::new();

        let outcome = player.right_click(tiered(&data, "IRON_CHESTPLATE"), &data);
        assert_eq!(outcome.verdict, Verdict::Deny);
        assert!(outcome.resync_inventory);
        assert!(outcome.messages.is_empty());

        data.config.allow_equipping_items_via_right_click = true;
        let outcome = player.right_click(tiered(&data, "IRON_CHESTPLATE"), &data);
        assert_eq!(outcome.verdict, Verdict::Proceed);
    }

    #[test]
    fn test_disabled_socketting_ignores_gems() {
        let mut data = data();
        data.config.socketting_enabled = false;
        let mut player = Tester::new();
        let outcome = player.right_click(gem_item(&data, "Fireheart"), &data);
        assert_eq!(outcome.verdict, Verdict::Proceed);
        assert!(!player.protocol.is_holding("ann"));
    }
}
