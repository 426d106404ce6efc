use super::{templates, CustomItem, Item};
use crate::config::ReferenceData;
use crate::sockets::SocketGem;
use crate::tier::Tier;

/// Where an item came from, as far as the forge can tell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemKind<'a> {
    Custom(&'a CustomItem),
    SocketGem(&'a SocketGem),
    IdentityTome,
    Unidentified,
    Tiered(&'a Tier),
    Plain,
}

/// Classify `item` once. Checks run in a fixed order and the first match
/// wins: custom, socket gem, identity tome, unidentified, tiered.
pub fn classify<'a>(item: &Item, data: &'a ReferenceData) -> ItemKind<'a> {
    if item.meta.is_none() {
        return ItemKind::Plain;
    }
    if let Some(custom) = data.custom_item_by_item(item) {
        return ItemKind::Custom(custom);
    }
    if let Some(gem) = data.socket_gem_by_item(item) {
        return ItemKind::SocketGem(gem);
    }
    if templates::is_identity_tome(item, &data.identifying) {
        return ItemKind::IdentityTome;
    }
    if templates::is_unidentified(item, &data.identifying) {
        return ItemKind::Unidentified;
    }
    match data.tier_by_item(item) {
        Some(tier) => ItemKind::Tiered(tier),
        None => ItemKind::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{build_tiered_item, ItemMeta, Material};
    use crate::sockets::GemType;
    use crate::text::ChatColor;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn data() -> ReferenceData {
        let mut data = ReferenceData::default();
        data.tiers
            .push(Tier::new("Rare", ChatColor::Blue, 0.3).with_materials(&["IRON_SWORD"]));
        data.socket_gems.push(SocketGem::new("Fireheart", GemType::Tool));
        data.custom_items.push(CustomItem {
            name: "relic".to_string(),
            display_name: "&dRelic".to_string(),
            material: Material::new("STICK"),
            lore: Vec::new(),
            enchantments: Default::default(),
            chance_to_be_given_to_monster: 1.0,
            broadcast_on_find: false,
            durability: 0,
        });
        data
    }

    #[test]
    fn test_classify_each_kind() {
        let data = data();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        let custom = data.custom_items[0].to_item();
        assert!(matches!(classify(&custom, &data), ItemKind::Custom(c) if c.name == "relic"));

        let gem = templates::socket_gem_item(&Material::new("EMERALD"), &data.socket_gems[0], &data.socketting);
        assert!(matches!(classify(&gem, &data), ItemKind::SocketGem(g) if g.name == "Fireheart"));

        let tome = templates::identity_tome(&data.identifying);
        assert_eq!(classify(&tome, &data), ItemKind::IdentityTome);

        let unid = templates::unidentified_item(&Material::new("IRON_SWORD"), Some(&data.tiers[0]), &data.identifying);
        assert_eq!(classify(&unid, &data), ItemKind::Unidentified);

        let tiered = build_tiered_item(&data.tiers[0], None, false, &data.socketting, &mut rng).unwrap();
        assert!(matches!(classify(&tiered, &data), ItemKind::Tiered(t) if t.name == "Rare"));

        let plain = Item::new(Material::new("IRON_SWORD")).with_meta(ItemMeta::named("Stick of Truth"));
        assert_eq!(classify(&plain, &data), ItemKind::Plain);
        assert_eq!(classify(&Item::new(Material::new("DIRT")), &data), ItemKind::Plain);
    }
}
