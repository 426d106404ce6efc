//! Generated items for a tier.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{Item, ItemMeta, Material};
use crate::config::SockettingSettings;
use crate::text::{colorize, colorize_all};
use crate::tier::Tier;

/// Build an item of `tier`.
///
/// The material is `material` when given, otherwise one of the tier's allowed
/// materials. Lore is the tier's base lore, a rolled number of open sockets
/// and the trailing tier line. Returns `None` when no material is available.
pub fn build_tiered_item<R>(
    tier: &Tier,
    material: Option<&Material>,
    use_durability: bool,
    socketting: &SockettingSettings,
    rng: &mut R,
) -> Option<Item>
where
    R: Rng + ?Sized,
{
    let material = match material {
        Some(m) => m.clone(),
        None => tier.allowed_materials.choose(rng)?.clone(),
    };

    let mut lore = colorize_all(&tier.base_lore);
    let sockets = roll_sockets(tier, rng);
    if sockets > 0 {
        let socket_line = colorize(
            &socketting
                .socketted_item_string
                .replace("%tiercolor%", &tier.display_color.to_string()),
        );
        lore.extend(std::iter::repeat(socket_line).take(sockets as usize));
        lore.extend(
            socketting
                .socketted_item_lore
                .iter()
                .map(|l| colorize(&l.replace("%tiercolor%", &tier.display_color.to_string()))),
        );
    }
    lore.push(tier.lore_line());

    let meta = ItemMeta {
        display_name: Some(format!(
            "{}{} {}",
            tier.display_color,
            strip_codes(&tier.display_name),
            material.pretty_name()
        )),
        lore,
        enchantments: tier.base_enchantments.clone(),
    };

    let mut item = Item::new(material).with_meta(meta);
    if use_durability {
        item.durability = durability_damage_for(
            &item.material,
            tier.minimum_durability,
            tier.maximum_durability,
            rng,
        );
    }
    tracing::trace!(tier = %tier.name, material = %item.material, sockets, "built tiered item");
    Some(item)
}

fn strip_codes(name: &str) -> String {
    crate::text::strip_color(&colorize(name))
}

fn roll_sockets<R: Rng + ?Sized>(tier: &Tier, rng: &mut R) -> u32 {
    let (low, high) = if tier.minimum_sockets <= tier.maximum_sockets {
        (tier.minimum_sockets, tier.maximum_sockets)
    } else {
        (tier.maximum_sockets, tier.minimum_sockets)
    };
    rng.gen_range(low..=high)
}

/// Damage to put on a fresh `material` so that between `min_remaining` and
/// `max_remaining` (fractions of full) durability is left.
pub fn durability_damage_for<R>(material: &Material, min_remaining: f64, max_remaining: f64, rng: &mut R) -> u16
where
    R: Rng + ?Sized,
{
    let max_durability = material.max_durability();
    if max_durability == 0 {
        return 0;
    }
    let low = min_remaining.min(max_remaining).clamp(0.0, 1.0);
    let high = min_remaining.max(max_remaining).clamp(0.0, 1.0);
    let remaining = if high > low { rng.gen_range(low..=high) } else { low };
    let full = f64::from(max_durability);
    (full - (full * remaining).round()).clamp(0.0, full) as u16
}
