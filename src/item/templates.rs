//! Fixed item shapes: socket gem items, identity tomes and unidentified
//! placeholders.

use super::{Item, ItemMeta, Material};
use crate::config::{IdentifyingSettings, SockettingSettings};
use crate::sockets::SocketGem;
use crate::text::{colorize, colorize_all, strip_color};
use crate::tier::Tier;

const GEM_PLACEHOLDER: &str = "%socketgem%";

/// Colorized display name of the gem item for `gem_name`.
pub fn socket_gem_name(gem_name: &str, settings: &SockettingSettings) -> String {
    colorize(&settings.socket_gem_name.replace(GEM_PLACEHOLDER, gem_name))
}

pub fn socket_gem_item(material: &Material, gem: &SocketGem, settings: &SockettingSettings) -> Item {
    let mut lore = colorize_all(&settings.socket_gem_lore);
    lore.extend(colorize_all(&gem.lore));
    let meta = ItemMeta::named(socket_gem_name(&gem.name, settings)).with_lore(lore);
    Item::new(material.clone()).with_meta(meta)
}

/// Gem name carried by a socket gem item's display name, if the name fits the
/// configured template. Colors are ignored.
pub fn gem_name_from_display(display_name: &str, settings: &SockettingSettings) -> Option<String> {
    let template = strip_color(&colorize(&settings.socket_gem_name));
    let (before, after) = template.split_once(GEM_PLACEHOLDER)?;
    let stripped = strip_color(display_name);
    let name = stripped.strip_prefix(before)?.strip_suffix(after)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

pub fn identity_tome(settings: &IdentifyingSettings) -> Item {
    let meta = ItemMeta::named(colorize(&settings.identity_tome_name))
        .with_lore(colorize_all(&settings.identity_tome_lore));
    Item::new(settings.identity_tome_material.clone()).with_meta(meta)
}

pub fn is_identity_tome(item: &Item, settings: &IdentifyingSettings) -> bool {
    item.material == settings.identity_tome_material
        && item.display_name() == Some(colorize(&settings.identity_tome_name).as_str())
}

/// Placeholder for a not yet identified item of `material`. When the tier is
/// known it is recorded as the trailing lore line.
pub fn unidentified_item(material: &Material, hint: Option<&Tier>, settings: &IdentifyingSettings) -> Item {
    let mut lore = colorize_all(&settings.unidentified_item_lore);
    if let Some(tier) = hint {
        lore.push(tier.lore_line());
    }
    let meta = ItemMeta::named(colorize(&settings.unidentified_item_name)).with_lore(lore);
    Item::new(material.clone()).with_meta(meta)
}

pub fn is_unidentified(item: &Item, settings: &IdentifyingSettings) -> bool {
    item.display_name() == Some(colorize(&settings.unidentified_item_name).as_str())
}
