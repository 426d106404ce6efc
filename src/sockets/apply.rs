//! Merging a socket gem into an item's metadata.
//!
//! Every step works on the current metadata snapshot and leaves it alone when
//! the gem's contribution is already present, so gems can be socketed one at
//! a time across separate interactions.

use thiserror::Error;

use super::SocketGem;
use crate::config::SockettingSettings;
use crate::item::ItemMeta;
use crate::text::{
    colorize, contains_any_ignore_case, first_color, last_colors, strip_color, ChatColor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SocketApplyError {
    #[error("item has no open socket")]
    NoOpenSocket,
}

/// Socket `gem` into the first open socket of `meta`.
///
/// `tier_color` is the display color of the item's tier, if it has one; the
/// filled socket line takes that color, or the configured default.
pub fn apply_socket_gem(
    meta: &ItemMeta,
    gem: &SocketGem,
    tier_color: Option<ChatColor>,
    settings: &SockettingSettings,
) -> Result<ItemMeta, SocketApplyError> {
    let tier_code = tier_color.map(|c| c.to_string()).unwrap_or_default();
    let socket_line = colorize(&settings.socketted_item_string.replace("%tiercolor%", &tier_code));

    let index = index_ignoring_color(&meta.lore, &socket_line).ok_or(SocketApplyError::NoOpenSocket)?;

    let mut meta = meta.clone();
    let gem_color = tier_color.unwrap_or(settings.default_socket_color);
    meta.lore[index] = format!("{}{}", gem_color, gem.name);

    let placeholder_lore: Vec<String> = settings
        .socketted_item_lore
        .iter()
        .map(|line| colorize(&line.replace("%tiercolor%", &tier_code)))
        .collect();
    prune_ignoring_color(&mut meta.lore, &placeholder_lore);

    apply_prefix(&mut meta, gem, settings);
    apply_suffix(&mut meta, gem, settings);
    merge_lore(&mut meta, gem);
    merge_enchantments(&mut meta, gem);

    tracing::debug!(gem = %gem.name, socket = index, "socketed gem");
    Ok(meta)
}

fn same_ignoring_color(a: &str, b: &str) -> bool {
    strip_color(a).eq_ignore_ascii_case(&strip_color(b))
}

fn index_ignoring_color(lines: &[String], wanted: &str) -> Option<usize> {
    lines.iter().position(|line| same_ignoring_color(line, wanted))
}

fn prune_ignoring_color(lines: &mut Vec<String>, unwanted: &[String]) {
    lines.retain(|line| !unwanted.iter().any(|u| same_ignoring_color(line, u)));
}

/// Name modification is skipped when the policy forbids repeats and the
/// affix is already in the name, or when a reserved token is present.
fn affix_blocked(stripped_name: &str, affix: &str, reserved: &[String], settings: &SockettingSettings) -> bool {
    let affix = strip_color(&colorize(affix));
    (settings.prevent_multiple_changes_from_sockets && stripped_name.contains(&affix))
        || contains_any_ignore_case(stripped_name, reserved)
}

fn apply_prefix(meta: &mut ItemMeta, gem: &SocketGem, settings: &SockettingSettings) {
    let Some(name) = meta.display_name.as_deref() else {
        return;
    };
    if gem.prefix.is_empty() {
        return;
    }
    let stripped = strip_color(name);
    if affix_blocked(&stripped, &gem.prefix, &settings.socket_gem_prefixes, settings) {
        return;
    }
    let begin = first_color(name).unwrap_or(ChatColor::White);
    meta.display_name = Some(format!("{}{} {}", begin, colorize(&gem.prefix), name));
}

fn apply_suffix(meta: &mut ItemMeta, gem: &SocketGem, settings: &SockettingSettings) {
    let Some(name) = meta.display_name.as_deref() else {
        return;
    };
    if gem.suffix.is_empty() {
        return;
    }
    let stripped = strip_color(name);
    if affix_blocked(&stripped, &gem.suffix, &settings.socket_gem_suffixes, settings) {
        return;
    }
    let begin = first_color(name).unwrap_or(ChatColor::White);
    let trailing = last_colors(name);
    meta.display_name = Some(format!("{} {}{}{}", name, begin, colorize(&gem.suffix), trailing));
}

fn merge_lore(meta: &mut ItemMeta, gem: &SocketGem) {
    let gem_lore: Vec<String> = gem.lore.iter().map(|l| colorize(l)).collect();
    if gem_lore.iter().all(|line| meta.lore.contains(line)) {
        return;
    }
    meta.lore.extend(gem_lore);
}

/// Levels stack on top of what the item already has; no clamping.
fn merge_enchantments(meta: &mut ItemMeta, gem: &SocketGem) {
    for (enchantment, level) in &gem.enchantments {
        *meta.enchantments.entry(enchantment.clone()).or_insert(0) += level;
    }
}
