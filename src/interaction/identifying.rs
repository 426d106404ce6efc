//! Identity tome on unidentified item.

use rand::RngCore;

use super::{HeldItem, HeldItemFeature, MessageKeys};
use crate::config::ReferenceData;
use crate::constants::*;
use crate::item::{build_tiered_item, templates, Item};
use crate::text::colorize_all;
use crate::tier::{random_tier_with_identify_chance, Tier};

/// Held item: an identity tome. Target: an unidentified item, which becomes a
/// tiered item of the same material.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identifying;

impl Identifying {
    /// The tier hinted by the trailing lore line, otherwise a roll weighted by
    /// identify chance among tiers allowed for the material.
    pub fn resolve_tier<'a>(target: &Item, data: &'a ReferenceData, rng: &mut dyn RngCore) -> Option<&'a Tier> {
        if let Some(tier) = target.lore().last().and_then(|line| data.tier_by_label(line)) {
            return Some(tier);
        }
        let candidates = data.tiers_for_material(&target.material);
        random_tier_with_identify_chance(&candidates, rng)
    }
}

impl HeldItemFeature for Identifying {
    const NAME: &'static str = "identifying";
    const PERMISSION: &'static str = PERMISSION_IDENTIFY;
    const MESSAGES: MessageKeys = MessageKeys {
        instructions: MSG_IDENTIFY_INSTRUCTIONS,
        cannot_use: MSG_IDENTIFY_CANNOT_USE,
        do_not_have: MSG_IDENTIFY_DO_NOT_HAVE,
        success: MSG_IDENTIFY_SUCCESS,
    };

    fn trigger_label(&self, item: &Item, data: &ReferenceData) -> Option<String> {
        if !data.config.identifying_enabled || !templates::is_identity_tome(item, &data.identifying) {
            return None;
        }
        item.display_name().map(str::to_string)
    }

    fn is_compatible(&self, _held: &HeldItem, target: &Item, data: &ReferenceData) -> bool {
        templates::is_unidentified(target, &data.identifying)
    }

    fn consumed_amount(&self, _target: &Item) -> u32 {
        1
    }

    fn transform(
        &self,
        _held: &HeldItem,
        target: &Item,
        data: &ReferenceData,
        rng: &mut dyn RngCore,
    ) -> Option<Item> {
        let tier = Self::resolve_tier(target, data, rng)?;
        let mut item = build_tiered_item(tier, Some(&target.material), false, &data.socketting, rng)?;
        item.durability = target.durability;

        // Lore the placeholder picked up on top of its template survives, ahead
        // of the trailing tier line.
        let template = colorize_all(&data.identifying.unidentified_item_lore);
        let hint = tier.lore_line();
        let extra: Vec<String> = target
            .lore()
            .iter()
            .filter(|line| !template.contains(line) && **line != hint)
            .cloned()
            .collect();
        if let Some(meta) = item.meta.as_mut() {
            let at = meta.lore.len().saturating_sub(1);
            meta.lore.splice(at..at, extra);
        }
        tracing::debug!(tier = %tier.name, material = %target.material, "identified");
        Some(item)
    }
}
