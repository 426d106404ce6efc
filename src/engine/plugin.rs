use bevy::prelude::*;

use crate::combat::CombatPlugin;
use crate::config::ReferenceData;
use crate::engine::{advance_clock, ForgeConfig, ForgeRng, GameClock};
use crate::hotreload::HotReloadPlugin;
use crate::interaction::InteractionPlugin;
use crate::logging::LoggingPlugin;
use crate::loot::LootPlugin;

/// Everything the forge needs in one plugin: shared resources, the tick
/// clock and every subsystem plugin.
pub struct ItemForgePlugin {
    pub config: ForgeConfig,
    pub data: ReferenceData,
}

impl ItemForgePlugin {
    pub fn new(config: ForgeConfig, data: ReferenceData) -> Self {
        Self { config, data }
    }
}

impl Plugin for ItemForgePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(self.data.clone())
            .init_resource::<GameClock>()
            .insert_resource(ForgeRng::from_seed(self.config.rng_seed))
            .add_systems(First, advance_clock)
            .add_plugins((
                LoggingPlugin::default(),
                InteractionPlugin,
                CombatPlugin,
                LootPlugin,
                HotReloadPlugin,
            ));
        tracing::info!(
            seed = self.config.rng_seed,
            tiers = self.data.tiers.len(),
            "item forge ready"
        );
    }
}
