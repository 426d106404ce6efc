//! Loading and validating reference data from a directory of RON files.
//!
//! Layout:
//! - `config.ron`: [`SettingsFile`] (optional, defaults apply)
//! - `tiers.ron`: list of tiers (required)
//! - `socket_gems.ron`: list of socket gems (optional)
//! - `custom_items.ron`: list of custom items (optional)
//! - `language.ron`: string map layered over the built-in strings (optional)

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{
    ConfigSettings, CreatureSpawningSettings, IdentifyingSettings, ReferenceData, SockettingSettings,
};
use crate::item::CustomItem;
use crate::sockets::SocketGem;
use crate::text::Language;
use crate::tier::Tier;

pub const SETTINGS_FILE: &str = "config.ron";
pub const TIERS_FILE: &str = "tiers.ron";
pub const SOCKET_GEMS_FILE: &str = "socket_gems.ron";
pub const CUSTOM_ITEMS_FILE: &str = "custom_items.ron";
pub const LANGUAGE_FILE: &str = "language.ron";

/// Every file the loader reads; a change to any of them triggers a reload.
pub const DATA_FILES: [&str; 5] = [
    SETTINGS_FILE,
    TIERS_FILE,
    SOCKET_GEMS_FILE,
    CUSTOM_ITEMS_FILE,
    LANGUAGE_FILE,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("{field} must be within [0, 1], got {value}")]
    Probability { field: String, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: String, value: f64 },
    #[error("tier {tier}: minimum durability {min} exceeds maximum {max}")]
    DurabilityRange { tier: String, min: f64, max: f64 },
    #[error("tier {tier}: minimum sockets {min} exceeds maximum {max}")]
    SocketRange { tier: String, min: u32, max: u32 },
    #[error("duplicate {kind} name: {name}")]
    Duplicate { kind: &'static str, name: String },
    #[error("entity type {entity} references unknown tier {tier}")]
    UnknownTier { entity: String, tier: String },
}

/// Contents of `config.ron`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub config: ConfigSettings,
    pub socketting: SockettingSettings,
    pub identifying: IdentifyingSettings,
    pub creature_spawning: CreatureSpawningSettings,
}

fn read_ron<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    if path.exists() {
        read_ron(path)
    } else {
        tracing::debug!(path = %path.display(), "optional data file missing, using defaults");
        Ok(T::default())
    }
}

/// Load and validate everything under `dir`.
pub fn load_reference_data(dir: &Path) -> Result<ReferenceData, ConfigError> {
    let settings: SettingsFile = read_optional(&dir.join(SETTINGS_FILE))?;
    let tiers: Vec<Tier> = read_ron(&dir.join(TIERS_FILE))?;
    let socket_gems: Vec<SocketGem> = read_optional(&dir.join(SOCKET_GEMS_FILE))?;
    let custom_items: Vec<CustomItem> = read_optional(&dir.join(CUSTOM_ITEMS_FILE))?;
    let language: Language = read_optional(&dir.join(LANGUAGE_FILE))?;

    let data = ReferenceData {
        config: settings.config,
        socketting: settings.socketting,
        identifying: settings.identifying,
        creature_spawning: settings.creature_spawning,
        tiers,
        socket_gems,
        custom_items,
        language: Language::builtin().merged(language),
    };
    validate(&data)?;

    tracing::info!(
        dir = %dir.display(),
        tiers = data.tiers.len(),
        socket_gems = data.socket_gems.len(),
        custom_items = data.custom_items.len(),
        "reference data loaded"
    );
    Ok(data)
}

fn check_probability(field: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability {
            field: field.into(),
            value,
        })
    }
}

fn check_unique<'a>(kind: &'static str, names: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Semantic checks that parsing alone cannot catch.
pub fn validate(data: &ReferenceData) -> Result<(), ConfigError> {
    let c = &data.config;
    check_probability("item_chance", c.item_chance)?;
    check_probability("custom_item_chance", c.custom_item_chance)?;
    check_probability("socket_gem_chance", c.socket_gem_chance)?;
    check_probability("unidentified_item_chance", c.unidentified_item_chance)?;
    check_probability("identity_tome_chance", c.identity_tome_chance)?;
    check_probability("chain_item_chance", c.chain_item_chance)?;

    for (entity, chance) in &data.creature_spawning.entity_type_chances {
        check_probability(format!("entity_type_chances.{entity}"), *chance)?;
    }

    check_unique("tier", data.tiers.iter().map(|t| t.name.as_str()))?;
    for tier in &data.tiers {
        check_probability(format!("{}.drop_chance", tier.name), tier.drop_chance)?;
        check_probability(format!("{}.minimum_durability", tier.name), tier.minimum_durability)?;
        check_probability(format!("{}.maximum_durability", tier.name), tier.maximum_durability)?;
        if tier.spawn_chance < 0.0 {
            return Err(ConfigError::Negative {
                field: format!("{}.spawn_chance", tier.name),
                value: tier.spawn_chance,
            });
        }
        if tier.identify_chance < 0.0 {
            return Err(ConfigError::Negative {
                field: format!("{}.identify_chance", tier.name),
                value: tier.identify_chance,
            });
        }
        if tier.minimum_durability > tier.maximum_durability {
            return Err(ConfigError::DurabilityRange {
                tier: tier.name.clone(),
                min: tier.minimum_durability,
                max: tier.maximum_durability,
            });
        }
        if tier.minimum_sockets > tier.maximum_sockets {
            return Err(ConfigError::SocketRange {
                tier: tier.name.clone(),
                min: tier.minimum_sockets,
                max: tier.maximum_sockets,
            });
        }
    }

    check_unique("socket gem", data.socket_gems.iter().map(|g| g.name.as_str()))?;
    for gem in &data.socket_gems {
        if gem.weight < 0.0 {
            return Err(ConfigError::Negative {
                field: format!("{}.weight", gem.name),
                value: gem.weight,
            });
        }
    }

    check_unique("custom item", data.custom_items.iter().map(|c| c.name.as_str()))?;

    for (entity, tiers) in &data.creature_spawning.entity_type_tiers {
        for tier in tiers {
            if data.tier_by_name(tier).is_none() {
                return Err(ConfigError::UnknownTier {
                    entity: entity.clone(),
                    tier: tier.clone(),
                });
            }
        }
    }
    Ok(())
}
