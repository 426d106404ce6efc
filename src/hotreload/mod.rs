//! Hot reload of the reference data directory.
//!
//! A `notify` watcher on [`ForgeConfig::data_dir`] feeds filesystem events
//! into a channel that a bevy system drains once per tick. Any change to one
//! of the data files reloads the whole directory; the new data replaces the
//! [`ReferenceData`] resource only if it loads and validates, otherwise the
//! previous data stays in place.

use bevy::prelude::*;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use crate::config::{load_reference_data, ConfigError, ReferenceData, DATA_FILES};
use crate::engine::{ForgeConfig, GameClock, GameTick};

pub struct HotReloadPlugin;

impl Plugin for HotReloadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HotReloadState>()
            .add_event::<ReferenceReloadEvent>()
            .add_systems(Startup, setup_data_watcher)
            .add_systems(Update, process_data_changes);
    }
}

#[derive(Resource, Debug, Default)]
pub struct HotReloadState {
    pub enabled: bool,
    pub watched_dir: Option<PathBuf>,
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_reload_tick: GameTick,
    pub last_error: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct ReferenceReloadEvent {
    pub dir: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Resource)]
struct WatcherResource {
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
}

fn setup_data_watcher(
    mut commands: Commands,
    config: Res<ForgeConfig>,
    mut state: ResMut<HotReloadState>,
) {
    if !config.hot_reload {
        return;
    }
    let dir = config.data_dir.clone();
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "data directory not found, hot reload disabled");
        return;
    }

    let (tx, rx) = channel();
    let mut watcher = match notify::recommended_watcher(tx) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(error = %e, "failed to create file watcher");
            return;
        }
    };
    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        tracing::error!(dir = %dir.display(), error = %e, "failed to watch data directory");
        return;
    }

    state.enabled = true;
    state.watched_dir = Some(dir.clone());
    commands.insert_resource(WatcherResource {
        _watcher: watcher,
        receiver: Mutex::new(rx),
    });
    tracing::info!(dir = %dir.display(), "hot reload enabled");
}

fn process_data_changes(
    watcher: Option<Res<WatcherResource>>,
    mut state: ResMut<HotReloadState>,
    mut data: ResMut<ReferenceData>,
    clock: Res<GameClock>,
    mut events: EventWriter<ReferenceReloadEvent>,
) {
    let Some(watcher) = watcher else {
        return;
    };
    let mut changed = false;
    if let Ok(receiver) = watcher.receiver.lock() {
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(event) => changed |= is_data_change(&event),
                Err(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        }
    }
    if !changed {
        return;
    }
    let Some(dir) = state.watched_dir.clone() else {
        return;
    };

    // Several writes usually land together; one reload covers them all
    let result = reload_reference_data(&dir, &mut data);
    state.last_reload_tick = clock.now();
    match result {
        Ok(()) => {
            state.reload_count += 1;
            state.last_reload_success = true;
            state.last_error = None;
            tracing::info!(reloads = state.reload_count, "reference data reloaded");
            events.send(ReferenceReloadEvent {
                dir,
                success: true,
                error: None,
            });
        }
        Err(e) => {
            let message = e.to_string();
            state.last_reload_success = false;
            state.last_error = Some(message.clone());
            tracing::error!(error = %message, "reload failed, keeping previous reference data");
            events.send(ReferenceReloadEvent {
                dir,
                success: false,
                error: Some(message),
            });
        }
    }
}

/// Does this event touch one of the files the loader reads?
fn is_data_change(event: &Event) -> bool {
    let relevant_kind = event.kind.is_modify() || event.kind.is_create();
    relevant_kind
        && event.paths.iter().any(|p| {
            p.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| DATA_FILES.contains(&name))
        })
}

/// Load `dir` and swap it into `current`. On error `current` is untouched.
pub fn reload_reference_data(dir: &Path, current: &mut ReferenceData) -> Result<(), ConfigError> {
    *current = load_reference_data(dir)?;
    Ok(())
}

/// Serializable view of [`HotReloadState`]
#[derive(Debug, Serialize, Deserialize)]
pub struct HotReloadStatus {
    pub enabled: bool,
    pub watched_dir: Option<String>,
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_reload_tick: GameTick,
    pub last_error: Option<String>,
}

impl HotReloadStatus {
    pub fn from_state(state: &HotReloadState) -> Self {
        Self {
            enabled: state.enabled,
            watched_dir: state.watched_dir.as_ref().map(|p| p.display().to_string()),
            reload_count: state.reload_count,
            last_reload_success: state.last_reload_success,
            last_reload_tick: state.last_reload_tick,
            last_error: state.last_error.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
