//! Cancellable one-shot timers keyed by game tick.

use std::collections::BTreeMap;

use crate::engine::GameTick;

/// Handle to a scheduled expiry; only the holder can cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    due: GameTick,
    id: u64,
}

impl TimerHandle {
    pub fn due(&self) -> GameTick {
        self.due
    }
}

/// Pending expiries, fired in due order.
#[derive(Debug, Default)]
pub struct ExpiryTimers {
    next_id: u64,
    pending: BTreeMap<TimerHandle, String>,
}

impl ExpiryTimers {
    pub fn schedule(&mut self, due: GameTick, key: &str) -> TimerHandle {
        let handle = TimerHandle { due, id: self.next_id };
        self.next_id += 1;
        self.pending.insert(handle, key.to_string());
        handle
    }

    /// False if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    /// Remove and return every timer due at or before `now`.
    pub fn pop_due(&mut self, now: GameTick) -> Vec<(TimerHandle, String)> {
        let mut fired = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().due > now {
                break;
            }
            let handle = *entry.key();
            fired.push((handle, entry.remove()));
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
