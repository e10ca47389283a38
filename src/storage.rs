//! Single-key blob persistence shared by the settings and bookmark stores.
//!
//! Each component owns exactly one slot and rewrites it in full on every
//! mutation, so the backend only needs whole-value reads and writes.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::Result;

/// Slot holding the serialized [`crate::settings::TimerSettings`] record.
pub const SETTINGS_KEY: &str = "pomodoroSettings";
/// Slot holding the JSON array of bookmarks.
pub const BOOKMARKS_KEY: &str = "pomodoroBookmarks";

pub trait SlotStore: Send + Sync {
    /// Returns the stored value, or `None` if the slot was never written.
    fn read_slot(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the slot's value.
    fn write_slot(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process slot store. Contents die with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SlotStore for MemoryStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.guard().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.guard().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
