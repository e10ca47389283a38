use std::{
    ops::RangeInclusive,
    sync::{Arc, RwLock},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{SlotStore, SETTINGS_KEY};
use crate::{log_error, log_warn};

const ENABLE_LOGS: bool = true;

pub const WORK_MINUTES_RANGE: RangeInclusive<u32> = 1..=60;
pub const BREAK_MINUTES_RANGE: RangeInclusive<u32> = 1..=30;
pub const LONG_BREAK_MINUTES_RANGE: RangeInclusive<u32> = 5..=60;
pub const CYCLES_RANGE: RangeInclusive<u32> = 1..=10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Durations are whole minutes. Serialized with the field names of the
/// persisted record so existing data keeps loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(rename = "workDuration", default)]
    pub work_minutes: u32,
    #[serde(rename = "breakDuration", default)]
    pub break_minutes: u32,
    #[serde(rename = "longBreakDuration", default)]
    pub long_break_minutes: u32,
    #[serde(rename = "cyclesBeforeLongBreak", default)]
    pub cycles_before_long_break: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
        }
    }
}

impl TimerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check("workDuration", self.work_minutes, WORK_MINUTES_RANGE)?;
        check("breakDuration", self.break_minutes, BREAK_MINUTES_RANGE)?;
        check(
            "longBreakDuration",
            self.long_break_minutes,
            LONG_BREAK_MINUTES_RANGE,
        )?;
        check(
            "cyclesBeforeLongBreak",
            self.cycles_before_long_break,
            CYCLES_RANGE,
        )
    }

    /// Zero (absent) fields take their default, everything else is clamped
    /// into range. Used for records read back from storage.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: u32, fallback: u32, range: RangeInclusive<u32>| {
            let value = if value == 0 { fallback } else { value };
            value.clamp(*range.start(), *range.end())
        };

        Self {
            work_minutes: pick(self.work_minutes, defaults.work_minutes, WORK_MINUTES_RANGE),
            break_minutes: pick(
                self.break_minutes,
                defaults.break_minutes,
                BREAK_MINUTES_RANGE,
            ),
            long_break_minutes: pick(
                self.long_break_minutes,
                defaults.long_break_minutes,
                LONG_BREAK_MINUTES_RANGE,
            ),
            cycles_before_long_break: pick(
                self.cycles_before_long_break,
                defaults.cycles_before_long_break,
                CYCLES_RANGE,
            ),
        }
    }
}

fn check(field: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<(), SettingsError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Cached copy of the persisted timer settings.
pub struct SettingsStore {
    slots: Arc<dyn SlotStore>,
    data: RwLock<TimerSettings>,
}

impl SettingsStore {
    /// Never fails: an unreadable or corrupt record falls back to defaults.
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        let data = match load(slots.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log_error!("Failed to load timer settings, using defaults: {err:#}");
                TimerSettings::default()
            }
        };

        Self {
            slots,
            data: RwLock::new(data),
        }
    }

    pub fn timer_settings(&self) -> TimerSettings {
        match self.data.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn update_timer_settings(&self, settings: TimerSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let settings = load(self.slots.as_ref())?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;
        Ok(())
    }

    fn persist(&self, settings: &TimerSettings) -> Result<()> {
        let serialized = serde_json::to_string(settings)?;
        self.slots
            .write_slot(SETTINGS_KEY, &serialized)
            .context("Failed to write timer settings")
    }
}

fn load(slots: &dyn SlotStore) -> Result<TimerSettings> {
    let Some(contents) = slots
        .read_slot(SETTINGS_KEY)
        .context("Failed to read timer settings")?
    else {
        return Ok(TimerSettings::default());
    };

    match serde_json::from_str::<TimerSettings>(&contents) {
        Ok(settings) => Ok(settings.sanitized()),
        Err(err) => {
            log_warn!("Ignoring malformed timer settings record: {err}");
            Ok(TimerSettings::default())
        }
    }
}
