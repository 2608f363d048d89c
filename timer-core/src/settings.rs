use serde::{Deserialize, Serialize};

use crate::Phase;

pub const DEFAULT_WORK_SECS: u32 = 25 * 60;
pub const DEFAULT_SHORT_BREAK_SECS: u32 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECS: u32 = 15 * 60;
pub const DEFAULT_SESSIONS_BEFORE_LONG: u32 = 4;

/// User-configurable durations, all in seconds.
///
/// The engine accepts any value here; range checks are advisory and left to
/// the host via [`Settings::out_of_range`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub sessions_before_long_break: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: DEFAULT_WORK_SECS,
            short_break_duration: DEFAULT_SHORT_BREAK_SECS,
            long_break_duration: DEFAULT_LONG_BREAK_SECS,
            sessions_before_long_break: DEFAULT_SESSIONS_BEFORE_LONG,
        }
    }
}

impl Settings {
    /// Build settings from whole minutes, the unit users enter them in.
    pub fn from_minutes(work: u32, short_break: u32, long_break: u32, sessions: u32) -> Self {
        Self {
            work_duration: work.saturating_mul(60),
            short_break_duration: short_break.saturating_mul(60),
            long_break_duration: long_break.saturating_mul(60),
            sessions_before_long_break: sessions,
        }
    }

    pub fn duration_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_duration,
            Phase::ShortBreak => self.short_break_duration,
            Phase::LongBreak => self.long_break_duration,
        }
    }

    /// Fields whose values fall outside the recommended ranges.
    pub fn out_of_range(&self) -> Vec<SettingsField> {
        let checks = [
            (SettingsField::WorkDuration, self.work_duration),
            (SettingsField::ShortBreakDuration, self.short_break_duration),
            (SettingsField::LongBreakDuration, self.long_break_duration),
            (SettingsField::SessionsBeforeLongBreak, self.sessions_before_long_break),
        ];
        checks
            .into_iter()
            .filter(|(field, value)| !field.accepts(*value))
            .map(|(field, _)| field)
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SettingsField {
    WorkDuration,
    ShortBreakDuration,
    LongBreakDuration,
    SessionsBeforeLongBreak,
}

impl SettingsField {
    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::WorkDuration => "work duration",
            SettingsField::ShortBreakDuration => "short break duration",
            SettingsField::LongBreakDuration => "long break duration",
            SettingsField::SessionsBeforeLongBreak => "sessions before long break",
        }
    }

    /// Inclusive bounds in the field's stored unit (seconds for durations).
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            SettingsField::WorkDuration => (60, 60 * 60),
            SettingsField::ShortBreakDuration => (60, 30 * 60),
            SettingsField::LongBreakDuration => (60, 60 * 60),
            SettingsField::SessionsBeforeLongBreak => (1, u32::MAX),
        }
    }

    fn accepts(&self, value: u32) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&value)
    }
}
