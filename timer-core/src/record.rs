//! The persisted record: a `settings` group and a `state` group holding the
//! cumulative counters. Session-local fields are never written.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Counters, Settings};

pub const RECORD_KEY: &str = "pomodoroTimer";

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record root is not an object")]
    NotAnObject,

    #[error("record has no `{0}` group")]
    MissingGroup(&'static str),
}

#[derive(Serialize)]
struct RecordRef<'a> {
    settings: &'a Settings,
    state: &'a Counters,
}

pub fn encode_record(settings: &Settings, counters: &Counters) -> Result<String, RecordError> {
    Ok(serde_json::to_string(&RecordRef {
        settings,
        state: counters,
    })?)
}

/// Decode a stored record, tolerating partial content.
///
/// Both groups must be present. Within a group every field is read on its
/// own: anything missing or of the wrong shape falls back to the compiled-in
/// default (settings) or zero (counters). Unknown keys are ignored.
pub fn decode_record(text: &str) -> Result<(Settings, Counters), RecordError> {
    let root: Value = serde_json::from_str(text)?;
    let root = root.as_object().ok_or(RecordError::NotAnObject)?;

    let stored = group(root, "settings")?;
    let defaults = Settings::default();
    let settings = Settings {
        work_duration: whole(stored, "workDuration").unwrap_or(defaults.work_duration),
        short_break_duration: whole(stored, "shortBreakDuration")
            .unwrap_or(defaults.short_break_duration),
        long_break_duration: whole(stored, "longBreakDuration")
            .unwrap_or(defaults.long_break_duration),
        sessions_before_long_break: whole(stored, "sessionsBeforeLongBreak")
            .unwrap_or(defaults.sessions_before_long_break),
    };

    let state = group(root, "state")?;
    let counters = Counters {
        completed_sessions: whole(state, "completedSessions").unwrap_or(0),
        total_focus_time: state
            .get("totalFocusTime")
            .and_then(Value::as_f64)
            .filter(|m| m.is_finite() && *m >= 0.0)
            .unwrap_or(0.0),
        current_streak: whole(state, "currentStreak").unwrap_or(0),
    };

    Ok((settings, counters))
}

fn group<'a>(
    root: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Map<String, Value>, RecordError> {
    root.get(name)
        .and_then(Value::as_object)
        .ok_or(RecordError::MissingGroup(name))
}

/// Non-negative integers only; `2.0` is accepted, `90.5` is not.
fn whole(fields: &Map<String, Value>, key: &str) -> Option<u32> {
    let value = fields.get(key)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layout() {
        let counters = Counters {
            completed_sessions: 3,
            total_focus_time: 75.0,
            current_streak: 3,
        };
        let text = encode_record(&Settings::default(), &counters).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let root = value.as_object().unwrap();
        assert_eq!(root.len(), 2);

        let settings = root["settings"].as_object().unwrap();
        let mut keys: Vec<_> = settings.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "longBreakDuration",
                "sessionsBeforeLongBreak",
                "shortBreakDuration",
                "workDuration"
            ]
        );

        let state = root["state"].as_object().unwrap();
        let mut keys: Vec<_> = state.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["completedSessions", "currentStreak", "totalFocusTime"]);
        assert_eq!(state["totalFocusTime"], 75.0);
    }

    #[test]
    fn test_missing_focus_time_defaults_to_zero() {
        let text = r#"{"settings":{"workDuration":600,"shortBreakDuration":120,
            "longBreakDuration":1200,"sessionsBeforeLongBreak":3},
            "state":{"completedSessions":9,"currentStreak":4}}"#;
        let (settings, counters) = decode_record(text).unwrap();
        assert_eq!(settings, Settings::from_minutes(10, 2, 20, 3));
        assert_eq!(counters.completed_sessions, 9);
        assert_eq!(counters.current_streak, 4);
        assert_eq!(counters.total_focus_time, 0.0);
    }

    #[test]
    fn test_settings_merge_is_per_field() {
        let text = r#"{"settings":{"workDuration":3000},"state":{}}"#;
        let (settings, _) = decode_record(text).unwrap();
        assert_eq!(settings.work_duration, 3000);
        assert_eq!(settings.short_break_duration, 300);
        assert_eq!(settings.long_break_duration, 900);
        assert_eq!(settings.sessions_before_long_break, 4);
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let text = r#"{"settings":{"workDuration":"long","sessionsBeforeLongBreak":-2},
            "state":{"completedSessions":null,"totalFocusTime":"x","currentStreak":2.0}}"#;
        let (settings, counters) = decode_record(text).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(counters.completed_sessions, 0);
        assert_eq!(counters.total_focus_time, 0.0);
        assert_eq!(counters.current_streak, 2);
    }

    #[test]
    fn test_missing_groups() {
        assert!(matches!(decode_record("{}"), Err(RecordError::MissingGroup(_))));
        assert!(matches!(
            decode_record(r#"{"settings":{"workDuration":3000}}"#),
            Err(RecordError::MissingGroup("state"))
        ));
        assert!(matches!(
            decode_record(r#"{"settings":[],"state":{"completedSessions":2}}"#),
            Err(RecordError::MissingGroup("settings"))
        ));
    }

    #[test]
    fn test_fractional_values_take_default() {
        let text = r#"{"settings":{"workDuration":90.5,"shortBreakDuration":600.0},
            "state":{"completedSessions":3.25,"currentStreak":1}}"#;
        let (settings, counters) = decode_record(text).unwrap();
        assert_eq!(settings.work_duration, 1500);
        assert_eq!(settings.short_break_duration, 600);
        assert_eq!(counters.completed_sessions, 0);
        assert_eq!(counters.current_streak, 1);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = r#"{"version":2,"settings":{"theme":"dark","workDuration":60},
            "state":{"completedSessions":1,"bestStreak":8}}"#;
        let (settings, counters) = decode_record(text).unwrap();
        assert_eq!(settings.work_duration, 60);
        assert_eq!(counters.completed_sessions, 1);
    }

    #[test]
    fn test_unparseable_records() {
        assert!(matches!(decode_record("not json"), Err(RecordError::Json(_))));
        assert!(matches!(decode_record("[1,2]"), Err(RecordError::NotAnObject)));
    }

    proptest! {
        #[test]
        fn round_trip(
            work in 60u32..=3600,
            short in 60u32..=1800,
            long in 60u32..=3600,
            every in 1u32..=12,
            completed in any::<u32>(),
            focus in 0.0f64..1.0e9,
            streak in any::<u32>(),
        ) {
            let settings = Settings {
                work_duration: work,
                short_break_duration: short,
                long_break_duration: long,
                sessions_before_long_break: every,
            };
            let counters = Counters {
                completed_sessions: completed,
                total_focus_time: focus,
                current_streak: streak,
            };
            let text = encode_record(&settings, &counters).unwrap();
            let (s, c) = decode_record(&text).unwrap();
            prop_assert_eq!(s, settings);
            prop_assert_eq!(c, counters);
        }
    }
}
