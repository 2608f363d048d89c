//! Pure session logic with no platform dependencies.
//! Testable on host, driven by whatever tick source the host owns.

mod engine;
mod record;
mod settings;

pub use engine::{Counters, Dot, Phase, SessionEngine, Snapshot, TickOutcome, Transition};
pub use record::{decode_record, encode_record, RecordError, RECORD_KEY};
pub use settings::{Settings, SettingsField};

/// Format seconds as "MM:SS"
pub fn format_clock(secs: u32) -> String {
    let m = secs / 60;
    let s = secs % 60;
    format!("{:02}:{:02}", m, s)
}

/// Whole minutes of accumulated focus, rounded down for display.
pub fn focus_minutes(total_focus_time: f64) -> u64 {
    if total_focus_time.is_finite() && total_focus_time > 0.0 {
        total_focus_time.floor() as u64
    } else {
        0
    }
}
