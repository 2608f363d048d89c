use serde::{Deserialize, Serialize};

use crate::Settings;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Focus Time",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

/// Cumulative statistics. These survive restarts and only ever grow.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub completed_sessions: u32,
    /// Minutes of completed work phases.
    pub total_focus_time: f64,
    pub current_streak: u32,
}

/// A phase change produced by a completion or a skip.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub skipped: bool,
}

impl Transition {
    /// Whether the completion cue should fire for this transition.
    pub fn wants_feedback(&self) -> bool {
        !self.skipped
    }

    /// Whether this transition added to the statistics.
    pub fn credited(&self) -> bool {
        !self.skipped && self.from == Phase::Work
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// The clock is paused; nothing changed.
    Idle,
    InProgress { remaining: u32 },
    Completed(Transition),
}

/// Everything a display needs, read after any operation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Snapshot {
    pub phase: Phase,
    pub current_time: u32,
    pub total_time: u32,
    pub completed_sessions: u32,
    pub total_focus_time: f64,
    pub current_streak: u32,
    pub is_running: bool,
}

/// One slot of the cycle indicator leading up to a long break.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dot {
    Completed,
    Current,
    Pending,
}

/// The phase state machine and countdown.
///
/// The engine has no clock of its own: the host calls [`SessionEngine::tick`]
/// once per elapsed second while [`SessionEngine::is_running`] is true.
#[derive(Clone, PartialEq, Debug)]
pub struct SessionEngine {
    settings: Settings,
    counters: Counters,
    phase: Phase,
    current_time: u32,
    total_time: u32,
    running: bool,
}

impl SessionEngine {
    pub fn new(settings: Settings) -> Self {
        Self::with_counters(settings, Counters::default())
    }

    pub fn with_counters(settings: Settings, counters: Counters) -> Self {
        Self {
            settings,
            counters,
            phase: Phase::Work,
            current_time: settings.work_duration,
            total_time: settings.work_duration,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Start when paused, pause when running. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
        self.running
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.current_time = self.current_time.saturating_sub(1);
        if self.current_time == 0 {
            TickOutcome::Completed(self.complete_session(false))
        } else {
            TickOutcome::InProgress {
                remaining: self.current_time,
            }
        }
    }

    /// Pause and rewind the current phase, picking up the live settings.
    pub fn reset(&mut self) {
        self.pause();
        self.total_time = self.settings.duration_for(self.phase);
        self.current_time = self.total_time;
    }

    /// Move to the next phase without crediting statistics.
    pub fn skip(&mut self) -> Transition {
        self.complete_session(true)
    }

    /// Replace the settings wholesale and reset the current phase.
    /// Values are not validated; see [`Settings::out_of_range`].
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.reset();
    }

    fn complete_session(&mut self, skipped: bool) -> Transition {
        self.running = false;
        let from = self.phase;
        if !skipped && from == Phase::Work {
            let counters = &mut self.counters;
            counters.completed_sessions = counters.completed_sessions.saturating_add(1);
            counters.total_focus_time += f64::from(self.settings.work_duration) / 60.0;
            counters.current_streak = counters.current_streak.saturating_add(1);
        }
        self.advance_phase();
        Transition {
            from,
            to: self.phase,
            skipped,
        }
    }

    fn advance_phase(&mut self) {
        self.phase = match self.phase {
            // Checked after this completion's increment. With no completions
            // yet the remainder is zero, so the first break is a long one.
            Phase::Work => {
                let every = self.settings.sessions_before_long_break;
                if self.counters.completed_sessions.checked_rem(every) == Some(0) {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };
        self.total_time = self.settings.duration_for(self.phase);
        self.current_time = self.total_time;
        self.running = false;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            current_time: self.current_time,
            total_time: self.total_time,
            completed_sessions: self.counters.completed_sessions,
            total_focus_time: self.counters.total_focus_time,
            current_streak: self.counters.current_streak,
            is_running: self.running,
        }
    }

    /// Fraction of the current phase still to run, 1.0 at phase start.
    pub fn remaining_fraction(&self) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        f64::from(self.current_time) / f64::from(self.total_time)
    }

    /// Position within the cycle of work phases leading to a long break.
    pub fn progress_dots(&self) -> Vec<Dot> {
        let total = self.settings.sessions_before_long_break;
        if total == 0 {
            return Vec::new();
        }
        let done = self.counters.completed_sessions % total;
        (0..total)
            .map(|i| {
                if i < done {
                    Dot::Completed
                } else if i == done && self.phase == Phase::Work {
                    Dot::Current
                } else {
                    Dot::Pending
                }
            })
            .collect()
    }
}
