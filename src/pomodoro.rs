use timer_core::{Phase, SessionEngine, Settings, SettingsField, TickOutcome, Transition};

use crate::alerts::Alerts;
use crate::storage::{KeyValueStore, TimerStorage};

pub const SETTINGS_APPLIED: &str = "Settings applied successfully!";

/// The engine plus the side effects the engine leaves to its host:
/// persisting after every completion and settings change, and firing
/// the completion cue.
pub struct PomodoroState<S: KeyValueStore, A: Alerts> {
    engine: SessionEngine,
    storage: TimerStorage<S>,
    alerts: A,
}

impl<S: KeyValueStore, A: Alerts> PomodoroState<S, A> {
    /// Restore saved settings and counters, or start from defaults.
    pub fn open(storage: TimerStorage<S>, alerts: A) -> Self {
        let mut engine = match storage.load() {
            Some((settings, counters)) => {
                log::info!(
                    "Restored {} completed sessions, streak {}",
                    counters.completed_sessions,
                    counters.current_streak
                );
                SessionEngine::with_counters(settings, counters)
            }
            None => SessionEngine::new(Settings::default()),
        };
        engine.reset();
        Self {
            engine,
            storage,
            alerts,
        }
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn start(&mut self) {
        self.engine.start();
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn toggle(&mut self) -> bool {
        self.engine.toggle()
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.engine.tick();
        if let TickOutcome::Completed(transition) = outcome {
            self.finish(transition);
        }
        outcome
    }

    pub fn skip(&mut self) -> Transition {
        let transition = self.engine.skip();
        self.finish(transition);
        transition
    }

    /// Apply new settings even when some are out of range; the flagged
    /// fields are returned so the caller can point them out.
    pub fn apply_settings(&mut self, settings: Settings) -> Vec<SettingsField> {
        let flagged = settings.out_of_range();
        for field in &flagged {
            log::warn!("Applying out-of-range {}", field.label());
        }
        self.engine.apply_settings(settings);
        self.save();
        self.alerts.notice(SETTINGS_APPLIED);
        flagged
    }

    fn finish(&mut self, transition: Transition) {
        log::info!(
            "{} -> {}{}",
            transition.from.label(),
            transition.to.label(),
            if transition.skipped { " (skipped)" } else { "" }
        );
        if transition.wants_feedback() {
            self.alerts.completion(completion_message(&transition));
        }
        self.save();
    }

    fn save(&mut self) {
        self.storage
            .save(self.engine.settings(), self.engine.counters());
    }

    #[cfg(test)]
    pub fn storage(&self) -> &TimerStorage<S> {
        &self.storage
    }

    #[cfg(test)]
    pub fn alerts(&self) -> &A {
        &self.alerts
    }
}

pub fn completion_message(transition: &Transition) -> &'static str {
    match (transition.from, transition.to) {
        (Phase::Work, Phase::LongBreak) => "Work done! Long break.",
        (Phase::Work, _) => "Work done! Short break.",
        _ => "Break over! Time to work.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;
    use timer_core::Counters;

    #[derive(Default)]
    struct Recorded {
        completions: Vec<String>,
        notices: Vec<String>,
    }

    impl Alerts for Recorded {
        fn completion(&mut self, message: &str) {
            self.completions.push(message.to_string());
        }

        fn notice(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn fresh(settings: Settings) -> PomodoroState<MemoryStore, Recorded> {
        let mut storage = TimerStorage::new(MemoryStore::default());
        storage.save(&settings, &Counters::default());
        PomodoroState::open(storage, Recorded::default())
    }

    fn run_phase(pom: &mut PomodoroState<MemoryStore, Recorded>) -> Transition {
        pom.start();
        loop {
            if let TickOutcome::Completed(t) = pom.tick() {
                return t;
            }
        }
    }

    #[test]
    fn test_open_without_record_uses_defaults() {
        let pom = PomodoroState::open(TimerStorage::new(MemoryStore::default()), Recorded::default());
        assert_eq!(*pom.engine().settings(), Settings::default());
        assert_eq!(pom.engine().current_time(), 1500);
        assert!(!pom.engine().is_running());
    }

    #[test]
    fn test_open_restores_counters_but_not_phase() {
        let counters = Counters {
            completed_sessions: 5,
            total_focus_time: 125.0,
            current_streak: 5,
        };
        let settings = Settings::from_minutes(30, 5, 15, 4);
        let mut storage = TimerStorage::new(MemoryStore::default());
        storage.save(&settings, &counters);

        let pom = PomodoroState::open(storage, Recorded::default());
        assert_eq!(*pom.engine().counters(), counters);
        assert_eq!(pom.engine().phase(), Phase::Work);
        assert_eq!(pom.engine().current_time(), 1800);
    }

    #[test]
    fn test_completion_alerts_once_and_saves() {
        let mut pom = fresh(Settings::from_minutes(1, 1, 1, 4));
        let t = run_phase(&mut pom);
        assert_eq!(t.to, Phase::ShortBreak);
        assert_eq!(pom.alerts().completions, vec!["Work done! Short break."]);

        let (_, saved) = pom.storage().load().unwrap();
        assert_eq!(saved.completed_sessions, 1);
        assert_eq!(saved.total_focus_time, 1.0);
        assert_eq!(saved.current_streak, 1);
    }

    #[test]
    fn test_break_completion_alerts_without_credit() {
        let mut pom = fresh(Settings::from_minutes(1, 1, 1, 4));
        run_phase(&mut pom);
        let t = run_phase(&mut pom);
        assert_eq!(t.to, Phase::Work);
        assert_eq!(pom.alerts().completions.len(), 2);
        assert_eq!(pom.alerts().completions[1], "Break over! Time to work.");
        assert_eq!(pom.engine().counters().completed_sessions, 1);
    }

    #[test]
    fn test_skip_never_alerts() {
        let mut pom = fresh(Settings::default());
        pom.start();
        pom.tick();
        let t = pom.skip();
        assert_eq!(t.to, Phase::LongBreak);
        pom.skip();
        assert!(pom.alerts().completions.is_empty());
        assert_eq!(*pom.engine().counters(), Counters::default());
    }

    #[test]
    fn test_apply_settings_notifies_and_persists() {
        let mut pom = fresh(Settings::default());
        let flagged = pom.apply_settings(Settings::from_minutes(45, 10, 20, 3));
        assert!(flagged.is_empty());
        assert_eq!(pom.alerts().notices, vec![SETTINGS_APPLIED]);
        assert_eq!(pom.engine().current_time(), 45 * 60);

        let (saved, _) = pom.storage().load().unwrap();
        assert_eq!(saved, Settings::from_minutes(45, 10, 20, 3));
    }

    #[test]
    fn test_apply_out_of_range_settings_still_applies() {
        let mut pom = fresh(Settings::default());
        let flagged = pom.apply_settings(Settings::from_minutes(90, 5, 15, 4));
        assert_eq!(flagged, vec![SettingsField::WorkDuration]);
        assert_eq!(pom.engine().total_time(), 90 * 60);
        assert_eq!(pom.alerts().notices.len(), 1);
    }

    #[test]
    fn test_completion_messages() {
        let long = Transition {
            from: Phase::Work,
            to: Phase::LongBreak,
            skipped: false,
        };
        assert_eq!(completion_message(&long), "Work done! Long break.");
        let back = Transition {
            from: Phase::LongBreak,
            to: Phase::Work,
            skipped: false,
        };
        assert_eq!(completion_message(&back), "Break over! Time to work.");
    }

    #[derive(Clone, Copy, Debug)]
    enum Step {
        Tick,
        Toggle,
        Reset,
        Skip,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            6 => Just(Step::Tick),
            2 => Just(Step::Toggle),
            1 => Just(Step::Reset),
            1 => Just(Step::Skip),
        ]
    }

    proptest! {
        #[test]
        fn alerts_match_natural_completions(steps in proptest::collection::vec(step_strategy(), 0..400)) {
            let settings = Settings {
                work_duration: 3,
                short_break_duration: 2,
                long_break_duration: 4,
                sessions_before_long_break: 2,
            };
            let mut pom = fresh(settings);
            let mut natural = 0;
            for step in steps {
                match step {
                    Step::Tick => {
                        if let TickOutcome::Completed(_) = pom.tick() {
                            natural += 1;
                        }
                    }
                    Step::Toggle => {
                        pom.toggle();
                    }
                    Step::Reset => pom.reset(),
                    Step::Skip => {
                        pom.skip();
                    }
                }
                let engine = pom.engine();
                prop_assert!(engine.current_time() <= engine.total_time());
            }
            prop_assert_eq!(pom.alerts().completions.len(), natural);
            prop_assert!(pom.engine().counters().completed_sessions as usize <= natural);
            if let Some((_, saved)) = pom.storage().load() {
                prop_assert_eq!(saved, *pom.engine().counters());
            }
        }
    }
}
