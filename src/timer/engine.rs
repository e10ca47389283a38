//! Work/break phase state machine.
//!
//! [`PhaseTimer`] has no clock of its own: the host calls [`PhaseTimer::tick`]
//! once per second while the timer runs, and drains the queued
//! [`TimerEvent`]s after every command.

use std::collections::VecDeque;

use crate::settings::TimerSettings;

use super::{AlertRequest, Phase, TimerEvent, TimerState};

#[derive(Debug, Clone)]
pub struct PhaseTimer {
    settings: TimerSettings,
    state: TimerState,
    events: VecDeque<TimerEvent>,
}

impl PhaseTimer {
    /// `settings` must already be validated.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            state: TimerState::initial(&settings),
            settings,
            events: VecDeque::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn drain_events(&mut self) -> Vec<TimerEvent> {
        self.events.drain(..).collect()
    }

    pub fn start(&mut self) {
        self.set_running(true);
    }

    pub fn pause(&mut self) {
        self.set_running(false);
    }

    pub fn toggle(&mut self) {
        self.set_running(!self.state.is_running);
    }

    /// Advances one second. Returns the phase entered if this tick ended the
    /// current one.
    ///
    /// A tick that finds `remaining_seconds == 0` performs the transition
    /// instead of counting down, so the counter never underflows and the next
    /// phase starts with its full duration.
    pub fn tick(&mut self) -> Option<Phase> {
        if !self.state.is_running {
            return None;
        }

        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
            return None;
        }

        let next = self.advance_phase();
        self.set_running(false);
        Some(next)
    }

    /// Ends the current phase immediately and keeps the timer running into
    /// the next one.
    pub fn skip(&mut self) -> Phase {
        let next = self.advance_phase();
        self.set_running(true);
        next
    }

    /// Back to an idle, full work phase with no completed cycles. Always
    /// reports both the phase and the idle state, even if neither changed.
    pub fn reset(&mut self) {
        self.state = TimerState::initial(&self.settings);
        self.events.push_back(TimerEvent::PhaseChanged { phase: Phase::Work });
        self.events
            .push_back(TimerEvent::RunningChanged { running: false });
    }

    /// Replaces the settings while the timer is stopped. Returns `false`, and
    /// changes nothing, if the timer is running.
    ///
    /// The current phase keeps its identity and cycle position. A phase that
    /// has not started yet adopts the new full duration; a partly elapsed one
    /// keeps its remaining time, capped at the new duration.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> bool {
        if self.state.is_running {
            return false;
        }

        let untouched = self.state.remaining_seconds == self.state.phase_duration_seconds;
        let duration = self.state.phase.minutes_in(&settings) * 60;

        self.settings = settings;
        self.state.phase_duration_seconds = duration;
        self.state.remaining_seconds = if untouched {
            duration
        } else {
            self.state.remaining_seconds.min(duration)
        };
        true
    }

    fn set_running(&mut self, running: bool) {
        if self.state.is_running != running {
            self.state.is_running = running;
            self.events.push_back(TimerEvent::RunningChanged { running });
        }
    }

    fn advance_phase(&mut self) -> Phase {
        let next = match self.state.phase {
            Phase::Work => {
                let completed = self.state.cycle_count + 1;
                self.state.cycle_count = completed;
                if completed >= self.settings.cycles_before_long_break {
                    Phase::LongBreak
                } else {
                    Phase::Break
                }
            }
            Phase::Break => Phase::Work,
            Phase::LongBreak => {
                self.state.cycle_count = 0;
                Phase::Work
            }
        };

        let duration = next.minutes_in(&self.settings) * 60;
        self.state.phase = next;
        self.state.phase_duration_seconds = duration;
        self.state.remaining_seconds = duration;

        self.events.push_back(TimerEvent::PhaseChanged { phase: next });
        self.events.push_back(TimerEvent::WorkBoundary {
            working: next.is_work(),
        });
        self.events
            .push_back(TimerEvent::Alert(AlertRequest::for_transition(next)));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(work: u32, short: u32, long: u32, cycles: u32) -> TimerSettings {
        TimerSettings {
            work_minutes: work,
            break_minutes: short,
            long_break_minutes: long,
            cycles_before_long_break: cycles,
        }
    }

    /// Ticks until the running phase ends and returns the phase entered.
    fn run_out(timer: &mut PhaseTimer) -> Phase {
        timer.start();
        loop {
            if let Some(next) = timer.tick() {
                return next;
            }
        }
    }

    #[test]
    fn tick_counts_down_while_running_only() {
        let mut timer = PhaseTimer::new(settings(1, 1, 5, 4));
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state().remaining_seconds, 60);

        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.state().remaining_seconds, 58);

        timer.pause();
        timer.tick();
        assert_eq!(timer.state().remaining_seconds, 58);
    }

    #[test]
    fn expiry_transitions_on_the_zero_tick_and_stops() {
        let mut timer = PhaseTimer::new(settings(1, 2, 5, 4));
        timer.start();
        for _ in 0..60 {
            assert_eq!(timer.tick(), None);
        }
        assert_eq!(timer.state().remaining_seconds, 0);

        assert_eq!(timer.tick(), Some(Phase::Break));
        let state = timer.state();
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.remaining_seconds, 120);
        assert_eq!(state.phase_duration_seconds, 120);
        assert_eq!(state.cycle_count, 1);
        assert!(!state.is_running);
    }

    #[test]
    fn expiry_emits_phase_boundary_alert_and_stop() {
        let mut timer = PhaseTimer::new(settings(1, 1, 5, 4));
        run_out(&mut timer);

        let events = timer.drain_events();
        assert_eq!(
            events,
            vec![
                TimerEvent::RunningChanged { running: true },
                TimerEvent::PhaseChanged { phase: Phase::Break },
                TimerEvent::WorkBoundary { working: false },
                TimerEvent::Alert(AlertRequest::for_transition(Phase::Break)),
                TimerEvent::RunningChanged { running: false },
            ]
        );
        assert!(timer.drain_events().is_empty());
    }

    #[test]
    fn long_break_follows_every_kth_work_phase() {
        let k = 3;
        let mut timer = PhaseTimer::new(settings(1, 1, 5, k));

        for n in 1..=9u32 {
            assert_eq!(timer.state().phase, Phase::Work);
            let next = run_out(&mut timer);
            if n % k == 0 {
                assert_eq!(next, Phase::LongBreak, "work phase {n}");
                assert_eq!(timer.state().cycle_count, k);
            } else {
                assert_eq!(next, Phase::Break, "work phase {n}");
                assert_eq!(timer.state().cycle_count, n % k);
            }

            assert_eq!(run_out(&mut timer), Phase::Work);
            if n % k == 0 {
                assert_eq!(timer.state().cycle_count, 0);
            } else {
                assert_eq!(timer.state().cycle_count, n % k);
            }
        }
    }

    #[test]
    fn single_cycle_setting_always_takes_long_breaks() {
        let mut timer = PhaseTimer::new(settings(1, 1, 5, 1));
        assert_eq!(run_out(&mut timer), Phase::LongBreak);
        assert_eq!(run_out(&mut timer), Phase::Work);
        assert_eq!(run_out(&mut timer), Phase::LongBreak);
    }

    #[test]
    fn skip_applies_cycle_rule_and_keeps_running() {
        let mut timer = PhaseTimer::new(settings(25, 5, 15, 2));

        assert_eq!(timer.skip(), Phase::Break);
        assert!(timer.is_running());
        assert_eq!(timer.state().remaining_seconds, 5 * 60);

        assert_eq!(timer.skip(), Phase::Work);
        assert_eq!(timer.skip(), Phase::LongBreak);
        assert_eq!(timer.state().cycle_count, 2);
        assert_eq!(timer.state().remaining_seconds, 15 * 60);

        assert_eq!(timer.skip(), Phase::Work);
        assert_eq!(timer.state().cycle_count, 0);
        assert!(timer.is_running());
    }

    #[test]
    fn skip_while_running_does_not_repeat_running_event() {
        let mut timer = PhaseTimer::new(TimerSettings::default());
        timer.start();
        timer.drain_events();

        timer.skip();
        let events = timer.drain_events();
        assert!(!events
            .iter()
            .any(|event| matches!(event, TimerEvent::RunningChanged { .. })));
        assert!(events.contains(&TimerEvent::Alert(AlertRequest::for_transition(
            Phase::Break
        ))));
    }

    #[test]
    fn reset_returns_to_idle_work_from_any_state() {
        let mut timer = PhaseTimer::new(settings(10, 3, 20, 2));
        timer.skip();
        timer.skip();
        timer.skip();
        timer.tick();
        assert_eq!(timer.state().phase, Phase::LongBreak);
        timer.drain_events();

        timer.reset();
        assert_eq!(
            timer.state(),
            TimerState {
                remaining_seconds: 600,
                phase: Phase::Work,
                is_running: false,
                cycle_count: 0,
                phase_duration_seconds: 600,
            }
        );
        assert_eq!(
            timer.drain_events(),
            vec![
                TimerEvent::PhaseChanged { phase: Phase::Work },
                TimerEvent::RunningChanged { running: false },
            ]
        );
    }

    #[test]
    fn reset_when_idle_still_reports_idle_work() {
        let mut timer = PhaseTimer::new(TimerSettings::default());
        timer.reset();
        assert_eq!(
            timer.drain_events(),
            vec![
                TimerEvent::PhaseChanged { phase: Phase::Work },
                TimerEvent::RunningChanged { running: false },
            ]
        );
    }

    #[test]
    fn apply_settings_is_ignored_while_running() {
        let mut timer = PhaseTimer::new(TimerSettings::default());
        timer.start();
        timer.tick();
        let before = timer.state();

        assert!(!timer.apply_settings(settings(50, 10, 30, 2)));
        assert_eq!(timer.state(), before);
        assert_eq!(timer.settings(), TimerSettings::default());
    }

    #[test]
    fn apply_settings_on_fresh_phase_uses_new_duration() {
        let mut timer = PhaseTimer::new(TimerSettings::default());
        assert!(timer.apply_settings(settings(50, 10, 30, 2)));
        assert_eq!(timer.state().remaining_seconds, 50 * 60);
        assert_eq!(timer.state().phase_duration_seconds, 50 * 60);
    }

    #[test]
    fn apply_settings_clamps_partly_elapsed_phase() {
        let mut timer = PhaseTimer::new(settings(25, 5, 15, 4));
        timer.skip();
        for _ in 0..30 {
            timer.tick();
        }
        timer.pause();
        assert_eq!(timer.state().remaining_seconds, 270);

        assert!(timer.apply_settings(settings(25, 2, 15, 4)));
        let state = timer.state();
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.cycle_count, 1);
        assert_eq!(state.phase_duration_seconds, 120);
        assert_eq!(state.remaining_seconds, 120);
    }

    #[test]
    fn toggle_flips_running_without_touching_remaining() {
        let mut timer = PhaseTimer::new(TimerSettings::default());
        timer.toggle();
        assert!(timer.is_running());
        timer.toggle();
        timer.toggle();
        timer.toggle();
        assert!(!timer.is_running());
        assert_eq!(timer.state().remaining_seconds, 25 * 60);
    }
}
