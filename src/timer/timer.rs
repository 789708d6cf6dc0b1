use std::sync::Arc;

use crate::clock::clock::{self, Advance, ClockState};
use crate::clock::wall::WallClock;
use crate::mode::mode::Mode;
use crate::notify::notify::{Notifier, TIME_EXPIRED_MESSAGE};
use crate::pomodoro::pomodoro::CYCLE_FINISHED_MESSAGE;
use crate::render::render::{Renderer, View};
use crate::storage::storage::{self, SnapshotStore};

pub struct StudyTimer {
    state: ClockState,
    panel_open: bool,
    store: Box<dyn SnapshotStore>,
    notifier: Box<dyn Notifier>,
    renderer: Box<dyn Renderer>,
    clock: Arc<dyn WallClock>,
}

impl StudyTimer {
    /// Builds the timer from the last snapshot, fast-forwarding by the time
    /// spent offline if it was running when the snapshot was written.
    pub fn mount(
        store: Box<dyn SnapshotStore>,
        notifier: Box<dyn Notifier>,
        renderer: Box<dyn Renderer>,
        wall: Arc<dyn WallClock>,
    ) -> Self {
        let now = wall.now_ms();
        let restored = storage::load_snapshot(store.as_ref());
        let mut timer = Self {
            state: ClockState::new(now),
            panel_open: false,
            store,
            notifier,
            renderer,
            clock: wall,
        };

        match restored {
            None => {
                log::debug!("No timer snapshot, starting from defaults");
                timer.render();
            }
            Some(state) if state.is_running => {
                let offline = clock::elapsed_seconds(state.last_sample_ms, now);
                log::info!(
                    "Recovering running {} timer, {}s elapsed offline",
                    state.active_mode,
                    offline
                );
                timer.state = state;
                timer.apply(offline);
                if timer.state.is_running {
                    // resume from now; the offline time is already applied
                    timer.state.is_running = false;
                    timer.start();
                }
            }
            Some(state) => {
                log::debug!("Restored paused {} timer", state.active_mode);
                timer.state = state;
                timer.render();
            }
        }
        timer
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn view(&self) -> View {
        View::from_state(&self.state, self.panel_open)
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
        self.render();
    }

    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        self.state.last_sample_ms = self.clock.now_ms();
        log::debug!("Started {} timer", self.state.active_mode);
        self.render();
        self.persist();
    }

    pub fn pause(&mut self) {
        if self.state.is_running {
            log::debug!("Paused {} timer", self.state.active_mode);
        }
        self.state.is_running = false;
        self.render();
        self.persist();
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.pause();
        self.state.active_mode = mode;
        self.render();
        self.persist();
    }

    pub fn reset(&mut self) {
        self.pause();
        self.state.reset_active();
        log::debug!("Reset {} timer", self.state.active_mode);
        self.render();
        self.persist();
    }

    /// One sampler firing. Returns the applied delta in seconds. A backward
    /// clock jump applies nothing but rebases `last_sample_ms` to now.
    pub fn sample(&mut self) -> i64 {
        if !self.state.is_running {
            return 0;
        }
        let now = self.clock.now_ms();
        if now < self.state.last_sample_ms {
            log::warn!(
                "Wall clock moved back {}ms, rebasing sampler",
                self.state.last_sample_ms - now
            );
            self.state.last_sample_ms = now;
            self.persist();
            return 0;
        }
        let delta = clock::elapsed_seconds(self.state.last_sample_ms, now);
        if delta < 1 {
            return 0;
        }
        self.state.last_sample_ms = now;
        self.apply(delta);
        self.render();
        self.persist();
        delta
    }

    fn apply(&mut self, delta: i64) -> Advance {
        let outcome = self.state.advance(delta);
        match outcome {
            Advance::PhaseChanged { from, to } => {
                log::info!("Pomodoro {} -> {}", from.as_str(), to.as_str());
                self.alert(CYCLE_FINISHED_MESSAGE);
            }
            Advance::Expired => {
                log::info!("{} countdown expired", self.state.active_mode);
                self.alert(TIME_EXPIRED_MESSAGE);
                self.pause();
            }
            Advance::Idle | Advance::Counted => {}
        }
        outcome
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message) {
            log::warn!("Failed to send notification: {}", e);
        }
    }

    fn render(&mut self) {
        let view = View::from_state(&self.state, self.panel_open);
        self.renderer.render(&view);
    }

    fn persist(&self) {
        storage::save_snapshot(self.store.as_ref(), &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::wall::ManualClock;
    use crate::mode::mode::ModeState;
    use crate::notify::notify::RecordingNotifier;
    use crate::pomodoro::pomodoro::Phase;
    use crate::render::render::RecordingRenderer;
    use crate::storage::storage::{MemoryStore, SNAPSHOT_KEY};

    const T0: i64 = 1_700_000_000_000;

    struct Harness {
        store: MemoryStore,
        notifier: RecordingNotifier,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                notifier: RecordingNotifier::new(),
                clock: Arc::new(ManualClock::new(T0)),
            }
        }

        fn with_snapshot(state: &ClockState) -> Self {
            let harness = Self::new();
            storage::save_snapshot(&harness.store, state);
            harness
        }

        fn mount(&self) -> StudyTimer {
            StudyTimer::mount(
                Box::new(self.store.clone()),
                Box::new(self.notifier.clone()),
                Box::new(RecordingRenderer::default()),
                self.clock.clone(),
            )
        }

        fn stored(&self) -> ClockState {
            storage::decode_snapshot(&self.store.get(SNAPSHOT_KEY).unwrap()).unwrap()
        }

        fn tick(&self, timer: &mut StudyTimer, seconds: i64) -> i64 {
            self.clock.advance_ms(seconds * 1000);
            timer.sample()
        }
    }

    #[test]
    fn test_first_mount_uses_defaults() {
        let h = Harness::new();
        let timer = h.mount();
        assert_eq!(timer.state().active_mode, Mode::Pomodoro);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1500);
        assert_eq!(timer.state().modes.essay.time_value, 0);
        assert_eq!(timer.state().modes.mock_exam.time_value, 18000);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_start_persists_and_ticks() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        assert!(h.stored().is_running);
        assert_eq!(h.stored().last_sample_ms, T0);

        assert_eq!(h.tick(&mut timer, 3), 3);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1497);
        assert_eq!(h.stored().modes.pomodoro.time_value, 1497);
        assert_eq!(h.stored().last_sample_ms, T0 + 3000);
    }

    #[test]
    fn test_sub_second_sample_is_ignored() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        h.clock.advance_ms(999);
        assert_eq!(timer.sample(), 0);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1500);
        assert_eq!(timer.state().last_sample_ms, T0);

        // the 999ms are not lost
        h.clock.advance_ms(1);
        assert_eq!(timer.sample(), 1);
    }

    #[test]
    fn test_backward_clock_applies_nothing() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        h.clock.set(T0 - 60_000);
        assert_eq!(timer.sample(), 0);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1500);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(timer.state().last_sample_ms, T0 - 60_000);

        assert_eq!(h.tick(&mut timer, 2), 2);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1498);
    }

    #[test]
    fn test_start_and_pause_are_idempotent() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        h.clock.advance_ms(5_000);
        timer.start();
        let once = timer.state().clone();
        assert_eq!(once.last_sample_ms, T0);

        assert_eq!(timer.sample(), 5);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1495);

        timer.pause();
        let paused = timer.state().clone();
        timer.pause();
        assert_eq!(timer.state(), &paused);
        assert_eq!(h.stored(), paused);
    }

    #[test]
    fn test_paused_timer_ignores_samples() {
        let h = Harness::new();
        let mut timer = h.mount();
        assert_eq!(h.tick(&mut timer, 30), 0);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1500);
    }

    #[test]
    fn test_pomodoro_keeps_running_through_transition() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        h.tick(&mut timer, 1500);
        assert!(timer.is_running());
        assert_eq!(timer.state().modes.pomodoro.phase, Phase::ShortBreak);
        assert_eq!(h.notifier.messages(), vec![CYCLE_FINISHED_MESSAGE]);
    }

    #[test]
    fn test_mock_exam_expiry_pauses() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.switch_mode(Mode::MockExam);
        timer.start();
        h.tick(&mut timer, 18_001);
        assert!(!timer.is_running());
        assert_eq!(timer.state().modes.mock_exam.time_value, 0);
        assert_eq!(h.notifier.messages(), vec![TIME_EXPIRED_MESSAGE]);
        assert!(!h.stored().is_running);
    }

    #[test]
    fn test_failed_notification_does_not_block_transition() {
        let h = Harness {
            notifier: RecordingNotifier::failing(),
            ..Harness::new()
        };
        let mut timer = h.mount();
        timer.start();
        h.tick(&mut timer, 1500);
        assert_eq!(timer.state().modes.pomodoro.phase, Phase::ShortBreak);
        assert_eq!(timer.state().modes.pomodoro.time_value, 300);
    }

    #[test]
    fn test_switch_mode_preserves_other_modes() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        h.tick(&mut timer, 500);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1000);

        timer.switch_mode(Mode::MockExam);
        assert!(!timer.is_running());
        timer.start();
        h.tick(&mut timer, 60);
        timer.switch_mode(Mode::Pomodoro);

        let pomo = timer.state().modes.pomodoro;
        assert_eq!(pomo.time_value, 1000);
        assert_eq!(pomo.phase, Phase::Focus);
        assert_eq!(timer.state().modes.mock_exam.time_value, 18_000 - 60);
        assert_eq!(h.stored().active_mode, Mode::Pomodoro);
    }

    #[test]
    fn test_paused_time_does_not_leak_into_next_start() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.start();
        h.tick(&mut timer, 10);
        timer.pause();
        h.clock.advance_ms(600_000);
        timer.start();
        h.tick(&mut timer, 1);
        assert_eq!(timer.state().modes.pomodoro.time_value, 1500 - 11);
    }

    #[test]
    fn test_reset_reseeds_active_mode_only() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.switch_mode(Mode::Essay);
        timer.start();
        h.tick(&mut timer, 90);
        timer.switch_mode(Mode::Pomodoro);
        timer.start();
        h.tick(&mut timer, 1500);
        assert_eq!(timer.state().modes.pomodoro.completed_focus_cycles, 1);

        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.state().modes.pomodoro, Mode::Pomodoro.default_state());
        assert_eq!(timer.state().modes.essay.time_value, 90);
        assert_eq!(h.stored().modes.pomodoro, Mode::Pomodoro.default_state());
    }

    #[test]
    fn test_recovery_expires_mock_exam_once() {
        let mut snapshot = ClockState::new(T0 - 150_000);
        snapshot.active_mode = Mode::MockExam;
        snapshot.modes.mock_exam.time_value = 100;
        snapshot.is_running = true;
        let h = Harness::with_snapshot(&snapshot);

        let timer = h.mount();
        assert_eq!(timer.state().modes.mock_exam.time_value, 0);
        assert!(!timer.is_running());
        assert_eq!(h.notifier.messages(), vec![TIME_EXPIRED_MESSAGE]);
        assert!(!h.stored().is_running);
    }

    #[test]
    fn test_recovery_of_paused_snapshot_changes_nothing() {
        let mut snapshot = ClockState::new(T0 - 3_600_000);
        snapshot.modes.pomodoro = ModeState {
            time_value: 420,
            phase: Phase::ShortBreak,
            completed_focus_cycles: 2,
        };
        let h = Harness::with_snapshot(&snapshot);

        let timer = h.mount();
        assert_eq!(timer.state(), &snapshot);
        assert!(!timer.is_running());
        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn test_recovery_fast_forwards_and_resumes() {
        let mut snapshot = ClockState::new(T0 - 200_500);
        snapshot.active_mode = Mode::Essay;
        snapshot.modes.essay.time_value = 40;
        snapshot.is_running = true;
        let h = Harness::with_snapshot(&snapshot);

        let timer = h.mount();
        assert_eq!(timer.state().modes.essay.time_value, 240);
        assert!(timer.is_running());
        assert_eq!(timer.state().last_sample_ms, T0);
        assert_eq!(h.stored().last_sample_ms, T0);
    }

    #[test]
    fn test_recovery_performs_single_pomodoro_transition() {
        let mut snapshot = ClockState::new(T0 - 3_600_000);
        snapshot.modes.pomodoro.time_value = 100;
        snapshot.is_running = true;
        let h = Harness::with_snapshot(&snapshot);

        let timer = h.mount();
        let pomo = timer.state().modes.pomodoro;
        assert_eq!(pomo.phase, Phase::ShortBreak);
        assert_eq!(pomo.time_value, 300);
        assert_eq!(pomo.completed_focus_cycles, 1);
        assert!(timer.is_running());
        assert_eq!(h.notifier.messages().len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_mounts_defaults() {
        let h = Harness::new();
        h.store.save(SNAPSHOT_KEY, "garbage").unwrap();
        let timer = h.mount();
        assert_eq!(timer.state().modes, ClockState::new(0).modes);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_toggle_panel_is_not_persisted() {
        let h = Harness::new();
        let mut timer = h.mount();
        timer.pause();
        let before = h.store.get(SNAPSHOT_KEY);
        timer.toggle_panel();
        assert!(timer.view().panel_open);
        assert_eq!(h.store.get(SNAPSHOT_KEY), before);
    }
}
