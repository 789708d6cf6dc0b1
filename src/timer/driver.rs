use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::clock::clock::ClockState;
use crate::mode::mode::Mode;
use crate::render::render::View;
use crate::timer::command::Command;
use crate::timer::timer::StudyTimer;

pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

pub type SharedTimer = Arc<Mutex<StudyTimer>>;
// at most one sampler per driver; lock the slot before the timer
type TaskSlot = Arc<Mutex<Option<JoinHandle<()>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Driver {
    timer: SharedTimer,
    task: TaskSlot,
    period: Duration,
}

impl Driver {
    /// Wraps a mounted timer. Must be called inside a tokio runtime; a timer
    /// recovered in the running state gets its sampler right away.
    pub fn new(timer: StudyTimer, period: Duration) -> Self {
        let driver = Self {
            timer: Arc::new(Mutex::new(timer)),
            task: Arc::new(Mutex::new(None)),
            period,
        };
        driver.sync();
        driver
    }

    pub fn start(&self) {
        lock(&self.timer).start();
        self.sync();
    }

    pub fn pause(&self) {
        lock(&self.timer).pause();
        self.sync();
    }

    pub fn switch_mode(&self, mode: Mode) {
        lock(&self.timer).switch_mode(mode);
        self.sync();
    }

    pub fn reset(&self) {
        lock(&self.timer).reset();
        self.sync();
    }

    pub fn toggle_panel(&self) {
        lock(&self.timer).toggle_panel();
    }

    pub fn execute(&self, command: Command) -> View {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => self.reset(),
            Command::SwitchMode { mode } => self.switch_mode(mode),
            Command::TogglePanel => self.toggle_panel(),
            Command::Status => {}
        }
        self.view()
    }

    pub fn view(&self) -> View {
        lock(&self.timer).view()
    }

    pub fn snapshot(&self) -> ClockState {
        lock(&self.timer).state().clone()
    }

    pub fn is_sampling(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn sync(&self) {
        let mut slot = lock(&self.task);
        let running = lock(&self.timer).is_running();
        if running {
            let alive = slot.as_ref().is_some_and(|handle| !handle.is_finished());
            if !alive {
                *slot = Some(tokio::spawn(run_sampler(
                    Arc::clone(&self.timer),
                    Arc::clone(&self.task),
                    self.period,
                )));
            }
        } else if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

async fn run_sampler(timer: SharedTimer, slot: TaskSlot, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately
    ticker.tick().await;
    log::debug!("Sampler started");

    loop {
        ticker.tick().await;
        let running = {
            let mut timer = lock(&timer);
            timer.sample();
            timer.is_running()
        };
        if running {
            continue;
        }
        // same lock order as Driver::sync
        let mut slot = lock(&slot);
        if !lock(&timer).is_running() {
            slot.take();
            log::debug!("Sampler stopped, timer paused");
            break;
        }
    }
}
