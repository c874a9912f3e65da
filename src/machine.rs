//! Run orchestration: Idle -> Running | Replaying -> Ending -> Idle
//!
//! The machine owns the only [`GameState`] and the only pending timer. Each
//! timer firing runs one full step (or one blink frame) to completion and
//! then schedules the next one. Stopping a run cancels the pending timer
//! through the [`Scheduler`], so no stray tick can fire afterwards.

use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::consts::{BLINK_FRAMES, BLINK_INTERVAL_MS};
use crate::sim::{
    Difficulty, Direction, EndReason, GameState, Grid, InputSource, LiveInput, Mode, ReplayInput,
    ReplayLog, Snapshot, tick,
};

/// Opaque id of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Single-shot timer service supplied by the host
pub trait Scheduler {
    /// Arrange for `GameStateMachine::on_timer(handle)` after `delay`
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
    /// Drop a timer; it must never fire afterwards
    fn cancel(&mut self, handle: TimerHandle);
}

/// Virtual-clock scheduler for headless runs and tests
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    /// (due time, handle)
    timers: Vec<(Duration, TimerHandle)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Advance the clock to the earliest timer and hand it out
    pub fn fire_next(&mut self) -> Option<TimerHandle> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, timer)| **timer)
            .map(|(index, _)| index)?;
        let (due, handle) = self.timers.swap_remove(index);
        self.now = self.now.max(due);
        Some(handle)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|(_, h)| *h != handle);
    }
}

/// Observable output for the renderer / UI adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A step completed
    Tick(Snapshot),
    /// The run ended; the blink sequence starts
    Ending(EndReason),
    /// One blink frame. Collision blinks the snake, board-full blinks the food.
    Blink {
        frame: u32,
        visible: bool,
        reason: EndReason,
    },
    /// Back to the initial idle board
    Reset(Snapshot),
    /// A live run with a positive score finished; ready for hand-off
    RunSealed(ReplayLog),
}

/// Input source of the active run
#[derive(Debug)]
enum Driver {
    Live(LiveInput),
    Replay(ReplayInput),
}

impl Driver {
    fn source(&mut self) -> &mut dyn InputSource {
        match self {
            Driver::Live(live) => live,
            Driver::Replay(replay) => replay,
        }
    }
}

/// Owner of the game state and its tick loop
pub struct GameStateMachine<S: Scheduler> {
    scheduler: S,
    state: GameState,
    /// Selector for the next live run
    difficulty: Difficulty,
    /// Difficulty of the run in progress (live selection or replay's record)
    run_difficulty: Difficulty,
    driver: Option<Driver>,
    pending: Option<TimerHandle>,
    blink_frame: u32,
    effects: Vec<Effect>,
}

impl<S: Scheduler> GameStateMachine<S> {
    pub fn new(scheduler: S, grid: Grid, difficulty: Difficulty) -> Self {
        Self {
            scheduler,
            state: GameState::new(grid),
            difficulty,
            run_difficulty: difficulty,
            driver: None,
            pending: None,
            blink_frame: 0,
            effects: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Read-only view of the state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Change the selector.
    ///
    /// A run in progress keeps the difficulty it started with; the new value
    /// takes effect from the next [`start`](Self::start). Every pickup of a
    /// run is therefore scored with the difficulty its sealed replay carries.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Effects produced since the last drain, oldest first
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Begin a live run. Any run in progress is stopped first.
    pub fn start(&mut self, seed: u64) {
        self.halt();
        self.run_difficulty = self.difficulty;
        self.state = GameState::new(self.state.grid);
        self.state.mode = Mode::Running;
        self.driver = Some(Driver::Live(LiveInput::new(seed, self.run_difficulty)));
        info!("Live run started (difficulty {}, seed {seed})", self.run_difficulty.as_str());
        self.schedule_tick();
    }

    /// Begin playing back a sealed log. Any run in progress is stopped first.
    pub fn play_replay(&mut self, log: ReplayLog) {
        self.halt();
        self.run_difficulty = log.difficulty();
        self.state = GameState::new(self.state.grid);
        self.state.mode = Mode::Replaying;
        info!(
            "Replay started (difficulty {}, {} events, score {})",
            self.run_difficulty.as_str(),
            log.events().len(),
            log.final_score()
        );
        self.driver = Some(Driver::Replay(ReplayInput::new(log)));
        self.schedule_tick();
    }

    /// Player heading input. Ignored unless a live run is stepping.
    pub fn input(&mut self, direction: Direction) {
        if self.state.mode == Mode::Running && !self.state.queue.enqueue(direction) {
            trace!("Dropped {direction:?}");
        }
    }

    /// Abort whatever is running and return to the idle board. Also the
    /// reset command: the pending timer is cancelled, a blink sequence is cut
    /// short and nothing is sealed.
    pub fn stop(&mut self) {
        if self.state.mode != Mode::Idle {
            info!("Run stopped at tick {}", self.state.tick);
        }
        self.reset();
    }

    /// Called by the host when a scheduled timer fires
    pub fn on_timer(&mut self, handle: TimerHandle) {
        if self.pending != Some(handle) {
            warn!("Ignoring stray timer {handle:?}");
            return;
        }
        self.pending = None;

        match self.state.mode {
            Mode::Running | Mode::Replaying => self.step(),
            Mode::Ending(reason) => self.blink(reason),
            Mode::Idle => {}
        }
    }

    fn step(&mut self) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        let report = tick(&mut self.state, driver.source(), self.run_difficulty);
        self.effects.push(Effect::Tick(self.state.snapshot()));

        match report.ended {
            Some(reason) => self.begin_ending(reason),
            None => self.schedule_tick(),
        }
    }

    fn begin_ending(&mut self, reason: EndReason) {
        info!(
            "Run ended at tick {} ({reason:?}), score {}",
            self.state.tick, self.state.score
        );
        self.effects.push(Effect::Ending(reason));

        if let Some(Driver::Live(live)) = self.driver.take() {
            if self.state.score > 0 {
                let log = live.seal(self.state.score);
                info!("Replay sealed: {} events", log.events().len());
                self.effects.push(Effect::RunSealed(log));
            }
        }

        self.blink_frame = 0;
        self.pending = Some(self.scheduler.schedule(Duration::from_millis(BLINK_INTERVAL_MS)));
    }

    fn blink(&mut self, reason: EndReason) {
        if self.blink_frame >= BLINK_FRAMES {
            self.reset();
            return;
        }
        let frame = self.blink_frame;
        self.effects.push(Effect::Blink {
            frame,
            visible: frame % 2 == 0,
            reason,
        });
        self.blink_frame += 1;
        self.pending = Some(self.scheduler.schedule(Duration::from_millis(BLINK_INTERVAL_MS)));
    }

    fn schedule_tick(&mut self) {
        self.pending = Some(self.scheduler.schedule(self.run_difficulty.tick_interval()));
    }

    /// Cancel the pending timer and drop the run's input source
    fn halt(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
            debug!("Cancelled timer {handle:?}");
        }
        self.driver = None;
        self.blink_frame = 0;
    }

    /// Discard the current state for the initial idle board. Same as
    /// [`stop`](Self::stop) without the log line.
    pub fn reset(&mut self) {
        self.halt();
        self.state = GameState::new(self.state.grid);
        self.effects.push(Effect::Reset(self.state.snapshot()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    fn machine() -> GameStateMachine<ManualScheduler> {
        GameStateMachine::new(ManualScheduler::new(), Grid::default(), Difficulty::Normal)
    }

    fn fire(machine: &mut GameStateMachine<ManualScheduler>) -> bool {
        match machine.scheduler_mut().fire_next() {
            Some(handle) => {
                machine.on_timer(handle);
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_start_schedules_one_tick() {
        let mut m = machine();
        m.start(1);
        assert_eq!(m.mode(), Mode::Running);
        assert_eq!(m.scheduler().pending(), 1);
        assert!(fire(&mut m));
        assert_eq!(m.scheduler().now(), Duration::from_millis(104));
        assert_eq!(m.state().tick, 1);
        assert_eq!(m.scheduler().pending(), 1);
        assert!(matches!(m.drain_effects().as_slice(), [Effect::Tick(s)] if s.tick == 1));
    }

    #[test]
    fn test_input_ignored_when_idle() {
        let mut m = machine();
        m.input(Direction::Up);
        assert_eq!(m.state().queue.len(), 1);
        m.start(1);
        m.input(Direction::Up);
        assert_eq!(m.state().queue.len(), 2);
    }

    #[test]
    fn test_stop_cancels_pending_tick() {
        let mut m = machine();
        m.start(1);
        fire(&mut m);
        m.stop();
        assert_eq!(m.mode(), Mode::Idle);
        assert_eq!(m.scheduler().pending(), 0);
        assert!(!fire(&mut m));
        assert_eq!(m.state().tick, 0);
        assert_eq!(m.state().head(), IVec2::new(5, 2));
    }

    #[test]
    fn test_stray_timer_ignored() {
        let mut m = machine();
        m.start(1);
        let stale = m.scheduler_mut().fire_next().unwrap();
        m.on_timer(stale);
        m.on_timer(stale);
        assert_eq!(m.state().tick, 1);
    }

    #[test]
    fn test_restart_discards_previous_run() {
        let mut m = machine();
        m.start(1);
        fire(&mut m);
        fire(&mut m);
        m.start(2);
        assert_eq!(m.state().tick, 0);
        assert_eq!(m.scheduler().pending(), 1);
    }

    #[test]
    fn test_replay_uses_recorded_difficulty() {
        let mut m = machine();
        m.set_difficulty(Difficulty::Hard);
        let log = crate::sim::ReplayRecorder::new(Difficulty::Easy).seal(0);
        m.play_replay(log);
        assert_eq!(m.mode(), Mode::Replaying);
        fire(&mut m);
        assert_eq!(m.scheduler().now(), Duration::from_millis(208));
        // Player input never reaches a replay
        m.input(Direction::Down);
        assert_eq!(m.state().queue.len(), 1);
    }

    #[test]
    fn test_difficulty_change_applies_to_next_run() {
        let mut m = machine();
        m.start(1);
        m.set_difficulty(Difficulty::Hard);
        assert_eq!(m.difficulty(), Difficulty::Hard);
        // Head (5,2) reaches the food at (16,2) on the eleventh tick
        for _ in 0..11 {
            fire(&mut m);
        }
        assert_eq!(m.state().score, 6);
        assert_eq!(m.scheduler().now(), Duration::from_millis(11 * 104));

        m.start(1);
        for _ in 0..11 {
            fire(&mut m);
        }
        assert_eq!(m.state().score, 9);
    }

    #[test]
    fn test_reset_cuts_blink_sequence_short() {
        let mut m = machine();
        m.start(5);
        m.input(Direction::Down);
        fire(&mut m);
        m.input(Direction::Left);
        fire(&mut m);
        m.input(Direction::Up);
        fire(&mut m);
        fire(&mut m);
        assert_eq!(m.mode(), Mode::Ending(EndReason::Collision));
        fire(&mut m);
        m.drain_effects();

        m.reset();
        assert_eq!(m.mode(), Mode::Idle);
        assert_eq!(m.scheduler().pending(), 0);
        assert!(matches!(m.drain_effects().as_slice(), [Effect::Reset(s)] if *s == GameState::default().snapshot()));
    }

    #[test]
    fn test_collision_blinks_then_resets() {
        let mut m = machine();
        m.start(5);
        // Curl back: down, left, then up into the body at (5,2)
        m.input(Direction::Down);
        fire(&mut m);
        m.input(Direction::Left);
        fire(&mut m);
        m.input(Direction::Up);
        fire(&mut m);
        assert_eq!(m.mode(), Mode::Running);
        fire(&mut m);
        assert_eq!(m.mode(), Mode::Ending(EndReason::Collision));

        let mut blinks = 0;
        while fire(&mut m) {}
        for effect in m.drain_effects() {
            if let Effect::Blink { frame, visible, reason } = effect {
                assert_eq!(reason, EndReason::Collision);
                assert_eq!(visible, frame % 2 == 0);
                blinks += 1;
            }
        }
        assert_eq!(blinks, 10);
        assert_eq!(m.mode(), Mode::Idle);
        assert_eq!(m.snapshot(), GameState::default().snapshot());
    }
}
