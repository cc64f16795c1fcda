//! The engine: command surface, round lifecycle and timer dispatch
//!
//! ```text
//!     EngineBuilder ──build()──> Engine ──advance(elapsed)──> timers fire
//!         │                        │                           │
//!         ├─ with_seed()           ├─ start_game()             ├─ Frame     → sim::frame
//!         └─ with_frame_rate()     ├─ update_settings()        ├─ Countdown → time_remaining
//!                                  ├─ move_player()/press()    └─ Spawn     → World::spawn_object
//!                                  └─ subscribe_state()/subscribe_frames()
//! ```
//!
//! All three periodic processes run for the whole life of the engine and
//! check whether a round is running when they fire. The only timer that is
//! ever replaced is the spawn timer, whenever new settings are accepted.
//!
//! There is no global instance. Whoever composes the application builds an
//! engine, drives it with [`Engine::advance`] and ends it with
//! [`Engine::dispose`].

use std::time::Duration;

use crate::clock::{Clock, TimerHandle};
use crate::consts::{COUNTDOWN_PERIOD, DEFAULT_FRAME_RATE, DEFAULT_SEED};
use crate::observe::{Broadcast, Latest, SubscriberId, Subscription};
use crate::settings::{Settings, SettingsError, SettingsStore};
use crate::sim::{
    self, Direction, FrameInput, FrameTick, PaintSnapshot, RoundPhase, World, WorldState,
};

/// The three periodic processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Process {
    Frame,
    Countdown,
    Spawn,
}

/// What [`Engine::submit_settings`] did with a settings change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    /// First settings ever: the first round started
    Started,
    /// Round length changed: the round restarted
    Restarted,
    /// Other fields changed: applied to the running round
    Updated,
    /// Identical to the current settings
    Unchanged,
}

//=== EngineBuilder =======================================================

/// Builder for an [`Engine`].
///
/// Defaults: seed [`DEFAULT_SEED`], [`DEFAULT_FRAME_RATE`] frames per second.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    seed: u64,
    frame_rate: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_SEED,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }

    /// Seed for spawn positions
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Frames per second for the per-frame process. Zero is treated as 1.
    ///
    /// Falling and paddle speeds are per frame, so this changes how fast
    /// things move in wall time, not how the simulation behaves.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate.max(1);
        self
    }

    pub fn build(self) -> Engine {
        let mut clock = Clock::new();
        let frame_period = Duration::from_secs(1) / self.frame_rate;
        clock.schedule(frame_period, Process::Frame);
        clock.schedule(COUNTDOWN_PERIOD, Process::Countdown);

        log::info!(
            "Engine created (seed {}, {} fps)",
            self.seed,
            self.frame_rate
        );

        Engine {
            settings: SettingsStore::new(),
            world: World::new(self.seed),
            phase: RoundPhase::Idle,
            started: false,
            held: FrameInput::default(),
            clock,
            spawn_timer: None,
            frame_count: 0,
            state: Latest::new(WorldState::default()),
            frames: Broadcast::new(),
        }
    }
}

//=== Engine ==============================================================

/// Authoritative game state and the processes that drive it
#[derive(Debug)]
pub struct Engine {
    settings: SettingsStore,
    world: World,
    phase: RoundPhase,
    /// Latched on the first start, never reset
    started: bool,
    held: FrameInput,
    clock: Clock<Process>,
    spawn_timer: Option<TimerHandle>,
    frame_count: u64,
    state: Latest<WorldState>,
    frames: Broadcast<FrameTick>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with default seed and frame rate
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    //--- Queries -----------------------------------------------------------

    /// Last published snapshot
    pub fn state(&self) -> WorldState {
        *self.state.get()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// True forever after the first successful [`Engine::start_game`]
    pub fn has_game_started(&self) -> bool {
        self.started
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.current()
    }

    /// Simulated time since construction
    pub fn elapsed(&self) -> Duration {
        self.clock.now()
    }

    /// Copy of the paddle and live objects for drawing
    pub fn paintable(&self) -> PaintSnapshot {
        self.world.paintable()
    }

    //--- Subscriptions -----------------------------------------------------

    /// Current snapshot now, then every later change
    pub fn subscribe_state(&mut self) -> Subscription<WorldState> {
        self.state.subscribe()
    }

    pub fn unsubscribe_state(&mut self, id: SubscriberId) -> bool {
        self.state.unsubscribe(id)
    }

    /// One tick per frame, fired after the frame's simulation step
    pub fn subscribe_frames(&mut self) -> Subscription<FrameTick> {
        self.frames.subscribe()
    }

    pub fn unsubscribe_frames(&mut self, id: SubscriberId) -> bool {
        self.frames.unsubscribe(id)
    }

    //--- Round lifecycle ---------------------------------------------------

    /// Start a round with `settings`, which also become the current settings.
    ///
    /// Clears falling objects and re-centers the paddle. Starting while a
    /// round runs resets it. Invalid settings are rejected and nothing
    /// changes.
    pub fn start_game(&mut self, settings: Settings) -> Result<(), SettingsError> {
        self.install_settings(settings)?;

        self.world.reset();
        self.held.clear();
        self.phase = RoundPhase::Running;
        self.started = true;
        self.state.publish(WorldState::round_start(settings.game_time));

        log::info!("Round started: {}s, settings {:?}", settings.game_time, settings);
        Ok(())
    }

    /// Clear the field and start a fresh round with `settings`
    pub fn restart_game_with_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.world.reset();
        self.start_game(settings)
    }

    /// Replace the settings without touching the round.
    ///
    /// The spawn timer restarts with the new interval; a changed round
    /// length only applies to the next round. Invalid settings are rejected
    /// and the previous ones stay in force.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        self.install_settings(settings)?;
        log::debug!("Settings updated: {:?}", settings);
        Ok(())
    }

    /// Route a settings change the way the settings form does.
    ///
    /// Before any round: start one. Changed round length: restart. Any
    /// other change: update in place.
    pub fn submit_settings(&mut self, settings: Settings) -> Result<SettingsChange, SettingsError> {
        settings.validate()?;

        let Some(current) = self.settings.current().copied().filter(|_| self.started) else {
            self.start_game(settings)?;
            return Ok(SettingsChange::Started);
        };

        if settings.game_time != current.game_time {
            self.restart_game_with_settings(settings)?;
            return Ok(SettingsChange::Restarted);
        }
        match settings.changed_field(&current) {
            Some(field) => {
                log::debug!("Settings field {:?} changed", field);
                self.update_settings(settings)?;
                Ok(SettingsChange::Updated)
            }
            None => Ok(SettingsChange::Unchanged),
        }
    }

    /// End the engine: cancel every timer and disconnect every subscriber
    pub fn dispose(mut self) {
        self.clock.cancel_all();
        self.spawn_timer = None;
        self.state.close();
        self.frames.close();
        log::info!("Engine disposed after {:?}", self.clock.now());
    }

    //--- Input -------------------------------------------------------------

    /// Move the paddle one step, if a round is running.
    ///
    /// A step that would push the paddle past a wall is dropped; the paddle
    /// does not snap to the wall.
    pub fn move_player(&mut self, direction: Direction) {
        if !self.is_running() {
            return;
        }
        if let Some(settings) = self.settings.current() {
            sim::move_paddle(&mut self.world, direction, settings.player_speed);
        }
    }

    /// Hold a direction; applied once per frame until released.
    /// Ignored while no round is running.
    pub fn press(&mut self, direction: Direction) {
        if self.is_running() {
            self.held.set(direction, true);
        }
    }

    pub fn release(&mut self, direction: Direction) {
        self.held.set(direction, false);
    }

    //--- Time --------------------------------------------------------------

    /// Advance simulated time, running every firing that falls due, one at a
    /// time in time order
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.clock.now() + elapsed;
        while let Some(process) = self.clock.next_firing(until) {
            match process {
                Process::Frame => self.on_frame(),
                Process::Countdown => self.on_countdown(),
                Process::Spawn => self.on_spawn(),
            }
        }
        self.clock.settle(until);
    }

    //--- Internals ---------------------------------------------------------

    fn install_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        self.settings.update(settings)?;
        self.rearm_spawn();
        Ok(())
    }

    /// Replace the spawn timer with one at the current interval
    fn rearm_spawn(&mut self) {
        if let Some(handle) = self.spawn_timer.take() {
            self.clock.cancel(handle);
        }
        let period = Duration::from_millis(u64::from(self.settings.spawn_period_ms()));
        self.spawn_timer = self.clock.schedule(period, Process::Spawn);
        if self.spawn_timer.is_none() {
            log::debug!("Spawning disabled");
        }
    }

    fn on_frame(&mut self) {
        self.frame_count += 1;

        if self.is_running() {
            if let Some(settings) = self.settings.current().copied() {
                let outcome = sim::frame(&mut self.world, &self.held, &settings);
                for _ in 0..outcome.caught {
                    let mut next = self.state();
                    next.caught_objects += 1;
                    self.state.publish(next);
                }
            }
        }

        self.frames.publish(&FrameTick {
            frame: self.frame_count,
        });
    }

    fn on_countdown(&mut self) {
        if !self.is_running() {
            return;
        }

        let current = self.state();
        let remaining = current.time_remaining.saturating_sub(1);
        if remaining == 0 {
            self.phase = RoundPhase::Ended;
            self.held.clear();
            self.state.publish(current.expired());
            log::info!("Round ended: {} caught", current.caught_objects);
        } else {
            self.state.publish(WorldState {
                time_remaining: remaining,
                ..current
            });
        }
    }

    fn on_spawn(&mut self) {
        if !self.is_running() {
            return;
        }
        let object = self.world.spawn_object();
        log::debug!("Spawned object {} at x={:.1}", object.id, object.pos.x);
    }
}
