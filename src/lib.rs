//! Catchfall - a paddle catches objects falling from the top of the field
//!
//! Core modules:
//! - `sim`: Per-frame simulation (world state, movement, captures)
//! - `clock`: Repeating timers on a single logical timeline
//! - `observe`: Snapshot broadcast to any number of subscribers
//! - `settings`: Round configuration and its validation
//! - `engine`: The command surface that ties the above together
//!
//! The crate is headless. Drawing and input wiring live in adapters that
//! consume [`engine::Engine::subscribe_state`], [`engine::Engine::subscribe_frames`]
//! and [`engine::Engine::paintable`].

pub mod clock;
pub mod engine;
pub mod observe;
pub mod settings;
pub mod sim;

pub use engine::{Engine, EngineBuilder, SettingsChange};
pub use observe::Subscription;
pub use settings::{Settings, SettingsError};
pub use sim::{Direction, FrameTick, PaintSnapshot, RoundPhase, WorldState};

/// Playfield and entity geometry shared with the render adapter
pub mod consts {
    use std::time::Duration;

    /// Playfield dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Paddle sits on the bottom edge of the field
    pub const PADDLE_WIDTH: f32 = 50.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;

    /// Falling object radius
    pub const OBJECT_RADIUS: f32 = 10.0;
    /// Objects spawn at least this far from either side wall
    pub const SPAWN_MARGIN: f32 = 10.0;

    /// Countdown period, independent of settings
    pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);
    /// Default frame rate for the per-frame process (display refresh)
    pub const DEFAULT_FRAME_RATE: u32 = 60;
    /// Default RNG seed for spawn positions
    pub const DEFAULT_SEED: u64 = 0x5EED_CA7C;
}

/// Paddle center at the start of every round
#[inline]
pub fn field_center_x() -> f32 {
    consts::FIELD_WIDTH / 2.0
}
