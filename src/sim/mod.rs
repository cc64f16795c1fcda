//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module knows about timers,
//! subscribers or drawing:
//! - Distances are per frame
//! - Seeded RNG only
//! - Objects are evaluated independently, in spawn order

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{is_below_field, is_caught};
pub use state::{
    Direction, FallingObject, FrameTick, PaintSnapshot, Paddle, RoundPhase, World, WorldState,
};
pub use tick::{FrameInput, FrameOutcome, frame, move_paddle};
