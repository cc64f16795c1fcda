//! World state and the engine-private entities
//!
//! `WorldState` is the only thing published to observers. Falling objects and
//! the paddle stay inside the engine; the render adapter gets copies through
//! [`PaintSnapshot`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::field_center_x;

/// Round lifecycle. Never returns to `Idle` once left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Before the first start
    Idle,
    /// Countdown running
    Running,
    /// Countdown reached zero
    Ended,
}

/// The published snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub caught_objects: u32,
    /// Seconds left in the round
    pub time_remaining: u32,
    pub running: bool,
}

impl WorldState {
    /// State at the start of a round of `game_time` seconds
    pub fn round_start(game_time: u32) -> Self {
        Self {
            caught_objects: 0,
            time_remaining: game_time,
            running: true,
        }
    }

    /// State at natural expiry; `running` and `time_remaining` drop together
    pub fn expired(self) -> Self {
        Self {
            time_remaining: 0,
            running: false,
            ..self
        }
    }
}

/// Paddle movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Signed horizontal offset for a move of `speed` pixels
    pub fn delta(self, speed: f32) -> f32 {
        match self {
            Direction::Left => -speed,
            Direction::Right => speed,
        }
    }
}

/// One frame of the per-frame process, for render adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Frames elapsed since engine construction (1-based)
    pub frame: u64,
}

/// A falling object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: u32,
    /// Center position; x is fixed at spawn
    pub pos: Vec2,
    pub radius: f32,
}

impl FallingObject {
    pub fn new(id: u32, x: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, 0.0),
            radius: OBJECT_RADIUS,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

/// The player's paddle, resting on the bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Center x
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: field_center_x(),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    #[inline]
    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Y of the paddle's top face
    #[inline]
    pub fn top(&self) -> f32 {
        FIELD_HEIGHT - self.height
    }

    /// Allowed range for the center so the whole paddle stays on the field
    pub fn center_range(&self) -> (f32, f32) {
        let half = self.width / 2.0;
        (half, FIELD_WIDTH - half)
    }

    /// Move by `delta` if the result keeps the paddle on the field.
    ///
    /// A move that would cross either wall is dropped entirely; the paddle
    /// does not snap to the wall. Returns whether the paddle moved.
    pub fn try_shift(&mut self, delta: f32) -> bool {
        let target = self.x + delta;
        let (min, max) = self.center_range();
        if target >= min && target <= max {
            self.x = target;
            true
        } else {
            false
        }
    }

    pub fn recenter(&mut self) {
        self.x = field_center_x();
    }
}

/// Read-only copy of everything the render adapter draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintSnapshot {
    pub paddle: Paddle,
    pub objects: Vec<FallingObject>,
}

/// Engine-private entities plus the spawn RNG
#[derive(Debug, Clone)]
pub struct World {
    pub paddle: Paddle,
    /// Live objects in spawn order
    pub objects: Vec<FallingObject>,
    rng: Pcg32,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            paddle: Paddle::default(),
            objects: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an object at a uniformly random x at the top of the field
    pub fn spawn_object(&mut self) -> FallingObject {
        let x = self
            .rng
            .random_range(SPAWN_MARGIN..=FIELD_WIDTH - SPAWN_MARGIN);
        self.spawn_object_at(x)
    }

    /// Spawn an object at a fixed x
    pub fn spawn_object_at(&mut self, x: f32) -> FallingObject {
        let id = self.next_entity_id();
        let object = FallingObject::new(id, x);
        self.objects.push(object);
        object
    }

    /// Drop every object and re-center the paddle
    pub fn reset(&mut self) {
        self.objects.clear();
        self.paddle.recenter();
    }

    pub fn paintable(&self) -> PaintSnapshot {
        PaintSnapshot {
            paddle: self.paddle,
            objects: self.objects.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_start_and_expiry() {
        let state = WorldState::round_start(30);
        assert_eq!(state.caught_objects, 0);
        assert_eq!(state.time_remaining, 30);
        assert!(state.running);

        let ended = WorldState {
            caught_objects: 7,
            ..state
        }
        .expired();
        assert_eq!(ended.caught_objects, 7, "Score survives the round end");
        assert_eq!(ended.time_remaining, 0);
        assert!(!ended.running);
    }

    #[test]
    fn test_paddle_starts_centered() {
        let paddle = Paddle::default();
        assert_eq!(paddle.x, 400.0);
        assert_eq!(paddle.left(), 375.0);
        assert_eq!(paddle.right(), 425.0);
        assert_eq!(paddle.top(), 580.0);
    }

    #[test]
    fn test_paddle_rejects_move_past_wall() {
        let mut paddle = Paddle {
            x: 30.0,
            ..Default::default()
        };
        // 30 - 10 = 20 would put the left edge at -5
        assert!(!paddle.try_shift(-10.0));
        assert_eq!(paddle.x, 30.0, "Rejected move leaves the paddle in place");

        // Landing exactly on the bound is allowed
        assert!(paddle.try_shift(-5.0));
        assert_eq!(paddle.x, 25.0);
        assert_eq!(paddle.left(), 0.0);

        let mut paddle = Paddle {
            x: 770.0,
            ..Default::default()
        };
        assert!(!paddle.try_shift(10.0));
        assert_eq!(paddle.x, 770.0);
        assert!(paddle.try_shift(5.0));
        assert_eq!(paddle.right(), FIELD_WIDTH);
    }

    #[test]
    fn test_spawn_assigns_ids_and_stays_in_margin() {
        let mut world = World::new(12345);
        for _ in 0..200 {
            world.spawn_object();
        }
        assert_eq!(world.objects.len(), 200);
        for (i, obj) in world.objects.iter().enumerate() {
            assert_eq!(obj.id, i as u32 + 1);
            assert_eq!(obj.pos.y, 0.0);
            assert_eq!(obj.radius, OBJECT_RADIUS);
            assert!(
                obj.pos.x >= SPAWN_MARGIN && obj.pos.x <= FIELD_WIDTH - SPAWN_MARGIN,
                "x = {} outside spawn range",
                obj.pos.x
            );
        }
    }

    #[test]
    fn test_spawn_is_deterministic_per_seed() {
        let mut a = World::new(99999);
        let mut b = World::new(99999);
        for _ in 0..10 {
            assert_eq!(a.spawn_object().pos, b.spawn_object().pos);
        }
    }

    #[test]
    fn test_reset_clears_objects_and_recenters() {
        let mut world = World::new(1);
        world.spawn_object();
        world.spawn_object();
        world.paddle.x = 100.0;

        world.reset();
        assert!(world.objects.is_empty());
        assert_eq!(world.paddle.x, 400.0);

        // IDs keep increasing across resets
        assert_eq!(world.spawn_object().id, 3);
    }

    #[test]
    fn test_paintable_is_a_copy() {
        let mut world = World::new(1);
        world.spawn_object_at(400.0);
        let snapshot = world.paintable();
        world.objects[0].pos.y = 300.0;
        assert_eq!(snapshot.objects[0].pos.y, 0.0);
    }

    #[test]
    fn test_world_state_json_uses_camel_case() {
        let json = serde_json::to_string(&WorldState::round_start(10)).unwrap();
        assert_eq!(
            json,
            r#"{"caughtObjects":0,"timeRemaining":10,"running":true}"#
        );
    }
}
