//! Per-frame simulation step
//!
//! Distances are per frame, not per second: an object with falling speed 5
//! moves 5 pixels every frame whatever the frame rate is.

use super::collision::{is_below_field, is_caught};
use super::state::{Direction, World};
use crate::settings::Settings;

/// Directions held down for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
}

impl FrameInput {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What happened to the falling objects this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub caught: u32,
    pub missed: u32,
}

/// Move the paddle one step. Returns whether it moved.
pub fn move_paddle(world: &mut World, direction: Direction, player_speed: u32) -> bool {
    world
        .paddle
        .try_shift(direction.delta(player_speed as f32))
}

/// Advance the world by one frame
///
/// Held directions are applied independently, left first: holding both moves
/// the paddle twice, which nets out to no movement unless one of the moves
/// hits a wall.
pub fn frame(world: &mut World, input: &FrameInput, settings: &Settings) -> FrameOutcome {
    if input.left {
        move_paddle(world, Direction::Left, settings.player_speed);
    }
    if input.right {
        move_paddle(world, Direction::Right, settings.player_speed);
    }

    let fall = settings.falling_speed as f32;
    let paddle = world.paddle;
    let mut outcome = FrameOutcome::default();

    world.objects.retain_mut(|object| {
        object.pos.y += fall;

        if is_caught(object, &paddle) {
            log::debug!("Caught object {} at x={:.1}", object.id, object.pos.x);
            outcome.caught += 1;
            return false;
        }
        if is_below_field(object) {
            outcome.missed += 1;
            return false;
        }
        true
    });

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn settings(falling_speed: u32, player_speed: u32) -> Settings {
        Settings {
            falling_speed,
            player_speed,
            ..Settings::default()
        }
    }

    #[test]
    fn test_objects_fall_by_speed() {
        let mut world = World::new(1);
        world.spawn_object_at(100.0);
        world.spawn_object_at(700.0);

        let outcome = frame(&mut world, &FrameInput::default(), &settings(7, 10));
        assert_eq!(outcome, FrameOutcome::default());
        assert!(world.objects.iter().all(|o| o.pos.y == 7.0));

        frame(&mut world, &FrameInput::default(), &settings(7, 10));
        assert!(world.objects.iter().all(|o| o.pos.y == 14.0));
    }

    #[test]
    fn test_single_capture_above_paddle() {
        let mut world = World::new(1);
        world.spawn_object_at(400.0);
        let s = settings(5, 10);

        // bottom edge reaches 580 when y = 570, i.e. after 114 frames
        let mut total = 0;
        for i in 1..=200 {
            let outcome = frame(&mut world, &FrameInput::default(), &s);
            total += outcome.caught;
            if i < 114 {
                assert_eq!(outcome.caught, 0, "Caught too early at frame {}", i);
            }
        }
        assert_eq!(total, 1, "Object must be counted exactly once");
        assert!(world.objects.is_empty());
    }

    #[test]
    fn test_miss_is_removed_without_score() {
        let mut world = World::new(1);
        world.spawn_object_at(100.0);
        let s = settings(10, 10);

        let mut outcome = FrameOutcome::default();
        let mut frames = 0;
        while !world.objects.is_empty() {
            let o = frame(&mut world, &FrameInput::default(), &s);
            outcome.caught += o.caught;
            outcome.missed += o.missed;
            frames += 1;
            assert!(frames < 100, "Object never left the field");
        }
        assert_eq!(outcome.caught, 0);
        assert_eq!(outcome.missed, 1);
        // Removed at y = 620, the first step where top edge > 600
        assert_eq!(frames, 62);
    }

    #[test]
    fn test_object_kept_while_partially_visible() {
        let mut world = World::new(1);
        world.spawn_object_at(100.0);
        world.objects[0].pos.y = 600.0;

        // y = 610: top edge sits on the bottom edge, still visible
        frame(&mut world, &FrameInput::default(), &settings(10, 10));
        assert_eq!(world.objects.len(), 1);
    }

    #[test]
    fn test_simultaneous_captures_each_count() {
        let mut world = World::new(1);
        for x in [380.0, 400.0, 420.0] {
            world.spawn_object_at(x);
        }
        for object in &mut world.objects {
            object.pos.y = 565.0;
        }
        let outcome = frame(&mut world, &FrameInput::default(), &settings(5, 10));
        assert_eq!(outcome.caught, 3);
        assert!(world.objects.is_empty());
    }

    #[test]
    fn test_held_directions_apply_before_falling() {
        let mut world = World::new(1);
        // Lands just left of the paddle's span unless the paddle moves first
        world.spawn_object_at(370.0);
        world.objects[0].pos.y = 565.0;

        let input = FrameInput {
            left: true,
            right: false,
        };
        let outcome = frame(&mut world, &input, &settings(5, 10));
        assert_eq!(world.paddle.x, 390.0);
        assert_eq!(outcome.caught, 1);
    }

    #[test]
    fn test_both_directions_are_additive() {
        let mut world = World::new(1);
        let both = FrameInput {
            left: true,
            right: true,
        };
        frame(&mut world, &both, &settings(5, 10));
        assert_eq!(world.paddle.x, 400.0, "Left then right nets to zero");

        // Against the left wall the left move is rejected, the right one applies
        world.paddle.x = PADDLE_WIDTH / 2.0;
        frame(&mut world, &both, &settings(5, 10));
        assert_eq!(world.paddle.x, PADDLE_WIDTH / 2.0 + 10.0);
    }

    #[test]
    fn test_frame_input_set_and_clear() {
        let mut input = FrameInput::default();
        input.set(Direction::Right, true);
        assert!(input.right && !input.left);
        input.set(Direction::Left, true);
        input.set(Direction::Right, false);
        assert!(input.left && !input.right);
        input.clear();
        assert_eq!(input, FrameInput::default());
    }

    proptest! {
        #[test]
        fn prop_capture_count_ignores_order(
            xs in proptest::collection::vec(SPAWN_MARGIN..=FIELD_WIDTH - SPAWN_MARGIN, 0..40),
            ys in proptest::collection::vec(0.0f32..620.0, 40),
        ) {
            let build = |reverse: bool| {
                let mut world = World::new(7);
                let mut pairs: Vec<(f32, f32)> = xs.iter().copied().zip(ys.iter().copied()).collect();
                if reverse {
                    pairs.reverse();
                }
                for (x, y) in pairs {
                    world.spawn_object_at(x);
                    if let Some(last) = world.objects.last_mut() {
                        last.pos.y = y;
                    }
                }
                world
            };
            let s = settings(5, 10);
            let mut forward = build(false);
            let mut backward = build(true);
            let a = frame(&mut forward, &FrameInput::default(), &s);
            let b = frame(&mut backward, &FrameInput::default(), &s);
            prop_assert_eq!(a, b);
            prop_assert_eq!(forward.objects.len(), backward.objects.len());
        }

        #[test]
        fn prop_paddle_never_leaves_field(
            moves in proptest::collection::vec((any::<bool>(), 1u32..200), 0..200),
        ) {
            let mut world = World::new(3);
            for (left, speed) in moves {
                let dir = if left { Direction::Left } else { Direction::Right };
                move_paddle(&mut world, dir, speed);
                prop_assert!(world.paddle.left() >= 0.0);
                prop_assert!(world.paddle.right() <= FIELD_WIDTH);
            }
        }
    }
}
