//! Capture and out-of-field tests
//!
//! Capture is deliberately simple: the object's bottom edge has reached the
//! paddle's top face and its center lies within the paddle's span. There is
//! no bounce and no side contact.

use super::state::{FallingObject, Paddle};
use crate::consts::FIELD_HEIGHT;

/// Whether the paddle catches the object this frame
pub fn is_caught(object: &FallingObject, paddle: &Paddle) -> bool {
    object.bottom() >= paddle.top()
        && object.pos.x >= paddle.left()
        && object.pos.x <= paddle.right()
}

/// Whether the object has fully left the bottom of the field
pub fn is_below_field(object: &FallingObject) -> bool {
    object.top() > FIELD_HEIGHT
}
