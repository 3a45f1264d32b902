//! Bird motion
//!
//! Explicit Euler with a fixed step of one tick: velocity first, then
//! position from the new velocity.

use super::state::Bird;

/// Advance the bird by one tick under constant gravity
#[inline]
pub fn integrate(bird: &mut Bird, gravity: f32) {
    bird.velocity += gravity;
    bird.y += bird.velocity;
}

/// Replace the bird's velocity with the jump velocity. Never accumulates.
#[inline]
pub fn flap(bird: &mut Bird, jump_strength: f32) {
    bird.velocity = jump_strength;
}
