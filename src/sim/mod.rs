//! Simulation module
//!
//! All gameplay logic lives here:
//! - One tick per display refresh, no variable timestep
//! - Obstacle placement from a seeded RNG owned by the state
//! - Obstacles kept in spawn order (oldest first)
//! - No rendering, platform or network dependencies

pub mod collision;
pub mod physics;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{check_collisions, detect};
pub use state::{Aabb, Bird, Collision, GameState, Obstacle};
pub use tick::{TickEvents, TickInput, tick};
