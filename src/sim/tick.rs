//! Per-frame simulation tick
//!
//! Core game loop step. Order matters: physics, obstacle scroll/spawn,
//! collision, then scoring.

use super::collision::check_collisions;
use super::physics;
use super::scoring::update_score;
use super::spawn::update_obstacles;
use super::state::{Collision, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap before integrating (space/click/tap)
    pub flap: bool,
}

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Obstacle spawned this tick
    pub spawned: Option<u32>,
    /// Points awarded this tick
    pub scored: u32,
    /// Set when the run ended this tick
    pub collision: Option<Collision>,
}

/// Advance the game state by one tick
///
/// A state that already collided is frozen; further ticks are no-ops.
pub fn tick(state: &mut GameState, input: &TickInput) -> TickEvents {
    let mut events = TickEvents::default();
    if state.collision.is_some() {
        return events;
    }

    state.time_ticks += 1;

    // 1. Physics
    if input.flap {
        physics::flap(&mut state.bird, state.config.jump_strength);
    }
    physics::integrate(&mut state.bird, state.config.gravity);

    // 2. Obstacles
    events.spawned = update_obstacles(state);

    // 3. Collision
    if let Some(hit) = check_collisions(state) {
        state.collision = Some(hit);
        events.collision = Some(hit);
        return events;
    }

    // 4. Scoring
    events.scored = update_score(state);

    events
}
