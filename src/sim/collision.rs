//! Collision detection
//!
//! Bird AABB against the playfield bounds and every active pipe pair.
//! Touching a boundary counts as a hit. Nothing here mutates state.

use super::state::{Aabb, Bird, Collision, GameState, Obstacle};
use crate::config::GameConfig;

/// Check the bird against the ground line and the top of the playfield
pub fn bounds_collision(bird: &Aabb, config: &GameConfig) -> Option<Collision> {
    if bird.bottom() >= config.ground_y() {
        Some(Collision::Ground)
    } else if bird.top() <= 0.0 {
        Some(Collision::Ceiling)
    } else {
        None
    }
}

/// Check the bird against one pipe pair
///
/// Only counts when the horizontal spans overlap; the bird must then sit
/// strictly inside the gap.
pub fn obstacle_collision(bird: &Aabb, obstacle: &Obstacle, config: &GameConfig) -> bool {
    if !bird.overlaps_x(obstacle.x, obstacle.right(config)) {
        return false;
    }
    bird.top() <= obstacle.top_height || bird.bottom() >= obstacle.gap_bottom(config)
}

/// First collision for the bird in its current position, if any
pub fn detect(bird: &Bird, obstacles: &[Obstacle], config: &GameConfig) -> Option<Collision> {
    let bounds = bird.bounds();

    if let Some(hit) = bounds_collision(&bounds, config) {
        return Some(hit);
    }

    obstacles
        .iter()
        .find(|o| obstacle_collision(&bounds, o, config))
        .map(|o| Collision::Obstacle { id: o.id })
}

/// Convenience wrapper over [`detect`] for a whole game state
pub fn check_collisions(state: &GameState) -> Option<Collision> {
    detect(&state.bird, &state.obstacles, &state.config)
}
