//! Idle/demo mode - the game plays itself
//!
//! Flaps whenever the bird's bottom edge would sink below a target line
//! derived from the upcoming gaps. Used by the demo toggle in the browser
//! and by the headless native runner.

use crate::config::GameConfig;
use crate::sim::{GameState, Obstacle};

/// Distance kept between the bird's bottom edge and a gap's bottom edge
pub const GAP_MARGIN: f32 = 12.0;
/// Extra room above the bird beyond the height of one flap
pub const CLEARANCE: f32 = 14.0;

/// Height gained by one flap from the top of its arc's start
pub fn flap_rise(config: &GameConfig) -> f32 {
    config.jump_strength * config.jump_strength / (2.0 * config.gravity)
}

fn gap_line(obstacle: &Obstacle, config: &GameConfig) -> f32 {
    obstacle.gap_bottom(config) - GAP_MARGIN
}

/// Y the bird's bottom edge should stay above
///
/// Aims at the next gap, but when the gap after it is higher the bird
/// climbs early, as far as the current gap safely allows.
pub fn target_line(state: &GameState) -> f32 {
    let config = &state.config;
    let mut upcoming = state.obstacles.iter().filter(|o| !o.passed);

    let Some(next) = upcoming.next() else {
        return (config.playfield_height + config.bird_size) / 2.0;
    };
    let line = gap_line(next, config);

    match upcoming.next() {
        Some(after) => {
            let highest_safe = next.top_height + config.bird_size + flap_rise(config) + CLEARANCE;
            gap_line(after, config).max(highest_safe).min(line)
        }
        None => line,
    }
}

/// Whether to flap this tick
pub fn should_flap(state: &GameState) -> bool {
    let bird = &state.bird;
    let next_bottom = bird.y + bird.size + bird.velocity + state.config.gravity;
    next_bottom > target_line(state)
}
