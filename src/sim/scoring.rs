//! Score tracking

use super::state::GameState;

/// Award one point per obstacle whose right edge the bird's left edge has
/// passed. Returns the number of points awarded this tick.
pub fn update_score(state: &mut GameState) -> u32 {
    let bird_left = state.bird.x;
    let config = &state.config;
    let mut awarded = 0;

    for obstacle in state.obstacles.iter_mut() {
        if !obstacle.passed && bird_left > obstacle.right(config) {
            obstacle.passed = true;
            awarded += 1;
        }
    }

    state.score += awarded;
    awarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::Obstacle;

    fn state_with(xs: &[f32]) -> GameState {
        let mut state = GameState::new(GameConfig::default(), 1);
        for &x in xs {
            let id = state.next_obstacle_id();
            state.obstacles.push(Obstacle::new(id, x, 200.0));
        }
        state
    }

    #[test]
    fn test_scores_once_per_obstacle() {
        // Right edge 99 < bird left 100
        let mut state = state_with(&[39.0]);
        assert_eq!(update_score(&mut state), 1);
        assert_eq!(state.score, 1);
        assert!(state.obstacles[0].passed);

        assert_eq!(update_score(&mut state), 0);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_edge_alignment_does_not_score() {
        // Right edge exactly at the bird's left edge
        let mut state = state_with(&[40.0]);
        assert_eq!(update_score(&mut state), 0);
        assert!(!state.obstacles[0].passed);
    }

    #[test]
    fn test_only_passed_obstacles_score() {
        let mut state = state_with(&[-10.0, 30.0, 200.0]);
        assert_eq!(update_score(&mut state), 2);
        assert_eq!(state.score, 2);
        assert!(!state.obstacles[2].passed);
    }
}
