//! Obstacle generation and scrolling

use rand::Rng;

use super::state::{GameState, Obstacle};
use crate::config::GameConfig;

/// Pick a top-segment height that leaves both segments at least
/// `min_pipe_height` tall above the ground reservation
pub fn random_top_height<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> f32 {
    let min = config.min_pipe_height;
    let max = config.max_pipe_height().max(min);
    if !(min.is_finite() && max.is_finite()) {
        log::warn!("Pipe height range {}..={} is not finite, using the minimum", min, max);
        return if min.is_finite() { min } else { 0.0 };
    }
    rng.random_range(min..=max)
}

/// Spawn an obstacle at the right edge of the playfield
pub fn spawn_obstacle(state: &mut GameState) -> u32 {
    let top_height = random_top_height(&state.config, &mut state.rng);
    let id = state.next_obstacle_id();
    state
        .obstacles
        .push(Obstacle::new(id, state.config.playfield_width, top_height));
    log::debug!("Spawned obstacle {} (top {:.0})", id, top_height);
    id
}

/// Whether the generator should emit a new obstacle this tick
pub fn should_spawn(state: &GameState) -> bool {
    match state.newest_obstacle() {
        None => true,
        Some(newest) => state.config.playfield_width - newest.x > state.config.spawn_distance,
    }
}

/// Scroll obstacles left and drop those that are fully off screen
pub fn advance_obstacles(state: &mut GameState) {
    let config = &state.config;
    for obstacle in &mut state.obstacles {
        obstacle.x -= config.pipe_speed;
    }
    state
        .obstacles
        .retain(|o| o.right(config) > -config.despawn_margin);
}

/// Scroll, cull, then spawn if the newest obstacle has moved far enough.
/// Returns the id of the spawned obstacle.
pub fn update_obstacles(state: &mut GameState) -> Option<u32> {
    advance_obstacles(state);
    should_spawn(state).then(|| spawn_obstacle(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_top_height_in_bounds() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..10_000 {
            let h = random_top_height(&config, &mut rng);
            assert!((50.0..=350.0).contains(&h), "height {} out of range", h);
            assert!(config.playfield_height - h - config.gap_size - config.ground_height >= 50.0);
        }
    }

    #[test]
    fn test_top_height_with_unbounded_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let config = GameConfig {
            min_pipe_height: f32::NAN,
            ..Default::default()
        };
        assert_eq!(random_top_height(&config, &mut rng), 0.0);

        let config = GameConfig {
            playfield_height: f32::INFINITY,
            ..Default::default()
        };
        assert_eq!(random_top_height(&config, &mut rng), 50.0);
    }

    #[test]
    fn test_spawn_at_right_edge() {
        let mut state = GameState::new(GameConfig::default(), 1);
        let id = spawn_obstacle(&mut state);
        let obstacle = &state.obstacles[0];
        assert_eq!(obstacle.id, id);
        assert_eq!(obstacle.x, 400.0);
        assert!(!obstacle.passed);
    }

    #[test]
    fn test_spawns_when_empty() {
        let mut state = GameState::new(GameConfig::default(), 1);
        assert!(should_spawn(&state));
        let id = update_obstacles(&mut state);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(id, Some(state.obstacles[0].id));
        assert_eq!(update_obstacles(&mut state), None);
    }

    #[test]
    fn test_spawn_waits_for_distance() {
        let mut state = GameState::new(GameConfig::default(), 1);
        spawn_obstacle(&mut state);

        // 220 / 3.5 = 62.86, so the 63rd tick is the first past the threshold
        for _ in 0..62 {
            update_obstacles(&mut state);
        }
        assert_eq!(state.obstacles.len(), 1);

        update_obstacles(&mut state);
        assert_eq!(state.obstacles.len(), 2);
        assert_eq!(state.obstacles[1].x, 400.0);
        assert!(state.obstacles[1].id > state.obstacles[0].id);
    }

    #[test]
    fn test_obstacle_x_strictly_decreasing() {
        let mut state = GameState::new(GameConfig::default(), 3);
        spawn_obstacle(&mut state);
        let id = state.obstacles[0].id;
        let mut last_x = state.obstacles[0].x;
        for _ in 0..50 {
            update_obstacles(&mut state);
            let o = state.obstacles.iter().find(|o| o.id == id).unwrap();
            assert!(o.x < last_x);
            last_x = o.x;
        }
    }

    #[test]
    fn test_culled_past_margin_and_never_returns() {
        let mut state = GameState::new(GameConfig::default(), 5);
        spawn_obstacle(&mut state);
        let id = state.obstacles[0].id;

        let mut removed_at = None;
        for tick in 0..400 {
            update_obstacles(&mut state);
            let present = state.obstacles.iter().any(|o| o.id == id);
            match (present, removed_at) {
                (false, None) => removed_at = Some(tick),
                (true, Some(_)) => panic!("obstacle {} came back", id),
                _ => {}
            }
        }

        // Right edge starts at 460 and must reach -50: 510 / 3.5 = 145.7 ticks
        assert_eq!(removed_at, Some(145));
    }

    #[test]
    fn test_same_seed_same_heights() {
        let mut a = GameState::new(GameConfig::default(), 99);
        let mut b = GameState::new(GameConfig::default(), 99);
        for _ in 0..5 {
            spawn_obstacle(&mut a);
            spawn_obstacle(&mut b);
        }
        let heights_a: Vec<f32> = a.obstacles.iter().map(|o| o.top_height).collect();
        let heights_b: Vec<f32> = b.obstacles.iter().map(|o| o.top_height).collect();
        assert_eq!(heights_a, heights_b);
    }
}
