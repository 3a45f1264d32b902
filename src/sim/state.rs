//! Game state and core simulation types
//!
//! One `GameState` per session. It is owned by the session and mutated only
//! through [`super::tick`]; the presentation layer reads snapshots.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::consts::{MAX_ROTATION, MIN_ROTATION, ROTATION_PER_VELOCITY};

/// Axis-aligned bounding box in playfield pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Horizontal spans overlap, touching edges included
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x >= left && self.min.x <= right
    }
}

/// The player-controlled bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    /// Fixed horizontal position of the left edge
    pub x: f32,
    /// Top edge, mutated every tick
    pub y: f32,
    /// Vertical velocity (positive = falling)
    pub velocity: f32,
    /// Side length of the square hitbox
    pub size: f32,
}

impl Bird {
    /// Bird at rest in the vertical middle of the playfield
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: config.bird_x,
            y: config.playfield_height / 2.0,
            velocity: 0.0,
            size: config.bird_size,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(Vec2::new(self.x, self.y), Vec2::splat(self.size))
    }

    /// Visual tilt in degrees. Presentation only, never used for collision.
    pub fn rotation(&self) -> f32 {
        (self.velocity * ROTATION_PER_VELOCITY).clamp(MIN_ROTATION, MAX_ROTATION)
    }
}

/// A top/bottom pipe pair with a passable gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge, decreases every tick
    pub x: f32,
    /// Height of the top segment (= y of the gap's upper edge)
    pub top_height: f32,
    /// Set once the bird has fully passed this obstacle
    pub passed: bool,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, top_height: f32) -> Self {
        Self {
            id,
            x,
            top_height,
            passed: false,
        }
    }

    pub fn right(&self, config: &GameConfig) -> f32 {
        self.x + config.pipe_width
    }

    /// Y of the bottom segment's top edge
    pub fn gap_bottom(&self, config: &GameConfig) -> f32 {
        self.top_height + config.gap_size
    }

    /// Height of the bottom segment. It runs to the playfield floor, behind
    /// the ground strip.
    pub fn bottom_height(&self, config: &GameConfig) -> f32 {
        config.playfield_height - self.top_height - config.gap_size
    }

    pub fn top_bounds(&self, config: &GameConfig) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, 0.0),
            Vec2::new(self.right(config), self.top_height),
        )
    }

    pub fn bottom_bounds(&self, config: &GameConfig) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, self.gap_bottom(config)),
            Vec2::new(self.right(config), config.playfield_height),
        )
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    /// Bottom edge reached the ground line
    Ground,
    /// Top edge reached the top of the playfield
    Ceiling,
    /// Hit a pipe segment
    Obstacle { id: u32 },
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the obstacle RNG
    pub seed: u64,
    /// Obstacle placement RNG
    pub rng: Pcg32,
    pub config: GameConfig,
    pub bird: Bird,
    /// Active obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Set by the tick that ended the run
    pub collision: Option<Collision>,
    /// Next obstacle ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh state with no obstacles
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bird: Bird::new(&config),
            config,
            obstacles: Vec::new(),
            score: 0,
            time_ticks: 0,
            collision: None,
            next_id: 1,
        }
    }

    /// Allocate a new obstacle ID
    pub fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Most recently spawned obstacle
    pub fn newest_obstacle(&self) -> Option<&Obstacle> {
        self.obstacles.last()
    }
}
