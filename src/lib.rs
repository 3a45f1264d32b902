//! Gemini Flappy - a Flappy Bird style arcade game
//!
//! Core modules:
//! - `sim`: Simulation (physics, obstacle spawning, collisions, scoring)
//! - `session`: Start/Playing/Ended state machine and commentary bookkeeping
//! - `commentary`: Post-game remarks from Gemini, with static fallbacks
//! - `config`: Data-driven game tuning
//! - `autopilot`: Idle/demo player

pub mod autopilot;
pub mod commentary;
pub mod config;
pub mod highscores;
pub mod session;
pub mod sim;

pub use config::GameConfig;
pub use highscores::HighScores;
pub use session::{CommentaryState, CommentaryTicket, GamePhase, Press, Session, Snapshot};

/// Default tuning values (one tick = one display refresh, ~60 Hz)
pub mod consts {
    /// Downward acceleration, pixels/tick²
    pub const GRAVITY: f32 = 0.35;
    /// Velocity set by a flap (negative = up)
    pub const JUMP_STRENGTH: f32 = -6.0;
    /// Obstacle scroll speed, pixels/tick
    pub const PIPE_SPEED: f32 = 3.5;
    pub const PIPE_WIDTH: f32 = 60.0;
    pub const GAP_SIZE: f32 = 160.0;
    pub const BIRD_SIZE: f32 = 34.0;
    /// Fixed horizontal position of the bird's left edge
    pub const BIRD_X: f32 = 100.0;
    /// Pixels reserved for ground at the bottom of the playfield
    pub const GROUND_HEIGHT: f32 = 40.0;

    /// Logical playfield, scaled to the screen by the presentation layer
    pub const PLAYFIELD_WIDTH: f32 = 400.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Horizontal distance the newest obstacle travels before the next spawns
    pub const SPAWN_DISTANCE: f32 = 220.0;
    /// Minimum height of either obstacle segment
    pub const MIN_PIPE_HEIGHT: f32 = 50.0;
    /// Obstacles are removed once their right edge is this far left of x = 0
    pub const DESPAWN_MARGIN: f32 = 50.0;

    /// Rotation per unit of velocity, degrees
    pub const ROTATION_PER_VELOCITY: f32 = 3.0;
    pub const MIN_ROTATION: f32 = -25.0;
    pub const MAX_ROTATION: f32 = 90.0;

    /// Frames a pending commentary request blocks restart (~10 s)
    pub const COMMENTARY_WAIT_FRAMES: u32 = 600;
}
