//! Game tuning
//!
//! Every gameplay constant lives here so a page (or `FLAPPY_CONFIG` natively)
//! can override them with JSON. Missing fields keep their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors from loading or validating a [`GameConfig`]
#[derive(Debug)]
pub enum ConfigError {
    /// JSON could not be parsed
    Parse(serde_json::Error),
    /// Values parsed but describe an unplayable game
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "failed to parse game config: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid game config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Tunable gameplay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Physics ===
    pub gravity: f32,
    pub jump_strength: f32,

    // === Obstacles ===
    pub pipe_speed: f32,
    pub pipe_width: f32,
    pub gap_size: f32,
    pub spawn_distance: f32,
    pub min_pipe_height: f32,
    pub despawn_margin: f32,

    // === Bird ===
    pub bird_size: f32,
    pub bird_x: f32,

    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub ground_height: f32,

    // === Session ===
    /// How long a pending commentary request may block restart
    pub commentary_wait_frames: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,

            pipe_speed: PIPE_SPEED,
            pipe_width: PIPE_WIDTH,
            gap_size: GAP_SIZE,
            spawn_distance: SPAWN_DISTANCE,
            min_pipe_height: MIN_PIPE_HEIGHT,
            despawn_margin: DESPAWN_MARGIN,

            bird_size: BIRD_SIZE,
            bird_x: BIRD_X,

            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            ground_height: GROUND_HEIGHT,

            commentary_wait_frames: COMMENTARY_WAIT_FRAMES,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Y coordinate of the ground line (top of the ground strip)
    pub fn ground_y(&self) -> f32 {
        self.playfield_height - self.ground_height
    }

    /// Largest top-segment height that still leaves a minimum bottom segment
    pub fn max_pipe_height(&self) -> f32 {
        self.playfield_height - self.gap_size - self.min_pipe_height - self.ground_height
    }

    /// Scale factor that fits the playfield inside a viewport, never above 1
    pub fn fit_scale(&self, viewport_width: f32, viewport_height: f32) -> f32 {
        let scale = (viewport_width / self.playfield_width).min(viewport_height / self.playfield_height);
        if scale.is_finite() && scale > 0.0 { scale.min(1.0) } else { 1.0 }
    }

    /// Check the values describe a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gravity", self.gravity),
            ("pipe_speed", self.pipe_speed),
            ("pipe_width", self.pipe_width),
            ("gap_size", self.gap_size),
            ("spawn_distance", self.spawn_distance),
            ("bird_size", self.bird_size),
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive and finite, got {}", name, value)));
            }
        }

        let non_negative = [
            ("min_pipe_height", self.min_pipe_height),
            ("despawn_margin", self.despawn_margin),
            ("ground_height", self.ground_height),
            ("bird_x", self.bird_x),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be finite and not negative, got {}", name, value)));
            }
        }

        if !(self.jump_strength.is_finite() && self.jump_strength < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "jump_strength must be negative (upward), got {}",
                self.jump_strength
            )));
        }
        if self.bird_size >= self.gap_size {
            return Err(ConfigError::Invalid(format!(
                "bird_size {} does not fit through gap_size {}",
                self.bird_size, self.gap_size
            )));
        }
        if self.max_pipe_height() < self.min_pipe_height {
            return Err(ConfigError::Invalid(format!(
                "playfield_height {} too small for two {}px segments, a {}px gap and {}px of ground",
                self.playfield_height, self.min_pipe_height, self.gap_size, self.ground_height
            )));
        }
        if self.bird_x + self.bird_size > self.playfield_width {
            return Err(ConfigError::Invalid("bird does not fit inside the playfield".into()));
        }

        Ok(())
    }

    /// Load config from the page (WASM only)
    ///
    /// Reads JSON from `<script id="game-config" type="application/json">`.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("game-config"))
            .and_then(|el| el.text_content());

        match json {
            Some(json) => Self::from_json_or_default(&json),
            None => {
                log::info!("Using default game config");
                Self::default()
            }
        }
    }

    /// Load config from the file named by `FLAPPY_CONFIG` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("FLAPPY_CONFIG") else {
            log::info!("Using default game config");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json_or_default(&json),
            Err(e) => {
                log::error!("Failed to read {}: {} - using defaults", path, e);
                Self::default()
            }
        }
    }

    fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => {
                log::info!("Loaded game config");
                config
            }
            Err(e) => {
                log::error!("{} - using defaults", e);
                Self::default()
            }
        }
    }
}
