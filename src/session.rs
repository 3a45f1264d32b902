//! Session state machine
//!
//! Owns the game state and drives it once per display refresh. The
//! presentation layer sends presses in and reads a [`Snapshot`] out; the
//! commentary request runs outside, tagged with the session generation it
//! belongs to so a late reply cannot land on a newer session.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::autopilot;
use crate::config::GameConfig;
use crate::highscores::HighScores;
use crate::sim::spawn::spawn_obstacle;
use crate::sim::{Collision, GameState, TickInput, tick};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first press
    Start,
    /// Active gameplay
    Playing,
    /// Run ended; commentary may be pending
    Ended,
}

/// What a press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// Flap queued for the next tick
    Flapped,
    /// A new session started
    Started { generation: u64 },
    /// Restart blocked while commentary is pending
    Suppressed,
}

/// Request for commentary on a finished session. Hand the reply back to
/// [`Session::resolve_commentary`] with the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentaryTicket {
    pub generation: u64,
    pub score: u32,
}

/// Commentary shown on the game-over screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CommentaryState {
    None,
    Pending { generation: u64 },
    Ready { generation: u64, text: String },
}

impl CommentaryState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CommentaryState::Pending { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            CommentaryState::Ready { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Bird geometry for rendering
#[derive(Debug, Clone, Serialize)]
pub struct BirdView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Degrees, clockwise
    pub rotation: f32,
}

/// Obstacle geometry for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub top_height: f32,
    pub gap_bottom: f32,
    pub bottom_height: f32,
}

/// Immutable view of a session after a frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub generation: u64,
    pub score: u32,
    pub best: u32,
    pub bird: BirdView,
    pub obstacles: Vec<ObstacleView>,
    pub commentary: CommentaryState,
    pub restart_blocked: bool,
    pub autopilot: bool,
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub ground_height: f32,
}

/// One player's run of sessions within a page/process lifetime
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    phase: GamePhase,
    state: GameState,
    high_scores: HighScores,
    /// Incremented on every start; tags commentary requests
    generation: u64,
    commentary: CommentaryState,
    /// Frames spent in Ended, for the restart suppression window
    ended_frames: u32,
    /// One-shot input for the next tick
    input: TickInput,
    /// Seeds each session's obstacle RNG
    seeds: Pcg32,
    /// Let the autopilot flap
    pub autopilot: bool,
}

impl Session {
    /// New session on the start screen
    pub fn new(config: GameConfig, seed: u64) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Session created with an unplayable config: {}", e);
        }
        let mut seeds = Pcg32::seed_from_u64(seed);
        let state = GameState::new(config.clone(), seeds.next_u64());
        Self {
            config,
            phase: GamePhase::Start,
            state,
            high_scores: HighScores::new(),
            generation: 0,
            commentary: CommentaryState::None,
            ended_frames: 0,
            input: TickInput::default(),
            seeds,
            autopilot: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best(&self) -> u32 {
        self.high_scores.best()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn commentary(&self) -> &CommentaryState {
        &self.commentary
    }

    /// Whether a press on the start/game-over screen would be ignored
    pub fn restart_blocked(&self) -> bool {
        self.phase == GamePhase::Ended
            && self.commentary.is_pending()
            && self.ended_frames < self.config.commentary_wait_frames
    }

    /// Handle the single player action (space / click / tap)
    pub fn press(&mut self) -> Press {
        match self.phase {
            GamePhase::Playing => {
                self.input.flap = true;
                Press::Flapped
            }
            GamePhase::Start | GamePhase::Ended => {
                if self.restart_blocked() {
                    log::warn!("Restart ignored: waiting for commentary");
                    return Press::Suppressed;
                }
                self.start();
                Press::Started {
                    generation: self.generation,
                }
            }
        }
    }

    /// Reset score, bird and obstacles and begin playing
    pub fn start(&mut self) {
        if let CommentaryState::Pending { generation } = self.commentary {
            log::debug!("Abandoning commentary for session {}", generation);
        }

        self.generation += 1;
        self.state = GameState::new(self.config.clone(), self.seeds.next_u64());
        spawn_obstacle(&mut self.state);
        self.commentary = CommentaryState::None;
        self.ended_frames = 0;
        self.input = TickInput::default();
        self.phase = GamePhase::Playing;

        log::info!("Session {} started (seed {})", self.generation, self.state.seed);
    }

    /// Advance one display refresh
    ///
    /// Returns a ticket when this frame ended the run; the caller issues the
    /// commentary request with it.
    pub fn frame(&mut self) -> Option<CommentaryTicket> {
        match self.phase {
            GamePhase::Start => None,
            GamePhase::Ended => {
                self.ended_frames = self.ended_frames.saturating_add(1);
                None
            }
            GamePhase::Playing => {
                if self.autopilot && autopilot::should_flap(&self.state) {
                    self.input.flap = true;
                }

                let input = std::mem::take(&mut self.input);
                let events = tick(&mut self.state, &input);
                events.collision.map(|hit| self.end(hit))
            }
        }
    }

    fn end(&mut self, hit: Collision) -> CommentaryTicket {
        self.phase = GamePhase::Ended;
        self.ended_frames = 0;

        let score = self.state.score;
        let new_best = self.high_scores.record(score, self.generation);
        self.commentary = CommentaryState::Pending {
            generation: self.generation,
        };

        log::info!(
            "Session {} ended by {:?} after {} ticks: score {}{}",
            self.generation,
            hit,
            self.state.time_ticks,
            score,
            if new_best { " (new best)" } else { "" }
        );

        CommentaryTicket {
            generation: self.generation,
            score,
        }
    }

    /// Store a commentary reply. Returns false (and drops the text) when the
    /// reply belongs to an older session.
    pub fn resolve_commentary(&mut self, generation: u64, text: String) -> bool {
        if generation != self.generation {
            log::debug!(
                "Discarding stale commentary for session {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        self.commentary = CommentaryState::Ready { generation, text };
        true
    }

    /// Snapshot for the presentation layer
    pub fn snapshot(&self) -> Snapshot {
        let config = &self.config;
        let bird = &self.state.bird;
        Snapshot {
            phase: self.phase,
            generation: self.generation,
            score: self.state.score,
            best: self.high_scores.best(),
            bird: BirdView {
                x: bird.x,
                y: bird.y,
                size: bird.size,
                rotation: bird.rotation(),
            },
            obstacles: self
                .state
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    x: o.x,
                    width: config.pipe_width,
                    top_height: o.top_height,
                    gap_bottom: o.gap_bottom(config),
                    bottom_height: o.bottom_height(config),
                })
                .collect(),
            commentary: self.commentary.clone(),
            restart_blocked: self.restart_blocked(),
            autopilot: self.autopilot,
            playfield_width: config.playfield_width,
            playfield_height: config.playfield_height,
            ground_height: config.ground_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(GameConfig::default(), 12345)
    }

    /// Run frames until the session ends
    fn play_until_end(session: &mut Session) -> CommentaryTicket {
        for _ in 0..10_000 {
            if let Some(ticket) = session.frame() {
                return ticket;
            }
        }
        panic!("session never ended");
    }

    #[test]
    fn test_unvalidated_config_still_starts() {
        let config = GameConfig {
            min_pipe_height: f32::NAN,
            ..Default::default()
        };
        let mut s = Session::new(config, 1);
        assert!(matches!(s.press(), Press::Started { generation: 1 }));
        assert_eq!(s.state().obstacles.len(), 1);
        assert_eq!(s.state().obstacles[0].top_height, 0.0);
        s.frame();
    }

    #[test]
    fn test_starts_on_title_screen() {
        let mut s = session();
        assert_eq!(s.phase(), GamePhase::Start);
        assert_eq!(s.generation(), 0);

        // No ticking before the first press
        let y = s.state().bird.y;
        assert_eq!(s.frame(), None);
        assert_eq!(s.state().bird.y, y);
        assert_eq!(s.state().time_ticks, 0);
    }

    #[test]
    fn test_press_starts_with_one_obstacle() {
        let mut s = session();
        assert_eq!(s.press(), Press::Started { generation: 1 });
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.score(), 0);
        assert_eq!(s.state().obstacles.len(), 1);
        assert_eq!(s.state().obstacles[0].x, 400.0);
        assert_eq!(s.state().bird.y, 300.0);
    }

    #[test]
    fn test_press_while_playing_flaps() {
        let mut s = session();
        s.press();
        s.frame();
        s.frame();
        assert!(s.state().bird.velocity > 0.0);

        assert_eq!(s.press(), Press::Flapped);
        assert_eq!(s.phase(), GamePhase::Playing);
        s.frame();
        assert!((s.state().bird.velocity - (-5.65)).abs() < 1e-5);
    }

    #[test]
    fn test_falling_ends_session() {
        let mut s = session();
        s.press();
        let ticket = play_until_end(&mut s);

        assert_eq!(s.phase(), GamePhase::Ended);
        assert_eq!(ticket, CommentaryTicket { generation: 1, score: 0 });
        assert_eq!(s.state().collision, Some(Collision::Ground));
        assert!(s.commentary().is_pending());

        // Frames in Ended do not tick the simulation
        let ticks = s.state().time_ticks;
        assert_eq!(s.frame(), None);
        assert_eq!(s.state().time_ticks, ticks);
    }

    #[test]
    fn test_restart_suppressed_while_pending() {
        let mut s = session();
        s.press();
        let ticket = play_until_end(&mut s);

        assert!(s.restart_blocked());
        assert_eq!(s.press(), Press::Suppressed);
        assert_eq!(s.phase(), GamePhase::Ended);

        assert!(s.resolve_commentary(ticket.generation, "Ouch.".to_string()));
        assert_eq!(s.commentary().text(), Some("Ouch."));
        assert!(!s.restart_blocked());
        assert_eq!(s.press(), Press::Started { generation: 2 });
        assert_eq!(s.commentary(), &CommentaryState::None);
    }

    #[test]
    fn test_suppression_window_expires() {
        let config = GameConfig {
            commentary_wait_frames: 5,
            ..Default::default()
        };
        let mut s = Session::new(config, 1);
        s.press();
        let ticket = play_until_end(&mut s);

        for _ in 0..4 {
            s.frame();
        }
        assert_eq!(s.press(), Press::Suppressed);
        s.frame();
        assert_eq!(s.press(), Press::Started { generation: 2 });

        // The late reply for session 1 must not show up on session 2
        assert!(!s.resolve_commentary(ticket.generation, "late".to_string()));
        assert_eq!(s.commentary(), &CommentaryState::None);
    }

    #[test]
    fn test_best_score_kept_across_sessions() {
        let mut s = session();
        s.press();
        // Hand the session a score, then crash it
        s.state.score = 4;
        s.state.bird.y = 600.0;
        let ticket = s.frame().unwrap();
        assert_eq!(ticket.score, 4);
        assert_eq!(s.best(), 4);

        s.resolve_commentary(ticket.generation, "ok".to_string());
        s.press();
        assert_eq!(s.score(), 0, "score resets on restart");
        assert_eq!(s.best(), 4);

        s.state.score = 2;
        s.state.bird.y = 600.0;
        s.frame().unwrap();
        assert_eq!(s.best(), 4, "best never decreases");
        assert_eq!(s.high_scores().recent().len(), 2);
    }

    #[test]
    fn test_each_session_gets_new_obstacle_seed() {
        let mut s = session();
        s.press();
        let first = s.state().seed;
        s.state.bird.y = 600.0;
        let ticket = s.frame().unwrap();
        s.resolve_commentary(ticket.generation, String::new());
        s.press();
        assert_ne!(s.state().seed, first);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut s = session();
        s.press();
        s.frame();
        let snap = s.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.generation, 1);
        assert_eq!(snap.obstacles.len(), 1);
        assert_eq!(snap.obstacles[0].x, 396.5);
        assert_eq!(snap.obstacles[0].width, 60.0);
        assert!((snap.obstacles[0].gap_bottom - snap.obstacles[0].top_height - 160.0).abs() < 1e-3);
        assert!((snap.bird.rotation - 1.05).abs() < 1e-4);
        assert!(!snap.restart_blocked);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["commentary"]["state"], "none");
    }

    #[test]
    fn test_autopilot_survives_several_pipes() {
        // Gaps vary between 150 and 250 from the top
        let config = GameConfig {
            min_pipe_height: 150.0,
            ..Default::default()
        };
        let mut s = Session::new(config, 12345);
        s.autopilot = true;
        s.press();
        for _ in 0..1_500 {
            if s.frame().is_some() {
                break;
            }
        }
        assert!(s.score() >= 5, "autopilot only scored {}", s.score());
    }
}
