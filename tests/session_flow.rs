//! Whole-session flows through the public API: start, play, crash,
//! commentary, restart.

use std::cell::Cell;

use gemini_flappy::commentary::{
    CommentaryClient, CommentaryError, CommentarySettings, CommentaryTransport, ERROR_FALLBACK,
    MISSING_SETUP_FALLBACK,
};
use gemini_flappy::sim::Collision;
use gemini_flappy::{CommentaryState, GameConfig, GamePhase, Press, Session};

struct CountingTransport {
    calls: Cell<u32>,
    fail: bool,
}

impl CommentaryTransport for &CountingTransport {
    async fn post_json(&self, _url: &str, _api_key: &str, body: String) -> Result<String, CommentaryError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(CommentaryError::Transport("connection reset".to_string()));
        }
        let request: serde_json::Value = serde_json::from_str(&body).unwrap();
        let prompt = request["contents"][0]["parts"][0]["text"].as_str().unwrap();
        let reply = if prompt.contains("score was 0.") {
            "Did you even press anything?"
        } else {
            "Respectable."
        };
        Ok(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": reply }] } }]
        })
        .to_string())
    }
}

/// Frames until the run ends
fn crash(session: &mut Session) -> gemini_flappy::CommentaryTicket {
    (0..100_000)
        .find_map(|_| session.frame())
        .expect("session never ended")
}

#[test]
fn full_session_with_commentary() {
    let transport = CountingTransport {
        calls: Cell::new(0),
        fail: false,
    };
    let client = CommentaryClient::new(&transport, Some("key".to_string()), CommentarySettings::default());
    let mut session = Session::new(GameConfig::default(), 2024);

    assert_eq!(session.phase(), GamePhase::Start);
    assert!(matches!(session.press(), Press::Started { generation: 1 }));

    // No flaps: the bird drops onto the ground before reaching the first pipe
    let ticket = crash(&mut session);
    assert_eq!(session.phase(), GamePhase::Ended);
    assert_eq!(session.state().collision, Some(Collision::Ground));
    assert_eq!(ticket.score, 0);
    assert_eq!(session.press(), Press::Suppressed);

    let text = pollster::block_on(client.commentary(ticket.score));
    assert!(session.resolve_commentary(ticket.generation, text));
    assert_eq!(session.commentary().text(), Some("Did you even press anything?"));
    assert_eq!(transport.calls.get(), 1);

    assert!(matches!(session.press(), Press::Started { generation: 2 }));
    assert_eq!(session.commentary(), &CommentaryState::None);
}

#[test]
fn autopilot_run_scores_and_sets_best() {
    let transport = CountingTransport {
        calls: Cell::new(0),
        fail: true,
    };
    let client = CommentaryClient::new(&transport, Some("key".to_string()), CommentarySettings::default());

    // Gaps between 150 and 250 from the top keep the autopilot alive a while
    let config = GameConfig {
        min_pipe_height: 150.0,
        ..Default::default()
    };
    let mut session = Session::new(config, 9);
    session.autopilot = true;
    session.press();

    for _ in 0..1_000 {
        assert!(session.frame().is_none());
    }
    let score = session.score();
    assert!(score >= 5, "scored {}", score);

    // Take over and stop flapping
    session.autopilot = false;
    let ticket = crash(&mut session);
    assert!(ticket.score >= score);
    assert_eq!(session.best(), ticket.score);

    let text = pollster::block_on(client.commentary(ticket.score));
    assert_eq!(text, ERROR_FALLBACK);
    session.resolve_commentary(ticket.generation, text);

    // A worse second run leaves the best alone
    session.press();
    let second = crash(&mut session);
    assert!(second.score < ticket.score);
    assert_eq!(session.best(), ticket.score);
}

#[test]
fn no_credentials_never_touches_network() {
    let transport = CountingTransport {
        calls: Cell::new(0),
        fail: false,
    };
    let client = CommentaryClient::new(&transport, None, CommentarySettings::default());

    let mut session = Session::new(GameConfig::default(), 1);
    session.press();
    let ticket = crash(&mut session);

    let text = pollster::block_on(client.commentary(ticket.score));
    assert_eq!(text, MISSING_SETUP_FALLBACK);
    assert_eq!(transport.calls.get(), 0);
}

#[test]
fn late_reply_after_wait_window_is_dropped() {
    let config = GameConfig {
        commentary_wait_frames: 30,
        ..Default::default()
    };
    let mut session = Session::new(config, 77);
    session.press();
    let first = crash(&mut session);

    for _ in 0..30 {
        session.frame();
    }
    assert!(!session.snapshot().restart_blocked);
    assert!(matches!(session.press(), Press::Started { generation: 2 }));

    assert!(!session.resolve_commentary(first.generation, "too late".to_string()));
    assert_eq!(session.snapshot().commentary, CommentaryState::None);
}
