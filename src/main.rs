//! Gemini Flappy entry point
//!
//! Browser: DOM presentation, input and the requestAnimationFrame loop.
//! Native: headless autopilot runs, for tuning configs from the terminal.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use gemini_flappy::commentary::fetch::FetchTransport;
    use gemini_flappy::commentary::{CommentaryClient, CommentarySettings, api_key_from_env};
    use gemini_flappy::{CommentaryState, CommentaryTicket, GameConfig, GamePhase, Session, Snapshot};

    /// Look up a required element by id
    fn element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{}", id)))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("#{} is not an HTML element", id)))
    }

    fn set_px(el: &HtmlElement, property: &str, value: f32) {
        let _ = el.style().set_property(property, &format!("{}px", value));
    }

    /// Show an element by toggling the `hidden` class
    fn set_visible(el: &Element, visible: bool) {
        let _ = el.class_list().toggle_with_force("hidden", !visible);
    }

    /// DOM nodes the game writes to each frame
    struct View {
        document: Document,
        playfield: HtmlElement,
        ground: HtmlElement,
        bird: HtmlElement,
        pipes: HtmlElement,
        /// Reused (top, bottom) pipe divs, one pair per obstacle
        pipe_pool: Vec<(HtmlElement, HtmlElement)>,
        hud_score: HtmlElement,
        start_screen: HtmlElement,
        game_over: HtmlElement,
        final_score: HtmlElement,
        best_score: HtmlElement,
        commentary_loading: HtmlElement,
        commentary_text: HtmlElement,
        autopilot_badge: Option<HtmlElement>,
    }

    impl View {
        fn new(document: Document) -> Result<Self, JsValue> {
            Ok(Self {
                playfield: element(&document, "game")?,
                ground: element(&document, "ground")?,
                bird: element(&document, "bird")?,
                pipes: element(&document, "pipes")?,
                pipe_pool: Vec::new(),
                hud_score: element(&document, "hud-score")?,
                start_screen: element(&document, "start-screen")?,
                game_over: element(&document, "game-over")?,
                final_score: element(&document, "final-score")?,
                best_score: element(&document, "best-score")?,
                commentary_loading: element(&document, "commentary-loading")?,
                commentary_text: element(&document, "commentary-text")?,
                autopilot_badge: element(&document, "autopilot").ok(),
                document,
            })
        }

        /// Size the playfield to the logical geometry
        fn layout(&self, config: &GameConfig) {
            set_px(&self.playfield, "width", config.playfield_width);
            set_px(&self.playfield, "height", config.playfield_height);
            set_px(&self.ground, "height", config.ground_height);
            self.fit(config);
        }

        /// Shrink the playfield to fit small windows
        fn fit(&self, config: &GameConfig) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
            let scale = config.fit_scale(dimension(window.inner_width()), dimension(window.inner_height()));
            let _ = self
                .playfield
                .style()
                .set_property("transform", &format!("scale({})", scale));
        }

        fn new_pipe_div(&self, class: &str) -> Result<HtmlElement, JsValue> {
            let div: HtmlElement = self.document.create_element("div")?.dyn_into()?;
            div.set_class_name(class);
            self.pipes.append_child(&div)?;
            Ok(div)
        }

        fn render(&mut self, snap: &Snapshot) -> Result<(), JsValue> {
            // Bird
            set_px(&self.bird, "left", snap.bird.x);
            set_px(&self.bird, "top", snap.bird.y);
            set_px(&self.bird, "width", snap.bird.size);
            set_px(&self.bird, "height", snap.bird.size);
            let _ = self
                .bird
                .style()
                .set_property("transform", &format!("rotate({}deg)", snap.bird.rotation));

            // Pipes
            while self.pipe_pool.len() < snap.obstacles.len() {
                let top = self.new_pipe_div("pipe pipe-top")?;
                let bottom = self.new_pipe_div("pipe pipe-bottom")?;
                self.pipe_pool.push((top, bottom));
            }
            for (i, (top, bottom)) in self.pipe_pool.iter().enumerate() {
                let Some(obstacle) = snap.obstacles.get(i) else {
                    top.set_hidden(true);
                    bottom.set_hidden(true);
                    continue;
                };
                for div in [top, bottom] {
                    div.set_hidden(false);
                    set_px(div, "left", obstacle.x);
                    set_px(div, "width", obstacle.width);
                }
                set_px(top, "top", 0.0);
                set_px(top, "height", obstacle.top_height);
                set_px(bottom, "top", obstacle.gap_bottom);
                set_px(bottom, "height", obstacle.bottom_height);
            }

            // HUD and screens
            set_visible(&self.hud_score, snap.phase == GamePhase::Playing);
            self.hud_score.set_text_content(Some(&snap.score.to_string()));
            set_visible(&self.start_screen, snap.phase == GamePhase::Start);
            set_visible(&self.game_over, snap.phase == GamePhase::Ended);

            if snap.phase == GamePhase::Ended {
                self.final_score.set_text_content(Some(&snap.score.to_string()));
                self.best_score.set_text_content(Some(&snap.best.to_string()));

                set_visible(&self.commentary_loading, snap.commentary.is_pending());
                set_visible(&self.commentary_text, !snap.commentary.is_pending());
                if let CommentaryState::Ready { text, .. } = &snap.commentary {
                    self.commentary_text.set_text_content(Some(&format!("\"{}\"", text)));
                }
            }

            if let Some(badge) = &self.autopilot_badge {
                set_visible(badge, snap.autopilot);
            }

            Ok(())
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        view: View,
        client: Rc<CommentaryClient<FetchTransport>>,
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Gemini Flappy starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let config = GameConfig::load();
        let seed = js_sys::Date::now() as u64;

        let view = View::new(document).expect("page is missing game elements");
        view.layout(&config);

        let client = CommentaryClient::new(FetchTransport, api_key_from_env(), CommentarySettings::default());
        if !client.has_credentials() {
            log::warn!("No API key configured - commentary will use the fallback");
        }

        let game = Rc::new(RefCell::new(Game {
            session: Session::new(config, seed),
            view,
            client: Rc::new(client),
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_resize_handler(game.clone());

        request_animation_frame(game);
        log::info!("Gemini Flappy running!");
    }

    /// Fire-and-forget commentary request. The reply is dropped by the
    /// session if a newer run has started by the time it arrives.
    fn request_commentary(game: Rc<RefCell<Game>>, ticket: CommentaryTicket) {
        let client = game.borrow().client.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let text = client.commentary(ticket.score).await;
            game.borrow_mut()
                .session
                .resolve_commentary(ticket.generation, text);
        });
    }

    fn press(game: &Rc<RefCell<Game>>) {
        game.borrow_mut().session.press();
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let playfield = game.borrow().view.playfield.clone();

        // Mouse press
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                press(&game);
            });
            let _ = playfield
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                // Avoid the emulated mousedown firing a second press
                event.prevent_default();
                press(&game);
            });
            let _ = playfield
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " => {
                        // Don't scroll the page
                        event.prevent_default();
                        if !event.repeat() {
                            press(&game);
                        }
                    }
                    "i" | "I" => {
                        let mut g = game.borrow_mut();
                        g.session.autopilot = !g.session.autopilot;
                        log::info!("Autopilot: {}", g.session.autopilot);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                // The button sits inside the playfield; one press, not two
                event.stop_propagation();
                press(&game);
            });
            let _ = btn.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let g = game.borrow();
            g.view.fit(g.session.config());
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        let ticket = {
            let mut g = game.borrow_mut();
            let ticket = g.session.frame();
            let snapshot = g.session.snapshot();
            if let Err(e) = g.view.render(&snapshot) {
                log::warn!("Render error: {:?}", e);
            }
            ticket
        };

        if let Some(ticket) = ticket {
            request_commentary(game.clone(), ticket);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Give up on a demo run that never crashes
#[cfg(not(target_arch = "wasm32"))]
const MAX_DEMO_TICKS: u64 = 1_000_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use gemini_flappy::commentary::{CommentaryClient, CommentarySettings, NoTransport, api_key_from_env};
    use gemini_flappy::{GameConfig, Session};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Gemini Flappy (native) starting...");
    log::info!("The playable game runs in the browser - use `trunk serve` for the web version");

    let runs: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(3);

    let config = GameConfig::load();
    let seed: u64 = rand::random();
    log::info!("Autopilot demo: {} runs, seed {}", runs, seed);

    let mut session = Session::new(config, seed);
    session.autopilot = true;
    let client = CommentaryClient::new(NoTransport, api_key_from_env(), CommentarySettings::default());

    for run in 1..=runs {
        session.press();

        let Some(ticket) = (0..MAX_DEMO_TICKS).find_map(|_| session.frame()) else {
            log::warn!("Run {} still alive after {} ticks, stopping", run, MAX_DEMO_TICKS);
            break;
        };

        let text = pollster::block_on(client.commentary(ticket.score));
        session.resolve_commentary(ticket.generation, text.clone());

        println!(
            "Run {}: score {} (best {}) after {} ticks - {}",
            run,
            ticket.score,
            session.best(),
            session.state().time_ticks,
            text
        );
    }
}
