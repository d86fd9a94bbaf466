//! Slope Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{DeviceOrientationEvent, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use slope_rush::platform::{Controls, Presence};
    use slope_rush::session::{FrameOutcome, LoopToken};
    use slope_rush::{GameListener, Session, Settings, Tuning};

    /// Pushes gameplay events into the HUD elements of the page
    struct DomListener {
        document: web_sys::Document,
    }

    impl DomListener {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", !visible);
            }
        }
    }

    impl GameListener for DomListener {
        fn on_life_lost(&mut self, remaining_lives: u32) {
            self.set_text("lives-display", &remaining_lives.to_string());
        }

        fn on_extra_life(&mut self, lives: u32) {
            self.set_text("lives-display", &lives.to_string());
        }

        fn on_game_over(&mut self, final_score: u64) {
            self.set_text("final-score", &final_score.to_string());
            self.set_visible("game-over", true);
        }

        fn on_score_changed(&mut self, score: u64) {
            self.set_text("score-display", &score.to_string());
        }

        fn on_demo_mode(&mut self, demo: bool) {
            self.set_visible("hud", !demo);
            self.set_visible("start-prompt", demo);
            if !demo {
                self.set_text("lives-display", "3");
                self.set_visible("game-over", false);
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<DomListener>,
        controls: Controls,
        presence: Presence,
        token: Option<LoopToken>,
        raf_id: Option<i32>,
        canvas: HtmlCanvasElement,
    }

    impl Game {
        /// Size the canvas backing store to the current quality level
        fn fit_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let ratio = self
                .session
                .monitor()
                .level()
                .pixel_ratio(window.device_pixel_ratio());
            let width = (self.canvas.client_width() as f64 * ratio) as u32;
            let height = (self.canvas.client_height() as f64 * ratio) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.session.handle_resize(width, height);
        }
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                f(&mut game.borrow_mut());
            }
        });
    }

    pub async fn run() {
        // Initialize logging
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Slope Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::default();
        let tilt = settings.tilt_controls;
        let mut session = Session::new(
            Tuning::default(),
            settings,
            seed,
            DomListener {
                document: document.clone(),
            },
        );
        session.initialize();

        let game = Rc::new(RefCell::new(Game {
            session,
            controls: Controls::new(tilt),
            presence: Presence::new(),
            token: None,
            raf_id: None,
            canvas: canvas.clone(),
        }));
        game.borrow_mut().fit_canvas();
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_window_handlers(game.clone());

        // Attract loop until the player starts
        start_loop(game, true);

        log::info!("Slope Rush running!");
    }

    /// Cancel whatever loop is pending and start a new run
    fn start_loop(game: Rc<RefCell<Game>>, demo: bool) {
        let token = {
            let mut g = game.borrow_mut();
            if let (Some(id), Some(window)) = (g.raf_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
            g.controls.reset();
            let token = g.session.start(demo);
            g.token = Some(token);
            token
        };
        request_animation_frame(game, token);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, token: LoopToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(next, token, time);
        });
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
        game.borrow_mut().raf_id = id;
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: LoopToken, time: f64) {
        let outcome = {
            let mut g = game.borrow_mut();
            g.raf_id = None;
            let input = g.controls.snapshot();
            let level = g.session.monitor().level();
            let outcome = g.session.frame(token, time, input);
            if g.session.monitor().level() != level {
                g.fit_canvas();
            }
            outcome
        };

        match outcome {
            FrameOutcome::Continue => request_animation_frame(game, token),
            FrameOutcome::Stop => log::info!("Game loop stopped"),
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().controls.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().controls.key_up(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch swipe
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .controls
                        .touch_start(touch.client_x() as f64, touch.client_y() as f64);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .controls
                        .touch_move(touch.client_x() as f64, touch.client_y() as f64);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().controls.touch_end();
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Device tilt
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
                game.borrow_mut().controls.tilt(event.gamma());
            });
            let _ = window.add_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    start_loop(game.clone(), false);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("demo-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                start_loop(game.clone(), true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().fit_canvas();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Returning to the tab should not count the hidden time as play
        if let Some(document) = window.document() {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if !doc.hidden() {
                    game.borrow_mut().session.resume();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    /// Renderer hook: instance records for the current frame
    #[wasm_bindgen]
    pub fn frame_instances() -> js_sys::Uint8Array {
        let mut bytes = js_sys::Uint8Array::new_with_length(0);
        with_game(|g| bytes = js_sys::Uint8Array::from(g.session.render_frame().instance_bytes()));
        bytes
    }

    /// Renderer hook: camera and frame globals
    #[wasm_bindgen]
    pub fn frame_globals() -> js_sys::Uint8Array {
        let mut bytes = js_sys::Uint8Array::new_with_length(0);
        with_game(|g| bytes = js_sys::Uint8Array::from(g.session.render_frame().globals_bytes()));
        bytes
    }

    /// Renderer hook: terrain tile headers followed by the height samples
    #[wasm_bindgen]
    pub fn frame_terrain() -> js_sys::Uint8Array {
        let mut bytes = js_sys::Uint8Array::new_with_length(0);
        with_game(|g| {
            let frame = g.session.render_frame();
            let mut out = Vec::with_capacity(frame.tile_bytes().len() + frame.height_bytes().len());
            out.extend_from_slice(frame.tile_bytes());
            out.extend_from_slice(frame.height_bytes());
            bytes = js_sys::Uint8Array::from(out.as_slice());
        });
        bytes
    }

    fn show_presence(presence: &Presence) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(el) = document.get_element_by_id("status") else {
            return;
        };
        el.set_text_content(Some(presence.status().label()));
        if let Ok(el) = el.dyn_into::<web_sys::HtmlElement>() {
            let _ = el
                .style()
                .set_property("background-color", presence.status().color());
        }
    }

    /// Presence transport hooks, called by the host page
    #[wasm_bindgen]
    pub fn presence_connected() {
        with_game(|g| {
            g.presence.on_connect();
            show_presence(&g.presence);
        });
    }

    #[wasm_bindgen]
    pub fn presence_disconnected() {
        with_game(|g| {
            g.presence.on_disconnect();
            show_presence(&g.presence);
        });
    }

    #[wasm_bindgen]
    pub fn presence_error(reason: &str) {
        with_game(|g| {
            g.presence.on_error(reason);
            show_presence(&g.presence);
        });
    }

    #[wasm_bindgen]
    pub fn presence_message(message: &str) {
        with_game(|g| g.presence.on_message(message));
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Slope Rush (native) starting...");
    log::info!("Native mode runs a headless session - run with `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Failed to load tuning from {path}: {err}");
                std::process::exit(1);
            }
        },
        None => slope_rush::Tuning::default(),
    };

    let final_score = headless::run(tuning, 0x5107_E5ED);
    println!("\nHeadless run finished with score {final_score}");
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<slope_rush::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(slope_rush::Tuning::from_json(&json)?)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use slope_rush::session::FrameOutcome;
    use slope_rush::sim::DemoPilot;
    use slope_rush::{GameListener, Session, Settings, Tuning};

    /// Five simulated minutes at 60 fps
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    #[derive(Default)]
    struct ConsoleListener {
        score: u64,
    }

    impl GameListener for ConsoleListener {
        fn on_life_lost(&mut self, remaining_lives: u32) {
            println!("Crash! {remaining_lives} lives left");
        }

        fn on_extra_life(&mut self, lives: u32) {
            println!("Hot chocolate! {lives} lives");
        }

        fn on_game_over(&mut self, final_score: u64) {
            println!("Game over at {final_score}");
        }

        fn on_score_changed(&mut self, score: u64) {
            self.score = score;
        }
    }

    /// Play a full session with the demo pilot at the controls while the
    /// listener reports like a real player's HUD would
    pub fn run(tuning: Tuning, seed: u64) -> u64 {
        let mut session = Session::new(tuning, Settings::default(), seed, ConsoleListener::default());
        let mut pilot = DemoPilot::new(seed);
        let token = session.start(false);

        for frame in 0..MAX_FRAMES {
            let input = pilot.next_input(session.state());
            let timestamp = frame as f64 * 1000.0 / 60.0;
            if session.frame(token, timestamp, input) == FrameOutcome::Stop {
                break;
            }
        }

        log::info!(
            "Ran {} steps, speed {:.3}",
            session.state().time_ticks,
            session.state().speed()
        );
        session.listener().score
    }
}
