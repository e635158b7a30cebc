//! Fruit Slicer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, PointerEvent, TouchEvent};

    use fruit_slicer::audio::AudioManager;
    use fruit_slicer::input::{PressAction, drag_is_sample, press_action};
    use fruit_slicer::renderer::CanvasSurface;
    use fruit_slicer::{GameEngine, GameListener, Settings};

    /// Pushes HUD updates into the DOM
    struct HudListener {
        document: Document,
    }

    impl HudListener {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_class(&self, id: &str, class: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", class);
            }
        }
    }

    impl GameListener for HudListener {
        fn score_changed(&mut self, score: u64) {
            self.set_text("score", &score.to_string());
        }

        fn lives_changed(&mut self, lives: u8) {
            self.set_text("lives", &"❤".repeat(lives as usize));
        }

        fn game_over(&mut self) {
            self.set_class("game-over", "");
        }
    }

    /// Game instance holding all state
    struct Game {
        engine: GameEngine,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        document: Document,
    }

    impl Game {
        /// Start or restart a session sized to the canvas
        fn start(&mut self) {
            self.fit_canvas();
            let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
            self.engine.init(w, h, now());
            if let Some(el) = self.document.get_element_by_id("game-over") {
                let _ = el.set_attribute("class", "hidden");
            }
            if let Some(el) = self.document.get_element_by_id("start-prompt") {
                let _ = el.set_attribute("class", "hidden");
            }
        }

        /// Match the backing store to the displayed size
        fn fit_canvas(&mut self) {
            let w = self.canvas.client_width().max(1) as u32;
            let h = self.canvas.client_height().max(1) as u32;
            if self.canvas.width() != w || self.canvas.height() != h {
                self.canvas.set_width(w);
                self.canvas.set_height(h);
            }
            self.engine.resize(w as f32, h as f32);
        }

        /// Client coordinates to play-area coordinates
        fn to_local(&self, client_x: i32, client_y: i32) -> (f32, f32) {
            let rect = self.canvas.get_bounding_client_rect();
            (
                (client_x as f64 - rect.left()) as f32,
                (client_y as f64 - rect.top()) as f32,
            )
        }

        fn frame(&mut self, time: f64) {
            self.engine.advance(time);
            self.engine.draw(&mut self.surface);
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Fruit Slicer starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::default();
        let mut surface = CanvasSurface::new(ctx);
        surface.set_glow_enabled(settings.blade_glow);
        let audio = AudioManager::new(settings.effective_volume());

        let seed = js_sys::Date::now() as u64;
        let engine = GameEngine::new(seed)
            .with_settings(settings)
            .with_listener(Box::new(HudListener {
                document: document.clone(),
            }))
            .with_audio(Box::new(audio));

        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            engine,
            surface,
            canvas: canvas.clone(),
            document,
        }));
        game.borrow_mut().fit_canvas();

        setup_input_handlers(&canvas, game.clone());
        setup_resize(game.clone());
        request_animation_frame(game);

        log::info!("Fruit Slicer running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Press: start a session when idle, otherwise a blade sample
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                match press_action(g.engine.phase(), &event.pointer_type()) {
                    PressAction::StartSession => g.start(),
                    PressAction::BladeSample => {
                        let (x, y) = g.to_local(event.client_x(), event.client_y());
                        g.engine.on_gesture_point(x, y);
                    }
                    PressAction::Ignore => {}
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag with the primary button
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if !drag_is_sample(&event.pointer_type(), event.buttons()) {
                    return;
                }
                let mut g = game.borrow_mut();
                let (x, y) = g.to_local(event.client_x(), event.client_y());
                g.engine.on_gesture_point(x, y);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: every active touch is a sample
        for name in ["touchstart", "touchmove"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if !g.engine.state().is_active() {
                    return;
                }
                let touches = event.touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let (x, y) = g.to_local(touch.client_x(), touch.client_y());
                        g.engine.on_gesture_point(x, y);
                    }
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().fit_canvas();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use fruit_slicer::renderer::MeshSurface;
    use fruit_slicer::{GameEngine, GameListener, QualityPreset, Settings, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;

    /// Logs HUD notifications
    struct LogListener;

    impl GameListener for LogListener {
        fn score_changed(&mut self, score: u64) {
            log::debug!("Score: {score}");
        }

        fn lives_changed(&mut self, lives: u8) {
            log::info!("Lives: {lives}");
        }

        fn game_over(&mut self) {
            log::info!("GAME OVER");
        }
    }

    /// Zigzag sweep across the play area
    fn blade_position(t: f64) -> (f32, f32) {
        let x = 0.5 + 0.4 * (t * 2.3).sin();
        let y = 0.45 + 0.3 * (t * 5.1).sin();
        (x as f32 * WIDTH, y as f32 * HEIGHT)
    }

    /// Quality preset name (`low`/`medium`/`high`) or a settings JSON file
    fn load_settings(arg: &str) -> Result<Settings, Box<dyn std::error::Error>> {
        if arg.ends_with(".json") {
            return Ok(Settings::from_json(&std::fs::read_to_string(arg)?)?);
        }
        let preset =
            QualityPreset::parse(arg).ok_or_else(|| format!("unknown quality: {arg}"))?;
        Ok(Settings::from_preset(preset))
    }

    /// Run a scripted session; args: `[seed] [seconds] [quality|settings.json] [tuning.json]`
    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(s) => s.parse()?,
            None => 1,
        };
        let seconds: f64 = match args.next() {
            Some(s) => s.parse()?,
            None => 60.0,
        };
        let settings = match args.next() {
            Some(arg) => load_settings(&arg)?,
            None => Settings::default(),
        };
        let tuning = match args.next() {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        tuning.validate()?;

        let mut surface = MeshSurface::for_quality(settings.quality);
        let mut engine = GameEngine::with_tuning(seed, tuning)
            .with_settings(settings)
            .with_listener(Box::new(LogListener));

        log::info!(
            "Headless session: seed={seed} duration={seconds}s quality={}",
            engine.settings().quality.as_str()
        );
        engine.init(WIDTH, HEIGHT, 0.0);

        let frames = (seconds * 1000.0 / FRAME_MS) as u64;
        let mut peak_vertices = 0;
        for frame in 1..=frames {
            let now = frame as f64 * FRAME_MS;
            engine.advance(now);

            // Two blade samples per frame
            for sub in [0.0, 0.5] {
                let (x, y) = blade_position((now + sub * FRAME_MS) / 1000.0);
                engine.on_gesture_point(x, y);
            }

            engine.draw(&mut surface);
            peak_vertices = peak_vertices.max(surface.vertex_count());

            if !engine.state().is_active() {
                log::info!("Session ended after {:.1}s", now / 1000.0);
                break;
            }
        }

        log::info!("Peak frame size: {peak_vertices} vertices");
        println!("{}", engine.snapshot().to_json()?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fruit Slicer (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
