//! Math Fun Hub entry point
//!
//! Wires the hub to the page on the web; natively runs a short headless
//! autoplay session of each game and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent, TouchEvent};

    use math_fun_hub::audio::WebTone;
    use math_fun_hub::consts::FRAME_MS;
    use math_fun_hub::platform::{PointerEvent, PointerKind};
    use math_fun_hub::renderer::CanvasPainter;
    use math_fun_hub::sim::{Field, Services};
    use math_fun_hub::{GameHub, GameKind, ProgressBook, Screen, Settings};

    const SCREENS: [(Screen, &str); 4] = [
        (Screen::Hub, "hub-screen"),
        (Screen::Bubble, "bubble-screen"),
        (Screen::Memory, "memory-screen"),
        (Screen::Catcher, "catcher-screen"),
    ];

    /// Page state driven by the animation frame loop
    struct App {
        hub: GameHub,
        document: Document,
        bubble: CanvasPainter,
        memory: CanvasPainter,
        catcher: CanvasPainter,
        tone: Rc<WebTone>,
        last_time: f64,
    }

    impl App {
        fn painter(&self, screen: Screen) -> Option<&CanvasPainter> {
            match screen {
                Screen::Hub => None,
                Screen::Bubble => Some(&self.bubble),
                Screen::Memory => Some(&self.memory),
                Screen::Catcher => Some(&self.catcher),
            }
        }

        fn field(&self, kind: GameKind) -> Field {
            let (w, h) = self
                .painter(kind.screen())
                .map(CanvasPainter::fit_to_client)
                .unwrap_or((1.0, 1.0));
            Field::new(w, h)
        }

        fn show_screen(&self, screen: Screen) {
            for (s, id) in SCREENS {
                if let Some(el) = self.document.get_element_by_id(id) {
                    let _ = if s == screen {
                        el.class_list().add_1("active")
                    } else {
                        el.class_list().remove_1("active")
                    };
                }
            }
        }

        fn open(&mut self, kind: GameKind) {
            self.tone.resume();
            // Canvas sizes are only known once its screen is visible
            self.show_screen(kind.screen());
            let field = self.field(kind);
            self.hub.open(kind, field);
        }

        fn back_to_hub(&mut self) {
            self.hub.back_to_hub();
            self.show_screen(Screen::Hub);
            self.update_hub_stats();
        }

        fn update_hub_stats(&self) {
            for (kind, progress) in self.hub.hub_stats() {
                let id = format!("hub-score-{}", kind.id().key());
                set_text(&self.document, &id, &progress.high_score.to_string());
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                FRAME_MS
            };
            self.last_time = time;

            let screen = self.hub.screen();
            let painter = match screen {
                Screen::Hub => return,
                Screen::Bubble => &self.bubble,
                Screen::Memory => &self.memory,
                Screen::Catcher => &self.catcher,
            };
            let (w, h) = painter.fit_to_client();
            self.hub.resize(Field::new(w, h));
            self.hub.advance(dt);
            if let Some(scene) = self.hub.draw() {
                painter.paint(scene);
            }
            self.update_hud(screen);
        }

        fn update_hud(&self, screen: Screen) {
            let prefix = match screen {
                Screen::Hub => return,
                Screen::Bubble => "bubble",
                Screen::Memory => "memory",
                Screen::Catcher => "catcher",
            };
            let Some(hud) = self.hub.hud() else { return };
            let doc = &self.document;
            set_text(doc, &format!("{prefix}-score"), &hud.score.to_string());
            set_text(doc, &format!("{prefix}-level"), &hud.level.to_string());
            if let Some(question) = &hud.question {
                set_text(doc, "catcher-question", question);
            }
            if let Some(lives) = hud.lives {
                set_text(doc, "catcher-lives", &"❤️".repeat(lives as usize));
            }
            if let Some((progress, goal)) = hud.goal {
                set_text(doc, "catcher-goal", &format!("{progress}/{goal}"));
            }

            let modal = doc.get_element_by_id(&format!("{prefix}-modal"));
            match (self.hub.banner(), modal) {
                (Some(banner), Some(modal)) => {
                    set_text(doc, &format!("{prefix}-modal-title"), &banner.title);
                    set_text(doc, &format!("{prefix}-modal-message"), &banner.message);
                    set_text(doc, &format!("{prefix}-modal-btn"), &banner.button);
                    let _ = modal.class_list().remove_1("hidden");
                }
                (None, Some(modal)) => {
                    let _ = modal.class_list().add_1("hidden");
                }
                _ => {}
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{id} is not a canvas")))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Math Fun Hub starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let settings = Settings::load();
        let tone = Rc::new(WebTone::new(&settings));
        let progress = Rc::new(RefCell::new(ProgressBook::load()));
        let services = Services::new(progress, tone.clone(), settings.max_particles());

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App {
            hub: GameHub::new(services, seed),
            bubble: CanvasPainter::new(canvas(&document, "game-canvas")?)?,
            memory: CanvasPainter::new(canvas(&document, "memory-canvas")?)?,
            catcher: CanvasPainter::new(canvas(&document, "catcher-canvas")?)?,
            document: document.clone(),
            tone,
            last_time: 0.0,
        }));
        log::info!("Hub initialized with seed: {}", seed);

        app.borrow().update_hub_stats();
        setup_navigation(&document, app.clone())?;
        setup_modal_buttons(&document, app.clone());
        {
            let a = app.borrow();
            for painter in [&a.bubble, &a.memory, &a.catcher] {
                setup_pointer_handlers(painter.canvas(), app.clone());
            }
        }

        request_animation_frame(app);
        log::info!("Math Fun Hub running!");
        Ok(())
    }

    fn on_click(el: &Element, handler: impl FnMut(MouseEvent) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_navigation(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let cards = document.query_selector_all(".game-card")?;
        for i in 0..cards.length() {
            let Some(card) = cards.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let kind = match card.get_attribute("data-game").as_deref() {
                Some("bubble") => GameKind::Bubble,
                Some("memory") => GameKind::Memory,
                Some("catcher") => GameKind::Catcher,
                other => {
                    log::warn!("Unknown game card {:?}", other);
                    continue;
                }
            };
            let app = app.clone();
            on_click(&card, move |_| app.borrow_mut().open(kind));
        }

        let backs = document.query_selector_all(".back-btn")?;
        for i in 0..backs.length() {
            let Some(btn) = backs.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let app = app.clone();
            on_click(&btn, move |_| app.borrow_mut().back_to_hub());
        }
        Ok(())
    }

    fn setup_modal_buttons(document: &Document, app: Rc<RefCell<App>>) {
        for id in ["bubble-modal-btn", "memory-next-btn", "catcher-modal-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                on_click(&btn, move |_| app.borrow_mut().hub.acknowledge());
            }
        }
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        for (name, kind) in [("mousemove", PointerKind::Move), ("mousedown", PointerKind::Down)] {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let ev = PointerEvent::from_client(
                    kind,
                    event.client_x() as f32,
                    event.client_y() as f32,
                    rect.left() as f32,
                    rect.top() as f32,
                );
                app.borrow_mut().hub.pointer(ev);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for (name, kind) in [("touchstart", PointerKind::Down), ("touchmove", PointerKind::Drag)] {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let rect = canvas_clone.get_bounding_client_rect();
                let ev = PointerEvent::from_client(
                    kind,
                    touch.client_x() as f32,
                    touch.client_y() as f32,
                    rect.left() as f32,
                    rect.top() as f32,
                );
                let mut a = app.borrow_mut();
                a.tone.resume();
                a.hub.pointer(ev);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app.borrow_mut().frame(time);
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Math Fun Hub (native) starting...");
    log::info!("Native mode runs a headless autoplay demo - serve the wasm build for the real thing");

    autoplay::run();
}

/// Scripted sessions driven through the same hub API the page uses
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use math_fun_hub::audio::CueLog;
    use math_fun_hub::consts::FRAME_MS;
    use math_fun_hub::platform::{PointerEvent, PointerKind};
    use math_fun_hub::sim::{CardFace, FallingKind, Field, MemoryPhase, Phase, Services};
    use math_fun_hub::{GameHub, GameKind, ProgressBook, Settings};

    const FIELD: Field = Field::new(480.0, 720.0);
    /// One minute of play per game
    const FRAMES: usize = 60 * 60;

    pub fn run() {
        let settings = Settings::load();
        let book = Rc::new(RefCell::new(ProgressBook::load()));
        let cues = Rc::new(CueLog::new());
        let services = Services::new(book.clone(), cues.clone(), settings.max_particles());
        let mut hub = GameHub::new(services, 0x5EED);

        for kind in GameKind::ALL {
            hub.open(kind, FIELD);
            for _ in 0..FRAMES {
                match kind {
                    GameKind::Bubble => play_bubble(&mut hub),
                    GameKind::Memory => play_memory(&mut hub),
                    GameKind::Catcher => play_catcher(&mut hub),
                }
                if hub.banner().is_some() {
                    hub.acknowledge();
                }
                hub.advance(FRAME_MS);
            }
            if let Some(hud) = hub.hud() {
                log::info!("{:?}: level {}, score {}", kind, hud.level, hud.score);
            }
            hub.back_to_hub();
        }

        for (kind, progress) in hub.hub_stats() {
            log::info!(
                "{:?} best: level {}, high score {}",
                kind,
                progress.max_level,
                progress.high_score
            );
        }
        log::info!("{} sound cues played", cues.cues().len());
        book.borrow().save();
    }

    /// Aim at a bubble carrying the loaded value, or straight up
    fn play_bubble(hub: &mut GameHub) {
        let Some(game) = hub.bubble() else { return };
        if game.phase() != Phase::Playing || game.projectile().is_some() {
            return;
        }
        let Some(next) = game.next_bubble() else { return };
        let target = game
            .grid()
            .occupied()
            .filter(|&(_, v)| v == next.value)
            .map(|(cell, _)| game.geometry().cell_center(cell))
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap_or(Vec2::new(FIELD.width / 2.0, 0.0));
        hub.pointer(PointerEvent::new(PointerKind::Down, target));
    }

    /// Turn over the first hidden pair (perfect memory)
    fn play_memory(hub: &mut GameHub) {
        let Some(game) = hub.memory() else { return };
        if game.phase() != MemoryPhase::Playing {
            return;
        }
        let cards = game.cards();
        let Some(first) = cards.iter().position(|c| c.face == CardFace::Down) else {
            return;
        };
        let Some(second) = cards
            .iter()
            .enumerate()
            .position(|(i, c)| i != first && c.pair_id == cards[first].pair_id)
        else {
            return;
        };
        let picks: Vec<Vec2> = [first, second]
            .iter()
            .filter_map(|&i| game.card_rect(i).map(|r| r.center()))
            .collect();
        for pos in picks {
            hub.pointer(PointerEvent::new(PointerKind::Down, pos));
        }
    }

    /// Chase the lowest right answer
    fn play_catcher(hub: &mut GameHub) {
        let Some(game) = hub.catcher() else { return };
        let target = game.question().answer();
        let x = game
            .items()
            .iter()
            .filter(|item| item.kind == FallingKind::Value(target))
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|item| item.pos.x);
        if let Some(x) = x {
            hub.pointer(PointerEvent::new(PointerKind::Move, Vec2::new(x, FIELD.height)));
        }
    }
}
