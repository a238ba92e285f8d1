//! Cinematic intro entry point
//!
//! Web: plays the intro on the page canvas and hands off to the app shell.
//! Native: runs the sequence headless at 60 Hz and logs what it would draw.
//! Usage: `cinematic-intro [--quality <low|medium|high>] [config.json]`

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// After completion, keep drawing this long while the shell fades the intro out
const HANDOFF_FADE_MS: f64 = 600.0;

#[cfg(target_arch = "wasm32")]
mod wasm_intro {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent};

    use cinematic_intro::renderer::IntroRenderer;
    use cinematic_intro::{IntroConfig, IntroSequencer};

    use super::HANDOFF_FADE_MS;

    /// Page-side state around the sequencer
    struct Shell {
        sequencer: IntroSequencer,
        renderer: Option<IntroRenderer>,
        raf_id: Option<i32>,
        completed_at: Option<f64>,
        stopped: bool,
    }

    impl Shell {
        fn new(config: &IntroConfig) -> Self {
            Self {
                sequencer: IntroSequencer::new(config),
                renderer: None,
                raf_id: None,
                completed_at: None,
                stopped: false,
            }
        }

        /// Advance and draw one frame. Returns false once the loop should stop.
        fn tick(&mut self, time: f64) -> bool {
            if self.stopped {
                return false;
            }
            let frame = self.sequencer.frame(time);

            if let Some(ref mut renderer) = self.renderer {
                match renderer.render_frame(&frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        renderer.resize(renderer.size.0, renderer.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                    }
                    Err(e) => {
                        log::warn!("Render error: {:?}", e);
                    }
                }
            }

            if frame.completed {
                let completed_at = *self.completed_at.get_or_insert(time);
                if time - completed_at >= HANDOFF_FADE_MS {
                    self.stop();
                    return false;
                }
            }
            true
        }

        fn stop(&mut self) {
            if self.stopped {
                return;
            }
            self.stopped = true;
            if let Some(id) = self.raf_id.take()
                && let Some(window) = web_sys::window()
            {
                let _ = window.cancel_animation_frame(id);
            }
            self.sequencer.teardown();
        }
    }

    fn mark_complete(document: &Document) {
        if let Some(body) = document.body() {
            let _ = body.class_list().add_1("intro-complete");
        }
        log::info!("Handed off to app shell");
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let mut config = IntroConfig::load();
        if let Ok(Some(query)) = window.match_media("(prefers-reduced-motion: reduce)")
            && query.matches()
        {
            config.reduced_motion = true;
        }
        let shell = Rc::new(RefCell::new(Shell::new(&config)));

        {
            let document = document.clone();
            shell
                .borrow_mut()
                .sequencer
                .on_complete(move || mark_complete(&document));
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("intro-canvas")
            .ok_or("no intro canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // The sequence still runs and hands off without a GPU
        match init_renderer(&canvas, width, height).await {
            Ok(renderer) => shell.borrow_mut().renderer = Some(renderer),
            Err(e) => log::warn!("WebGPU unavailable, running without visuals: {}", e),
        }

        setup_skip(&canvas, shell.clone());
        setup_visibility(&document, shell.clone());
        setup_pagehide(shell.clone());

        let now = window.performance().map_or(0.0, |p| p.now());
        shell.borrow_mut().sequencer.start(now);
        request_animation_frame(shell);

        log::info!("Intro running");
        Ok(())
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<IntroRenderer, String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| e.to_string())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| e.to_string())?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        IntroRenderer::new(surface, &adapter, width, height)
            .await
            .map_err(|e| e.to_string())
    }

    fn setup_skip(canvas: &HtmlCanvasElement, shell: Rc<RefCell<Shell>>) {
        {
            let shell = shell.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                shell.borrow_mut().sequencer.skip();
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                shell.borrow_mut().sequencer.skip();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_visibility(document: &Document, shell: Rc<RefCell<Shell>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut s = shell.borrow_mut();
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                s.sequencer.suspend();
            } else {
                let now = web_sys::window()
                    .and_then(|w| w.performance())
                    .map_or(0.0, |p| p.now());
                s.sequencer.resume(now);
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_pagehide(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            shell.borrow_mut().stop();
        });
        let _ = window
            .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(shell: Rc<RefCell<Shell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let loop_shell = shell.clone();
        let closure = Closure::once(move |time: f64| {
            frame_loop(loop_shell, time);
        });
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            shell.borrow_mut().raf_id = Some(id);
        }
        closure.forget();
    }

    fn frame_loop(shell: Rc<RefCell<Shell>>, time: f64) {
        let keep_going = {
            let mut s = shell.borrow_mut();
            s.raf_id = None;
            s.tick(time)
        };
        if keep_going {
            request_animation_frame(shell);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_intro::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cinematic_intro::consts::FRAME_DT_MS;
    use cinematic_intro::renderer::build_vertices;
    use cinematic_intro::{IntroConfig, IntroSequencer};
    use std::cell::Cell;
    use std::rc::Rc;

    env_logger::init();

    let config = match IntroConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut sequencer = IntroSequencer::new(&config);
    let completed = Rc::new(Cell::new(false));
    {
        let completed = completed.clone();
        sequencer.on_complete(move || completed.set(true));
    }

    log::info!("Cinematic intro (native, headless) starting...");
    sequencer.start(0.0);

    let mut now = 0.0;
    let mut phase = sequencer.phase();
    let mut peak_vertices = 0;
    let mut completed_at = None;
    loop {
        now += FRAME_DT_MS;
        let frame = sequencer.frame(now);
        let vertices = build_vertices(&frame).len();
        peak_vertices = peak_vertices.max(vertices);

        if frame.phase != phase {
            log::info!(
                "{:>6.0}ms  {} ({:.0}%)  {} vertices",
                now,
                frame.phase,
                frame.progress * 100.0,
                vertices
            );
            phase = frame.phase;
        }
        if completed.get() {
            let at = *completed_at.get_or_insert(now);
            if now - at >= HANDOFF_FADE_MS {
                break;
            }
        }
    }

    sequencer.teardown();
    log::info!(
        "Done at {:.0}ms, peak {} vertices, seed {}, pending work {}",
        now,
        peak_vertices,
        sequencer.seed(),
        sequencer.pending_work()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}
