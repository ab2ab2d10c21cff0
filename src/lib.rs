//! A field of squares that shrink toward the mouse pointer, drawn with WebGL2.
//!
//! The animation law, grid layout, color parsing and configuration are plain
//! Rust and build on any target. The browser glue (context, shaders,
//! animation-frame loop and DOM listeners) only compiles for wasm32.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod pointer;
pub mod surface;

pub use config::GridConfig;
pub use error::{GridError, Result};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use crate::config::GridConfig;
    use crate::error::{GridError, Result};
    use crate::pointer::PointerState;

    pub mod input;
    pub mod pipeline;
    pub mod render;
    pub mod scheduler;

    use input::Listener;
    use render::Renderer;
    use scheduler::FrameLoop;

    impl From<JsValue> for GridError {
        fn from(value: JsValue) -> Self {
            GridError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
        }
    }

    impl From<GridError> for JsValue {
        fn from(err: GridError) -> Self {
            js_sys::Error::new(&err.to_string()).into()
        }
    }

    /// Auto-starts on `<canvas id="c">` when the page has one, reading its
    /// configuration from the `data-config` attribute.
    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        console_log::init_with_level(level).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let Some(element) = document.get_element_by_id("c") else {
            log::info!("no #c canvas on the page; waiting for ProximityGrid");
            return Ok(());
        };
        let canvas = element.dyn_into::<HtmlCanvasElement>()?;

        let config = canvas.get_attribute("data-config");
        let mut grid = ProximityGrid::new(canvas, config)?;
        if let Err(err) = grid.launch() {
            log::error!("proximity grid failed to start: {err}");
            return Err(err.into());
        }
        // runs for the lifetime of the page
        std::mem::forget(grid);
        Ok(())
    }

    /// JS handle for one animated canvas.
    #[wasm_bindgen]
    pub struct ProximityGrid {
        canvas: HtmlCanvasElement,
        config: GridConfig,
        pointer: PointerState,
        renderer: Option<Rc<RefCell<Renderer>>>,
        frame_loop: FrameLoop,
        listeners: Vec<Listener>,
    }

    #[wasm_bindgen]
    impl ProximityGrid {
        /// `config` is an optional camelCase JSON object.
        #[wasm_bindgen(constructor)]
        pub fn new(
            canvas: HtmlCanvasElement,
            config: Option<String>,
        ) -> Result<ProximityGrid, JsValue> {
            let config = match config {
                Some(json) => GridConfig::from_json(&json)?,
                None => GridConfig::default(),
            };
            Ok(Self {
                canvas,
                config,
                pointer: PointerState::new(),
                renderer: None,
                frame_loop: FrameLoop::new(),
                listeners: Vec::new(),
            })
        }

        pub fn start(&mut self) -> Result<(), JsValue> {
            self.launch().map_err(|err| {
                log::error!("proximity grid failed to start: {err}");
                err.into()
            })
        }

        pub fn stop(&mut self) {
            self.frame_loop.stop();
            self.listeners.clear();
            self.renderer = None;
        }

        /// Swaps in a new configuration, rebuilding the pipeline and grid.
        ///
        /// A configuration that fails to parse or validate is rejected
        /// before anything stops. If the grid was running and cannot be
        /// restarted with the new configuration, the previous one is
        /// restored and restarted, and the restart error is returned.
        pub fn configure(&mut self, config: &str) -> Result<(), JsValue> {
            let config = GridConfig::from_json(config)?;
            let was_running = self.is_running();
            let previous = std::mem::replace(&mut self.config, config);
            if !was_running {
                return Ok(());
            }
            if let Err(err) = self.launch() {
                log::error!("restart with new configuration failed: {err}");
                self.config = previous;
                if let Err(restore) = self.launch() {
                    log::error!("previous configuration failed to restart: {restore}");
                }
                return Err(err.into());
            }
            Ok(())
        }

        #[wasm_bindgen(js_name = isRunning)]
        pub fn is_running(&self) -> bool {
            self.frame_loop.is_running()
        }
    }

    impl ProximityGrid {
        /// Builds a fresh renderer and enters the frame loop. Anything acquired
        /// before a failure is released again.
        pub fn launch(&mut self) -> Result<()> {
            self.stop();
            let launched = self.try_launch();
            if launched.is_err() {
                self.stop();
            }
            launched
        }

        /// The configuration the next `start` will use.
        pub fn config(&self) -> &GridConfig {
            &self.config
        }

        /// The active renderer, if the grid is running.
        pub fn renderer(&self) -> Option<Rc<RefCell<Renderer>>> {
            self.renderer.clone()
        }

        fn try_launch(&mut self) -> Result<()> {
            let window = web_sys::window().ok_or_else(|| GridError::Dom("no window".into()))?;
            let renderer = Rc::new(RefCell::new(Renderer::new(
                self.canvas.clone(),
                self.config.clone(),
                self.pointer.clone(),
            )?));

            self.listeners.push(input::track_pointer(
                &window,
                self.canvas.clone(),
                self.pointer.clone(),
            )?);
            self.listeners
                .push(input::track_resize(&window, Rc::downgrade(&renderer))?);

            self.frame_loop.start(Rc::clone(&renderer))?;
            self.renderer = Some(renderer);
            Ok(())
        }
    }
}
