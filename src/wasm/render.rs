use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement, WebGl2RenderingContext as GL};

use crate::config::{GridConfig, Palette};
use crate::error::{GridError, Result};
use crate::frame::{update_grid, view_projection, FrameClock};
use crate::grid::{build_grid, Grid};
use crate::pointer::PointerState;
use crate::surface::{display_size, Surface, SurfaceSize};

use super::pipeline::Pipeline;

/// Owns everything one running square field needs: the context, the
/// compiled pipeline, the grid and the clock.
pub struct Renderer {
    canvas: HtmlCanvasElement,
    gl: GL,
    pipeline: Pipeline,
    config: GridConfig,
    palette: Palette,
    surface: Surface,
    grid: Grid,
    pointer: PointerState,
    clock: FrameClock,
}

/// Acquires the WebGL2 context of `canvas`.
pub fn context(canvas: &HtmlCanvasElement) -> Result<GL> {
    canvas
        .get_context("webgl2")?
        .ok_or(GridError::ContextUnsupported("webgl2"))?
        .dyn_into::<GL>()
        .map_err(|_| GridError::ContextUnsupported("webgl2"))
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement, config: GridConfig, pointer: PointerState) -> Result<Self> {
        config.validate()?;
        let gl = context(&canvas)?;
        let pipeline = Pipeline::with_default_shaders(gl.clone())?;

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        let surface = Surface::new(SurfaceSize::new(canvas.width(), canvas.height()));
        let palette = config.palette();
        Ok(Self {
            canvas,
            gl,
            pipeline,
            config,
            palette,
            surface,
            grid: Grid::default(),
            pointer,
            clock: FrameClock::default(),
        })
    }

    /// Readies a fresh loop: matches the canvas to its displayed size, builds
    /// a new grid and binds the pipeline.
    pub fn prepare(&mut self) {
        self.sync_surface();
        self.rebuild_grid();
        self.clock = FrameClock::default();

        let size = self.surface.size();
        self.gl.viewport(0, 0, size.width as i32, size.height as i32);
        self.pipeline.bind();
        self.pipeline.apply_config(&self.config, &self.palette);
    }

    /// Reacts to a viewport change.
    ///
    /// Returns `true` when the backing store was resized and the grid rebuilt;
    /// calling again with the same displayed size does nothing.
    pub fn resize(&mut self) -> bool {
        if !self.sync_surface() {
            return false;
        }
        let size = self.surface.size();
        self.gl.viewport(0, 0, size.width as i32, size.height as i32);
        self.rebuild_grid();
        true
    }

    /// Draws one frame at `now` (seconds).
    pub fn render(&mut self, now: f64) -> Result<()> {
        if self.gl.is_context_lost() {
            return Err(GridError::ContextLost);
        }

        let delta = self.clock.tick(now);
        log::trace!("frame at {now:.3}s (dt {delta:.4}s)");

        let [r, g, b] = self.palette.back;
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT);

        let size = self.surface.size();
        let (view, projection) = view_projection(size.width, size.height);
        self.pipeline.bind();
        self.pipeline.set_transforms(&view, &projection);

        let pointer = self.pointer.get();
        self.pipeline.set_pointer(pointer);

        update_grid(&mut self.grid, &self.config, pointer, now);
        for cell in &self.grid.cells {
            self.pipeline.draw_cell(cell);
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface.size()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn sync_surface(&mut self) -> bool {
        let pixel_ratio = window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let display = display_size(
            f64::from(self.canvas.client_width()),
            f64::from(self.canvas.client_height()),
            pixel_ratio,
            self.config.high_dpi,
        );
        // a detached or hidden canvas keeps its current backing store
        if display.is_empty() {
            return false;
        }
        match self.surface.resize_to(display) {
            Some(size) => {
                self.canvas.set_width(size.width);
                self.canvas.set_height(size.height);
                true
            }
            None => false,
        }
    }

    fn rebuild_grid(&mut self) {
        let size = self.surface.size();
        self.grid = build_grid(size.width, size.height, self.config.max_size);
        log::debug!(
            "grid rebuilt: {}x{} cells over {}x{}",
            self.grid.columns,
            self.grid.rows,
            size.width,
            size.height
        );
    }
}
