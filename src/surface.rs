/// Backing-store dimensions of the drawing surface, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Backing size a canvas displayed at `css_width` x `css_height` should have.
///
/// With `high_dpi` the device pixel ratio is honoured so squares stay crisp on
/// dense displays.
pub fn display_size(css_width: f64, css_height: f64, pixel_ratio: f64, high_dpi: bool) -> SurfaceSize {
    let ratio = if high_dpi && pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    };
    let scale = |css: f64| (css.max(0.0) * ratio).round() as u32;
    SurfaceSize::new(scale(css_width), scale(css_height))
}

/// Tracks the size the drawing surface was last configured for.
#[derive(Clone, Copy, Debug, Default)]
pub struct Surface {
    size: SurfaceSize,
}

impl Surface {
    pub fn new(size: SurfaceSize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Adopts `display` if it differs from the current backing size.
    ///
    /// Returns the new size when the caller has to resize the backing store
    /// and rebuild the grid, `None` when nothing changed.
    pub fn resize_to(&mut self, display: SurfaceSize) -> Option<SurfaceSize> {
        if display == self.size {
            return None;
        }
        log::debug!(
            "surface resized {}x{} -> {}x{}",
            self.size.width,
            self.size.height,
            display.width,
            display.height
        );
        self.size = display;
        Some(display)
    }
}
