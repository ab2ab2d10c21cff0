use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

/// Last known pointer position in canvas pixels.
///
/// Cloning hands out another view of the same slot: the input listener writes
/// through one clone, the renderer reads through another. Both live on the
/// browser's main thread, so a `Cell` is all the sharing needed.
#[derive(Clone, Debug, Default)]
pub struct PointerState {
    position: Rc<Cell<Option<Vec2>>>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, position: Vec2) {
        self.position.set(Some(position));
    }

    /// `None` until the first pointer event arrives.
    pub fn get(&self) -> Option<Vec2> {
        self.position.get()
    }

    pub fn clear(&self) {
        self.position.set(None);
    }
}

/// Maps a client (viewport CSS pixel) position into canvas backing-store
/// pixels.
///
/// `rect_origin` / `rect_size` are the canvas' bounding client rect and
/// `backing` its `width` / `height` attributes. A collapsed rect leaves the
/// offset position unscaled.
pub fn client_to_canvas(
    client: Vec2,
    rect_origin: Vec2,
    rect_size: Vec2,
    backing: (u32, u32),
) -> Vec2 {
    let backing = Vec2::new(backing.0 as f32, backing.1 as f32);
    let scale = Vec2::select(
        rect_size.cmpgt(Vec2::ZERO),
        backing / rect_size,
        Vec2::ONE,
    );
    (client - rect_origin) * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_position_between_clones() {
        let writer = PointerState::new();
        let reader = writer.clone();
        assert_eq!(reader.get(), None);

        writer.set(Vec2::new(3.0, 4.0));
        assert_eq!(reader.get(), Some(Vec2::new(3.0, 4.0)));

        writer.clear();
        assert_eq!(reader.get(), None);
    }

    #[test]
    fn offsets_by_canvas_origin() {
        let pos = client_to_canvas(
            Vec2::new(110.0, 70.0),
            Vec2::new(10.0, 20.0),
            Vec2::new(800.0, 600.0),
            (800, 600),
        );
        assert_eq!(pos, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn scales_to_backing_resolution() {
        // 2x device pixel ratio
        let pos = client_to_canvas(
            Vec2::new(100.0, 50.0),
            Vec2::ZERO,
            Vec2::new(400.0, 300.0),
            (800, 600),
        );
        assert_eq!(pos, Vec2::new(200.0, 100.0));
    }

    #[test]
    fn positions_outside_canvas_extrapolate() {
        let pos = client_to_canvas(
            Vec2::new(-20.0, 700.0),
            Vec2::ZERO,
            Vec2::new(800.0, 600.0),
            (800, 600),
        );
        assert_eq!(pos, Vec2::new(-20.0, 700.0));
    }

    #[test]
    fn collapsed_rect_does_not_divide_by_zero() {
        let pos = client_to_canvas(
            Vec2::new(5.0, 6.0),
            Vec2::new(1.0, 1.0),
            Vec2::ZERO,
            (300, 150),
        );
        assert_eq!(pos, Vec2::new(4.0, 5.0));
    }
}
