//! Per-frame animation law.
//!
//! Cells shrink toward `min_size` as the pointer approaches and grow back to
//! `max_size` once it leaves `proximity_range`. Each frame moves a cell a
//! fraction of the way to its target, where the fraction is the time since the
//! cell was last advanced divided by the ease duration for the current
//! direction. Because `last_update` is reset every frame, that fraction is one
//! frame's worth: the effective speed follows the display refresh rate.

use glam::{Mat4, Vec2};

use crate::config::GridConfig;
use crate::grid::{Cell, Grid};

/// Which ease duration a cell is currently using.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    /// Shrinking toward the pointer; uses `ease_in_duration`.
    In,
    /// Growing back out; uses `ease_out_duration`.
    Out,
}

/// Tracks the global frame timestamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last_frame: f64,
    delta: f64,
}

impl FrameClock {
    /// Records `now` (seconds) and returns the time since the previous frame.
    pub fn tick(&mut self, now: f64) -> f64 {
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.delta
    }

    pub fn last_frame(&self) -> f64 {
        self.last_frame
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }
}

/// Desired edge length for a cell anchored at `anchor`.
///
/// A missing pointer counts as out of range.
pub fn target_size(config: &GridConfig, anchor: Vec2, pointer: Option<Vec2>) -> f32 {
    let scale = match pointer {
        Some(pointer) => {
            let range = config.proximity_range;
            let distance_sq = anchor.distance_squared(pointer);
            if distance_sq >= range * range {
                1.0
            } else {
                (distance_sq.sqrt() / range).clamp(0.0, 1.0)
            }
        }
        None => 1.0,
    };
    config.min_size + (config.max_size - config.min_size) * scale
}

/// Picks the ease direction for moving `current` toward `target`.
pub fn easing(current: f32, target: f32) -> Easing {
    if current > target {
        Easing::In
    } else {
        Easing::Out
    }
}

pub fn ease_duration(config: &GridConfig, easing: Easing) -> f32 {
    match easing {
        Easing::In => config.ease_in_duration,
        Easing::Out => config.ease_out_duration,
    }
}

/// Advances one cell to frame time `now` (seconds).
pub fn advance_cell(cell: &mut Cell, config: &GridConfig, pointer: Option<Vec2>, now: f64) {
    cell.target_size = target_size(config, cell.anchor, pointer);

    let duration = ease_duration(config, easing(cell.current_size, cell.target_size));
    let elapsed = (now - cell.last_update) as f32;
    let fraction = if duration > 0.0 {
        (elapsed / duration).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let next = cell.current_size + (cell.target_size - cell.current_size) * fraction;
    cell.current_size = next.clamp(config.min_size, config.max_size);
    cell.last_update = now;
}

/// Advances every cell in `grid` to frame time `now`.
pub fn update_grid(grid: &mut Grid, config: &GridConfig, pointer: Option<Vec2>, now: f64) {
    for cell in &mut grid.cells {
        advance_cell(cell, config, pointer, now);
    }
}

/// View and projection for a `width` x `height` pixel canvas.
///
/// Pixel `(0, 0)` maps to the top-left of clip space.
pub fn view_projection(width: u32, height: u32) -> (Mat4, Mat4) {
    let projection =
        Mat4::orthographic_rh_gl(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
    (Mat4::IDENTITY, projection)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn config() -> GridConfig {
        GridConfig {
            min_size: 0.0,
            max_size: 20.0,
            proximity_range: 200.0,
            ease_in_duration: 0.2,
            ease_out_duration: 0.5,
            ..GridConfig::default()
        }
    }

    fn cell_at(anchor: Vec2, size: f32) -> Cell {
        Cell {
            anchor,
            current_size: size,
            target_size: size,
            last_update: 0.0,
        }
    }

    #[test]
    fn pointer_on_anchor_targets_min_size() {
        let config = config();
        let anchor = Vec2::new(50.0, 50.0);
        assert_eq!(target_size(&config, anchor, Some(anchor)), config.min_size);
    }

    #[test]
    fn pointer_out_of_range_targets_max_size() {
        let config = config();
        let anchor = Vec2::ZERO;
        assert_eq!(
            target_size(&config, anchor, Some(Vec2::new(200.0, 0.0))),
            config.max_size
        );
        assert_eq!(
            target_size(&config, anchor, Some(Vec2::new(500.0, 500.0))),
            config.max_size
        );
        assert_eq!(target_size(&config, anchor, None), config.max_size);
    }

    #[test]
    fn target_size_shrinks_as_pointer_approaches() {
        let config = GridConfig {
            min_size: 4.0,
            ..config()
        };
        let mut last = f32::INFINITY;
        for step in (0..=250).rev() {
            let size = target_size(&config, Vec2::ZERO, Some(Vec2::new(step as f32, 0.0)));
            assert!(size <= last, "distance {step}: {size} > {last}");
            assert!((config.min_size..=config.max_size).contains(&size));
            last = size;
        }
        assert_eq!(last, 4.0);
    }

    #[test]
    fn halfway_distance_targets_midpoint() {
        let config = config();
        let size = target_size(&config, Vec2::ZERO, Some(Vec2::new(60.0, 80.0)));
        assert!((size - 10.0).abs() < 1e-5);
    }

    #[test]
    fn direction_selects_duration() {
        let config = config();
        assert_eq!(easing(20.0, 5.0), Easing::In);
        assert_eq!(easing(5.0, 20.0), Easing::Out);
        assert_eq!(easing(5.0, 5.0), Easing::Out);
        assert_eq!(ease_duration(&config, Easing::In), 0.2);
        assert_eq!(ease_duration(&config, Easing::Out), 0.5);
    }

    #[test]
    fn one_frame_shrinks_without_overshoot() {
        let config = config();
        let anchor = Vec2::new(100.0, 100.0);
        let mut cell = cell_at(anchor, 20.0);
        cell.last_update = 1.0;

        advance_cell(&mut cell, &config, Some(anchor), 1.016);

        assert_eq!(cell.target_size, 0.0);
        assert!(cell.current_size < 20.0);
        assert!(cell.current_size >= 0.0);
        assert!((cell.current_size - 18.4).abs() < 1e-3);
        assert_eq!(cell.last_update, 1.016);
    }

    #[test]
    fn growing_uses_the_slower_duration() {
        let config = config();
        let mut shrinking = cell_at(Vec2::ZERO, 20.0);
        let mut growing = cell_at(Vec2::ZERO, 0.0);
        advance_cell(&mut shrinking, &config, Some(Vec2::ZERO), 0.05);
        advance_cell(&mut growing, &config, None, 0.05);
        let shrunk = 20.0 - shrinking.current_size;
        let grown = growing.current_size;
        assert!(shrunk > grown);
        assert!((grown - 2.0).abs() < 1e-4);
    }

    #[test]
    fn repeated_frames_converge_and_hold() {
        let config = config();
        let anchor = Vec2::new(10.0, 10.0);
        let pointer = Some(Vec2::new(10.0, 110.0));
        let mut cell = cell_at(anchor, 20.0);
        let step = 1.0 / 60.0;

        let mut now = 0.0;
        // several multiples of the ease-in duration
        for _ in 0..120 {
            now += step;
            advance_cell(&mut cell, &config, pointer, now);
        }
        assert!((cell.current_size - cell.target_size).abs() < 1e-3);

        cell.current_size = cell.target_size;
        let settled = cell.current_size;
        advance_cell(&mut cell, &config, pointer, now + step);
        assert_eq!(cell.current_size, settled);
    }

    #[test]
    fn stale_cell_snaps_to_target() {
        let config = config();
        let mut cell = cell_at(Vec2::ZERO, 20.0);
        advance_cell(&mut cell, &config, Some(Vec2::ZERO), 10.0);
        assert_eq!(cell.current_size, 0.0);
    }

    #[test]
    fn zero_duration_snaps_to_target() {
        let config = GridConfig {
            ease_in_duration: 0.0,
            ..config()
        };
        let mut cell = cell_at(Vec2::ZERO, 20.0);
        cell.last_update = 3.0;
        advance_cell(&mut cell, &config, Some(Vec2::ZERO), 3.0);
        assert_eq!(cell.current_size, 0.0);
    }

    #[test]
    fn update_grid_touches_every_cell() {
        let config = config();
        let mut grid = crate::grid::build_grid(100, 100, config.max_size);
        update_grid(&mut grid, &config, Some(Vec2::new(50.0, 50.0)), 0.5);
        assert!(grid.cells.iter().all(|c| c.last_update == 0.5));
        assert!(grid.cells.iter().any(|c| c.current_size < config.max_size));
    }

    #[test]
    fn clock_records_delta() {
        let mut clock = FrameClock::default();
        clock.tick(1.0);
        let delta = clock.tick(1.25);
        assert_eq!(delta, 0.25);
        assert_eq!(clock.delta(), 0.25);
        assert_eq!(clock.last_frame(), 1.25);
    }

    #[test]
    fn projection_flips_y_axis() {
        let (view, projection) = view_projection(800, 600);
        assert_eq!(view, Mat4::IDENTITY);
        let top_left = projection.project_point3(Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = projection.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!((top_left - Vec3::new(-1.0, 1.0, 0.0)).length() < 1e-5);
        assert!((bottom_right - Vec3::new(1.0, -1.0, 0.0)).length() < 1e-5);
    }
}
