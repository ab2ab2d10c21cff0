use glam::Vec2;

/// One square of the field.
///
/// Plain data: the animation law that mutates the sizes lives in
/// [`crate::frame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Canvas-space center, fixed at construction.
    pub anchor: Vec2,
    pub current_size: f32,
    pub target_size: f32,
    /// Frame time (seconds) at which `current_size` was last advanced.
    pub last_update: f64,
}

/// Every cell covering one viewport at one pitch.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    pub cells: Vec<Cell>,
    pub columns: usize,
    pub rows: usize,
    pub spacing: f32,
}

impl Grid {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Upper bound on cells in one grid; denser lattices are refused.
pub const MAX_CELLS: usize = 1 << 24;

/// Lays out anchors over a `width` x `height` viewport.
///
/// `pitch` is the configured maximum cell size; neighbouring anchors sit
/// `pitch / 2` apart so fully grown squares overlap by half. One extra row and
/// column keep the far edges covered. Cells are emitted row-major and start
/// fully grown.
pub fn build_grid(width: u32, height: u32, pitch: f32) -> Grid {
    if width == 0 || height == 0 || !(pitch.is_finite() && pitch > 0.0) {
        return Grid::default();
    }

    let spacing = pitch / 2.0;
    let lattice = lattice_count(width, spacing).zip(lattice_count(height, spacing));
    let Some((columns, rows)) = lattice.filter(|&(columns, rows)| {
        columns
            .checked_mul(rows)
            .is_some_and(|count| count <= MAX_CELLS)
    }) else {
        log::warn!("pitch {pitch} is too small for a {width}x{height} viewport; grid left empty");
        return Grid::default();
    };

    let mut cells = Vec::with_capacity(columns * rows);
    for j in 0..rows {
        for i in 0..columns {
            cells.push(Cell {
                anchor: Vec2::new(i as f32 * spacing, j as f32 * spacing),
                current_size: pitch,
                target_size: pitch,
                last_update: 0.0,
            });
        }
    }

    Grid {
        cells,
        columns,
        rows,
        spacing,
    }
}

fn lattice_count(extent: u32, spacing: f32) -> Option<usize> {
    let steps = (extent as f32 / spacing).ceil();
    if steps >= usize::MAX as f32 {
        return None;
    }
    (steps as usize).checked_add(1)
}
