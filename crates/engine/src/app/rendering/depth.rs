use super::projection::GridPos;

pub trait GridPositioned {
    fn grid_position(&self) -> GridPos;
}

impl GridPositioned for GridPos {
    fn grid_position(&self) -> GridPos {
        *self
    }
}

/// Painter's-order key: smaller sums sit further back in an isometric view.
pub fn depth_key(grid: GridPos) -> f32 {
    grid.x + grid.y
}

/// Orders back-to-front by ascending `x + y`. Equal keys keep their input order.
pub fn depth_sort<T: GridPositioned>(items: &mut [T]) {
    // slice::sort_by is stable.
    items.sort_by(|a, b| {
        depth_key(a.grid_position()).total_cmp(&depth_key(b.grid_position()))
    });
}
