use serde::Deserialize;

use crate::app::Vec2;

/// A point on the logical layout grid. Fractional values address tile interiors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct GridPos {
    pub x: f32,
    pub y: f32,
}

impl GridPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Grid-to-screen mapping. Both variants are pure functions of their input.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// `screen = grid * tile_size`.
    Grid { tile_size: f32 },
    /// `screen_x = (gx - gy) * tile_width / 2`, `screen_y = (gx + gy) * tile_height / 2`.
    Isometric { tile_width: f32, tile_height: f32 },
}

impl Projection {
    pub fn project(&self, grid: GridPos) -> Vec2 {
        match *self {
            Projection::Grid { tile_size } => Vec2 {
                x: grid.x * tile_size,
                y: grid.y * tile_size,
            },
            Projection::Isometric {
                tile_width,
                tile_height,
            } => Vec2 {
                x: (grid.x - grid.y) * tile_width * 0.5,
                y: (grid.x + grid.y) * tile_height * 0.5,
            },
        }
    }

    /// On-screen size of one grid cell (the diamond's bounding box for isometric).
    pub fn cell_size(&self) -> (f32, f32) {
        match *self {
            Projection::Grid { tile_size } => (tile_size, tile_size),
            Projection::Isometric {
                tile_width,
                tile_height,
            } => (tile_width, tile_height),
        }
    }
}

/// A projection anchored at a screen origin (the screen position of grid `(0, 0)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    projection: Projection,
    origin: Vec2,
}

impl Projector {
    pub fn new(projection: Projection, origin: Vec2) -> Self {
        Self { projection, origin }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn project(&self, grid: GridPos) -> Vec2 {
        let local = self.projection.project(grid);
        Vec2 {
            x: local.x + self.origin.x,
            y: local.y + self.origin.y,
        }
    }
}
