mod depth;
mod font;
mod projection;
mod raster;
mod renderer;
mod sprites;

pub use depth::{depth_key, depth_sort, GridPositioned};
pub use font::TextStyle;
pub use projection::{GridPos, Projection, Projector};
pub use renderer::Renderer;

pub(crate) use renderer::draw_world;
pub(crate) use sprites::SpriteCache;
