mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    depth_key, depth_sort, GridPos, GridPositioned, Projection, Projector, Renderer, TextStyle,
};
pub use scene::{
    Drawable, HitRegion, HitRegionId, InputSnapshot, Layer, LayerId, Scene, SceneCommand,
    SceneWorld, ScreenRect, Vec2,
};
