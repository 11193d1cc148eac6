use serde::Deserialize;

use super::input::{ActionEdges, InputAction};
use super::rendering::TextStyle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Vec2 {
        Vec2 {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned rectangle in scene buffer pixels; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width * 0.5,
            y: center.y - height * 0.5,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }

    pub fn inset(&self, amount: f32) -> ScreenRect {
        ScreenRect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - amount * 2.0).max(0.0),
            height: (self.height - amount * 2.0).max(0.0),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Rect {
        rect: ScreenRect,
        color: [u8; 4],
    },
    RectOutline {
        rect: ScreenRect,
        thickness: i32,
        color: [u8; 4],
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: [u8; 4],
    },
    Ellipse {
        center: Vec2,
        radius_x: f32,
        radius_y: f32,
        color: [u8; 4],
    },
    /// Isometric tile footprint centred on `center`.
    Diamond {
        center: Vec2,
        half_width: f32,
        half_height: f32,
        color: [u8; 4],
    },
    Text {
        position: Vec2,
        text: String,
        style: TextStyle,
    },
    /// Named image resource; `fallback` is drawn when the sprite cannot be loaded.
    Sprite {
        key: String,
        center: Vec2,
        scale: f32,
        fallback: Vec<Drawable>,
    },
}

/// Layer handle; only valid until the next [`SceneWorld::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: &'static str,
    pub drawables: Vec<Drawable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitRegionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub id: HitRegionId,
    pub rect: ScreenRect,
}

#[derive(Debug, Default)]
struct HitRegionIdAllocator {
    next: u64,
}

impl HitRegionIdAllocator {
    fn allocate(&mut self) -> HitRegionId {
        let id = HitRegionId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Retained layer graph drawn back-to-front, plus the interactive regions over it.
#[derive(Debug)]
pub struct SceneWorld {
    clear_color: [u8; 4],
    layers: Vec<Layer>,
    hit_regions: Vec<HitRegion>,
    allocator: HitRegionIdAllocator,
    layer_generation: u64,
}

pub const DEFAULT_CLEAR_COLOR: [u8; 4] = [26, 26, 46, 255];

impl Default for SceneWorld {
    fn default() -> Self {
        Self {
            clear_color: DEFAULT_CLEAR_COLOR,
            layers: Vec::new(),
            hit_regions: Vec::new(),
            allocator: HitRegionIdAllocator::default(),
            layer_generation: 0,
        }
    }
}

impl SceneWorld {
    pub fn clear_color(&self) -> [u8; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: [u8; 4]) {
        self.clear_color = color;
    }

    pub fn push_layer(&mut self, name: &'static str) -> LayerId {
        self.layers.push(Layer {
            name,
            drawables: Vec::new(),
        });
        LayerId {
            index: self.layers.len() - 1,
            generation: self.layer_generation,
        }
    }

    fn layer_index(&self, id: LayerId) -> Option<usize> {
        let live = id.generation == self.layer_generation && id.index < self.layers.len();
        live.then_some(id.index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layer_index(id).map(|index| &self.layers[index])
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn push_drawable(&mut self, id: LayerId, drawable: Drawable) -> bool {
        match self.layer_index(id) {
            Some(index) => {
                self.layers[index].drawables.push(drawable);
                true
            }
            None => false,
        }
    }

    pub fn extend_layer(&mut self, id: LayerId, drawables: impl IntoIterator<Item = Drawable>) {
        if let Some(index) = self.layer_index(id) {
            self.layers[index].drawables.extend(drawables);
        }
    }

    /// Swaps the contents of a dynamic layer; returns false for an id issued before the last clear.
    pub fn replace_layer(&mut self, id: LayerId, drawables: Vec<Drawable>) -> bool {
        match self.layer_index(id) {
            Some(index) => {
                self.layers[index].drawables = drawables;
                true
            }
            None => false,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn drawable_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.drawables.len()).sum()
    }

    pub fn add_hit_region(&mut self, rect: ScreenRect) -> HitRegionId {
        let id = self.allocator.allocate();
        self.hit_regions.push(HitRegion { id, rect });
        id
    }

    pub fn hit_region(&self, id: HitRegionId) -> Option<&HitRegion> {
        self.hit_regions.iter().find(|region| region.id == id)
    }

    pub fn hit_region_count(&self) -> usize {
        self.hit_regions.len()
    }

    /// Topmost region under `point`; later registrations win on overlap.
    pub fn hit_test(&self, point: Vec2) -> Option<HitRegionId> {
        self.hit_regions
            .iter()
            .rev()
            .find(|region| region.rect.contains(point))
            .map(|region| region.id)
    }

    /// Drops every layer and hit region. Region ids are never reused afterwards.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.layer_generation = self.layer_generation.wrapping_add(1);
        self.hit_regions.clear();
        self.clear_color = DEFAULT_CLEAR_COLOR;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionEdges,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionEdges,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            left_click_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.mark_pressed(action);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    /// Cursor in scene buffer pixels, `None` when outside the drawable area.
    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    HardReset,
    Quit,
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.scene.update(fixed_dt_seconds, input, &mut self.world)
    }

    pub(crate) fn render(&mut self) {
        self.scene.render(&self.world);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn hard_reset(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
        }
        self.world.clear();
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.world.clear();
            self.is_loaded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_drawable() -> Drawable {
        Drawable::Rect {
            rect: ScreenRect::new(0.0, 0.0, 4.0, 4.0),
            color: [255, 0, 0, 255],
        }
    }

    struct CountingScene;

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            let layer = world.push_layer("ground");
            world.push_drawable(layer, rect_drawable());
            world.add_hit_region(ScreenRect::new(0.0, 0.0, 10.0, 10.0));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            if input.was_pressed(InputAction::Reload) {
                SceneCommand::HardReset
            } else {
                SceneCommand::None
            }
        }

        fn render(&mut self, _world: &SceneWorld) {}

        fn unload(&mut self, _world: &mut SceneWorld) {}
    }

    #[test]
    fn allocator_never_reuses_ids_across_clear() {
        let mut world = SceneWorld::default();
        let first = world.add_hit_region(ScreenRect::new(0.0, 0.0, 1.0, 1.0));
        world.clear();
        let second = world.add_hit_region(ScreenRect::new(0.0, 0.0, 1.0, 1.0));
        assert_ne!(first, second);
        assert!(world.hit_region(first).is_none());
    }

    #[test]
    fn hit_test_prefers_last_registered_region_on_overlap() {
        let mut world = SceneWorld::default();
        let under = world.add_hit_region(ScreenRect::new(0.0, 0.0, 100.0, 100.0));
        let over = world.add_hit_region(ScreenRect::new(10.0, 10.0, 20.0, 20.0));

        assert_eq!(world.hit_test(Vec2::new(15.0, 15.0)), Some(over));
        assert_eq!(world.hit_test(Vec2::new(50.0, 50.0)), Some(under));
        assert_eq!(world.hit_test(Vec2::new(150.0, 50.0)), None);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = ScreenRect::new(10.0, 10.0, 5.0, 5.0);
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(14.9, 14.9)));
        assert!(!rect.contains(Vec2::new(15.0, 12.0)));
    }

    #[test]
    fn replace_layer_swaps_contents_and_rejects_stale_ids() {
        let mut world = SceneWorld::default();
        let layer = world.push_layer("avatar");
        world.push_drawable(layer, rect_drawable());
        assert!(world.replace_layer(layer, vec![rect_drawable(), rect_drawable()]));
        assert_eq!(world.drawable_count(), 2);

        world.clear();
        assert!(!world.replace_layer(layer, Vec::new()));
        assert_eq!(world.layer_count(), 0);
    }

    #[test]
    fn layer_ids_from_before_clear_do_not_alias_rebuilt_layers() {
        let mut world = SceneWorld::default();
        let stale = world.push_layer("ground");
        world.clear();
        let fresh = world.push_layer("ground");

        assert!(!world.push_drawable(stale, rect_drawable()));
        assert!(!world.replace_layer(stale, vec![rect_drawable()]));
        world.extend_layer(stale, vec![rect_drawable()]);
        assert!(world.layer(stale).is_none());
        assert_eq!(world.drawable_count(), 0);

        assert!(world.push_drawable(fresh, rect_drawable()));
        assert_eq!(world.layer(fresh).map(|layer| layer.drawables.len()), Some(1));
    }

    #[test]
    fn hard_reset_unloads_clears_and_reloads() {
        let mut runtime = SceneRuntime::new(Box::new(CountingScene));
        runtime.load();
        runtime.load();
        assert_eq!(runtime.world().layer_count(), 1);

        let command = runtime.update(
            1.0 / 60.0,
            &InputSnapshot::empty().with_action_pressed(InputAction::Reload),
        );
        assert_eq!(command, SceneCommand::HardReset);
        runtime.hard_reset();

        assert_eq!(runtime.world().layer_count(), 1);
        assert_eq!(runtime.world().hit_region_count(), 1);
    }

    #[test]
    fn shutdown_clears_world_once() {
        let mut runtime = SceneRuntime::new(Box::new(CountingScene));
        runtime.load();
        runtime.shutdown();
        runtime.shutdown();
        assert_eq!(runtime.world().layer_count(), 0);
        assert_eq!(runtime.world().hit_region_count(), 0);
    }
}
