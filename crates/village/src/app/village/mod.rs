use std::collections::HashMap;
use std::path::PathBuf;

use engine::{
    HitRegionId, InputAction, InputSnapshot, Scene, SceneCommand, SceneWorld, ScreenRect, Vec2,
};
use tracing::{debug, info, warn};

mod avatar;
mod hud;
mod layout;
mod scene_builder;
mod status;
mod status_source;

use avatar::{AvatarController, MoveMode, MoveOutcome};
use hud::{avatar_drawables, hud_drawables, StatusPanel};
use layout::VillageLayout;
use scene_builder::{build_floor_scene, FloorLayers, HitAction, MarkerStyles};
use status::{plan_status_update, StatusDocument};

pub(crate) use layout::{load_layout, LayoutError};
pub(crate) use status::StatusPoller;
pub(crate) use status_source::{
    FileStatusSource, HttpStatusSource, InlineStatusChannel, StatusError, StatusWorker,
};

pub(crate) const SCENE_WIDTH: u32 = 672;
pub(crate) const SCENE_HEIGHT: u32 = 544;
const HUD_HEIGHT: f32 = 64.0;

/// Bottom strip of the scene buffer reserved for the status panel and floor buttons.
pub(crate) fn hud_strip() -> ScreenRect {
    ScreenRect::new(
        0.0,
        SCENE_HEIGHT as f32 - HUD_HEIGHT,
        SCENE_WIDTH as f32,
        HUD_HEIGHT,
    )
}

pub(crate) struct VillageScene {
    layout_path: PathBuf,
    layout: VillageLayout,
    styles: MarkerStyles,
    active_floor: usize,
    avatar: AvatarController,
    panel: StatusPanel,
    poller: Option<StatusPoller>,
    layers: Option<FloorLayers>,
    actions: HashMap<HitRegionId, HitAction>,
}

impl VillageScene {
    pub(crate) fn new(
        layout_path: PathBuf,
        layout: VillageLayout,
        poller: Option<StatusPoller>,
    ) -> Self {
        let active_floor = layout.start_floor();
        let avatar = AvatarController::new(&layout.floors()[active_floor]);
        Self {
            layout_path,
            layout,
            styles: MarkerStyles::standard(),
            active_floor,
            avatar,
            panel: StatusPanel::default(),
            poller,
            layers: None,
            actions: HashMap::new(),
        }
    }

    fn rebuild_floor(&mut self, world: &mut SceneWorld) {
        match build_floor_scene(
            world,
            &self.layout,
            self.active_floor,
            &self.styles,
            hud_strip(),
        ) {
            Some(built) => {
                self.layers = Some(built.layers);
                self.actions = built.actions;
            }
            None => {
                self.layers = None;
                self.actions.clear();
            }
        }
        if let Some(floor) = self.layout.floor(self.active_floor) {
            self.panel.set_floor_name(&floor.name);
        }
        self.panel.mark_dirty();
        self.refresh_dynamic_layers(world);
    }

    fn refresh_dynamic_layers(&mut self, world: &mut SceneWorld) {
        let Some(layers) = self.layers else {
            return;
        };
        world.replace_layer(layers.avatar, avatar_drawables(self.avatar.draw_position()));
        if self.panel.take_dirty() {
            world.replace_layer(
                layers.hud,
                hud_drawables(&self.panel, &self.layout, self.active_floor, hud_strip()),
            );
        }
    }

    /// Rebuilds the scene for `index` and force-places the avatar on its first location.
    fn switch_floor(&mut self, world: &mut SceneWorld, index: usize) -> bool {
        if index == self.active_floor {
            return false;
        }
        let Some(floor) = self.layout.floor(index) else {
            debug!(floor_index = index, "floor_switch_ignored_unknown");
            return false;
        };
        let from = self.active_floor;
        self.active_floor = index;
        self.avatar.request_move(
            floor,
            &floor.locations.first().key,
            MoveMode::Forced,
            &mut self.panel,
        );
        info!(from, to = %floor.key, "floor_switched");
        self.rebuild_floor(world);
        true
    }

    fn step_floor(&mut self, world: &mut SceneWorld, forward: bool) {
        let target = if forward {
            self.active_floor.checked_add(1)
        } else {
            self.active_floor.checked_sub(1)
        };
        match target.filter(|index| *index < self.layout.floor_count()) {
            Some(index) => {
                self.switch_floor(world, index);
            }
            None => debug!(floor_index = self.active_floor, forward, "floor_step_at_edge"),
        }
    }

    fn move_avatar(&mut self, key: &str, origin: &'static str) {
        let Some(floor) = self.layout.floor(self.active_floor) else {
            return;
        };
        match self
            .avatar
            .request_move(floor, key, MoveMode::Tween, &mut self.panel)
        {
            MoveOutcome::Accepted => info!(location = key, origin, "avatar_move_started"),
            MoveOutcome::Busy => debug!(
                location = key,
                origin,
                in_flight = ?self.avatar.target_key(),
                "avatar_move_dropped_busy"
            ),
            MoveOutcome::UnknownLocation => {
                debug!(location = key, origin, "avatar_move_ignored_unknown_location")
            }
        }
    }

    fn handle_click(&mut self, world: &mut SceneWorld, point: Vec2) {
        let Some(region) = world.hit_test(point) else {
            return;
        };
        let Some(action) = self.actions.get(&region).cloned() else {
            debug!(region = region.0, "hit_region_without_action");
            return;
        };
        match action {
            HitAction::MoveTo(key) => {
                if key == self.avatar.current_location_key() && !self.avatar.is_transitioning() {
                    return;
                }
                self.move_avatar(&key, "click");
            }
            HitAction::ChangeFloor(index) => {
                self.switch_floor(world, index);
            }
        }
    }

    fn apply_status(&mut self, world: &mut SceneWorld, document: &StatusDocument) {
        let update = plan_status_update(
            &self.layout,
            self.active_floor,
            self.avatar.state(),
            document,
        );
        if let Some(floor) = update.unknown_floor.as_deref() {
            debug!(floor, "status_floor_ignored_unknown");
        }
        if let Some(location) = update.unknown_location.as_deref() {
            let known: Vec<&str> = self
                .layout
                .floor(update.switch_floor.unwrap_or(self.active_floor))
                .map(|floor| floor.locations.keys().collect())
                .unwrap_or_default();
            debug!(location, ?known, "status_location_ignored_unknown");
        }
        if update.is_noop() {
            return;
        }

        if let Some(index) = update.switch_floor {
            self.switch_floor(world, index);
        }
        if let Some(key) = update.move_to.as_deref() {
            self.move_avatar(key, "status");
        }
        if let Some(activity) = update.activity.as_deref() {
            self.panel.set_activity(activity);
        }
    }

    fn reload_layout(&mut self) -> bool {
        match load_layout(&self.layout_path) {
            Ok(layout) => {
                info!(
                    path = %self.layout_path.display(),
                    floors = layout.floor_count(),
                    "layout_reloaded"
                );
                self.layout = layout;
                true
            }
            Err(error) => {
                warn!(
                    path = %self.layout_path.display(),
                    error = %error,
                    "layout_reload_failed"
                );
                false
            }
        }
    }
}

impl Scene for VillageScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.active_floor = self.layout.start_floor();
        self.panel = StatusPanel::default();
        let floor = &self.layout.floors()[self.active_floor];
        self.avatar = AvatarController::new(floor);
        self.avatar.request_move(
            floor,
            self.layout.start_location(),
            MoveMode::Forced,
            &mut self.panel,
        );
        info!(
            floor = %floor.key,
            location = self.avatar.current_location_key(),
            floors = self.layout.floor_count(),
            polling = self.poller.is_some(),
            "scene_loaded"
        );
        self.rebuild_floor(world);
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.was_pressed(InputAction::Reload) && self.reload_layout() {
            return SceneCommand::HardReset;
        }
        if input.was_pressed(InputAction::NextFloor) {
            self.step_floor(world, true);
        }
        if input.was_pressed(InputAction::PreviousFloor) {
            self.step_floor(world, false);
        }
        if input.left_click_pressed() {
            if let Some(cursor) = input.cursor_position_px() {
                self.handle_click(world, cursor);
            }
        }

        let documents = match self.poller.as_mut() {
            Some(poller) => poller.tick(fixed_dt_seconds),
            None => Vec::new(),
        };
        for document in &documents {
            self.apply_status(world, document);
        }

        self.avatar.update(fixed_dt_seconds);
        self.refresh_dynamic_layers(world);
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.layers = None;
        self.actions.clear();
        info!(floor_index = self.active_floor, "scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let floor = self.layout.floor(self.active_floor)?;
        Some(format!(
            "Pixel Village - {} - {}",
            floor.name,
            self.panel.location_name()
        ))
    }
}
