use std::f32::consts::PI;

use engine::Vec2;

use super::hud::StatusPanel;
use super::layout::Floor;

pub(crate) const MOVE_DURATION_SECONDS: f32 = 0.5;
pub(crate) const BREATH_AMPLITUDE_PX: f32 = 5.0;
pub(crate) const BREATH_HALF_PERIOD_SECONDS: f32 = 1.0;
const BACK_OVERSHOOT: f32 = 1.70158;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveMode {
    /// Animated move; rejected while another move is still running.
    Tween,
    /// Immediate placement that ignores the busy guard.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    Accepted,
    UnknownLocation,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AvatarState {
    pub(crate) current_location_key: String,
    pub(crate) is_transitioning: bool,
}

#[derive(Debug, Clone)]
struct Tween {
    from: Vec2,
    to: Vec2,
    target_key: String,
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct AvatarController {
    state: AvatarState,
    position: Vec2,
    tween: Option<Tween>,
    breath_elapsed: f32,
}

impl AvatarController {
    /// Places the avatar idle on the floor's first location.
    pub(crate) fn new(floor: &Floor) -> Self {
        let first = floor.locations.first();
        Self {
            state: AvatarState {
                current_location_key: first.key.clone(),
                is_transitioning: false,
            },
            position: floor.projector.project(first.grid),
            tween: None,
            breath_elapsed: 0.0,
        }
    }

    pub(crate) fn state(&self) -> &AvatarState {
        &self.state
    }

    pub(crate) fn current_location_key(&self) -> &str {
        &self.state.current_location_key
    }

    pub(crate) fn is_transitioning(&self) -> bool {
        self.state.is_transitioning
    }

    pub(crate) fn target_key(&self) -> Option<&str> {
        self.tween.as_ref().map(|tween| tween.target_key.as_str())
    }

    pub(crate) fn request_move(
        &mut self,
        floor: &Floor,
        target_key: &str,
        mode: MoveMode,
        panel: &mut StatusPanel,
    ) -> MoveOutcome {
        let Some(location) = floor.locations.get(target_key) else {
            return MoveOutcome::UnknownLocation;
        };
        if mode == MoveMode::Tween && self.state.is_transitioning {
            return MoveOutcome::Busy;
        }

        let target = floor.projector.project(location.grid);
        match mode {
            MoveMode::Tween => {
                let from = self.draw_position();
                self.position = from;
                self.tween = Some(Tween {
                    from,
                    to: target,
                    target_key: location.key.clone(),
                    elapsed: 0.0,
                });
                self.state.is_transitioning = true;
            }
            MoveMode::Forced => {
                self.tween = None;
                self.position = target;
                self.state.current_location_key = location.key.clone();
                self.state.is_transitioning = false;
            }
        }
        self.breath_elapsed = 0.0;
        panel.show_location(location);
        MoveOutcome::Accepted
    }

    pub(crate) fn update(&mut self, dt_seconds: f32) {
        let Some(tween) = self.tween.as_mut() else {
            self.breath_elapsed =
                (self.breath_elapsed + dt_seconds) % (BREATH_HALF_PERIOD_SECONDS * 2.0);
            return;
        };

        tween.elapsed += dt_seconds;
        let progress = (tween.elapsed / MOVE_DURATION_SECONDS).min(1.0);
        if progress < 1.0 {
            self.position = tween.from.lerp(tween.to, ease_back_out(progress));
            return;
        }

        self.position = tween.to;
        if let Some(done) = self.tween.take() {
            self.state.current_location_key = done.target_key;
        }
        self.state.is_transitioning = false;
        self.breath_elapsed = 0.0;
    }

    /// Resting or tweened position plus the idle breathing offset.
    pub(crate) fn draw_position(&self) -> Vec2 {
        if self.tween.is_some() {
            return self.position;
        }
        self.position.offset(0.0, breath_offset(self.breath_elapsed))
    }
}

/// Overshoots slightly past 1.0 before settling.
pub(crate) fn ease_back_out(t: f32) -> f32 {
    let c3 = BACK_OVERSHOOT + 1.0;
    let u = t - 1.0;
    1.0 + c3 * u * u * u + BACK_OVERSHOOT * u * u
}

pub(crate) fn ease_sine_in_out(t: f32) -> f32 {
    -((PI * t).cos() - 1.0) * 0.5
}

/// Vertical offset in `[-BREATH_AMPLITUDE_PX, 0]`, rising for one half period then falling back.
pub(crate) fn breath_offset(elapsed_seconds: f32) -> f32 {
    let cycle = elapsed_seconds.rem_euclid(BREATH_HALF_PERIOD_SECONDS * 2.0);
    let phase = if cycle <= BREATH_HALF_PERIOD_SECONDS {
        cycle / BREATH_HALF_PERIOD_SECONDS
    } else {
        2.0 - cycle / BREATH_HALF_PERIOD_SECONDS
    };
    -BREATH_AMPLITUDE_PX * ease_sine_in_out(phase)
}
