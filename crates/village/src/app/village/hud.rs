use engine::{Drawable, ScreenRect, TextStyle, Vec2};

use super::layout::{Location, VillageLayout};

const PANEL_BACKGROUND: [u8; 4] = [16, 16, 30, 255];
const PANEL_RULE: [u8; 4] = [0, 212, 255, 255];
const NAV_ACTIVE: [u8; 4] = [0, 212, 255, 255];
const NAV_IDLE: [u8; 4] = [136, 136, 136, 255];
const LABEL_MUTED: [u8; 4] = [150, 160, 180, 255];
const NAV_BUTTON_HEIGHT: f32 = 14.0;
const NAV_BUTTON_GAP: f32 = 6.0;
const PANEL_PADDING: f32 = 8.0;

/// Text shown in the bottom strip. Writes mark the panel dirty so the HUD layer is rebuilt once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatusPanel {
    floor_name: String,
    location_name: String,
    activity: String,
    dirty: bool,
}

impl StatusPanel {
    pub(crate) fn floor_name(&self) -> &str {
        &self.floor_name
    }

    pub(crate) fn location_name(&self) -> &str {
        &self.location_name
    }

    pub(crate) fn activity(&self) -> &str {
        &self.activity
    }

    pub(crate) fn set_floor_name(&mut self, name: &str) {
        if self.floor_name != name {
            self.floor_name = name.to_string();
            self.dirty = true;
        }
    }

    pub(crate) fn show_location(&mut self, location: &Location) {
        self.location_name = location.display_name.clone();
        self.activity = location.activity_text.clone();
        self.dirty = true;
    }

    pub(crate) fn set_activity(&mut self, activity: &str) {
        if self.activity != activity {
            self.activity = activity.to_string();
            self.dirty = true;
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// One button per floor, left to right in layout order.
pub(crate) fn floor_nav_buttons(layout: &VillageLayout, strip: ScreenRect) -> Vec<(usize, ScreenRect)> {
    let count = layout.floor_count().max(1) as f32;
    let usable = strip.width - PANEL_PADDING * 2.0 - NAV_BUTTON_GAP * (count - 1.0);
    let width = (usable / count).floor().max(1.0);
    (0..layout.floor_count())
        .map(|index| {
            let x = strip.x + PANEL_PADDING + index as f32 * (width + NAV_BUTTON_GAP);
            (
                index,
                ScreenRect::new(x, strip.y + 4.0, width, NAV_BUTTON_HEIGHT),
            )
        })
        .collect()
}

pub(crate) fn hud_drawables(
    panel: &StatusPanel,
    layout: &VillageLayout,
    active_floor: usize,
    strip: ScreenRect,
) -> Vec<Drawable> {
    let small = TextStyle {
        scale: 1,
        ..TextStyle::default()
    };
    let mut drawables = vec![
        Drawable::Rect {
            rect: strip,
            color: PANEL_BACKGROUND,
        },
        Drawable::Rect {
            rect: ScreenRect::new(strip.x, strip.y, strip.width, 1.0),
            color: PANEL_RULE,
        },
    ];

    for (index, rect) in floor_nav_buttons(layout, strip) {
        let color = if index == active_floor {
            NAV_ACTIVE
        } else {
            NAV_IDLE
        };
        let name = layout
            .floor(index)
            .map(|floor| floor.name.as_str())
            .unwrap_or("?");
        drawables.push(Drawable::RectOutline {
            rect,
            thickness: 1,
            color,
        });
        let text = fit_text(name, rect.width - 6.0, small);
        let text_x = rect.center().x - small.text_width(&text) as f32 * 0.5;
        drawables.push(Drawable::Text {
            position: Vec2::new(text_x, rect.y + 4.0),
            text,
            style: TextStyle { color, ..small },
        });
    }

    let large = TextStyle::default();
    let line_y = strip.y + 4.0 + NAV_BUTTON_HEIGHT + 6.0;
    let heading = format!("{} / {}", panel.floor_name(), panel.location_name());
    drawables.push(Drawable::Text {
        position: Vec2::new(strip.x + PANEL_PADDING, line_y),
        text: fit_text(&heading, strip.width - PANEL_PADDING * 2.0, large),
        style: large,
    });
    drawables.push(Drawable::Text {
        position: Vec2::new(
            strip.x + PANEL_PADDING,
            line_y + large.line_height() as f32 + 2.0,
        ),
        text: fit_text(panel.activity(), strip.width - PANEL_PADDING * 2.0, small),
        style: TextStyle {
            color: LABEL_MUTED,
            ..small
        },
    });
    drawables
}

/// Truncates with a trailing `..` when `text` is wider than `max_width`.
pub(crate) fn fit_text(text: &str, max_width: f32, style: TextStyle) -> String {
    let advance = style.advance().max(1) as f32;
    let max_chars = (max_width / advance).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(2);
    let mut fitted: String = text.chars().take(keep).collect();
    fitted.push_str(&".."[..max_chars.min(2)]);
    fitted
}

const BODY: [u8; 4] = [0, 212, 255, 255];
const TENTACLE: [u8; 4] = [0, 168, 204, 255];
const GLOW: [u8; 4] = [0, 212, 255, 38];
const EYE_WHITE: [u8; 4] = [255, 255, 255, 255];
const PUPIL: [u8; 4] = [26, 26, 46, 255];
const GLASSES: [u8; 4] = [51, 51, 51, 255];

/// The octopus avatar, centred on `center`.
pub(crate) fn avatar_drawables(center: Vec2) -> Vec<Drawable> {
    let at = |dx: f32, dy: f32| center.offset(dx, dy);
    let circle = |dx: f32, dy: f32, radius: f32, color: [u8; 4]| Drawable::Circle {
        center: at(dx, dy),
        radius,
        color,
    };

    let mut drawables = vec![circle(0.0, 0.0, 25.0, GLOW), circle(0.0, -6.0, 16.0, BODY)];
    drawables.extend([-12.0f32, -6.0, 0.0, 6.0, 12.0].into_iter().map(|dx| Drawable::Ellipse {
        center: at(dx, 8.0 + dx.abs() * 0.2),
        radius_x: 2.5,
        radius_y: 6.0,
        color: TENTACLE,
    }));
    drawables.extend([
        circle(-6.0, -8.0, 5.0, EYE_WHITE),
        circle(6.0, -8.0, 5.0, EYE_WHITE),
        circle(-5.0, -7.0, 3.0, PUPIL),
        circle(7.0, -7.0, 3.0, PUPIL),
        circle(-3.0, -9.0, 1.5, EYE_WHITE),
        circle(9.0, -9.0, 1.5, EYE_WHITE),
    ]);
    for lens_x in [-12.0, 2.0] {
        let origin = at(lens_x, -14.0);
        drawables.push(Drawable::RectOutline {
            rect: ScreenRect::new(origin.x, origin.y, 10.0, 9.0),
            thickness: 2,
            color: GLASSES,
        });
    }
    let bridge = at(-2.0, -11.0);
    drawables.push(Drawable::Rect {
        rect: ScreenRect::new(bridge.x, bridge.y, 4.0, 2.0),
        color: GLASSES,
    });
    drawables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::village::test_support::sample_layout;

    #[test]
    fn panel_tracks_dirty_writes_once() {
        let mut panel = StatusPanel::default();
        panel.set_floor_name("Office");
        assert!(panel.take_dirty());
        assert!(!panel.take_dirty());

        panel.set_floor_name("Office");
        panel.set_activity("");
        assert!(!panel.take_dirty());

        panel.set_activity("Testing");
        assert!(panel.take_dirty());
        assert_eq!(panel.activity(), "Testing");
    }

    #[test]
    fn nav_buttons_fill_strip_without_overlap() {
        let layout = sample_layout();
        let strip = ScreenRect::new(0.0, 480.0, 672.0, 64.0);
        let buttons = floor_nav_buttons(&layout, strip);

        assert_eq!(buttons.len(), layout.floor_count());
        for pair in buttons.windows(2) {
            assert!(pair[0].1.x + pair[0].1.width <= pair[1].1.x);
        }
        let last = buttons.last().expect("buttons").1;
        assert!(last.x + last.width <= strip.x + strip.width);
        assert!(buttons.iter().all(|(_, rect)| rect.y >= strip.y));
    }

    #[test]
    fn hud_highlights_active_floor_button() {
        let layout = sample_layout();
        let strip = ScreenRect::new(0.0, 480.0, 672.0, 64.0);
        let drawables = hud_drawables(&StatusPanel::default(), &layout, 1, strip);
        let outlines: Vec<[u8; 4]> = drawables
            .iter()
            .filter_map(|drawable| match drawable {
                Drawable::RectOutline { color, .. } => Some(*color),
                _ => None,
            })
            .collect();

        assert_eq!(outlines.len(), layout.floor_count());
        assert_eq!(outlines[1], NAV_ACTIVE);
        assert_eq!(outlines[0], NAV_IDLE);
    }

    #[test]
    fn fit_text_truncates_long_lines() {
        let style = TextStyle {
            scale: 1,
            ..TextStyle::default()
        };
        assert_eq!(fit_text("Desk", 100.0, style), "Desk");
        assert_eq!(fit_text("Collaborating", 24.0, style), "Coll..");
        assert_eq!(fit_text("Anything", 4.0, style), ".");
    }

    #[test]
    fn avatar_art_is_centred_on_position() {
        let drawables = avatar_drawables(Vec2::new(100.0, 50.0));
        match &drawables[0] {
            Drawable::Circle { center, radius, .. } => {
                assert_eq!(*center, Vec2::new(100.0, 50.0));
                assert_eq!(*radius, 25.0);
            }
            other => panic!("expected glow circle, got {other:?}"),
        }
    }
}
