use std::collections::HashMap;

use engine::{
    depth_sort, Drawable, GridPos, GridPositioned, HitRegionId, LayerId, SceneWorld, ScreenRect,
    TextStyle, Vec2,
};
use tracing::{debug, info};

use super::hud::floor_nav_buttons;
use super::layout::{Floor, FloorStyle, GridArea, Location, VillageLayout};

const WALL: [u8; 4] = [0x5d, 0x6d, 0x7e, 255];
const WALL_BOTTOM: [u8; 4] = [0x4a, 0x5a, 0x6a, 255];
const WINDOW: [u8; 4] = [0x87, 0xce, 0xeb, 255];
const STAIRS_UP: ([u8; 4], [u8; 4]) = ([0x27, 0xae, 0x60, 255], [0x2e, 0xcc, 0x71, 255]);
const STAIRS_DOWN: ([u8; 4], [u8; 4]) = ([0xe7, 0x4c, 0x3c, 255], [0xc0, 0x39, 0x2b, 255]);
const DEFAULT_ACCENT: [u8; 4] = [0x00, 0xd4, 0xff, 255];
const SHADOW: [u8; 4] = [0, 0, 0, 60];
const BUILDING_SPRITE_SCALE: f32 = 0.125;
const DECORATION_SPRITE_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FloorLayers {
    pub(crate) ground: LayerId,
    pub(crate) props: LayerId,
    pub(crate) markers: LayerId,
    pub(crate) avatar: LayerId,
    pub(crate) hud: LayerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HitAction {
    MoveTo(String),
    ChangeFloor(usize),
}

#[derive(Debug)]
pub(crate) struct BuiltFloor {
    pub(crate) layers: FloorLayers,
    pub(crate) actions: HashMap<HitRegionId, HitAction>,
}

pub(crate) struct MarkerContext<'a> {
    pub(crate) location: &'a Location,
    pub(crate) floor: &'a Floor,
    /// Screen position of the location's grid point.
    pub(crate) anchor: Vec2,
}

impl MarkerContext<'_> {
    fn accent(&self) -> [u8; 4] {
        self.location.color.unwrap_or(DEFAULT_ACCENT)
    }
}

/// Drawables a painter contributes to each static layer, plus the clickable area.
#[derive(Debug, Default)]
pub(crate) struct MarkerArt {
    pub(crate) ground: Vec<Drawable>,
    pub(crate) props: Vec<Drawable>,
    pub(crate) labels: Vec<Drawable>,
    pub(crate) hit_rect: ScreenRect,
}

pub(crate) type MarkerPainter = fn(&MarkerContext<'_>) -> MarkerArt;

/// Kind tag -> painter lookup. Locations without a kind use the floor style's default.
pub(crate) struct MarkerStyles {
    painters: HashMap<&'static str, MarkerPainter>,
    fallback: MarkerPainter,
}

impl MarkerStyles {
    pub(crate) fn empty(fallback: MarkerPainter) -> Self {
        Self {
            painters: HashMap::new(),
            fallback,
        }
    }

    pub(crate) fn standard() -> Self {
        let mut styles = Self::empty(paint_pin);
        styles.register("zone", paint_zone);
        styles.register("marker", paint_pin);
        styles.register("house", paint_small_house);
        styles.register("small_house", paint_small_house);
        styles.register("medium_house", paint_medium_house);
        styles.register("large_house", paint_large_house);
        styles.register("tavern", paint_tavern);
        styles.register("shop", paint_shop);
        styles.register("market", paint_shop);
        styles.register("farm", paint_small_house);
        styles.register("dock", paint_small_house);
        for kind in ["workshop", "library", "temple", "barn", "windmill", "tower"] {
            styles.register(kind, paint_large_house);
        }
        styles.register("well", paint_well);
        styles.register("fountain", paint_fountain);
        styles.register("park", paint_park);
        styles
    }

    pub(crate) fn register(&mut self, kind: &'static str, painter: MarkerPainter) {
        self.painters.insert(kind, painter);
    }

    pub(crate) fn painter_for(&self, location: &Location, style: FloorStyle) -> MarkerPainter {
        let kind = location.kind.as_deref().unwrap_or(match style {
            FloorStyle::Rooms => "zone",
            FloorStyle::Village => "marker",
        });
        match self.painters.get(kind) {
            Some(painter) => *painter,
            None => {
                debug!(location = %location.key, kind, "marker_kind_unknown_using_fallback");
                self.fallback
            }
        }
    }
}

impl Default for MarkerStyles {
    fn default() -> Self {
        Self::standard()
    }
}

struct PropEntry {
    grid: GridPos,
    drawables: Vec<Drawable>,
}

impl GridPositioned for PropEntry {
    fn grid_position(&self) -> GridPos {
        self.grid
    }
}

/// Discards the current layer graph and hit regions, then builds `floor_index` from scratch.
pub(crate) fn build_floor_scene(
    world: &mut SceneWorld,
    layout: &VillageLayout,
    floor_index: usize,
    styles: &MarkerStyles,
    hud_strip: ScreenRect,
) -> Option<BuiltFloor> {
    let floor = layout.floor(floor_index)?;
    world.clear();
    world.set_clear_color(floor.background);

    let layers = FloorLayers {
        ground: world.push_layer("ground"),
        props: world.push_layer("props"),
        markers: world.push_layer("markers"),
        avatar: world.push_layer("avatar"),
        hud: world.push_layer("hud"),
    };
    let mut actions = HashMap::new();

    let mut ground = match floor.style {
        FloorStyle::Rooms => room_ground(floor),
        FloorStyle::Village => village_ground(floor),
    };
    let mut labels = Vec::new();
    let mut props = Vec::with_capacity(floor.locations.len() + floor.decorations.len());

    for location in floor.locations.iter() {
        let painter = styles.painter_for(location, floor.style);
        let art = painter(&MarkerContext {
            location,
            floor,
            anchor: floor.projector.project(location.grid),
        });
        ground.extend(art.ground);
        labels.extend(art.labels);
        props.push(PropEntry {
            grid: location.grid,
            drawables: art.props,
        });
        let region = world.add_hit_region(art.hit_rect);
        actions.insert(region, HitAction::MoveTo(location.key.clone()));
    }

    for decoration in &floor.decorations {
        let anchor = floor.projector.project(decoration.grid);
        props.push(PropEntry {
            grid: decoration.grid,
            drawables: vec![Drawable::Sprite {
                key: decoration.sprite_type.clone(),
                center: anchor.offset(0.0, -12.0),
                scale: DECORATION_SPRITE_SCALE,
                fallback: decoration_fallback(&decoration.sprite_type, anchor),
            }],
        });
    }
    depth_sort(&mut props);

    if floor.style == FloorStyle::Rooms {
        for (target, row, colors, text) in [
            (floor_index.checked_add(1), 3.0, STAIRS_UP, "UP"),
            (floor_index.checked_sub(1), 6.0, STAIRS_DOWN, "DN"),
        ] {
            let Some(target) = target.filter(|index| is_room_floor(layout, *index)) else {
                continue;
            };
            let (drawables, rect) = stairs(floor, row, colors, text);
            labels.extend(drawables);
            let region = world.add_hit_region(rect);
            actions.insert(region, HitAction::ChangeFloor(target));
        }
    }
    labels.push(floor_title(&floor.name, hud_strip.width));

    for (index, rect) in floor_nav_buttons(layout, hud_strip) {
        let region = world.add_hit_region(rect);
        actions.insert(region, HitAction::ChangeFloor(index));
    }

    world.extend_layer(layers.ground, ground);
    world.extend_layer(
        layers.props,
        props.into_iter().flat_map(|entry| entry.drawables),
    );
    world.extend_layer(layers.markers, labels);

    info!(
        floor = %floor.key,
        locations = floor.locations.len(),
        drawables = world.drawable_count(),
        hit_regions = world.hit_region_count(),
        "floor_built"
    );
    Some(BuiltFloor { layers, actions })
}

fn is_room_floor(layout: &VillageLayout, index: usize) -> bool {
    layout
        .floor(index)
        .is_some_and(|floor| floor.style == FloorStyle::Rooms)
}

fn floor_title(name: &str, scene_width: f32) -> Drawable {
    let style = TextStyle::default();
    Drawable::Text {
        position: Vec2::new((scene_width - style.text_width(name) as f32) * 0.5, 6.0),
        text: name.to_string(),
        style,
    }
}

fn grid_rect(floor: &Floor, x: f32, y: f32, w: f32, h: f32) -> ScreenRect {
    let (cell_w, cell_h) = floor.projector.projection().cell_size();
    let top_left = floor.projector.project(GridPos::new(x, y));
    ScreenRect::new(top_left.x, top_left.y, w * cell_w, h * cell_h)
}

fn room_ground(floor: &Floor) -> Vec<Drawable> {
    let (w, h) = (floor.size.0 as f32, floor.size.1 as f32);
    let (cell_w, cell_h) = floor.projector.projection().cell_size();
    let mut drawables = vec![Drawable::Rect {
        rect: grid_rect(floor, 0.0, 0.0, w, h),
        color: floor.background,
    }];

    for y in 1..floor.size.1.saturating_sub(1) {
        for x in 1..floor.size.0.saturating_sub(1) {
            let cell = grid_rect(floor, x as f32, y as f32, 1.0, 1.0);
            drawables.push(Drawable::Rect {
                rect: ScreenRect::new(cell.x, cell.y, cell.width - 1.0, cell.height - 1.0),
                color: darken(floor.ground, ((x + y) % 2) as f32 * 5.0),
            });
        }
    }

    for (rect, color) in [
        (grid_rect(floor, 0.0, 0.0, w, 1.0), WALL),
        (grid_rect(floor, 0.0, h - 1.0, w, 1.0), WALL_BOTTOM),
        (grid_rect(floor, 0.0, 0.0, 1.0, h), WALL),
        (grid_rect(floor, w - 1.0, 0.0, 1.0, h), WALL),
    ] {
        drawables.push(Drawable::Rect { rect, color });
    }

    for fraction in [2.0 / 7.0, 5.0 / 7.0] {
        let center = floor
            .projector
            .project(GridPos::new((w * fraction).round(), 0.5));
        drawables.push(Drawable::Rect {
            rect: ScreenRect::from_center(center, 4.0 * cell_w, cell_h - 8.0),
            color: WINDOW,
        });
    }
    drawables
}

fn village_ground(floor: &Floor) -> Vec<Drawable> {
    let (cell_w, cell_h) = floor.projector.projection().cell_size();
    let mut drawables = Vec::with_capacity(floor.size.0 as usize * floor.size.1 as usize);
    for y in 0..floor.size.1 {
        for x in 0..floor.size.0 {
            drawables.push(Drawable::Diamond {
                center: floor.projector.project(GridPos::new(x as f32, y as f32)),
                half_width: cell_w * 0.5,
                half_height: cell_h * 0.5,
                color: darken(floor.ground, ((x + y) % 2) as f32 * 6.0),
            });
        }
    }
    drawables
}

fn stairs(
    floor: &Floor,
    row: f32,
    (fill, outline): ([u8; 4], [u8; 4]),
    text: &str,
) -> (Vec<Drawable>, ScreenRect) {
    let (cell_w, cell_h) = floor.projector.projection().cell_size();
    let center = floor
        .projector
        .project(GridPos::new(floor.size.0 as f32 - 2.0, row));
    let rect = ScreenRect::from_center(center, cell_w * 1.5, cell_h * 2.0);
    let style = TextStyle::default();
    let drawables = vec![
        Drawable::Rect { rect, color: fill },
        Drawable::RectOutline {
            rect,
            thickness: 2,
            color: outline,
        },
        Drawable::Text {
            position: Vec2::new(
                center.x - style.text_width(text) as f32 * 0.5,
                center.y - style.line_height() as f32 * 0.5,
            ),
            text: text.to_string(),
            style,
        },
    ];
    (drawables, rect)
}

fn label(text: &str, left: f32, top: f32) -> Drawable {
    Drawable::Text {
        position: Vec2::new(left, top),
        text: text.to_string(),
        style: TextStyle {
            scale: 1,
            ..TextStyle::default()
        },
    }
}

fn centered_label(text: &str, center_x: f32, top: f32) -> Drawable {
    let width = TextStyle {
        scale: 1,
        ..TextStyle::default()
    }
    .text_width(text) as f32;
    label(text, center_x - width * 0.5, top)
}

fn paint_zone(ctx: &MarkerContext<'_>) -> MarkerArt {
    let location = ctx.location;
    let area = location.area.unwrap_or(GridArea {
        x: location.grid.x - 2.0,
        y: location.grid.y - 2.0,
        w: 4.0,
        h: 4.0,
    });
    let outer = grid_rect(ctx.floor, area.x, area.y, area.w, area.h);
    let zone = outer.inset(4.0);
    let accent = ctx.accent();

    MarkerArt {
        ground: vec![
            Drawable::Rect {
                rect: zone,
                color: with_alpha(accent, 64),
            },
            Drawable::RectOutline {
                rect: zone,
                thickness: 2,
                color: with_alpha(accent, 204),
            },
        ],
        props: furniture(ctx, outer, area.w, area.h),
        labels: vec![label(&location.display_name, outer.x + 8.0, outer.y + 8.0)],
        hit_rect: zone,
    }
}

/// Up to three pieces scattered inside the zone, stable for a given key.
fn furniture(ctx: &MarkerContext<'_>, outer: ScreenRect, w: f32, h: f32) -> Vec<Drawable> {
    let (cell_w, cell_h) = ctx.floor.projector.projection().cell_size();
    let count = ((w * h / 15.0).floor() as usize).min(3);
    let center = outer.center();
    let color = darken(ctx.accent(), 30.0);
    let mut scatter = Scatter::seeded(&ctx.location.key);
    (0..count)
        .map(|_| {
            let dx = (scatter.next_unit() - 0.5) * (w - 2.0).max(0.0) * cell_w;
            let dy = (scatter.next_unit() - 0.5) * (h - 2.0).max(0.0) * cell_h;
            let size = 15.0 + scatter.next_unit() * 20.0;
            let depth = size * (0.5 + scatter.next_unit() * 0.5);
            Drawable::Rect {
                rect: ScreenRect::from_center(center.offset(dx, dy), size, depth),
                color,
            }
        })
        .collect()
}

fn paint_pin(ctx: &MarkerContext<'_>) -> MarkerArt {
    let anchor = ctx.anchor;
    let accent = ctx.accent();
    MarkerArt {
        ground: Vec::new(),
        props: vec![
            Drawable::Ellipse {
                center: anchor,
                radius_x: 8.0,
                radius_y: 4.0,
                color: SHADOW,
            },
            Drawable::Circle {
                center: anchor.offset(0.0, -10.0),
                radius: 6.0,
                color: accent,
            },
            Drawable::Circle {
                center: anchor.offset(0.0, -10.0),
                radius: 2.0,
                color: [255, 255, 255, 255],
            },
        ],
        labels: vec![centered_label(
            &ctx.location.display_name,
            anchor.x,
            anchor.y + 6.0,
        )],
        hit_rect: ScreenRect::from_center(anchor.offset(0.0, -8.0), 28.0, 28.0),
    }
}

struct BuildingArt {
    sprite_key: &'static str,
    walls: [u8; 4],
    roof: [u8; 4],
    width: f32,
    height: f32,
}

const SMALL_HOUSE: BuildingArt = BuildingArt {
    sprite_key: "houses/small_house",
    walls: [0xd9, 0xb3, 0x8c, 255],
    roof: [0xb0, 0x3a, 0x2e, 255],
    width: 36.0,
    height: 26.0,
};
const MEDIUM_HOUSE: BuildingArt = BuildingArt {
    sprite_key: "houses/medium_house",
    walls: [0xe0, 0xc9, 0xa6, 255],
    roof: [0x6d, 0x4c, 0x41, 255],
    width: 42.0,
    height: 30.0,
};
const LARGE_HOUSE: BuildingArt = BuildingArt {
    sprite_key: "houses/large_house",
    walls: [0xc8, 0xa2, 0x7a, 255],
    roof: [0x3e, 0x5c, 0x76, 255],
    width: 50.0,
    height: 36.0,
};
const TAVERN: BuildingArt = BuildingArt {
    sprite_key: "houses/large_house",
    walls: [0x8b, 0x5a, 0x2b, 255],
    roof: [0x5d, 0x2e, 0x0c, 255],
    width: 52.0,
    height: 34.0,
};
const SHOP: BuildingArt = BuildingArt {
    sprite_key: "houses/medium_house",
    walls: [0xf0, 0xe6, 0xd2, 255],
    roof: [0x27, 0xae, 0x60, 255],
    width: 40.0,
    height: 28.0,
};

fn paint_small_house(ctx: &MarkerContext<'_>) -> MarkerArt {
    paint_building(ctx, &SMALL_HOUSE)
}

fn paint_medium_house(ctx: &MarkerContext<'_>) -> MarkerArt {
    paint_building(ctx, &MEDIUM_HOUSE)
}

fn paint_large_house(ctx: &MarkerContext<'_>) -> MarkerArt {
    paint_building(ctx, &LARGE_HOUSE)
}

fn paint_tavern(ctx: &MarkerContext<'_>) -> MarkerArt {
    paint_building(ctx, &TAVERN)
}

fn paint_shop(ctx: &MarkerContext<'_>) -> MarkerArt {
    paint_building(ctx, &SHOP)
}

fn paint_building(ctx: &MarkerContext<'_>, art: &BuildingArt) -> MarkerArt {
    let anchor = ctx.anchor;
    let (w, h) = (art.width, art.height);
    let fallback = vec![
        Drawable::Ellipse {
            center: anchor,
            radius_x: w * 0.6,
            radius_y: h * 0.2,
            color: SHADOW,
        },
        Drawable::Rect {
            rect: ScreenRect::new(anchor.x - w * 0.5, anchor.y - h, w, h),
            color: art.walls,
        },
        Drawable::Diamond {
            center: anchor.offset(0.0, -h),
            half_width: w * 0.65,
            half_height: h * 0.45,
            color: art.roof,
        },
        Drawable::Rect {
            rect: ScreenRect::new(anchor.x - 4.0, anchor.y - 12.0, 8.0, 12.0),
            color: darken(art.walls, 55.0),
        },
    ];
    let roof_top = anchor.y - h - h * 0.45;
    MarkerArt {
        ground: Vec::new(),
        props: vec![Drawable::Sprite {
            key: art.sprite_key.to_string(),
            center: anchor.offset(0.0, -h * 0.6),
            scale: BUILDING_SPRITE_SCALE,
            fallback,
        }],
        labels: vec![centered_label(
            &ctx.location.display_name,
            anchor.x,
            anchor.y + 6.0,
        )],
        hit_rect: ScreenRect::new(
            anchor.x - w * 0.65,
            roof_top,
            w * 1.3,
            anchor.y - roof_top + 4.0,
        ),
    }
}

fn paint_well(ctx: &MarkerContext<'_>) -> MarkerArt {
    let anchor = ctx.anchor;
    let fallback = vec![
        Drawable::Ellipse {
            center: anchor,
            radius_x: 12.0,
            radius_y: 6.0,
            color: [0x7f, 0x8c, 0x8d, 255],
        },
        Drawable::Ellipse {
            center: anchor,
            radius_x: 8.0,
            radius_y: 3.0,
            color: [0x1f, 0x3a, 0x5f, 255],
        },
        Drawable::Rect {
            rect: ScreenRect::new(anchor.x - 10.0, anchor.y - 22.0, 2.0, 20.0),
            color: [0x6d, 0x4c, 0x41, 255],
        },
        Drawable::Rect {
            rect: ScreenRect::new(anchor.x + 8.0, anchor.y - 22.0, 2.0, 20.0),
            color: [0x6d, 0x4c, 0x41, 255],
        },
        Drawable::Diamond {
            center: anchor.offset(0.0, -24.0),
            half_width: 14.0,
            half_height: 6.0,
            color: [0xb0, 0x3a, 0x2e, 255],
        },
    ];
    MarkerArt {
        ground: Vec::new(),
        props: vec![Drawable::Sprite {
            key: "houses/well".to_string(),
            center: anchor.offset(0.0, -12.0),
            scale: BUILDING_SPRITE_SCALE,
            fallback,
        }],
        labels: vec![centered_label(
            &ctx.location.display_name,
            anchor.x,
            anchor.y + 8.0,
        )],
        hit_rect: ScreenRect::from_center(anchor.offset(0.0, -12.0), 32.0, 36.0),
    }
}

fn paint_fountain(ctx: &MarkerContext<'_>) -> MarkerArt {
    let anchor = ctx.anchor;
    let fallback = vec![
        Drawable::Ellipse {
            center: anchor,
            radius_x: 20.0,
            radius_y: 10.0,
            color: [0x95, 0xa5, 0xa6, 255],
        },
        Drawable::Ellipse {
            center: anchor,
            radius_x: 16.0,
            radius_y: 7.0,
            color: [0x34, 0x98, 0xdb, 255],
        },
        Drawable::Rect {
            rect: ScreenRect::new(anchor.x - 2.0, anchor.y - 14.0, 4.0, 12.0),
            color: [0x95, 0xa5, 0xa6, 255],
        },
        Drawable::Circle {
            center: anchor.offset(0.0, -16.0),
            radius: 4.0,
            color: [0xaf, 0xe3, 0xff, 255],
        },
    ];
    MarkerArt {
        ground: Vec::new(),
        props: vec![Drawable::Sprite {
            key: "houses/well".to_string(),
            center: anchor.offset(0.0, -6.0),
            scale: DECORATION_SPRITE_SCALE,
            fallback,
        }],
        labels: vec![centered_label(
            &ctx.location.display_name,
            anchor.x,
            anchor.y + 12.0,
        )],
        hit_rect: ScreenRect::from_center(anchor.offset(0.0, -6.0), 44.0, 32.0),
    }
}

fn paint_park(ctx: &MarkerContext<'_>) -> MarkerArt {
    let anchor = ctx.anchor;
    let (cell_w, cell_h) = ctx.floor.projector.projection().cell_size();
    let lawn = with_alpha(ctx.location.color.unwrap_or([0x2e, 0xcc, 0x71, 255]), 160);
    let mut props = Vec::new();
    for (dx, dy) in [(-14.0, -4.0), (12.0, -8.0), (2.0, 6.0)] {
        let base = anchor.offset(dx, dy);
        props.extend(tree(base, [0x27, 0xae, 0x60, 255]));
    }
    MarkerArt {
        ground: vec![Drawable::Diamond {
            center: anchor,
            half_width: cell_w,
            half_height: cell_h,
            color: lawn,
        }],
        props,
        labels: vec![centered_label(
            &ctx.location.display_name,
            anchor.x,
            anchor.y + cell_h,
        )],
        hit_rect: ScreenRect::from_center(anchor, cell_w * 2.0, cell_h * 2.0),
    }
}

fn tree(base: Vec2, canopy: [u8; 4]) -> [Drawable; 2] {
    [
        Drawable::Rect {
            rect: ScreenRect::new(base.x - 2.0, base.y - 10.0, 4.0, 10.0),
            color: [0x6d, 0x4c, 0x41, 255],
        },
        Drawable::Circle {
            center: base.offset(0.0, -16.0),
            radius: 9.0,
            color: canopy,
        },
    ]
}

fn decoration_fallback(sprite_type: &str, anchor: Vec2) -> Vec<Drawable> {
    let name = sprite_type.rsplit('/').next().unwrap_or(sprite_type);
    if name.contains("tree") {
        let canopy = if name.contains("autumn") {
            [0xe6, 0x7e, 0x22, 255]
        } else {
            [0x27, 0xae, 0x60, 255]
        };
        return tree(anchor, canopy).to_vec();
    }
    if name.contains("rock") || name.contains("stone") {
        return vec![Drawable::Ellipse {
            center: anchor.offset(0.0, -3.0),
            radius_x: 7.0,
            radius_y: 5.0,
            color: [0x7f, 0x8c, 0x8d, 255],
        }];
    }
    if name.contains("bush") {
        return vec![Drawable::Ellipse {
            center: anchor.offset(0.0, -4.0),
            radius_x: 9.0,
            radius_y: 6.0,
            color: [0x1e, 0x84, 0x49, 255],
        }];
    }
    if name.contains("flower") {
        return [(-3.0, 0.0), (3.0, -1.0), (0.0, -4.0)]
            .into_iter()
            .map(|(dx, dy)| Drawable::Circle {
                center: anchor.offset(dx, dy),
                radius: 2.0,
                color: [0xf1, 0xc4, 0x0f, 255],
            })
            .collect();
    }
    if name.contains("lamp") {
        return vec![
            Drawable::Rect {
                rect: ScreenRect::new(anchor.x - 1.0, anchor.y - 20.0, 2.0, 20.0),
                color: [0x2c, 0x3e, 0x50, 255],
            },
            Drawable::Circle {
                center: anchor.offset(0.0, -22.0),
                radius: 3.0,
                color: [0xf9, 0xe7, 0x9f, 255],
            },
        ];
    }
    vec![Drawable::Rect {
        rect: ScreenRect::from_center(anchor.offset(0.0, -5.0), 10.0, 10.0),
        color: [0x8b, 0x5a, 0x2b, 255],
    }]
}

fn with_alpha(color: [u8; 4], alpha: u8) -> [u8; 4] {
    [color[0], color[1], color[2], alpha]
}

fn darken(color: [u8; 4], percent: f32) -> [u8; 4] {
    let factor = (1.0 - percent / 100.0).clamp(0.0, 1.0);
    [
        (color[0] as f32 * factor).round() as u8,
        (color[1] as f32 * factor).round() as u8,
        (color[2] as f32 * factor).round() as u8,
        color[3],
    ]
}

/// FNV-1a seeded xorshift; only used for stable furniture placement.
struct Scatter(u64);

impl Scatter {
    fn seeded(key: &str) -> Self {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in key.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Self(hash.max(1))
    }

    fn next_unit(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 40) as f32 / (1u64 << 24) as f32
    }
}
