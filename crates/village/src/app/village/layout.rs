use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{GridPos, GridPositioned, Projection, Projector, Vec2};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    #[error("failed to read layout file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse layout {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("layout defines no floors")]
    NoFloors,
    #[error("duplicate floor key '{key}'")]
    DuplicateFloor { key: String },
    #[error("floor '{floor}' defines no locations")]
    EmptyFloor { floor: String },
    #[error("floor '{floor}' defines location '{key}' more than once")]
    DuplicateLocation { floor: String, key: String },
    #[error("location '{key}' on floor '{floor}' needs either x/y or an area")]
    MissingPosition { floor: String, key: String },
    #[error("invalid color '{value}' at {context}; expected #rrggbb or #rrggbbaa")]
    InvalidColor { context: String, value: String },
    #[error("floor '{floor}' has invalid size {size:?}; each side must be 1..={MAX_FLOOR_SIDE}")]
    InvalidSize { floor: String, size: (u32, u32) },
    #[error("start floor '{floor}' does not exist")]
    UnknownStartFloor { floor: String },
    #[error("start location '{location}' does not exist on floor '{floor}'")]
    UnknownStartLocation { floor: String, location: String },
}

/// Grid-space rectangle; `x`/`y` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub(crate) struct GridArea {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) w: f32,
    pub(crate) h: f32,
}

impl GridArea {
    pub(crate) fn center(&self) -> GridPos {
        GridPos::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Location {
    pub(crate) key: String,
    pub(crate) grid: GridPos,
    pub(crate) display_name: String,
    pub(crate) activity_text: String,
    pub(crate) kind: Option<String>,
    pub(crate) area: Option<GridArea>,
    pub(crate) color: Option<[u8; 4]>,
}

impl Location {
    #[cfg(test)]
    pub(crate) fn new(key: &str, x: f32, y: f32, display_name: &str, activity_text: &str) -> Self {
        Self {
            key: key.to_string(),
            grid: GridPos::new(x, y),
            display_name: display_name.to_string(),
            activity_text: activity_text.to_string(),
            kind: None,
            area: None,
            color: None,
        }
    }
}

impl GridPositioned for Location {
    fn grid_position(&self) -> GridPos {
        self.grid
    }
}

/// Ordered, read-only key -> location mapping for one floor.
#[derive(Debug, Clone)]
pub(crate) struct LocationSet {
    locations: Vec<Location>,
    index: HashMap<String, usize>,
}

impl LocationSet {
    pub(crate) fn new(floor: &str, locations: Vec<Location>) -> Result<Self, LayoutError> {
        if locations.is_empty() {
            return Err(LayoutError::EmptyFloor {
                floor: floor.to_string(),
            });
        }
        let mut index = HashMap::with_capacity(locations.len());
        for (position, location) in locations.iter().enumerate() {
            if index.insert(location.key.clone(), position).is_some() {
                return Err(LayoutError::DuplicateLocation {
                    floor: floor.to_string(),
                    key: location.key.clone(),
                });
            }
        }
        Ok(Self { locations, index })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Location> {
        self.index
            .get(key)
            .and_then(|position| self.locations.get(*position))
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.locations.iter().map(|location| location.key.as_str())
    }

    pub(crate) fn first(&self) -> &Location {
        // Construction rejects empty sets.
        &self.locations[0]
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.locations.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.locations.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoration {
    pub(crate) grid: GridPos,
    pub(crate) sprite_type: String,
}

impl GridPositioned for Decoration {
    fn grid_position(&self) -> GridPos {
        self.grid
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FloorStyle {
    /// Walled interior with rectangular zones on a flat grid.
    #[default]
    Rooms,
    /// Open isometric ground with buildings and decorations.
    Village,
}

#[derive(Debug, Clone)]
pub(crate) struct Floor {
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) style: FloorStyle,
    pub(crate) projector: Projector,
    pub(crate) background: [u8; 4],
    pub(crate) ground: [u8; 4],
    pub(crate) size: (u32, u32),
    pub(crate) locations: LocationSet,
    pub(crate) decorations: Vec<Decoration>,
}

impl Floor {
    #[cfg(test)]
    pub(crate) fn location_screen_position(&self, key: &str) -> Option<Vec2> {
        self.locations
            .get(key)
            .map(|location| self.projector.project(location.grid))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VillageLayout {
    floors: Vec<Floor>,
    start_floor: usize,
    start_location: String,
}

impl VillageLayout {
    pub(crate) fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub(crate) fn floor(&self, index: usize) -> Option<&Floor> {
        self.floors.get(index)
    }

    pub(crate) fn floor_index(&self, key: &str) -> Option<usize> {
        self.floors.iter().position(|floor| floor.key == key)
    }

    pub(crate) fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub(crate) fn start_floor(&self) -> usize {
        self.start_floor
    }

    pub(crate) fn start_location(&self) -> &str {
        &self.start_location
    }
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    start: RawStart,
    floors: Vec<RawFloor>,
}

#[derive(Debug, Deserialize)]
struct RawStart {
    floor: String,
    location: String,
}

#[derive(Debug, Deserialize)]
struct RawFloor {
    key: String,
    name: String,
    #[serde(default)]
    style: FloorStyle,
    projection: Projection,
    #[serde(default)]
    origin: Vec2,
    #[serde(default = "default_floor_size")]
    size: (u32, u32),
    background: String,
    ground: String,
    locations: Vec<RawLocation>,
    #[serde(default)]
    decorations: Vec<RawDecoration>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    key: String,
    name: String,
    #[serde(default)]
    activity: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    area: Option<GridArea>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDecoration {
    x: f32,
    y: f32,
    sprite: String,
}

/// Largest grid side a floor may declare, in cells.
pub(crate) const MAX_FLOOR_SIDE: u32 = 256;

fn default_floor_size() -> (u32, u32) {
    (28, 20)
}

pub(crate) fn load_layout(path: &Path) -> Result<VillageLayout, LayoutError> {
    let raw = fs::read_to_string(path).map_err(|source| LayoutError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout(&raw, path)
}

pub(crate) fn parse_layout(raw: &str, path: &Path) -> Result<VillageLayout, LayoutError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let layout: RawLayout =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            LayoutError::Parse {
                path: path.to_path_buf(),
                json_path,
                source: error.into_inner(),
            }
        })?;
    validate_layout(layout)
}

fn validate_layout(raw: RawLayout) -> Result<VillageLayout, LayoutError> {
    if raw.floors.is_empty() {
        return Err(LayoutError::NoFloors);
    }
    let mut seen = HashSet::new();
    let mut floors = Vec::with_capacity(raw.floors.len());
    for (floor_index, raw_floor) in raw.floors.into_iter().enumerate() {
        if !seen.insert(raw_floor.key.clone()) {
            return Err(LayoutError::DuplicateFloor { key: raw_floor.key });
        }
        floors.push(build_floor(floor_index, raw_floor)?);
    }

    let start_floor = floors
        .iter()
        .position(|floor| floor.key == raw.start.floor)
        .ok_or_else(|| LayoutError::UnknownStartFloor {
            floor: raw.start.floor.clone(),
        })?;
    if !floors[start_floor].locations.contains(&raw.start.location) {
        return Err(LayoutError::UnknownStartLocation {
            floor: raw.start.floor,
            location: raw.start.location,
        });
    }

    Ok(VillageLayout {
        floors,
        start_floor,
        start_location: raw.start.location,
    })
}

fn build_floor(floor_index: usize, raw: RawFloor) -> Result<Floor, LayoutError> {
    let (width, height) = raw.size;
    if !(1..=MAX_FLOOR_SIDE).contains(&width) || !(1..=MAX_FLOOR_SIDE).contains(&height) {
        return Err(LayoutError::InvalidSize {
            floor: raw.key,
            size: raw.size,
        });
    }
    let background = parse_hex_color(
        &raw.background,
        || format!("floors[{floor_index}].background"),
    )?;
    let ground = parse_hex_color(&raw.ground, || format!("floors[{floor_index}].ground"))?;

    let mut locations = Vec::with_capacity(raw.locations.len());
    for (location_index, location) in raw.locations.into_iter().enumerate() {
        let grid = match (location.area, location.x, location.y) {
            (Some(area), _, _) => area.center(),
            (None, Some(x), Some(y)) => GridPos::new(x, y),
            _ => {
                return Err(LayoutError::MissingPosition {
                    floor: raw.key,
                    key: location.key,
                })
            }
        };
        let color = location
            .color
            .as_deref()
            .map(|value| {
                parse_hex_color(value, || {
                    format!("floors[{floor_index}].locations[{location_index}].color")
                })
            })
            .transpose()?;
        locations.push(Location {
            key: location.key,
            grid,
            display_name: location.name,
            activity_text: location.activity,
            kind: location.kind,
            area: location.area,
            color,
        });
    }

    let decorations = raw
        .decorations
        .into_iter()
        .map(|decoration| Decoration {
            grid: GridPos::new(decoration.x, decoration.y),
            sprite_type: decoration.sprite,
        })
        .collect();

    Ok(Floor {
        locations: LocationSet::new(&raw.key, locations)?,
        key: raw.key,
        name: raw.name,
        style: raw.style,
        projector: Projector::new(raw.projection, raw.origin),
        background,
        ground,
        size: raw.size,
        decorations,
    })
}

pub(crate) fn parse_hex_color(
    value: &str,
    context: impl FnOnce() -> String,
) -> Result<[u8; 4], LayoutError> {
    let invalid = |context: String| LayoutError::InvalidColor {
        context,
        value: value.to_string(),
    };
    let Some(digits) = value.strip_prefix('#') else {
        return Err(invalid(context()));
    };
    if !(digits.len() == 6 || digits.len() == 8)
        || !digits.chars().all(|ch| ch.is_ascii_hexdigit())
    {
        return Err(invalid(context()));
    }
    let mut color = [255u8; 4];
    for (slot, start) in color.iter_mut().zip((0..digits.len()).step_by(2)) {
        match u8::from_str_radix(&digits[start..start + 2], 16) {
            Ok(channel) => *slot = channel,
            Err(_) => return Err(invalid(context())),
        }
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_layout_json() -> serde_json::Value {
        json!({
            "start": { "floor": "ground", "location": "desk" },
            "floors": [
                {
                    "key": "ground",
                    "name": "Office",
                    "projection": { "kind": "grid", "tile_size": 24 },
                    "background": "#2c3e50",
                    "ground": "#8b7355",
                    "locations": [
                        { "key": "desk", "name": "Desk", "activity": "Working hard...",
                          "kind": "zone", "area": { "x": 2, "y": 2, "w": 7, "h": 5 },
                          "color": "#3498db" },
                        { "key": "meeting", "name": "Meeting Room",
                          "area": { "x": 11, "y": 2, "w": 7, "h": 5 } }
                    ]
                },
                {
                    "key": "village",
                    "name": "Village",
                    "style": "village",
                    "projection": { "kind": "isometric", "tile_width": 64, "tile_height": 32 },
                    "origin": { "x": 336, "y": 40 },
                    "background": "#1a1a2e",
                    "ground": "#4caf50",
                    "locations": [
                        { "key": "home", "name": "Home", "kind": "house", "x": 3, "y": 3 },
                        { "key": "shop", "name": "Shop", "kind": "tavern", "x": 7, "y": 2 }
                    ],
                    "decorations": [ { "x": 1, "y": 5, "sprite": "objects/green_tree" } ]
                }
            ]
        })
    }

    fn parse(value: &serde_json::Value) -> Result<VillageLayout, LayoutError> {
        parse_layout(&value.to_string(), Path::new("village.json"))
    }

    #[test]
    fn parses_floors_locations_and_start() {
        let layout = parse(&sample_layout_json()).expect("layout");

        assert_eq!(layout.floor_count(), 2);
        assert_eq!(layout.start_floor(), 0);
        assert_eq!(layout.start_location(), "desk");
        assert_eq!(layout.floor_index("village"), Some(1));

        let ground = layout.floor(0).expect("ground");
        let desk = ground.locations.get("desk").expect("desk");
        assert_eq!(desk.grid, GridPos::new(5.5, 4.5));
        assert_eq!(desk.color, Some([0x34, 0x98, 0xdb, 255]));
        assert_eq!(desk.kind.as_deref(), Some("zone"));
        assert_eq!(
            ground.locations.get("meeting").map(|l| l.activity_text.as_str()),
            Some("")
        );

        let village = layout.floor(1).expect("village");
        assert_eq!(village.style, FloorStyle::Village);
        assert_eq!(
            village.location_screen_position("shop"),
            Some(Vec2::new(336.0 + 160.0, 40.0 + 144.0))
        );
        assert_eq!(village.decorations.len(), 1);
    }

    #[test]
    fn location_lookup_reports_missing_keys() {
        let layout = parse(&sample_layout_json()).expect("layout");
        let locations = &layout.floor(0).expect("ground").locations;

        assert!(locations.get("nonexistent").is_none());
        assert_eq!(locations.keys().collect::<Vec<_>>(), vec!["desk", "meeting"]);
        assert_eq!(locations.first().key, "desk");
        assert_eq!(locations.len(), 2);
    }

    #[test]
    fn duplicate_location_keys_are_rejected() {
        let result = LocationSet::new(
            "ground",
            vec![
                Location::new("home", 0.0, 0.0, "Home", ""),
                Location::new("home", 1.0, 1.0, "Home again", ""),
            ],
        );
        assert!(matches!(
            result,
            Err(LayoutError::DuplicateLocation { key, .. }) if key == "home"
        ));
    }

    #[test]
    fn empty_location_set_is_rejected() {
        assert!(matches!(
            LocationSet::new("ground", Vec::new()),
            Err(LayoutError::EmptyFloor { .. })
        ));
    }

    #[test]
    fn unknown_start_location_is_rejected() {
        let mut value = sample_layout_json();
        value["start"]["location"] = json!("rooftop_bar");
        assert!(matches!(
            parse(&value),
            Err(LayoutError::UnknownStartLocation { location, .. }) if location == "rooftop_bar"
        ));
    }

    #[test]
    fn location_without_position_is_rejected() {
        let mut value = sample_layout_json();
        value["floors"][1]["locations"][0] = json!({ "key": "home", "name": "Home", "x": 3 });
        assert!(matches!(
            parse(&value),
            Err(LayoutError::MissingPosition { key, .. }) if key == "home"
        ));
    }

    #[test]
    fn parse_error_carries_json_path() {
        let mut value = sample_layout_json();
        value["floors"][1]["projection"] = json!({ "kind": "hexagonal" });
        match parse(&value) {
            Err(LayoutError::Parse { json_path, .. }) => {
                assert!(json_path.starts_with("floors[1].projection"), "{json_path}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn hex_colors_accept_optional_alpha() {
        assert_eq!(
            parse_hex_color("#0a0B0c", String::new).expect("rgb"),
            [10, 11, 12, 255]
        );
        assert_eq!(
            parse_hex_color("#01020380", String::new).expect("rgba"),
            [1, 2, 3, 128]
        );
        for bad in ["0a0b0c", "#abc", "#gg0000", "#0a0b0c0"] {
            assert!(parse_hex_color(bad, String::new).is_err(), "{bad}");
        }
    }

    #[test]
    fn bad_floor_color_names_its_field() {
        let mut value = sample_layout_json();
        value["floors"][0]["ground"] = json!("brown");
        match parse(&value) {
            Err(LayoutError::InvalidColor { context, value }) => {
                assert_eq!(context, "floors[0].ground");
                assert_eq!(value, "brown");
            }
            other => panic!("expected color error, got {other:?}"),
        }
    }

    #[test]
    fn floor_size_must_fit_the_grid_cap() {
        for size in [json!([70000, 70000]), json!([0, 10]), json!([10, 257])] {
            let mut value = sample_layout_json();
            value["floors"][1]["size"] = size.clone();
            assert!(
                matches!(
                    parse(&value),
                    Err(LayoutError::InvalidSize { floor, .. }) if floor == "village"
                ),
                "{size}"
            );
        }

        let mut value = sample_layout_json();
        value["floors"][1]["size"] = json!([MAX_FLOOR_SIDE, MAX_FLOOR_SIDE]);
        let layout = parse(&value).expect("largest floor");
        assert_eq!(layout.floors()[1].size, (MAX_FLOOR_SIDE, MAX_FLOOR_SIDE));
    }

    #[test]
    fn shipped_layout_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/base/village.json");
        let layout = load_layout(&path).expect("shipped layout");

        let keys: Vec<&str> = layout.floors().iter().map(|floor| floor.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["village", "basement", "ground", "floor1", "floor2", "rooftop"]
        );
        assert_eq!(layout.floors()[layout.start_floor()].key, "ground");
        assert_eq!(layout.start_location(), "desk");
    }
}
