//! Level loading
//!
//! Two JSON documents describe a level:
//! - the level file: grid size, start cell, offscreen buffer and lanes bottom
//!   to top, each with a type, an optional speed and its objects
//! - the asset file: hitboxes and sizes for every image and sprite sheet
//!
//! Bad data fails here, at load time. The simulation assumes what it gets is
//! valid.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FROG_SPRITE, GRID_SIZE};
use crate::settings::Settings;
use crate::sim::{Aabb, Exits, FrogSprite, Lane, LaneKind, Level, Obstacle, Traffic};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("level grid is empty ({width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("level has {found} lanes but is {expected} cells tall")]
    LaneCount { expected: u32, found: usize },
    #[error("start cell {0} is outside the grid")]
    StartOutOfBounds(IVec2),
    #[error("lane {lane} is {kind} but has no speed")]
    MissingSpeed { lane: usize, kind: &'static str },
    #[error("unknown image `{0}`")]
    UnknownImage(String),
    #[error("unknown sprite `{0}`")]
    UnknownSprite(String),
    #[error("`{0}` has an empty hitbox")]
    EmptyHitbox(String),
}

/// Lane type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneType {
    Grass,
    Road,
    Water,
    Hedge,
}

/// An object placed in a lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    /// Image name
    #[serde(rename = "type")]
    pub kind: String,
    /// Grid column (may be fractional)
    pub position: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneDef {
    #[serde(rename = "type")]
    pub kind: LaneType,
    /// Signed pixels per second
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

/// Level file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    /// Width and height in cells
    pub size: [u32; 2],
    /// Start cell
    pub start: [i32; 2],
    /// Grid cells of slack before moving obstacles wrap
    #[serde(default)]
    pub offscreen: f32,
    /// Bottom to top
    pub lanes: Vec<LaneDef>,
}

impl LevelDef {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Hitbox geometry, relative to the image center
///
/// Accepts a `[width, height]` pair, a list of `[x, y]` points, or a flat
/// `[x0, y0, x1, y1, ...]` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HitboxDef {
    Size([f32; 2]),
    Points(Vec<[f32; 2]>),
    Flat(Vec<f32>),
}

impl HitboxDef {
    pub fn to_aabb(&self) -> Option<Aabb> {
        match self {
            HitboxDef::Size([w, h]) => Some(Aabb::from_center(Vec2::ZERO, Vec2::new(*w, *h))),
            HitboxDef::Points(points) => {
                let points: Vec<Vec2> = points.iter().map(|p| Vec2::from_array(*p)).collect();
                Aabb::from_points(&points)
            }
            HitboxDef::Flat(coords) => {
                let points: Vec<Vec2> = coords
                    .chunks_exact(2)
                    .map(|c| Vec2::new(c[0], c[1]))
                    .collect();
                Aabb::from_points(&points)
            }
        }
    }
}

/// A single image (car, log, hedge slot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDef {
    /// Drawn size in pixels; one grid cell if absent
    #[serde(default)]
    pub size: Option<[f32; 2]>,
    pub hitbox: HitboxDef,
}

/// A sprite sheet (frog, skulls)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteDef {
    /// Rows and columns of the sheet
    pub format: [u32; 2],
    #[serde(default)]
    pub size: Option<[f32; 2]>,
    /// One hitbox per frame
    #[serde(default)]
    pub hitboxes: Vec<HitboxDef>,
}

/// Asset file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDef {
    #[serde(default)]
    pub images: BTreeMap<String, ImageDef>,
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteDef>,
}

impl AssetDef {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    fn image(&self, name: &str) -> Result<(Vec2, Aabb), LoadError> {
        let image = self
            .images
            .get(name)
            .ok_or_else(|| LoadError::UnknownImage(name.to_string()))?;
        let hitbox = image
            .hitbox
            .to_aabb()
            .ok_or_else(|| LoadError::EmptyHitbox(name.to_string()))?;
        Ok((size_or_cell(image.size), hitbox))
    }

    fn frog_sprite(&self) -> Result<FrogSprite, LoadError> {
        let sprite = self
            .sprites
            .get(FROG_SPRITE)
            .ok_or_else(|| LoadError::UnknownSprite(FROG_SPRITE.to_string()))?;
        let hitboxes = sprite
            .hitboxes
            .iter()
            .map(|h| h.to_aabb().ok_or_else(|| LoadError::EmptyHitbox(FROG_SPRITE.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        if hitboxes.is_empty() {
            return Err(LoadError::EmptyHitbox(FROG_SPRITE.to_string()));
        }
        Ok(FrogSprite {
            size: size_or_cell(sprite.size),
            hitboxes,
        })
    }
}

fn size_or_cell(size: Option<[f32; 2]>) -> Vec2 {
    size.map(Vec2::from_array).unwrap_or(Vec2::splat(GRID_SIZE))
}

/// Build a playable level from its descriptions
pub fn build_level(def: &LevelDef, assets: &AssetDef, settings: &Settings) -> Result<Level, LoadError> {
    let [width, height] = def.size;
    if width == 0 || height == 0 {
        return Err(LoadError::EmptyGrid { width, height });
    }
    if def.lanes.len() != height as usize {
        return Err(LoadError::LaneCount {
            expected: height,
            found: def.lanes.len(),
        });
    }
    let start = IVec2::from_array(def.start);
    if start.x < 0 || start.y < 0 || start.x >= width as i32 || start.y >= height as i32 {
        return Err(LoadError::StartOutOfBounds(start));
    }

    let lanes = def
        .lanes
        .iter()
        .enumerate()
        .map(|(row, lane)| build_lane(row, lane, width, def.offscreen, assets))
        .collect::<Result<Vec<_>, _>>()?;
    let sprite = assets.frog_sprite()?;

    log::info!("Loaded {width}x{height} level with {} lanes", lanes.len());
    Ok(Level::new(width, height, start, lanes, sprite)
        .with_lives(settings.lives)
        .with_timing(settings.timing()))
}

fn build_lane(
    row: usize,
    def: &LaneDef,
    width: u32,
    buffer: f32,
    assets: &AssetDef,
) -> Result<Lane, LoadError> {
    let kind = match def.kind {
        LaneType::Grass => LaneKind::Grass,
        LaneType::Hedge => LaneKind::Hedge(Exits::default()),
        LaneType::Road | LaneType::Water => {
            let name = if def.kind == LaneType::Road { "road" } else { "water" };
            let speed = def
                .speed
                .ok_or(LoadError::MissingSpeed { lane: row, kind: name })?;
            let traffic = Traffic { speed, buffer };
            if def.kind == LaneType::Road {
                LaneKind::Road(traffic)
            } else {
                LaneKind::Water(traffic)
            }
        }
    };
    if def.speed.is_some() && matches!(def.kind, LaneType::Grass | LaneType::Hedge) {
        log::warn!("Lane {row} ({}) ignores its speed", kind.name());
    }

    let row_y = (row as f32 + 0.5) * GRID_SIZE;
    let obstacles = def
        .objects
        .iter()
        .map(|obj| {
            let (size, hitbox) = assets.image(&obj.kind)?;
            Ok(Obstacle::new(
                obj.kind.clone(),
                obj.position,
                row_y,
                size,
                hitbox,
                def.speed,
            ))
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    Ok(Lane::new(kind, row as u32, width, obstacles))
}

/// Read both files and build the level
pub fn load_level(level_path: &Path, asset_path: &Path, settings: &Settings) -> Result<Level, LoadError> {
    let def = LevelDef::load(level_path)?;
    let assets = AssetDef::load(asset_path)?;
    build_level(&def, &assets, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::OPENING_KIND;

    const ASSETS: &str = r#"{
        "images": {
            "car1": {"hitbox": [[-30, -20], [30, -20], [30, 20], [-30, 20]]},
            "log3": {"size": [192, 64], "hitbox": [192, 48]},
            "exit": {"hitbox": [64, 64]},
            "open": {"hitbox": [-32, -32, 32, -32, 32, 32, -32, 32]}
        },
        "sprites": {
            "frog": {"format": [1, 5], "hitboxes": [[48, 48], [48, 48], [48, 48], [48, 48], [48, 48]]},
            "skulls": {"format": [1, 8]}
        }
    }"#;

    const LEVEL: &str = r#"{
        "size": [7, 4],
        "start": [3, 0],
        "offscreen": 2,
        "lanes": [
            {"type": "grass"},
            {"type": "road", "speed": -120, "objects": [{"type": "car1", "position": 1}]},
            {"type": "water", "speed": 60, "objects": [{"type": "log3", "position": 2}]},
            {"type": "hedge", "objects": [
                {"type": "exit", "position": 1},
                {"type": "open", "position": 3},
                {"type": "exit", "position": 5}
            ]}
        ]
    }"#;

    fn assets() -> AssetDef {
        AssetDef::from_json(ASSETS).unwrap()
    }

    fn level_def() -> LevelDef {
        LevelDef::from_json(LEVEL).unwrap()
    }

    #[test]
    fn test_build_level() {
        let level = build_level(&level_def(), &assets(), &Settings::default()).unwrap();
        assert_eq!((level.width(), level.height()), (7, 4));
        assert_eq!(level.start(), IVec2::new(3, 0));
        assert_eq!(level.lives(), 3);

        let kinds: Vec<_> = level.lanes().iter().map(|l| l.kind().name()).collect();
        assert_eq!(kinds, ["grass", "road", "water", "hedge"]);

        let car = &level.lanes()[1].obstacles()[0];
        assert!(car.flipped());
        assert_eq!(car.pos(), Vec2::new(96.0, 96.0));
        assert_eq!(car.bounds().size(), Vec2::new(60.0, 40.0));
        assert_eq!(level.lanes()[1].kind(), &LaneKind::Road(Traffic { speed: -120.0, buffer: 2.0 }));

        let log = &level.lanes()[2].obstacles()[0];
        assert_eq!(log.size(), Vec2::new(192.0, 64.0));
        assert!(!log.flipped());

        let hedge = &level.lanes()[3];
        assert_eq!(hedge.obstacles()[1].kind(), OPENING_KIND);
        assert!(hedge.obstacles()[1].is_opening());
    }

    #[test]
    fn test_settings_flow_into_level() {
        let settings = Settings {
            lives: 5,
            hop_duration: 0.1,
            ..Default::default()
        };
        let level = build_level(&level_def(), &assets(), &settings).unwrap();
        assert_eq!(level.lives(), 5);
        assert_eq!(level.timing().hop, 0.1);
    }

    #[test]
    fn test_hitbox_formats_agree() {
        let size = HitboxDef::Size([64.0, 64.0]).to_aabb();
        let flat = HitboxDef::Flat(vec![-32.0, -32.0, 32.0, -32.0, 32.0, 32.0]).to_aabb();
        let points = HitboxDef::Points(vec![[-32.0, -32.0], [32.0, 32.0]]).to_aabb();
        assert_eq!(size, flat);
        assert_eq!(size, points);
        assert_eq!(HitboxDef::Points(Vec::new()).to_aabb(), None);
    }

    #[test]
    fn test_lane_count_must_match_height() {
        let mut def = level_def();
        def.lanes.pop();
        let err = build_level(&def, &assets(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LoadError::LaneCount { expected: 4, found: 3 }));
    }

    #[test]
    fn test_moving_lane_needs_speed() {
        let mut def = level_def();
        def.lanes[1].speed = None;
        let err = build_level(&def, &assets(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingSpeed { lane: 1, kind: "road" }));
    }

    #[test]
    fn test_unknown_image() {
        let mut def = level_def();
        def.lanes[1].objects[0].kind = "truck".to_string();
        let err = build_level(&def, &assets(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownImage(name) if name == "truck"));
    }

    #[test]
    fn test_start_out_of_bounds() {
        let mut def = level_def();
        def.start = [7, 0];
        let err = build_level(&def, &assets(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LoadError::StartOutOfBounds(_)));
        assert_eq!(err.to_string(), "start cell [7, 0] is outside the grid");
    }

    #[test]
    fn test_frog_sprite_required() {
        let mut assets = assets();
        assets.sprites.remove(FROG_SPRITE);
        let err = build_level(&level_def(), &assets, &Settings::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownSprite(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(LevelDef::from_json("{"), Err(LoadError::Json(_))));
        assert!(matches!(
            LevelDef::from_json(r#"{"size": [1, 1], "start": [0, 0], "lanes": [{"type": "lava"}]}"#),
            Err(LoadError::Json(_))
        ));
    }
}
