//! Froggit - A lane-based Frogger arcade game
//!
//! Core modules:
//! - `sim`: Level simulation (lanes, hazards, the frog, win/lose evaluation)
//! - `loader`: Builds a level from JSON level and asset descriptions
//! - `renderer`: Rendering sink (sprite instance batching)
//! - `audio`: Audio sink (named cues)
//! - `settings`: Data-driven tuning and preferences

pub mod audio;
pub mod loader;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use loader::{AssetDef, LevelDef, LoadError, build_level, load_level};
pub use settings::Settings;

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Side length of one grid cell in pixels
    pub const GRID_SIZE: f32 = 64.0;

    /// Lives the player starts a level with
    pub const FROG_LIVES: u32 = 3;
    /// Seconds for one hop across a single cell
    pub const HOP_DURATION: f32 = 0.2;
    /// Seconds for the death animation
    pub const DEATH_DURATION: f32 = 0.5;

    /// Frames in the hop cycle (4 is crouched, 0 is fully stretched)
    pub const HOP_FRAMES: usize = 5;
    /// Frames in the skull sheet
    pub const DEATH_FRAMES: usize = 8;

    /// Heading angles in degrees (sprite faces south at 0)
    pub const FROG_NORTH: f32 = 180.0;
    pub const FROG_SOUTH: f32 = 0.0;
    pub const FROG_EAST: f32 = 90.0;
    pub const FROG_WEST: f32 = -90.0;

    /// Hedge slot kind that is freely passable and never captured
    pub const OPENING_KIND: &str = "open";

    /// Image names the level looks up in the asset description
    pub const FROG_SPRITE: &str = "frog";
    pub const DEATH_SPRITE: &str = "skulls";
    pub const FROG_SAFE: &str = "safe";
    pub const FROG_HEAD: &str = "froghead";
}

/// Pixel center of a grid cell
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    (cell.as_vec2() + Vec2::splat(0.5)) * consts::GRID_SIZE
}

/// Grid cell containing a pixel position
#[inline]
pub fn pixel_to_cell(pos: Vec2) -> IVec2 {
    (pos / consts::GRID_SIZE).floor().as_ivec2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center_round_trip() {
        let cell = IVec2::new(3, 1);
        let center = cell_center(cell);
        assert_eq!(center, Vec2::new(224.0, 96.0));
        assert_eq!(pixel_to_cell(center), cell);
    }

    #[test]
    fn test_pixel_to_cell_floors_negative() {
        assert_eq!(pixel_to_cell(Vec2::new(-1.0, 0.0)), IVec2::new(-1, 0));
    }
}
