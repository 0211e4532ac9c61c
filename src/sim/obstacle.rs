//! Lane obstacles: cars, logs and hedge slots

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{self, Aabb};
use crate::consts::{GRID_SIZE, OPENING_KIND};

/// A positioned entity owned by a lane
///
/// Obstacles in Road and Water lanes move every frame; hedge slots stay put.
/// Orientation is decided once from the lane speed and only affects drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Image name from the level data (e.g. "car1", "log2", "exit", "open")
    kind: String,
    /// Pixel center
    pos: Vec2,
    /// Drawn size in pixels
    size: Vec2,
    /// Drawn rotated 180 degrees (lane moves leftward)
    flipped: bool,
    /// Hitbox relative to `pos`
    hitbox: Aabb,
}

impl Obstacle {
    /// Create an obstacle at a lane-relative grid position
    ///
    /// `row_y` is the pixel center of the owning lane. A negative `lane_speed`
    /// flips the obstacle.
    pub fn new(
        kind: impl Into<String>,
        grid_x: f32,
        row_y: f32,
        size: Vec2,
        hitbox: Aabb,
        lane_speed: Option<f32>,
    ) -> Self {
        Self {
            kind: kind.into(),
            pos: Vec2::new((grid_x + 0.5) * GRID_SIZE, row_y),
            size,
            flipped: lane_speed.is_some_and(|s| s < 0.0),
            hitbox,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// True for hedge slots that can be walked through but never captured
    pub fn is_opening(&self) -> bool {
        self.kind == OPENING_KIND
    }

    /// Hitbox in pixel space at the current position
    pub fn bounds(&self) -> Aabb {
        self.hitbox.translate(self.pos)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        geom::contains(&self.bounds(), point)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        geom::overlaps(&self.bounds(), other)
    }

    /// Move by `speed * dt` and wrap around the offscreen buffers
    ///
    /// The wrap keeps the distance travelled past one bound: an obstacle that
    /// ends up `d` pixels past `right` re-enters at `left + d`, and the mirror
    /// rule holds for leftward motion.
    pub fn advance(&mut self, dt: f32, speed: f32, left: f32, right: f32) {
        self.pos.x += speed * dt;

        let span = right - left;
        if span <= 0.0 {
            return;
        }
        if speed > 0.0 {
            while self.pos.x >= right {
                self.pos.x = left + (self.pos.x - right);
            }
        } else if speed < 0.0 {
            while self.pos.x <= left {
                self.pos.x = right - (left - self.pos.x);
            }
        }
    }
}

/// Horizontal wrap bounds for a lane `width_cells` wide with `buffer` cells of slack
#[inline]
pub fn wrap_bounds(width_cells: u32, buffer: f32) -> (f32, f32) {
    let slack = buffer * GRID_SIZE;
    (-slack, width_cells as f32 * GRID_SIZE + slack)
}
