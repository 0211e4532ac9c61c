//! Lanes: the horizontal strips a level is built from
//!
//! A lane owns its background tile and its obstacles. What the obstacles mean
//! depends on the lane kind:
//! - Grass: nothing, obstacles are scenery
//! - Road: cars kill on hitbox overlap
//! - Water: logs carry the frog, open water kills
//! - Hedge: goal slots; exits are captured once, openings are walked through

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::frog::Frog;
use super::geom::{self, Aabb};
use super::obstacle::{Obstacle, wrap_bounds};
use crate::consts::{FROG_SAFE, GRID_SIZE};
use crate::renderer::{SpriteInstance, Surface};

/// Movement shared by every obstacle in a Road or Water lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    /// Signed pixels per second (positive moves right)
    pub speed: f32,
    /// Grid cells an obstacle may travel offscreen before wrapping
    pub buffer: f32,
}

/// Capture bookkeeping for a hedge lane
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exits {
    /// Indices into the lane's obstacles, in capture order. Only grows.
    captured: Vec<usize>,
}

impl Exits {
    pub fn captured(&self) -> &[usize] {
        &self.captured
    }
}

/// Lane behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LaneKind {
    Grass,
    Road(Traffic),
    Water(Traffic),
    Hedge(Exits),
}

impl LaneKind {
    pub fn name(&self) -> &'static str {
        match self {
            LaneKind::Grass => "grass",
            LaneKind::Road(_) => "road",
            LaneKind::Water(_) => "water",
            LaneKind::Hedge(_) => "hedge",
        }
    }
}

/// One row of the level grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lane {
    kind: LaneKind,
    /// Background tile bounds (full window width, one cell high)
    tile: Aabb,
    obstacles: Vec<Obstacle>,
}

impl Lane {
    /// Create the lane for grid row `row` (0 is the bottom row)
    pub fn new(kind: LaneKind, row: u32, width_cells: u32, obstacles: Vec<Obstacle>) -> Self {
        let bottom = row as f32 * GRID_SIZE;
        let tile = Aabb::new(
            Vec2::new(0.0, bottom),
            Vec2::new(width_cells as f32 * GRID_SIZE, bottom + GRID_SIZE),
        );
        Self {
            kind,
            tile,
            obstacles,
        }
    }

    pub fn kind(&self) -> &LaneKind {
        &self.kind
    }

    pub fn tile(&self) -> Aabb {
        self.tile
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Pixel y of the lane's center line
    pub fn row_y(&self) -> f32 {
        self.tile.center().y
    }

    /// Speed of the lane's obstacles (Road and Water only)
    pub fn speed(&self) -> Option<f32> {
        match &self.kind {
            LaneKind::Road(t) | LaneKind::Water(t) => Some(t.speed),
            LaneKind::Grass | LaneKind::Hedge(_) => None,
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self.kind, LaneKind::Water(_))
    }

    pub fn is_road(&self) -> bool {
        matches!(self.kind, LaneKind::Road(_))
    }

    pub fn is_hedge(&self) -> bool {
        matches!(self.kind, LaneKind::Hedge(_))
    }

    /// Move every obstacle of a Road or Water lane; no-op otherwise
    pub fn advance(&mut self, dt: f32, width_cells: u32) {
        let traffic = match &self.kind {
            LaneKind::Road(t) | LaneKind::Water(t) => *t,
            LaneKind::Grass | LaneKind::Hedge(_) => return,
        };
        let (left, right) = wrap_bounds(width_cells, traffic.buffer);
        for obs in &mut self.obstacles {
            obs.advance(dt, traffic.speed, left, right);
        }
    }

    /// Whether `point` lies on this lane's background tile
    pub fn contains_point(&self, point: Vec2) -> bool {
        geom::contains(&self.tile, point)
    }

    /// Whether the frog's hitbox overlaps this lane's background tile
    ///
    /// A query for the shell (e.g. highlighting lanes the frog straddles).
    /// Lane lookup during an update uses `contains_point` on the frog's center.
    pub fn collides_tile(&self, frog: &Frog) -> bool {
        geom::overlaps(&self.tile, &frog.bounds())
    }

    /// Road: any car overlaps the frog's hitbox
    pub fn squash(&self, frog: &Frog) -> bool {
        if !self.is_road() {
            return false;
        }
        let bounds = frog.bounds();
        self.obstacles.iter().any(|car| car.overlaps(&bounds))
    }

    /// Water: some log contains the frog's center point
    ///
    /// Hitbox overlap is not enough; a frog hanging mostly off a log is safe
    /// only while its center is still on the log.
    pub fn safe(&self, frog: &Frog) -> bool {
        if !self.is_water() {
            return false;
        }
        let center = frog.pos();
        self.obstacles.iter().any(|log| log.contains(center))
    }

    /// Hedge: slot `slot` has been captured
    pub fn occupied(&self, slot: usize) -> bool {
        match &self.kind {
            LaneKind::Hedge(exits) => exits.captured.contains(&slot),
            _ => false,
        }
    }

    /// Hedge: capture the first free exit containing the frog's center
    ///
    /// Returns the captured slot index. Captured slots are skipped, so calling
    /// this again for the same position changes nothing.
    pub fn capture(&mut self, frog: &Frog) -> Option<usize> {
        let LaneKind::Hedge(exits) = &mut self.kind else {
            return None;
        };
        let center = frog.pos();
        let (slot, _) = self.obstacles.iter().enumerate().find(|(i, slot)| {
            !slot.is_opening() && slot.contains(center) && !exits.captured.contains(i)
        })?;
        exits.captured.push(slot);
        Some(slot)
    }

    /// Hedge: the frog's center is inside an exit that is already taken
    pub fn blocked(&self, frog: &Frog) -> bool {
        self.blocked_at(frog.pos())
    }

    pub fn blocked_at(&self, point: Vec2) -> bool {
        self.exit_slots()
            .any(|(i, slot)| slot.contains(point) && self.occupied(i))
    }

    /// Hedge: the frog's center is inside any exit, taken or not
    pub fn contains_exit(&self, frog: &Frog) -> bool {
        self.contains_exit_at(frog.pos())
    }

    pub fn contains_exit_at(&self, point: Vec2) -> bool {
        self.exit_slots().any(|(_, slot)| slot.contains(point))
    }

    /// Hedge: the frog's center is inside an opening
    pub fn is_opening(&self, frog: &Frog) -> bool {
        self.opening_at(frog.pos())
    }

    pub fn opening_at(&self, point: Vec2) -> bool {
        self.is_hedge()
            && self
                .obstacles
                .iter()
                .any(|slot| slot.is_opening() && slot.contains(point))
    }

    /// Hedge: every exit has been captured
    pub fn all_captured(&self) -> bool {
        match &self.kind {
            LaneKind::Hedge(_) => self.exit_slots().all(|(i, _)| self.occupied(i)),
            _ => false,
        }
    }

    /// Captured slot indices in capture order (empty for non-hedge lanes)
    pub fn captured(&self) -> &[usize] {
        match &self.kind {
            LaneKind::Hedge(exits) => exits.captured(),
            _ => &[],
        }
    }

    /// Tile, then obstacles, then a safe frog on every captured exit
    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.sprite(
            self.kind.name(),
            SpriteInstance::new(self.tile.center(), self.tile.size()),
        );
        for obs in &self.obstacles {
            surface.sprite(
                obs.kind(),
                SpriteInstance::new(obs.pos(), obs.size()).with_flip(obs.flipped()),
            );
        }
        for &slot in self.captured() {
            if let Some(obs) = self.obstacles.get(slot) {
                surface.sprite(FROG_SAFE, SpriteInstance::new(obs.pos(), Vec2::splat(GRID_SIZE)));
            }
        }
    }

    fn exit_slots(&self) -> impl Iterator<Item = (usize, &Obstacle)> {
        let hedge = self.is_hedge();
        self.obstacles
            .iter()
            .enumerate()
            .filter(move |(_, slot)| hedge && !slot.is_opening())
    }
}
