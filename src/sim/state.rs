//! Level state and the queries the application shell reads
//!
//! The shell drives pause/continue/complete transitions from three questions:
//! are the lives exhausted, are all goals captured, and is the frog present.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::frog::{Frog, Heading, Timing};
use super::geom::Aabb;
use super::lane::Lane;
use crate::consts::*;
use crate::renderer::{SpriteInstance, Surface};

/// Why the frog died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Hit by a car
    Squashed,
    /// In water with no log under its center
    Drowned,
    /// Carried past the edge of the screen by a log
    SweptOffscreen,
}

/// Things that happened during an update, drained by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A hop was accepted; `into_exit` when it lands on a free exit
    Hopped { heading: Heading, into_exit: bool },
    /// The frog entered its death animation
    Died { cause: DeathCause },
    /// The death animation finished and a life was consumed
    LifeLost { remaining: u32 },
    /// The frog reached a free exit
    GoalCaptured { lane: usize, slot: usize },
    /// Every exit in every hedge is taken
    LevelWon,
    /// A fresh frog was placed on the grid
    Respawned,
}

/// Size and per-frame hitboxes used whenever a frog is spawned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrogSprite {
    pub size: Vec2,
    pub hitboxes: Vec<Aabb>,
}

impl Default for FrogSprite {
    fn default() -> Self {
        Self {
            size: Vec2::splat(GRID_SIZE),
            hitboxes: Vec::new(),
        }
    }
}

impl FrogSprite {
    pub fn spawn(&self, cell: IVec2) -> Frog {
        Frog::new(cell, self.size, self.hitboxes.clone())
    }
}

/// A single level: lanes bottom to top, the frog, lives and goal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Grid width in cells
    pub(super) width: u32,
    /// Grid height in cells
    pub(super) height: u32,
    pub(super) start: IVec2,
    /// Index is the grid row
    pub(super) lanes: Vec<Lane>,
    /// Absent after death or capture until the shell respawns it
    pub(super) frog: Option<Frog>,
    pub(super) sprite: FrogSprite,
    pub(super) lives: u32,
    pub(super) max_lives: u32,
    /// Set once every exit is taken; never cleared
    pub(super) won: bool,
    pub(super) timing: Timing,
    #[serde(skip)]
    pub(super) events: Vec<GameEvent>,
}

impl Level {
    /// Create a level with the default lives and animation timing
    pub fn new(width: u32, height: u32, start: IVec2, lanes: Vec<Lane>, sprite: FrogSprite) -> Self {
        let frog = sprite.spawn(start);
        Self {
            width,
            height,
            start,
            lanes,
            frog: Some(frog),
            sprite,
            lives: FROG_LIVES,
            max_lives: FROG_LIVES,
            won: false,
            timing: Timing::default(),
            events: Vec::new(),
        }
    }

    pub fn with_lives(mut self, lives: u32) -> Self {
        self.lives = lives;
        self.max_lives = lives;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grid size in pixels
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * GRID_SIZE
    }

    pub fn start(&self) -> IVec2 {
        self.start
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn frog(&self) -> Option<&Frog> {
        self.frog.as_ref()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// No lives remain (terminal loss)
    pub fn lives_exhausted(&self) -> bool {
        self.lives == 0
    }

    pub fn actor_present(&self) -> bool {
        self.frog.is_some()
    }

    /// Every exit of every hedge is taken (terminal win)
    pub fn all_goals_captured(&self) -> bool {
        self.won
    }

    /// Place a fresh frog on `cell`
    ///
    /// Does nothing if a frog is already present or no lives remain.
    pub fn respawn_actor(&mut self, cell: IVec2) -> bool {
        if self.frog.is_some() || self.lives_exhausted() {
            return false;
        }
        self.frog = Some(self.sprite.spawn(cell));
        self.events.push(GameEvent::Respawned);
        log::debug!("Frog respawned at {cell}");
        true
    }

    /// Respawn at the level's start cell
    pub fn respawn(&mut self) -> bool {
        self.respawn_actor(self.start)
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Index of the lane whose tile contains `point`
    pub fn lane_index_at(&self, point: Vec2) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.contains_point(point))
    }

    pub fn lane_at(&self, point: Vec2) -> Option<&Lane> {
        self.lane_index_at(point).map(|i| &self.lanes[i])
    }

    /// Start the death animation; a frog already dying is left alone
    pub(super) fn kill(&mut self, cause: DeathCause) {
        let Some(frog) = self.frog.as_mut() else {
            return;
        };
        if frog.die() {
            log::info!("Frog died ({cause:?}) at {}", frog.pos());
            self.events.push(GameEvent::Died { cause });
        }
    }

    /// Remove the frog after its death animation and consume a life
    pub(super) fn finish_death(&mut self) {
        self.frog = None;
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        log::info!("Life lost, {} remaining", self.lives);
    }

    /// Lanes in row order, then the frog, then the lives counter
    pub fn draw(&self, surface: &mut dyn Surface) {
        for lane in &self.lanes {
            lane.draw(surface);
        }
        if let Some(frog) = &self.frog {
            frog.draw(surface);
        }

        let hud_y = GRID_SIZE * (self.height as f32 + 0.5);
        let right = self.width as f32 * GRID_SIZE;
        let first_left = right - GRID_SIZE * self.max_lives as f32;
        for i in 0..self.lives.min(self.max_lives) {
            let left = first_left + GRID_SIZE * i as f32;
            surface.sprite(
                FROG_HEAD,
                SpriteInstance::new(Vec2::new(left + GRID_SIZE * 0.5, hud_y), Vec2::splat(GRID_SIZE)),
            );
        }
        surface.label("LIVES:", Vec2::new(first_left - GRID_SIZE, hud_y));
    }
}
