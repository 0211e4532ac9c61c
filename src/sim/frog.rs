//! The frog and its animation state machine
//!
//! The frog is either idle, hopping one cell, or dying. Both animations are
//! plain state records advanced by `step(self, dt, duration) -> (Self, done)`
//! once per frame; nothing suspends between frames.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geom::Aabb;
use crate::cell_center;
use crate::consts::*;
use crate::renderer::{SpriteInstance, Surface};

/// Facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    /// Sprite rotation in degrees
    pub fn angle(self) -> f32 {
        match self {
            Heading::North => FROG_NORTH,
            Heading::South => FROG_SOUTH,
            Heading::East => FROG_EAST,
            Heading::West => FROG_WEST,
        }
    }

    /// Unit grid step
    pub fn offset(self) -> IVec2 {
        match self {
            Heading::North => IVec2::Y,
            Heading::South => IVec2::NEG_Y,
            Heading::East => IVec2::X,
            Heading::West => IVec2::NEG_X,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Heading::North | Heading::South => Axis::Vertical,
            Heading::East | Heading::West => Axis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Animation durations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub hop: f32,
    pub death: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            hop: HOP_DURATION,
            death: DEATH_DURATION,
        }
    }
}

/// A one-cell hop along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub axis: Axis,
    /// Coordinate on `axis` where the hop began
    pub start: f32,
    /// Coordinate on `axis` where the hop lands
    pub target: f32,
    pub elapsed: f32,
}

impl Hop {
    pub fn new(axis: Axis, start: f32, target: f32) -> Self {
        Self {
            axis,
            start,
            target,
            elapsed: 0.0,
        }
    }

    /// Fraction of the hop completed, in [0, 1]
    pub fn ratio(&self, duration: f32) -> f32 {
        if duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / duration).clamp(0.0, 1.0)
    }

    /// Coordinate on `axis` at the current progress
    pub fn coordinate(&self, duration: f32) -> f32 {
        self.start + (self.target - self.start) * self.ratio(duration)
    }

    /// Frame of the 5-frame hop cycle: 4 down to 0 over the first half of the
    /// hop, back up to 4 over the second half
    pub fn frame(&self, duration: f32) -> usize {
        let r = self.ratio(duration);
        let top = (HOP_FRAMES - 1) as f32;
        let f = if r < 0.5 {
            top * (1.0 - 2.0 * r)
        } else {
            top * (2.0 * r - 1.0)
        };
        f.round() as usize
    }

    pub fn step(mut self, dt: f32, duration: f32) -> (Self, bool) {
        self.elapsed += dt;
        let done = self.elapsed >= duration;
        (self, done)
    }
}

/// The death animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Death {
    pub elapsed: f32,
}

impl Death {
    /// Frame of the 8-frame skull cycle, counting down 7 to 0
    pub fn frame(&self, duration: f32) -> usize {
        let frac = if duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / duration).clamp(0.0, 1.0)
        };
        ((DEATH_FRAMES - 1) as f32 * (1.0 - frac)).round() as usize
    }

    /// Finishes once elapsed time exceeds the duration
    pub fn step(mut self, dt: f32, duration: f32) -> (Self, bool) {
        self.elapsed += dt;
        let done = self.elapsed > duration;
        (self, done)
    }
}

/// The animation in flight, if any. `None` on the frog means idle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Animation {
    Hop(Hop),
    Death(Death),
}

/// How an animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEnd {
    /// Hop finished; the frog sits on its target cell
    Landed,
    /// Death finished; the frog must be removed
    Died,
}

/// The player-controlled frog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frog {
    pos: Vec2,
    heading: Heading,
    frame: usize,
    /// Drawn size in pixels
    size: Vec2,
    /// Hitbox per hop frame, relative to `pos`
    hitboxes: Vec<Aabb>,
    animation: Option<Animation>,
}

impl Frog {
    /// Create an idle frog facing north at the center of `cell`
    pub fn new(cell: IVec2, size: Vec2, hitboxes: Vec<Aabb>) -> Self {
        let hitboxes = if hitboxes.is_empty() {
            vec![Aabb::from_center(Vec2::ZERO, size)]
        } else {
            hitboxes
        };
        Self {
            pos: cell_center(cell),
            heading: Heading::North,
            frame: 0,
            size,
            hitboxes,
            animation: None,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.animation, Some(Animation::Death(_)))
    }

    /// Hitbox in pixel space for the current frame
    pub fn bounds(&self) -> Aabb {
        let local = self
            .hitboxes
            .get(self.frame)
            .or_else(|| self.hitboxes.first())
            .copied()
            .unwrap_or_else(|| Aabb::from_center(Vec2::ZERO, self.size));
        local.translate(self.pos)
    }

    /// Horizontal push from a log
    pub fn shift_x(&mut self, dx: f32) {
        self.pos.x += dx;
    }

    /// Start a one-cell hop toward `heading`
    ///
    /// Ignored while another animation is in flight.
    pub fn hop(&mut self, heading: Heading) -> bool {
        if self.is_animating() {
            return false;
        }
        self.heading = heading;
        let delta = heading.offset().as_vec2() * GRID_SIZE;
        let hop = match heading.axis() {
            Axis::Horizontal => Hop::new(Axis::Horizontal, self.pos.x, self.pos.x + delta.x),
            Axis::Vertical => Hop::new(Axis::Vertical, self.pos.y, self.pos.y + delta.y),
        };
        self.animation = Some(Animation::Hop(hop));
        true
    }

    /// Enter the death animation, discarding any hop in flight
    ///
    /// Returns false if the frog was already dying.
    pub fn die(&mut self) -> bool {
        if self.is_dying() {
            return false;
        }
        self.animation = Some(Animation::Death(Death::default()));
        self.frame = DEATH_FRAMES - 1;
        true
    }

    /// Feed `dt` seconds to the animation in flight
    ///
    /// Returns how the animation ended if it finished this step.
    pub fn animate(&mut self, dt: f32, timing: &Timing) -> Option<AnimationEnd> {
        match self.animation? {
            Animation::Hop(hop) => {
                let (hop, done) = hop.step(dt, timing.hop);
                if done {
                    self.set_axis(hop.axis, hop.target);
                    self.frame = 0;
                    self.animation = None;
                    return Some(AnimationEnd::Landed);
                }
                self.set_axis(hop.axis, hop.coordinate(timing.hop));
                self.frame = hop.frame(timing.hop);
                self.animation = Some(Animation::Hop(hop));
                None
            }
            Animation::Death(death) => {
                let (death, done) = death.step(dt, timing.death);
                self.frame = death.frame(timing.death);
                if done {
                    self.animation = None;
                    return Some(AnimationEnd::Died);
                }
                self.animation = Some(Animation::Death(death));
                None
            }
        }
    }

    fn set_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.pos.x = value,
            Axis::Vertical => self.pos.y = value,
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        let image = if self.is_dying() { DEATH_SPRITE } else { FROG_SPRITE };
        surface.sprite(
            image,
            SpriteInstance::new(self.pos, self.size)
                .with_angle(self.heading.angle())
                .with_frame(self.frame),
        );
    }

    /// 48px square frog, for lane and level tests
    #[cfg(test)]
    pub(crate) fn test_frog(cell: IVec2) -> Self {
        Self::new(
            cell,
            Vec2::splat(GRID_SIZE),
            vec![Aabb::from_center(Vec2::ZERO, Vec2::splat(48.0))],
        )
    }
}
