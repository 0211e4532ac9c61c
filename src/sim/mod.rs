//! Level simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform,
//! rendering backend and audio backend dependencies:
//! - Driven only by `update(input, dt)`
//! - Stable iteration order (lanes bottom to top, obstacles in data order)
//! - Failure-like outcomes are state transitions, never errors

pub mod frog;
pub mod geom;
pub mod lane;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use frog::{Animation, AnimationEnd, Axis, Death, Frog, Heading, Hop, Timing};
pub use geom::{Aabb, contains, overlaps};
pub use lane::{Exits, Lane, LaneKind, Traffic};
pub use obstacle::Obstacle;
pub use state::{DeathCause, FrogSprite, GameEvent, Level};
pub use tick::{TickInput, tick};
