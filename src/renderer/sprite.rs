//! Sprite instance records for 2D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Set in `SpriteInstance::flags` when the image is drawn rotated a half turn
pub const FLAG_FLIPPED: u32 = 1;

/// One textured quad, laid out for direct upload as instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub center: [f32; 2],
    pub size: [f32; 2],
    /// Rotation in degrees
    pub angle: f32,
    /// Frame index into the sprite sheet (0 for plain images)
    pub frame: u32,
    pub flags: u32,
    pub _pad: u32,
}

impl SpriteInstance {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center: center.to_array(),
            size: size.to_array(),
            ..Default::default()
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_frame(mut self, frame: usize) -> Self {
        self.frame = frame as u32;
        self
    }

    pub fn with_flip(mut self, flipped: bool) -> Self {
        if flipped {
            self.flags |= FLAG_FLIPPED;
        } else {
            self.flags &= !FLAG_FLIPPED;
        }
        self
    }

    pub fn flipped(&self) -> bool {
        self.flags & FLAG_FLIPPED != 0
    }
}
