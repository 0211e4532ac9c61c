//! Rendering sink
//!
//! The simulation never talks to a GPU. Everything drawable hands sprites and
//! labels to a `Surface`; `SpriteBatch` is the stock surface that groups them
//! into per-image instance runs in draw order.

pub mod sprite;

pub use sprite::{FLAG_FLIPPED, SpriteInstance};

use glam::Vec2;

/// Drawing target for one frame
pub trait Surface {
    /// Draw `instance` using the named image
    fn sprite(&mut self, image: &str, instance: SpriteInstance);
    /// Draw a text label centered at `pos`
    fn label(&mut self, text: &str, pos: Vec2);
}

/// Consecutive sprites sharing one image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRun {
    pub image: String,
    pub instances: Vec<SpriteInstance>,
}

impl SpriteRun {
    /// Raw instance bytes for upload
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Surface that records a frame as instance runs
#[derive(Debug, Clone, Default)]
pub struct SpriteBatch {
    runs: Vec<SpriteRun>,
    labels: Vec<(String, Vec2)>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for the next frame, keeping allocations
    pub fn clear(&mut self) {
        self.runs.clear();
        self.labels.clear();
    }

    pub fn runs(&self) -> &[SpriteRun] {
        &self.runs
    }

    pub fn labels(&self) -> &[(String, Vec2)] {
        &self.labels
    }

    /// Total sprites recorded this frame
    pub fn sprite_count(&self) -> usize {
        self.runs.iter().map(|r| r.instances.len()).sum()
    }

    /// Every sprite of one image, in draw order
    pub fn sprites_of<'a>(&'a self, image: &'a str) -> impl Iterator<Item = &'a SpriteInstance> {
        self.runs
            .iter()
            .filter(move |r| r.image == image)
            .flat_map(|r| r.instances.iter())
    }
}

impl Surface for SpriteBatch {
    fn sprite(&mut self, image: &str, instance: SpriteInstance) {
        match self.runs.last_mut() {
            Some(run) if run.image == image => run.instances.push(instance),
            _ => self.runs.push(SpriteRun {
                image: image.to_string(),
                instances: vec![instance],
            }),
        }
    }

    fn label(&mut self, text: &str, pos: Vec2) {
        self.labels.push((text.to_string(), pos));
    }
}
