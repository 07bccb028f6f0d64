//! Scene nodes: transform, opacity, tint and what to draw.

use glam::Vec2;

use crate::assets::textures::TextureId;
use crate::components::color::Color;

/// What a node looks like. The renderer decides how to draw each variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visual {
    /// Invisible container; only its transform matters (e.g. the shake target).
    Group,
    /// Textured quad centred on the node position.
    Sprite(TextureId),
    /// `rays` thin triangles fanned evenly around the node origin.
    RayFan {
        rays: u32,
        length: f32,
        half_width: f32,
        fill_alpha: f32,
    },
    /// Axis-aligned rectangle anchored at the node position (top-left).
    Overlay { width: f32, height: f32 },
}

/// Renderer-facing visual primitive: transform, opacity and tint.
/// Simulation state lives elsewhere and is copied in once per frame.
#[derive(Debug, Clone)]
pub struct Node {
    pub visual: Visual,
    /// Position in scene space.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub scale: Vec2,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    pub tint: Color,
    /// Draw order; higher draws later.
    pub z_index: i32,
    /// Hidden nodes are skipped by the render adapter.
    pub visible: bool,
}

impl Node {
    pub fn new(visual: Visual) -> Self {
        Self {
            visual,
            pos: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            alpha: 1.0,
            tint: Color::WHITE,
            z_index: 0,
            visible: true,
        }
    }

    pub fn group() -> Self {
        Self::new(Visual::Group)
    }

    pub fn sprite(texture: TextureId) -> Self {
        Self::new(Visual::Sprite(texture))
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec2::splat(scale);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}
