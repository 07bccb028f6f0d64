//! Flat, `Pod` render data read by the host in place.

use bytemuck::{Pod, Zeroable};

/// Per-sprite render data handed to the host renderer.
/// 12 floats = 48 bytes stride; the host reads the buffer in place.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// X position in scene space.
    pub x: f32,
    /// Y position in scene space.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Tint channels in [0, 1].
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// `TextureId` discriminant.
    pub texture: f32,
    /// Draw order, for hosts that interleave sprites and shapes.
    pub z: f32,
    _pad: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    #[allow(clippy::too_many_arguments)]
    pub fn new(x: f32, y: f32, rotation: f32, scale: [f32; 2], alpha: f32, rgb: [f32; 3], texture: f32, z: f32) -> Self {
        Self {
            x,
            y,
            rotation,
            scale_x: scale[0],
            scale_y: scale[1],
            alpha,
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            texture,
            z,
            _pad: 0.0,
        }
    }
}

/// Untextured, pre-transformed triangle vertex (ray fans, flash overlays).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ShapeVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ShapeVertex {
    pub const FLOATS: usize = 6;
}

/// Everything the host needs to draw one frame: textured sprite instances
/// plus a triangle list for shapes, each already in draw order.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
    pub shapes: Vec<ShapeVertex>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    pub fn with_capacity(max_instances: usize) -> Self {
        Self {
            instances: Vec::with_capacity(max_instances),
            shapes: Vec::with_capacity(1024),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.shapes.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn shape_vertex_count(&self) -> u32 {
        self.shapes.len() as u32
    }

    /// Raw pointer to instance data for zero-copy host reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn shapes_ptr(&self) -> *const f32 {
        self.shapes.as_ptr() as *const f32
    }

    /// Instance data as a flat float slice.
    pub fn instance_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
