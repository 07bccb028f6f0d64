//! Hex colours and the confetti palette.

use serde::{Deserialize, Serialize};

/// 24-bit RGB colour stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

/// Tints cycled through by confetti bursts.
pub const PALETTE: [Color; 10] = [
    Color(0xf43f5e),
    Color(0x22c55e),
    Color(0x3b82f6),
    Color(0xf59e0b),
    Color(0xa855f7),
    Color(0x06b6d4),
    Color(0xec4899),
    Color(0x84cc16),
    Color(0x38bdf8),
    Color(0xfb923c),
];

impl Color {
    pub const WHITE: Color = Color(0xffffff);
    pub const BLACK: Color = Color(0x000000);

    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Normalized channels for GPU upload.
    pub fn to_rgb(self) -> [f32; 3] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
        ]
    }

    /// Per-channel linear blend from `a` (t = 0) to `b` (t = 1), rounded.
    pub fn mix(a: Color, b: Color, t: f32) -> Color {
        let channel = |x: u8, y: u8| -> u8 {
            let v = x as f32 + (y as f32 - x as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color::from_rgb(channel(a.r(), b.r()), channel(a.g(), b.g()), channel(a.b(), b.b()))
    }

    /// Darken toward black for negative `t`, lighten toward white for positive `t`.
    pub fn shade(self, t: f32) -> Color {
        if t < 0.0 {
            Color::mix(self, Color::BLACK, -t)
        } else {
            Color::mix(self, Color::WHITE, t)
        }
    }
}
