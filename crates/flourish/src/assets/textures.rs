//! Procedural particle textures.
//!
//! The engine never rasterises anything itself. These descriptors tell the
//! host renderer what to draw once per texture; particles then reference the
//! result by [`TextureId`].

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::color::Color;

/// Textures shared by every particle of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TextureId {
    ConfettiRect = 0,
    Sparkle = 1,
    Coin = 2,
}

impl TextureId {
    pub const ALL: [TextureId; 3] = [TextureId::ConfettiRect, TextureId::Sparkle, TextureId::Coin];

    /// How the renderer should build this texture.
    pub fn desc(self) -> TextureDesc {
        match self {
            TextureId::ConfettiRect => TextureDesc::RoundedRect {
                width: 10,
                height: 16,
                radius: 2.0,
                color: Color::WHITE,
            },
            TextureId::Sparkle => TextureDesc::Star {
                size: 22,
                points: 6,
                color: Color::WHITE,
            },
            TextureId::Coin => TextureDesc::Coin { size: 28 },
        }
    }
}

/// Shape recipe for a generated texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TextureDesc {
    /// Filled rectangle with rounded corners. White so it can be tinted.
    RoundedRect { width: u32, height: u32, radius: f32, color: Color },
    /// Filled star polygon, see [`star_outline`].
    Star { size: u32, points: u32, color: Color },
    /// Gold disc with a radial gradient and an elliptical highlight.
    Coin { size: u32 },
}

/// Inner gradient stop of the coin rim.
pub const COIN_INNER: Color = Color(0xffe27a);
/// Outer gradient stop of the coin rim.
pub const COIN_OUTER: Color = Color(0xe0a300);
/// Opacity of the white highlight ellipse on the coin.
pub const COIN_HIGHLIGHT_ALPHA: f32 = 0.25;

/// Ratio between the inner and outer star radius.
const STAR_INNER_RATIO: f32 = 0.22;

impl TextureDesc {
    /// Pixel dimensions of the generated bitmap.
    pub fn size(&self) -> (u32, u32) {
        match *self {
            TextureDesc::RoundedRect { width, height, .. } => (width, height),
            TextureDesc::Star { size, .. } | TextureDesc::Coin { size } => (size, size),
        }
    }
}

/// Star polygon centred on the origin: `points * 2` vertices alternating
/// between the outer radius (size / 2) and the inner radius, first tip up.
pub fn star_outline(size: f32, points: u32) -> Vec<Vec2> {
    let outer = size * 0.5;
    let inner = size * STAR_INNER_RATIO;
    let n = points * 2;
    (0..n)
        .map(|i| {
            let r = if i % 2 == 1 { inner } else { outer };
            let a = (i as f32 / n as f32) * TAU - PI / 2.0;
            Vec2::new(a.cos() * r, a.sin() * r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_alternates_radii() {
        let pts = star_outline(22.0, 6);
        assert_eq!(pts.len(), 12);
        assert!((pts[0].length() - 11.0).abs() < 1e-4);
        assert!((pts[1].length() - 22.0 * 0.22).abs() < 1e-4);
        // First tip points straight up (negative y in screen space).
        assert!(pts[0].x.abs() < 1e-4 && pts[0].y < 0.0);
    }

    #[test]
    fn descriptor_sizes() {
        assert_eq!(TextureId::ConfettiRect.desc().size(), (10, 16));
        assert_eq!(TextureId::Sparkle.desc().size(), (22, 22));
        assert_eq!(TextureId::Coin.desc().size(), (28, 28));
    }

    #[test]
    fn descriptors_serialize_with_shape_tag() {
        let json = serde_json::to_string(&TextureId::Coin.desc()).unwrap();
        assert_eq!(json, r#"{"shape":"coin","size":28}"#);
    }
}
