//! Particle record and its per-frame integration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::spawn::ParticleKind;
use crate::api::types::NodeId;

/// How a particle's opacity follows its remaining life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeMode {
    /// Opacity is left as spawned.
    #[default]
    None,
    /// Opacity = remaining life / max life.
    Linear,
    /// Ramp up to full opacity at the peak fraction of life, then back down.
    InOut,
}

/// One simulated particle. Plain data; the scene node it drives is
/// referenced by `node` and updated from this record every frame.
#[derive(Debug, Clone)]
pub struct Particle {
    pub node: NodeId,
    pub kind: ParticleKind,
    pub pos: Vec2,
    /// Pixels per reference frame.
    pub vel: Vec2,
    /// Added to velocity per reference frame.
    pub accel: Vec2,
    pub rotation: f32,
    /// Radians per reference frame.
    pub rotation_speed: f32,
    pub scale: f32,
    pub alpha: f32,
    /// Remaining life in milliseconds.
    pub life: f32,
    pub max_life: f32,
    pub fade: FadeMode,
    /// Scale lost per reference frame. Zero disables.
    pub scale_decay: f32,
}

impl Particle {
    /// Milliseconds lived so far.
    pub fn age(&self) -> f32 {
        self.max_life - self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Opacity implied by the fade mode, or `None` when the mode leaves it alone.
    pub fn opacity(&self, fade_peak: f32) -> Option<f32> {
        if self.max_life <= 0.0 {
            return Some(0.0);
        }
        let alpha = match self.fade {
            FadeMode::None => return None,
            FadeMode::Linear => self.life / self.max_life,
            FadeMode::InOut => {
                let rise = self.max_life * fade_peak;
                let fall = self.max_life - rise;
                if self.age() < rise {
                    self.age() / rise
                } else if fall > 0.0 {
                    self.life / fall
                } else {
                    0.0
                }
            }
        };
        Some(alpha.clamp(0.0, 1.0))
    }

    /// Integrate one frame.
    ///
    /// `k` is the clamped frame step in reference frames and scales the
    /// kinematics; `life_ms` is the wall-clock delta taken off the life.
    /// Returns false once the particle has expired.
    pub fn tick(&mut self, life_ms: f32, k: f32, fade_peak: f32) -> bool {
        self.vel += self.accel * k;
        self.pos += self.vel;
        self.rotation += self.rotation_speed * k;

        if let Some(alpha) = self.opacity(fade_peak) {
            self.alpha = alpha;
        }
        if self.scale_decay > 0.0 {
            self.scale = (self.scale - self.scale_decay * k).max(0.0);
        }

        self.life -= life_ms;
        self.is_alive()
    }
}
