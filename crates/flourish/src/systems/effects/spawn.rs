//! Per-kind spawn tables and caller overrides.

use serde::{Deserialize, Deserializer, Serialize};

use super::particle::FadeMode;
use super::rng::Rng;
use crate::api::error::{FxError, FxResult};
use crate::assets::textures::TextureId;
use crate::components::color::Color;

/// Particle flavours the system knows how to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Confetti,
    Coin,
    Sparkle,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [ParticleKind::Confetti, ParticleKind::Coin, ParticleKind::Sparkle];

    pub fn texture(self) -> TextureId {
        match self {
            ParticleKind::Confetti => TextureId::ConfettiRect,
            ParticleKind::Coin => TextureId::Coin,
            ParticleKind::Sparkle => TextureId::Sparkle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Confetti => "confetti",
            ParticleKind::Coin => "coin",
            ParticleKind::Sparkle => "sparkle",
        }
    }
}

/// Closed interval sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const ZERO: Range = Range::fixed(0.0);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// [-magnitude, magnitude].
    pub const fn symmetric(magnitude: f32) -> Self {
        Self { min: -magnitude, max: magnitude }
    }

    pub const fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn sample(&self, rng: &mut Rng) -> f32 {
        rng.range(self.min, self.max)
    }
}

/// Randomisation ranges and behaviour for one particle kind.
/// Velocities and acceleration are per reference frame (~16.7 ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    pub vx: Range,
    pub vy: Range,
    pub accel_y: f32,
    pub life_ms: Range,
    pub scale: Range,
    pub rotation_speed: Range,
    /// Half-extent of the random spawn offset around the trigger point.
    #[serde(default)]
    pub jitter: [f32; 2],
    pub fade: FadeMode,
    #[serde(default)]
    pub scale_decay: f32,
    /// Opacity at spawn, before the fade rule takes over.
    pub initial_alpha: f32,
    /// Count used by the convenience triggers.
    pub default_count: usize,
}

impl SpawnParams {
    pub fn confetti() -> Self {
        Self {
            vx: Range::symmetric(6.0),
            vy: Range::new(-9.0, -4.0),
            accel_y: 0.25,
            life_ms: Range::new(900.0, 1400.0),
            scale: Range::new(0.6, 1.4),
            rotation_speed: Range::symmetric(0.3),
            jitter: [0.0, 0.0],
            fade: FadeMode::Linear,
            scale_decay: 0.0,
            initial_alpha: 1.0,
            default_count: 48,
        }
    }

    pub fn coin() -> Self {
        Self {
            vx: Range::symmetric(4.5),
            vy: Range::new(-9.5, -5.0),
            accel_y: 0.35,
            life_ms: Range::new(1100.0, 1700.0),
            scale: Range::new(0.9, 1.3),
            rotation_speed: Range::symmetric(0.25),
            jitter: [15.0, 3.0],
            fade: FadeMode::Linear,
            scale_decay: 0.0,
            initial_alpha: 1.0,
            default_count: 18,
        }
    }

    pub fn sparkle() -> Self {
        Self {
            vx: Range::ZERO,
            vy: Range::ZERO,
            accel_y: 0.0,
            life_ms: Range::new(480.0, 860.0),
            scale: Range::new(0.4, 1.1),
            rotation_speed: Range::symmetric(0.05),
            jitter: [0.0, 0.0],
            fade: FadeMode::InOut,
            scale_decay: 0.0,
            initial_alpha: 0.0,
            default_count: 18,
        }
    }

    pub fn for_kind(kind: ParticleKind) -> Self {
        match kind {
            ParticleKind::Confetti => Self::confetti(),
            ParticleKind::Coin => Self::coin(),
            ParticleKind::Sparkle => Self::sparkle(),
        }
    }

    pub fn validate(&self, kind: ParticleKind) -> FxResult {
        let ranges = [
            ("vx", self.vx),
            ("vy", self.vy),
            ("life_ms", self.life_ms),
            ("scale", self.scale),
            ("rotation_speed", self.rotation_speed),
        ];
        for (name, range) in ranges {
            if !range.is_valid() {
                return Err(FxError::invalid(name, format!("{} range {range:?} is malformed", kind.name())));
            }
        }
        if self.life_ms.min <= 0.0 {
            return Err(FxError::invalid("life_ms", format!("{} life must be positive", kind.name())));
        }
        let scalars = [
            ("accel_y", self.accel_y),
            ("jitter", self.jitter[0]),
            ("jitter", self.jitter[1]),
            ("scale_decay", self.scale_decay),
            ("initial_alpha", self.initial_alpha),
        ];
        for (name, v) in scalars {
            if !v.is_finite() {
                return Err(FxError::invalid(name, format!("{} value {v} is not finite", kind.name())));
            }
        }
        Ok(())
    }
}

/// A spawn table as written in configuration. Unset fields keep the kind's
/// built-in value, so `{ "default_count": 60 }` retunes only the count.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnTable {
    pub vx: Option<Range>,
    pub vy: Option<Range>,
    pub accel_y: Option<f32>,
    pub life_ms: Option<Range>,
    pub scale: Option<Range>,
    pub rotation_speed: Option<Range>,
    pub jitter: Option<[f32; 2]>,
    pub fade: Option<FadeMode>,
    pub scale_decay: Option<f32>,
    pub initial_alpha: Option<f32>,
    pub default_count: Option<usize>,
}

impl SpawnTable {
    /// Fill `base` with every field this table sets. Values are not checked
    /// here; [`SpawnParams::validate`] runs on the merged result.
    pub fn layer_over(self, base: SpawnParams) -> SpawnParams {
        SpawnParams {
            vx: self.vx.unwrap_or(base.vx),
            vy: self.vy.unwrap_or(base.vy),
            accel_y: self.accel_y.unwrap_or(base.accel_y),
            life_ms: self.life_ms.unwrap_or(base.life_ms),
            scale: self.scale.unwrap_or(base.scale),
            rotation_speed: self.rotation_speed.unwrap_or(base.rotation_speed),
            jitter: self.jitter.unwrap_or(base.jitter),
            fade: self.fade.unwrap_or(base.fade),
            scale_decay: self.scale_decay.unwrap_or(base.scale_decay),
            initial_alpha: self.initial_alpha.unwrap_or(base.initial_alpha),
            default_count: self.default_count.unwrap_or(base.default_count),
        }
    }
}

fn table_for<'de, D: Deserializer<'de>>(kind: ParticleKind, d: D) -> Result<SpawnParams, D::Error> {
    SpawnTable::deserialize(d).map(|t| t.layer_over(SpawnParams::for_kind(kind)))
}

pub(crate) fn confetti_table<'de, D: Deserializer<'de>>(d: D) -> Result<SpawnParams, D::Error> {
    table_for(ParticleKind::Confetti, d)
}

pub(crate) fn coin_table<'de, D: Deserializer<'de>>(d: D) -> Result<SpawnParams, D::Error> {
    table_for(ParticleKind::Coin, d)
}

pub(crate) fn sparkle_table<'de, D: Deserializer<'de>>(d: D) -> Result<SpawnParams, D::Error> {
    table_for(ParticleKind::Sparkle, d)
}

/// Per-call adjustments to a kind's spawn table. Unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnOverrides {
    pub vx: Option<Range>,
    pub vy: Option<Range>,
    pub accel_y: Option<f32>,
    pub life_ms: Option<Range>,
    pub scale: Option<Range>,
    pub rotation_speed: Option<Range>,
    pub scale_decay: Option<f32>,
    /// Single tint for every particle instead of the kind's colouring.
    pub tint: Option<Color>,
}

impl SpawnOverrides {
    pub fn with_life_ms(mut self, min: f32, max: f32) -> Self {
        self.life_ms = Some(Range::new(min, max));
        self
    }

    pub fn with_velocity(mut self, vx: Range, vy: Range) -> Self {
        self.vx = Some(vx);
        self.vy = Some(vy);
        self
    }

    pub fn with_scale_decay(mut self, decay: f32) -> Self {
        self.scale_decay = Some(decay);
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Layer these overrides over `base`. A malformed override is logged and
    /// the base value kept, so one bad field never aborts a burst.
    pub fn apply(&self, kind: ParticleKind, base: &SpawnParams) -> SpawnParams {
        let mut out = base.clone();
        let range = |name: &str, o: Option<Range>, fallback: Range| -> Range {
            match o {
                Some(r) if r.is_valid() => r,
                Some(r) => {
                    log::warn!("{}: ignoring malformed `{name}` override {r:?}", kind.name());
                    fallback
                }
                None => fallback,
            }
        };
        let scalar = |name: &str, o: Option<f32>, fallback: f32| -> f32 {
            match o {
                Some(v) if v.is_finite() => v,
                Some(v) => {
                    log::warn!("{}: ignoring non-finite `{name}` override {v}", kind.name());
                    fallback
                }
                None => fallback,
            }
        };

        out.vx = range("vx", self.vx, base.vx);
        out.vy = range("vy", self.vy, base.vy);
        out.scale = range("scale", self.scale, base.scale);
        out.rotation_speed = range("rotation_speed", self.rotation_speed, base.rotation_speed);
        out.life_ms = match self.life_ms {
            Some(r) if !(r.is_valid() && r.min > 0.0) => {
                log::warn!("{}: ignoring non-positive `life_ms` override {r:?}", kind.name());
                base.life_ms
            }
            other => range("life_ms", other, base.life_ms),
        };
        out.accel_y = scalar("accel_y", self.accel_y, base.accel_y);
        out.scale_decay = scalar("scale_decay", self.scale_decay, base.scale_decay).max(0.0);
        out
    }
}
