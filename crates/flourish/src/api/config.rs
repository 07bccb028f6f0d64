//! Engine configuration, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::api::error::{ensure_finite, ensure_non_negative, ensure_positive, FxError, FxResult};
use crate::components::color::Color;
use crate::systems::effects::spawn::{self, ParticleKind, SpawnParams};

/// Engine configuration. Every field has a default, so a host can load a
/// partial JSON document and tune only what it cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Seed for particle randomisation (default: 42).
    pub seed: u64,
    /// Frame duration the per-frame velocities are tuned for (default: 16.6667 ms).
    pub reference_frame_ms: f32,
    /// Longest step fed to the kinematics; longer frames are clamped (default: 50 ms).
    pub max_step_ms: f32,
    /// Delta reported by the frame clock when the host gives none (default: 16.7 ms).
    pub fallback_frame_ms: f32,
    /// Fraction of life at which fade-in-then-out particles peak (default: 0.45).
    pub fade_peak: f32,
    /// Default radius of a sparkle field (default: 48).
    pub sparkle_radius: f32,
    /// Per-kind spawn tables. Partial tables are layered over the kind defaults.
    #[serde(deserialize_with = "spawn::confetti_table")]
    pub confetti: SpawnParams,
    #[serde(deserialize_with = "spawn::coin_table")]
    pub coin: SpawnParams,
    #[serde(deserialize_with = "spawn::sparkle_table")]
    pub sparkle: SpawnParams,
    pub rays: RaysConfig,
    pub flash: FlashConfig,
    pub shake: ShakeConfig,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            reference_frame_ms: 16.6667,
            max_step_ms: 50.0,
            fallback_frame_ms: 16.7,
            fade_peak: 0.45,
            sparkle_radius: 48.0,
            confetti: SpawnParams::confetti(),
            coin: SpawnParams::coin(),
            sparkle: SpawnParams::sparkle(),
            rays: RaysConfig::default(),
            flash: FlashConfig::default(),
            shake: ShakeConfig::default(),
        }
    }
}

/// Defaults for the rotating ray burst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaysConfig {
    pub count: u32,
    pub color: Color,
    pub life_ms: f32,
    /// Radians the group turns over its life.
    pub spin: f32,
    pub length: f32,
    pub half_width: f32,
    /// Fill opacity of each ray at full group opacity.
    pub fill_alpha: f32,
}

impl Default for RaysConfig {
    fn default() -> Self {
        Self {
            count: 16,
            color: Color(0xf1f5f9),
            life_ms: 1200.0,
            spin: 0.8,
            length: 200.0,
            half_width: 6.0,
            fill_alpha: 0.35,
        }
    }
}

/// Defaults for the full-screen flash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    pub color: Color,
    pub peak_alpha: f32,
    pub total_ms: f32,
    /// Share of the duration spent ramping up; the rest fades out.
    pub rise_fraction: f32,
    pub z_index: i32,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            peak_alpha: 0.35,
            total_ms: 220.0,
            rise_fraction: 0.35,
            z_index: 9999,
        }
    }
}

/// Defaults for positional shake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    pub intensity: f32,
    pub duration_ms: f32,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            intensity: 6.0,
            duration_ms: 300.0,
        }
    }
}

impl FxConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> FxResult<Self> {
        let config: FxConfig =
            serde_json::from_str(json).map_err(|e| FxError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Spawn table for a particle kind.
    pub fn params(&self, kind: ParticleKind) -> &SpawnParams {
        match kind {
            ParticleKind::Confetti => &self.confetti,
            ParticleKind::Coin => &self.coin,
            ParticleKind::Sparkle => &self.sparkle,
        }
    }

    /// Reject values the engine would otherwise have to clamp silently.
    pub fn validate(&self) -> FxResult {
        ensure_positive("reference_frame_ms", self.reference_frame_ms)?;
        ensure_positive("max_step_ms", self.max_step_ms)?;
        ensure_positive("fallback_frame_ms", self.fallback_frame_ms)?;
        ensure_non_negative("sparkle_radius", self.sparkle_radius)?;
        if !(self.fade_peak > 0.0 && self.fade_peak < 1.0) {
            return Err(FxError::invalid("fade_peak", "must lie strictly between 0 and 1"));
        }
        for kind in ParticleKind::ALL {
            self.params(kind).validate(kind)?;
        }

        ensure_positive("rays.life_ms", self.rays.life_ms)?;
        ensure_finite("rays.spin", self.rays.spin)?;
        ensure_non_negative("rays.length", self.rays.length)?;
        ensure_non_negative("rays.half_width", self.rays.half_width)?;
        ensure_non_negative("rays.fill_alpha", self.rays.fill_alpha)?;

        ensure_positive("flash.total_ms", self.flash.total_ms)?;
        ensure_non_negative("flash.peak_alpha", self.flash.peak_alpha)?;
        if !(self.flash.rise_fraction > 0.0 && self.flash.rise_fraction < 1.0) {
            return Err(FxError::invalid("flash.rise_fraction", "must lie strictly between 0 and 1"));
        }

        ensure_non_negative("shake.intensity", self.shake.intensity)?;
        ensure_positive("shake.duration_ms", self.shake.duration_ms)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        FxConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = FxConfig::from_json(r#"{ "seed": 7, "flash": { "total_ms": 240.0 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.flash.total_ms, 240.0);
        assert_eq!(config.flash.peak_alpha, 0.35);
        assert_eq!(config.rays.count, 16);
        assert_eq!(config.coin.default_count, 18);
    }

    #[test]
    fn partial_spawn_table_keeps_kind_defaults() {
        let config = FxConfig::from_json(r#"{ "confetti": { "default_count": 60 } }"#).unwrap();
        assert_eq!(config.confetti, SpawnParams { default_count: 60, ..SpawnParams::confetti() });
        assert_eq!(config.coin, SpawnParams::coin());
        assert_eq!(config.sparkle, SpawnParams::sparkle());
    }

    #[test]
    fn partial_spawn_table_is_still_validated() {
        let err = FxConfig::from_json(r#"{ "sparkle": { "life_ms": { "min": 900.0, "max": 100.0 } } }"#).unwrap_err();
        assert!(matches!(err, FxError::InvalidParameter { name: "life_ms", .. }));
    }

    #[test]
    fn malformed_json_is_invalid_parameter() {
        let err = FxConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, FxError::InvalidParameter { name: "config", .. }));
    }

    #[test]
    fn out_of_range_values_fail_fast() {
        assert!(FxConfig::from_json(r#"{ "fade_peak": 1.5 }"#).is_err());
        assert!(FxConfig::from_json(r#"{ "max_step_ms": 0.0 }"#).is_err());
        assert!(FxConfig::from_json(r#"{ "shake": { "duration_ms": -1.0 } }"#).is_err());
    }

    #[test]
    fn params_lookup_by_kind() {
        let config = FxConfig::default();
        assert_eq!(config.params(ParticleKind::Sparkle).life_ms.max, 860.0);
    }
}
