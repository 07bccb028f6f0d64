//! Easing curves for tweens. Pure math, no scene access.
//! Every built-in curve maps 0 -> 0 and 1 -> 1; Back and Elastic overshoot in between.

use std::f32::consts::PI;

/// Shape of a tween's progress over normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// Constant rate.
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    /// Fast start, gentle landing. Default for effect ramps.
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// Pulls back before leaving.
    BackIn,
    /// Overshoots the target, then settles.
    BackOut,
    BackInOut,
    BounceOut,
    ElasticOut,
    /// Caller-supplied curve. Should satisfy f(0) = 0 and f(1) = 1.
    Custom(fn(f32) -> f32),
}

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;

impl Easing {
    /// Evaluate the curve at `t`, clamped to [0, 1] first.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t.powi(2),
            Easing::QuadOut => out(t, |u| u.powi(2)),
            Easing::QuadInOut => in_out_poly(t, 2),
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => out(t, |u| u.powi(3)),
            Easing::CubicInOut => in_out_poly(t, 3),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => out(t, |u| u.powi(4)),
            Easing::QuartInOut => in_out_poly(t, 4),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => (1.0 - (PI * t).cos()) / 2.0,
            Easing::ExpoIn => pin_ends(t, |t| 2.0_f32.powf(10.0 * t - 10.0)),
            Easing::ExpoOut => pin_ends(t, |t| 1.0 - 2.0_f32.powf(-10.0 * t)),
            Easing::ExpoInOut => pin_ends(t, |t| {
                if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }),
            Easing::BackIn => BACK_C3 * t.powi(3) - BACK_C1 * t.powi(2),
            Easing::BackOut => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Easing::BackInOut => {
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (2.0 * t - 2.0) + BACK_C2) + 2.0) / 2.0
                }
            }
            Easing::BounceOut => bounce_out(t),
            Easing::ElasticOut => pin_ends(t, |t| {
                const C4: f32 = (2.0 * PI) / 3.0;
                2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
            }),
            Easing::Custom(f) => f(t),
        }
    }
}

/// Mirror an ease-in curve into its ease-out counterpart.
#[inline]
fn out(t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    1.0 - ease_in(1.0 - t)
}

#[inline]
fn in_out_poly(t: f32, n: i32) -> f32 {
    if t < 0.5 {
        2.0_f32.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

/// Exponential curves only approach their endpoints; force them exact.
#[inline]
fn pin_ends(t: f32, f: impl Fn(f32) -> f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        f(t)
    }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Linear interpolation. `t` is not clamped, so overshooting curves carry through.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate from `a` to `b` along `easing` at normalized time `t`.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}
