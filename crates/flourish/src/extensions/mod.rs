//! Tweening: easing curves and the frame-driven scheduler.
//! Independent of particles; demo code drives UI animations through it directly.

pub mod easing;
pub mod tween;

pub use easing::{ease, lerp, Easing};
pub use tween::{CompleteFn, Tween, TweenHandle, TweenScheduler, UpdateFn};
