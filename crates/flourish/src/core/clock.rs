//! Host frame timestamps to per-frame deltas.

/// Turns host frame timestamps into per-frame deltas.
///
/// Mirrors what display loops hand out: the first frame, and any frame whose
/// delta is zero, negative or not a number, reports `fallback_ms` instead.
pub struct FrameClock {
    fallback_ms: f32,
    last: Option<f64>,
}

impl FrameClock {
    pub const DEFAULT_FALLBACK_MS: f32 = 16.7;

    pub fn new(fallback_ms: f32) -> Self {
        Self {
            fallback_ms,
            last: None,
        }
    }

    /// Record a frame at `now_ms`. Returns milliseconds since the previous frame.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            return self.fallback_ms;
        }
        let delta = self.last.map(|last| (now_ms - last) as f32);
        self.last = Some(now_ms);
        match delta {
            Some(d) if d > 0.0 && d.is_finite() => d,
            _ => self.fallback_ms,
        }
    }

    /// Forget the previous timestamp (after a pause or tab switch).
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn fallback_ms(&self) -> f32 {
        self.fallback_ms
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FALLBACK_MS)
    }
}
