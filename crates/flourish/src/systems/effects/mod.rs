//! Particle system and composite effects.
//!
//! `ParticleSystem` owns every live particle, every active composite effect
//! and the tween scheduler driving those effects. The host calls
//! [`ParticleSystem::advance`] once per frame; demo code triggers effects in
//! between.

mod composite;
mod geometry;
mod particle;
mod rng;
pub mod spawn;

pub use composite::EffectHandle;
pub use geometry::{ray_fan_triangles, rect_triangles};
pub use particle::{FadeMode, Particle};
pub use rng::Rng;
pub use spawn::{ParticleKind, Range, SpawnOverrides, SpawnParams, SpawnTable};

use glam::Vec2;

use crate::api::config::FxConfig;
use crate::api::error::{ensure_finite, ensure_non_negative, ensure_positive, FxError, FxResult};
use crate::api::types::{EffectId, NodeId};
use crate::components::color::{Color, PALETTE};
use crate::components::node::{Node, Visual};
use crate::core::cancel::CancelToken;
use crate::core::completion::Completion;
use crate::core::scene::Scene;
use crate::extensions::easing::Easing;
use crate::extensions::tween::{Tween, TweenScheduler};
use composite::{ActiveEffect, EffectKind};

/// Owns particles, composite effects and their tweens for one scene.
pub struct ParticleSystem {
    config: FxConfig,
    particles: Vec<Particle>,
    effects: Vec<ActiveEffect>,
    tweens: TweenScheduler,
    rng: Rng,
    root: CancelToken,
    next_effect: u32,
    torn_down: bool,
}

impl ParticleSystem {
    /// Create a system from a validated configuration.
    pub fn new(config: FxConfig) -> FxResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Default configuration with a specific RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_valid(FxConfig::default().with_seed(seed))
    }

    fn from_valid(config: FxConfig) -> Self {
        ParticleSystem {
            rng: Rng::new(config.seed.wrapping_add(7919)),
            config,
            particles: Vec::with_capacity(256),
            effects: Vec::new(),
            tweens: TweenScheduler::new(),
            root: CancelToken::new(),
            next_effect: 1,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    /// Parent of every effect's cancellation token. Cancelled by teardown.
    pub fn cancel_token(&self) -> CancelToken {
        self.root.clone()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Composite effects still running.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Tweens still scheduled by this system.
    pub fn pending_tweens(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ---- Frame loop ----

    /// Advance physics, effect tweens and effect cleanup by one frame.
    ///
    /// Expired particles leave the scene during this call. A closed scene
    /// is fatal: the system tears itself down and reports
    /// [`FxError::ResourceUnavailable`].
    pub fn advance(&mut self, delta_ms: f32, scene: &mut Scene) -> FxResult {
        if self.torn_down {
            return Ok(());
        }
        if scene.is_closed() {
            return Err(self.fail(scene, FxError::ResourceUnavailable("scene is closed")));
        }

        let delta = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        if delta > 0.0 {
            self.integrate(delta, scene);
        }
        self.tweens.tick(delta, scene);
        self.reap_effects(scene);
        Ok(())
    }

    fn integrate(&mut self, delta: f32, scene: &mut Scene) {
        let k = delta.min(self.config.max_step_ms) / self.config.reference_frame_ms;
        let fade_peak = self.config.fade_peak;
        self.particles.retain_mut(|p| {
            if !p.tick(delta, k, fade_peak) {
                scene.despawn(p.node);
                return false;
            }
            match scene.get_mut(p.node) {
                Some(node) => {
                    node.pos = p.pos;
                    node.rotation = p.rotation;
                    node.scale = Vec2::splat(p.scale);
                    node.alpha = p.alpha;
                    true
                }
                // The host removed the node; nothing left to drive.
                None => false,
            }
        });
    }

    /// Release and resolve effects whose tweens have settled.
    fn reap_effects(&mut self, scene: &mut Scene) {
        self.effects.retain(|effect| match effect.tween.outcome() {
            None => true,
            Some(outcome) => {
                effect.release(scene);
                if outcome.is_ok() {
                    log::debug!("effect {:?} finished", effect.id);
                }
                effect.completion.resolve(outcome);
                false
            }
        });
    }

    /// Destroy every particle and effect. Idempotent.
    ///
    /// In-flight effect tweens are cancelled before any node is released, so
    /// no callback can touch a destroyed node.
    pub fn teardown(&mut self, scene: &mut Scene) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.root.cancel();
        self.tweens.cancel_all();

        let effects = self.effects.len();
        for effect in self.effects.drain(..) {
            effect.release(scene);
            effect.completion.resolve(Err(FxError::Cancelled));
        }
        let particles = self.particles.len();
        for p in self.particles.drain(..) {
            scene.despawn(p.node);
        }
        log::info!("particle system torn down ({particles} particles, {effects} effects released)");
    }

    fn fail(&mut self, scene: &mut Scene, err: FxError) -> FxError {
        log::error!("particle system failed: {err}");
        self.teardown(scene);
        err
    }

    fn spawn_node(&mut self, scene: &mut Scene, node: Node) -> FxResult<NodeId> {
        match scene.try_spawn(node) {
            Ok(id) => Ok(id),
            Err(err) => Err(self.fail(scene, err)),
        }
    }

    // ---- Particle triggers ----

    /// Spawn `count` particles of `kind` around (x, y).
    ///
    /// New particles start moving on the next `advance`. Spawning zero
    /// particles, or spawning after teardown, is a silent no-op.
    pub fn spawn_burst(
        &mut self,
        scene: &mut Scene,
        kind: ParticleKind,
        x: f32,
        y: f32,
        count: usize,
        overrides: Option<&SpawnOverrides>,
    ) -> FxResult {
        ensure_finite("x", x)?;
        ensure_finite("y", y)?;
        if self.torn_down || count == 0 {
            return Ok(());
        }

        let base = self.config.params(kind).clone();
        let params = match overrides {
            Some(o) => o.apply(kind, &base),
            None => base.clone(),
        };
        let tint = overrides.and_then(|o| o.tint);
        let center = Vec2::new(x, y);

        for i in 0..count {
            let offset = Vec2::new(self.rng.signed(params.jitter[0]), self.rng.signed(params.jitter[1]));
            let color = tint.unwrap_or(match kind {
                ParticleKind::Confetti => PALETTE[i % PALETTE.len()],
                _ => Color::WHITE,
            });
            self.spawn_one(scene, kind, &params, &base, center + offset, color)?;
        }
        log::debug!("{}: spawned {count} at ({x:.1}, {y:.1})", kind.name());
        Ok(())
    }

    /// Confetti burst with the configured default count.
    pub fn confetti_burst(&mut self, scene: &mut Scene, x: f32, y: f32) -> FxResult {
        let count = self.config.confetti.default_count;
        self.spawn_burst(scene, ParticleKind::Confetti, x, y, count, None)
    }

    /// Coin shower with the configured default count.
    pub fn coin_burst(&mut self, scene: &mut Scene, x: f32, y: f32) -> FxResult {
        let count = self.config.coin.default_count;
        self.spawn_burst(scene, ParticleKind::Coin, x, y, count, None)
    }

    /// Sparkle field with the configured default radius and count.
    pub fn sparkles(&mut self, scene: &mut Scene, x: f32, y: f32) -> FxResult {
        let radius = self.config.sparkle_radius;
        let count = self.config.sparkle.default_count;
        self.sparkle_field(scene, x, y, radius, count)
    }

    /// Scatter `count` twinkling sparkles uniformly over the disc of
    /// `radius` around (x, y).
    pub fn sparkle_field(&mut self, scene: &mut Scene, x: f32, y: f32, radius: f32, count: usize) -> FxResult {
        ensure_finite("x", x)?;
        ensure_finite("y", y)?;
        ensure_non_negative("radius", radius)?;
        if self.torn_down || count == 0 {
            return Ok(());
        }

        let params = self.config.sparkle.clone();
        let center = Vec2::new(x, y);
        for _ in 0..count {
            let angle = self.rng.angle();
            // sqrt keeps the density uniform over the area.
            let r = radius * self.rng.next_f32().sqrt();
            let pos = center + Vec2::from_angle(angle) * r;
            self.spawn_one(scene, ParticleKind::Sparkle, &params, &params, pos, Color::WHITE)?;
        }
        log::debug!("sparkle: field of {count} at ({x:.1}, {y:.1}) r={radius}");
        Ok(())
    }

    /// Roll one particle from `params`. Any non-finite roll falls back to
    /// the midpoint of `fallback` so the rest of the batch still spawns.
    fn spawn_one(
        &mut self,
        scene: &mut Scene,
        kind: ParticleKind,
        params: &SpawnParams,
        fallback: &SpawnParams,
        pos: Vec2,
        tint: Color,
    ) -> FxResult {
        let rng = &mut self.rng;
        let mut roll = |name: &str, range: Range, fallback: Range| -> f32 {
            let v = range.sample(rng);
            if v.is_finite() {
                v
            } else {
                log::warn!("{}: `{name}` rolled {v}, using default", kind.name());
                (fallback.min + fallback.max) * 0.5
            }
        };

        let vel = Vec2::new(
            roll("vx", params.vx, fallback.vx),
            roll("vy", params.vy, fallback.vy),
        );
        let rotation_speed = roll("rotation_speed", params.rotation_speed, fallback.rotation_speed);
        let scale = roll("scale", params.scale, fallback.scale);
        let life = roll("life_ms", params.life_ms, fallback.life_ms);
        let rotation = self.rng.angle();
        let pos = if pos.is_finite() {
            pos
        } else {
            log::warn!("{}: spawn position {pos} is not finite, dropping offset", kind.name());
            Vec2::ZERO
        };

        let node = self.spawn_node(
            scene,
            Node::sprite(kind.texture())
                .with_pos(pos)
                .with_rotation(rotation)
                .with_scale(scale)
                .with_alpha(params.initial_alpha)
                .with_tint(tint),
        )?;

        self.particles.push(Particle {
            node,
            kind,
            pos,
            vel,
            accel: Vec2::new(0.0, params.accel_y),
            rotation,
            rotation_speed,
            scale,
            alpha: params.initial_alpha,
            life,
            max_life: life,
            fade: params.fade,
            scale_decay: params.scale_decay,
        });
        Ok(())
    }

    // ---- Composite effects ----

    fn next_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect);
        self.next_effect = self.next_effect.wrapping_add(1);
        id
    }

    /// Register an effect driven by `tweens` played in sequence.
    fn start_effect(
        &mut self,
        scene: &mut Scene,
        id: EffectId,
        kind: EffectKind,
        tweens: Vec<Tween>,
    ) -> FxResult<EffectHandle> {
        let token = self.root.child();
        let tweens = tweens.into_iter().map(|t| t.with_cancel(token.clone())).collect();
        let tween = match self.tweens.run_sequence(tweens, scene) {
            Ok(tween) => tween,
            Err(err) => {
                kind.release(scene);
                return Err(err);
            }
        };
        let completion = Completion::new();
        let effect = ActiveEffect { id, kind, tween, completion: completion.clone() };
        self.effects.push(effect);
        Ok(EffectHandle::new(id, token, completion))
    }

    /// Ray burst with the configured defaults.
    pub fn win_rays(&mut self, scene: &mut Scene, x: f32, y: f32) -> FxResult<EffectHandle> {
        let rays = &self.config.rays;
        let (count, color, life_ms) = (rays.count, rays.color, rays.life_ms);
        self.directional_rays_burst(scene, x, y, count, color, life_ms)
    }

    /// Fan of `ray_count` rays at (x, y) that turns and fades out over
    /// `life_ms`, then removes itself.
    pub fn directional_rays_burst(
        &mut self,
        scene: &mut Scene,
        x: f32,
        y: f32,
        ray_count: u32,
        color: Color,
        life_ms: f32,
    ) -> FxResult<EffectHandle> {
        ensure_finite("x", x)?;
        ensure_finite("y", y)?;
        ensure_positive("life_ms", life_ms)?;
        let id = self.next_effect_id();
        if self.torn_down {
            return Ok(EffectHandle::cancelled(id));
        }

        let cfg = &self.config.rays;
        let visual = Visual::RayFan {
            rays: ray_count,
            length: cfg.length,
            half_width: cfg.half_width,
            fill_alpha: cfg.fill_alpha,
        };
        let spin = cfg.spin;
        let node = self.spawn_node(scene, Node::new(visual).with_pos(Vec2::new(x, y)).with_tint(color))?;
        let from_rotation = 0.0;

        let tween = Tween::new(0.0, 1.0, life_ms, Easing::CubicOut)
            .on_update(move |t, scene| {
                if let Some(n) = scene.get_mut(node) {
                    n.rotation = from_rotation + t * spin;
                    n.alpha = 1.0 - t;
                }
            })
            .on_complete(move |scene| {
                scene.despawn(node);
            });
        self.start_effect(scene, id, EffectKind::Rays { node }, vec![tween])
    }

    /// Flash with the configured defaults.
    pub fn flash(&mut self, scene: &mut Scene) -> FxResult<EffectHandle> {
        let f = &self.config.flash;
        let (color, peak, total) = (f.color, f.peak_alpha, f.total_ms);
        self.screen_flash(scene, color, peak, total)
    }

    /// Cover the viewport with `color`, ramp its opacity up to `peak_alpha`
    /// over the rise share of `total_ms`, back to zero over the rest, then
    /// remove the overlay.
    pub fn screen_flash(
        &mut self,
        scene: &mut Scene,
        color: Color,
        peak_alpha: f32,
        total_ms: f32,
    ) -> FxResult<EffectHandle> {
        ensure_non_negative("peak_alpha", peak_alpha)?;
        ensure_positive("total_ms", total_ms)?;
        let id = self.next_effect_id();
        if self.torn_down {
            return Ok(EffectHandle::cancelled(id));
        }

        let viewport = scene.viewport();
        let z_index = self.config.flash.z_index;
        let rise_ms = total_ms * self.config.flash.rise_fraction;
        let fall_ms = total_ms - rise_ms;
        let node = self.spawn_node(
            scene,
            Node::new(Visual::Overlay { width: viewport.x, height: viewport.y })
                .with_alpha(0.0)
                .with_tint(color)
                .with_z_index(z_index),
        )?;

        let rise = Tween::node_alpha(node, 0.0, peak_alpha, rise_ms, Easing::CubicOut);
        let fall = Tween::node_alpha(node, peak_alpha, 0.0, fall_ms, Easing::CubicInOut).on_complete(move |scene| {
            scene.despawn(node);
        });
        self.start_effect(scene, id, EffectKind::Flash { node }, vec![rise, fall])
    }

    /// Shake with the configured defaults.
    pub fn shake_default(&mut self, scene: &mut Scene, target: NodeId) -> FxResult<EffectHandle> {
        let s = &self.config.shake;
        let (intensity, duration) = (s.intensity, s.duration_ms);
        self.shake(scene, target, intensity, duration)
    }

    /// Jitter `target` around its current position with an amplitude that
    /// decays linearly from `intensity` to zero over `duration_ms`.
    ///
    /// The original position is restored exactly when the shake completes,
    /// is cancelled, or the system is torn down.
    pub fn shake(
        &mut self,
        scene: &mut Scene,
        target: NodeId,
        intensity: f32,
        duration_ms: f32,
    ) -> FxResult<EffectHandle> {
        ensure_non_negative("intensity", intensity)?;
        ensure_positive("duration_ms", duration_ms)?;
        let current = scene
            .get(target)
            .map(|n| n.pos)
            .ok_or_else(|| FxError::invalid("target", "node is not in the scene"))?;
        let id = self.next_effect_id();
        if self.torn_down {
            return Ok(EffectHandle::cancelled(id));
        }

        // A target that is already shaking rests where the first shake found it.
        let base = self
            .effects
            .iter()
            .find_map(|e| e.shake_base(target))
            .unwrap_or(current);
        let mut rng = self.rng.fork();
        let tween = Tween::new(0.0, 1.0, duration_ms, Easing::Linear)
            .on_update(move |t, scene| {
                let amplitude = intensity * (1.0 - t);
                let offset = Vec2::new(rng.signed(amplitude), rng.signed(amplitude));
                if let Some(n) = scene.get_mut(target) {
                    n.pos = base + offset;
                }
            })
            .on_complete(move |scene| {
                if let Some(n) = scene.get_mut(target) {
                    n.pos = base;
                }
            });
        self.start_effect(scene, id, EffectKind::Shake { target, base }, vec![tween])
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::from_valid(FxConfig::default())
    }
}
