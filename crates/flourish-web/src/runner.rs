use flourish::systems::render::build_render_buffer;
use flourish::{
    Color, EffectHandle, Easing, FrameClock, FxConfig, FxError, FxResult, Node, NodeId, ParticleKind,
    ParticleSystem, RenderBuffer, Scene, Tween, TweenHandle, TweenScheduler,
};
use glam::Vec2;

/// Outcome codes written into the event stream.
pub const OUTCOME_DONE: f32 = 1.0;
pub const OUTCOME_CANCELLED: f32 = 2.0;

/// A settled effect, as read by the host: 2 floats per record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxEvent {
    pub effect_id: f32,
    pub outcome: f32,
}

impl FxEvent {
    pub const FLOATS: usize = 2;
}

/// Wires the effects engine to a host frame loop.
///
/// The host owns one runner (`thread_local!` in the wasm exports), calls
/// [`FxRunner::frame`] from its display callback, and reads the render
/// buffer back through the pointer accessors.
pub struct FxRunner {
    scene: Scene,
    fx: ParticleSystem,
    /// UI animations that are not effects (press pulses on the stage).
    ui: TweenScheduler,
    clock: FrameClock,
    render_buffer: RenderBuffer,
    /// Root group the host offsets everything by; the shake target.
    stage: NodeId,
    /// The press pulse currently playing on the stage, if any.
    pulse: Option<TweenHandle>,
    pending: Vec<EffectHandle>,
    events: Vec<FxEvent>,
}

impl FxRunner {
    pub fn new(width: f32, height: f32, config: FxConfig) -> FxResult<Self> {
        let clock = FrameClock::new(config.fallback_frame_ms);
        let fx = ParticleSystem::new(config)?;
        let mut scene = Scene::new();
        scene.set_viewport(width, height);
        let stage = scene.try_spawn(Node::group())?;

        Ok(Self {
            scene,
            fx,
            ui: TweenScheduler::new(),
            clock,
            render_buffer: RenderBuffer::new(),
            stage,
            pulse: None,
            pending: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.scene.set_viewport(width, height);
    }

    /// Run one display frame at host time `now_ms`: UI tweens, particles and
    /// effects, then settle events and the render buffer.
    pub fn frame(&mut self, now_ms: f64) -> FxResult {
        let dt = self.clock.tick(now_ms);
        self.ui.tick(dt, &mut self.scene);
        let result = self.fx.advance(dt, &mut self.scene);
        self.collect_settled();
        build_render_buffer(&self.scene, &mut self.render_buffer);
        result
    }

    fn collect_settled(&mut self) {
        let events = &mut self.events;
        self.pending.retain(|handle| match handle.outcome() {
            None => true,
            Some(outcome) => {
                events.push(FxEvent {
                    effect_id: handle.id().0 as f32,
                    outcome: match outcome {
                        Ok(()) => OUTCOME_DONE,
                        Err(_) => OUTCOME_CANCELLED,
                    },
                });
                false
            }
        });
    }

    fn track(&mut self, handle: EffectHandle) -> u32 {
        let id = handle.id().0;
        self.pending.push(handle);
        id
    }

    // ---- Triggers ----

    pub fn confetti(&mut self, x: f32, y: f32) -> FxResult {
        self.fx.confetti_burst(&mut self.scene, x, y)
    }

    pub fn coins(&mut self, x: f32, y: f32) -> FxResult {
        self.fx.coin_burst(&mut self.scene, x, y)
    }

    pub fn sparkles(&mut self, x: f32, y: f32) -> FxResult {
        self.fx.sparkles(&mut self.scene, x, y)
    }

    /// Confetti burst with an explicit particle count.
    pub fn confetti_burst(&mut self, x: f32, y: f32, count: usize) -> FxResult {
        self.fx.spawn_burst(&mut self.scene, ParticleKind::Confetti, x, y, count, None)
    }

    /// Coin shower with an explicit particle count.
    pub fn coin_burst(&mut self, x: f32, y: f32, count: usize) -> FxResult {
        self.fx.spawn_burst(&mut self.scene, ParticleKind::Coin, x, y, count, None)
    }

    pub fn sparkle_field(&mut self, x: f32, y: f32, radius: f32, count: usize) -> FxResult {
        self.fx.sparkle_field(&mut self.scene, x, y, radius, count)
    }

    /// Start a ray burst. Returns the effect id reported in the event stream.
    pub fn rays(&mut self, x: f32, y: f32) -> FxResult<u32> {
        let handle = self.fx.win_rays(&mut self.scene, x, y)?;
        Ok(self.track(handle))
    }

    pub fn flash(&mut self, color: Color, peak_alpha: f32, total_ms: f32) -> FxResult<u32> {
        let handle = self.fx.screen_flash(&mut self.scene, color, peak_alpha, total_ms)?;
        Ok(self.track(handle))
    }

    /// Shake the whole stage.
    pub fn shake(&mut self, intensity: f32, duration_ms: f32) -> FxResult<u32> {
        let handle = self.fx.shake(&mut self.scene, self.stage, intensity, duration_ms)?;
        Ok(self.track(handle))
    }

    /// Button-press pulse on the stage scale: up to 1.06, then back to 1.
    /// A pulse that is still playing is replaced, starting from the current scale.
    pub fn pulse(&mut self) -> FxResult {
        if self.fx.is_torn_down() {
            return Ok(());
        }
        self.stop_pulse();
        let stage = self.stage;
        let from = self.stage_scale();
        let up = Tween::node_scale(stage, from, 1.06, 110.0, Easing::CubicOut);
        let down = Tween::node_scale(stage, 1.06, 1.0, 160.0, Easing::CubicOut);
        self.pulse = Some(self.ui.run_sequence(vec![up, down], &mut self.scene)?);
        Ok(())
    }

    fn stop_pulse(&mut self) {
        if let Some(handle) = self.pulse.take() {
            self.ui.cancel(handle.id());
        }
    }

    /// UI tweens still playing.
    pub fn ui_tween_count(&self) -> usize {
        self.ui.len()
    }

    /// Cancel a pending effect. It settles as cancelled on the next frame.
    pub fn cancel(&mut self, effect_id: u32) -> bool {
        match self.pending.iter().find(|h| h.id().0 == effect_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Destroy everything the engine owns. Idempotent.
    pub fn teardown(&mut self) {
        self.stop_pulse();
        self.ui.cancel_all();
        if let Some(stage) = self.scene.get_mut(self.stage) {
            stage.scale = Vec2::ONE;
        }
        self.fx.teardown(&mut self.scene);
        self.collect_settled();
        self.render_buffer.clear();
    }

    /// Take every event recorded since the last drain, flattened.
    pub fn drain_events(&mut self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.events.len() * FxEvent::FLOATS);
        for e in self.events.drain(..) {
            out.push(e.effect_id);
            out.push(e.outcome);
        }
        out
    }

    // ---- Accessors for zero-copy host reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn shapes_ptr(&self) -> *const f32 {
        self.render_buffer.shapes_ptr()
    }

    pub fn shape_vertex_count(&self) -> u32 {
        self.render_buffer.shape_vertex_count()
    }

    pub fn stage_x(&self) -> f32 {
        self.stage_node().map_or(0.0, |n| n.pos.x)
    }

    pub fn stage_y(&self) -> f32 {
        self.stage_node().map_or(0.0, |n| n.pos.y)
    }

    pub fn stage_scale(&self) -> f32 {
        self.stage_node().map_or(1.0, |n| n.scale.x)
    }

    fn stage_node(&self) -> Option<&Node> {
        self.scene.get(self.stage)
    }

    pub fn particle_count(&self) -> u32 {
        self.fx.particle_count() as u32
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Simulate the renderer going away; the next frame fails.
    pub fn close_scene(&mut self) {
        self.scene.close();
    }
}

/// Error for calls that arrive before `fx_init`.
pub fn not_initialized() -> FxError {
    FxError::ResourceUnavailable("runner not initialized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flourish::Visual;

    fn runner() -> FxRunner {
        FxRunner::new(800.0, 600.0, FxConfig::default().with_seed(9)).unwrap()
    }

    fn frames(r: &mut FxRunner, start_ms: f64, count: usize) -> f64 {
        let mut t = start_ms;
        for _ in 0..count {
            t += 16.7;
            r.frame(t).unwrap();
        }
        t
    }

    #[test]
    fn bursts_render_as_instances() {
        let mut r = runner();
        r.confetti(100.0, 100.0).unwrap();
        r.frame(0.0).unwrap();
        assert_eq!(r.instance_count(), 48);
        assert_eq!(r.particle_count(), 48);

        frames(&mut r, 0.0, 130);
        assert_eq!(r.particle_count(), 0);
        assert_eq!(r.instance_count(), 0);
    }

    #[test]
    fn finished_flash_reports_done_event() {
        let mut r = runner();
        let id = r.flash(Color::WHITE, 0.35, 240.0).unwrap();
        r.frame(0.0).unwrap();
        assert!(r.shape_vertex_count() >= 6);

        frames(&mut r, 0.0, 30);
        assert_eq!(r.drain_events(), vec![id as f32, OUTCOME_DONE]);
        assert!(r.drain_events().is_empty());
        assert_eq!(r.shape_vertex_count(), 0);
    }

    #[test]
    fn cancelled_rays_report_cancelled_event() {
        let mut r = runner();
        let id = r.rays(400.0, 300.0).unwrap();
        let t = frames(&mut r, 0.0, 3);
        assert!(r.cancel(id));
        frames(&mut r, t, 1);
        assert_eq!(r.drain_events(), vec![id as f32, OUTCOME_CANCELLED]);
        assert!(!r.scene().iter().any(|(_, n)| matches!(n.visual, Visual::RayFan { .. })));
        assert!(!r.cancel(id));
    }

    #[test]
    fn stage_shake_returns_to_origin() {
        let mut r = runner();
        let id = r.shake(6.0, 300.0).unwrap();
        frames(&mut r, 0.0, 30);
        assert_eq!(r.drain_events(), vec![id as f32, OUTCOME_DONE]);
        assert_eq!((r.stage_x(), r.stage_y()), (0.0, 0.0));
    }

    #[test]
    fn pulse_scales_stage_and_settles_at_one() {
        let mut r = runner();
        r.pulse().unwrap();
        let t = frames(&mut r, 0.0, 7);
        assert!(r.stage_scale() > 1.0);
        frames(&mut r, t, 20);
        assert_eq!(r.stage_scale(), 1.0);
    }

    #[test]
    fn explicit_counts_reach_the_scene() {
        let mut r = runner();
        r.confetti_burst(0.0, 0.0, 60).unwrap();
        r.coin_burst(0.0, 0.0, 5).unwrap();
        r.sparkle_field(300.0, 300.0, 220.0, 30).unwrap();
        r.frame(0.0).unwrap();
        assert_eq!(r.particle_count(), 95);
        let far = r
            .scene()
            .iter()
            .filter(|(_, n)| n.pos.distance(Vec2::new(300.0, 300.0)) > 48.0 && n.pos.distance(Vec2::ZERO) > 100.0)
            .count();
        assert!(far > 0);
    }

    #[test]
    fn repeated_pulse_replaces_the_running_one() {
        let mut r = runner();
        r.pulse().unwrap();
        let t = frames(&mut r, 0.0, 3);
        let mid = r.stage_scale();
        r.pulse().unwrap();
        assert_eq!(r.ui_tween_count(), 1);

        let t = frames(&mut r, t, 1);
        assert!(r.stage_scale() >= mid);
        frames(&mut r, t, 30);
        assert_eq!(r.stage_scale(), 1.0);
        assert_eq!(r.ui_tween_count(), 0);
    }

    #[test]
    fn teardown_mid_pulse_restores_stage_scale() {
        let mut r = runner();
        r.pulse().unwrap();
        frames(&mut r, 0.0, 3);
        assert!(r.stage_scale() > 1.0);

        r.teardown();
        assert_eq!(r.stage_scale(), 1.0);
        assert_eq!(r.ui_tween_count(), 0);
    }

    #[test]
    fn teardown_cancels_pending_effects() {
        let mut r = runner();
        let flash = r.flash(Color::WHITE, 0.35, 240.0).unwrap();
        let shake = r.shake(6.0, 300.0).unwrap();
        r.coins(10.0, 10.0).unwrap();
        frames(&mut r, 0.0, 2);

        r.teardown();
        r.teardown();
        let events = r.drain_events();
        assert_eq!(events, vec![flash as f32, OUTCOME_CANCELLED, shake as f32, OUTCOME_CANCELLED]);
        assert_eq!(r.particle_count(), 0);
        assert_eq!(r.instance_count(), 0);
        assert_eq!(r.scene().len(), 1);
    }

    #[test]
    fn closed_scene_fails_frame_and_settles_effects() {
        let mut r = runner();
        let id = r.flash(Color::BLACK, 0.5, 200.0).unwrap();
        r.close_scene();
        assert!(matches!(r.frame(16.7), Err(FxError::ResourceUnavailable(_))));
        assert_eq!(r.drain_events(), vec![id as f32, OUTCOME_CANCELLED]);
        assert!(r.frame(33.4).is_ok());
    }
}
