//! Tween scheduler: interpolates scalars over frame time and hands each value
//! to a caller callback. Driven by the host frame clock through `tick`.
//!
//! ```ignore
//! let mut tweens = TweenScheduler::new();
//! let pulse = tweens.run(Tween::node_scale(button, 1.0, 1.06, 110.0, Easing::CubicOut), &mut scene)?;
//! tweens.tick(delta_ms, &mut scene);   // once per frame
//! pulse.await?;                        // or poll `pulse.outcome()` each frame
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::api::error::{ensure_finite, ensure_non_negative, FxError, FxResult};
use crate::api::types::{NodeId, TweenId};
use crate::core::cancel::CancelToken;
use crate::core::completion::Completion;
use crate::core::scene::Scene;
use super::easing::{ease, Easing};

/// Receives every interpolated value, plus the scene to write it into.
pub type UpdateFn = Box<dyn FnMut(f32, &mut Scene)>;
/// Runs once after the final value was delivered.
pub type CompleteFn = Box<dyn FnOnce(&mut Scene)>;

/// A time-bounded interpolation from `from` to `to`.
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Duration in milliseconds. Zero completes on submission.
    pub duration_ms: f32,
    pub easing: Easing,
    elapsed_ms: f32,
    on_update: Option<UpdateFn>,
    on_complete: Option<CompleteFn>,
    cancel: Option<CancelToken>,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing,
            elapsed_ms: 0.0,
            on_update: None,
            on_complete: None,
            cancel: None,
        }
    }

    /// Animate a node's opacity.
    pub fn node_alpha(node: NodeId, from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self::new(from, to, duration_ms, easing).on_update(move |v, scene| {
            if let Some(n) = scene.get_mut(node) {
                n.alpha = v;
            }
        })
    }

    /// Animate a node's uniform scale.
    pub fn node_scale(node: NodeId, from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self::new(from, to, duration_ms, easing).on_update(move |v, scene| {
            if let Some(n) = scene.get_mut(node) {
                n.scale = glam::Vec2::splat(v);
            }
        })
    }

    /// Animate a node's rotation (radians).
    pub fn node_rotation(node: NodeId, from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self::new(from, to, duration_ms, easing).on_update(move |v, scene| {
            if let Some(n) = scene.get_mut(node) {
                n.rotation = v;
            }
        })
    }

    /// Animate a node's x position.
    pub fn node_x(node: NodeId, from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self::new(from, to, duration_ms, easing).on_update(move |v, scene| {
            if let Some(n) = scene.get_mut(node) {
                n.pos.x = v;
            }
        })
    }

    /// Animate a node's y position.
    pub fn node_y(node: NodeId, from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self::new(from, to, duration_ms, easing).on_update(move |v, scene| {
            if let Some(n) = scene.get_mut(node) {
                n.pos.y = v;
            }
        })
    }

    // -- Builder methods --

    pub fn on_update(mut self, f: impl FnMut(f32, &mut Scene) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(&mut Scene) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Abort this tween when `token` (or any of its ancestors) is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).min(1.0)
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Value at normalized time `t`. Exactly `to` once `t` reaches 1.
    pub fn value_at(&self, t: f32) -> f32 {
        if t >= 1.0 {
            self.to
        } else {
            ease(self.from, self.to, t, self.easing)
        }
    }

    fn validate(&self) -> FxResult {
        ensure_finite("from", self.from)?;
        ensure_finite("to", self.to)?;
        ensure_non_negative("duration_ms", self.duration_ms)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Advance time and deliver the new value. Returns true once finished.
    fn step(&mut self, delta_ms: f32, scene: &mut Scene) -> bool {
        self.elapsed_ms += delta_ms;
        let t = self.progress();
        let value = self.value_at(t);
        if let Some(f) = self.on_update.as_mut() {
            f(value, scene);
        }
        t >= 1.0
    }

    /// Deliver `to` once and fire the completion callback.
    fn finish_immediately(&mut self, scene: &mut Scene) {
        self.elapsed_ms = self.duration_ms;
        if let Some(f) = self.on_update.as_mut() {
            f(self.to, scene);
        }
        self.complete(scene);
    }

    fn complete(&mut self, scene: &mut Scene) {
        if let Some(f) = self.on_complete.take() {
            f(scene);
        }
    }
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("elapsed_ms", &self.elapsed_ms)
            .finish_non_exhaustive()
    }
}

/// Awaitable handle to a submitted tween or sequence.
///
/// Dropping it does not stop the tween.
#[derive(Debug, Clone)]
pub struct TweenHandle {
    id: TweenId,
    token: CancelToken,
    completion: Completion,
}

impl TweenHandle {
    pub fn id(&self) -> TweenId {
        self.id
    }

    /// Request cancellation. Observed on the next scheduler tick.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `None` while running.
    pub fn outcome(&self) -> Option<FxResult> {
        self.completion.outcome()
    }

    pub fn is_done(&self) -> bool {
        self.completion.is_done()
    }

    pub fn completion(&self) -> &Completion {
        &self.completion
    }
}

impl Future for TweenHandle {
    type Output = FxResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<FxResult> {
        Pin::new(&mut self.completion).poll(cx)
    }
}

enum Settle {
    Running,
    Finished,
    Cancelled,
}

/// One submitted run: the playing tween and whatever is queued behind it.
struct Run {
    id: TweenId,
    current: Tween,
    queue: VecDeque<Tween>,
    token: CancelToken,
    completion: Completion,
}

impl Run {
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.current.is_cancelled()
    }

    /// Move past finished steps. Zero-length steps complete on the spot.
    fn settle(&mut self, scene: &mut Scene) -> Settle {
        loop {
            if self.is_cancelled() {
                return Settle::Cancelled;
            }
            if self.current.duration_ms > 0.0 {
                return Settle::Running;
            }
            self.current.finish_immediately(scene);
            match self.queue.pop_front() {
                Some(next) => self.current = next,
                None => return Settle::Finished,
            }
        }
    }
}

/// Owns every active tween and advances them once per frame.
#[derive(Default)]
pub struct TweenScheduler {
    runs: Vec<Run>,
    next_id: u32,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a tween. Invalid parameters fail here, before anything is scheduled.
    pub fn run(&mut self, tween: Tween, scene: &mut Scene) -> FxResult<TweenHandle> {
        self.run_sequence(vec![tween], scene)
    }

    /// Submit tweens that play back to back under a single handle.
    /// Each step starts on the frame after the previous one finished.
    pub fn run_sequence(&mut self, tweens: Vec<Tween>, scene: &mut Scene) -> FxResult<TweenHandle> {
        if tweens.is_empty() {
            return Err(FxError::invalid("tweens", "sequence is empty"));
        }
        for t in &tweens {
            t.validate()?;
        }

        let id = TweenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let mut queue: VecDeque<Tween> = tweens.into();
        let current = match queue.pop_front() {
            Some(t) => t,
            None => return Err(FxError::invalid("tweens", "sequence is empty")),
        };
        let mut run = Run {
            id,
            current,
            queue,
            token: CancelToken::new(),
            completion: Completion::new(),
        };
        let handle = TweenHandle {
            id,
            token: run.token.clone(),
            completion: run.completion.clone(),
        };

        match run.settle(scene) {
            Settle::Running => self.runs.push(run),
            Settle::Finished => run.completion.resolve(Ok(())),
            Settle::Cancelled => run.completion.resolve(Err(FxError::Cancelled)),
        }
        Ok(handle)
    }

    /// Advance every run by `delta_ms`. Returns the number of runs that completed.
    ///
    /// Cancelled runs are dropped without another update and resolve with
    /// [`FxError::Cancelled`].
    pub fn tick(&mut self, delta_ms: f32, scene: &mut Scene) -> usize {
        let delta = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        let mut completed = 0;

        self.runs.retain_mut(|run| {
            if run.is_cancelled() {
                run.completion.resolve(Err(FxError::Cancelled));
                return false;
            }
            if delta == 0.0 {
                return true;
            }
            if !run.current.step(delta, scene) {
                return true;
            }
            run.current.complete(scene);
            match run.queue.pop_front() {
                None => {
                    completed += 1;
                    run.completion.resolve(Ok(()));
                    false
                }
                Some(next) => {
                    run.current = next;
                    match run.settle(scene) {
                        Settle::Running => true,
                        Settle::Finished => {
                            completed += 1;
                            run.completion.resolve(Ok(()));
                            false
                        }
                        Settle::Cancelled => {
                            run.completion.resolve(Err(FxError::Cancelled));
                            false
                        }
                    }
                }
            }
        });

        completed
    }

    /// Cancel one run immediately. Returns false if it already finished.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        match self.runs.iter().position(|r| r.id == id) {
            Some(idx) => {
                let run = self.runs.remove(idx);
                run.completion.resolve(Err(FxError::Cancelled));
                true
            }
            None => false,
        }
    }

    /// Cancel every run immediately, without further callbacks.
    pub fn cancel_all(&mut self) {
        for run in self.runs.drain(..) {
            run.completion.resolve(Err(FxError::Cancelled));
        }
    }

    pub fn contains(&self, id: TweenId) -> bool {
        self.runs.iter().any(|r| r.id == id)
    }

    /// Number of active runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::components::node::Node;
    use crate::core::completion::test_waker::CountingWaker;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, impl FnMut(f32, &mut Scene) + 'static) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = values.clone();
        (values, move |v: f32, _: &mut Scene| sink.borrow_mut().push(v))
    }

    #[test]
    fn linear_run_at_display_rate() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let (values, cb) = recorder();
        let handle = tweens
            .run(Tween::new(0.0, 1.0, 100.0, Easing::Linear).on_update(cb), &mut scene)
            .unwrap();

        for _ in 0..6 {
            tweens.tick(16.7, &mut scene);
        }

        let values = values.borrow();
        assert_eq!(values.len(), 6);
        assert!((values[0] - 0.167).abs() < 1e-4);
        assert!((values[1] - 0.334).abs() < 1e-4);
        assert_eq!(*values.last().unwrap(), 1.0);
        assert_eq!(handle.outcome(), Some(Ok(())));
        assert!(tweens.is_empty());
    }

    #[test]
    fn updates_are_time_ordered_and_end_exactly_at_target() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let (values, cb) = recorder();
        tweens
            .run(Tween::new(0.1, 0.3, 250.0, Easing::CubicInOut).on_update(cb), &mut scene)
            .unwrap();

        for dt in [7.0, 0.0, 33.0, 16.0, 50.0, 90.0, 16.0, 80.0] {
            tweens.tick(dt, &mut scene);
        }

        let values = values.borrow();
        assert!(values.windows(2).all(|w| w[1] > w[0]), "{values:?}");
        assert_eq!(*values.last().unwrap(), 0.3);
    }

    #[test]
    fn overshooting_curve_still_lands_on_target() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let (values, cb) = recorder();
        tweens
            .run(Tween::new(0.0, 10.0, 200.0, Easing::BackOut).on_update(cb), &mut scene)
            .unwrap();
        for _ in 0..20 {
            tweens.tick(16.0, &mut scene);
        }
        let values = values.borrow();
        assert!(values.iter().any(|&v| v > 10.0));
        assert_eq!(*values.last().unwrap(), 10.0);
    }

    #[test]
    fn zero_duration_delivers_target_once() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let (values, cb) = recorder();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        let handle = tweens
            .run(
                Tween::new(3.0, 7.0, 0.0, Easing::Linear)
                    .on_update(cb)
                    .on_complete(move |_| flag.set(true)),
                &mut scene,
            )
            .unwrap();

        assert_eq!(*values.borrow(), vec![7.0]);
        assert!(done.get());
        assert_eq!(handle.outcome(), Some(Ok(())));
        assert!(tweens.is_empty());
        tweens.tick(16.0, &mut scene);
        assert_eq!(values.borrow().len(), 1);
    }

    #[test]
    fn invalid_parameters_fail_at_submission() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let err = tweens
            .run(Tween::new(0.0, 1.0, -5.0, Easing::Linear), &mut scene)
            .unwrap_err();
        assert!(matches!(err, FxError::InvalidParameter { name: "duration_ms", .. }));
        assert!(tweens.run(Tween::new(f32::NAN, 1.0, 5.0, Easing::Linear), &mut scene).is_err());
        assert!(tweens.run_sequence(Vec::new(), &mut scene).is_err());
        assert!(tweens.is_empty());
    }

    #[test]
    fn token_cancellation_stops_updates_and_skips_completion() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let (values, cb) = recorder();
        let completed = Rc::new(Cell::new(false));
        let flag = completed.clone();
        let token = CancelToken::new();
        let handle = tweens
            .run(
                Tween::new(0.0, 1.0, 100.0, Easing::Linear)
                    .on_update(cb)
                    .on_complete(move |_| flag.set(true))
                    .with_cancel(token.child()),
                &mut scene,
            )
            .unwrap();

        tweens.tick(16.7, &mut scene);
        tweens.tick(16.7, &mut scene);
        token.cancel();
        tweens.tick(16.7, &mut scene);
        tweens.tick(100.0, &mut scene);

        assert_eq!(values.borrow().len(), 2);
        assert!(values.borrow().iter().all(|&v| v < 1.0));
        assert!(!completed.get());
        assert_eq!(handle.outcome(), Some(Err(FxError::Cancelled)));
        assert!(tweens.is_empty());
    }

    #[test]
    fn handle_cancel_and_direct_cancel() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let a = tweens.run(Tween::new(0.0, 1.0, 100.0, Easing::Linear), &mut scene).unwrap();
        let b = tweens.run(Tween::new(0.0, 1.0, 100.0, Easing::Linear), &mut scene).unwrap();
        let c = tweens.run(Tween::new(0.0, 1.0, 50.0, Easing::Linear), &mut scene).unwrap();

        a.cancel();
        assert!(tweens.cancel(b.id()));
        assert_eq!(b.outcome(), Some(Err(FxError::Cancelled)));
        assert!(!tweens.cancel(b.id()));

        tweens.tick(60.0, &mut scene);
        assert_eq!(a.outcome(), Some(Err(FxError::Cancelled)));
        // Unrelated runs are unaffected.
        assert_eq!(c.outcome(), Some(Ok(())));
    }

    #[test]
    fn already_cancelled_token_never_starts() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let (values, cb) = recorder();
        let token = CancelToken::new();
        token.cancel();
        let handle = tweens
            .run(Tween::new(0.0, 1.0, 0.0, Easing::Linear).on_update(cb).with_cancel(token), &mut scene)
            .unwrap();
        assert!(values.borrow().is_empty());
        assert_eq!(handle.outcome(), Some(Err(FxError::Cancelled)));
        assert!(tweens.is_empty());
    }

    #[test]
    fn cancel_all_resolves_everything() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let handles: Vec<_> = (0..4)
            .map(|_| tweens.run(Tween::new(0.0, 1.0, 100.0, Easing::Linear), &mut scene).unwrap())
            .collect();
        tweens.cancel_all();
        assert!(tweens.is_empty());
        assert!(handles.iter().all(|h| h.outcome() == Some(Err(FxError::Cancelled))));
        tweens.cancel_all();
    }

    #[test]
    fn press_pulse_sequence_returns_to_rest_scale() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let button = scene.spawn(Node::group());
        let peak = Rc::new(Cell::new(0.0_f32));
        let seen = peak.clone();
        let handle = tweens
            .run_sequence(
                vec![
                    Tween::node_scale(button, 1.0, 1.06, 110.0, Easing::CubicOut)
                        .on_complete(move |scene| seen.set(scene.get(button).unwrap().scale.x)),
                    Tween::node_scale(button, 1.06, 1.0, 160.0, Easing::CubicOut),
                ],
                &mut scene,
            )
            .unwrap();

        for _ in 0..20 {
            tweens.tick(16.7, &mut scene);
        }
        assert_eq!(peak.get(), 1.06);
        assert_eq!(scene.get(button).unwrap().scale.x, 1.0);
        assert_eq!(handle.outcome(), Some(Ok(())));
    }

    #[test]
    fn node_helpers_write_into_scene() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let n = scene.spawn(Node::group());
        tweens.run(Tween::node_alpha(n, 0.0, 1.0, 100.0, Easing::Linear), &mut scene).unwrap();
        tweens.run(Tween::node_y(n, 10.0, 4.0, 100.0, Easing::Linear), &mut scene).unwrap();
        tweens.tick(50.0, &mut scene);
        let node = scene.get(n).unwrap();
        assert!((node.alpha - 0.5).abs() < 1e-5);
        assert!((node.pos.y - 7.0).abs() < 1e-5);
    }

    #[test]
    fn handle_is_a_future() {
        let mut scene = Scene::new();
        let mut tweens = TweenScheduler::new();
        let mut handle = tweens.run(Tween::new(0.0, 1.0, 30.0, Easing::Linear), &mut scene).unwrap();
        let (counter, waker) = CountingWaker::waker();
        let mut cx = Context::from_waker(&waker);

        assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());
        tweens.tick(16.0, &mut scene);
        assert_eq!(counter.count(), 0);
        tweens.tick(16.0, &mut scene);
        assert_eq!(counter.count(), 1);
        assert_eq!(Pin::new(&mut handle).poll(&mut cx), Poll::Ready(Ok(())));
    }
}
