//! Tween-driven effects that are not simulated particles: ray bursts,
//! screen flashes and positional shakes.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use glam::Vec2;

use crate::api::error::{FxError, FxResult};
use crate::api::types::{EffectId, NodeId};
use crate::core::cancel::CancelToken;
use crate::core::completion::Completion;
use crate::core::scene::Scene;
use crate::extensions::tween::TweenHandle;

/// Awaitable handle to a composite effect.
///
/// Resolves `Ok(())` once the effect has finished and cleaned up, or
/// [`FxError::Cancelled`] if it was cancelled or the system was torn down.
#[derive(Debug, Clone)]
pub struct EffectHandle {
    id: EffectId,
    token: CancelToken,
    completion: Completion,
}

impl EffectHandle {
    pub(crate) fn new(id: EffectId, token: CancelToken, completion: Completion) -> Self {
        Self { id, token, completion }
    }

    /// Handle for an effect that never started.
    pub(crate) fn cancelled(id: EffectId) -> Self {
        let token = CancelToken::new();
        token.cancel();
        Self::new(id, token, Completion::resolved(Err(FxError::Cancelled)))
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Request cancellation. Visual cleanup happens on the next `advance`.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn outcome(&self) -> Option<FxResult> {
        self.completion.outcome()
    }

    pub fn is_done(&self) -> bool {
        self.completion.is_done()
    }
}

impl Future for EffectHandle {
    type Output = FxResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<FxResult> {
        Pin::new(&mut self.completion).poll(cx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EffectKind {
    /// Rotating, fading fan of rays.
    Rays { node: NodeId },
    /// Full-viewport overlay.
    Flash { node: NodeId },
    /// Displaces `target` around `base`.
    Shake { target: NodeId, base: Vec2 },
}

impl EffectKind {
    /// Remove whatever the effect left in the scene. Safe to repeat.
    pub fn release(self, scene: &mut Scene) {
        match self {
            EffectKind::Rays { node } | EffectKind::Flash { node } => {
                scene.despawn(node);
            }
            EffectKind::Shake { target, base } => {
                if let Some(n) = scene.get_mut(target) {
                    n.pos = base;
                }
            }
        }
    }
}

pub(crate) struct ActiveEffect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub tween: TweenHandle,
    pub completion: Completion,
}

impl ActiveEffect {
    pub fn release(&self, scene: &mut Scene) {
        self.kind.release(scene);
    }

    /// Resting position of `target` if this effect is shaking it.
    pub fn shake_base(&self, target: NodeId) -> Option<Vec2> {
        match self.kind {
            EffectKind::Shake { target: t, base } if t == target => Some(base),
            _ => None,
        }
    }
}
