//! Cooperative cancellation tokens.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: Cell<bool>,
    parent: Option<CancelToken>,
}

/// Cooperative cancellation signal, checked at every frame resumption.
///
/// Clones share one signal. A [`child`](CancelToken::child) observes its own
/// flag and every ancestor's, so cancelling a scene-level token reaches all
/// operations spawned under it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Rc<TokenInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// New token cancelled when either it or `self` is cancelled.
    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(TokenInner {
                cancelled: Cell::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        let mut token = Some(self);
        while let Some(t) = token {
            if t.inner.cancelled.get() {
                return true;
            }
            token = t.inner.parent.as_ref();
        }
        false
    }
}
