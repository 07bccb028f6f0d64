//! One-shot, awaitable outcome slots.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::api::error::FxResult;

#[derive(Default)]
struct Slot {
    outcome: Option<FxResult>,
    waker: Option<Waker>,
}

/// One-shot outcome shared between the engine and whoever awaits it.
///
/// Frame-driven hosts can poll [`outcome`](Completion::outcome) each frame;
/// async callers `.await` it. The first resolution wins.
#[derive(Clone, Default)]
pub struct Completion {
    slot: Rc<RefCell<Slot>>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// A completion that is already resolved.
    pub fn resolved(outcome: FxResult) -> Self {
        let c = Self::new();
        c.resolve(outcome);
        c
    }

    pub(crate) fn resolve(&self, outcome: FxResult) {
        let waker = {
            let mut slot = self.slot.borrow_mut();
            if slot.outcome.is_some() {
                return;
            }
            slot.outcome = Some(outcome);
            slot.waker.take()
        };
        if let Some(w) = waker {
            w.wake();
        }
    }

    /// `None` while pending.
    pub fn outcome(&self) -> Option<FxResult> {
        self.slot.borrow().outcome.clone()
    }

    pub fn is_done(&self) -> bool {
        self.slot.borrow().outcome.is_some()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("outcome", &self.slot.borrow().outcome)
            .finish()
    }
}

impl Future for Completion {
    type Output = FxResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<FxResult> {
        let mut slot = self.slot.borrow_mut();
        match &slot.outcome {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_waker::CountingWaker;
    use super::*;
    use crate::api::error::FxError;

    #[test]
    fn first_resolution_wins() {
        let c = Completion::new();
        assert!(c.outcome().is_none());
        c.resolve(Err(FxError::Cancelled));
        c.resolve(Ok(()));
        assert_eq!(c.outcome(), Some(Err(FxError::Cancelled)));
    }

    #[test]
    fn poll_pending_then_ready_wakes_once() {
        let c = Completion::new();
        let (counter, waker) = CountingWaker::waker();
        let mut cx = Context::from_waker(&waker);
        let mut fut = c.clone();

        assert!(Pin::new(&mut fut).poll(&mut cx).is_pending());
        c.resolve(Ok(()));
        assert_eq!(counter.count(), 1);
        assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Ready(Ok(())));
    }

    #[test]
    fn resolved_constructor() {
        let c = Completion::resolved(Ok(()));
        assert!(c.is_done());
    }
}
