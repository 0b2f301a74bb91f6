// ── Generic state container ──
//
// The state/effect backbone shared by every feature controller: one
// observable state slot plus a one-shot effect queue. Controllers compose
// a container with a pure reducer function rather than inheriting from
// anything -- the container knows nothing about events.
//
// State lives in a `watch` channel: mutations via `send_modify` are
// atomic from an observer's perspective, reads are non-blocking, and
// receivers always see the latest value. Effects live in an unbounded
// `mpsc` channel: delivered exactly once, in emission order, to the
// single subscriber; buffered while nobody is attached.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};

/// A container for one controller's state and one-shot effects.
///
/// Generic over the state shape `S` and the effect shape `F`; the event
/// shape belongs to the owning controller's reducer, not to the container.
pub struct StateContainer<S, F> {
    state: watch::Sender<S>,
    effects: Arc<EffectSlot<F>>,
}

struct EffectSlot<F> {
    tx: mpsc::UnboundedSender<F>,
    /// The single receiver. `None` while a subscription is live;
    /// returned on subscription drop so buffered effects survive
    /// across a consumer's detach/re-attach cycle.
    rx: Mutex<Option<mpsc::UnboundedReceiver<F>>>,
}

impl<S, F> StateContainer<S, F> {
    pub fn new(initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            effects: Arc::new(EffectSlot {
                tx,
                rx: Mutex::new(Some(rx)),
            }),
        }
    }

    // ── State ────────────────────────────────────────────────────────

    /// Read the current state (cheap clone, never blocks).
    pub fn current(&self) -> S
    where
        S: Clone,
    {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn watch(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    /// Apply a mutation atomically: observers never see an intermediate
    /// value, and concurrent updates are serialized by the channel.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
    }

    // ── Effects ──────────────────────────────────────────────────────

    /// Enqueue a one-shot effect for the (current or future) subscriber.
    pub fn emit(&self, effect: F) {
        // Receiver can't be closed: the slot keeps it alive when detached.
        let _ = self.effects.tx.send(effect);
    }

    /// Attach the single effect consumer.
    ///
    /// Effects emitted before attachment are delivered first, in order.
    /// Returns `None` if another subscription is currently live -- there
    /// is exactly one reader at any time. Dropping the subscription
    /// detaches it and preserves any undelivered effects.
    pub fn subscribe_effects(&self) -> Option<EffectSubscription<F>> {
        let rx = self
            .effects
            .rx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()?;
        Some(EffectSubscription {
            rx: Some(rx),
            slot: Arc::clone(&self.effects),
        })
    }
}

/// The single live reader of a container's effect queue.
///
/// Dropping it returns the queue to the container, so a consumer that
/// goes away (screen teardown) and comes back later resumes delivery
/// from the first undelivered effect.
pub struct EffectSubscription<F> {
    rx: Option<mpsc::UnboundedReceiver<F>>,
    slot: Arc<EffectSlot<F>>,
}

impl<F> EffectSubscription<F> {
    /// Await the next effect. Never returns `None` in practice: the
    /// container side holds the sender for its whole lifetime.
    pub async fn recv(&mut self) -> Option<F> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Non-blocking poll, mainly for tests and tick-driven consumers.
    pub fn try_recv(&mut self) -> Option<F> {
        self.rx.as_mut().and_then(|rx| rx.try_recv().ok())
    }
}

impl<F> Drop for EffectSubscription<F> {
    fn drop(&mut self) {
        if let Some(rx) = self.rx.take() {
            *self
                .slot
                .rx
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(rx);
        }
    }
}
