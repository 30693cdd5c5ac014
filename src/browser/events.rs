// src/browser/events.rs
// =============================================================================
// Fan-out of network events to subscribers.
//
// The page engine publishes every response and failed request into an
// EventHub. Code that wants to observe a page load calls subscribe() and
// gets back a Subscription handle:
//
//   let mut subscription = page.subscribe();
//   page.goto(url).await?;
//   let events = subscription.close();   // detached, then drained
//
// Detaching happens in Drop, so it also happens on early return or error.
// Each subscription has its own unbounded channel, so a slow reader never
// blocks the engine.
// =============================================================================

use super::NetworkEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, UnboundedSender<NetworkEvent>>>,
}

impl HubInner {
    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still safe to use.
    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, UnboundedSender<NetworkEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Shared publisher side. Cloning is cheap and all clones publish to the
/// same set of subscribers.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = unbounded_channel();
        self.inner.subscribers().insert(id, sender);

        Subscription {
            id,
            receiver,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every currently attached subscriber.
    pub fn publish(&self, event: NetworkEvent) {
        self.inner
            .subscribers()
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }
}

/// A live subscription. Events published while it exists queue up until
/// drained; dropping it detaches from the hub.
pub struct Subscription {
    id: u64,
    receiver: UnboundedReceiver<NetworkEvent>,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// Takes every event received so far, in publication order.
    pub fn drain(&mut self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Detaches from the hub, then returns everything that arrived before.
    /// Events published after the detach are never returned.
    pub fn close(mut self) -> Vec<NetworkEvent> {
        self.detach();
        self.drain()
    }

    fn detach(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.subscribers().remove(&self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
