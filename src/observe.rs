//=========================================================================
// Observation Channel
//=========================================================================
//
// Fan-out of values from the engine to any number of subscribers.
//
// Architecture:
//   Engine ──→ publish(value) ──→ Sender per subscriber ──→ Subscription
//                  │
//                  └── Latest<T> keeps the current value and hands it to
//                      every new subscriber before anything else
//
// A subscriber that drops its Subscription is pruned on the next publish.
// Nothing is kept for late subscribers except the current value.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

//=== Public API ==========================================================

/// Identifies one subscriber on one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Returned once the publishing side is gone and every value was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "publisher closed")
    }
}

impl std::error::Error for Closed {}

/// Receiving end handed to a subscriber.
///
/// Values arrive in publish order. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriberId,
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next value if one is waiting
    pub fn try_recv(&self) -> Result<Option<T>, Closed> {
        match self.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Closed),
        }
    }

    /// Every waiting value, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    /// Newest waiting value, discarding older ones
    pub fn latest(&self) -> Option<T> {
        self.rx.try_iter().last()
    }
}

//=========================================================================

/// Plain fan-out: every subscriber gets every value published after it
/// subscribed.
#[derive(Debug)]
pub struct Broadcast<T> {
    next_id: u64,
    subscribers: Vec<(SubscriberId, Sender<T>)>,
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<T: Clone> Broadcast<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<T> {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Send `value` to every live subscriber.
    ///
    /// Returns how many received it. Subscribers whose receiving end was
    /// dropped are removed.
    pub fn publish(&mut self, value: &T) -> usize {
        self.subscribers
            .retain(|(_, tx)| tx.send(value.clone()).is_ok());
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every sender; subscriptions report [`Closed`] once drained
    pub fn close(&mut self) {
        self.subscribers.clear();
    }
}

//=========================================================================

/// Current-value broadcast.
///
/// New subscribers immediately receive the current value, then every later
/// publish.
#[derive(Debug)]
pub struct Latest<T> {
    current: T,
    broadcast: Broadcast<T>,
}

impl<T: Clone> Latest<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            broadcast: Broadcast::new(),
        }
    }

    /// Last published value
    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn subscribe(&mut self) -> Subscription<T> {
        let subscription = self.broadcast.subscribe();
        if let Some((_, tx)) = self.broadcast.subscribers.last() {
            // `subscription` holds the receiver, so this cannot fail
            let _ = tx.send(self.current.clone());
        }
        subscription
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.broadcast.unsubscribe(id)
    }

    /// Replace the current value and send it to every subscriber
    pub fn publish(&mut self, value: T) -> usize {
        self.current = value;
        self.broadcast.publish(&self.current)
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcast.subscriber_count()
    }

    pub fn close(&mut self) {
        self.broadcast.close();
    }
}

//=========================================================================
// Tests
//=========================================================================
