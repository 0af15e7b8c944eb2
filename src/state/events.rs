//! Event notification.
//!
//! Every state-changing command emits a [`GameEvent`]. Subscribers are
//! plain callbacks kept in an ordered list and invoked synchronously,
//! in subscription order, from within the command call that produced
//! the event.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An event broadcast to subscribers after a state change.
///
/// Serializes with a `type` tag and camelCase fields, which is the wire
/// shape clients consume:
/// `{"type": "add-player", "playerId": "...", "playerX": 0, "playerY": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    /// A player joined, or an existing id was re-placed.
    #[serde(rename_all = "camelCase")]
    AddPlayer {
        player_id: String,
        player_x: u32,
        player_y: u32,
    },

    /// A player left. Emitted even when the id was unknown.
    #[serde(rename_all = "camelCase")]
    RemovePlayer { player_id: String },

    /// A fruit appeared.
    #[serde(rename_all = "camelCase")]
    AddFruit {
        fruit_id: u32,
        fruit_x: u32,
        fruit_y: u32,
    },

    /// A fruit was removed or collected. Emitted even when the id was
    /// unknown.
    #[serde(rename_all = "camelCase")]
    RemoveFruit { fruit_id: u32 },

    /// A player's score changed.
    #[serde(rename_all = "camelCase")]
    Score { player_id: String, score: u32 },

    /// Echo of a move request, emitted before the move is resolved.
    /// `key_pressed` is the raw key name, recognized or not.
    #[serde(rename_all = "camelCase")]
    MovePlayer {
        player_id: String,
        key_pressed: String,
    },
}

impl GameEvent {
    /// Event name as it appears in the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddPlayer { .. } => "add-player",
            Self::RemovePlayer { .. } => "remove-player",
            Self::AddFruit { .. } => "add-fruit",
            Self::RemoveFruit { .. } => "remove-fruit",
            Self::Score { .. } => "score",
            Self::MovePlayer { .. } => "move-player",
        }
    }
}

/// Handle identifying a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A subscriber callback.
pub type Subscriber = Box<dyn FnMut(&GameEvent) + Send>;

/// Ordered list of subscriber callbacks.
///
/// Notification is synchronous and in subscription order. There is no
/// error isolation: callbacks are infallible, and a panicking
/// subscriber unwinds through [`notify_all`](Self::notify_all),
/// skipping the subscribers after it.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. Returns a handle for individual removal.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a single subscription. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Remove every subscription.
    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    /// Invoke every subscriber with `event`, in subscription order.
    pub fn notify_all(&mut self, event: &GameEvent) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event);
        }
    }

    /// Current subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn score_event(score: u32) -> GameEvent {
        GameEvent::Score {
            player_id: "p1".to_string(),
            score,
        }
    }

    #[test]
    fn test_notify_in_subscription_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        bus.subscribe(move |_| first.lock().push("first"));
        let second = order.clone();
        bus.subscribe(move |_| second.lock().push("second"));

        bus.notify_all(&score_event(1));

        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_single() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0u32));

        let keep = hits.clone();
        bus.subscribe(move |_| *keep.lock() += 1);
        let drop_me = hits.clone();
        let id = bus.subscribe(move |_| *drop_me.lock() += 100);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id)); // already gone
        assert_eq!(bus.subscriber_count(), 1);

        bus.notify_all(&score_event(1));
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_unsubscribe_all() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0u32));

        for _ in 0..2 {
            let sink = hits.clone();
            bus.subscribe(move |_| *sink.lock() += 1);
        }

        bus.unsubscribe_all();
        assert!(bus.is_empty());

        bus.notify_all(&score_event(1));
        assert_eq!(*hits.lock(), 0);
    }

    #[test]
    fn test_event_kind_matches_serialized_tag() {
        let event = GameEvent::AddFruit {
            fruit_id: 42,
            fruit_x: 1,
            fruit_y: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["fruitId"], 42);
    }

    #[test]
    fn test_event_wire_shape() {
        let event = GameEvent::AddPlayer {
            player_id: "p1".to_string(),
            player_x: 3,
            player_y: 4,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({
                "type": "add-player",
                "playerId": "p1",
                "playerX": 3,
                "playerY": 4
            })
        );
    }
}
