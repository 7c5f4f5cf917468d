//! Topic-based event bus implementation.
//!
//! Dispatch is synchronous: `publish` calls every matching subscriber, in
//! subscription order, before it returns. Subscribers receive events by
//! reference and have no access to the character, so a subscriber can never
//! start a nested mutation.

use crate::character::CharacterEvent;
use crate::stats::DerivedEvent;
use crate::state::{TraitEvent, TraitId};

/// Topics for event routing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    /// Per-trait value, specialty, text and availability changes
    Trait,
    /// Size, initiative, speed, defense, health, willpower
    Derived,
    /// Character-level fields (species, age, power stat, ...)
    Character,
}

/// Event wrapper that carries the topic and typed event
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetEvent {
    Trait { id: TraitId, event: TraitEvent },
    Derived(DerivedEvent),
    Character(CharacterEvent),
}

impl SheetEvent {
    pub fn topic(&self) -> Topic {
        match self {
            SheetEvent::Trait { .. } => Topic::Trait,
            SheetEvent::Derived(_) => Topic::Derived,
            SheetEvent::Character(_) => Topic::Character,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Boxed subscriber callback.
pub type Callback = Box<dyn FnMut(&SheetEvent)>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    callback: Callback,
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a specific topic
    pub fn subscribe<F>(&mut self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: FnMut(&SheetEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            topic,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&mut self, event: &SheetEvent) {
        let topic = event.topic();
        let mut delivered = false;
        for subscriber in self.subscribers.iter_mut().filter(|s| s.topic == topic) {
            (subscriber.callback)(event);
            delivered = true;
        }
        if !delivered {
            tracing::trace!("No subscribers for topic {}", topic);
        }
    }

    pub fn publish_all<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = SheetEvent>,
    {
        for event in events {
            self.publish(&event);
        }
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DerivedKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn speed(value: i32) -> SheetEvent {
        SheetEvent::Derived(DerivedEvent {
            kind: DerivedKind::Speed,
            value,
        })
    }

    #[test]
    fn delivers_only_matching_topic_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&log);
        bus.subscribe(Topic::Derived, move |_| first.borrow_mut().push("first"));
        let trait_log = Rc::clone(&log);
        bus.subscribe(Topic::Trait, move |_| trait_log.borrow_mut().push("trait"));
        let second = Rc::clone(&log);
        bus.subscribe(Topic::Derived, move |_| second.borrow_mut().push("second"));

        bus.publish(&speed(11));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_callbacks_stop_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        let id = bus.subscribe(Topic::Derived, move |_| *counter.borrow_mut() += 1);

        bus.publish(&speed(10));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&speed(11));

        assert_eq!(*count.borrow(), 1);
    }
}
