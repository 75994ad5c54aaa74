// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process publish/subscribe between the selection components.
//!
//! An [`EventBus`] is a cheap cloneable handle; every component that needs it receives a
//! clone at construction. Delivery is synchronous, in subscription order.
//!
//! Publishers release their own state before publishing, so a handler may read it back.
//! Events published from inside a handler are queued and delivered once the current event
//! has reached every subscriber.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::model::{
    Appellation, AppellationId, DateAppellation, DateAppellationId, Relation, RelationId,
    TextRange,
};

/// Named channels of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    SelectedText,
    SelectedAppellation,
    SelectedDateAppellation,
    SelectedRelation,
    ClearTextSelection,
    NewAppellation,
    DeleteAppellation,
    NewDateAppellation,
    DeleteDateAppellation,
    NewRelation,
    DeleteRelation,
}

impl Channel {
    pub const ALL: [Channel; 11] = [
        Channel::SelectedText,
        Channel::SelectedAppellation,
        Channel::SelectedDateAppellation,
        Channel::SelectedRelation,
        Channel::ClearTextSelection,
        Channel::NewAppellation,
        Channel::DeleteAppellation,
        Channel::NewDateAppellation,
        Channel::DeleteDateAppellation,
        Channel::NewRelation,
        Channel::DeleteRelation,
    ];

    /// Wire name, as used by frontends that bridge the bus to DOM events.
    pub fn name(self) -> &'static str {
        match self {
            Self::SelectedText => "selectedtext",
            Self::SelectedAppellation => "selectedappellation",
            Self::SelectedDateAppellation => "selecteddateappellation",
            Self::SelectedRelation => "selectedrelation",
            Self::ClearTextSelection => "cleartextselection",
            Self::NewAppellation => "newAppellation",
            Self::DeleteAppellation => "deleteAppellation",
            Self::NewDateAppellation => "newDateAppellation",
            Self::DeleteDateAppellation => "deleteDateAppellation",
            Self::NewRelation => "newRelation",
            Self::DeleteRelation => "deleteRelation",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SelectedText(TextRange),
    SelectedAppellation(AppellationId),
    SelectedDateAppellation(DateAppellationId),
    SelectedRelation(RelationId),
    ClearTextSelection,
    NewAppellation(Appellation),
    DeleteAppellation(AppellationId),
    NewDateAppellation(DateAppellation),
    DeleteDateAppellation(DateAppellationId),
    NewRelation(Relation),
    DeleteRelation(RelationId),
}

impl Event {
    pub fn channel(&self) -> Channel {
        match self {
            Self::SelectedText(_) => Channel::SelectedText,
            Self::SelectedAppellation(_) => Channel::SelectedAppellation,
            Self::SelectedDateAppellation(_) => Channel::SelectedDateAppellation,
            Self::SelectedRelation(_) => Channel::SelectedRelation,
            Self::ClearTextSelection => Channel::ClearTextSelection,
            Self::NewAppellation(_) => Channel::NewAppellation,
            Self::DeleteAppellation(_) => Channel::DeleteAppellation,
            Self::NewDateAppellation(_) => Channel::NewDateAppellation,
            Self::DeleteDateAppellation(_) => Channel::DeleteDateAppellation,
            Self::NewRelation(_) => Channel::NewRelation,
            Self::DeleteRelation(_) => Channel::DeleteRelation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

struct Subscriber {
    id: SubscriptionId,
    channel: Channel,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
    queue: VecDeque<Event>,
    delivering: bool,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus").field("subscribers", &inner.subscribers.len()).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        channel: Channel,
        handler: impl Fn(&Event) + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push(Subscriber { id, channel, handler: Rc::new(handler) });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|sub| sub.id != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.inner.borrow().subscribers.iter().filter(|sub| sub.channel == channel).count()
    }

    /// Delivers `event` to the subscribers of its channel.
    ///
    /// The subscriber list is snapshotted per event: handlers may publish or (un)subscribe,
    /// and subscribers added during delivery only see later events. A publish from inside a
    /// handler returns at once; its event follows the one being delivered.
    pub fn publish(&self, event: Event) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(event);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }
        while let Some((event, handlers)) = self.next_delivery() {
            tracing::trace!(channel = %event.channel(), subscribers = handlers.len(), "publish");
            for handler in handlers {
                handler(&event);
            }
        }
    }

    fn next_delivery(&self) -> Option<(Event, Vec<Handler>)> {
        let mut inner = self.inner.borrow_mut();
        let Some(event) = inner.queue.pop_front() else {
            inner.delivering = false;
            return None;
        };
        let channel = event.channel();
        let handlers = inner
            .subscribers
            .iter()
            .filter(|sub| sub.channel == channel)
            .map(|sub| sub.handler.clone())
            .collect();
        Some((event, handlers))
    }

    /// Subscribes to every channel and collects what is published, in order.
    pub fn recorder(&self) -> EventRecorder {
        let events = Rc::new(RefCell::new(Vec::new()));
        for channel in Channel::ALL {
            let sink = events.clone();
            self.subscribe(channel, move |event| sink.borrow_mut().push(event.clone()));
        }
        EventRecorder { events }
    }
}

#[derive(Debug, Clone)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventRecorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.events.borrow().iter().map(Event::channel).collect()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Channel, Event, EventBus};
    use crate::model::AppellationId;

    #[test]
    fn delivers_to_channel_subscribers_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.subscribe(Channel::DeleteAppellation, move |_| seen.borrow_mut().push(tag));
        }
        let other = seen.clone();
        bus.subscribe(Channel::NewRelation, move |_| other.borrow_mut().push("wrong channel"));

        bus.publish(Event::DeleteAppellation(AppellationId::new(1)));

        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = bus.subscribe(Channel::ClearTextSelection, move |_| *sink.borrow_mut() += 1);

        bus.publish(Event::ClearTextSelection);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(Event::ClearTextSelection);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(Channel::ClearTextSelection), 0);
    }

    #[test]
    fn handlers_may_publish_and_subscribe_reentrantly() {
        let bus = EventBus::new();
        let recorder = bus.recorder();
        let inner_bus = bus.clone();
        bus.subscribe(Channel::SelectedAppellation, move |_| {
            inner_bus.publish(Event::ClearTextSelection);
            inner_bus.subscribe(Channel::SelectedAppellation, |_| {});
        });

        bus.publish(Event::SelectedAppellation(AppellationId::new(3)));

        assert_eq!(
            recorder.channels(),
            vec![Channel::SelectedAppellation, Channel::ClearTextSelection]
        );
        assert_eq!(bus.subscriber_count(Channel::SelectedAppellation), 3);
    }

    #[test]
    fn nested_publishes_follow_the_current_event() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        bus.subscribe(Channel::DeleteAppellation, move |_| {
            inner_bus.publish(Event::ClearTextSelection);
        });
        let recorder = bus.recorder();

        bus.publish(Event::DeleteAppellation(AppellationId::new(4)));
        bus.publish(Event::ClearTextSelection);

        assert_eq!(
            recorder.channels(),
            vec![
                Channel::DeleteAppellation,
                Channel::ClearTextSelection,
                Channel::ClearTextSelection,
            ]
        );
    }

    #[test]
    fn channel_names_match_wire_names() {
        assert_eq!(Channel::SelectedText.name(), "selectedtext");
        assert_eq!(Channel::NewAppellation.to_string(), "newAppellation");
        for channel in Channel::ALL {
            assert!(!channel.name().is_empty());
        }
    }
}
