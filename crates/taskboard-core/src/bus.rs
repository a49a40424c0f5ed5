//! Synchronous in-process publish/subscribe keyed by event name.
//!
//! Handlers run on the publishing thread, in the order they subscribed.
//! A handler that returns an error or panics is logged and skipped; it
//! never stops the remaining handlers and never changes what `publish`
//! returns.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ParseEnumError, Task};

/// Loosely-typed event payload.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// The event names the session publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
}

impl EventKind {
    pub const ALL: [Self; 2] = [Self::TaskCreated, Self::TaskUpdated];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_created" => Ok(Self::TaskCreated),
            "task_updated" => Ok(Self::TaskUpdated),
            _ => Err(ParseEnumError {
                expected: "event kind",
                got: s.to_string(),
            }),
        }
    }
}

/// A published notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub name: String,
    pub payload: Payload,
}

/// Build the payload describing a task, as carried by task events.
#[must_use]
pub fn task_payload(task: &Task) -> Payload {
    match serde_json::to_value(task) {
        Ok(serde_json::Value::Object(map)) => map,
        // A derived Serialize on a struct always yields an object.
        _ => Payload::new(),
    }
}

type Handler = Box<dyn FnMut(&Event) -> anyhow::Result<()>>;

/// Name-keyed registry of handlers.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<String, Vec<Handler>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events called `name`.
    ///
    /// Several handlers may share a name; they run in registration order.
    pub fn subscribe<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        tracing::debug!(event = %name, "handler subscribed");
        self.subscribers
            .entry(name)
            .or_default()
            .push(Box::new(handler));
    }

    /// Build an [`Event`] and hand it to every handler subscribed to `name`.
    ///
    /// The event is returned whether or not any handler failed.
    pub fn publish(&mut self, name: impl Into<String>, payload: Payload) -> Event {
        let event = Event {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            name: name.into(),
            payload,
        };

        let Some(handlers) = self.subscribers.get_mut(&event.name) else {
            tracing::debug!(event = %event.name, id = %event.id, "published with no subscribers");
            return event;
        };

        tracing::debug!(
            event = %event.name,
            id = %event.id,
            handlers = handlers.len(),
            "publishing"
        );
        for (index, handler) in handlers.iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(event = %event.name, handler = index, "handler error: {err:#}");
                }
                Err(panic) => {
                    tracing::warn!(
                        event = %event.name,
                        handler = index,
                        "handler panicked: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }

        event
    }

    #[must_use]
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subscribers.get(name).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .subscribers
            .iter()
            .map(|(name, handlers)| (name.as_str(), handlers.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("EventBus").field("subscribers", &names).finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn payload() -> Payload {
        let mut map = Payload::new();
        map.insert("title".into(), "Write tests".into());
        map.insert("priority".into(), "high".into());
        map
    }

    #[test]
    fn handlers_run_once_each_in_subscription_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for label in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            bus.subscribe("task_created", move |event: &Event| {
                calls.borrow_mut().push((label, event.id.clone()));
                Ok(())
            });
        }

        let event = bus.publish("task_created", payload());

        let calls = calls.borrow();
        let labels: Vec<_> = calls.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, ["first", "second", "third"]);
        assert!(calls.iter().all(|(_, id)| *id == event.id));
        assert_eq!(event.payload, payload());
        assert_eq!(event.name, "task_created");
    }

    #[test]
    fn other_names_are_not_notified() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&hits);
        bus.subscribe("task_updated", move |_: &Event| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.publish("task_created", Payload::new());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn failing_handlers_do_not_stop_the_rest() {
        let reached = Rc::new(RefCell::new(false));
        let mut bus = EventBus::new();
        bus.subscribe("task_created", |_: &Event| anyhow::bail!("boom"));
        bus.subscribe("task_created", |_: &Event| -> anyhow::Result<()> {
            panic!("handler exploded")
        });
        let flag = Rc::clone(&reached);
        bus.subscribe("task_created", move |_: &Event| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let event = bus.publish("task_created", payload());
        assert!(*reached.borrow());
        assert_eq!(event.payload, payload());
    }

    #[test]
    fn publishing_without_subscribers_still_returns_event() {
        let mut bus = EventBus::new();
        let event = bus.publish("nobody_listens", Payload::new());
        assert_eq!(event.name, "nobody_listens");
        assert!(Uuid::parse_str(&event.id).is_ok());
    }

    #[test]
    fn every_event_gets_a_fresh_id() {
        let mut bus = EventBus::new();
        let a = bus.publish("task_created", Payload::new());
        let b = bus.publish("task_created", Payload::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn subscriber_count_tracks_registrations() {
        let mut bus = EventBus::new();
        assert_eq!(bus.subscriber_count("task_created"), 0);
        bus.subscribe("task_created", |_: &Event| Ok(()));
        bus.subscribe("task_created", |_: &Event| Ok(()));
        assert_eq!(bus.subscriber_count("task_created"), 2);
    }

    #[test]
    fn event_kind_names_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!("task_deleted".parse::<EventKind>().is_err());
    }
}
