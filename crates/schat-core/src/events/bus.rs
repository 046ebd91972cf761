//! Event bus - synchronous typed publish/subscribe

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::event::{Event, EventType, HandlerResult};
use super::subscription::{ErasedHandler, EventSubscription, SubscriptionEntry};

pub(crate) struct BusInner {
    subscriptions: RwLock<Vec<Arc<SubscriptionEntry>>>,
    debug: bool,
}

impl BusInner {
    pub(crate) fn detach(&self, entry: &Arc<SubscriptionEntry>) {
        self.subscriptions
            .write()
            .retain(|candidate| !Arc::ptr_eq(candidate, entry));
    }
}

/// Process-wide typed event dispatcher.
///
/// Handles are cheap to clone and share one registry. A handler receives
/// every posted event that is assignable to its declared [`EventType`]. Posts
/// run every matching handler to completion before returning; no ordering is
/// guaranteed among handlers of one event.
///
/// The bus never holds its lock while a handler runs, so handlers may post
/// further events and (un)subscribe.
#[derive(Clone)]
pub struct EventBus {
    inner: Option<Arc<BusInner>>,
}

impl EventBus {
    /// Create an event bus
    #[must_use]
    pub fn new() -> Self {
        Self::create(false)
    }

    /// Create an event bus that logs every post and handler invocation
    #[must_use]
    pub fn with_logging() -> Self {
        Self::create(true)
    }

    /// Create a bus that drops every registration and post
    #[must_use]
    pub fn empty() -> Self {
        Self { inner: None }
    }

    fn create(debug: bool) -> Self {
        Self {
            inner: Some(Arc::new(BusInner {
                subscriptions: RwLock::new(Vec::new()),
                debug,
            })),
        }
    }

    /// Check if this bus delivers events at all
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Subscribe a handler to every event assignable to `T`
    pub fn on<T, F>(&self, handler: F) -> EventSubscription
    where
        T: EventType + ?Sized,
        F: Fn(&mut T) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(None, handler)
    }

    /// Subscribe a handler on behalf of `owner`; see [`unregister`](Self::unregister)
    pub fn on_owned<T, F>(&self, owner: impl Into<String>, handler: F) -> EventSubscription
    where
        T: EventType + ?Sized,
        F: Fn(&mut T) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(Some(owner.into()), handler)
    }

    fn subscribe<T, F>(&self, owner: Option<String>, handler: F) -> EventSubscription
    where
        T: EventType + ?Sized,
        F: Fn(&mut T) -> HandlerResult + Send + Sync + 'static,
    {
        let erased: ErasedHandler = Box::new(move |event: &mut (dyn Event + 'static)| {
            T::cast(event).map(&handler)
        });

        let Some(inner) = &self.inner else {
            let entry =
                SubscriptionEntry::new(TypeId::of::<T>(), type_name::<T>(), owner, erased, false);
            return EventSubscription::new(Arc::new(entry), Weak::new());
        };

        let entry = Arc::new(SubscriptionEntry::new(
            TypeId::of::<T>(),
            type_name::<T>(),
            owner,
            erased,
            true,
        ));
        inner.subscriptions.write().push(Arc::clone(&entry));

        if inner.debug {
            debug!(event_type = type_name::<T>(), owner = ?entry.owner, "Handler registered");
        }

        EventSubscription::new(entry, Arc::downgrade(inner))
    }

    /// Post an event to every matching handler and hand it back.
    ///
    /// A handler returning an error is logged; the remaining handlers still run.
    pub fn post<E: Event>(&self, mut event: E) -> E {
        let Some(inner) = &self.inner else {
            return event;
        };

        let snapshot: Vec<Arc<SubscriptionEntry>> = inner.subscriptions.read().clone();

        if inner.debug {
            debug!(event_type = type_name::<E>(), ?event, "Posting event");
        }

        for entry in snapshot {
            if !entry.is_active() {
                continue;
            }
            match (entry.handler)(&mut event) {
                None => {}
                Some(Ok(())) => {
                    if inner.debug {
                        debug!(
                            event_type = type_name::<E>(),
                            handler = entry.event_type,
                            owner = ?entry.owner,
                            "Handler invoked"
                        );
                    }
                }
                Some(Err(error)) => {
                    warn!(
                        event_type = type_name::<E>(),
                        handler = entry.event_type,
                        owner = ?entry.owner,
                        error = %error,
                        "Event handler failed"
                    );
                }
            }
        }

        event
    }

    /// Close every subscription registered by `owner`, returning how many were closed
    pub fn unregister(&self, owner: &str) -> usize {
        let Some(inner) = &self.inner else {
            return 0;
        };

        let mut removed = Vec::new();
        inner.subscriptions.write().retain(|entry| {
            if entry.owner.as_deref() == Some(owner) {
                removed.push(Arc::clone(entry));
                false
            } else {
                true
            }
        });

        removed.iter().filter(|entry| entry.deactivate()).count()
    }

    /// Active subscriptions declared for exactly `T`
    pub fn subscriptions<T: EventType + ?Sized>(&self) -> Vec<EventSubscription> {
        let Some(inner) = &self.inner else {
            return Vec::new();
        };

        let type_id = TypeId::of::<T>();
        inner
            .subscriptions
            .read()
            .iter()
            .filter(|entry| entry.type_id == type_id && entry.is_active())
            .map(|entry| EventSubscription::new(Arc::clone(entry), Arc::downgrade(inner)))
            .collect()
    }

    /// Number of active subscriptions
    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.subscriptions.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every subscription
    pub fn close(&self) {
        let Some(inner) = &self.inner else {
            return;
        };

        let drained: Vec<_> = std::mem::take(&mut *inner.subscriptions.write());
        for entry in &drained {
            entry.deactivate();
        }
        debug!(count = drained.len(), "Event bus closed");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("enabled", &self.is_enabled())
            .field("subscriptions", &self.len())
            .finish()
    }
}
