//! Event subscriptions - closable handles returned by the bus

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::bus::BusInner;
use super::event::{Event, HandlerResult};

/// Type-erased handler; yields `None` when the event is not assignable
pub(crate) type ErasedHandler =
    Box<dyn Fn(&mut (dyn Event + 'static)) -> Option<HandlerResult> + Send + Sync>;

pub(crate) struct SubscriptionEntry {
    pub(crate) type_id: TypeId,
    pub(crate) event_type: &'static str,
    pub(crate) owner: Option<String>,
    pub(crate) handler: ErasedHandler,
    active: AtomicBool,
}

impl SubscriptionEntry {
    pub(crate) fn new(
        type_id: TypeId,
        event_type: &'static str,
        owner: Option<String>,
        handler: ErasedHandler,
        active: bool,
    ) -> Self {
        Self {
            type_id,
            event_type,
            owner,
            handler,
            active: AtomicBool::new(active),
        }
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Returns true only for the call that actually deactivated the entry
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }
}

/// Handle to a registered event handler.
///
/// Becomes inactive exactly once, either through [`close`](Self::close) or
/// when the bus unregisters its owner. Dropping the handle keeps the handler
/// registered.
#[derive(Clone)]
pub struct EventSubscription {
    entry: Arc<SubscriptionEntry>,
    bus: Weak<BusInner>,
}

impl EventSubscription {
    pub(crate) fn new(entry: Arc<SubscriptionEntry>, bus: Weak<BusInner>) -> Self {
        Self { entry, bus }
    }

    /// Name of the event type the handler is declared for
    pub fn event_type(&self) -> &'static str {
        self.entry.event_type
    }

    pub fn owner(&self) -> Option<&str> {
        self.entry.owner.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.entry.is_active()
    }

    /// Unregister the handler. Closing twice is a no-op.
    pub fn close(&self) {
        if !self.entry.deactivate() {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.detach(&self.entry);
        }
    }
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("event_type", &self.entry.event_type)
            .field("owner", &self.entry.owner)
            .field("active", &self.is_active())
            .finish()
    }
}
