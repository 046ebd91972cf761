//! Event traits - what can be posted and what handlers can subscribe to

use std::any::Any;
use std::fmt::Debug;

use crate::entities::{Message, Targets};

/// Result returned by event handlers
pub type HandlerResult = anyhow::Result<()>;

/// Access to the concrete value behind a trait object
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An event that can be posted on the [`EventBus`](super::EventBus).
///
/// The projection hooks let a posted event be observed through one of its
/// supertypes; an event that is cancellable or carries a message overrides
/// the matching hook.
pub trait Event: AsAny + Send + Debug {
    /// View this event as a [`Cancellable`]
    fn as_cancellable_mut(&mut self) -> Option<&mut (dyn Cancellable + 'static)> {
        None
    }

    /// View this event as a [`MessageEvent`]
    fn as_message_event_mut(&mut self) -> Option<&mut (dyn MessageEvent + 'static)> {
        None
    }
}

/// An event whose guarded operation can be aborted by a handler.
///
/// The posting caller inspects the flag once, after the post returns.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    fn set_cancelled(&mut self, cancelled: bool);

    fn cancel(&mut self) {
        self.set_cancelled(true);
    }
}

/// A cancellable event carrying a message and the targets it will reach
pub trait MessageEvent: Cancellable {
    fn message(&self) -> &Message;

    fn set_message(&mut self, message: Message);

    fn targets(&self) -> &Targets;

    fn set_targets(&mut self, targets: Targets);
}

/// A type handlers can subscribe to.
///
/// Every concrete [`Event`] is one. `dyn Event`, `dyn Cancellable` and
/// `dyn MessageEvent` act as supertypes: a handler declared for one of them
/// receives every posted event that can be viewed as it.
pub trait EventType: 'static {
    /// Project a posted event onto this type, if it is assignable
    fn cast<'a>(event: &'a mut (dyn Event + 'static)) -> Option<&'a mut Self>;
}

impl<E: Event> EventType for E {
    fn cast<'a>(event: &'a mut (dyn Event + 'static)) -> Option<&'a mut Self> {
        event.as_any_mut().downcast_mut::<E>()
    }
}

impl EventType for dyn Event {
    fn cast<'a>(event: &'a mut (dyn Event + 'static)) -> Option<&'a mut Self> {
        Some(event)
    }
}

impl EventType for dyn Cancellable {
    fn cast<'a>(event: &'a mut (dyn Event + 'static)) -> Option<&'a mut Self> {
        event.as_cancellable_mut()
    }
}

impl EventType for dyn MessageEvent {
    fn cast<'a>(event: &'a mut (dyn Event + 'static)) -> Option<&'a mut Self> {
        event.as_message_event_mut()
    }
}
