#![forbid(unsafe_code)]

//! Multi-subscriber event streams and their subscription guards.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Anything that can be subscribed to with a `&T` callback.
pub trait Subscribe<T> {
    /// Register `callback`; it stays registered until the returned
    /// [`Subscription`] is dropped.
    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription;
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard for a registered callback.
///
/// Dropping the guard unregisters the callback. Sources only keep a weak
/// reference, so a dropped guard can never be invoked again.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
    source: Option<Weak<dyn Any>>,
    on_drop: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep `guard` alive for as long as the subscription lives.
    ///
    /// `source` is used by [`is_active`](Self::is_active) to report whether the
    /// emitting side still exists.
    pub fn new(guard: impl Any, source: Weak<dyn Any>) -> Self {
        Self {
            guard: Some(Box::new(guard)),
            source: Some(source),
            on_drop: None,
        }
    }

    /// A subscription that runs `cleanup` when released.
    ///
    /// Used by view elements backed by a foreign event system, where
    /// unsubscribing means calling back into that system.
    pub fn on_drop(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            guard: None,
            source: None,
            on_drop: Some(Box::new(cleanup)),
        }
    }

    /// A subscription to nothing.
    pub fn empty() -> Self {
        Self {
            guard: None,
            source: None,
            on_drop: None,
        }
    }

    /// Whether the subscribed source is still alive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match &self.source {
            Some(source) => source.strong_count() > 0,
            None => self.on_drop.is_some(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.guard.take();
        if let Some(cleanup) = self.on_drop.take() {
            cleanup();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventStream<T>
// ---------------------------------------------------------------------------

type Callback<T> = dyn Fn(&T);

struct StreamInner<T> {
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A cloneable event source. Clones share the same subscriber list.
///
/// Unlike [`Observable`](super::Observable) a stream stores no value: every
/// [`emit`](Self::emit) is delivered, equal or not.
pub struct EventStream<T> {
    inner: Rc<RefCell<StreamInner<T>>>,
}

impl<T: 'static> EventStream<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StreamInner {
                subscribers: Vec::new(),
            })),
        }
    }

    /// Deliver `value` to every live subscriber, in registration order.
    ///
    /// The subscriber list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe freely. A callback whose subscription is dropped by an
    /// earlier callback of the same emission is skipped.
    pub fn emit(&self, value: &T) {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|cb| cb.strong_count() > 0);
            inner.subscribers.clone()
        };
        for weak in snapshot {
            if let Some(callback) = weak.upgrade() {
                callback(value);
            }
        }
    }

    /// Number of subscribers whose guards are still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|cb| cb.strong_count() > 0)
            .count()
    }

    fn source(&self) -> Weak<dyn Any> {
        let weak: Weak<RefCell<StreamInner<T>>> = Rc::downgrade(&self.inner);
        weak
    }
}

impl<T: 'static> Subscribe<T> for EventStream<T> {
    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription::new(strong, self.source())
    }
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for EventStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .filter(|cb| cb.strong_count() > 0)
            .count();
        f.debug_struct("EventStream")
            .field("subscribers", &live)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_subscribers_in_order() {
        let stream = EventStream::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = stream.subscribe(move |v: &i32| l1.borrow_mut().push(("a", *v)));
        let l2 = Rc::clone(&log);
        let _b = stream.subscribe(move |v: &i32| l2.borrow_mut().push(("b", *v)));

        stream.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn equal_values_are_all_delivered() {
        let stream = EventStream::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = stream.subscribe(move |_: &u8| c.set(c.get() + 1));

        stream.emit(&1);
        stream.emit(&1);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let stream = EventStream::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = stream.subscribe(move |_: &()| c.set(c.get() + 1));

        stream.emit(&());
        drop(sub);
        stream.emit(&());

        assert_eq!(count.get(), 1);
        assert_eq!(stream.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_released_mid_emission_is_skipped() {
        let stream = EventStream::new();
        let later_calls = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_for_first = Rc::clone(&slot);
        let _first = stream.subscribe(move |_: &()| {
            slot_for_first.borrow_mut().take();
        });

        let lc = Rc::clone(&later_calls);
        *slot.borrow_mut() = Some(stream.subscribe(move |_: &()| lc.set(lc.get() + 1)));

        stream.emit(&());
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn subscribe_during_emission_is_not_called_until_next() {
        let stream: EventStream<()> = EventStream::new();
        let inner_calls = Rc::new(Cell::new(0));
        let held = Rc::new(RefCell::new(Vec::new()));

        let s = stream.clone();
        let ic = Rc::clone(&inner_calls);
        let h = Rc::clone(&held);
        let _outer = stream.subscribe(move |_| {
            let ic = Rc::clone(&ic);
            h.borrow_mut().push(s.subscribe(move |_| ic.set(ic.get() + 1)));
        });

        stream.emit(&());
        assert_eq!(inner_calls.get(), 0);
        stream.emit(&());
        assert_eq!(inner_calls.get(), 1);
    }

    #[test]
    fn subscription_reports_source_liveness() {
        let stream: EventStream<()> = EventStream::new();
        let sub = stream.subscribe(|_| {});
        assert!(sub.is_active());
        drop(stream);
        assert!(!sub.is_active());
    }

    #[test]
    fn on_drop_subscription_runs_cleanup() {
        let cleaned = Rc::new(Cell::new(false));
        let c = Rc::clone(&cleaned);
        let sub = Subscription::on_drop(move || c.set(true));
        assert!(!cleaned.get());
        drop(sub);
        assert!(cleaned.get());
    }

    #[test]
    fn clones_share_subscribers() {
        let a: EventStream<i32> = EventStream::new();
        let b = a.clone();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = a.subscribe(move |v| s.set(*v));

        b.emit(&9);
        assert_eq!(seen.get(), 9);
        assert_eq!(b.subscriber_count(), 1);
    }
}
