#![forbid(unsafe_code)]

//! A shared, version-tracked value with change notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::stream::{EventStream, Subscribe, Subscription};

struct Cell<T> {
    value: T,
    version: u64,
}

/// A value cell whose changes are published to subscribers.
///
/// Clones share the same value. [`set`](Self::set) with a value equal to the
/// current one does nothing; any other write bumps the version and notifies
/// every subscriber with the new value.
pub struct Observable<T> {
    cell: Rc<RefCell<Cell<T>>>,
    changes: EventStream<T>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(Cell { value, version: 0 })),
            changes: EventStream::new(),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.cell.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow().value)
    }

    /// Replace the value, notifying subscribers when it changed.
    pub fn set(&self, value: T) {
        {
            let mut cell = self.cell.borrow_mut();
            if cell.value == value {
                return;
            }
            cell.value = value.clone();
            cell.version += 1;
        }
        self.changes.emit(&value);
    }

    /// Number of effective writes since construction.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.borrow().version
    }
}

impl<T: Clone + PartialEq + 'static> Subscribe<T> for Observable<T> {
    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.changes.subscribe(callback)
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            changes: self.changes.clone(),
        }
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.borrow();
        f.debug_struct("Observable")
            .field("value", &cell.value)
            .field("version", &cell.version)
            .finish()
    }
}
