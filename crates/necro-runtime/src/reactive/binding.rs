#![forbid(unsafe_code)]

//! Scoped lifetime management for subscriptions.
//!
//! A [`BindingScope`] is the disposal signal shared by everything a single
//! owner subscribes to: a binding directive, a field group, an application
//! shell. Clearing (or dropping) the scope tears all of it down at once.
//!
//! # Usage
//!
//! ```
//! use necro_runtime::reactive::{BindingScope, Observable};
//!
//! let count = Observable::new(0);
//! let mut scope = BindingScope::new();
//! scope.subscribe(&count, |v: &i32| println!("value: {v}"));
//!
//! count.set(1); // prints
//! scope.clear();
//! count.set(2); // silent
//! ```
//!
//! # Invariants
//!
//! 1. Subscriptions are released in reverse registration order.
//! 2. After `clear()` or drop, no callback from this scope fires, even if the
//!    source keeps emitting.
//! 3. A cleared scope is empty and reusable.

use super::stream::{Subscribe, Subscription};

/// Collects subscriptions for one logical owner.
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep `sub` alive until the scope is cleared or dropped.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to `source` for the lifetime of this scope.
    pub fn subscribe<T, S>(&mut self, source: &S, callback: impl Fn(&T) + 'static) -> &mut Self
    where
        S: Subscribe<T>,
    {
        let sub = source.subscribe(callback);
        self.subscriptions.push(sub);
        self
    }

    /// Number of subscriptions held.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every held subscription now.
    pub fn clear(&mut self) {
        while let Some(sub) = self.subscriptions.pop() {
            drop(sub);
        }
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}
