#![forbid(unsafe_code)]

//! Publish/subscribe primitives for the field and binding layers.
//!
//! - [`EventStream`]: a multi-subscriber event source with no stored value.
//! - [`Observable`]: a version-tracked value cell that notifies on change.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BindingScope`]: a disposal bag that releases every subscription it
//!   holds at once.
//!
//! # Architecture
//!
//! Sources hold their subscribers as `Weak` callbacks; the matching strong
//! reference lives inside the [`Subscription`]. Dropping the subscription is
//! therefore the only way to unsubscribe, and it takes effect immediately,
//! even in the middle of an emission.
//!
//! # Invariants
//!
//! 1. Subscribers are notified synchronously, in registration order.
//! 2. A subscriber released during an emission is not invoked for the rest
//!    of that emission.
//! 3. Setting an [`Observable`] to an equal value is a no-op (no version bump,
//!    no notifications).
//! 4. After a [`BindingScope`] is cleared or dropped, none of its callbacks
//!    fire again.

pub mod binding;
pub mod observable;
pub mod stream;

pub use binding::BindingScope;
pub use observable::Observable;
pub use stream::{EventStream, Subscribe, Subscription};
