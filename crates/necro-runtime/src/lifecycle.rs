#![forbid(unsafe_code)]

//! Lifecycle hooks supplied by whatever layer hosts the form.
//!
//! The core never reaches into a rendering framework. A host tells a group
//! when it is live, and tells a directive when its element enters or leaves
//! the live tree.

use std::rc::Rc;

/// Activation hooks for a controller owned by a long-lived host.
pub trait HostLifecycle {
    /// The host became live. Implementations must tolerate repeated calls.
    fn host_connected(&self);

    /// The host is going away. Releases everything acquired on connect.
    fn host_disconnected(&self);
}

/// Attach/detach hooks for an object bound to a single view element.
pub trait ElementLifecycle<E: ?Sized> {
    type Error;

    /// The element entered the live tree.
    fn on_attach(&mut self, element: Rc<E>) -> Result<(), Self::Error>;

    /// The element left the live tree.
    fn on_detach(&mut self);
}
