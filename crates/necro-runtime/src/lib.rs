#![forbid(unsafe_code)]

//! Reactive state synchronization for necro.
//!
//! This crate provides:
//! - [`reactive`]: single-threaded event streams, observables and disposal scopes
//! - [`form`]: typed fields, field groups, value accessors and the binding
//!   directive that keeps a field and a view element in sync
//! - [`persist`]: a typed JSON object with lazy defaults and write-through storage
//! - [`history`]: an in-process navigation history
//!
//! Nothing here renders, rolls dice or touches the network.

pub mod form;
pub mod history;
pub mod lifecycle;
pub mod persist;
pub mod reactive;

pub use form::{
    BindingDirective, BindingError, ControlHandle, DirectiveState, FieldController,
    FieldGroupController, FieldValue, FormError, PartKind, SetOptions, ValueAccessor,
    ValueAccessorRegistry, ViewElement, ViewValue, VirtualElement,
};
pub use history::HistoryService;
pub use lifecycle::{ElementLifecycle, HostLifecycle};
pub use persist::{FileStorage, MemoryStorage, PersistError, PersistentStore, StorageBackend, StorageError};
pub use reactive::{BindingScope, EventStream, Observable, Subscribe, Subscription};
