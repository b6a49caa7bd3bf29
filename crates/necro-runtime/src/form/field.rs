#![forbid(unsafe_code)]

//! A single named, typed, observable value slot.
//!
//! # Invariants
//!
//! 1. `set_value` always stores the new value.
//! 2. `changed` publishes only when emission is requested *and* the value
//!    differs from the last value published. Before the first publication
//!    every emitting write publishes.
//! 3. The name is a separate stream; renaming never publishes on `changed`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::value::{FieldValue, ViewValue};
use crate::reactive::{EventStream, Observable, Subscribe, Subscription};

/// Options for [`FieldController::set_value_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// Publish on `changed` if the value differs from the last publication.
    pub emit: bool,
}

impl SetOptions {
    /// Store the value without notifying anyone.
    #[must_use]
    pub const fn silent() -> Self {
        Self { emit: false }
    }
}

impl Default for SetOptions {
    fn default() -> Self {
        Self { emit: true }
    }
}

struct FieldState<T> {
    value: T,
    last_emitted: Option<T>,
}

/// One observable field. Clones are handles to the same field.
pub struct FieldController<T> {
    state: Rc<RefCell<FieldState<T>>>,
    changed: EventStream<T>,
    name: Observable<String>,
}

impl<T: FieldValue> FieldController<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(FieldState {
                value,
                last_emitted: None,
            })),
            changed: EventStream::new(),
            name: Observable::new(String::new()),
        }
    }

    #[must_use]
    pub fn get_value(&self) -> T {
        self.state.borrow().value.clone()
    }

    /// Store `value` and publish it if it is new.
    pub fn set_value(&self, value: T) {
        self.set_value_with(value, SetOptions::default());
    }

    /// Store `value`; returns whether `changed` fired.
    pub fn set_value_with(&self, value: T, options: SetOptions) -> bool {
        let publish = {
            let mut state = self.state.borrow_mut();
            state.value = value.clone();
            let publish = options.emit && state.last_emitted.as_ref() != Some(&value);
            if publish {
                state.last_emitted = Some(value.clone());
            }
            publish
        };
        if publish {
            self.changed.emit(&value);
        }
        publish
    }

    /// Stream of distinct published values.
    #[must_use]
    pub fn changed(&self) -> &EventStream<T> {
        &self.changed
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.name.get()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    /// Follow the label that bound elements mirror into their `name` attribute.
    pub fn subscribe_name(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        self.name.subscribe(move |name: &String| callback(name.as_str()))
    }

    /// A binding handle for a field used outside any group.
    #[must_use]
    pub fn bindable(&self) -> ControlHandle {
        ControlHandle::new(Rc::new(self.clone()))
    }
}

impl<T> Clone for FieldController<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            changed: self.changed.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FieldController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldController")
            .field("name", &self.name)
            .field("value", &self.state.borrow().value)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Type-erased access for groups and directives
// ---------------------------------------------------------------------------

/// Object-safe view of a [`FieldController`] of any value type.
pub trait AnyField {
    /// Current value as JSON, for group snapshots.
    fn json_value(&self) -> Result<Value, serde_json::Error>;

    /// Current value as a view value, for pushing into elements.
    fn view_value(&self) -> ViewValue;

    /// Decode and store a view-originated value. Returns `false` when the
    /// value does not fit the field type and was dropped.
    fn accept_view_value(&self, value: ViewValue) -> bool;

    /// Notified after every publication on `changed`.
    fn on_changed(&self, callback: Box<dyn Fn()>) -> Subscription;

    /// Notified with each published value, converted for the view.
    fn on_view_changed(&self, callback: Box<dyn Fn(&ViewValue)>) -> Subscription;

    fn field_name(&self) -> String;

    fn set_field_name(&self, name: &str);

    fn on_name_changed(&self, callback: Box<dyn Fn(&str)>) -> Subscription;
}

impl<T: FieldValue> AnyField for FieldController<T> {
    fn json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.state.borrow().value)
    }

    fn view_value(&self) -> ViewValue {
        self.state.borrow().value.to_view()
    }

    fn accept_view_value(&self, value: ViewValue) -> bool {
        match T::from_view(value) {
            Some(decoded) => {
                self.set_value(decoded);
                true
            }
            None => false,
        }
    }

    fn on_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(move |_| callback())
    }

    fn on_view_changed(&self, callback: Box<dyn Fn(&ViewValue)>) -> Subscription {
        self.changed.subscribe(move |value: &T| callback(&value.to_view()))
    }

    fn field_name(&self) -> String {
        self.name()
    }

    fn set_field_name(&self, name: &str) {
        self.set_name(name);
    }

    fn on_name_changed(&self, callback: Box<dyn Fn(&str)>) -> Subscription {
        self.subscribe_name(move |name: &str| callback(name))
    }
}

/// Opaque handle that lets exactly one binding directive drive a field.
///
/// Not `Clone`: a second element needs a second handle.
pub struct ControlHandle {
    field: Rc<dyn AnyField>,
}

impl ControlHandle {
    pub(crate) fn new(field: Rc<dyn AnyField>) -> Self {
        Self { field }
    }

    /// Name of the field this handle drives.
    #[must_use]
    pub fn name(&self) -> String {
        self.field.field_name()
    }

    pub(crate) fn into_field(self) -> Rc<dyn AnyField> {
        self.field
    }
}

impl fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlHandle")
            .field("field", &self.field.field_name())
            .finish()
    }
}
