#![forbid(unsafe_code)]

//! A named collection of fields that publishes whole-form snapshots.
//!
//! While connected, any child publication causes the group to read every
//! child and publish the assembled `T`. Children never learn about the
//! group; the group only holds their erased handles.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{trace, warn};

use super::error::FormError;
use super::field::{AnyField, ControlHandle, FieldController};
use super::value::FieldValue;
use crate::lifecycle::HostLifecycle;
use crate::reactive::{BindingScope, EventStream};

type Fields = Rc<[(String, Rc<dyn AnyField>)]>;

/// Aggregates child fields into a composite `T`.
pub struct FieldGroupController<T> {
    fields: Fields,
    change: EventStream<T>,
    scope: RefCell<BindingScope>,
    connected: Cell<bool>,
}

impl<T: DeserializeOwned + 'static> FieldGroupController<T> {
    #[must_use]
    pub fn builder() -> FieldGroupBuilder<T> {
        FieldGroupBuilder {
            fields: Vec::new(),
            seen: HashSet::new(),
            duplicate: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// The current composite snapshot.
    pub fn value(&self) -> Result<T, FormError> {
        snapshot(&self.fields)
    }

    /// Merged stream of snapshots. Fires only while connected.
    #[must_use]
    pub fn change(&self) -> &EventStream<T> {
        &self.change
    }

    /// Label the field `name` and hand out a binding handle for it.
    pub fn control(&self, name: &str) -> Result<ControlHandle, FormError> {
        let (_, field) = self
            .fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        field.set_field_name(name);
        Ok(ControlHandle::new(Rc::clone(field)))
    }

    /// Child names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

impl<T: DeserializeOwned + 'static> HostLifecycle for FieldGroupController<T> {
    fn host_connected(&self) {
        if self.connected.replace(true) {
            return;
        }
        let mut scope = self.scope.borrow_mut();
        for (name, field) in self.fields.iter() {
            let fields = Rc::clone(&self.fields);
            let change = self.change.clone();
            let source = name.clone();
            scope.hold(field.on_changed(Box::new(move || {
                match snapshot::<T>(&fields) {
                    Ok(value) => {
                        trace!(field = %source, "group snapshot");
                        change.emit(&value);
                    }
                    Err(err) => warn!(field = %source, error = %err, "dropping group snapshot"),
                }
            })));
        }
    }

    fn host_disconnected(&self) {
        if !self.connected.replace(false) {
            return;
        }
        // Take the scope out before dropping so re-entrant calls see it empty.
        let released = std::mem::take(&mut *self.scope.borrow_mut());
        drop(released);
    }
}

impl<T> fmt::Debug for FieldGroupController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("FieldGroupController")
            .field("fields", &names)
            .field("connected", &self.connected.get())
            .finish()
    }
}

fn snapshot<T: DeserializeOwned>(fields: &[(String, Rc<dyn AnyField>)]) -> Result<T, FormError> {
    let mut map = Map::with_capacity(fields.len());
    for (name, field) in fields {
        let value = field.json_value().map_err(|source| FormError::Encode {
            field: name.clone(),
            source,
        })?;
        map.insert(name.clone(), value);
    }
    serde_json::from_value(Value::Object(map)).map_err(FormError::Snapshot)
}

/// Collects named fields for a [`FieldGroupController`].
pub struct FieldGroupBuilder<T> {
    fields: Vec<(String, Rc<dyn AnyField>)>,
    seen: HashSet<String>,
    duplicate: Option<String>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + 'static> FieldGroupBuilder<T> {
    /// Add `controller` under `name`. The group shares the controller.
    #[must_use]
    pub fn field<V: FieldValue>(mut self, name: impl Into<String>, controller: &FieldController<V>) -> Self {
        let name = name.into();
        if !self.seen.insert(name.clone()) {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.fields.push((name, Rc::new(controller.clone())));
        self
    }

    /// Finish the group, checking that the children assemble into a `T`.
    pub fn build(self) -> Result<FieldGroupController<T>, FormError> {
        if let Some(name) = self.duplicate {
            return Err(FormError::DuplicateField(name));
        }
        let fields: Fields = self.fields.into();
        snapshot::<T>(&fields)?;
        Ok(FieldGroupController {
            fields,
            change: EventStream::new(),
            scope: RefCell::new(BindingScope::new()),
            connected: Cell::new(false),
        })
    }
}

impl<T> fmt::Debug for FieldGroupBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldGroupBuilder")
            .field("fields", &self.fields.len())
            .finish()
    }
}
