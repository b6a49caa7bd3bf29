#![forbid(unsafe_code)]

//! Binding directive: attaches one field to one view element.
//!
//! # State machine
//!
//! ```text
//! Unbound --attach--> Bound --detach--> Disposed
//!    |                                     ^
//!    +---------------detach----------------+
//! ```
//!
//! `Disposed` is terminal. Attaching while `Bound` does nothing; attaching
//! after `Disposed` is an error, since a new element needs a new directive.
//!
//! While bound the directive holds three subscriptions in one scope: field
//! changes pushed to the view, the field name mirrored onto the element, and
//! decoded view edits written back to the field. Detaching drops the scope,
//! so none of them can run again.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::accessor::{ValueAccessor, ValueAccessorRegistry};
use super::element::ViewElement;
use super::error::BindingError;
use super::field::{AnyField, ControlHandle};
use super::value::ViewValue;
use crate::lifecycle::ElementLifecycle;
use crate::reactive::BindingScope;

/// Where in a rendered template a directive was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Element,
    Attribute,
    Property,
    Child,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveState {
    Unbound,
    Bound,
    Disposed,
}

/// Keeps one field and one element in sync for the element's lifetime.
pub struct BindingDirective {
    state: DirectiveState,
    field: Option<Rc<dyn AnyField>>,
    element: Option<Rc<dyn ViewElement>>,
    accessor: Option<Rc<dyn ValueAccessor>>,
    registry: Rc<ValueAccessorRegistry>,
    scope: BindingScope,
}

impl BindingDirective {
    /// Prepare a directive placed on `part`. Only element parts can host a
    /// form control.
    pub fn new(
        part: PartKind,
        handle: ControlHandle,
        registry: Rc<ValueAccessorRegistry>,
    ) -> Result<Self, BindingError> {
        if part != PartKind::Element {
            return Err(BindingError::NotAnElement(part));
        }
        Ok(Self {
            state: DirectiveState::Unbound,
            field: Some(handle.into_field()),
            element: None,
            accessor: None,
            registry,
            scope: BindingScope::new(),
        })
    }

    #[must_use]
    pub fn state(&self) -> DirectiveState {
        self.state
    }

    /// The bound element, while bound.
    #[must_use]
    pub fn element(&self) -> Option<&Rc<dyn ViewElement>> {
        self.element.as_ref()
    }

    /// Name of the bound field, until disposed.
    #[must_use]
    pub fn field_name(&self) -> Option<String> {
        self.field.as_ref().map(|field| field.field_name())
    }

    /// Label of the accessor chosen for the element, while bound.
    #[must_use]
    pub fn accessor_name(&self) -> Option<&str> {
        self.accessor.as_deref().map(|accessor| accessor.name())
    }

    /// Bind to `element`.
    pub fn attach(&mut self, element: Rc<dyn ViewElement>) -> Result<(), BindingError> {
        if self.state == DirectiveState::Bound {
            debug!(field = ?self.field_name(), "directive already bound; ignoring attach");
            return Ok(());
        }
        // Only disposal clears the field.
        let Some(field) = self.field.clone() else {
            return Err(BindingError::Disposed);
        };
        let accessor = self.registry.resolve(element.as_ref());

        accessor.to_view(element.as_ref(), &field.view_value());
        let name = field.field_name();
        if !name.is_empty() {
            element.set_attribute("name", &name);
        }

        {
            let accessor = Rc::clone(&accessor);
            let element = Rc::clone(&element);
            self.scope.hold(field.on_view_changed(Box::new(move |value: &ViewValue| {
                accessor.to_view(element.as_ref(), value);
            })));
        }
        {
            let element = Rc::clone(&element);
            self.scope.hold(field.on_name_changed(Box::new(move |name: &str| {
                if !name.is_empty() {
                    element.set_attribute("name", name);
                }
            })));
        }
        {
            let field = Rc::clone(&field);
            self.scope.hold(accessor.to_model(
                &element,
                Box::new(move |value: ViewValue| {
                    if !field.accept_view_value(value.clone()) {
                        debug!(field = %field.field_name(), ?value, "view value rejected by field");
                    }
                }),
            ));
        }

        debug!(
            field = %name,
            accessor = accessor.name(),
            tag = %element.tag_name(),
            "directive bound"
        );
        self.element = Some(element);
        self.accessor = Some(accessor);
        self.state = DirectiveState::Bound;
        Ok(())
    }

    /// Release every subscription and forget the field and element.
    pub fn detach(&mut self) {
        if self.state == DirectiveState::Disposed {
            return;
        }
        self.scope.clear();
        debug!(field = ?self.field_name(), "directive disposed");
        self.field = None;
        self.element = None;
        self.accessor = None;
        self.state = DirectiveState::Disposed;
    }
}

impl ElementLifecycle<dyn ViewElement> for BindingDirective {
    type Error = BindingError;

    fn on_attach(&mut self, element: Rc<dyn ViewElement>) -> Result<(), BindingError> {
        self.attach(element)
    }

    fn on_detach(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for BindingDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingDirective")
            .field("state", &self.state)
            .field("field", &self.field_name())
            .field("accessor", &self.accessor_name())
            .field("bindings", &self.scope.binding_count())
            .finish()
    }
}
