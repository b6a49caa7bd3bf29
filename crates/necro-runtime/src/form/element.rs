#![forbid(unsafe_code)]

//! The view side of a binding.
//!
//! [`ViewElement`] is everything the core needs from an element: a shape to
//! match accessors against, value/checked state to write, and a way to hear
//! native notifications. Programmatic setters never notify listeners; only
//! the host (or [`VirtualElement::dispatch`]) does.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{EventStream, Subscribe, Subscription};

/// A view element a field can be bound to.
pub trait ViewElement {
    /// Lower-case tag name.
    fn tag_name(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    /// The live text value property.
    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    fn checked(&self) -> bool;

    fn set_checked(&self, checked: bool);

    /// Call `handler` on every native `event` until the subscription drops.
    fn listen(&self, event: &str, handler: Box<dyn Fn()>) -> Subscription;
}

#[derive(Debug, Default)]
struct ElementState {
    attributes: Vec<(String, String)>,
    value: String,
    checked: bool,
}

/// In-memory element for headless hosts and tests.
///
/// Clones refer to the same element.
#[derive(Clone)]
pub struct VirtualElement {
    tag: Rc<str>,
    state: Rc<RefCell<ElementState>>,
    listeners: Rc<RefCell<HashMap<String, EventStream<()>>>>,
}

impl VirtualElement {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase().into(),
            state: Rc::new(RefCell::new(ElementState::default())),
            listeners: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Builder form of [`ViewElement::set_attribute`].
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Fire a native notification.
    pub fn dispatch(&self, event: &str) {
        // Clone out so handlers may add or drop listeners.
        let stream = self.listeners.borrow().get(event).cloned();
        if let Some(stream) = stream {
            stream.emit(&());
        }
    }

    /// Simulate the user typing `text`: the value changes, then `input`,
    /// `value-changed` and `change` fire in that order.
    pub fn user_input(&self, text: &str) {
        self.state.borrow_mut().value = text.to_string();
        for event in ["input", "value-changed", "change"] {
            self.dispatch(event);
        }
    }

    /// Simulate the user clicking a checkbox into `checked`.
    pub fn user_toggle(&self, checked: bool) {
        self.state.borrow_mut().checked = checked;
        self.dispatch("input");
        self.dispatch("change");
    }

    /// Live listeners for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .get(event)
            .map_or(0, EventStream::subscriber_count)
    }

    /// Live listeners across every event.
    #[must_use]
    pub fn total_listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .values()
            .map(EventStream::subscriber_count)
            .sum()
    }
}

impl ViewElement for VirtualElement {
    fn tag_name(&self) -> String {
        self.tag.to_string()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        match state.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value.to_string(),
            None => state.attributes.push((name.to_string(), value.to_string())),
        }
        // The value attribute seeds the property, as in a custom input.
        if name == "value" {
            state.value = value.to_string();
        }
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.state.borrow_mut().value = value.to_string();
    }

    fn checked(&self) -> bool {
        self.state.borrow().checked
    }

    fn set_checked(&self, checked: bool) {
        self.state.borrow_mut().checked = checked;
    }

    fn listen(&self, event: &str, handler: Box<dyn Fn()>) -> Subscription {
        let stream = self
            .listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .clone();
        stream.subscribe(move |_: &()| handler())
    }
}

impl fmt::Debug for VirtualElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualElement")
            .field("tag", &self.tag)
            .field("attributes", &state.attributes)
            .field("value", &state.value)
            .field("checked", &state.checked)
            .finish()
    }
}
