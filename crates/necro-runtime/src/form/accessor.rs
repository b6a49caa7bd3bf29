#![forbid(unsafe_code)]

//! Accessors translate between field values and element state.
//!
//! The registry picks one per element by shape. Entries are tried in order:
//! custom registrations first, then the built-ins from most to least
//! specific. The text accessor is the catch-all.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::element::ViewElement;
use super::selector::Selector;
use super::value::ViewValue;
use crate::reactive::Subscription;

/// Receives decoded values from the view.
pub type ViewSink = Box<dyn Fn(ViewValue)>;

/// A pair of conversions for one element shape.
pub trait ValueAccessor {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Push `value` into the element without firing its listeners.
    fn to_view(&self, element: &dyn ViewElement, value: &ViewValue);

    /// Feed `sink` with every decoded view change until the returned
    /// subscription drops.
    fn to_model(&self, element: &Rc<dyn ViewElement>, sink: ViewSink) -> Subscription;
}

/// Listen to `event` and decode the element with `decode` each time.
fn forward(
    element: &Rc<dyn ViewElement>,
    event: &str,
    accessor: &'static str,
    decode: fn(&dyn ViewElement) -> Option<ViewValue>,
    sink: ViewSink,
) -> Subscription {
    let target = Rc::clone(element);
    element.listen(
        event,
        Box::new(move || match decode(target.as_ref()) {
            Some(value) => sink(value),
            None => trace!(accessor, text = %target.value(), "ignoring undecodable input"),
        }),
    )
}

/// Decode number-input text the way the numeric accessors do.
///
/// Empty text is an empty value; anything else must be a finite number.
pub fn parse_number(text: &str) -> Option<ViewValue> {
    let text = text.trim();
    if text.is_empty() {
        return Some(ViewValue::Empty);
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(ViewValue::Number)
}

fn truthy(value: &ViewValue) -> bool {
    match value {
        ViewValue::Empty => false,
        ViewValue::Number(n) => *n != 0.0,
        ViewValue::Bool(b) => *b,
        ViewValue::Text(t) => t == "true",
    }
}

/// `kor-input[type=number]`: a custom element that owns its own value
/// property and reports edits with `value-changed`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomNumberAccessor;

impl ValueAccessor for CustomNumberAccessor {
    fn name(&self) -> &str {
        "custom-number"
    }

    fn to_view(&self, element: &dyn ViewElement, value: &ViewValue) {
        element.set_attribute("value", &value.to_text());
    }

    fn to_model(&self, element: &Rc<dyn ViewElement>, sink: ViewSink) -> Subscription {
        forward(element, "value-changed", "custom-number", |el| parse_number(&el.value()), sink)
    }
}

/// `[type=number]`: a native numeric input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberAccessor;

impl ValueAccessor for NumberAccessor {
    fn name(&self) -> &str {
        "number"
    }

    fn to_view(&self, element: &dyn ViewElement, value: &ViewValue) {
        let text = value.to_text();
        element.set_attribute("value", &text);
        element.set_value(&text);
    }

    fn to_model(&self, element: &Rc<dyn ViewElement>, sink: ViewSink) -> Subscription {
        forward(element, "input", "number", |el| parse_number(&el.value()), sink)
    }
}

/// `[type=checkbox]`: boolean state lives in the checked flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckboxAccessor;

impl ValueAccessor for CheckboxAccessor {
    fn name(&self) -> &str {
        "checkbox"
    }

    fn to_view(&self, element: &dyn ViewElement, value: &ViewValue) {
        let checked = truthy(value);
        element.set_attribute("value", if checked { "true" } else { "false" });
        element.set_checked(checked);
    }

    fn to_model(&self, element: &Rc<dyn ViewElement>, sink: ViewSink) -> Subscription {
        forward(element, "change", "checkbox", |el| Some(ViewValue::Bool(el.checked())), sink)
    }
}

/// Generic text input, and the fallback for unmatched elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAccessor;

impl ValueAccessor for TextAccessor {
    fn name(&self) -> &str {
        "text"
    }

    fn to_view(&self, element: &dyn ViewElement, value: &ViewValue) {
        let text = value.to_text();
        element.set_attribute("value", &text);
        element.set_value(&text);
    }

    fn to_model(&self, element: &Rc<dyn ViewElement>, sink: ViewSink) -> Subscription {
        forward(element, "change", "text", |el| Some(ViewValue::Text(el.value())), sink)
    }
}

/// Ordered selector → accessor table.
pub struct ValueAccessorRegistry {
    entries: Vec<(Selector, Rc<dyn ValueAccessor>)>,
    /// Custom entries occupy `entries[..custom]`.
    custom: usize,
    fallback: Rc<dyn ValueAccessor>,
}

impl ValueAccessorRegistry {
    /// The built-in table.
    #[must_use]
    pub fn standard() -> Self {
        let text: Rc<dyn ValueAccessor> = Rc::new(TextAccessor);
        Self {
            entries: vec![
                (
                    Selector::tag("kor-input").with_attribute_value("type", "number"),
                    Rc::new(CustomNumberAccessor),
                ),
                (
                    Selector::any().with_attribute_value("type", "number"),
                    Rc::new(NumberAccessor),
                ),
                (
                    Selector::any().with_attribute_value("type", "checkbox"),
                    Rc::new(CheckboxAccessor),
                ),
                (Selector::tag("input"), Rc::clone(&text)),
            ],
            custom: 0,
            fallback: text,
        }
    }

    /// Add an entry that takes priority over every built-in. Custom entries
    /// keep their registration order among themselves.
    pub fn register(&mut self, selector: Selector, accessor: impl ValueAccessor + 'static) -> &mut Self {
        debug!(%selector, accessor = accessor.name(), "registering value accessor");
        self.entries.insert(self.custom, (selector, Rc::new(accessor)));
        self.custom += 1;
        self
    }

    /// The first accessor whose selector matches, else the text fallback.
    #[must_use]
    pub fn resolve(&self, element: &dyn ViewElement) -> Rc<dyn ValueAccessor> {
        let found = self
            .entries
            .iter()
            .find(|(selector, _)| selector.matches(element));
        match found {
            Some((selector, accessor)) => {
                trace!(%selector, accessor = accessor.name(), "accessor resolved");
                Rc::clone(accessor)
            }
            None => {
                trace!(tag = %element.tag_name(), "no accessor matched; using fallback");
                Rc::clone(&self.fallback)
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ValueAccessorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ValueAccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (selector, accessor) in &self.entries {
            list.entry(&format_args!("{selector} => {}", accessor.name()));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::element::VirtualElement;
    use std::cell::RefCell;

    fn element(tag: &str, kind: Option<&str>) -> VirtualElement {
        let el = VirtualElement::new(tag);
        if let Some(kind) = kind {
            el.set_attribute("type", kind);
        }
        el
    }

    fn resolved(registry: &ValueAccessorRegistry, el: &VirtualElement) -> String {
        registry.resolve(el).name().to_string()
    }

    fn capture(
        accessor: &Rc<dyn ValueAccessor>,
        el: &VirtualElement,
    ) -> (Rc<RefCell<Vec<ViewValue>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let shared: Rc<dyn ViewElement> = Rc::new(el.clone());
        let sub = accessor.to_model(&shared, Box::new(move |v| s.borrow_mut().push(v)));
        (seen, sub)
    }

    #[test]
    fn standard_priority_order() {
        let registry = ValueAccessorRegistry::standard();
        assert_eq!(resolved(&registry, &element("kor-input", Some("number"))), "custom-number");
        assert_eq!(resolved(&registry, &element("input", Some("number"))), "number");
        assert_eq!(resolved(&registry, &element("input", Some("checkbox"))), "checkbox");
        assert_eq!(resolved(&registry, &element("input", Some("text"))), "text");
        assert_eq!(resolved(&registry, &element("textarea", None)), "text");
    }

    #[test]
    fn custom_entries_win_in_registration_order() {
        let mut registry = ValueAccessorRegistry::standard();
        registry
            .register(Selector::any().with_attribute_value("type", "number"), CheckboxAccessor)
            .register(Selector::tag("input"), NumberAccessor);
        assert_eq!(registry.len(), 6);
        assert_eq!(resolved(&registry, &element("kor-input", Some("number"))), "checkbox");
        assert_eq!(resolved(&registry, &element("input", None)), "number");
    }

    #[test]
    fn custom_number_writes_attribute_only() {
        let el = element("kor-input", Some("number"));
        el.set_value("typed");
        CustomNumberAccessor.to_view(&el, &ViewValue::Number(3.0));
        assert_eq!(el.attribute("value").as_deref(), Some("3"));
    }

    #[test]
    fn number_input_decodes_and_drops_garbage() {
        let el = element("input", Some("number"));
        let accessor: Rc<dyn ValueAccessor> = Rc::new(NumberAccessor);
        let (seen, _sub) = capture(&accessor, &el);

        el.user_input("4.5");
        el.user_input("");
        el.user_input("four");
        assert_eq!(*seen.borrow(), vec![ViewValue::Number(4.5), ViewValue::Empty]);
    }

    #[test]
    fn custom_number_listens_to_value_changed_only() {
        let el = element("kor-input", Some("number"));
        let accessor: Rc<dyn ValueAccessor> = Rc::new(CustomNumberAccessor);
        let (seen, _sub) = capture(&accessor, &el);

        el.dispatch("input");
        el.dispatch("change");
        assert!(seen.borrow().is_empty());

        el.user_input("2");
        assert_eq!(*seen.borrow(), vec![ViewValue::Number(2.0)]);
    }

    #[test]
    fn checkbox_round_trip() {
        let el = element("input", Some("checkbox"));
        CheckboxAccessor.to_view(&el, &ViewValue::Bool(true));
        assert!(el.checked());
        assert_eq!(el.attribute("value").as_deref(), Some("true"));

        let accessor: Rc<dyn ValueAccessor> = Rc::new(CheckboxAccessor);
        let (seen, _sub) = capture(&accessor, &el);
        el.user_toggle(false);
        assert_eq!(*seen.borrow(), vec![ViewValue::Bool(false)]);
    }

    #[test]
    fn listener_released_with_subscription() {
        let el = element("input", None);
        let accessor: Rc<dyn ValueAccessor> = Rc::new(TextAccessor);
        let (seen, sub) = capture(&accessor, &el);
        drop(sub);

        el.user_input("late");
        assert!(seen.borrow().is_empty());
        assert_eq!(el.total_listener_count(), 0);
    }
}
