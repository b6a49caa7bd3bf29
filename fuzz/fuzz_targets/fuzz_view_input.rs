#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use necro_runtime::form::{BindingDirective, FieldController, PartKind, ValueAccessorRegistry};
use necro_runtime::{ViewElement, VirtualElement};

#[derive(Arbitrary, Debug)]
enum Step {
    Type(String),
    Set(u32),
    Rename(String),
}

fuzz_target!(|steps: Vec<Step>| {
    let field = FieldController::new(0u32);
    let element = VirtualElement::new("kor-input").with_attribute("type", "number");
    let registry = Rc::new(ValueAccessorRegistry::standard());
    let Ok(mut directive) = BindingDirective::new(PartKind::Element, field.bindable(), registry) else {
        return;
    };
    if directive.attach(Rc::new(element.clone())).is_err() {
        return;
    }
    for step in steps {
        match step {
            Step::Type(text) => element.user_input(&text),
            Step::Set(n) => {
                field.set_value(n);
                assert_eq!(element.attribute("value"), Some(n.to_string()));
            }
            Step::Rename(name) => field.set_name(name),
        }
    }
    directive.detach();
    assert_eq!(element.total_listener_count(), 0);
});
