use std::cell::{Cell, RefCell};
use std::rc::Rc;

use necro_runtime::form::{BindingDirective, FieldController, FieldGroupController, PartKind, ValueAccessorRegistry};
use necro_runtime::persist::{FileStorage, MemoryStorage, PersistentStore};
use necro_runtime::{HostLifecycle, Subscribe, ViewElement, VirtualElement};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pair {
    x: i64,
    y: i64,
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn default_once(default in any::<i64>(), written in any::<i64>()) {
        let storage = MemoryStorage::new();
        let mut store = PersistentStore::new("state", &Pair { x: default, y: 0 }, storage.clone())
            .expect("object defaults");

        prop_assert_eq!(store.get("x"), Some(json!(default)));
        prop_assert_eq!(store.get("x"), None);

        store.set("x", &written).expect("set");
        prop_assert_eq!(store.get("x"), Some(json!(written)));
        prop_assert_eq!(store.get("x"), Some(json!(written)));
    }

    #[test]
    fn write_through_survives_reopen(key in "[a-z]{1,6}", value in json_value()) {
        let storage = MemoryStorage::new();
        let defaults = Pair { x: 0, y: 0 };
        let mut store = PersistentStore::new("state", &defaults, storage.clone()).expect("open");
        store.set(&key, &value).expect("set");
        prop_assert_eq!(store.get(&key), Some(value.clone()));

        let reopened = PersistentStore::new("state", &defaults, storage).expect("reopen");
        prop_assert_eq!(reopened.get(&key), Some(value));
    }

    #[test]
    fn no_echo(values in prop::collection::vec(0u8..4, 1..20)) {
        let field = FieldController::new(0u8);
        let fired = Rc::new(Cell::new(0usize));
        let f = Rc::clone(&fired);
        let _sub = field.changed().subscribe(move |_| f.set(f.get() + 1));

        let mut expected = 0;
        let mut last: Option<u8> = None;
        for v in values {
            field.set_value(v);
            field.set_value(v);
            if last != Some(v) {
                expected += 1;
                last = Some(v);
            }
        }
        prop_assert_eq!(fired.get(), expected);
    }

    #[test]
    fn group_snapshot_is_consistent(x0 in any::<i64>(), y0 in any::<i64>(), x1 in any::<i64>()) {
        let x = FieldController::new(x0);
        let y = FieldController::new(y0);
        let group = FieldGroupController::<Pair>::builder()
            .field("x", &x)
            .field("y", &y)
            .build()
            .expect("group");
        group.host_connected();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = group.change().subscribe(move |p: &Pair| s.borrow_mut().push(p.clone()));

        x.set_value(x1);
        prop_assert_eq!(seen.borrow().clone(), vec![Pair { x: x1, y: y0 }]);
    }
}

#[test]
fn disposal_stops_view_updates_while_sibling_stays_bound() {
    let registry = Rc::new(ValueAccessorRegistry::standard());
    let field = FieldController::new(0u32);
    let first = VirtualElement::new("input").with_attribute("type", "number");
    let second = VirtualElement::new("input").with_attribute("type", "number");

    let mut a = BindingDirective::new(PartKind::Element, field.bindable(), Rc::clone(&registry)).expect("a");
    let mut b = BindingDirective::new(PartKind::Element, field.bindable(), registry).expect("b");
    a.attach(Rc::new(first.clone())).expect("attach a");
    b.attach(Rc::new(second.clone())).expect("attach b");

    a.detach();
    second.user_input("8");

    assert_eq!(field.get_value(), 8);
    assert_eq!(second.value(), "8");
    assert_eq!(first.value(), "0");
}

#[test]
fn unmatched_element_round_trips_text() {
    let registry = Rc::new(ValueAccessorRegistry::standard());
    let field = FieldController::new(String::from("bone"));
    let el = VirtualElement::new("my-widget");
    let mut directive = BindingDirective::new(PartKind::Element, field.bindable(), registry).expect("directive");
    directive.attach(Rc::new(el.clone())).expect("attach");

    assert_eq!(el.value(), "bone");
    el.user_input("marrow");
    assert_eq!(field.get_value(), "marrow");
    field.set_value("dust".into());
    assert_eq!(el.value(), "dust");
}

#[test]
fn file_storage_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let defaults = Pair { x: 1, y: 2 };
    {
        let mut store = PersistentStore::new("state", &defaults, FileStorage::new(dir.path())).expect("open");
        store.assign(&Pair { x: 5, y: 2 }).expect("assign");
    }
    let store = PersistentStore::new("state", &defaults, FileStorage::new(dir.path())).expect("reopen");
    assert_eq!(store.get_as::<i64>("x").expect("decode"), Some(5));
    assert_eq!(store.to_json(), r#"{"x":5,"y":2}"#);
}
