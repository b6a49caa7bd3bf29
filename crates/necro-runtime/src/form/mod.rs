#![forbid(unsafe_code)]

//! Fields, field groups and the bindings that tie them to view elements.
//!
//! Data flows two ways:
//!
//! ```text
//! view edit  -> accessor.to_model -> FieldController::set_value -> group change
//! set_value  -> FieldController::changed -> accessor.to_view -> element
//! ```
//!
//! Echo cycles stop after one round trip: accessors write elements without
//! firing listeners, and fields only publish values that differ from the
//! last one published.

pub mod accessor;
pub mod directive;
pub mod element;
pub mod error;
pub mod field;
pub mod group;
pub mod selector;
pub mod value;

pub use accessor::{
    CheckboxAccessor, CustomNumberAccessor, NumberAccessor, TextAccessor, ValueAccessor,
    ValueAccessorRegistry, ViewSink, parse_number,
};
pub use directive::{BindingDirective, DirectiveState, PartKind};
pub use element::{ViewElement, VirtualElement};
pub use error::{BindingError, FormError, SelectorError};
pub use field::{AnyField, ControlHandle, FieldController, SetOptions};
pub use group::{FieldGroupBuilder, FieldGroupController};
pub use selector::{AttributeMatch, Selector};
pub use value::{FieldValue, ViewValue};
