#![forbid(unsafe_code)]

//! Error types for the form layer.
//!
//! Everything here is a wiring defect: a directive on the wrong kind of part,
//! a group that cannot form a snapshot, a malformed selector. They surface at
//! setup time and are not meant to be recovered from at runtime.

use thiserror::Error;

use super::directive::PartKind;

/// Errors raised while attaching a [`BindingDirective`](super::BindingDirective).
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("form control should be placed on an element, not on a {0:?} part")]
    NotAnElement(PartKind),

    #[error("binding directive was disposed; attach a new directive instead")]
    Disposed,
}

/// Errors raised while building or querying a field group.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("no field named `{0}` in this group")]
    UnknownField(String),

    #[error("field `{field}` could not be encoded: {source}")]
    Encode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("fields do not assemble into the group snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
}

/// Errors from [`Selector::parse`](super::Selector::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,

    #[error("unexpected `{found}` at offset {position}")]
    UnexpectedChar { found: char, position: usize },

    #[error("attribute clause starting at offset {position} is not closed")]
    Unterminated { position: usize },

    #[error("attribute clause at offset {position} has no name")]
    EmptyAttributeName { position: usize },
}
