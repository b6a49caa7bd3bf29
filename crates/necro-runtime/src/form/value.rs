#![forbid(unsafe_code)]

//! Values crossing the model/view boundary.
//!
//! Accessors only ever see a [`ViewValue`]; fields convert to and from it
//! through [`FieldValue`]. A view value a field cannot represent converts to
//! `None` and is dropped by the binding.

use serde::Serialize;

/// The dynamic value an accessor reads from or writes to a view element.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewValue {
    /// No value (an empty input, an unset optional field).
    #[default]
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ViewValue {
    /// Text form used by text-like elements.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Text(t) => t.clone(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A type that can live in a [`FieldController`](super::FieldController).
///
/// `Serialize` feeds group snapshots; `to_view`/`from_view` feed bindings.
pub trait FieldValue: Clone + PartialEq + Serialize + 'static {
    fn to_view(&self) -> ViewValue;

    /// Decode a view value, or `None` when it does not fit this type.
    fn from_view(value: ViewValue) -> Option<Self>;
}

impl FieldValue for String {
    fn to_view(&self) -> ViewValue {
        ViewValue::Text(self.clone())
    }

    fn from_view(value: ViewValue) -> Option<Self> {
        Some(value.to_text())
    }
}

impl FieldValue for bool {
    fn to_view(&self) -> ViewValue {
        ViewValue::Bool(*self)
    }

    fn from_view(value: ViewValue) -> Option<Self> {
        match value {
            ViewValue::Bool(b) => Some(b),
            ViewValue::Text(t) => t.trim().parse().ok(),
            ViewValue::Empty | ViewValue::Number(_) => None,
        }
    }
}

impl FieldValue for f64 {
    fn to_view(&self) -> ViewValue {
        ViewValue::Number(*self)
    }

    fn from_view(value: ViewValue) -> Option<Self> {
        match value {
            ViewValue::Number(n) => Some(n),
            ViewValue::Text(t) => t.trim().parse().ok(),
            ViewValue::Empty | ViewValue::Bool(_) => None,
        }
    }
}

impl FieldValue for f32 {
    fn to_view(&self) -> ViewValue {
        ViewValue::Number(f64::from(*self))
    }

    fn from_view(value: ViewValue) -> Option<Self> {
        // Finite values past the f32 range would round to infinity.
        f64::from_view(value)
            .map(|n| (n, n as f32))
            .and_then(|(wide, narrow)| (wide.is_finite() == narrow.is_finite()).then_some(narrow))
    }
}

/// Whole numbers only: `2.5` is not a valid `u32`.
///
/// `i128::MIN` is exactly representable, so `[-2^127, 2^127)` converts
/// without saturating. Range checks for the target type happen on the
/// integer, where `u64::MAX` does not round up to 2^64.
fn whole(n: f64) -> Option<i128> {
    let bound = -(i128::MIN as f64);
    (n.is_finite() && n.fract() == 0.0 && n >= -bound && n < bound).then(|| n as i128)
}

macro_rules! impl_integer_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn to_view(&self) -> ViewValue {
                    ViewValue::Number(*self as f64)
                }

                fn from_view(value: ViewValue) -> Option<Self> {
                    match value {
                        ViewValue::Number(n) => {
                            whole(n).and_then(|n| <$ty>::try_from(n).ok())
                        }
                        ViewValue::Text(t) => t.trim().parse().ok(),
                        ViewValue::Empty | ViewValue::Bool(_) => None,
                    }
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<V: FieldValue> FieldValue for Option<V> {
    fn to_view(&self) -> ViewValue {
        self.as_ref().map_or(ViewValue::Empty, V::to_view)
    }

    fn from_view(value: ViewValue) -> Option<Self> {
        match value {
            ViewValue::Empty => Some(None),
            other => V::from_view(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(ViewValue::Number(3.0).to_text(), "3");
        assert_eq!(ViewValue::Number(2.5).to_text(), "2.5");
        assert_eq!(ViewValue::Empty.to_text(), "");
    }

    #[test]
    fn integers_reject_fractions_and_overflow() {
        assert_eq!(u32::from_view(ViewValue::Number(3.0)), Some(3));
        assert_eq!(u32::from_view(ViewValue::Number(3.5)), None);
        assert_eq!(u32::from_view(ViewValue::Number(-1.0)), None);
        assert_eq!(u8::from_view(ViewValue::Number(300.0)), None);
        assert_eq!(i64::from_view(ViewValue::Number(f64::NAN)), None);
        assert_eq!(i32::from_view(ViewValue::Text(" 12 ".into())), Some(12));
    }

    #[test]
    fn wide_integers_reject_values_one_past_the_end() {
        let two_pow_64 = 18_446_744_073_709_551_616.0;
        let two_pow_63 = 9_223_372_036_854_775_808.0;
        assert_eq!(u64::from_view(ViewValue::Number(two_pow_64)), None);
        assert_eq!(usize::from_view(ViewValue::Number(two_pow_64)), None);
        assert_eq!(i64::from_view(ViewValue::Number(two_pow_63)), None);
        assert_eq!(i64::from_view(ViewValue::Number(-two_pow_63)), Some(i64::MIN));
        assert_eq!(u64::from_view(ViewValue::Number(two_pow_63)), Some(1 << 63));
        assert_eq!(u64::from_view(ViewValue::Number(1e300)), None);
    }

    #[test]
    fn f32_rejects_values_past_its_range() {
        assert_eq!(f32::from_view(ViewValue::Number(1e39)), None);
        assert_eq!(f32::from_view(ViewValue::Number(-1e39)), None);
        assert_eq!(f32::from_view(ViewValue::Number(2.5)), Some(2.5));
        assert_eq!(f32::from_view(ViewValue::Number(f64::from(f32::MAX))), Some(f32::MAX));
    }

    #[test]
    fn booleans_accept_flag_and_text() {
        assert_eq!(bool::from_view(ViewValue::Bool(true)), Some(true));
        assert_eq!(bool::from_view(ViewValue::Text("false".into())), Some(false));
        assert_eq!(bool::from_view(ViewValue::Number(1.0)), None);
    }

    #[test]
    fn strings_accept_anything() {
        assert_eq!(String::from_view(ViewValue::Number(4.0)), Some("4".into()));
        assert_eq!(String::from_view(ViewValue::Empty), Some(String::new()));
    }

    #[test]
    fn optional_fields_map_empty_to_none() {
        assert_eq!(Option::<u32>::from_view(ViewValue::Empty), Some(None));
        assert_eq!(Option::<u32>::from_view(ViewValue::Number(7.0)), Some(Some(7)));
        assert_eq!(Option::<u32>::from_view(ViewValue::Number(0.5)), None);
        assert_eq!(None::<u32>.to_view(), ViewValue::Empty);
        assert_eq!(u32::from_view(ViewValue::Empty), None);
    }
}
