//! Lowering of Rust values into the engine's [`Value`] model.
//!
//! [`Validatable`] is the field-discovery capability the walker consumes:
//! structs expose their fields (and the rule string attached to each one)
//! through it, usually via `#[derive(Validatable)]`.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::value::Value;

// ============================================================================
// CORE TRAIT
// ============================================================================

/// Types that can be lowered into a [`Value`] for validation.
///
/// # Examples
///
/// ```rust,ignore
/// use tagrule::{FieldValue, StructValue, Validatable, Value};
///
/// struct Login {
///     name: String,
/// }
///
/// impl Validatable for Login {
///     fn to_value(&self) -> Value {
///         Value::Struct(
///             StructValue::new::<Self>("Login")
///                 .with_field(FieldValue::new("name", self.name.to_value()).with_rules("required")),
///         )
///     }
/// }
/// ```
pub trait Validatable {
    /// Lowers `self` into a [`Value`].
    fn to_value(&self) -> Value;
}

// ============================================================================
// SCALARS
// ============================================================================

macro_rules! impl_validatable_scalar {
    ($variant:ident as $target:ty: $($ty:ty),+ $(,)?) => {
        $(
            impl Validatable for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    Value::$variant(<$target>::from(*self))
                }
            }
        )+
    };
}

impl_validatable_scalar!(Int as i64: i8, i16, i32, i64);
impl_validatable_scalar!(Uint as u64: u8, u16, u32, u64);
impl_validatable_scalar!(Float as f64: f32, f64);

impl Validatable for isize {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl Validatable for usize {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Uint(*self as u64)
    }
}

impl Validatable for bool {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Validatable for char {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl Validatable for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl Validatable for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl Validatable for Cow<'_, str> {
    fn to_value(&self) -> Value {
        Value::Str(self.as_ref().to_owned())
    }
}

impl Validatable for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

// ============================================================================
// WRAPPERS
// ============================================================================

impl<T: Validatable + ?Sized> Validatable for &T {
    #[inline]
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Validatable + ?Sized> Validatable for Box<T> {
    #[inline]
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Validatable + ?Sized> Validatable for Arc<T> {
    #[inline]
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Validatable + ?Sized> Validatable for Rc<T> {
    #[inline]
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Nil, Validatable::to_value)
    }
}

// ============================================================================
// SEQUENCES
// ============================================================================

impl<T: Validatable> Validatable for [T] {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Validatable::to_value).collect())
    }
}

impl<T: Validatable, const N: usize> Validatable for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: Validatable> Validatable for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: Validatable> Validatable for VecDeque<T> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Validatable::to_value).collect())
    }
}

impl<T: Validatable> Validatable for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Validatable::to_value).collect())
    }
}

impl<T: Validatable, S: BuildHasher> Validatable for HashSet<T, S> {
    fn to_value(&self) -> Value {
        let mut items: Vec<Value> = self.iter().map(Validatable::to_value).collect();
        items.sort_by(Value::total_cmp);
        Value::Seq(items)
    }
}

// ============================================================================
// MAPS
// ============================================================================

impl<K: Validatable, V: Validatable> Validatable for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: Validatable, V: Validatable, S: BuildHasher> Validatable for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::map_sorted(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: Validatable, V: Validatable, S: BuildHasher> Validatable for indexmap::IndexMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

// ============================================================================
// JSON
// ============================================================================

impl Validatable for serde_json::Value {
    fn to_value(&self) -> Value {
        use serde_json::Value as Json;

        match self {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::Seq(items.iter().map(Validatable::to_value).collect()),
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::Str(k.clone()), v.to_value()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_lower_to_matching_kinds() {
        assert_eq!(5i32.to_value(), Value::Int(5));
        assert_eq!(5u8.to_value(), Value::Uint(5));
        assert_eq!(1.5f32.to_value(), Value::Float(1.5));
        assert_eq!("x".to_value(), Value::Str("x".into()));
        assert_eq!(true.to_value(), Value::Bool(true));
    }

    #[test]
    fn option_none_is_nil() {
        assert_eq!(None::<String>.to_value(), Value::Nil);
        assert_eq!(Some(3u32).to_value(), Value::Uint(3));
    }

    #[test]
    fn hash_map_entries_are_sorted() {
        let map: HashMap<&str, i32> = [("SMP", 2), ("SD", 1), ("SMA", 3)].into_iter().collect();
        let Value::Map(entries) = map.to_value() else {
            panic!("expected map");
        };
        let keys: Vec<String> = entries.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["SD", "SMA", "SMP"]);
    }

    #[test]
    fn json_lowering() {
        let value = json!({"name": "x", "tags": ["a", 1], "n": -2, "f": 0.5, "none": null});
        let lowered = value.to_value();
        assert_eq!(lowered.lookup("[name]"), Some(&Value::Str("x".into())));
        assert_eq!(lowered.lookup("[tags][1]"), Some(&Value::Uint(1)));
        assert_eq!(lowered.lookup("[n]"), Some(&Value::Int(-2)));
        assert_eq!(lowered.lookup("[f]"), Some(&Value::Float(0.5)));
        assert_eq!(lowered.lookup("[none]"), Some(&Value::Nil));
    }
}
