//! Runtime value model the engine walks.
//!
//! Every input is lowered into a [`Value`] before validation. The walker only
//! ever switches on this closed set of shapes, so scalar, struct, sequence and
//! map handling lives in one place instead of behind open-ended type checks.
//!
//! Struct values carry their fields in declaration order together with the
//! rule string attached to each field (see [`FieldValue::with_rules`]).

use std::any::TypeId;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

// ============================================================================
// KIND
// ============================================================================

/// The shape of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Absent value (`None`, null).
    Nil,
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    Uint,
    /// Floating point number.
    Float,
    /// UTF-8 string.
    Str,
    /// Ordered sequence.
    Seq,
    /// Associative container.
    Map,
    /// Struct with named fields.
    Struct,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Str => "string",
            Kind::Seq => "sequence",
            Kind::Map => "map",
            Kind::Struct => "struct",
        };
        f.write_str(name)
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// A lowered runtime value.
///
/// Map entries are kept in a stable order: ordered containers keep their own
/// order, hash-based containers are sorted by key (see [`Value::map_sorted`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// Ordered sequence.
    Seq(Vec<Value>),
    /// Key/value entries.
    Map(Vec<(Value, Value)>),
    /// Struct with named fields.
    Struct(StructValue),
}

impl Value {
    /// Builds a map value from entries with no natural order, sorting by key.
    pub fn map_sorted(mut entries: Vec<(Value, Value)>) -> Self {
        entries.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        Value::Map(entries)
    }

    /// Returns the shape of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Seq(_) => Kind::Seq,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
        }
    }

    /// Returns `true` for [`Value::Nil`].
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns `true` if this is the zero value of its kind.
    ///
    /// Zero means: nil, `false`, `0`, the empty string, an empty collection, or
    /// a struct whose fields are all zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Uint(u) => *u == 0,
            Value::Float(f) => *f == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            Value::Struct(s) => s.is_zero(),
        }
    }

    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the struct, if this is a struct.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value as `f64` for numeric kinds.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the length used by size rules.
    ///
    /// Strings count Unicode scalar values; sequences and maps count entries.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Seq(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Resolves a dotted path such as `Address.Street` or `Items[0].Name`.
    ///
    /// Field segments match either the display name or the struct field
    /// name. Bracket segments index sequences by position and maps by the
    /// key's display form. An empty path resolves to `self`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        let mut rest = path;
        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix('[') {
                // Keys may contain `.`, so brackets are consumed whole.
                let end = stripped.find(']')?;
                let index = &stripped[..end];
                current = match current {
                    Value::Seq(items) => items.get(index.parse::<usize>().ok()?)?,
                    Value::Map(entries) => entries
                        .iter()
                        .find(|(k, _)| k.to_string() == index)
                        .map(|(_, v)| v)?,
                    _ => return None,
                };
                rest = &stripped[end + 1..];
            } else {
                let segment = rest.strip_prefix('.').unwrap_or(rest);
                let end = segment.find(['.', '[']).unwrap_or(segment.len());
                let (name, tail) = segment.split_at(end);
                if name.is_empty() {
                    return None;
                }
                current = current.as_struct()?.get(name)?;
                rest = tail;
            }
        }
        Some(current)
    }

    /// Total order used to sort map keys deterministically.
    ///
    /// Values of different kinds order by kind; floats use IEEE total order.
    #[must_use]
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Seq(a), Value::Seq(b)) => cmp_iter(a.iter(), b.iter(), Value::total_cmp),
            (Value::Map(a), Value::Map(b)) => cmp_iter(a.iter(), b.iter(), |(ka, va), (kb, vb)| {
                ka.total_cmp(kb).then_with(|| va.total_cmp(vb))
            }),
            (Value::Struct(a), Value::Struct(b)) => a
                .type_name
                .cmp(b.type_name)
                .then_with(|| {
                    cmp_iter(a.fields.iter(), b.fields.iter(), |x, y| x.value.total_cmp(&y.value))
                }),
            (a, b) => a.kind().cmp(&b.kind()),
        }
    }
}

fn cmp_iter<'a, T: 'a>(
    mut a: impl Iterator<Item = &'a T>,
    mut b: impl Iterator<Item = &'a T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match cmp(x, y) {
                Ordering::Equal => {}
                other => return other,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("]")
            }
            Value::Struct(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&k.to_string(), v)?;
                }
                map.end()
            }
            Value::Struct(s) => s.serialize(serializer),
        }
    }
}

// ============================================================================
// STRUCT VALUE
// ============================================================================

/// A struct lowered into named fields.
///
/// The `type_id` identifies the originating Rust type so struct-level hooks
/// can be looked up; it is `None` for structs built without a `'static` type.
#[derive(Debug, Clone)]
pub struct StructValue {
    type_id: Option<TypeId>,
    type_name: &'static str,
    fields: Vec<FieldValue>,
}

impl StructValue {
    /// Creates an empty struct value tagged with the runtime type `T`.
    pub fn new<T: ?Sized + 'static>(type_name: &'static str) -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            type_name,
            fields: Vec::new(),
        }
    }

    /// Creates an empty struct value without a runtime type.
    ///
    /// Struct-level hooks never run for anonymous structs.
    pub fn anonymous(type_name: &'static str) -> Self {
        Self {
            type_id: None,
            type_name,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: FieldValue) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a field in place.
    pub fn push(&mut self, field: FieldValue) {
        self.fields.push(field);
    }

    /// Runtime type of the originating struct.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Name of the originating struct, used as the namespace root.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Finds a field by display name or struct field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.struct_name == name))
    }

    /// Returns a field's value by display name or struct field name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.field(name).map(FieldValue::value)
    }

    /// Returns `true` if every field holds its zero value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_zero())
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && self.type_name == other.type_name
            && self.fields == other.fields
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.type_name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", field.name, field.value)?;
        }
        f.write_str("}")
    }
}

impl Serialize for StructValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name.as_ref(), &field.value)?;
        }
        map.end()
    }
}

// ============================================================================
// FIELD VALUE
// ============================================================================

/// One field of a [`StructValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    name: Cow<'static, str>,
    struct_name: Cow<'static, str>,
    rules: Option<Cow<'static, str>>,
    value: Value,
}

impl FieldValue {
    /// Creates a field with no rules; the display name equals the struct field name.
    pub fn new(struct_name: impl Into<Cow<'static, str>>, value: Value) -> Self {
        let struct_name = struct_name.into();
        Self {
            name: struct_name.clone(),
            struct_name,
            rules: None,
            value,
        }
    }

    /// Attaches a rule string, e.g. `"required,min=3"`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rules(mut self, rules: impl Into<Cow<'static, str>>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Overrides the name reported in failure namespaces.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_display_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Struct field name.
    #[must_use]
    pub fn struct_name(&self) -> &str {
        &self.struct_name
    }

    /// Attached rule string, if any.
    #[must_use]
    pub fn rules(&self) -> Option<&str> {
        self.rules.as_deref()
    }

    /// The field's value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}
