//! # Value Model
//!
//! [`Value`] is the runtime representation of everything a record can hold.
//! It is a closed enum: scalars (`Null`, `Bool`, `Int`, `Float`, `Str`,
//! `Time`, `Id`) and composites (`List`, `Map`, `Record`).
//!
//! ## Equality
//!
//! Values compare structurally with **no cross-variant coercion**:
//! `Int(1)` is not `Float(1.0)`, and `Bool(false)` is not `Null`. Records
//! embedded in values compare with record equality (same construct, same
//! values).
//!
//! ## Hashing
//!
//! `Hash` is implemented by hand because of the `Float` variant: floats
//! hash by bit pattern, with both zeroes normalized so `0.0` and `-0.0`
//! (which compare equal) also hash equally.
//!
//! ## Interop
//!
//! `From` conversions cover the obvious Rust primitives plus
//! `serde_json::Value`, so JSON-shaped data can feed record construction
//! directly. The hand-written `Serialize` impl renders values back out in
//! the same JSON shape (`Time` as RFC 3339, `Id` as the hyphenated form,
//! records as objects in schema order).

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, Serializer};
use uuid::Uuid;

use crate::mapping::Mapping;
use crate::record::Record;

/// Runtime representation of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absence value. Plain declared names default to this.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A UTC timestamp (e.g. entity created/updated times).
    Time(DateTime<Utc>),
    /// An entity identifier.
    Id(Uuid),
    List(Vec<Value>),
    /// A raw ordered mapping, e.g. sub-input destined for a nested record.
    Map(Mapping),
    /// A fully built record.
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            // 0.0 and -0.0 compare equal, so they must hash equally.
            Value::Float(x) => {
                let bits = if *x == 0.0 { 0u64 } else { x.to_bits() };
                bits.hash(state);
            }
            Value::Str(s) => s.hash(state),
            Value::Time(t) => t.hash(state),
            Value::Id(id) => id.hash(state),
            Value::List(items) => items.hash(state),
            Value::Map(map) => map.hash(state),
            Value::Record(record) => record.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Id(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Value::Map(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Id(id) => write!(f, "{}", id),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => write!(f, "{}", map),
            Value::Record(record) => write!(f, "{}", record),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Time(t) => t.serialize(serializer),
            Value::Id(id) => id.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            Value::Record(record) => record.serialize(serializer),
        }
    }
}
