//! # Records
//!
//! A [`Record`] is an immutable value object resolved from a construct's
//! schema plus partial input. It holds a handle to its [`RecordType`], a
//! snapshot of the schema's shape taken at construction time, and the
//! resolved values in schema order. Late declarations on the construct
//! never reach an existing record: its snapshot is fixed.
//!
//! ## Access
//!
//! Records are dual-natured:
//! - **map-like**: `get("name")`, `pairs()`, `to_mapping()`
//! - **array-like**: `get(-1)`, `values()`, `values_at([...])`
//!
//! Positional keys are zero-based with negative wraparound (`-1` is the
//! last attribute). Misses fail with typed errors
//! ([`UnknownAttribute`](crate::RekordError::UnknownAttribute) /
//! [`OutOfRange`](crate::RekordError::OutOfRange)); callers may catch and
//! fall back.
//!
//! ## Decomposition
//!
//! `values()` exposes the ordered values for positional destructuring
//! (slice patterns), `to_mapping()` the keyed form. Both are plain methods
//! a `match` arm can call.
//!
//! ## Equality
//!
//! Two notions, on purpose:
//! - [`matches`](Record::matches) — duck-typed and one-directional: every
//!   attribute of this record must be readable on the other object (via
//!   [`FieldReadable`]) with an equal value. Extra fields on the other
//!   side never fail the comparison.
//! - `==` — strict: same construct (identity, not label), same attribute
//!   snapshot, equal values. `Hash` agrees with `==`.
//!
//! ## Update
//!
//! [`update`](Record::update) never mutates: it feeds the current values
//! plus the overrides back through full construction on the same
//! construct and returns the brand-new record.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{RekordError, Result};
use crate::mapping::Mapping;
use crate::name::Name;
use crate::schema::{RecordType, Shape};
use crate::value::Value;

/// An immutable record: resolved values bound to a schema snapshot.
///
/// Cloning is cheap; the snapshot and the value storage are shared and
/// never mutable.
#[derive(Clone)]
pub struct Record {
    ty: RecordType,
    shape: Arc<Shape>,
    values: Arc<[Value]>,
}

/// Capability to read a named field, the duck-typed surface behind
/// [`Record::matches`]. Implemented for records, mappings, and the std
/// maps, so structural comparison works against plain collections too.
pub trait FieldReadable {
    /// The value for `name`, if this object exposes one.
    fn try_get(&self, name: &str) -> Option<Value>;
}

/// One step of a [`Record::dig`] path: a field name or a signed position.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Field(String),
    Index(isize),
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Field(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Field(name)
    }
}

impl From<isize> for Selector {
    fn from(index: isize) -> Self {
        Selector::Index(index)
    }
}

impl From<i32> for Selector {
    fn from(index: i32) -> Self {
        Selector::Index(index as isize)
    }
}

/// Keys accepted by [`Record::get`]: attribute names (`&str`, `&Name`) or
/// signed positions (`isize`) with negative wraparound. Mirrors the
/// `Index`-trait pattern `serde_json` uses for its `Value`.
pub trait RecordKey {
    /// Resolve this key to a slot in the record's schema order.
    fn slot(&self, record: &Record) -> Result<usize>;
}

impl RecordKey for &str {
    fn slot(&self, record: &Record) -> Result<usize> {
        record
            .shape
            .slot(self)
            .ok_or_else(|| RekordError::UnknownAttribute((*self).to_string()))
    }
}

impl RecordKey for &Name {
    fn slot(&self, record: &Record) -> Result<usize> {
        self.as_str().slot(record)
    }
}

impl RecordKey for isize {
    fn slot(&self, record: &Record) -> Result<usize> {
        wrap_index(*self, record.len()).ok_or(RekordError::OutOfRange {
            index: *self,
            len: record.len(),
        })
    }
}

fn wrap_index(index: isize, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        index.checked_add(isize::try_from(len).ok()?)?
    } else {
        index
    };
    usize::try_from(resolved).ok().filter(|&slot| slot < len)
}

impl Record {
    pub(crate) fn assemble(ty: RecordType, shape: Arc<Shape>, values: Vec<Value>) -> Self {
        Record {
            ty,
            shape,
            values: values.into(),
        }
    }

    /// The construct this record was built from.
    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attribute names in schema order, as captured at construction.
    pub fn members(&self) -> &[Name] {
        &self.shape.names
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.shape.contains(name)
    }

    /// Resolved values in schema order. Also the positional-decomposition
    /// surface: slice patterns destructure a record positionally.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Keyed or positional access.
    ///
    /// Names miss with [`RekordError::UnknownAttribute`]; positions miss
    /// with [`RekordError::OutOfRange`]. Negative positions wrap from the
    /// end (`-1` is the last attribute).
    pub fn get<K: RecordKey>(&self, key: K) -> Result<&Value> {
        let slot = key.slot(self)?;
        Ok(&self.values[slot])
    }

    /// Positional multi-select with [`get`](Self::get)'s indexing rules.
    pub fn values_at<I>(&self, indices: I) -> Result<Vec<&Value>>
    where
        I: IntoIterator<Item = isize>,
    {
        indices.into_iter().map(|index| self.get(index)).collect()
    }

    /// Walk a path into nested values.
    ///
    /// The first segment selects exactly as [`get`](Self::get) — including
    /// its typed failures. Deeper segments traverse nested records (again
    /// with `get` semantics), mappings (by name), and lists (by signed
    /// position); a missing key deeper in the path or a non-traversable
    /// value yields `Ok(None)`.
    pub fn dig<P, S>(&self, path: P) -> Result<Option<&Value>>
    where
        P: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        let segments: Vec<Selector> = path.into_iter().map(Into::into).collect();
        self.dig_path(&segments)
    }

    fn dig_path(&self, path: &[Selector]) -> Result<Option<&Value>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(None);
        };
        let value = match first {
            Selector::Field(name) => self.get(name.as_str())?,
            Selector::Index(index) => self.get(*index)?,
        };
        dig_value(value, rest)
    }

    /// Lazy, restartable iteration over values in schema order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Lazy, restartable iteration over `(name, value)` pairs in schema
    /// order.
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs {
            names: self.shape.names.iter(),
            values: self.values.iter(),
        }
    }

    /// Name -> value view in schema order. Nested records are expanded
    /// recursively to their own mapping form.
    pub fn to_mapping(&self) -> Mapping {
        self.pairs()
            .map(|(name, value)| (name.as_str(), expand(value)))
            .collect()
    }

    /// Like [`to_mapping`](Self::to_mapping), but omits `Null` values and
    /// nested sub-mappings that come out empty after compacting.
    pub fn to_mapping_compact(&self) -> Mapping {
        let mut out = Mapping::new();
        for (name, value) in self.pairs() {
            match value {
                Value::Null => {}
                Value::Record(nested) => {
                    let sub = nested.to_mapping_compact();
                    if !sub.is_empty() {
                        out.insert(name.as_str(), Value::Map(sub));
                    }
                }
                other => out.insert(name.as_str(), other.clone()),
            }
        }
        out
    }

    /// Build a mapping by transforming every pair in schema order. Later
    /// duplicate keys produced by the transform overwrite earlier ones.
    pub fn to_mapping_by<F>(&self, mut transform: F) -> Mapping
    where
        F: FnMut(&Name, &Value) -> (String, Value),
    {
        let mut out = Mapping::new();
        for (name, value) in self.pairs() {
            let (key, value) = transform(name, value);
            out.insert(key, value);
        }
        out
    }

    /// Duck-typed, one-directional structural equality: every attribute of
    /// this record must be readable on `other` with an equal value. Extra
    /// fields on `other` are ignored.
    pub fn matches<O: FieldReadable + ?Sized>(&self, other: &O) -> bool {
        self.pairs()
            .all(|(name, value)| other.try_get(name.as_str()).as_ref() == Some(value))
    }

    /// Non-destructive update: a brand-new record of the same construct,
    /// overrides winning by name, every other value carried over. The
    /// receiver is untouched.
    pub fn update(&self, overrides: &Mapping) -> Record {
        let mut input = Mapping::new();
        for (name, value) in self.pairs() {
            input.insert(name.as_str(), value.clone());
        }
        for (key, value) in overrides.iter() {
            input.insert(key, value.clone());
        }
        self.ty.create(&input)
    }
}

fn expand(value: &Value) -> Value {
    match value {
        Value::Record(nested) => Value::Map(nested.to_mapping()),
        other => other.clone(),
    }
}

fn dig_value<'a>(value: &'a Value, path: &[Selector]) -> Result<Option<&'a Value>> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(Some(value));
    };
    match value {
        Value::Record(nested) => nested.dig_path(path),
        Value::Map(map) => match first {
            Selector::Field(name) => match map.get(name) {
                Some(next) => dig_value(next, rest),
                None => Ok(None),
            },
            Selector::Index(_) => Ok(None),
        },
        Value::List(items) => match first {
            Selector::Index(index) => match wrap_index(*index, items.len()) {
                Some(slot) => dig_value(&items[slot], rest),
                None => Ok(None),
            },
            Selector::Field(_) => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Iterator over a record's `(name, value)` pairs in schema order.
pub struct Pairs<'a> {
    names: std::slice::Iter<'a, Name>,
    values: std::slice::Iter<'a, Value>,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a Name, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.names.next()?, self.values.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl ExactSizeIterator for Pairs<'_> {}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FieldReadable for Record {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.shape.slot(name).map(|slot| self.values[slot].clone())
    }
}

impl FieldReadable for Mapping {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl FieldReadable for HashMap<String, Value> {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl FieldReadable for BTreeMap<String, Value> {
    fn try_get(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

// Strict equality: same construct (identity, not label), same snapshot,
// equal values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        RecordType::same_construct(&self.ty, &other.ty)
            && (Arc::ptr_eq(&self.shape, &other.shape) || self.shape.names == other.shape.names)
            && self.values == other.values
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.ident().hash(state);
        for value in self.values.iter() {
            value.hash(state);
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}", self.ty.label())?;
        for (name, value) in self.pairs() {
            write!(f, " {}={}", name, value)?;
        }
        f.write_str(">")
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.ty.label());
        for (name, value) in self.pairs() {
            out.field(name.as_str(), value);
        }
        out.finish()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.pairs() {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;
    use crate::schema::build;

    fn point() -> Record {
        let ty = build("Point")
            .field("x")
            .field("y")
            .default_value("z", 0)
            .build()
            .unwrap();
        ty.create(&mapping! { "x" => 1, "y" => 2 })
    }

    #[test]
    fn get_by_name_and_position_agree_with_values() {
        let record = point();
        let ordered = record.values();
        assert_eq!(record.get("x").unwrap(), &ordered[0]);
        assert_eq!(record.get(0).unwrap(), &ordered[0]);
        assert_eq!(record.get(2).unwrap(), &ordered[2]);
        assert_eq!(record.get(-1).unwrap(), &ordered[2]);
        assert_eq!(record.get(-3).unwrap(), &ordered[0]);
    }

    #[test]
    fn get_misses_are_typed() {
        let record = point();
        assert_eq!(
            record.get("w"),
            Err(RekordError::UnknownAttribute("w".into()))
        );
        assert_eq!(
            record.get(3),
            Err(RekordError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            record.get(-4),
            Err(RekordError::OutOfRange { index: -4, len: 3 })
        );
    }

    #[test]
    fn values_at_multi_selects() {
        let record = point();
        let picked = record.values_at([0, -1]).unwrap();
        assert_eq!(picked, [&Value::Int(1), &Value::Int(0)]);
        assert!(record.values_at([0, 9]).is_err());
    }

    #[test]
    fn iteration_follows_schema_order() {
        let record = point();
        let names: Vec<&str> = record.pairs().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["x", "y", "z"]);
        let values: Vec<&Value> = record.iter().collect();
        assert_eq!(values, [&Value::Int(1), &Value::Int(2), &Value::Int(0)]);
        // Restartable.
        assert_eq!(record.iter().count(), 3);
        assert_eq!(record.pairs().len(), 3);
    }

    #[test]
    fn positional_decomposition_via_slice_patterns() {
        let record = point();
        let [x, y, z] = record.values() else {
            panic!("expected three values");
        };
        assert_eq!((x, y, z), (&Value::Int(1), &Value::Int(2), &Value::Int(0)));
    }

    #[test]
    fn to_mapping_expands_nested_records() {
        let address = build("Address").field("city").build().unwrap();
        let person = build("Person")
            .field("name")
            .nested("address", &address)
            .build()
            .unwrap();
        let record = person.create(&mapping! {
            "name" => "John",
            "address" => mapping! { "city" => "Anytown" },
        });

        let view = record.to_mapping();
        assert_eq!(view.get("name"), Some(&Value::from("John")));
        let sub = view.get("address").and_then(Value::as_map).unwrap();
        assert_eq!(sub.get("city"), Some(&Value::from("Anytown")));
    }

    #[test]
    fn to_mapping_by_transforms_and_overwrites() {
        let record = point();
        let upper = record.to_mapping_by(|name, value| {
            (name.as_str().to_uppercase(), value.clone())
        });
        let keys: Vec<&str> = upper.keys().collect();
        assert_eq!(keys, ["X", "Y", "Z"]);

        // Colliding output keys: the later pair wins.
        let collapsed = record.to_mapping_by(|_, value| ("all".to_string(), value.clone()));
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed.get("all"), Some(&Value::Int(0)));
    }

    #[test]
    fn matches_is_duck_typed_and_one_directional() {
        let record = point();

        let mut by_hand: HashMap<String, Value> = HashMap::new();
        by_hand.insert("x".into(), Value::Int(1));
        by_hand.insert("y".into(), Value::Int(2));
        by_hand.insert("z".into(), Value::Int(0));
        by_hand.insert("extra".into(), Value::from("ignored"));
        assert!(record.matches(&by_hand));

        by_hand.insert("y".into(), Value::Int(99));
        assert!(!record.matches(&by_hand));
        by_hand.remove("y");
        assert!(!record.matches(&by_hand));
    }

    #[test]
    fn matches_is_reflexive() {
        let record = point();
        assert!(record.matches(&record));
    }

    #[test]
    fn strict_equality_requires_same_construct() {
        let a = build("T").field("x").build().unwrap();
        let b = build("T").field("x").build().unwrap();
        let from_a = a.create(&mapping! { "x" => 1 });
        let from_a_again = a.create(&mapping! { "x" => 1 });
        let from_b = b.create(&mapping! { "x" => 1 });

        assert_eq!(from_a, from_a_again);
        assert_ne!(from_a, from_b);
        // Still structurally alike.
        assert!(from_a.matches(&from_b));
    }

    #[test]
    fn equal_records_hash_equally() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(record: &Record) -> u64 {
            let mut hasher = DefaultHasher::new();
            record.hash(&mut hasher);
            hasher.finish()
        }

        let ty = build("T").field("x").build().unwrap();
        let one = ty.create(&mapping! { "x" => 1 });
        let two = ty.create(&mapping! { "x" => 1 });
        assert_eq!(one, two);
        assert_eq!(hash_of(&one), hash_of(&two));
    }

    #[test]
    fn update_returns_fresh_record_and_keeps_receiver() {
        let record = point();
        let before = record.to_mapping();

        let updated = record.update(&mapping! { "y" => 20 });
        assert_eq!(updated.get("x").unwrap(), &Value::Int(1));
        assert_eq!(updated.get("y").unwrap(), &Value::Int(20));
        assert_eq!(record.to_mapping(), before);
    }

    #[test]
    fn update_ignores_unknown_keys_and_stores_explicit_null() {
        let record = point();
        let updated = record.update(&mapping! {
            "nope" => "dropped",
            "z" => Value::Null,
        });
        assert_eq!(updated.len(), 3);
        assert_eq!(updated.get("z").unwrap(), &Value::Null);
    }

    #[test]
    fn display_lists_names_and_values() {
        let record = point();
        assert_eq!(record.to_string(), "#<Point x=1 y=2 z=0>");
    }

    #[test]
    fn serializes_as_json_object_in_schema_order() {
        let record = point();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"x":1,"y":2,"z":0}"#
        );
    }

    #[test]
    fn late_declarations_do_not_reach_existing_records() {
        let ty = build("T").field("a").build().unwrap();
        let record = ty.create(&mapping! { "a" => 1 });
        ty.declare(["b"]).unwrap();

        assert_eq!(record.len(), 1);
        assert!(!record.is_member("b"));
        assert!(record.get("b").is_err());
        // New records see the full schema.
        assert_eq!(ty.create_empty().len(), 2);
    }

    #[test]
    fn dig_walks_records_mappings_and_lists() {
        let address = build("Address").field("city").field("lines").build().unwrap();
        let person = build("Person")
            .field("name")
            .nested("address", &address)
            .build()
            .unwrap();
        let record = person.create(&mapping! {
            "name" => "John",
            "address" => mapping! {
                "city" => "Anytown",
                "lines" => vec![Value::from("123 Main St"), Value::from("Apt 4")],
            },
        });

        assert_eq!(
            record.dig(["address", "city"]).unwrap(),
            Some(&Value::from("Anytown"))
        );
        assert_eq!(
            record
                .dig([Selector::from("address"), Selector::from("lines"), Selector::from(-1)])
                .unwrap(),
            Some(&Value::from("Apt 4"))
        );
        // Non-traversable mid-value.
        assert_eq!(record.dig(["name", "city"]).unwrap(), None);
        // Deep miss inside a list.
        assert_eq!(
            record
                .dig([Selector::from("address"), Selector::from("lines"), Selector::from(9)])
                .unwrap(),
            None
        );
        // First segment misses exactly as `get`.
        assert!(record.dig(["nope"]).is_err());
        // A nested record's bad name is a typed failure too.
        assert!(record.dig(["address", "nope"]).is_err());
    }

    #[test]
    fn dig_first_segment_may_be_positional() {
        let record = point();
        assert_eq!(record.dig([-1]).unwrap(), Some(&Value::Int(0)));
        assert!(record.dig([9]).is_err());
    }
}
