//! # Constructs and Schemas
//!
//! A [`RecordType`] is the "construct": a diagnostic label plus an ordered,
//! name-unique attribute schema. The schema is the single source of truth
//! for what a record of this construct holds and in which order.
//!
//! ## Declaration
//!
//! Attributes are declared with [`RecordType::declare`] (plain names,
//! defaulting to `Null`) and [`RecordType::declare_with`] (names paired
//! with an [`AttrDefault`]). Declarations append; nothing is ever removed
//! or renamed. A name that is invalid or already visible — own or
//! inherited — fails the whole call and leaves the schema untouched.
//!
//! ## Derivation
//!
//! [`RecordType::derive`] seeds a new construct with an independent copy of
//! the schema *as it stands at that moment*. Later declarations on parent
//! or child stay local to each side. Inherited names keep the parent's
//! order and always precede the child's own declarations.
//!
//! ## Defaults
//!
//! A default is either a plain [`Value`] — owned by the schema and cloned
//! into every instance that does not override it, so no two instances can
//! ever observe shared mutable state — or a nested construct, instantiated
//! recursively at construction time (see [`RecordType::create`]).
//!
//! ## Concurrency
//!
//! Declarations are serialized through an internal `RwLock`; construction
//! takes the read side. Records themselves are deeply immutable and
//! freely shareable.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{RekordError, Result};
use crate::mapping::Mapping;
use crate::name::Name;
use crate::record::Record;
use crate::value::Value;

/// The declared fallback for an attribute.
#[derive(Debug, Clone)]
pub enum AttrDefault {
    /// A plain value, cloned into each instance that does not override it.
    Value(Value),
    /// A nested construct, instantiated recursively at construction time.
    Nested(RecordType),
}

impl AttrDefault {
    pub fn value(value: impl Into<Value>) -> Self {
        AttrDefault::Value(value.into())
    }

    pub fn nested(ty: &RecordType) -> Self {
        AttrDefault::Nested(ty.clone())
    }
}

#[derive(Clone)]
struct Entry {
    name: Name,
    default: AttrDefault,
}

/// Immutable snapshot of a schema's name set: ordered names plus the
/// name -> slot table behind keyed access. Shared between the schema and
/// every record built from it.
#[derive(Debug)]
pub(crate) struct Shape {
    pub(crate) names: Box<[Name]>,
    slots: HashMap<Name, usize>,
}

impl Shape {
    fn empty() -> Self {
        Shape {
            names: Box::from([]),
            slots: HashMap::new(),
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

struct SchemaData {
    entries: Vec<Entry>,
    shape: Arc<Shape>,
}

impl SchemaData {
    fn rebuild_shape(&mut self) {
        let names: Box<[Name]> = self.entries.iter().map(|e| e.name.clone()).collect();
        let slots = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, e)| (e.name.clone(), slot))
            .collect();
        self.shape = Arc::new(Shape { names, slots });
    }
}

struct Inner {
    label: String,
    schema: RwLock<SchemaData>,
}

/// A record construct: a label plus an ordered attribute schema.
///
/// Cloning a `RecordType` clones a handle to the same construct; identity
/// (used by strict record equality) is the construct allocation, not the
/// label.
#[derive(Clone)]
pub struct RecordType {
    inner: Arc<Inner>,
}

impl RecordType {
    /// A fresh construct with an empty schema. The label only shows up in
    /// diagnostics; it carries no identity.
    pub fn new(label: impl Into<String>) -> Self {
        RecordType {
            inner: Arc::new(Inner {
                label: label.into(),
                schema: RwLock::new(SchemaData {
                    entries: Vec::new(),
                    shape: Arc::new(Shape::empty()),
                }),
            }),
        }
    }

    /// Start a [`Builder`] for a brand-new construct.
    pub fn builder(label: impl Into<String>) -> Builder {
        Builder::new(label)
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// A new construct seeded with an independent copy of this schema as it
    /// stands right now. Later declarations on either construct stay local.
    pub fn derive(&self, label: impl Into<String>) -> RecordType {
        let data = self.read();
        let entries = data.entries.clone();
        let shape = Arc::clone(&data.shape);
        drop(data);
        RecordType {
            inner: Arc::new(Inner {
                label: label.into(),
                schema: RwLock::new(SchemaData { entries, shape }),
            }),
        }
    }

    /// Declare plain attributes, in order, defaulting to `Null`.
    ///
    /// Returns the declared names in call order. Fails with
    /// [`RekordError::InvalidName`] or [`RekordError::DuplicateAttribute`]
    /// without declaring anything.
    pub fn declare<I, S>(&self, names: I) -> Result<Vec<Name>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch: Vec<(S, AttrDefault)> = names
            .into_iter()
            .map(|name| (name, AttrDefault::Value(Value::Null)))
            .collect();
        self.extend_schema(batch)
    }

    /// Declare defaulted attributes, in order.
    ///
    /// Same failure and return contract as [`declare`](Self::declare).
    pub fn declare_with<I, S>(&self, defaults: I) -> Result<Vec<Name>>
    where
        I: IntoIterator<Item = (S, AttrDefault)>,
        S: AsRef<str>,
    {
        self.extend_schema(defaults.into_iter().collect())
    }

    fn extend_schema<S: AsRef<str>>(&self, batch: Vec<(S, AttrDefault)>) -> Result<Vec<Name>> {
        let mut data = self.write();
        // Validate the whole batch before touching the schema: a failing
        // call declares nothing.
        let mut fresh: Vec<Name> = Vec::with_capacity(batch.len());
        for (spelling, _) in &batch {
            let name = Name::new(spelling.as_ref())?;
            if data.shape.contains(name.as_str()) || fresh.contains(&name) {
                return Err(RekordError::DuplicateAttribute(name.as_str().to_string()));
            }
            fresh.push(name);
        }
        for ((_, default), name) in batch.into_iter().zip(&fresh) {
            data.entries.push(Entry {
                name: name.clone(),
                default,
            });
        }
        data.rebuild_shape();
        Ok(fresh)
    }

    /// Current full name list, inherited then own, in schema order.
    pub fn members(&self) -> Vec<Name> {
        self.read().shape.names.to_vec()
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.read().shape.contains(name)
    }

    pub fn len(&self) -> usize {
        self.read().shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a record from partial input.
    ///
    /// Infallible by design: unknown keys are dropped, missing names fall
    /// back to their declared defaults, and nested constructs are always
    /// materialized — from the sub-mapping at their key when one is
    /// supplied, from an already-built record verbatim, or from empty
    /// input otherwise.
    pub fn create(&self, input: &Mapping) -> Record {
        let data = self.read();
        let values: Vec<Value> = data
            .entries
            .iter()
            .map(|entry| resolve(entry, input))
            .collect();
        Record::assemble(self.clone(), Arc::clone(&data.shape), values)
    }

    /// Build a record entirely from defaults.
    pub fn create_empty(&self) -> Record {
        self.create(&Mapping::new())
    }

    pub(crate) fn same_construct(a: &RecordType, b: &RecordType) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn ident(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn read(&self) -> RwLockReadGuard<'_, SchemaData> {
        self.inner.schema.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SchemaData> {
        self.inner.schema.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn resolve(entry: &Entry, input: &Mapping) -> Value {
    match &entry.default {
        AttrDefault::Nested(ty) => match input.get(entry.name.as_str()) {
            Some(Value::Map(sub)) => Value::Record(ty.create(sub)),
            Some(Value::Record(built)) => Value::Record(built.clone()),
            _ => Value::Record(ty.create_empty()),
        },
        AttrDefault::Value(default) => match input.get(entry.name.as_str()) {
            // Supplied values are taken as-is; only the stored default is
            // the schema's to copy.
            Some(supplied) => supplied.clone(),
            None => default.clone(),
        },
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("label", &self.label())
            .field("members", &self.members())
            .finish()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.label())?;
        for (i, name) in self.members().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name.as_str())?;
        }
        f.write_str(")")
    }
}

/// Factory for brand-new constructs, optionally seeded from a base.
///
/// Plain fields are declared first, defaulted fields after, matching call
/// order within each group:
///
/// ```
/// use rekord::{build, Value};
///
/// let address = build("Address")
///     .field("city")
///     .field("zip")
///     .build()
///     .unwrap();
/// let person = build("Person")
///     .field("name")
///     .default_value("role", "guest")
///     .nested("address", &address)
///     .build()
///     .unwrap();
///
/// let record = person.create_empty();
/// assert_eq!(record.get("role").unwrap(), &Value::from("guest"));
/// ```
pub struct Builder {
    label: String,
    base: Option<RecordType>,
    plain: Vec<String>,
    defaults: Vec<(String, AttrDefault)>,
}

impl Builder {
    fn new(label: impl Into<String>) -> Self {
        Builder {
            label: label.into(),
            base: None,
            plain: Vec::new(),
            defaults: Vec::new(),
        }
    }

    /// Seed the new construct from `ty`'s schema (derivation).
    pub fn base(mut self, ty: &RecordType) -> Self {
        self.base = Some(ty.clone());
        self
    }

    /// Add a plain attribute (default `Null`).
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.plain.push(name.into());
        self
    }

    /// Add an attribute with a plain default value.
    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults
            .push((name.into(), AttrDefault::Value(value.into())));
        self
    }

    /// Add an attribute whose default is a nested construct.
    pub fn nested(mut self, name: impl Into<String>, ty: &RecordType) -> Self {
        self.defaults.push((name.into(), AttrDefault::nested(ty)));
        self
    }

    pub fn build(self) -> Result<RecordType> {
        let Builder {
            label,
            base,
            plain,
            defaults,
        } = self;
        let ty = match base {
            Some(parent) => parent.derive(label),
            None => RecordType::new(label),
        };
        ty.declare(&plain)?;
        ty.declare_with(defaults)?;
        Ok(ty)
    }
}

/// Free-function spelling of [`RecordType::builder`].
pub fn build(label: impl Into<String>) -> Builder {
    Builder::new(label)
}
