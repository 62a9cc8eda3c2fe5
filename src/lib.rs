//! # Rekord: Immutable Structured Records
//!
//! Rekord is a small library for declaring record *constructs* — fixed,
//! ordered sets of named attributes, optionally with defaults, including
//! nested records — and instantiating immutable value objects from partial
//! input.
//!
//! ## The Model
//!
//! Two pieces, the second depending on the first:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  RecordType (the construct)                          │
//! │  - ordered, name-unique attribute schema             │
//! │  - defaults: plain values or nested constructs       │
//! │  - derivation copies the schema, never shares it     │
//! └──────────────────────────────────────────────────────┘
//!                          │ create / update
//!                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │  Record (the instance)                               │
//! │  - every schema name resolved, in schema order       │
//! │  - deeply immutable, cheap to clone and share        │
//! │  - keyed AND positional access, mapping views        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! A construct's schema is built at declaration time. Every instantiation
//! reads it to decide which names exist and in what order, fills missing
//! names from defaults, and recursively materializes nested constructs.
//! No record ever mutates the schema or another record; "changing" a
//! record means [`Record::update`], which builds a new one.
//!
//! ## Quick Tour
//!
//! ```
//! use rekord::{build, mapping, Value};
//!
//! let address = build("Address")
//!     .field("city")
//!     .field("zip")
//!     .field("street")
//!     .build()?;
//! let person = build("Person")
//!     .field("name")
//!     .field("last_name")
//!     .nested("address", &address)
//!     .build()?;
//!
//! let john = person.create(&mapping! {
//!     "name" => "John",
//!     "last_name" => "Doe",
//!     "address" => mapping! { "city" => "Anytown", "zip" => "45678" },
//! });
//!
//! // Keyed, positional, and path access all agree.
//! assert_eq!(john.get("name")?, &Value::from("John"));
//! assert_eq!(john.get(-1)?.as_record().unwrap().get("city")?, &Value::from("Anytown"));
//! assert_eq!(john.dig(["address", "city"])?, Some(&Value::from("Anytown")));
//!
//! // Non-destructive update.
//! let fred = john.update(&mapping! { "name" => "Fred" });
//! assert_eq!(fred.get("name")?, &Value::from("Fred"));
//! assert_eq!(john.get("name")?, &Value::from("John"));
//! # Ok::<(), rekord::RekordError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`name`]: interned, validated attribute names
//! - [`value`]: the closed dynamic value enum, JSON interop
//! - [`mapping`]: insertion-ordered name -> value mapping
//! - [`schema`]: constructs, declaration, derivation, the builder factory
//! - [`record`]: instances — access, views, equality, update
//!
//! ## Guarantees
//!
//! - **Order**: attribute order is declaration order, inherited names
//!   first. Every enumeration and view follows it.
//! - **No gaps**: a record resolves every schema name; nested constructs
//!   are always materialized, never `Null`.
//! - **Identity-safe defaults**: schemas own their default values and only
//!   hand out copies; two records never share mutable default state.
//! - **Permissive input**: unknown input keys are dropped silently, and
//!   structural comparison ignores extra fields on the other side. Both
//!   policies are deliberate and load-bearing.
//! - **Share-freely**: records are deeply immutable; concurrent readers
//!   need no locks. Only declaration is serialized (internally).

pub mod error;
pub mod mapping;
pub mod name;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{RekordError, Result};
pub use mapping::Mapping;
pub use name::Name;
pub use record::{FieldReadable, Pairs, Record, RecordKey, Selector};
pub use schema::{build, AttrDefault, Builder, RecordType};
pub use value::Value;

/// Build a [`Mapping`] literal.
///
/// ```
/// use rekord::{mapping, Value};
///
/// let input = mapping! {
///     "name" => "John",
///     "address" => mapping! { "city" => "Anytown" },
/// };
/// assert_eq!(input.get("name"), Some(&Value::from("John")));
/// ```
#[macro_export]
macro_rules! mapping {
    () => {
        $crate::Mapping::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut mapping = $crate::Mapping::new();
        $( mapping.insert($key, $value); )+
        mapping
    }};
}
