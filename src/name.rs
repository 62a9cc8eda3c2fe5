//! Interned attribute names.
//!
//! Attribute names are symbols, not strings: each distinct spelling is
//! stored once in a process-wide pool and every [`Name`] with that spelling
//! shares the same allocation. Cloning a name is a reference-count bump and
//! equality fast-paths on pointer identity before falling back to a string
//! compare.
//!
//! Spelling rules are checked once, when the name enters the system (at
//! declaration time): a name must be non-empty, start with an alphabetic
//! character or `_`, and continue with alphanumerics or `_`. Anything else
//! fails with [`RekordError::InvalidName`].

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::error::{RekordError, Result};

static POOL: Lazy<Mutex<HashSet<Arc<str>>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// An interned attribute name.
#[derive(Clone)]
pub struct Name(Arc<str>);

impl Name {
    /// Intern `raw` as an attribute name, validating its spelling.
    pub fn new(raw: &str) -> Result<Self> {
        if !is_valid(raw) {
            return Err(RekordError::InvalidName(raw.to_string()));
        }
        Ok(Self(intern(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn intern(raw: &str) -> Arc<str> {
    let mut pool = POOL.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = pool.get(raw) {
        return existing.clone();
    }
    let fresh: Arc<str> = Arc::from(raw);
    pool.insert(fresh.clone());
    fresh
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Name {}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

// Hashes the string content so `HashMap<Name, _>` tables can be queried
// with a bare `&str` through `Borrow<str>`.
impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Name {
    type Error = RekordError;

    fn try_from(raw: &str) -> Result<Self> {
        Name::new(raw)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> String {
        name.0.to_string()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}
