//! Source-level type descriptors.
//!
//! A `Descriptor` is what schema authors write. It may contain deferred
//! names and union forms; `crate::normalize` turns it into a canonical
//! `crate::ir::Ty` before anything else looks at it.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexSet;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Integer,
    String,
    Boolean,
}

#[derive(Debug, Clone)]
pub enum Descriptor {
    Atomic(AtomKind),
    /// Absent value; also the trailing marker of a nullable union.
    Null,
    /// UUID carried as a string.
    Identifier,
    Sequence(Box<Descriptor>),
    Mapping(Box<Descriptor>, Box<Descriptor>),
    Enumeration(Arc<EnumDef>),
    Record(Arc<RecordDef>),
    /// Union-like source form. Only `[.., Null]` and `[record, JointTag]`
    /// shapes survive normalization.
    Union(Vec<Descriptor>),
    /// Merge tag. Meaningless outside the tail of a `Union`.
    JointTag,
    /// Name looked up in a `Scope`; used for self and forward references.
    Deferred(String),
}

/// A named record with a fixed field order.
///
/// Identity is nominal: two definitions compare equal iff their names do.
#[derive(Debug, Clone)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: Descriptor,
    /// The key must be present in the raw mapping, even if its type accepts null.
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub labels: IndexSet<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDERS
// ————————————————————————————————————————————————————————————————————————————

impl Descriptor {
    pub fn int() -> Self { Self::Atomic(AtomKind::Integer) }
    pub fn string() -> Self { Self::Atomic(AtomKind::String) }
    pub fn boolean() -> Self { Self::Atomic(AtomKind::Boolean) }
    pub fn uuid() -> Self { Self::Identifier }

    pub fn list(element: Descriptor) -> Self {
        Self::Sequence(Box::new(element))
    }

    pub fn map(key: Descriptor, value: Descriptor) -> Self {
        Self::Mapping(Box::new(key), Box::new(value))
    }

    /// `Union[inner, Null]`
    pub fn nullable(inner: Descriptor) -> Self {
        Self::Union(vec![inner, Self::Null])
    }

    /// `Union[inner, JointTag]`; `inner` must normalize to a record.
    pub fn joint(inner: Descriptor) -> Self {
        Self::Union(vec![inner, Self::JointTag])
    }

    pub fn deferred(name: impl Into<String>) -> Self {
        Self::Deferred(name.into())
    }

    pub fn union(alternatives: impl IntoIterator<Item = Descriptor>) -> Self {
        Self::Union(alternatives.into_iter().collect())
    }
}

impl RecordDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, ty: Descriptor) -> Self {
        self.fields.push(Field { name: name.into(), ty, required: false });
        self
    }

    pub fn required_field(mut self, name: impl Into<String>, ty: Descriptor) -> Self {
        self.fields.push(Field { name: name.into(), ty, required: true });
        self
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }
}

impl EnumDef {
    pub fn new<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

impl From<RecordDef> for Descriptor {
    fn from(def: RecordDef) -> Self {
        Self::Record(Arc::new(def))
    }
}

impl From<EnumDef> for Descriptor {
    fn from(def: EnumDef) -> Self {
        Self::Enumeration(Arc::new(def))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NOMINAL IDENTITY
// ————————————————————————————————————————————————————————————————————————————

impl PartialEq for RecordDef {
    fn eq(&self, other: &Self) -> bool { self.name == other.name }
}
impl Eq for RecordDef {}
impl Hash for RecordDef {
    fn hash<H: Hasher>(&self, state: &mut H) { self.name.hash(state) }
}

impl PartialEq for EnumDef {
    fn eq(&self, other: &Self) -> bool { self.name == other.name }
}
impl Eq for EnumDef {}
impl Hash for EnumDef {
    fn hash<H: Hasher>(&self, state: &mut H) { self.name.hash(state) }
}

// ————————————————————————————————————————————————————————————————————————————
// DISPLAY
// ————————————————————————————————————————————————————————————————————————————

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AtomKind::Integer => "int",
            AtomKind::String => "string",
            AtomKind::Boolean => "bool",
        })
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Atomic(kind) => write!(f, "{kind}"),
            Descriptor::Null => f.write_str("null"),
            Descriptor::Identifier => f.write_str("uuid"),
            Descriptor::Sequence(element) => write!(f, "list<{element}>"),
            Descriptor::Mapping(key, value) => write!(f, "map<{key}, {value}>"),
            Descriptor::Enumeration(def) => f.write_str(&def.name),
            Descriptor::Record(def) => f.write_str(&def.name),
            Descriptor::Union(alternatives) => {
                f.write_str("union<")?;
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 { f.write_str(" | ")?; }
                    write!(f, "{alt}")?;
                }
                f.write_str(">")
            }
            Descriptor::JointTag => f.write_str("<joint-tag>"),
            Descriptor::Deferred(name) => write!(f, "'{name}'"),
        }
    }
}
