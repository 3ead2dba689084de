// Canonical, comparable type IR. Graph nodes and registry entries are keyed by `Ty`.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{AtomKind, EnumDef, RecordDef};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Atomic(AtomKind),
    Null,
    Identifier,
    Sequence(Box<Ty>),
    Mapping(Box<Ty>, Box<Ty>),
    Enumeration(Arc<EnumDef>),
    Record(Arc<RecordDef>),      // nominal; fields stay un-normalized here
    Nullable(Box<Ty>),           // never wraps Null or another Nullable
    Joint(Arc<RecordDef>),       // every field decoded from the same raw value
}

impl Ty {
    /// `Nullable(inner)`, collapsing the degenerate cases.
    pub fn nullable(inner: Ty) -> Ty {
        match inner {
            Ty::Null => Ty::Null,
            Ty::Nullable(_) => inner,
            other => Ty::Nullable(Box::new(other)),
        }
    }

    /// Number of dependency slots a node of this shape carries.
    pub fn arity(&self) -> usize {
        match self {
            Ty::Atomic(_) | Ty::Null | Ty::Identifier | Ty::Enumeration(_) => 0,
            Ty::Sequence(_) | Ty::Nullable(_) => 1,
            Ty::Mapping(..) => 2,
            Ty::Record(def) | Ty::Joint(def) => def.fields.len(),
        }
    }

    pub fn record(&self) -> Option<&Arc<RecordDef>> {
        match self {
            Ty::Record(def) => Some(def),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Atomic(kind) => write!(f, "{kind}"),
            Ty::Null => f.write_str("null"),
            Ty::Identifier => f.write_str("uuid"),
            Ty::Sequence(element) => write!(f, "list<{element}>"),
            Ty::Mapping(key, value) => write!(f, "map<{key}, {value}>"),
            Ty::Enumeration(def) => f.write_str(&def.name),
            Ty::Record(def) => f.write_str(&def.name),
            Ty::Nullable(inner) => write!(f, "nullable<{inner}>"),
            Ty::Joint(def) => write!(f, "joint<{}>", def.name),
        }
    }
}
