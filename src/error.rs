//! Schema (construction-time) and decode (data-time) errors.
use std::fmt;

use thiserror::Error;

use crate::descriptor::AtomKind;

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA ERRORS
// ————————————————————————————————————————————————————————————————————————————

/// The schema is malformed or asks for something the engine cannot do.
/// Any of these aborts registry construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),
    #[error("unrecognized type `{0}`")]
    UnrecognizedType(String),
    #[error("unsupported union of {} alternatives: {}", .alternatives.len(), .alternatives.join(" | "))]
    UnsupportedUnion { alternatives: Vec<String> },
    #[error("joint must wrap exactly one record, found `{found}`")]
    InvalidJoint { found: String },
    #[error("alias `{name}` refers to itself without going through a record")]
    CyclicAlias { name: String },
    #[error("node `{ty}` has {found} dependencies, expected {expected}")]
    ArityMismatch { ty: String, expected: usize, found: usize },
    #[error("node `{ty}` depends on `{dependency}` which is not in the graph")]
    MissingNode { ty: String, dependency: String },
    #[error("slot {slot} of `{ty}` was never wired")]
    UnwiredSlot { ty: String, slot: usize },
}

// ————————————————————————————————————————————————————————————————————————————
// DECODE ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Atom(AtomKind),
    Null,
    Array,
    Object,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("expected {expected}, found {found}")]
    KindMismatch { expected: Expected, found: &'static str },
    #[error("value is missing")]
    Missing,
    #[error("malformed identifier `{value}`: {reason}")]
    MalformedIdentifier { value: String, reason: String },
    #[error("unknown label `{label}`")]
    UnknownLabel { label: String },
    #[error("required field `{field}` is absent")]
    MissingRequired { field: String },
    #[error("dependency slot {slot} invoked before wiring")]
    Unwired { slot: usize },
    #[error("type is not part of this registry")]
    UnregisteredType,
}

/// One step on the way from the root value to the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
    Key(String),
    /// Joint part: field index and name of the inner record.
    Part(usize, String),
}

/// A data-time failure: what went wrong, at which type, and where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DecodeError {
    pub ty: String,
    pub kind: DecodeErrorKind,
    // innermost segment first; compositional decoders push as the error bubbles up
    trail: Vec<Segment>,
}

impl DecodeError {
    pub fn new(ty: impl fmt::Display, kind: DecodeErrorKind) -> Self {
        Self { ty: ty.to_string(), kind, trail: Vec::new() }
    }

    pub(crate) fn within(mut self, segment: Segment) -> Self {
        self.trail.push(segment);
        self
    }

    /// Path from the root value to the failure point.
    pub fn path(&self) -> impl Iterator<Item = &Segment> {
        self.trail.iter().rev()
    }

    /// The outermost field name on the path, if any.
    pub fn field(&self) -> Option<&str> {
        self.path().find_map(|seg| match seg {
            Segment::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// The innermost field name on the path, if any.
    pub fn leaf_field(&self) -> Option<&str> {
        self.trail.iter().find_map(|seg| match seg {
            Segment::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// `$.apis[0].operations[2].method`
    pub fn path_string(&self) -> String {
        let mut out = String::from("$");
        for seg in self.path() {
            match seg {
                Segment::Field(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                Segment::Index(i) => out.push_str(&format!("[{i}]")),
                Segment::Key(key) => out.push_str(&format!("[{key:?}]")),
                Segment::Part(i, name) => out.push_str(&format!("<{i}:{name}>")),
            }
        }
        out
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type `{}`, at {})", self.kind, self.ty, self.path_string())
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Atom(kind) => write!(f, "{kind}"),
            Expected::Null => f.write_str("null"),
            Expected::Array => f.write_str("array"),
            Expected::Object => f.write_str("object"),
            Expected::String => f.write_str("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_reads_root_to_leaf() {
        let err = DecodeError::new("string", DecodeErrorKind::Missing)
            .within(Segment::Field("method".into()))
            .within(Segment::Index(2))
            .within(Segment::Field("operations".into()))
            .within(Segment::Key("pet".into()));
        assert_eq!(err.path_string(), r#"$["pet"].operations[2].method"#);
        assert_eq!(err.field(), Some("operations"));
        assert_eq!(err.leaf_field(), Some("method"));
        assert!(err.to_string().contains("value is missing"));
    }
}
