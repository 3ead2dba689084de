// src/normalize.rs
//! Descriptor → canonical `Ty`.
//!
//! Goal: every reachable descriptor ends up as exactly one non-deferred `Ty`
//! so the graph builder can key nodes by equality.
//!
//! Unions are read by their trailing alternative:
//! - `[.., Null]`     → `Nullable(rest)`
//! - `[rec, JointTag]` → `Joint(rec)`
//! - anything else must reduce to a single distinct alternative.

use crate::descriptor::Descriptor;
use crate::error::SchemaError;
use crate::ir::Ty;
use crate::scope::Scope;

/// Normalize `descriptor`, resolving deferred names through `scope`.
pub fn normalize(descriptor: &Descriptor, scope: &Scope) -> Result<Ty, SchemaError> {
    Normalizer::new(scope).normalize(descriptor)
}

/// Direct dependencies of a normalized type, in slot order.
///
/// Record and joint fields are normalized here (not in `normalize`), which is
/// what lets a record refer to itself.
pub fn dependencies(ty: &Ty, scope: &Scope) -> Result<Vec<Ty>, SchemaError> {
    match ty {
        Ty::Atomic(_) | Ty::Null | Ty::Identifier | Ty::Enumeration(_) => Ok(Vec::new()),
        Ty::Sequence(element) => Ok(vec![(**element).clone()]),
        Ty::Mapping(key, value) => Ok(vec![(**key).clone(), (**value).clone()]),
        Ty::Nullable(inner) => Ok(vec![(**inner).clone()]),
        Ty::Record(def) | Ty::Joint(def) => {
            let mut normalizer = Normalizer::new(scope);
            def.fields
                .iter()
                .map(|field| normalizer.normalize(&field.ty))
                .collect()
        }
    }
}

// -------------------- normalizer --------------------

struct Normalizer<'s> {
    scope: &'s Scope,
    /// Aliases currently being expanded; re-entering one means the alias
    /// recurses structurally, which has no finite normal form.
    resolving: Vec<String>,
}

impl<'s> Normalizer<'s> {
    fn new(scope: &'s Scope) -> Self {
        Self { scope, resolving: Vec::new() }
    }

    fn normalize(&mut self, descriptor: &Descriptor) -> Result<Ty, SchemaError> {
        match descriptor {
            Descriptor::Atomic(kind) => Ok(Ty::Atomic(*kind)),
            Descriptor::Null => Ok(Ty::Null),
            Descriptor::Identifier => Ok(Ty::Identifier),
            Descriptor::Sequence(element) => {
                Ok(Ty::Sequence(Box::new(self.normalize(element)?)))
            }
            Descriptor::Mapping(key, value) => {
                let key = self.normalize(key)?;
                let value = self.normalize(value)?;
                Ok(Ty::Mapping(Box::new(key), Box::new(value)))
            }
            Descriptor::Enumeration(def) => Ok(Ty::Enumeration(def.clone())),
            Descriptor::Record(def) => Ok(Ty::Record(def.clone())),
            Descriptor::Deferred(name) => self.resolve(name),
            Descriptor::Union(alternatives) => self.union(alternatives),
            Descriptor::JointTag => Err(SchemaError::UnrecognizedType(descriptor.to_string())),
        }
    }

    fn resolve(&mut self, name: &str) -> Result<Ty, SchemaError> {
        if self.resolving.iter().any(|n| n == name) {
            return Err(SchemaError::CyclicAlias { name: name.to_string() });
        }
        let target = self
            .scope
            .resolve(name)
            .ok_or_else(|| SchemaError::UnresolvedReference(name.to_string()))?;
        self.resolving.push(name.to_string());
        let out = self.normalize(target);
        self.resolving.pop();
        out
    }

    fn union(&mut self, alternatives: &[Descriptor]) -> Result<Ty, SchemaError> {
        let Some((last, rest)) = alternatives.split_last() else {
            return Err(SchemaError::UnrecognizedType("union<>".into()));
        };
        match last {
            Descriptor::Null => {
                if rest.is_empty() {
                    return Ok(Ty::Null);
                }
                let inner = self.remaining(rest)?;
                Ok(Ty::nullable(inner))
            }
            Descriptor::JointTag => {
                if rest.is_empty() {
                    return Err(SchemaError::InvalidJoint { found: "nothing".into() });
                }
                match self.remaining(rest)? {
                    Ty::Record(def) => Ok(Ty::Joint(def)),
                    other => Err(SchemaError::InvalidJoint { found: other.to_string() }),
                }
            }
            _ => self.plain_union(alternatives),
        }
    }

    /// What is left after stripping a trailing marker: one alternative is taken
    /// as-is, several are read as a nested union (which may carry its own marker).
    fn remaining(&mut self, rest: &[Descriptor]) -> Result<Ty, SchemaError> {
        match rest {
            [single] => self.normalize(single),
            _ => self.union(rest),
        }
    }

    fn plain_union(&mut self, alternatives: &[Descriptor]) -> Result<Ty, SchemaError> {
        let mut arms: Vec<Ty> = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            let ty = self.normalize(alt)?;
            if !arms.contains(&ty) {
                arms.push(ty);
            }
        }
        if arms.len() == 1 {
            return Ok(arms.remove(0));
        }
        Err(SchemaError::UnsupportedUnion {
            alternatives: arms.iter().map(ToString::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AtomKind, RecordDef};

    fn scope_with_tree() -> Scope {
        let mut scope = Scope::new();
        scope.define_record(
            RecordDef::new("Tree")
                .field("label", Descriptor::string())
                .field("children", Descriptor::list(Descriptor::deferred("Tree"))),
        );
        scope.define("Forest", Descriptor::list(Descriptor::deferred("Tree")));
        scope
    }

    #[test]
    fn atoms_and_containers_normalize_structurally() {
        let scope = Scope::new();
        let ty = normalize(&Descriptor::map(Descriptor::string(), Descriptor::list(Descriptor::int())), &scope).unwrap();
        assert_eq!(
            ty,
            Ty::Mapping(
                Box::new(Ty::Atomic(AtomKind::String)),
                Box::new(Ty::Sequence(Box::new(Ty::Atomic(AtomKind::Integer)))),
            )
        );
    }

    #[test]
    fn deferred_resolves_through_scope() {
        let scope = scope_with_tree();
        let direct = normalize(&Descriptor::deferred("Forest"), &scope).unwrap();
        let spelled = normalize(&Descriptor::list(Descriptor::deferred("Tree")), &scope).unwrap();
        assert_eq!(direct, spelled);
        assert_eq!(direct.to_string(), "list<Tree>");
    }

    #[test]
    fn unresolved_reference_fails() {
        let err = normalize(&Descriptor::deferred("Nope"), &Scope::new()).unwrap_err();
        assert_eq!(err, SchemaError::UnresolvedReference("Nope".into()));
    }

    #[test]
    fn structural_self_alias_is_rejected() {
        let mut scope = Scope::new();
        scope.define("Loop", Descriptor::list(Descriptor::deferred("Loop")));
        let err = normalize(&Descriptor::deferred("Loop"), &scope).unwrap_err();
        assert_eq!(err, SchemaError::CyclicAlias { name: "Loop".into() });
    }

    #[test]
    fn trailing_null_gives_nullable_and_collapses() {
        let scope = Scope::new();
        let ty = normalize(&Descriptor::nullable(Descriptor::int()), &scope).unwrap();
        assert_eq!(ty, Ty::Nullable(Box::new(Ty::Atomic(AtomKind::Integer))));

        let twice = normalize(&Descriptor::nullable(Descriptor::nullable(Descriptor::int())), &scope).unwrap();
        assert_eq!(twice, ty);

        let only_null = normalize(&Descriptor::nullable(Descriptor::Null), &scope).unwrap();
        assert_eq!(only_null, Ty::Null);
    }

    #[test]
    fn trailing_joint_tag_gives_joint() {
        let mut scope = scope_with_tree();
        scope.define("JointTree", Descriptor::joint(Descriptor::deferred("Tree")));
        let ty = normalize(&Descriptor::deferred("JointTree"), &scope).unwrap();
        assert!(matches!(&ty, Ty::Joint(def) if def.name == "Tree"));

        // Optional[Joint[Tree]] spelled flat, the way a flattened union reads
        let flat = Descriptor::union([Descriptor::deferred("Tree"), Descriptor::JointTag, Descriptor::Null]);
        let nullable = normalize(&flat, &scope).unwrap();
        assert_eq!(nullable, Ty::Nullable(Box::new(ty)));
    }

    #[test]
    fn joint_of_non_record_is_rejected() {
        let err = normalize(&Descriptor::joint(Descriptor::int()), &Scope::new()).unwrap_err();
        assert_eq!(err, SchemaError::InvalidJoint { found: "int".into() });
    }

    #[test]
    fn plain_multi_union_is_unsupported() {
        let err = normalize(&Descriptor::union([Descriptor::int(), Descriptor::string()]), &Scope::new()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnsupportedUnion { alternatives: vec!["int".into(), "string".into()] }
        );
    }

    #[test]
    fn duplicate_alternatives_reduce_to_one() {
        let ty = normalize(&Descriptor::union([Descriptor::int(), Descriptor::int()]), &Scope::new()).unwrap();
        assert_eq!(ty, Ty::Atomic(AtomKind::Integer));
    }

    #[test]
    fn bare_joint_tag_and_empty_union_are_unrecognized() {
        let scope = Scope::new();
        assert!(matches!(normalize(&Descriptor::JointTag, &scope), Err(SchemaError::UnrecognizedType(_))));
        assert!(matches!(normalize(&Descriptor::union([]), &scope), Err(SchemaError::UnrecognizedType(_))));
    }

    #[test]
    fn record_dependencies_follow_field_order() {
        let scope = scope_with_tree();
        let tree = normalize(&Descriptor::deferred("Tree"), &scope).unwrap();
        let deps = dependencies(&tree, &scope).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0], Ty::Atomic(AtomKind::String));
        assert_eq!(deps[1], Ty::Sequence(Box::new(tree.clone())));
    }
}
