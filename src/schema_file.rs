//! JSON schema files.
//!
//! A schema file is a JSON object mapping names to type expressions:
//!
//! ```json
//! {
//!   "Point": { "record": { "fields": { "x": "int", "y": "int" }, "required": ["x"] } },
//!   "Color": { "enum": ["red", "green"] },
//!   "Tree":  { "record": { "fields": { "children": { "list": "Tree" } } } },
//!   "Shape": { "joint": "Point" }
//! }
//! ```
//!
//! Bare strings are either builtins (`int`, `string`, `bool`, `null`, `uuid`,
//! and the merge tag `$joint`) or references to other entries. Inline records
//! and enums take the name of their entry; nested ones get a dotted path,
//! and union alternatives their position (`Shape|0`).
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::descriptor::{Descriptor, EnumDef, RecordDef};
use crate::error::SchemaError;
use crate::path_de::{from_str_with_path, PathError};
use crate::registry::Registry;
use crate::scope::Scope;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SchemaFile {
    pub entries: IndexMap<String, SchemaExpr>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaExpr {
    Name(String),
    Tagged(TaggedExpr),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggedExpr {
    List(Box<SchemaExpr>),
    Map(Box<SchemaExpr>, Box<SchemaExpr>),
    Nullable(Box<SchemaExpr>),
    Joint(Box<SchemaExpr>),
    Union(Vec<SchemaExpr>),
    Enum(Vec<String>),
    Record(RecordExpr),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordExpr {
    pub fields: IndexMap<String, SchemaExpr>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SchemaFileError {
    #[error("failed to read schema file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] PathError),
    #[error("record `{record}` lists `{field}` as required but has no such field")]
    UnknownRequired { record: String, field: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

pub fn parse_scope(src: &str) -> Result<Scope, SchemaFileError> {
    let file: SchemaFile = from_str_with_path(src)?;
    file.into_scope()
}

pub fn load_scope(path: &Path) -> Result<Scope, SchemaFileError> {
    let src = std::fs::read_to_string(path).map_err(|source| SchemaFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scope(&src)
}

/// Load a schema file and compile the registry for the entry named `root`.
pub fn load_registry(path: &Path, root: &str) -> Result<(Scope, Registry), SchemaFileError> {
    let scope = load_scope(path)?;
    let registry = crate::compile(&Descriptor::deferred(root), &scope)?;
    Ok((scope, registry))
}

impl SchemaFile {
    pub fn into_scope(self) -> Result<Scope, SchemaFileError> {
        let mut scope = Scope::new();
        for (name, expr) in &self.entries {
            let descriptor = lower(expr, name)?;
            scope.define(name.clone(), descriptor);
        }
        Ok(scope)
    }
}

fn lower(expr: &SchemaExpr, path: &str) -> Result<Descriptor, SchemaFileError> {
    let tagged = match expr {
        SchemaExpr::Name(name) => return Ok(builtin(name)),
        SchemaExpr::Tagged(tagged) => tagged,
    };
    match tagged {
        TaggedExpr::List(element) => Ok(Descriptor::list(lower(element, &format!("{path}[]"))?)),
        TaggedExpr::Map(key, value) => Ok(Descriptor::map(
            lower(key, &format!("{path}.key"))?,
            lower(value, &format!("{path}.value"))?,
        )),
        TaggedExpr::Nullable(inner) => Ok(Descriptor::nullable(lower(inner, path)?)),
        TaggedExpr::Joint(inner) => Ok(Descriptor::joint(lower(inner, path)?)),
        // distinct names per alternative, or two inline records would compare equal
        TaggedExpr::Union(alternatives) => alternatives
            .iter()
            .enumerate()
            .map(|(i, alt)| lower(alt, &format!("{path}|{i}")))
            .collect::<Result<Vec<_>, _>>()
            .map(Descriptor::Union),
        TaggedExpr::Enum(labels) => Ok(EnumDef::new(path, labels.iter().cloned()).into()),
        TaggedExpr::Record(record) => {
            if let Some(missing) = record.required.iter().find(|r| !record.fields.contains_key(*r)) {
                return Err(SchemaFileError::UnknownRequired {
                    record: path.to_string(),
                    field: missing.clone(),
                });
            }
            let mut def = RecordDef::new(path);
            for (name, field) in &record.fields {
                let ty = lower(field, &format!("{path}.{name}"))?;
                def = if record.required.contains(name) {
                    def.required_field(name.clone(), ty)
                } else {
                    def.field(name.clone(), ty)
                };
            }
            Ok(def.into())
        }
    }
}

fn builtin(name: &str) -> Descriptor {
    match name {
        "int" => Descriptor::int(),
        "string" => Descriptor::string(),
        "bool" => Descriptor::boolean(),
        "null" => Descriptor::Null,
        "uuid" => Descriptor::uuid(),
        "$joint" => Descriptor::JointTag,
        other => Descriptor::deferred(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn parses_records_enums_and_references() {
        let scope = parse_scope(
            r#"{
                "Tree": { "record": { "fields": {
                    "label": "string",
                    "kind": { "enum": ["leaf", "branch"] },
                    "children": { "list": "Tree" }
                }, "required": ["label"] } },
                "MaybeTree": { "nullable": "Tree" }
            }"#,
        )
        .unwrap();
        assert_eq!(scope.len(), 2);
        let Some(Descriptor::Record(tree)) = scope.resolve("Tree") else {
            panic!("Tree should be a record");
        };
        assert_eq!(tree.fields.len(), 3);
        assert!(tree.fields[0].required);
        assert!(matches!(&tree.fields[1].ty, Descriptor::Enumeration(e) if e.name == "Tree.kind"));

        let maybe = normalize(&Descriptor::deferred("MaybeTree"), &scope).unwrap();
        assert_eq!(maybe.to_string(), "nullable<Tree>");
    }

    #[test]
    fn joint_tag_is_spelled_as_a_name() {
        let scope = parse_scope(
            r#"{
                "Part": { "record": { "fields": { "a": "int" } } },
                "Whole": { "union": ["Part", "$joint"] }
            }"#,
        )
        .unwrap();
        let ty = normalize(&Descriptor::deferred("Whole"), &scope).unwrap();
        assert_eq!(ty.to_string(), "joint<Part>");
    }

    #[test]
    fn inline_union_alternatives_stay_distinct() {
        let scope = parse_scope(
            r#"{
                "Shape": { "union": [
                    { "record": { "fields": { "x": "int" } } },
                    { "record": { "fields": { "r": "string" } } }
                ] }
            }"#,
        )
        .unwrap();
        let err = normalize(&Descriptor::deferred("Shape"), &scope).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnsupportedUnion { alternatives: vec!["Shape|0".into(), "Shape|1".into()] }
        );

        let maybe = parse_scope(r#"{ "Opt": { "union": [{ "enum": ["a"] }, "null"] } }"#).unwrap();
        let ty = normalize(&Descriptor::deferred("Opt"), &maybe).unwrap();
        assert_eq!(ty.to_string(), "nullable<Opt|0>");
    }

    #[test]
    fn unknown_required_field_is_rejected() {
        let err = parse_scope(r#"{ "P": { "record": { "fields": { "x": "int" }, "required": ["y"] } } }"#)
            .unwrap_err();
        assert!(matches!(err, SchemaFileError::UnknownRequired { ref field, .. } if field == "y"));
    }

    #[test]
    fn shape_errors_carry_a_path() {
        let err = parse_scope(r#"{ "P": { "record": { "fields": { "x": "int" }, "extra": 1 } } }"#)
            .unwrap_err();
        let SchemaFileError::Parse(err) = err else {
            panic!("expected a parse error, got {err}");
        };
        assert!(err.path.starts_with("P"), "path was {}", err.path);
    }
}
