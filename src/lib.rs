//! Schema-driven decoder compiler.
//!
//! A root [`Descriptor`] is normalized into a canonical [`Ty`], every type
//! reachable from it is collected into a [`Graph`], and the graph is compiled
//! into a [`Registry`] holding one decode function per type. Records may refer
//! to each other (and to themselves) through [`Descriptor::Deferred`] names
//! resolved in a [`Scope`].
//!
//! ```
//! use serde_json::json;
//! use swagger_gen::{compile, Descriptor, RecordDef, Scope};
//!
//! let mut scope = Scope::new();
//! scope.define_record(
//!     RecordDef::new("Point")
//!         .field("x", Descriptor::int())
//!         .field("y", Descriptor::int()),
//! );
//! let registry = compile(&Descriptor::deferred("Point"), &scope).unwrap();
//! let point = registry.decode_root(&json!({"x": 1, "y": 2})).unwrap();
//! assert_eq!(point.get("y").and_then(|v| v.as_i64()), Some(2));
//! ```
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod ir;
pub mod normalize;
pub mod registry;
pub mod schema_file;
pub mod scope;
pub mod swagger;
pub mod value;

mod path_de;
mod synth;

pub use descriptor::{AtomKind, Descriptor, EnumDef, Field, RecordDef};
pub use error::{DecodeError, DecodeErrorKind, SchemaError, Segment};
pub use graph::{build_graph, Graph};
pub use ir::Ty;
pub use normalize::{dependencies, normalize};
pub use registry::Registry;
pub use scope::Scope;
pub use value::{Decoded, EnumValue, Layout, RecordValue};

/// Either side of the pipeline failing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Normalize `root`, walk its graph and build the registry.
pub fn compile(root: &Descriptor, scope: &Scope) -> Result<Registry, SchemaError> {
    let graph = build_graph(root, scope)?;
    Registry::build(&graph)
}

/// Build one registry serving several roots.
pub fn compile_many<'a, I>(roots: I, scope: &Scope) -> Result<Registry, SchemaError>
where
    I: IntoIterator<Item = &'a Descriptor>,
{
    let graphs = roots
        .into_iter()
        .map(|root| build_graph(root, scope))
        .collect::<Result<Vec<_>, _>>()?;
    Registry::build(&Graph::merge(graphs))
}
