//! Decode-function registry.
//!
//! Built in three passes over a `Graph`:
//!
//! 1. slot allocation: every node gets one placeholder slot per dependency,
//! 2. synthesis: every node gets a decode closure (see `crate::synth`) that
//!    reads its slots only when it runs,
//! 3. wiring: every slot is pointed at the node of its dependency type.
//!
//! Decoders and slot lists live in arenas indexed by node id, so mutually
//! recursive decoders never own each other. Once `build` returns nothing is
//! mutated again and the registry can be shared freely across threads.
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::descriptor::Descriptor;
use crate::error::{DecodeError, DecodeErrorKind, SchemaError};
use crate::graph::Graph;
use crate::ir::Ty;
use crate::normalize::normalize;
use crate::scope::Scope;
use crate::synth::{self, DecodeFn};
use crate::value::Decoded;

type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Not wired yet; calling through it is an internal error.
    Placeholder,
    Wired(NodeId),
}

pub struct Registry {
    roots: Vec<Ty>,
    index: IndexMap<Ty, NodeId>,
    decoders: Vec<DecodeFn>,
    slots: Vec<Vec<Slot>>,
}

/// A node's view of its own dependency slots, handed to its decoder per call.
#[derive(Clone, Copy)]
pub(crate) struct Deps<'r> {
    registry: &'r Registry,
    slots: &'r [Slot],
}

impl Deps<'_> {
    pub(crate) fn call(&self, slot: usize, raw: Option<&Value>) -> Result<Decoded, DecodeError> {
        match self.slots.get(slot) {
            Some(Slot::Wired(id)) => self.registry.run(*id, raw),
            _ => Err(DecodeError::new("<placeholder>", DecodeErrorKind::Unwired { slot })),
        }
    }
}

impl Registry {
    pub fn build(graph: &Graph) -> Result<Self, SchemaError> {
        // 1) slot allocation
        let mut index: IndexMap<Ty, NodeId> = IndexMap::with_capacity(graph.len());
        let mut slots: Vec<Vec<Slot>> = Vec::with_capacity(graph.len());
        for (id, (ty, deps)) in graph.nodes().enumerate() {
            if deps.len() != ty.arity() {
                return Err(SchemaError::ArityMismatch {
                    ty: ty.to_string(),
                    expected: ty.arity(),
                    found: deps.len(),
                });
            }
            index.insert(ty.clone(), id);
            slots.push(vec![Slot::Placeholder; deps.len()]);
        }
        debug!(nodes = slots.len(), "registry slots allocated");

        // 2) synthesis
        let decoders: Vec<DecodeFn> = graph.nodes().map(|(ty, _)| synth::synthesize(ty)).collect();
        debug!(decoders = decoders.len(), "registry decoders synthesized");

        // 3) wiring
        for (id, (ty, deps)) in graph.nodes().enumerate() {
            for (slot, dep) in deps.iter().enumerate() {
                let target = *index.get(dep).ok_or_else(|| SchemaError::MissingNode {
                    ty: ty.to_string(),
                    dependency: dep.to_string(),
                })?;
                trace!(node = %ty, slot, dependency = %dep, "wire");
                slots[id][slot] = Slot::Wired(target);
            }
        }

        for (ty, &id) in &index {
            if let Some(slot) = slots[id].iter().position(|s| *s == Slot::Placeholder) {
                return Err(SchemaError::UnwiredSlot { ty: ty.to_string(), slot });
            }
        }
        debug!("registry wired");

        Ok(Self {
            roots: graph.roots().to_vec(),
            index,
            decoders,
            slots,
        })
    }

    /// Decode `raw` as `ty`. `ty` must be one of the registry's node types.
    pub fn decode(&self, ty: &Ty, raw: &Value) -> Result<Decoded, DecodeError> {
        let id = *self
            .index
            .get(ty)
            .ok_or_else(|| DecodeError::new(ty, DecodeErrorKind::UnregisteredType))?;
        self.run(id, Some(raw))
    }

    /// Decode `raw` as the first root the registry was built from.
    pub fn decode_root(&self, raw: &Value) -> Result<Decoded, DecodeError> {
        match self.roots.first() {
            Some(root) => self.decode(root, raw),
            None => Err(DecodeError::new("<none>", DecodeErrorKind::UnregisteredType)),
        }
    }

    /// Normalize `descriptor` against `scope`, then decode.
    pub fn normalize_and_decode(
        &self,
        descriptor: &Descriptor,
        scope: &Scope,
        raw: &Value,
    ) -> Result<Decoded, crate::Error> {
        let ty = normalize(descriptor, scope)?;
        Ok(self.decode(&ty, raw)?)
    }

    pub fn contains(&self, ty: &Ty) -> bool { self.index.contains_key(ty) }
    pub fn roots(&self) -> &[Ty] { &self.roots }
    pub fn types(&self) -> impl Iterator<Item = &Ty> { self.index.keys() }
    pub fn len(&self) -> usize { self.decoders.len() }
    pub fn is_empty(&self) -> bool { self.decoders.is_empty() }

    fn run(&self, id: NodeId, raw: Option<&Value>) -> Result<Decoded, DecodeError> {
        let deps = Deps { registry: self, slots: &self.slots[id] };
        (self.decoders[id])(deps, raw)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("roots", &self.roots)
            .field("types", &self.index.keys().map(ToString::to_string).collect::<Vec<_>>())
            .finish()
    }
}
