//! Name → descriptor resolution scope.
use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::{Descriptor, EnumDef, RecordDef};

/// The namespace `Deferred` names are resolved against.
///
/// Entries keep their definition order, which keeps graph and CLI output
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: IndexMap<String, Descriptor>,
}

impl Scope {
    pub fn new() -> Self { Self::default() }

    /// Bind `name` to `descriptor`, replacing any previous binding.
    pub fn define(&mut self, name: impl Into<String>, descriptor: Descriptor) -> &mut Self {
        self.entries.insert(name.into(), descriptor);
        self
    }

    /// Bind a record under its own name and return a descriptor for it.
    pub fn define_record(&mut self, def: RecordDef) -> Descriptor {
        let name = def.name.clone();
        let descriptor = Descriptor::Record(Arc::new(def));
        self.entries.insert(name, descriptor.clone());
        descriptor
    }

    pub fn define_enum(&mut self, def: EnumDef) -> Descriptor {
        let name = def.name.clone();
        let descriptor = Descriptor::Enumeration(Arc::new(def));
        self.entries.insert(name, descriptor.clone());
        descriptor
    }

    pub fn resolve(&self, name: &str) -> Option<&Descriptor> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
