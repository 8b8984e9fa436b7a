//! Named type definitions and the run-scoped expanded registry.

use indexmap::IndexMap;
use serde::Serialize;

use crate::schema::SchemaValue;

/// An exported named type declaration recorded by the registry builder.
///
/// Created once per run, read-only afterward.
#[derive(Clone, Debug)]
pub struct TypeDefinition<H> {
    pub name: String,
    pub handle: H,
    pub source_file: String,
}

/// Mapping from exported type name to its declaration.
///
/// Insertion-ordered; duplicate names overwrite earlier entries (last
/// declaration wins), an intentional simplification rather than a merge.
#[derive(Clone, Debug, Default)]
pub struct TypeDefinitions<H> {
    entries: IndexMap<String, TypeDefinition<H>>,
}

impl<H> TypeDefinitions<H> {
    pub fn new() -> Self {
        TypeDefinitions {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, definition: TypeDefinition<H>) {
        self.entries.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition<H>> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition<H>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named type expanded into its structural schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpandedType {
    pub structure: SchemaValue,
    pub file: String,
}

/// The run-scoped registry of expanded named types.
///
/// Each name is expanded at most once per run; discarded after the output
/// document is written.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    entries: IndexMap<String, ExpandedType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: String, expanded: ExpandedType) {
        self.entries.insert(name, expanded);
    }

    pub fn get(&self, name: &str) -> Option<&ExpandedType> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExpandedType)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
