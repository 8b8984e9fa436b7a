//! The recursive type serializer.
//!
//! `serialize_type` never fails: every handle, however exotic, resolves to
//! some [`SchemaValue`] — worst case a free-text rendering of the type's
//! signature. Classification follows a strict precedence order; the first
//! matching rule wins, because most host type representations are
//! multi-faceted (a literal type is also technically an object type) and
//! the algorithm must commit to the most specific applicable view.
//!
//! Two pieces of traversal state with different lifetimes:
//!
//! - [`VisitedPath`]: identities on the current root-to-leaf call chain,
//!   cloned on each descent so siblings sharing a type never trip a
//!   false-positive cycle.
//! - [`ExpansionContext`]: run-scoped; holds the processed-name set and the
//!   lazily populated registry, threaded by `&mut` through every call.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};
use tsax_common::limits::MAX_SERIALIZE_DEPTH;

use crate::host::{LiteralValue, PrimitiveKind, TypeClass, TypeHost, TypeIdentity};
use crate::registry::{ExpandedType, TypeDefinitions, TypeRegistry};
use crate::schema::SchemaValue;

/// Properties whose names start with this prefix are host-internal
/// artifacts, never user data.
const INTERNAL_MARKER_PREFIX: &str = "__";

/// Run-scoped expansion state: which named types have been expanded, and
/// the registry they were expanded into. Created per extraction run and
/// torn down with it.
pub struct ExpansionContext<'a, H> {
    definitions: &'a TypeDefinitions<H>,
    expanded: TypeRegistry,
    processed: FxHashSet<String>,
}

impl<'a, H: Copy + std::fmt::Debug> ExpansionContext<'a, H> {
    pub fn new(definitions: &'a TypeDefinitions<H>) -> Self {
        ExpansionContext {
            definitions,
            expanded: TypeRegistry::new(),
            processed: FxHashSet::default(),
        }
    }

    /// The registry of named types expanded so far.
    pub fn expanded(&self) -> &TypeRegistry {
        &self.expanded
    }

    /// Finish the run, keeping only the expanded registry.
    pub fn into_registry(self) -> TypeRegistry {
        self.expanded
    }

    /// Test-only hook: seed the expanded registry directly.
    #[cfg(test)]
    pub(crate) fn replace_registry(&mut self, registry: TypeRegistry) {
        self.expanded = registry;
    }
}

/// Identities on the current root-to-leaf serialization path.
///
/// Membership reflects only the current path, not siblings. The depth
/// counter backstops hosts whose identities are not canonical, where a
/// cycle could present as an unbounded chain of fresh identities.
#[derive(Clone, Debug, Default)]
struct VisitedPath {
    identities: FxHashSet<TypeIdentity>,
    depth: u32,
}

impl VisitedPath {
    fn root() -> Self {
        VisitedPath::default()
    }
}

/// Expand every definition in the registry, in declaration order.
///
/// Names already expanded as a side effect of an earlier definition's
/// traversal are left as-is (one expansion per name per run).
pub fn expand_definitions<T: TypeHost>(host: &T, ctx: &mut ExpansionContext<'_, T::Handle>) {
    let definitions = ctx.definitions;
    for def in definitions.iter() {
        if ctx.processed.contains(&def.name) {
            continue;
        }
        debug!(name = %def.name, file = %def.source_file, "expanding type definition");
        ctx.processed.insert(def.name.clone());
        let structure = serialize_with(host, Some(def.handle), ctx, VisitedPath::root());
        ctx.expanded.insert(
            def.name.clone(),
            ExpandedType {
                structure,
                file: def.source_file.clone(),
            },
        );
    }
}

/// Serialize one type handle into its schema value.
pub fn serialize_type<T: TypeHost>(
    host: &T,
    handle: Option<T::Handle>,
    ctx: &mut ExpansionContext<'_, T::Handle>,
) -> SchemaValue {
    serialize_with(host, handle, ctx, VisitedPath::root())
}

fn serialize_with<T: TypeHost>(
    host: &T,
    handle: Option<T::Handle>,
    ctx: &mut ExpansionContext<'_, T::Handle>,
    mut visited: VisitedPath,
) -> SchemaValue {
    // Rule 1: absent handle.
    let Some(handle) = handle else {
        return SchemaValue::any();
    };

    // Rule 2: cycle guard. `visited` is this call's own copy; children only
    // ever see clones of it.
    let identity = host.identity(handle);
    if visited.identities.contains(&identity) {
        return SchemaValue::any();
    }
    if visited.depth >= MAX_SERIALIZE_DEPTH {
        warn!(?handle, "serialization depth limit reached; degrading to \"any\"");
        return SchemaValue::any();
    }
    visited.identities.insert(identity);
    visited.depth += 1;

    match host.classify(handle) {
        // Rule 3: primitive kinds.
        TypeClass::Primitive(kind) => SchemaValue::primitive(kind),

        // Rule 4: literal kinds carry their raw value, not a type tag.
        TypeClass::Literal(value) => SchemaValue::literal(value),

        // Rule 5: named record with an unexpanded registry entry. Expansion
        // registers the structure; a name seen again takes the anonymous
        // object path below, which produces the same shape without
        // re-registering.
        TypeClass::Named(name) => {
            let definitions = ctx.definitions;
            if !ctx.processed.contains(&name) {
                if let Some(def) = definitions.get(&name) {
                    let file = def.source_file.clone();
                    ctx.processed.insert(name.clone());
                    let structure = serialize_object(host, handle, ctx, &visited);
                    ctx.expanded.insert(
                        name,
                        ExpandedType {
                            structure: structure.clone(),
                            file,
                        },
                    );
                    return structure;
                }
            }
            serialize_object_or_render(host, handle, ctx, &visited)
        }

        // Rule 6: unions.
        TypeClass::Union(members) => serialize_union(host, &members, ctx, &visited),

        // Rule 7: arrays. A missing element handle degrades to items: "any".
        TypeClass::Array(element) => {
            SchemaValue::Array(Box::new(serialize_with(host, element, ctx, visited.clone())))
        }

        // Rule 8: anonymous object shapes.
        TypeClass::Object => serialize_object_or_render(host, handle, ctx, &visited),

        // Rule 9: fallback free-text signature.
        TypeClass::Opaque => SchemaValue::Text(host.render(handle)),
    }
}

/// Union classification policy:
/// (a) all string literals collapse to an ordered string-enum;
/// (b) a two-member all-boolean-literal union is just `boolean`;
/// (c) otherwise the first non-nullish member wins (optional/nullable
///     unwrapping: `T | undefined` models as `T`);
/// (d) an entirely nullish union degrades to `"any"`.
fn serialize_union<T: TypeHost>(
    host: &T,
    members: &[T::Handle],
    ctx: &mut ExpansionContext<'_, T::Handle>,
    visited: &VisitedPath,
) -> SchemaValue {
    let mut strings = Vec::with_capacity(members.len());
    for &member in members {
        match host.classify(member) {
            TypeClass::Literal(LiteralValue::String(s)) => strings.push(s),
            _ => {
                strings.clear();
                break;
            }
        }
    }
    if !members.is_empty() && strings.len() == members.len() {
        return SchemaValue::StringEnum(strings);
    }

    if members.len() == 2
        && members.iter().all(|&m| {
            matches!(
                host.classify(m),
                TypeClass::Literal(LiteralValue::Boolean(_))
            )
        })
    {
        return SchemaValue::primitive(PrimitiveKind::Boolean);
    }

    for &member in members {
        if !is_nullish(host, member) {
            return serialize_with(host, Some(member), ctx, visited.clone());
        }
    }
    SchemaValue::any()
}

fn is_nullish<T: TypeHost>(host: &T, handle: T::Handle) -> bool {
    matches!(
        host.classify(handle),
        TypeClass::Primitive(PrimitiveKind::Null) | TypeClass::Primitive(PrimitiveKind::Undefined)
    )
}

/// Rule 8 with the rule 9 escape hatch: a handle with no enumerable own
/// properties is not an object shape worth emitting, so it renders as its
/// signature instead.
fn serialize_object_or_render<T: TypeHost>(
    host: &T,
    handle: T::Handle,
    ctx: &mut ExpansionContext<'_, T::Handle>,
    visited: &VisitedPath,
) -> SchemaValue {
    if host.properties(handle).is_empty() {
        return SchemaValue::Text(host.render(handle));
    }
    serialize_object(host, handle, ctx, visited)
}

/// Enumerate own data properties and build an object schema.
///
/// Internal-marker properties and methods are dropped entirely. A property
/// whose type cannot be computed is logged and omitted; its siblings are
/// unaffected and the serialization never aborts.
fn serialize_object<T: TypeHost>(
    host: &T,
    handle: T::Handle,
    ctx: &mut ExpansionContext<'_, T::Handle>,
    visited: &VisitedPath,
) -> SchemaValue {
    let mut object = indexmap::IndexMap::new();
    for probe in host.properties(handle) {
        if probe.name.starts_with(INTERNAL_MARKER_PREFIX) || probe.is_method {
            continue;
        }
        match probe.handle {
            Ok(property) => {
                let schema = serialize_with(host, Some(property), ctx, visited.clone());
                object.insert(probe.name, schema);
            }
            Err(error) => {
                warn!(property = %probe.name, %error, "failed to resolve property type; omitting");
            }
        }
    }
    SchemaValue::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PropertyError, PropertyProbe};
    use crate::registry::TypeDefinition;
    use indexmap::IndexMap;

    /// Hand-built type table standing in for a real frontend.
    #[derive(Default)]
    struct MockHost {
        types: Vec<MockType>,
    }

    enum MockType {
        Prim(PrimitiveKind),
        Lit(LiteralValue),
        Union(Vec<usize>),
        Array(Option<usize>),
        Object(Vec<MockProp>),
        Named(&'static str, Vec<MockProp>),
        Opaque(&'static str),
    }

    struct MockProp {
        name: &'static str,
        handle: Result<usize, &'static str>,
        is_method: bool,
    }

    impl MockProp {
        fn data(name: &'static str, handle: usize) -> Self {
            MockProp {
                name,
                handle: Ok(handle),
                is_method: false,
            }
        }
    }

    impl MockHost {
        fn add(&mut self, ty: MockType) -> usize {
            self.types.push(ty);
            self.types.len() - 1
        }
    }

    impl TypeHost for MockHost {
        type Handle = usize;

        fn classify(&self, handle: usize) -> TypeClass<usize> {
            match &self.types[handle] {
                MockType::Prim(kind) => TypeClass::Primitive(*kind),
                MockType::Lit(value) => TypeClass::Literal(value.clone()),
                MockType::Union(members) => TypeClass::Union(members.clone()),
                MockType::Array(element) => TypeClass::Array(*element),
                MockType::Object(_) => TypeClass::Object,
                MockType::Named(name, _) => TypeClass::Named((*name).to_string()),
                MockType::Opaque(_) => TypeClass::Opaque,
            }
        }

        fn identity(&self, handle: usize) -> TypeIdentity {
            TypeIdentity(handle as u64)
        }

        fn properties(&self, handle: usize) -> Vec<PropertyProbe<usize>> {
            match &self.types[handle] {
                MockType::Object(props) | MockType::Named(_, props) => props
                    .iter()
                    .map(|p| PropertyProbe {
                        name: p.name.to_string(),
                        handle: p.handle.map_err(PropertyError::new),
                        is_method: p.is_method,
                    })
                    .collect(),
                _ => Vec::new(),
            }
        }

        fn render(&self, handle: usize) -> String {
            match &self.types[handle] {
                MockType::Opaque(text) => (*text).to_string(),
                MockType::Named(name, _) => (*name).to_string(),
                _ => format!("#{handle}"),
            }
        }
    }

    fn empty_defs() -> TypeDefinitions<usize> {
        TypeDefinitions::new()
    }

    fn serialize(host: &MockHost, handle: usize) -> SchemaValue {
        let defs = empty_defs();
        let mut ctx = ExpansionContext::new(&defs);
        serialize_type(host, Some(handle), &mut ctx)
    }

    #[test]
    fn absent_handle_is_any() {
        let host = MockHost::default();
        let defs = empty_defs();
        let mut ctx = ExpansionContext::new(&defs);
        assert_eq!(serialize_type(&host, None, &mut ctx), SchemaValue::any());
    }

    #[test]
    fn primitives_map_to_exact_tags() {
        let mut host = MockHost::default();
        let cases = [
            (PrimitiveKind::String, "string"),
            (PrimitiveKind::Number, "number"),
            (PrimitiveKind::Boolean, "boolean"),
            (PrimitiveKind::Null, "null"),
            (PrimitiveKind::Undefined, "undefined"),
            (PrimitiveKind::Any, "any"),
        ];
        for (kind, tag) in cases {
            let h = host.add(MockType::Prim(kind));
            assert_eq!(serialize(&host, h), SchemaValue::Text(tag.to_string()));
        }
    }

    #[test]
    fn literals_keep_their_raw_values() {
        let mut host = MockHost::default();
        let s = host.add(MockType::Lit(LiteralValue::String("up".into())));
        let n = host.add(MockType::Lit(LiteralValue::Number(7.0)));
        let b = host.add(MockType::Lit(LiteralValue::Boolean(true)));
        assert_eq!(serialize(&host, s), SchemaValue::Text("up".into()));
        assert_eq!(serialize(&host, n), SchemaValue::Number(7.0));
        assert_eq!(serialize(&host, b), SchemaValue::Bool(true));
    }

    #[test]
    fn string_literal_union_becomes_ordered_enum() {
        let mut host = MockHost::default();
        let a = host.add(MockType::Lit(LiteralValue::String("a".into())));
        let b = host.add(MockType::Lit(LiteralValue::String("b".into())));
        let c = host.add(MockType::Lit(LiteralValue::String("c".into())));
        let u = host.add(MockType::Union(vec![a, b, c]));
        assert_eq!(
            serialize(&host, u),
            SchemaValue::StringEnum(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn boolean_literal_pair_collapses_to_boolean() {
        let mut host = MockHost::default();
        let t = host.add(MockType::Lit(LiteralValue::Boolean(true)));
        let f = host.add(MockType::Lit(LiteralValue::Boolean(false)));
        let u = host.add(MockType::Union(vec![t, f]));
        assert_eq!(serialize(&host, u), SchemaValue::Text("boolean".into()));
    }

    #[test]
    fn optional_union_unwraps_to_inner_type() {
        let mut host = MockHost::default();
        let string = host.add(MockType::Prim(PrimitiveKind::String));
        let undefined = host.add(MockType::Prim(PrimitiveKind::Undefined));
        let u = host.add(MockType::Union(vec![string, undefined]));
        assert_eq!(serialize(&host, u), serialize(&host, string));

        // nullish-first orderings unwrap the same way
        let u2 = host.add(MockType::Union(vec![undefined, string]));
        assert_eq!(serialize(&host, u2), SchemaValue::Text("string".into()));
    }

    #[test]
    fn all_nullish_union_is_any() {
        let mut host = MockHost::default();
        let null = host.add(MockType::Prim(PrimitiveKind::Null));
        let undefined = host.add(MockType::Prim(PrimitiveKind::Undefined));
        let u = host.add(MockType::Union(vec![null, undefined]));
        assert_eq!(serialize(&host, u), SchemaValue::any());
    }

    #[test]
    fn arrays_nest_recursively() {
        let mut host = MockHost::default();
        let string = host.add(MockType::Prim(PrimitiveKind::String));
        let inner = host.add(MockType::Array(Some(string)));
        let outer = host.add(MockType::Array(Some(inner)));
        assert_eq!(
            serialize(&host, outer),
            SchemaValue::Array(Box::new(SchemaValue::Array(Box::new(SchemaValue::Text(
                "string".into()
            )))))
        );
    }

    #[test]
    fn missing_array_element_degrades_to_any_items() {
        let mut host = MockHost::default();
        let arr = host.add(MockType::Array(None));
        assert_eq!(
            serialize(&host, arr),
            SchemaValue::Array(Box::new(SchemaValue::any()))
        );
    }

    #[test]
    fn self_referential_named_type_terminates() {
        // type Node = { next: Node }
        let mut host = MockHost::default();
        let node = host.add(MockType::Named("Node", vec![MockProp::data("next", 0)]));
        assert_eq!(node, 0);

        let mut defs = TypeDefinitions::new();
        defs.insert(TypeDefinition {
            name: "Node".into(),
            handle: node,
            source_file: "node.ts".into(),
        });
        let mut ctx = ExpansionContext::new(&defs);
        expand_definitions(&host, &mut ctx);

        let mut expected = IndexMap::new();
        expected.insert("next".to_string(), SchemaValue::any());
        let entry = ctx.expanded().get("Node").unwrap();
        assert_eq!(entry.structure, SchemaValue::Object(expected));
        assert_eq!(entry.file, "node.ts");
    }

    #[test]
    fn diamond_references_expand_independently() {
        // Two siblings referencing the same named type, no cycle.
        let mut host = MockHost::default();
        let number = host.add(MockType::Prim(PrimitiveKind::Number));
        let shared = host.add(MockType::Named("Shared", vec![MockProp::data("x", number)]));
        let parent = host.add(MockType::Object(vec![
            MockProp::data("left", shared),
            MockProp::data("right", shared),
        ]));

        let mut defs = TypeDefinitions::new();
        defs.insert(TypeDefinition {
            name: "Shared".into(),
            handle: shared,
            source_file: "shared.ts".into(),
        });
        let mut ctx = ExpansionContext::new(&defs);
        let result = serialize_type(&host, Some(parent), &mut ctx);

        let mut shared_schema = IndexMap::new();
        shared_schema.insert("x".to_string(), SchemaValue::Text("number".into()));
        let mut expected = IndexMap::new();
        expected.insert("left".to_string(), SchemaValue::Object(shared_schema.clone()));
        expected.insert("right".to_string(), SchemaValue::Object(shared_schema.clone()));
        assert_eq!(result, SchemaValue::Object(expected));

        // the named type was registered exactly once as a side effect
        assert_eq!(
            ctx.expanded().get("Shared").unwrap().structure,
            SchemaValue::Object(shared_schema)
        );
    }

    #[test]
    fn failing_property_is_dropped_siblings_survive() {
        let mut host = MockHost::default();
        let string = host.add(MockType::Prim(PrimitiveKind::String));
        let obj = host.add(MockType::Object(vec![
            MockProp::data("good", string),
            MockProp {
                name: "bad",
                handle: Err("type resolution exploded"),
                is_method: false,
            },
            MockProp::data("alsoGood", string),
        ]));

        let mut expected = IndexMap::new();
        expected.insert("good".to_string(), SchemaValue::Text("string".into()));
        expected.insert("alsoGood".to_string(), SchemaValue::Text("string".into()));
        assert_eq!(serialize(&host, obj), SchemaValue::Object(expected));
    }

    #[test]
    fn methods_and_internal_properties_are_dropped() {
        let mut host = MockHost::default();
        let string = host.add(MockType::Prim(PrimitiveKind::String));
        let obj = host.add(MockType::Object(vec![
            MockProp::data("name", string),
            MockProp {
                name: "save",
                handle: Ok(string),
                is_method: true,
            },
            MockProp::data("__internal", string),
        ]));

        let mut expected = IndexMap::new();
        expected.insert("name".to_string(), SchemaValue::Text("string".into()));
        assert_eq!(serialize(&host, obj), SchemaValue::Object(expected));
    }

    #[test]
    fn propertyless_handle_falls_back_to_rendering() {
        let mut host = MockHost::default();
        let opaque = host.add(MockType::Opaque("Map<string, number>"));
        assert_eq!(
            serialize(&host, opaque),
            SchemaValue::Text("Map<string, number>".into())
        );
    }

    #[test]
    fn mutual_cycle_between_named_types_terminates() {
        // type A = { b: B }; type B = { a: A }
        let mut host = MockHost::default();
        let a = host.add(MockType::Named("A", vec![MockProp::data("b", 1)]));
        let b = host.add(MockType::Named("B", vec![MockProp::data("a", 0)]));
        assert_eq!((a, b), (0, 1));

        let mut defs = TypeDefinitions::new();
        defs.insert(TypeDefinition {
            name: "A".into(),
            handle: a,
            source_file: "ab.ts".into(),
        });
        defs.insert(TypeDefinition {
            name: "B".into(),
            handle: b,
            source_file: "ab.ts".into(),
        });
        let mut ctx = ExpansionContext::new(&defs);
        expand_definitions(&host, &mut ctx);

        let registry = ctx.into_registry();
        assert!(registry.get("A").is_some());
        assert!(registry.get("B").is_some());

        let mut inner = IndexMap::new();
        inner.insert("a".to_string(), SchemaValue::any());
        let mut outer = IndexMap::new();
        outer.insert("b".to_string(), SchemaValue::Object(inner));
        assert_eq!(registry.get("A").unwrap().structure, SchemaValue::Object(outer));
    }

    #[test]
    fn deterministic_across_runs() {
        let mut host = MockHost::default();
        let string = host.add(MockType::Prim(PrimitiveKind::String));
        let number = host.add(MockType::Prim(PrimitiveKind::Number));
        let obj = host.add(MockType::Object(vec![
            MockProp::data("id", number),
            MockProp::data("tag", string),
        ]));

        let first = serialize(&host, obj);
        let second = serialize(&host, obj);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
