//! Project-wide declaration namespace built from parsed modules.

use rustc_hash::FxHashMap;
use tracing::warn;

use tsax_extract::actions::FunctionDecl;
use tsax_extract::registry::{TypeDefinition, TypeDefinitions};

use crate::host::FrontendHost;
use crate::parser::parse_module;
use crate::types::{TypeId, TypeTable};

/// Accumulates declarations across all source files of one extraction run.
///
/// Names live in a single flat namespace; a redeclared name overwrites the
/// earlier one (last declaration wins). Exported type declarations
/// additionally enter the definition registry.
pub struct Project {
    table: TypeTable,
    declarations: FxHashMap<String, TypeId>,
    definitions: TypeDefinitions<TypeId>,
    functions: Vec<FunctionDecl<TypeId>>,
}

impl Project {
    pub fn new() -> Self {
        Project {
            table: TypeTable::new(),
            declarations: FxHashMap::default(),
            definitions: TypeDefinitions::new(),
            functions: Vec::new(),
        }
    }

    /// Parse one source file into the project. A file that cannot be
    /// parsed is skipped with a warning; registry building never fails
    /// the run. Returns whether the file was accepted.
    pub fn add_source(&mut self, file: &str, source: &str) -> bool {
        match parse_module(&mut self.table, source, file) {
            Ok(module) => {
                for decl in module.types {
                    self.declarations.insert(decl.name.clone(), decl.type_id);
                    if decl.exported {
                        self.definitions.insert(TypeDefinition {
                            name: decl.name,
                            handle: decl.type_id,
                            source_file: file.to_string(),
                        });
                    }
                }
                self.functions.extend(module.functions);
                true
            }
            Err(error) => {
                warn!(file, %error, "skipping unparseable source file");
                false
            }
        }
    }

    /// Exported named type declarations, insertion order.
    pub fn definitions(&self) -> &TypeDefinitions<TypeId> {
        &self.definitions
    }

    /// Exported functions in file order, then declaration order.
    pub fn functions(&self) -> &[FunctionDecl<TypeId>] {
        &self.functions
    }

    pub fn host(&self) -> FrontendHost<'_> {
        FrontendHost::new(&self.table, &self.declarations)
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsax_extract::extract_actions;
    use tsax_extract::schema::SchemaValue;
    use tsax_extract::serialize::{ExpansionContext, expand_definitions};

    fn project_of(sources: &[(&str, &str)]) -> Project {
        let mut project = Project::new();
        for (file, source) in sources {
            assert!(project.add_source(file, source), "failed to parse {file}");
        }
        project
    }

    fn json(value: &SchemaValue) -> String {
        serde_json::to_string(value).unwrap()
    }

    #[test]
    fn exported_record_expands_in_registry() {
        let project = project_of(&[(
            "user.ts",
            "export interface User { id: number; tags: string[] }",
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        let registry = ctx.into_registry();
        let entry = registry.get("User").expect("User expanded");
        assert_eq!(
            json(&entry.structure),
            r#"{"id":"number","tags":{"type":"array","items":"string"}}"#
        );
        assert_eq!(entry.file, "user.ts");
    }

    #[test]
    fn alias_of_union_classifies_as_enum_through_reference() {
        let project = project_of(&[(
            "dir.ts",
            r#"
export type Direction = "up" | "down" | "left";
export interface Move { direction: Direction }
"#,
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        let registry = ctx.into_registry();
        assert_eq!(
            json(&registry.get("Direction").unwrap().structure),
            r#"["up","down","left"]"#
        );
        assert_eq!(
            json(&registry.get("Move").unwrap().structure),
            r#"{"direction":["up","down","left"]}"#
        );
    }

    #[test]
    fn self_referential_declaration_terminates() {
        let project = project_of(&[("node.ts", "export interface Node { next: Node }")]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        assert_eq!(
            json(&ctx.into_registry().get("Node").unwrap().structure),
            r#"{"next":"any"}"#
        );
    }

    #[test]
    fn diamond_reference_expands_both_siblings() {
        let project = project_of(&[(
            "diamond.ts",
            "
export interface Leaf { value: string }
export interface Pair { left: Leaf; right: Leaf }
",
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        assert_eq!(
            json(&ctx.into_registry().get("Pair").unwrap().structure),
            r#"{"left":{"value":"string"},"right":{"value":"string"}}"#
        );
    }

    #[test]
    fn cross_file_references_resolve() {
        let project = project_of(&[
            ("types.ts", "export interface Payload { id: number }"),
            (
                "api.ts",
                "// @action\nexport function submit(payload: Payload) {}",
            ),
        ]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        let actions = extract_actions(&host, project.functions(), &mut ctx);
        assert_eq!(actions.len(), 1);
        assert_eq!(
            json(actions[0].parameters.get("payload").unwrap()),
            r#"{"id":"number"}"#
        );
        assert_eq!(actions[0].module, "api.ts");
    }

    #[test]
    fn methods_are_dropped_from_schemas() {
        let project = project_of(&[(
            "api.ts",
            "export interface Client { base: string; request(path: string): string; onDone: () => void }",
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        assert_eq!(
            json(&ctx.into_registry().get("Client").unwrap().structure),
            r#"{"base":"string"}"#
        );
    }

    #[test]
    fn duplicate_names_last_declaration_wins() {
        let project = project_of(&[
            ("a.ts", "export interface Thing { old: string }"),
            ("b.ts", "export interface Thing { fresh: number }"),
        ]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        assert_eq!(
            json(&ctx.into_registry().get("Thing").unwrap().structure),
            r#"{"fresh":"number"}"#
        );
    }

    #[test]
    fn unparseable_file_is_skipped_others_survive() {
        let mut project = Project::new();
        assert!(!project.add_source("bad.ts", "export type Broken = ;"));
        assert!(project.add_source("good.ts", "export type Ok = string;"));
        assert_eq!(project.definitions().len(), 1);
    }

    #[test]
    fn unknown_reference_falls_back_to_its_name() {
        let project = project_of(&[(
            "t.ts",
            "export interface W { at: Date }",
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        assert_eq!(
            json(&ctx.into_registry().get("W").unwrap().structure),
            r#"{"at":"Date"}"#
        );
    }

    #[test]
    fn optional_parameter_union_unwraps() {
        let project = project_of(&[(
            "f.ts",
            "// @action\nexport function retry(count: number | undefined) {}",
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        let actions = extract_actions(&host, project.functions(), &mut ctx);
        assert_eq!(json(actions[0].parameters.get("count").unwrap()), r#""number""#);
    }

    #[test]
    fn circular_alias_chain_renders_opaque() {
        let project = project_of(&[("c.ts", "export type A = B; export type B = A;")]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        expand_definitions(&host, &mut ctx);
        let registry = ctx.into_registry();
        // no structure to recover; both degrade to their rendered names
        assert_eq!(json(&registry.get("A").unwrap().structure), r#""B""#);
        assert_eq!(json(&registry.get("B").unwrap().structure), r#""A""#);
    }

    #[test]
    fn serialize_parameter_directly_without_registry() {
        let project = project_of(&[(
            "inline.ts",
            "// @action\nexport function tag(input: { name: string; level: 1 | 2 }) {}",
        )]);
        let host = project.host();
        let mut ctx = ExpansionContext::new(project.definitions());
        let actions = extract_actions(&host, project.functions(), &mut ctx);
        let schema = actions[0].parameters.get("input").unwrap();
        // a non-string-literal union keeps its first member
        assert_eq!(json(schema), r#"{"name":"string","level":1}"#);
    }
}
