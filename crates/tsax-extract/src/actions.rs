//! Action extraction: exported functions flagged with the marker comment.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use tsax_common::comments::clean_comment_text;

use crate::schema::SchemaValue;
use crate::serialize::{ExpansionContext, serialize_type};
use crate::host::TypeHost;

/// The marker token that flags an exported function as an action.
pub const ACTION_MARKER: &str = "@action";

/// One declared function parameter, as supplied by the source-discovery
/// collaborator.
#[derive(Clone, Debug)]
pub struct ParameterDecl<H> {
    pub name: String,
    /// The declared type's name when the annotation is a bare named
    /// reference; enables the registry short-circuit.
    pub type_name: Option<String>,
    /// The parameter's type handle; `None` for untyped parameters.
    pub handle: Option<H>,
}

/// An exported function declaration with its attached leading comment.
#[derive(Clone, Debug)]
pub struct FunctionDecl<H> {
    pub name: String,
    /// Raw text of the leading comment, delimiters included.
    pub leading_comment: Option<String>,
    pub params: Vec<ParameterDecl<H>>,
    pub source_file: String,
}

/// An extracted action. Immutable once built; ordering follows source
/// scan order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: IndexMap<String, SchemaValue>,
    pub module: String,
}

/// Scan function declarations for the marker and build action descriptors.
///
/// Parameter schemas reuse an already-expanded registry entry when the
/// declared type name matches one; everything else serializes directly.
pub fn extract_actions<T: TypeHost>(
    host: &T,
    functions: &[FunctionDecl<T::Handle>],
    ctx: &mut ExpansionContext<'_, T::Handle>,
) -> Vec<ActionDescriptor> {
    let mut actions = Vec::new();
    for function in functions {
        let Some(comment) = function.leading_comment.as_deref() else {
            continue;
        };
        if !comment.contains(ACTION_MARKER) {
            continue;
        }
        debug!(name = %function.name, file = %function.source_file, "extracting action");

        let mut parameters = IndexMap::new();
        for param in &function.params {
            let reused = param
                .type_name
                .as_deref()
                .and_then(|name| ctx.expanded().get(name))
                .map(|entry| entry.structure.clone());
            let schema = match reused {
                Some(structure) => structure,
                None => serialize_type(host, param.handle, ctx),
            };
            parameters.insert(param.name.clone(), schema);
        }

        actions.push(ActionDescriptor {
            name: function.name.clone(),
            description: derive_description(comment, &function.name),
            parameters,
            module: function.source_file.clone(),
        });
    }
    actions
}

/// Comment text minus delimiters and the marker token, whitespace
/// normalized; an empty result falls back to `Execute <name>`.
fn derive_description(raw_comment: &str, function_name: &str) -> String {
    let cleaned = clean_comment_text(raw_comment);
    let without_marker = cleaned.replace(ACTION_MARKER, " ");
    let description = without_marker
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if description.is_empty() {
        format!("Execute {function_name}")
    } else {
        description
    }
}
