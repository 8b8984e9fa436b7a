//! Action and type-schema extraction core.
//!
//! Given a host type system (behind the [`host::TypeHost`] trait) and the
//! exported declarations of a project, this crate:
//!
//! 1. expands every exported named type into a JSON-compatible structural
//!    schema ([`serialize`]),
//! 2. extracts actions — exported functions whose leading comment carries
//!    the `@action` marker — with per-parameter schemas ([`actions`]),
//! 3. assembles both into the output document ([`document`]).
//!
//! The serializer is total: classification failures degrade to localized
//! `"any"` or free-text fallbacks, never abort the run. Only the final
//! document write can fail.

pub mod actions;
pub mod document;
pub mod host;
pub mod registry;
pub mod schema;
pub mod serialize;

pub use actions::{ACTION_MARKER, ActionDescriptor, FunctionDecl, ParameterDecl, extract_actions};
pub use document::{ActionsDocument, OUTPUT_FILE_NAME};
pub use host::{
    LiteralValue, PrimitiveKind, PropertyError, PropertyProbe, TypeClass, TypeHost, TypeIdentity,
};
pub use registry::{ExpandedType, TypeDefinition, TypeDefinitions, TypeRegistry};
pub use schema::SchemaValue;
pub use serialize::{ExpansionContext, expand_definitions, serialize_type};
