//! TypeScript declaration frontend.
//!
//! Implements the two collaborators the extraction core consumes:
//!
//! - **source discovery**: [`scanner`] and [`parser`] turn a source file
//!   into exported type declarations and exported functions with attached
//!   leading comments;
//! - **type system**: [`types`] interns every lowered type expression into
//!   a structural table, and [`host::FrontendHost`] exposes it through the
//!   core's `TypeHost` trait.
//!
//! [`project::Project`] ties both together across the files of a run.

pub mod host;
pub mod parser;
pub mod project;
pub mod scanner;
pub mod types;

pub use host::FrontendHost;
pub use parser::{DeclKind, ParseError, ParsedModule, TypeDeclRecord, parse_module};
pub use project::Project;
pub use types::{IntrinsicKind, LiteralKey, PropertyInfo, TypeId, TypeKey, TypeTable};
