//! Centralized limits and thresholds.
//!
//! Centralizing these values prevents duplicate definitions with
//! inconsistent numbers and documents the rationale for each limit.

/// Maximum recursion depth for schema serialization.
///
/// The serializer's visited-path set is the primary cycle guard; the depth
/// limit is a backstop for hosts whose type identities are not canonical,
/// where a cycle could present as an unbounded chain of fresh identities.
/// Exceeding the limit degrades the subtree to the `"any"` schema.
pub const MAX_SERIALIZE_DEPTH: u32 = 64;

/// Maximum nesting depth for the declaration parser.
///
/// Prevents stack overflow on pathologically nested type expressions
/// (e.g. thousands of parenthesized or array suffixes). A file exceeding
/// the limit fails to parse and is skipped with a warning.
pub const MAX_TYPE_NESTING_DEPTH: u32 = 128;
