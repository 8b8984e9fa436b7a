//! The type-system collaborator boundary.
//!
//! The extraction core never looks inside a host type system. It sees types
//! through opaque handles and asks the host to classify them into a closed
//! set of variants, checked exhaustively by the serializer. This keeps the
//! core independent of any particular frontend and makes it testable with a
//! hand-built table of type shapes.

use std::fmt;

/// Stable identity of a type, used by the cycle guard.
///
/// The host must return the same identity for every occurrence of the same
/// type. Structural interning (the frontend's approach) satisfies this for
/// anonymous shapes too, so a revisit on the current serialization path is
/// always recognized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeIdentity(pub u64);

/// Primitive kinds the schema language distinguishes.
///
/// `unknown` is folded into `Any` by hosts; the schema tags them identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
}

impl PrimitiveKind {
    /// The schema tag emitted for this primitive.
    pub fn tag(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Any => "any",
        }
    }
}

/// A literal value type (string literal, number literal, boolean literal).
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// Classification of a type handle.
///
/// Mirrors the serializer's precedence rules: the host commits to the most
/// specific applicable variant (a string-literal type classifies as
/// `Literal`, not as the object type it also happens to be).
#[derive(Clone, Debug)]
pub enum TypeClass<H> {
    /// Intrinsic primitive kind.
    Primitive(PrimitiveKind),
    /// Literal value type.
    Literal(LiteralValue),
    /// Union type with member handles in declaration order.
    Union(Vec<H>),
    /// Array type; `None` when the element type cannot be extracted.
    Array(Option<H>),
    /// Named, non-builtin record type declared in the project.
    Named(String),
    /// Anonymous object shape with enumerable own properties.
    Object,
    /// Anything else; rendered via [`TypeHost::render`] as a fallback.
    Opaque,
}

/// Failure to compute one property's type.
///
/// Modeled as a value so the object-building step can collect successes and
/// log-and-omit failures without aborting the enclosing serialization.
#[derive(Clone, Debug)]
pub struct PropertyError {
    pub message: String,
}

impl PropertyError {
    pub fn new(message: impl Into<String>) -> Self {
        PropertyError {
            message: message.into(),
        }
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// One own property of an object-shaped type.
#[derive(Clone, Debug)]
pub struct PropertyProbe<H> {
    pub name: String,
    /// The property's type handle, or the reason it could not be computed.
    pub handle: Result<H, PropertyError>,
    /// Whether the property's type exposes call signatures (a method).
    pub is_method: bool,
}

/// The type-system collaborator consumed by the serializer.
pub trait TypeHost {
    /// Opaque reference into the host type system. Borrowed, never owned.
    type Handle: Copy + fmt::Debug;

    /// Classify a handle into the closed variant set.
    fn classify(&self, handle: Self::Handle) -> TypeClass<Self::Handle>;

    /// Stable identity for cycle detection. Named references and their
    /// resolved targets must share an identity.
    fn identity(&self, handle: Self::Handle) -> TypeIdentity;

    /// Enumerate own properties (data properties and methods) in
    /// declaration order. Empty for non-object-shaped handles.
    fn properties(&self, handle: Self::Handle) -> Vec<PropertyProbe<Self::Handle>>;

    /// Human-readable rendering used as the last-resort schema value.
    fn render(&self, handle: Self::Handle) -> String;
}
