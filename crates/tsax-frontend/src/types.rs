//! Structural type table with interning.
//!
//! Every type expression the parser lowers is interned into a `TypeKey`
//! keyed by structure, so equal shapes share a `TypeId`. That gives O(1)
//! type equality and, more importantly here, a canonical identity for the
//! serializer's cycle guard: two occurrences of the same anonymous shape
//! intern to the same id.

use rustc_hash::FxHashMap;

/// Handle into the [`TypeTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    // Intrinsics are pre-registered in this order by `TypeTable::new`.
    pub const ANY: TypeId = TypeId(0);
    pub const STRING: TypeId = TypeId(1);
    pub const NUMBER: TypeId = TypeId(2);
    pub const BOOLEAN: TypeId = TypeId(3);
    pub const NULL: TypeId = TypeId(4);
    pub const UNDEFINED: TypeId = TypeId(5);
    pub const UNKNOWN: TypeId = TypeId(6);
    pub const VOID: TypeId = TypeId(7);
    pub const NEVER: TypeId = TypeId(8);
}

/// Intrinsic type kinds the parser recognizes as keywords.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Unknown,
    Void,
    Never,
}

impl IntrinsicKind {
    pub fn text(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::String => "string",
            IntrinsicKind::Number => "number",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Never => "never",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "any" => IntrinsicKind::Any,
            "string" => IntrinsicKind::String,
            "number" => IntrinsicKind::Number,
            "boolean" => IntrinsicKind::Boolean,
            "null" => IntrinsicKind::Null,
            "undefined" => IntrinsicKind::Undefined,
            "unknown" => IntrinsicKind::Unknown,
            "void" => IntrinsicKind::Void,
            "never" => IntrinsicKind::Never,
            _ => return None,
        })
    }

    fn type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Any => TypeId::ANY,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Number => TypeId::NUMBER,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Undefined => TypeId::UNDEFINED,
            IntrinsicKind::Unknown => TypeId::UNKNOWN,
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Never => TypeId::NEVER,
        }
    }
}

/// Literal type key. Number literals are keyed by bit pattern so the key
/// stays `Eq + Hash`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKey {
    String(String),
    Number(u64),
    Boolean(bool),
}

impl LiteralKey {
    pub fn number(value: f64) -> Self {
        LiteralKey::Number(value.to_bits())
    }

    pub fn number_value(&self) -> Option<f64> {
        match self {
            LiteralKey::Number(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

/// One declared property of an object shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    /// Declared with method shorthand (`name(...): T`).
    pub is_method: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        PropertyInfo {
            name: name.into(),
            type_id,
            is_method: false,
        }
    }

    pub fn method(name: impl Into<String>, type_id: TypeId) -> Self {
        PropertyInfo {
            name: name.into(),
            type_id,
            is_method: true,
        }
    }
}

/// Structural key of an interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Intrinsic(IntrinsicKind),
    Literal(LiteralKey),
    Array(TypeId),
    /// Union members in declaration order.
    Union(Vec<TypeId>),
    /// Object shape with properties in declaration order.
    Object(Vec<PropertyInfo>),
    /// Function or method signature, kept as its source rendering.
    Function(String),
    /// Reference to a named declaration; resolved by the host.
    Ref(String),
    /// Unsupported construct, kept as raw source text for the fallback.
    Opaque(String),
}

/// The interning table.
pub struct TypeTable {
    key_to_id: FxHashMap<TypeKey, TypeId>,
    id_to_key: Vec<TypeKey>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = TypeTable {
            key_to_id: FxHashMap::default(),
            id_to_key: Vec::new(),
        };
        // Keep in sync with the TypeId constants above.
        for kind in [
            IntrinsicKind::Any,
            IntrinsicKind::String,
            IntrinsicKind::Number,
            IntrinsicKind::Boolean,
            IntrinsicKind::Null,
            IntrinsicKind::Undefined,
            IntrinsicKind::Unknown,
            IntrinsicKind::Void,
            IntrinsicKind::Never,
        ] {
            let id = table.intern(TypeKey::Intrinsic(kind));
            debug_assert_eq!(id, kind.type_id());
        }
        table
    }

    pub fn intern(&mut self, key: TypeKey) -> TypeId {
        if let Some(&id) = self.key_to_id.get(&key) {
            return id;
        }
        let id = TypeId(self.id_to_key.len() as u32);
        self.id_to_key.push(key.clone());
        self.key_to_id.insert(key, id);
        id
    }

    pub fn lookup(&self, id: TypeId) -> &TypeKey {
        &self.id_to_key[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_key.is_empty()
    }

    pub fn literal_string(&mut self, value: impl Into<String>) -> TypeId {
        self.intern(TypeKey::Literal(LiteralKey::String(value.into())))
    }

    pub fn literal_number(&mut self, value: f64) -> TypeId {
        self.intern(TypeKey::Literal(LiteralKey::number(value)))
    }

    pub fn literal_boolean(&mut self, value: bool) -> TypeId {
        self.intern(TypeKey::Literal(LiteralKey::Boolean(value)))
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeKey::Array(element))
    }

    /// A single-member union collapses to the member itself.
    pub fn union(&mut self, members: Vec<TypeId>) -> TypeId {
        if members.len() == 1 {
            return members[0];
        }
        self.intern(TypeKey::Union(members))
    }

    pub fn object(&mut self, properties: Vec<PropertyInfo>) -> TypeId {
        self.intern(TypeKey::Object(properties))
    }

    pub fn function(&mut self, signature: impl Into<String>) -> TypeId {
        self.intern(TypeKey::Function(signature.into()))
    }

    pub fn reference(&mut self, name: impl Into<String>) -> TypeId {
        self.intern(TypeKey::Ref(name.into()))
    }

    pub fn opaque(&mut self, text: impl Into<String>) -> TypeId {
        self.intern(TypeKey::Opaque(text.into()))
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}
