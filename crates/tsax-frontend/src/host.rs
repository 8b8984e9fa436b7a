//! `TypeHost` implementation over the interned type table.
//!
//! Named references resolve against the project-wide declaration
//! namespace. Resolution is transparent for identity and for non-record
//! targets: an alias of a union classifies as that union, and a reference
//! shares its target's identity so the cycle guard recognizes
//! `type Node = { next: Node }` on the first revisit.

use rustc_hash::{FxHashMap, FxHashSet};

use tsax_extract::host::{
    LiteralValue, PrimitiveKind, PropertyProbe, TypeClass, TypeHost, TypeIdentity,
};

use crate::types::{IntrinsicKind, LiteralKey, TypeId, TypeKey, TypeTable};

const MAX_RENDER_DEPTH: u32 = 4;

pub struct FrontendHost<'a> {
    table: &'a TypeTable,
    declarations: &'a FxHashMap<String, TypeId>,
}

impl<'a> FrontendHost<'a> {
    pub fn new(table: &'a TypeTable, declarations: &'a FxHashMap<String, TypeId>) -> Self {
        FrontendHost {
            table,
            declarations,
        }
    }

    /// Follow reference chains to the declared type. `None` when a name is
    /// unknown or the chain is circular without structure (type A = B;
    /// type B = A).
    fn resolve(&self, id: TypeId) -> Option<TypeId> {
        let mut current = id;
        let mut seen: FxHashSet<TypeId> = FxHashSet::default();
        while let TypeKey::Ref(name) = self.table.lookup(current) {
            if !seen.insert(current) {
                return None;
            }
            current = *self.declarations.get(name)?;
        }
        Some(current)
    }

    fn render_depth(&self, id: TypeId, depth: u32) -> String {
        if depth > MAX_RENDER_DEPTH {
            return "...".to_string();
        }
        match self.table.lookup(id) {
            TypeKey::Intrinsic(kind) => kind.text().to_string(),
            TypeKey::Literal(LiteralKey::String(s)) => format!("\"{s}\""),
            TypeKey::Literal(lit @ LiteralKey::Number(_)) => {
                format_number(lit.number_value().unwrap_or(0.0))
            }
            TypeKey::Literal(LiteralKey::Boolean(b)) => b.to_string(),
            TypeKey::Array(element) => {
                let inner = self.render_depth(*element, depth + 1);
                if matches!(self.table.lookup(*element), TypeKey::Union(_)) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeKey::Union(members) => members
                .iter()
                .map(|&m| self.render_depth(m, depth + 1))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeKey::Object(props) => {
                let body = props
                    .iter()
                    .map(|p| format!("{}: {}", p.name, self.render_depth(p.type_id, depth + 1)))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{{ {body} }}")
            }
            TypeKey::Function(signature) => signature.clone(),
            TypeKey::Ref(name) => name.clone(),
            TypeKey::Opaque(text) => text.clone(),
        }
    }
}

impl TypeHost for FrontendHost<'_> {
    type Handle = TypeId;

    fn classify(&self, handle: TypeId) -> TypeClass<TypeId> {
        match self.table.lookup(handle) {
            TypeKey::Intrinsic(kind) => match kind {
                IntrinsicKind::Any | IntrinsicKind::Unknown => {
                    TypeClass::Primitive(PrimitiveKind::Any)
                }
                IntrinsicKind::String => TypeClass::Primitive(PrimitiveKind::String),
                IntrinsicKind::Number => TypeClass::Primitive(PrimitiveKind::Number),
                IntrinsicKind::Boolean => TypeClass::Primitive(PrimitiveKind::Boolean),
                IntrinsicKind::Null => TypeClass::Primitive(PrimitiveKind::Null),
                IntrinsicKind::Undefined => TypeClass::Primitive(PrimitiveKind::Undefined),
                // void and never have no schema primitive; render instead
                IntrinsicKind::Void | IntrinsicKind::Never => TypeClass::Opaque,
            },
            TypeKey::Literal(LiteralKey::String(s)) => {
                TypeClass::Literal(LiteralValue::String(s.clone()))
            }
            TypeKey::Literal(lit @ LiteralKey::Number(_)) => {
                TypeClass::Literal(LiteralValue::Number(lit.number_value().unwrap_or(0.0)))
            }
            TypeKey::Literal(LiteralKey::Boolean(b)) => {
                TypeClass::Literal(LiteralValue::Boolean(*b))
            }
            TypeKey::Array(element) => TypeClass::Array(Some(*element)),
            TypeKey::Union(members) => TypeClass::Union(members.clone()),
            TypeKey::Object(_) => TypeClass::Object,
            TypeKey::Function(_) | TypeKey::Opaque(_) => TypeClass::Opaque,
            TypeKey::Ref(name) => match self.resolve(handle) {
                None => TypeClass::Opaque,
                Some(target) => match self.table.lookup(target) {
                    TypeKey::Object(_) => TypeClass::Named(name.clone()),
                    _ => self.classify(target),
                },
            },
        }
    }

    fn identity(&self, handle: TypeId) -> TypeIdentity {
        let canonical = self.resolve(handle).unwrap_or(handle);
        TypeIdentity(canonical.0 as u64)
    }

    fn properties(&self, handle: TypeId) -> Vec<PropertyProbe<TypeId>> {
        let Some(target) = self.resolve(handle) else {
            return Vec::new();
        };
        match self.table.lookup(target) {
            TypeKey::Object(props) => props
                .iter()
                .map(|p| {
                    let resolved = self.resolve(p.type_id).unwrap_or(p.type_id);
                    let is_method =
                        p.is_method || matches!(self.table.lookup(resolved), TypeKey::Function(_));
                    PropertyProbe {
                        name: p.name.clone(),
                        handle: Ok(p.type_id),
                        is_method,
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn render(&self, handle: TypeId) -> String {
        self.render_depth(handle, 0)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
