//! JSON-compatible structural schema values.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::host::{LiteralValue, PrimitiveKind};

/// The structural description produced for a type handle.
///
/// Always JSON-serializable; never holds a type handle. Object property
/// order is insertion order, which the serializer keeps equal to
/// declaration order.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaValue {
    /// Primitive tag, string-literal value, or fallback type signature.
    Text(String),
    /// Numeric-literal value.
    Number(f64),
    /// Boolean-literal value.
    Bool(bool),
    /// Union of string literals, in declaration order.
    StringEnum(Vec<String>),
    /// Array descriptor; serializes as `{"type":"array","items":…}`.
    Array(Box<SchemaValue>),
    /// Object shape: property name to schema.
    Object(IndexMap<String, SchemaValue>),
}

impl SchemaValue {
    /// The `"any"` schema: the safe degradation for absent handles,
    /// broken cycles, and all-nullish unions.
    pub fn any() -> Self {
        SchemaValue::Text("any".to_string())
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaValue::Text(kind.tag().to_string())
    }

    /// A literal type's raw value, not its type tag.
    pub fn literal(value: LiteralValue) -> Self {
        match value {
            LiteralValue::String(s) => SchemaValue::Text(s),
            LiteralValue::Number(n) => SchemaValue::Number(n),
            LiteralValue::Boolean(b) => SchemaValue::Bool(b),
        }
    }
}

impl Serialize for SchemaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaValue::Text(s) => serializer.serialize_str(s),
            SchemaValue::Number(n) => {
                // Integral literals print without a fractional part.
                if n.fract() == 0.0 && n.is_finite() && n.abs() <= i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            SchemaValue::Bool(b) => serializer.serialize_bool(*b),
            SchemaValue::StringEnum(values) => values.serialize(serializer),
            SchemaValue::Array(items) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items.as_ref())?;
                map.end()
            }
            SchemaValue::Object(props) => props.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(value: &SchemaValue) -> String {
        serde_json::to_string(value).unwrap()
    }

    #[test]
    fn primitive_tags_serialize_as_strings() {
        assert_eq!(to_json(&SchemaValue::primitive(PrimitiveKind::String)), "\"string\"");
        assert_eq!(to_json(&SchemaValue::any()), "\"any\"");
    }

    #[test]
    fn integral_number_literals_have_no_fraction() {
        assert_eq!(to_json(&SchemaValue::Number(42.0)), "42");
        assert_eq!(to_json(&SchemaValue::Number(1.5)), "1.5");
    }

    #[test]
    fn array_descriptor_shape() {
        let arr = SchemaValue::Array(Box::new(SchemaValue::Text("string".into())));
        assert_eq!(to_json(&arr), r#"{"type":"array","items":"string"}"#);
    }

    #[test]
    fn object_preserves_insertion_order() {
        let mut props = IndexMap::new();
        props.insert("zeta".to_string(), SchemaValue::Text("number".into()));
        props.insert("alpha".to_string(), SchemaValue::Bool(true));
        assert_eq!(
            to_json(&SchemaValue::Object(props)),
            r#"{"zeta":"number","alpha":true}"#
        );
    }

    #[test]
    fn string_enum_is_an_ordered_sequence() {
        let e = SchemaValue::StringEnum(vec!["b".into(), "a".into()]);
        assert_eq!(to_json(&e), r#"["b","a"]"#);
    }
}
