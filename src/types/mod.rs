//! YANG type resolution
//!
//! Every leaf and leaf-list carries a [`Type`] resolved from its `type`
//! statement. Types hold the structural metadata of the declaration (ranges,
//! patterns, enum members, union members, typedef chains) and convert raw
//! string values to JSON on read.
//!
//! ## Resolution
//!
//! The declared name selects the variant. Built-in names map to their own
//! variant; every other name is a typedef reference and resolves to
//! [`DerivedType`], which requires an inline `typedef` statement.
//!
//! ## Serialization
//!
//! | type | JSON |
//! |------|------|
//! | boolean | bool |
//! | int8..uint64, decimal64 | number |
//! | empty | `""` |
//! | leafref, derived | delegated |
//! | union, everything else | string |
//!
//! Values a numeric or boolean type cannot parse are returned as strings.

mod builtins;
mod derived;
mod facets;
mod scalars;

pub use builtins::{BuiltInType, IntegerKind};
pub use derived::DerivedType;
pub use facets::{Range, RangeBound, RangeInterval};
pub use scalars::{
    BinaryType, BitMember, BitsType, BooleanType, DecimalType, EmptyType, EnumerationMember,
    EnumerationType, IdentityRefType, InstanceIdentifierType, IntegerType, LeafRefType, StringType,
    UnionType,
};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::identities::Identities;
use crate::parsers::Properties;

static NO_PROPERTIES: Lazy<Properties> = Lazy::new(Properties::new);

/// A resolved YANG type
#[derive(Debug, Clone)]
pub enum Type {
    /// binary
    Binary(BinaryType),
    /// bits
    Bits(BitsType),
    /// boolean
    Boolean(BooleanType),
    /// decimal64
    Decimal(DecimalType),
    /// typedef reference
    Derived(DerivedType),
    /// empty
    Empty(EmptyType),
    /// enumeration
    Enumeration(EnumerationType),
    /// identityref
    IdentityRef(IdentityRefType),
    /// instance-identifier
    InstanceIdentifier(InstanceIdentifierType),
    /// int8 through uint64
    Integer(IntegerType),
    /// leafref
    LeafRef(LeafRefType),
    /// string
    String(StringType),
    /// union
    Union(UnionType),
}

impl Type {
    /// Resolve a `type` statement
    pub fn resolve(el: &Element, identities: &Identities) -> Result<Self> {
        let name = el.name.as_deref().unwrap_or_default();

        let resolved = match BuiltInType::from_name(name) {
            Some(BuiltInType::Binary) => Type::Binary(BinaryType::from_element(el)?),
            Some(BuiltInType::Bits) => Type::Bits(BitsType::from_element(el)?),
            Some(BuiltInType::Boolean) => Type::Boolean(BooleanType::from_element(el)?),
            Some(BuiltInType::Decimal64) => Type::Decimal(DecimalType::from_element(el)?),
            Some(BuiltInType::Empty) => Type::Empty(EmptyType::from_element(el)?),
            Some(BuiltInType::Enumeration) => Type::Enumeration(EnumerationType::from_element(el)?),
            Some(BuiltInType::IdentityRef) => {
                Type::IdentityRef(IdentityRefType::from_element(el, identities)?)
            }
            Some(BuiltInType::InstanceIdentifier) => {
                Type::InstanceIdentifier(InstanceIdentifierType::from_element(el)?)
            }
            Some(BuiltInType::Integer(kind)) => Type::Integer(IntegerType::from_element(el, kind)?),
            Some(BuiltInType::LeafRef) => Type::LeafRef(LeafRefType::from_element(el, identities)?),
            Some(BuiltInType::String) => Type::String(StringType::from_element(el)?),
            Some(BuiltInType::Union) => Type::Union(UnionType::from_element(el, identities)?),
            None if !name.is_empty() => Type::Derived(DerivedType::from_element(el, identities)?),
            None => {
                return Err(Error::TypeResolution(
                    "Type constructor not found for unnamed type".to_string(),
                ))
            }
        };

        Ok(resolved)
    }

    /// Declared type name
    pub fn name(&self) -> &str {
        match self {
            Type::Binary(t) => &t.name,
            Type::Bits(t) => &t.name,
            Type::Boolean(t) => &t.name,
            Type::Decimal(t) => &t.name,
            Type::Derived(t) => &t.name,
            Type::Empty(t) => &t.name,
            Type::Enumeration(t) => &t.name,
            Type::IdentityRef(t) => &t.name,
            Type::InstanceIdentifier(t) => &t.name,
            Type::Integer(t) => &t.name,
            Type::LeafRef(t) => &t.name,
            Type::String(t) => &t.name,
            Type::Union(t) => &t.name,
        }
    }

    /// Unrecognized annotations on the type statement
    pub fn other_props(&self) -> &Properties {
        match self {
            Type::Binary(t) => &t.other_props,
            Type::Bits(t) => &t.other_props,
            Type::Boolean(t) => &t.other_props,
            Type::Decimal(t) => &t.other_props,
            Type::Empty(t) => &t.other_props,
            Type::Enumeration(t) => &t.other_props,
            Type::IdentityRef(t) => &t.other_props,
            Type::InstanceIdentifier(t) => &t.other_props,
            Type::Integer(t) => &t.other_props,
            Type::String(t) => &t.other_props,
            Type::LeafRef(t) => &t.other_props,
            Type::Union(t) => &t.other_props,
            Type::Derived(_) => &NO_PROPERTIES,
        }
    }

    /// The first non-derived type, following typedef chains
    pub fn built_in_type(&self) -> &Type {
        match self {
            Type::Derived(t) => t.built_in_type(),
            other => other,
        }
    }

    /// Whether the resolved built-in type is `empty`
    pub fn is_empty_type(&self) -> bool {
        matches!(self.built_in_type(), Type::Empty(_))
    }

    /// Default value contributed by a typedef chain
    pub fn default(&self) -> Option<&str> {
        match self {
            Type::Derived(t) => t.default.as_deref(),
            _ => None,
        }
    }

    /// Units contributed by a typedef chain
    pub fn units(&self) -> Option<&str> {
        match self {
            Type::Derived(t) => t.units.as_deref(),
            _ => None,
        }
    }

    /// Description contributed by a typedef chain
    pub fn description(&self) -> Option<&str> {
        match self {
            Type::Derived(t) => t.description.as_deref(),
            _ => None,
        }
    }

    /// Suggestion reference paths contributed by a typedef
    pub fn suggestion_refs(&self) -> &[String] {
        match self {
            Type::Derived(t) => &t.suggestion_refs,
            _ => &[],
        }
    }

    /// Selectable values for enumerations and identity references
    pub fn options(&self) -> Vec<String> {
        match self.built_in_type() {
            Type::Enumeration(t) => t.options(),
            Type::IdentityRef(t) => t.options.clone(),
            _ => Vec::new(),
        }
    }

    /// Types nested directly inside this one
    pub fn child_types(&self) -> Vec<&Type> {
        match self {
            Type::Derived(t) => vec![t.base_type.as_ref()],
            Type::LeafRef(t) => vec![t.ref_type.as_ref()],
            Type::Union(t) => t.types.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Visit this type, then every nested type depth-first
    pub fn traverse<F: FnMut(&Type)>(&self, visitor: &mut F) {
        visitor(self);
        for child in self.child_types() {
            child.traverse(visitor);
        }
    }

    /// Convert a raw value to JSON, falling back to the raw string
    pub fn serialize(&self, raw: &str) -> Value {
        match self {
            Type::Empty(_) => Value::String(String::new()),
            Type::Derived(t) => t.base_type.serialize(raw),
            Type::LeafRef(t) => t.ref_type.serialize(raw),
            other => other
                .try_serialize(raw)
                .unwrap_or_else(|| Value::String(raw.to_string())),
        }
    }

    /// Convert a raw value to JSON if this type accepts it
    ///
    /// Enumerations accept only declared members and `empty` accepts only the
    /// empty string; string-like types accept anything.
    pub fn try_serialize(&self, raw: &str) -> Option<Value> {
        match self {
            Type::Boolean(_) => BooleanType::convert(raw),
            Type::Decimal(_) => DecimalType::convert(raw),
            Type::Integer(t) => t.convert(raw),
            Type::Empty(_) => raw.is_empty().then(|| Value::String(String::new())),
            Type::Enumeration(t) => t
                .members
                .contains_key(raw)
                .then(|| Value::String(raw.to_string())),
            Type::Derived(t) => t.base_type.try_serialize(raw),
            Type::LeafRef(t) => t.ref_type.try_serialize(raw),
            Type::Union(t) => t.accepts(raw).then(|| Value::String(raw.to_string())),
            Type::Binary(_)
            | Type::Bits(_)
            | Type::IdentityRef(_)
            | Type::InstanceIdentifier(_)
            | Type::String(_) => Some(Value::String(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::PropertyValue;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn resolve(value: serde_json::Value) -> Result<Type> {
        let el = Element::from_value(value).expect("valid element");
        Type::resolve(&el, &Identities::new())
    }

    fn name_id() -> serde_json::Value {
        json!({
            "keyword": "type",
            "name": "t128ext:name-id",
            "children": [{
                "keyword": "typedef",
                "name": "name-id",
                "children": [
                    { "keyword": "description", "text": "A string identifier." },
                    { "keyword": "default", "value": "foo" },
                    { "keyword": "units", "name": "flips" },
                    { "keyword": "suggestionref", "text": "  /authority/router/name\n/authority/tenant/name " },
                    {
                        "keyword": "type",
                        "name": "string",
                        "children": [
                            {
                                "keyword": "pattern",
                                "value": "([a-zA-Z0-9]([a-zA-Z0-9\\-_]){0,61})?[a-zA-Z0-9]",
                                "children": [{ "keyword": "error-message", "value": "Must be alphanumeric" }]
                            },
                            { "keyword": "length", "value": "0..63" }
                        ]
                    }
                ]
            }]
        })
    }

    #[test]
    fn test_boolean_serialize() {
        let t = resolve(json!({ "keyword": "type", "name": "boolean" })).unwrap();
        assert_eq!(t.serialize("true"), json!(true));
        assert_eq!(t.serialize("false"), json!(false));
    }

    #[test]
    fn test_integer_serialize() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "uint8",
            "children": [{ "keyword": "range", "value": "0..7" }]
        }))
        .unwrap();
        assert_eq!(t.serialize("5"), json!(5));
        assert_eq!(t.serialize("five"), json!("five"));

        let Type::Integer(ref int) = t else { panic!("expected integer") };
        assert_eq!(int.kind, IntegerKind::Uint8);
        assert!(int.range.as_ref().unwrap().contains(Decimal::from(7)));
    }

    #[test]
    fn test_decimal_serialize() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "decimal64",
            "children": [{ "keyword": "fraction-digits", "value": "3" }]
        }))
        .unwrap();
        assert_eq!(t.serialize("5.123"), json!(5.123));

        let Type::Decimal(ref dec) = t else { panic!("expected decimal") };
        assert_eq!(dec.fraction_digits, 3);
    }

    #[test]
    fn test_decimal_requires_fraction_digits() {
        let err = resolve(json!({ "keyword": "type", "name": "decimal64" })).unwrap_err();
        assert_eq!(err.to_string(), "decimal64 type must specify fraction-digits.");
    }

    #[test]
    fn test_required_fields() {
        for (name, field) in [
            ("enumeration", "enum"),
            ("bits", "bit"),
            ("identityref", "base"),
            ("leafref", "path"),
            ("union", "type"),
        ] {
            let err = resolve(json!({ "keyword": "type", "name": name })).unwrap_err();
            assert_eq!(err.to_string(), format!("{} type must specify {}.", name, field));
        }
    }

    #[test]
    fn test_empty_serialize() {
        let t = resolve(json!({ "keyword": "type", "name": "empty" })).unwrap();
        assert_eq!(t.serialize(""), json!(""));
        assert!(t.is_empty_type());
    }

    #[test]
    fn test_enumeration() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "enumeration",
            "children": [
                { "keyword": "enum", "name": "enabled", "children": [{ "keyword": "value", "value": "1" }] },
                { "keyword": "enum", "name": "disabled", "children": [{ "keyword": "description", "text": "Off." }] },
                { "keyword": "enum", "name": "legacy", "children": [{ "keyword": "status", "value": "obsolete" }] }
            ]
        }))
        .unwrap();

        assert_eq!(t.options(), vec!["enabled", "disabled"]);
        assert_eq!(t.serialize("disabled"), json!("disabled"));

        let Type::Enumeration(ref e) = t else { panic!("expected enumeration") };
        assert_eq!(e.members["enabled"].value, Some(1));
        assert_eq!(e.members["disabled"].description.as_deref(), Some("Off."));
        assert!(e.members["legacy"].is_obsolete());
    }

    #[test]
    fn test_identityref_options() {
        let mut identities = Identities::new();
        identities.add(
            "routing-protocol",
            crate::identities::Identity {
                name: "bgp".to_string(),
                prefix: "rt".to_string(),
                label: "rt:bgp".to_string(),
                description: None,
            },
        );
        let el = Element::from_value(json!({
            "keyword": "type",
            "name": "identityref",
            "children": [{ "keyword": "base", "name": "rt:routing-protocol" }]
        }))
        .unwrap();
        let t = Type::resolve(&el, &identities).unwrap();

        let Type::IdentityRef(ref idref) = t else { panic!("expected identityref") };
        assert_eq!(idref.base, "routing-protocol");
        assert_eq!(t.options(), vec!["rt:bgp"]);
    }

    #[test]
    fn test_leafref_delegates() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "leafref",
            "children": [
                { "keyword": "path", "value": "../../node/name" },
                { "keyword": "type", "name": "uint32" }
            ]
        }))
        .unwrap();
        assert_eq!(t.serialize("12"), json!(12));

        let Type::LeafRef(ref leafref) = t else { panic!("expected leafref") };
        assert_eq!(leafref.path, "../../node/name");
    }

    #[test]
    fn test_union_serializes_to_string() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "union",
            "children": [
                { "keyword": "type", "name": "uint32" },
                { "keyword": "type", "name": "enumeration", "children": [{ "keyword": "enum", "name": "auto" }] },
                { "keyword": "type", "name": "string" }
            ]
        }))
        .unwrap();

        assert_eq!(t.serialize("42"), json!("42"));
        assert_eq!(t.serialize("042"), json!("042"));
        assert_eq!(t.serialize("auto"), json!("auto"));
        assert_eq!(t.serialize("foo"), json!("foo"));

        let mut count = 0;
        t.traverse(&mut |_| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_union_of_string_and_boolean() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "union",
            "children": [
                { "keyword": "type", "name": "string" },
                { "keyword": "type", "name": "boolean" }
            ]
        }))
        .unwrap();
        assert_eq!(t.serialize("foo"), json!("foo"));
        assert_eq!(t.serialize("true"), json!("true"));
    }

    #[test]
    fn test_nested_union_accepts_member_values() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "union",
            "children": [
                { "keyword": "type", "name": "boolean" },
                {
                    "keyword": "type",
                    "name": "union",
                    "children": [{ "keyword": "type", "name": "enumeration", "children": [{ "keyword": "enum", "name": "auto" }] }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(t.try_serialize("auto"), Some(json!("auto")));
        assert_eq!(t.try_serialize("false"), Some(json!("false")));
        assert_eq!(t.try_serialize("sometimes"), None);
        assert_eq!(t.serialize("sometimes"), json!("sometimes"));
    }

    #[test]
    fn test_union_properties() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "union",
            "children": [
                { "keyword": "type", "name": "string" },
                { "keyword": "help", "text": "free text or a number" }
            ]
        }))
        .unwrap();

        assert_eq!(t.other_props().len(), 1);
        assert_eq!(
            t.other_props().get("help"),
            Some(&PropertyValue::Text("free text or a number".to_string()))
        );
    }

    #[test]
    fn test_leafref_properties() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "leafref",
            "children": [
                { "keyword": "path", "value": "../../node/name" },
                { "keyword": "require-instance", "value": "false" },
                { "keyword": "type", "name": "string" },
                { "keyword": "help", "text": "a node name" }
            ]
        }))
        .unwrap();

        assert_eq!(t.other_props().len(), 1);
        assert_eq!(
            t.other_props().get("help"),
            Some(&PropertyValue::Text("a node name".to_string()))
        );
    }

    #[test]
    fn test_string_facets() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "string",
            "children": [
                { "keyword": "length", "value": "1..5" },
                { "keyword": "pattern", "value": "[a-z]+" },
                { "keyword": "help", "text": "lowercase" }
            ]
        }))
        .unwrap();

        let Type::String(ref s) = t else { panic!("expected string") };
        assert_eq!(s.pattern(), Some("[a-z]+"));
        assert_eq!(s.length.as_ref().unwrap().ranges.len(), 1);
        assert_eq!(
            t.other_props().get("help"),
            Some(&PropertyValue::Text("lowercase".to_string()))
        );
    }

    #[test]
    fn test_derived_type() {
        let t = resolve(name_id()).unwrap();

        assert_eq!(t.name(), "t128ext:name-id");
        assert_eq!(t.default(), Some("foo"));
        assert_eq!(t.units(), Some("flips"));
        assert_eq!(t.description(), Some("A string identifier."));
        assert_eq!(
            t.suggestion_refs(),
            &["/authority/router/name".to_string(), "/authority/tenant/name".to_string()]
        );
        assert!(matches!(t.built_in_type(), Type::String(_)));
        assert_eq!(t.serialize("foo"), json!("foo"));
    }

    #[test]
    fn test_nested_derived_type_inherits() {
        let t = resolve(json!({
            "keyword": "type",
            "name": "t128ext:port",
            "children": [
                { "keyword": "range", "value": "1..1024" },
                {
                    "keyword": "typedef",
                    "name": "port",
                    "children": [{
                        "keyword": "type",
                        "name": "inet:port-number",
                        "children": [{
                            "keyword": "typedef",
                            "name": "port-number",
                            "children": [
                                { "keyword": "default", "value": "80" },
                                { "keyword": "units", "name": "port" },
                                { "keyword": "type", "name": "uint16" }
                            ]
                        }]
                    }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(t.default(), Some("80"));
        assert_eq!(t.units(), Some("port"));
        assert_eq!(t.description(), None);
        assert_eq!(t.serialize("443"), json!(443));

        let Type::Integer(ref int) = t.built_in_type() else { panic!("expected integer") };
        assert!(int.range.is_some());

        let mut count = 0;
        t.traverse(&mut |_| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_unknown_type_without_typedef() {
        let err = resolve(json!({ "keyword": "type", "name": "foo:bar" })).unwrap_err();
        assert_eq!(err.to_string(), "Type constructor not found for foo:bar");
        assert!(err.is_schema_error());
    }
}
