//! Built-in type definitions
//!
//! One struct per built-in YANG type. Each is built from its `type`
//! statement, checks its mandatory sub-statements, and knows how to turn a
//! raw string value into JSON.

use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::element::Element;
use crate::error::{Error, Result};
use crate::identities::Identities;
use crate::names::local_name;
use crate::parsers::{parse_description, parse_properties, parse_reference, parse_status, Properties, Status};

use super::builtins::{
    IntegerKind, YANG_BITS, YANG_DECIMAL64, YANG_ENUMERATION, YANG_IDENTITYREF, YANG_LEAFREF, YANG_UNION,
};
use super::facets::Range;
use super::Type;

fn type_name(el: &Element) -> String {
    el.name_or_empty().to_string()
}

fn require<'a>(el: &'a Element, type_name: &str, field: &str) -> Result<&'a Element> {
    el.find_child(field)
        .ok_or_else(|| Error::required_field(type_name, field))
}

fn require_instance(el: &Element) -> Option<bool> {
    el.child_value("require-instance").map(|v| v == "true")
}

// ============================================================================
// String-like types
// ============================================================================

/// binary
#[derive(Debug, Clone)]
pub struct BinaryType {
    /// Declared type name
    pub name: String,
    /// Allowed lengths
    pub length: Option<Range>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl BinaryType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            name: type_name(el),
            length: Range::from_child(el, "length")?,
            other_props: parse_properties(el, &["length"]),
        })
    }
}

/// string
#[derive(Debug, Clone)]
pub struct StringType {
    /// Declared type name
    pub name: String,
    /// Allowed lengths
    pub length: Option<Range>,
    /// Patterns the value must match, in declaration order
    pub patterns: Vec<String>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl StringType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            name: type_name(el),
            length: Range::from_child(el, "length")?,
            patterns: el
                .find_children("pattern")
                .filter_map(|p| p.value.clone())
                .collect(),
            other_props: parse_properties(el, &["length", "pattern"]),
        })
    }

    /// The first declared pattern
    pub fn pattern(&self) -> Option<&str> {
        self.patterns.first().map(String::as_str)
    }
}

/// instance-identifier
#[derive(Debug, Clone)]
pub struct InstanceIdentifierType {
    /// Declared type name
    pub name: String,
    /// Whether the referenced instance must exist
    pub require_instance: Option<bool>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl InstanceIdentifierType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            name: type_name(el),
            require_instance: require_instance(el),
            other_props: parse_properties(el, &["require-instance"]),
        })
    }
}

// ============================================================================
// Scalar types
// ============================================================================

/// boolean
#[derive(Debug, Clone)]
pub struct BooleanType {
    /// Declared type name
    pub name: String,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl BooleanType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            name: type_name(el),
            other_props: parse_properties(el, &[]),
        })
    }

    /// Convert `"true"`/`"false"`
    pub fn convert(raw: &str) -> Option<Value> {
        match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

/// empty
#[derive(Debug, Clone)]
pub struct EmptyType {
    /// Declared type name
    pub name: String,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl EmptyType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            name: type_name(el),
            other_props: parse_properties(el, &[]),
        })
    }
}

/// int8 through uint64
#[derive(Debug, Clone)]
pub struct IntegerType {
    /// Declared type name
    pub name: String,
    /// Width and signedness
    pub kind: IntegerKind,
    /// Allowed values
    pub range: Option<Range>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl IntegerType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element, kind: IntegerKind) -> Result<Self> {
        Ok(Self {
            name: type_name(el),
            kind,
            range: Range::from_child(el, "range")?,
            other_props: parse_properties(el, &["range"]),
        })
    }

    /// Parse the raw value as a JSON number
    pub fn convert(&self, raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if self.kind.is_signed() {
            raw.parse::<i64>().ok().map(Value::from)
        } else {
            raw.parse::<u64>().ok().map(Value::from)
        }
    }
}

/// decimal64
#[derive(Debug, Clone)]
pub struct DecimalType {
    /// Declared type name
    pub name: String,
    /// Number of digits after the decimal point
    pub fraction_digits: u8,
    /// Allowed values
    pub range: Option<Range>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl DecimalType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        let digits = require(el, YANG_DECIMAL64, "fraction-digits")?;
        let fraction_digits = digits
            .value
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| Error::required_field(YANG_DECIMAL64, "fraction-digits"))?;

        Ok(Self {
            name: type_name(el),
            fraction_digits,
            range: Range::from_child(el, "range")?,
            other_props: parse_properties(el, &["range", "fraction-digits"]),
        })
    }

    /// Parse the raw value as a JSON number
    pub fn convert(raw: &str) -> Option<Value> {
        let value = Decimal::from_str(raw.trim()).ok()?;
        value.to_f64().and_then(Number::from_f64).map(Value::Number)
    }
}

// ============================================================================
// Named-member types
// ============================================================================

/// A member of an enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationMember {
    /// Assigned integer value
    pub value: Option<i64>,
    /// Description text
    pub description: Option<String>,
    /// Reference text
    pub reference: Option<String>,
    /// Lifecycle status
    pub status: Status,
}

impl EnumerationMember {
    /// Build from an `enum` statement
    pub fn from_element(el: &Element) -> Self {
        Self {
            value: el.child_value("value").and_then(|v| v.trim().parse().ok()),
            description: parse_description(el),
            reference: parse_reference(el),
            status: parse_status(el).unwrap_or(Status::Current),
        }
    }

    /// Whether the member may no longer be used
    pub fn is_obsolete(&self) -> bool {
        self.status == Status::Obsolete
    }
}

/// enumeration
#[derive(Debug, Clone)]
pub struct EnumerationType {
    /// Declared type name
    pub name: String,
    /// Members keyed by name, in declaration order
    pub members: IndexMap<String, EnumerationMember>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl EnumerationType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        require(el, YANG_ENUMERATION, "enum")?;

        let members = el
            .find_children("enum")
            .map(|e| (e.name_or_empty().to_string(), EnumerationMember::from_element(e)))
            .collect();

        Ok(Self {
            name: type_name(el),
            members,
            other_props: parse_properties(el, &["enum"]),
        })
    }

    /// Selectable member names, excluding obsolete members
    pub fn options(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|(_, member)| !member.is_obsolete())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// A bit of a bits type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMember {
    /// Bit name
    pub name: String,
    /// Assigned position
    pub position: Option<u32>,
    /// Description text
    pub description: Option<String>,
    /// Lifecycle status
    pub status: Status,
}

/// bits
#[derive(Debug, Clone)]
pub struct BitsType {
    /// Declared type name
    pub name: String,
    /// Bits in declaration order
    pub bits: Vec<BitMember>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl BitsType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        require(el, YANG_BITS, "bit")?;

        let bits = el
            .find_children("bit")
            .map(|b| BitMember {
                name: b.name_or_empty().to_string(),
                position: b.child_value("position").and_then(|v| v.trim().parse().ok()),
                description: parse_description(b),
                status: parse_status(b).unwrap_or(Status::Current),
            })
            .collect();

        Ok(Self {
            name: type_name(el),
            bits,
            other_props: parse_properties(el, &["bit"]),
        })
    }
}

// ============================================================================
// Reference types
// ============================================================================

/// identityref
#[derive(Debug, Clone)]
pub struct IdentityRefType {
    /// Declared type name
    pub name: String,
    /// Base identity, without its module prefix
    pub base: String,
    /// Labels of the identities derived from the base
    pub options: Vec<String>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl IdentityRefType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element, identities: &Identities) -> Result<Self> {
        let base = require(el, YANG_IDENTITYREF, "base")?
            .name
            .as_deref()
            .map(local_name)
            .ok_or_else(|| Error::required_field(YANG_IDENTITYREF, "base"))?
            .to_string();

        Ok(Self {
            name: type_name(el),
            options: identities.get_options(&base),
            base,
            other_props: parse_properties(el, &["base"]),
        })
    }
}

/// leafref
#[derive(Debug, Clone)]
pub struct LeafRefType {
    /// Declared type name
    pub name: String,
    /// Path of the referenced leaf
    pub path: String,
    /// Type of the referenced leaf
    pub ref_type: Box<Type>,
    /// Whether the referenced instance must exist
    pub require_instance: Option<bool>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl LeafRefType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element, identities: &Identities) -> Result<Self> {
        let path = require(el, YANG_LEAFREF, "path")?
            .value
            .clone()
            .ok_or_else(|| Error::required_field(YANG_LEAFREF, "path"))?;
        let ref_type = Type::resolve(require(el, YANG_LEAFREF, "type")?, identities)?;

        Ok(Self {
            name: type_name(el),
            path,
            ref_type: Box::new(ref_type),
            require_instance: require_instance(el),
            other_props: parse_properties(el, &["type", "path", "require-instance"]),
        })
    }
}

/// union
#[derive(Debug, Clone)]
pub struct UnionType {
    /// Declared type name
    pub name: String,
    /// Member types in declaration order; never empty
    pub types: Vec<Type>,
    /// Unrecognized annotations
    pub other_props: Properties,
}

impl UnionType {
    /// Build from a `type` statement
    pub fn from_element(el: &Element, identities: &Identities) -> Result<Self> {
        let types = el
            .find_children("type")
            .map(|t| Type::resolve(t, identities))
            .collect::<Result<Vec<_>>>()?;

        if types.is_empty() {
            return Err(Error::required_field(YANG_UNION, "type"));
        }

        Ok(Self {
            name: type_name(el),
            types,
            other_props: parse_properties(el, &["type"]),
        })
    }

    /// Whether any member type accepts the raw value
    pub fn accepts(&self, raw: &str) -> bool {
        self.types.iter().any(|t| t.try_serialize(raw).is_some())
    }
}
