//! YANG built-in types
//!
//! The closed set of type names YANG defines. Any other type name refers to a
//! typedef and resolves to a derived type.

use std::fmt;

// =============================================================================
// Type names
// =============================================================================

/// binary type name
pub const YANG_BINARY: &str = "binary";
/// bits type name
pub const YANG_BITS: &str = "bits";
/// boolean type name
pub const YANG_BOOLEAN: &str = "boolean";
/// decimal64 type name
pub const YANG_DECIMAL64: &str = "decimal64";
/// empty type name
pub const YANG_EMPTY: &str = "empty";
/// enumeration type name
pub const YANG_ENUMERATION: &str = "enumeration";
/// identityref type name
pub const YANG_IDENTITYREF: &str = "identityref";
/// instance-identifier type name
pub const YANG_INSTANCE_IDENTIFIER: &str = "instance-identifier";
/// leafref type name
pub const YANG_LEAFREF: &str = "leafref";
/// string type name
pub const YANG_STRING: &str = "string";
/// union type name
pub const YANG_UNION: &str = "union";

/// Width and signedness of an integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    /// int8
    Int8,
    /// int16
    Int16,
    /// int32
    Int32,
    /// int64
    Int64,
    /// uint8
    Uint8,
    /// uint16
    Uint16,
    /// uint32
    Uint32,
    /// uint64
    Uint64,
}

impl IntegerKind {
    /// Parse an integer type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int8" => Some(IntegerKind::Int8),
            "int16" => Some(IntegerKind::Int16),
            "int32" => Some(IntegerKind::Int32),
            "int64" => Some(IntegerKind::Int64),
            "uint8" => Some(IntegerKind::Uint8),
            "uint16" => Some(IntegerKind::Uint16),
            "uint32" => Some(IntegerKind::Uint32),
            "uint64" => Some(IntegerKind::Uint64),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegerKind::Int8 => "int8",
            IntegerKind::Int16 => "int16",
            IntegerKind::Int32 => "int32",
            IntegerKind::Int64 => "int64",
            IntegerKind::Uint8 => "uint8",
            IntegerKind::Uint16 => "uint16",
            IntegerKind::Uint32 => "uint32",
            IntegerKind::Uint64 => "uint64",
        }
    }

    /// Whether the kind admits negative values
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntegerKind::Int8 | IntegerKind::Int16 | IntegerKind::Int32 | IntegerKind::Int64
        )
    }
}

/// A YANG built-in type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInType {
    /// binary
    Binary,
    /// bits
    Bits,
    /// boolean
    Boolean,
    /// decimal64
    Decimal64,
    /// empty
    Empty,
    /// enumeration
    Enumeration,
    /// identityref
    IdentityRef,
    /// instance-identifier
    InstanceIdentifier,
    /// int8 through uint64
    Integer(IntegerKind),
    /// leafref
    LeafRef,
    /// string
    String,
    /// union
    Union,
}

impl BuiltInType {
    /// Look up a built-in type by name; `None` for typedef references
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            YANG_BINARY => BuiltInType::Binary,
            YANG_BITS => BuiltInType::Bits,
            YANG_BOOLEAN => BuiltInType::Boolean,
            YANG_DECIMAL64 => BuiltInType::Decimal64,
            YANG_EMPTY => BuiltInType::Empty,
            YANG_ENUMERATION => BuiltInType::Enumeration,
            YANG_IDENTITYREF => BuiltInType::IdentityRef,
            YANG_INSTANCE_IDENTIFIER => BuiltInType::InstanceIdentifier,
            YANG_LEAFREF => BuiltInType::LeafRef,
            YANG_STRING => BuiltInType::String,
            YANG_UNION => BuiltInType::Union,
            other => BuiltInType::Integer(IntegerKind::from_name(other)?),
        };
        Some(builtin)
    }

    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltInType::Binary => YANG_BINARY,
            BuiltInType::Bits => YANG_BITS,
            BuiltInType::Boolean => YANG_BOOLEAN,
            BuiltInType::Decimal64 => YANG_DECIMAL64,
            BuiltInType::Empty => YANG_EMPTY,
            BuiltInType::Enumeration => YANG_ENUMERATION,
            BuiltInType::IdentityRef => YANG_IDENTITYREF,
            BuiltInType::InstanceIdentifier => YANG_INSTANCE_IDENTIFIER,
            BuiltInType::Integer(kind) => kind.as_str(),
            BuiltInType::LeafRef => YANG_LEAFREF,
            BuiltInType::String => YANG_STRING,
            BuiltInType::Union => YANG_UNION,
        }
    }
}

impl fmt::Display for BuiltInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
