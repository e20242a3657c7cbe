//! Edit attributes
//!
//! Configuration payloads may wrap any value in an envelope carrying NETCONF
//! edit metadata:
//!
//! ```json
//! { "_value": { "name": "r1" }, "_operation": "delete" }
//! ```
//!
//! The envelope is detected once at the binding boundary and turned into a
//! flat list of namespaced [`Attribute`]s stored on the instance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{NodeType, SchemaRef};
use crate::names::kebab_case;
use crate::namespaces::{NETCONF_BASE_NAMESPACE, YANG_NAMESPACE};

use super::path::Key;

const VALUE_KEY: &str = "_value";
const ATTRIBUTES_KEY: &str = "_attributes";
const OPERATION_KEY: &str = "_operation";
const POSITION_KEY: &str = "_position";

/// A namespaced attribute attached to an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: String,
    /// Namespace prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Namespace URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Attribute {
    /// An attribute without namespace
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            prefix: None,
            href: None,
        }
    }

    /// Set the namespace prefix and URI
    pub fn with_namespace(mut self, prefix: impl Into<String>, href: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self.href = Some(href.into());
        self
    }

    fn yang(name: &str, value: impl Into<String>) -> Self {
        Self::new(name, value).with_namespace("yang", YANG_NAMESPACE)
    }
}

/// NETCONF edit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetconfOperation {
    /// create
    Create,
    /// merge
    Merge,
    /// replace
    Replace,
    /// remove
    Remove,
    /// delete
    Delete,
}

impl NetconfOperation {
    /// Operation keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            NetconfOperation::Create => "create",
            NetconfOperation::Merge => "merge",
            NetconfOperation::Replace => "replace",
            NetconfOperation::Remove => "remove",
            NetconfOperation::Delete => "delete",
        }
    }

    /// The `xc:operation` attribute for this operation
    pub fn to_attribute(&self) -> Attribute {
        Attribute::new("operation", self.as_str()).with_namespace("xc", NETCONF_BASE_NAMESPACE)
    }
}

/// Insertion point for ordered lists and leaf-lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Insert {
    /// first
    First,
    /// last
    Last,
    /// before
    Before,
    /// after
    After,
}

impl Insert {
    /// Insert keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Insert::First => "first",
            Insert::Last => "last",
            Insert::Before => "before",
            Insert::After => "after",
        }
    }
}

/// Position metadata of an ordered entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Where to insert
    pub insert: Insert,
    /// Anchor item of a leaf-list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Anchor entry keys of a list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<Key>>,
}

impl Position {
    /// Translate into `yang:` attributes for a node of the given schema
    pub fn to_attributes(&self, schema: SchemaRef<'_>) -> Result<Vec<Attribute>> {
        let node_type = schema.node_type();
        if node_type != NodeType::List && node_type != NodeType::LeafList {
            return Err(Error::Instance(
                "Position attributes can only be added to lists or leaf lists.".to_string(),
            ));
        }

        let mut attributes = vec![Attribute::yang("insert", self.insert.as_str())];

        if let Some(ref value) = self.value {
            if node_type != NodeType::LeafList {
                return Err(Error::Instance(
                    "Value can only be provided as the position of a leaf list.".to_string(),
                ));
            }
            attributes.push(Attribute::yang("value", value.as_str()));
        }

        if let Some(ref keys) = self.keys {
            if node_type != NodeType::List {
                return Err(Error::Instance(
                    "Keys can only be provided as the position to a list.".to_string(),
                ));
            }

            let key_nodes = schema.key_nodes();
            let mut predicate = String::new();

            for Key { key, value } in keys {
                let key_node = key_nodes.iter().find(|k| k.name() == key.as_str()).ok_or_else(|| {
                    Error::Instance(format!("Provided key {} not found for list {}.", key, schema.name()))
                })?;

                predicate.push_str(&format!(
                    "[{}:{}='{}']",
                    key_node.namespace().prefix,
                    kebab_case(key),
                    value
                ));
            }

            attributes.push(Attribute::yang("key", predicate));
        }

        Ok(attributes)
    }
}

/// Payload value wrapped with edit metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<'v> {
    /// Wrapped value; `null` when absent
    pub value: &'v Value,
    /// Caller supplied attributes
    pub attributes: Vec<Attribute>,
    /// Edit operation
    pub operation: Option<NetconfOperation>,
    /// Position metadata
    pub position: Option<Position>,
}

/// A payload value, plain or enveloped
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue<'v> {
    /// A bare value
    Plain(&'v Value),
    /// A value wrapped with edit metadata
    Enveloped(Envelope<'v>),
}

static NULL: Value = Value::Null;

impl<'v> ConfigValue<'v> {
    /// Classify a payload value
    ///
    /// An object is an envelope when it has any of the `_value`,
    /// `_attributes`, `_operation` or `_position` members.
    pub fn parse(raw: &'v Value) -> Result<Self> {
        let obj = match raw.as_object() {
            Some(obj)
                if [VALUE_KEY, ATTRIBUTES_KEY, OPERATION_KEY, POSITION_KEY]
                    .iter()
                    .any(|k| obj.contains_key(*k)) =>
            {
                obj
            }
            _ => return Ok(ConfigValue::Plain(raw)),
        };

        let attributes = match obj.get(ATTRIBUTES_KEY) {
            Some(v) if !v.is_null() => serde_json::from_value(v.clone())?,
            _ => Vec::new(),
        };
        let operation = match obj.get(OPERATION_KEY) {
            Some(v) if !v.is_null() => Some(serde_json::from_value(v.clone())?),
            _ => None,
        };
        let position = match obj.get(POSITION_KEY) {
            Some(v) if !v.is_null() => Some(serde_json::from_value(v.clone())?),
            _ => None,
        };

        Ok(ConfigValue::Enveloped(Envelope {
            value: obj.get(VALUE_KEY).unwrap_or(&NULL),
            attributes,
            operation,
            position,
        }))
    }

    /// The wrapped value
    pub fn value(&self) -> &'v Value {
        match self {
            ConfigValue::Plain(v) => v,
            ConfigValue::Enveloped(e) => e.value,
        }
    }

    /// Flatten the edit metadata into attributes for a node of `schema`
    ///
    /// Caller supplied attributes come first, then the operation, then the
    /// position attributes.
    pub fn attributes(&self, schema: SchemaRef<'_>) -> Result<Vec<Attribute>> {
        let envelope = match self {
            ConfigValue::Plain(_) => return Ok(Vec::new()),
            ConfigValue::Enveloped(e) => e,
        };

        let mut attributes = envelope.attributes.clone();

        if let Some(operation) = envelope.operation {
            attributes.push(operation.to_attribute());
        }

        if let Some(ref position) = envelope.position {
            attributes.extend(position.to_attributes(schema)?);
        }

        Ok(attributes)
    }
}
