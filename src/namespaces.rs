//! Namespace handling
//!
//! Every schema node belongs to exactly one module and therefore carries the
//! module's prefix and namespace URI. The data model also keeps a map of all
//! prefixes declared by the modules of the loaded document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{Error, Result, SchemaError};

/// YIN statement namespace
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";

/// NETCONF base namespace, used by the `operation` edit attribute
pub const NETCONF_BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// YANG namespace, used by the `insert`/`value`/`key` position attributes
pub const YANG_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:1";

/// Namespace of a schema node: module prefix plus URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// Module prefix
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Resolve the namespace of the module containing `el`
    pub fn of_element(el: &Element) -> Result<Self> {
        let module = el.containing_module().ok_or_else(|| {
            Error::Schema(
                SchemaError::new("Statement is not contained in a module")
                    .with_keyword(el.keyword.as_str())
                    .with_path(el.name_or_empty()),
            )
        })?;

        let uri = module.namespace_uri().ok_or_else(|| {
            Error::Schema(
                SchemaError::new(format!(
                    "Module prefix '{}' has no namespace mapping",
                    module.prefix
                ))
                .with_path(el.name_or_empty()),
            )
        })?;

        Ok(Self::new(module.prefix.as_str(), uri))
    }
}

/// Prefix to namespace URI mappings collected across modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceMap {
    prefixes: IndexMap<String, String>,
}

impl NamespaceMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect each module's own prefix binding from a parse tree
    pub fn collect(doc: &Element) -> Self {
        let mut map = Self::new();

        for module in doc.collect_child_modules() {
            if let Some(ref prefix) = module.module_prefix {
                let uri = module.nsmap.as_ref().and_then(|nsmap| nsmap.get(prefix));
                if let Some(uri) = uri {
                    map.add_prefix(prefix.as_str(), uri.as_str());
                }
            }
        }

        map
    }

    /// Bind a prefix to a namespace URI
    pub fn add_prefix(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), uri.into());
    }

    /// Look up the URI bound to a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Iterate over prefix/URI pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Number of bound prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefix is bound
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Element {
        Element::from_value(json!({
            "keyword": "data",
            "children": [
                {
                    "keyword": "module",
                    "module-prefix": "t128",
                    "nsmap": { "t128": "urn:t128", "yin": YIN_NAMESPACE },
                    "children": [{ "keyword": "leaf", "name": "a" }]
                },
                {
                    "keyword": "module",
                    "module-prefix": "sys",
                    "nsmap": { "sys": "urn:sys" }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_namespace_of_element() {
        let doc = doc();
        let leaf = &doc.children[0].children[0];
        assert_eq!(Namespace::of_element(leaf).unwrap(), Namespace::new("t128", "urn:t128"));
        assert!(Namespace::of_element(&doc).is_err());
    }

    #[test]
    fn test_collect_namespaces() {
        let map = NamespaceMap::collect(&doc());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_namespace("sys"), Some("urn:sys"));
        assert_eq!(map.get_namespace("yin"), None);
    }
}
