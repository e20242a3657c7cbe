//! Schema parse tree
//!
//! A compiled YANG module set is exported as nested JSON, one object per YIN
//! statement. [`Element`] is the generic, read-only navigable form of that
//! export. Two facts that depend on ancestors are computed once when the
//! tree is loaded: whether a `when` statement applies to the element or any
//! ancestor, and which module the element belongs to.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The module an element was declared in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name
    pub name: Option<String>,
    /// Module prefix
    pub prefix: String,
    /// Prefix to namespace URI mappings declared by the module
    pub nsmap: IndexMap<String, String>,
}

impl ModuleInfo {
    /// Namespace URI bound to the module's own prefix
    pub fn namespace_uri(&self) -> Option<&str> {
        self.nsmap.get(&self.prefix).map(String::as_str)
    }
}

/// A single statement of the schema parse tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Element {
    /// Statement keyword (`container`, `leaf`, `type`, ...)
    pub keyword: String,
    /// Statement namespace
    #[serde(default)]
    pub namespace: String,
    /// Namespace declarations (present on module statements)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsmap: Option<IndexMap<String, String>>,
    /// Sub-statements in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    /// `value` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// `name` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `text` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `tag` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// `target-node` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
    /// `context-node` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_node: Option<String>,
    /// `module` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// `condition` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// `date` argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Name of the module this statement opens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Prefix of the module this statement opens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_prefix: Option<String>,

    #[serde(skip)]
    has_when_ancestor_or_self: bool,
    #[serde(skip)]
    containing_module: Option<Arc<ModuleInfo>>,
}

impl Element {
    /// Parse an exported schema from a JSON string
    pub fn from_json_str(text: &str) -> Result<Self> {
        let element: Element = serde_json::from_str(text)?;
        Ok(element.linked())
    }

    /// Build a parse tree from an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let element: Element = serde_json::from_value(value)?;
        Ok(element.linked())
    }

    fn linked(mut self) -> Self {
        self.link(false, None);
        self
    }

    fn link(&mut self, parent_has_when: bool, parent_module: Option<Arc<ModuleInfo>>) {
        self.has_when_ancestor_or_self =
            parent_has_when || self.children.iter().any(|c| c.keyword == "when");

        self.containing_module = match self.module_prefix {
            Some(ref prefix) => Some(Arc::new(ModuleInfo {
                name: self.module_name.clone(),
                prefix: prefix.clone(),
                nsmap: self.nsmap.clone().unwrap_or_default(),
            })),
            None => parent_module,
        };

        let has_when = self.has_when_ancestor_or_self;
        for child in &mut self.children {
            child.link(has_when, self.containing_module.clone());
        }
    }

    /// Whether this statement or any ancestor carries a `when` statement
    pub fn has_when_ancestor_or_self(&self) -> bool {
        self.has_when_ancestor_or_self
    }

    /// The nearest enclosing module, including this statement itself
    pub fn containing_module(&self) -> Option<&ModuleInfo> {
        self.containing_module.as_deref()
    }

    /// Name argument, or an empty string
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Find the first child with the given keyword
    pub fn find_child(&self, keyword: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.keyword == keyword)
    }

    /// Find the first child with the given keyword in the given namespace
    pub fn find_child_ns(&self, keyword: &str, namespace: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.keyword == keyword && c.namespace == namespace)
    }

    /// Find every child with the given keyword
    pub fn find_children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.keyword == keyword)
    }

    /// Find a direct child by keyword and name argument
    pub fn find_named_child(&self, keyword: &str, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.keyword == keyword && c.name.as_deref() == Some(name))
    }

    /// Find a direct child by name argument regardless of keyword
    pub fn find_by_name(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name.as_deref() == Some(name))
    }

    /// Follow a chain of name arguments down from this statement
    pub fn descend(&self, names: &[&str]) -> Option<&Element> {
        names
            .iter()
            .try_fold(self, |el, name| el.find_by_name(name))
    }

    /// `value` argument of the first child with the given keyword
    pub fn child_value(&self, keyword: &str) -> Option<&str> {
        self.find_child(keyword).and_then(|c| c.value.as_deref())
    }

    /// `text` argument of the first child with the given keyword
    pub fn child_text(&self, keyword: &str) -> Option<&str> {
        self.find_child(keyword).and_then(|c| c.text.as_deref())
    }

    /// `name` argument of the first child with the given keyword
    pub fn child_name(&self, keyword: &str) -> Option<&str> {
        self.find_child(keyword).and_then(|c| c.name.as_deref())
    }

    /// Every statement in this subtree that opens a module, in document order
    pub fn collect_child_modules(&self) -> Vec<&Element> {
        let mut modules = Vec::new();
        self.collect_modules_into(&mut modules);
        modules
    }

    fn collect_modules_into<'a>(&'a self, modules: &mut Vec<&'a Element>) {
        if self.module_prefix.is_some() {
            modules.push(self);
        }

        for child in &self.children {
            child.collect_modules_into(modules);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Element {
        Element::from_value(json!({
            "keyword": "module",
            "namespace": "urn:ietf:params:xml:ns:yang:yin:1",
            "module-prefix": "t128",
            "module-name": "t128-config",
            "nsmap": { "t128": "http://128technology.com/t128-config" },
            "children": [
                {
                    "keyword": "container",
                    "name": "authority",
                    "children": [
                        { "keyword": "when", "condition": "../enabled = 'true'" },
                        { "keyword": "leaf", "name": "name" }
                    ]
                },
                { "keyword": "leaf", "name": "enabled" }
            ]
        }))
        .expect("valid element")
    }

    #[test]
    fn test_find_child() {
        let el = sample();
        assert_eq!(el.find_child("container").map(|c| c.name_or_empty()), Some("authority"));
        assert!(el.find_child("list").is_none());
        assert_eq!(el.find_children("leaf").count(), 1);
        assert!(el.find_named_child("leaf", "enabled").is_some());
    }

    #[test]
    fn test_when_inheritance() {
        let el = sample();
        let authority = el.find_child("container").unwrap();
        let name = authority.find_child("leaf").unwrap();
        let enabled = el.find_child("leaf").unwrap();

        assert!(authority.has_when_ancestor_or_self());
        assert!(name.has_when_ancestor_or_self());
        assert!(!enabled.has_when_ancestor_or_self());
    }

    #[test]
    fn test_containing_module() {
        let el = sample();
        let name = el.find_child("container").unwrap().find_child("leaf").unwrap();
        let module = name.containing_module().expect("module");

        assert_eq!(module.prefix, "t128");
        assert_eq!(module.namespace_uri(), Some("http://128technology.com/t128-config"));
        assert_eq!(el.collect_child_modules().len(), 1);
    }

    #[test]
    fn test_from_json_str() {
        let el = Element::from_json_str(r#"{"keyword":"leaf","name":"x","target-node":"/a"}"#).unwrap();
        assert_eq!(el.target_node.as_deref(), Some("/a"));
        assert!(el.containing_module().is_none());
    }
}
