//! Instance paths
//!
//! A path addresses one node of an instance tree as a sequence of named
//! segments. List segments carry key values selecting one entry; a
//! leaf-list segment may carry a value selecting one item.

use serde::{Deserialize, Serialize};

/// A key leaf name and its value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Key leaf name
    pub key: String,
    /// Key value
    pub value: String,
}

impl Key {
    /// Create a key
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One step of a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    /// Schema name of the node
    pub name: String,
    /// Key values selecting a list entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<Key>>,
    /// Value selecting a leaf-list item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PathSegment {
    /// A plain named segment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: None,
            value: None,
        }
    }

    /// Add list key values
    pub fn with_keys(mut self, keys: Vec<Key>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Add a single list key value
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.get_or_insert_with(Vec::new).push(Key::new(key, value));
        self
    }

    /// Add a leaf-list item value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// XPath step for this segment
    pub fn to_xpath(&self) -> String {
        let mut step = format!("*[local-name()='{}']", self.name);

        if let Some(ref keys) = self.keys {
            let predicate = keys
                .iter()
                .map(|Key { key, value }| format!("*[local-name()='{}']='{}'", key, value))
                .collect::<Vec<_>>()
                .join(" and ");
            step.push('[');
            step.push_str(&predicate);
            step.push(']');
        }

        step
    }
}

/// Ordered segments from the root of an instance tree
pub type Path = Vec<PathSegment>;

/// Render a path as an XPath expression below the `config` element
pub fn path_to_xpath(path: &[PathSegment]) -> String {
    let steps = path
        .iter()
        .map(PathSegment::to_xpath)
        .collect::<Vec<_>>()
        .join("/");

    format!("//*[local-name()='config']/{}", steps)
}

/// Dotted registry path of the schema node a path addresses
pub fn path_to_model_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| segment.name.as_str())
        .collect::<Vec<_>>()
        .join(".")
}
