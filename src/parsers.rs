//! Statement parsers
//!
//! Small readers for the sub-statements shared by schema nodes and types:
//! status, visibility, descriptions, element bounds, uniqueness groups,
//! `when` conditions and the free-form property bag.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::element::Element;
use crate::names::{camel_case, collapse_line_breaks};

// ============================================================================
// Enumerations
// ============================================================================

/// Lifecycle status of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// In active use
    Current,
    /// Still supported, scheduled for removal
    Deprecated,
    /// No longer supported
    Obsolete,
}

impl Status {
    /// Parse a status argument
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "current" => Some(Status::Current),
            "deprecated" => Some(Status::Deprecated),
            "obsolete" => Some(Status::Obsolete),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Current => "current",
            Status::Deprecated => "deprecated",
            Status::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Presentation hint attached through the `visibility` extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Shown everywhere
    Visible,
    /// Never shown
    Hidden,
    /// Shown in advanced views
    Advanced,
    /// Unreleased functionality
    Prototype,
}

impl Visibility {
    /// Parse a visibility argument
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(Visibility::Visible),
            "hidden" => Some(Visibility::Hidden),
            "advanced" => Some(Visibility::Advanced),
            "prototype" => Some(Visibility::Prototype),
            _ => None,
        }
    }

    /// Whether a node with this visibility is shown
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible | Visibility::Advanced)
    }
}

/// Ordering mode of a list or leaf-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderedBy {
    /// The server decides the order
    #[default]
    System,
    /// The client decides the order
    User,
}

impl OrderedBy {
    /// Parse an ordered-by argument
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(OrderedBy::System),
            "user" => Some(OrderedBy::User),
            _ => None,
        }
    }
}

/// A `when` condition attached to a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct When {
    /// XPath condition
    pub condition: String,
    /// Context node the condition is evaluated against
    pub context: Option<String>,
}

/// Value of a free-form property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Text carried by the statement
    Text(String),
    /// Statement present without an argument
    Flag(bool),
}

/// Property bag - camelCased keyword to value
pub type Properties = IndexMap<String, PropertyValue>;

/// Unique map - leaf name to the leaves it is co-unique with
pub type UniqueMap = IndexMap<String, Vec<String>>;

// ============================================================================
// Parsers
// ============================================================================

/// Parse the `visibility` sub-statement
pub fn parse_visibility(el: &Element) -> Option<Visibility> {
    el.child_text("visibility").and_then(Visibility::parse)
}

/// Parse the `status` sub-statement
pub fn parse_status(el: &Element) -> Option<Status> {
    el.child_value("status").and_then(Status::parse)
}

/// Parse the `description` sub-statement, joining its lines
pub fn parse_description(el: &Element) -> Option<String> {
    el.child_text("description")
        .filter(|text| !text.is_empty())
        .map(collapse_line_breaks)
}

/// Parse the `reference` sub-statement, joining its lines
pub fn parse_reference(el: &Element) -> Option<String> {
    el.child_text("reference")
        .filter(|text| !text.is_empty())
        .map(collapse_line_breaks)
}

/// Parse `max-elements`; `None` means unbounded
pub fn parse_max_elements(el: &Element) -> Option<u64> {
    el.child_value("max-elements").and_then(|v| v.parse().ok())
}

/// Parse `min-elements`, defaulting to zero
pub fn parse_min_elements(el: &Element) -> u64 {
    el.child_value("min-elements")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Parse `ordered-by`, defaulting to system ordering
pub fn parse_ordered_by(el: &Element) -> OrderedBy {
    el.child_value("ordered-by")
        .and_then(OrderedBy::parse)
        .unwrap_or_default()
}

/// Parse `mandatory`
pub fn parse_mandatory(el: &Element) -> bool {
    el.child_value("mandatory") == Some("true")
}

/// Parse the `units` name
pub fn parse_units(el: &Element) -> Option<String> {
    el.child_name("units").map(str::to_string)
}

/// Parse the `default` value
pub fn parse_default(el: &Element) -> Option<String> {
    el.child_value("default").map(str::to_string)
}

/// Parse the `presence` value
pub fn parse_presence(el: &Element) -> Option<String> {
    el.child_value("presence").map(str::to_string)
}

/// Parse every `unique` statement into a leaf to co-unique leaves map
pub fn parse_unique(el: &Element) -> UniqueMap {
    let mut unique = UniqueMap::new();

    for tag in el.find_children("unique").filter_map(|u| u.tag.as_deref()) {
        let group: Vec<&str> = tag.split(' ').filter(|s| !s.is_empty()).collect();

        for leaf in &group {
            let others = group
                .iter()
                .filter(|other| *other != leaf)
                .map(|other| other.to_string())
                .collect();
            unique.insert(leaf.to_string(), others);
        }
    }

    unique
}

/// Parse every `when` statement
pub fn parse_when(el: &Element) -> Vec<When> {
    el.find_children("when")
        .map(|when| When {
            condition: when.condition.clone().unwrap_or_default(),
            context: when.context_node.clone(),
        })
        .collect()
}

/// Collect childless sub-statements not named in `ignore` into a property bag
///
/// A statement carrying text becomes a text property. A statement carrying
/// no argument at all becomes a flag.
pub fn parse_properties(el: &Element, ignore: &[&str]) -> Properties {
    let mut properties = Properties::new();

    for child in &el.children {
        if !child.children.is_empty() || ignore.contains(&child.keyword.as_str()) {
            continue;
        }

        let value = match child.text {
            Some(ref text) if !text.is_empty() => PropertyValue::Text(text.clone()),
            None if child.value.is_none() && child.name.is_none() => PropertyValue::Flag(true),
            _ => continue,
        };

        properties.insert(camel_case(&child.keyword), value);
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(value: serde_json::Value) -> Element {
        Element::from_value(value).expect("valid element")
    }

    #[test]
    fn test_parse_status_and_visibility() {
        let el = element(json!({
            "keyword": "leaf",
            "children": [
                { "keyword": "status", "value": "deprecated" },
                { "keyword": "visibility", "text": "prototype" }
            ]
        }));
        assert_eq!(parse_status(&el), Some(Status::Deprecated));
        assert_eq!(parse_visibility(&el), Some(Visibility::Prototype));
        assert!(!Visibility::Prototype.is_visible());
        assert!(Visibility::Advanced.is_visible());
    }

    #[test]
    fn test_parse_description() {
        let el = element(json!({
            "keyword": "leaf",
            "children": [{ "keyword": "description", "text": "line one\nline two" }]
        }));
        assert_eq!(parse_description(&el).as_deref(), Some("line one line two"));
        assert_eq!(parse_reference(&el), None);
    }

    #[test]
    fn test_parse_bounds() {
        let el = element(json!({
            "keyword": "list",
            "children": [
                { "keyword": "max-elements", "value": "10" },
                { "keyword": "ordered-by", "value": "user" }
            ]
        }));
        assert_eq!(parse_max_elements(&el), Some(10));
        assert_eq!(parse_min_elements(&el), 0);
        assert_eq!(parse_ordered_by(&el), OrderedBy::User);
    }

    #[test]
    fn test_parse_unique() {
        let el = element(json!({
            "keyword": "list",
            "children": [{ "keyword": "unique", "tag": "ip port" }]
        }));
        let unique = parse_unique(&el);
        assert_eq!(unique.get("ip"), Some(&vec!["port".to_string()]));
        assert_eq!(unique.get("port"), Some(&vec!["ip".to_string()]));
    }

    #[test]
    fn test_parse_when() {
        let el = element(json!({
            "keyword": "leaf",
            "children": [{ "keyword": "when", "condition": "../type = 'pppoe'", "context-node": "parent" }]
        }));
        assert_eq!(
            parse_when(&el),
            vec![When {
                condition: "../type = 'pppoe'".to_string(),
                context: Some("parent".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_properties() {
        let el = element(json!({
            "keyword": "leaf",
            "children": [
                { "keyword": "help-text", "text": "Some help" },
                { "keyword": "read-only" },
                { "keyword": "mandatory", "value": "true" },
                { "keyword": "visibility", "text": "hidden" },
                { "keyword": "type", "name": "string", "children": [{ "keyword": "length", "value": "1..5" }] }
            ]
        }));
        let props = parse_properties(&el, &["visibility"]);

        assert_eq!(props.len(), 2);
        assert_eq!(props.get("helpText"), Some(&PropertyValue::Text("Some help".to_string())));
        assert_eq!(props.get("readOnly"), Some(&PropertyValue::Flag(true)));
    }
}
