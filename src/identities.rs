//! Identity registry
//!
//! YANG identities form an open, extensible set of named constants: a base
//! identity is extended by any number of derived identities, possibly from
//! other modules. `identityref` types list the identities derived from their
//! base as selectable options.

use indexmap::IndexMap;
use serde::Serialize;

use crate::element::Element;
use crate::names::local_name;

/// A derived identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Identity name
    pub name: String,
    /// Prefix of the declaring module
    pub prefix: String,
    /// Display label, `<prefix>:<name>`
    pub label: String,
    /// Description text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Identity map - base identity name to derived identities
pub type IdentityMap = IndexMap<String, Vec<Identity>>;

/// Registry of identities grouped by base
#[derive(Debug, Clone, Default, Serialize)]
pub struct Identities {
    identities: IdentityMap,
}

impl Identities {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `identity` statements directly under `el`
    pub fn from_element(el: &Element) -> Self {
        let mut registry = Self::new();
        registry.parse_identities(el);
        registry
    }

    /// Add the `identity` statements directly under `el`
    pub fn parse_identities(&mut self, el: &Element) {
        for identity in el.find_children("identity") {
            let Some(base) = identity.child_name("base") else {
                tracing::trace!(identity = identity.name_or_empty(), "skipping identity without base");
                continue;
            };

            let prefix = identity
                .module_prefix
                .as_deref()
                .or_else(|| identity.containing_module().map(|m| m.prefix.as_str()))
                .unwrap_or_default();
            let name = identity.name_or_empty();

            self.add(
                local_name(base),
                Identity {
                    name: name.to_string(),
                    prefix: prefix.to_string(),
                    label: format!("{}:{}", prefix, name),
                    description: identity.child_text("description").map(str::to_string),
                },
            );
        }
    }

    /// Register an identity under a base
    pub fn add(&mut self, base: impl Into<String>, identity: Identity) {
        self.identities.entry(base.into()).or_default().push(identity);
    }

    /// Identities derived from `base`, in declaration order
    pub fn get(&self, base: &str) -> &[Identity] {
        self.identities.get(base).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Labels of the identities derived from `base`; empty for unknown bases
    pub fn get_options(&self, base: &str) -> Vec<String> {
        self.get(base).iter().map(|i| i.label.clone()).collect()
    }

    /// Number of distinct bases
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether no identity was registered
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Iterate over bases and their identities
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Identity])> {
        self.identities.iter().map(|(b, ids)| (b.as_str(), ids.as_slice()))
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
                    "keyword": "identity", "name": "set-tag", "module-prefix": "rp",
                    "children": [
                        { "keyword": "base", "name": "action-type" },
                        { "keyword": "description", "text": "Set the route tag." }
                    ]
                },
                {
                    "keyword": "identity", "name": "continue", "module-prefix": "rp",
                    "children": [{ "keyword": "base", "name": "action-type" }]
                },
                {
                    "keyword": "identity", "name": "bgp", "module-prefix": "rt",
                    "children": [{ "keyword": "base", "name": "rt:routing-protocol" }]
                },
                { "keyword": "identity", "name": "action-type", "module-prefix": "rp" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_all_bases() {
        let identities = Identities::from_element(&doc());
        assert_eq!(identities.len(), 2);
        assert_eq!(identities.get("action-type").len(), 2);
    }

    #[test]
    fn test_get_options() {
        let identities = Identities::from_element(&doc());
        assert_eq!(identities.get_options("action-type"), vec!["rp:set-tag", "rp:continue"]);
        assert_eq!(
            identities.get("action-type")[0].description.as_deref(),
            Some("Set the route tag.")
        );
    }

    #[test]
    fn test_prefixed_base() {
        let identities = Identities::from_element(&doc());
        assert_eq!(identities.get_options("routing-protocol"), vec!["rt:bgp"]);
    }

    #[test]
    fn test_unknown_base_is_empty() {
        let identities = Identities::from_element(&doc());
        assert!(identities.get_options("nope").is_empty());
    }
}
