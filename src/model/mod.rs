//! Schema model
//!
//! A [`DataModel`] is compiled once from a parse tree and shared read-only by
//! every instance tree bound against it. Nodes are stored in an arena and
//! addressed by [`NodeId`]; [`SchemaRef`] handles give navigable access.
//!
//! ## Registry
//!
//! Every container, list, leaf, leaf-list and choice is registered under its
//! dotted path (`authority.router.name`). Members of a choice are registered
//! under the path of the choice's parent, as if the choice were not there.
//! Cases are reachable through their choice only.

mod builder;
mod node;
mod schema_ref;

pub use node::{
    CaseNode, ChildMap, ChoiceNode, ContainerNode, LeafListNode, LeafNode, ListNode, NodeId, NodeKind,
    NodeType, SchemaNode,
};
pub use schema_ref::SchemaRef;

use indexmap::IndexMap;

use crate::element::Element;
use crate::error::{Error, Result, SchemaError};
use crate::identities::Identities;
use crate::limits::Limits;
use crate::namespaces::NamespaceMap;

use builder::TreeBuilder;

/// Compiled schema tree with its registry, identities and namespaces
#[derive(Debug, Clone)]
pub struct DataModel {
    nodes: Vec<SchemaNode>,
    registry: IndexMap<String, NodeId>,
    root: NodeId,
    identities: Identities,
    namespaces: NamespaceMap,
}

/// Builder for [`DataModel`]
#[derive(Debug, Clone, Default)]
pub struct DataModelBuilder {
    limits: Limits,
}

impl DataModelBuilder {
    /// Create a builder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recursion limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Compile the statement chosen by `get_root` within `doc`
    ///
    /// Identities and namespace prefixes are collected from the whole
    /// document; only the subtree below the selected root becomes schema.
    pub fn build<F>(self, doc: &Element, get_root: F) -> Result<DataModel>
    where
        F: FnOnce(&Element) -> Option<&Element>,
    {
        let root_el = get_root(doc).ok_or_else(|| {
            Error::Schema(SchemaError::new("Root statement not found in schema document"))
        })?;

        let identities = Identities::from_element(doc);
        let namespaces = NamespaceMap::collect(doc);
        let tree = TreeBuilder::new(&identities, &self.limits).build(root_el)?;

        let model = DataModel {
            nodes: tree.nodes,
            registry: tree.registry,
            root: tree.root,
            identities,
            namespaces,
        };

        tracing::debug!(
            root = model.root_name(),
            nodes = model.node_count(),
            identities = model.identities.len(),
            "built data model"
        );

        Ok(model)
    }
}

impl DataModel {
    /// Start configuring a data model
    pub fn builder() -> DataModelBuilder {
        DataModelBuilder::new()
    }

    /// Compile with default limits
    pub fn from_element<F>(doc: &Element, get_root: F) -> Result<Self>
    where
        F: FnOnce(&Element) -> Option<&Element>,
    {
        Self::builder().build(doc, get_root)
    }

    /// Parse a JSON schema export and compile it with default limits
    pub fn from_json_str<F>(text: &str, get_root: F) -> Result<Self>
    where
        F: FnOnce(&Element) -> Option<&Element>,
    {
        let doc = Element::from_json_str(text)?;
        Self::from_element(&doc, get_root)
    }

    pub(crate) fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Handle for a node id
    ///
    /// Returns `None` for an id that does not belong to this model.
    pub fn get(&self, id: NodeId) -> Option<SchemaRef<'_>> {
        (id.0 < self.nodes.len()).then(|| SchemaRef::new(self, id))
    }

    /// Root container
    pub fn root(&self) -> SchemaRef<'_> {
        SchemaRef::new(self, self.root)
    }

    /// Name of the root container
    pub fn root_name(&self) -> &str {
        &self.node(self.root).name
    }

    /// Look up a node by its dotted path
    pub fn get_model_for_path(&self, path: &str) -> Result<SchemaRef<'_>> {
        self.registry
            .get(path)
            .map(|id| SchemaRef::new(self, *id))
            .ok_or_else(|| Error::Instance(format!("Model not found for path {}", path)))
    }

    /// Registered paths and their nodes, in pre-order
    pub fn registry(&self) -> impl Iterator<Item = (&str, SchemaRef<'_>)> {
        self.registry
            .iter()
            .map(move |(path, id)| (path.as_str(), SchemaRef::new(self, *id)))
    }

    /// Visit every node, pre-order from the root
    pub fn visit<'a, F: FnMut(SchemaRef<'a>)>(&'a self, mut visitor: F) {
        self.root().visit(&mut visitor);
    }

    /// Number of compiled nodes, cases included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Identity registry of the document
    pub fn identities(&self) -> &Identities {
        &self.identities
    }

    /// Module prefixes of the document
    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{data_model, schema_document, statement, string_leaf};
    use crate::types::Type;
    use serde_json::json;

    fn model_with(children: serde_json::Value) -> Result<DataModel> {
        let doc = Element::from_value(json!({
            "keyword": "module",
            "name": "m",
            "module-prefix": "m",
            "nsmap": { "m": "urn:m" },
            "children": [{ "keyword": "container", "name": "root", "children": children }]
        }))?;
        DataModel::from_element(&doc, |doc| doc.find_child("container"))
    }

    #[test]
    fn test_registry_paths() {
        let model = data_model();
        assert_eq!(model.root_name(), "authority");

        for path in [
            "authority",
            "authority.name",
            "authority.router",
            "authority.router.name",
            "authority.router.system.services.webserver.port",
            "authority.router.node.tag",
            "authority.router.address-family",
            "authority.router.ipv4-address",
            "authority.router.ipv6-options.mtu",
        ] {
            assert!(model.get_model_for_path(path).is_ok(), "missing {}", path);
        }

        let err = model.get_model_for_path("authority.router.ipv4").unwrap_err();
        assert_eq!(err.to_string(), "Model not found for path authority.router.ipv4");
    }

    #[test]
    fn test_config_false_and_unknown_statements_skipped() {
        let model = data_model();
        assert!(model.get_model_for_path("authority.router.system.state").is_err());
        assert!(model.get_model_for_path("authority.router.router-up").is_err());
    }

    #[test]
    fn test_namespace_and_identities() {
        let model = data_model();
        let router = model.get_model_for_path("authority.router").unwrap();

        assert_eq!(router.namespace().prefix, "t128");
        assert_eq!(router.namespace().uri, "http://128technology.com/t128");
        assert_eq!(model.namespaces().get_namespace("t128"), Some("http://128technology.com/t128"));
        assert_eq!(model.identities().get_options("address-type"), vec!["t128:ipv4", "t128:ipv6"]);

        let family = router.child("family").unwrap();
        assert_eq!(family.leaf_type().map(Type::options).unwrap(), vec!["t128:ipv4", "t128:ipv6"]);
    }

    #[test]
    fn test_list_keys_and_unique() {
        let model = data_model();
        let router = model.get_model_for_path("authority.router").unwrap();

        assert_eq!(router.node_type(), NodeType::List);
        assert_eq!(router.keys(), ["name".to_string()]);
        assert_eq!(router.key_nodes()[0].name(), "name");

        let name = router.child("name").unwrap();
        assert!(name.is_key());
        assert!(name.is_required());
        assert!(!name.is_unique());

        let location = router.child("location").unwrap();
        assert!(!location.is_key());
        assert!(location.is_unique());
        assert_eq!(location.unique_with(), ["description".to_string()]);
    }

    #[test]
    fn test_list_without_key_fails() {
        let err = model_with(json!([{ "keyword": "list", "name": "peer", "children": [string_leaf("name")] }]))
            .unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("List peer must specify a key"));
    }

    #[test]
    fn test_camel_case_child_lookup() {
        let model = data_model();
        let router = model.get_model_for_path("authority.router").unwrap();

        assert!(router.has_child("dns-server"));
        assert!(router.has_child("dnsServer"));
        assert_eq!(router.child("ipv6Options").unwrap().name(), "ipv6-options");
        assert!(!router.has_child("missing"));
    }

    #[test]
    fn test_leaf_defaults_and_units() {
        let model = data_model();
        let port = model
            .get_model_for_path("authority.router.system.services.webserver.port")
            .unwrap();
        assert_eq!(port.default(), Some("443"));

        let metric = model.get_model_for_path("authority.router.metric").unwrap();
        assert_eq!(metric.units(), Some("ms"));
        assert_eq!(metric.leaf_type().unwrap().serialize("5.123"), json!(5.123));
    }

    #[test]
    fn test_choice_flattening() {
        let model = data_model();
        let router = model.get_model_for_path("authority.router").unwrap();
        let choice = model.get_model_for_path("authority.router.address-family").unwrap();

        assert_eq!(choice.node_type(), NodeType::Choice);
        assert_eq!(choice.case_names(), vec!["ipv4", "ipv6", "unnumbered"]);
        assert_eq!(choice.children().count(), 4);
        assert_eq!(router.choices().count(), 1);

        let ipv6 = router.child("ipv6-address").unwrap();
        assert_eq!(ipv6.choice_case().unwrap().name(), "ipv6");
        assert_eq!(ipv6.choice().unwrap(), choice);
        assert_eq!(ipv6.parent().unwrap(), router);

        let empty: Vec<&str> = choice.empty_cases().iter().map(|c| c.name()).collect();
        assert_eq!(empty, vec!["unnumbered"]);

        let case = choice.cases()[0];
        assert_eq!(case.parent_choice().unwrap(), choice);
        assert_eq!(case.path(), "authority.router.address-family.ipv4");
    }

    #[test]
    fn test_presence_container() {
        let model = data_model();
        let options = model.get_model_for_path("authority.router.ipv6-options").unwrap();
        assert!(options.is_presence_container());
        assert_eq!(options.presence_description(), Some("Enables IPv6 options"));

        let bfd = model.get_model_for_path("authority.router.bfd").unwrap();
        assert!(!bfd.is_presence_container());
    }

    #[test]
    fn test_visibility_inheritance() {
        let model = data_model();
        let bfd = model.get_model_for_path("authority.router.bfd").unwrap();
        assert!(bfd.is_visible());
        assert!(bfd.child("state").unwrap().is_visible());
        assert!(!bfd.child("secret").unwrap().is_visible());

        let no_address = model.get_model_for_path("authority.router.no-address").unwrap();
        assert!(!no_address.is_visible());
        assert!(!no_address.choice_case().unwrap().is_visible());
        assert!(model.get_model_for_path("authority.router.ipv4-address").unwrap().is_visible());
    }

    #[test]
    fn test_status_inheritance() {
        let model = model_with(json!([
            {
                "keyword": "container",
                "name": "old",
                "children": [
                    statement("status", "value", "obsolete"),
                    string_leaf("inner"),
                    {
                        "keyword": "leaf",
                        "name": "current",
                        "children": [{ "keyword": "type", "name": "string" }, statement("status", "value", "current")]
                    }
                ]
            },
            {
                "keyword": "choice",
                "name": "mode",
                "children": [{
                    "keyword": "case",
                    "name": "legacy",
                    "children": [statement("status", "value", "deprecated"), string_leaf("legacy-mode")]
                }]
            }
        ]))
        .unwrap();

        assert!(model.get_model_for_path("root.old").unwrap().is_obsolete());
        assert!(model.get_model_for_path("root.old.inner").unwrap().is_obsolete());
        assert!(!model.get_model_for_path("root.old.current").unwrap().is_obsolete());

        let legacy = model.get_model_for_path("root.legacy-mode").unwrap();
        assert!(legacy.is_deprecated());
        assert!(!legacy.is_obsolete());
        assert!(legacy.choice_case().unwrap().is_deprecated());
    }

    #[test]
    fn test_case_inherits_when_all_children_agree() {
        let model = model_with(json!([{
            "keyword": "choice",
            "name": "mode",
            "children": [{
                "keyword": "case",
                "name": "experimental",
                "children": [{
                    "keyword": "leaf",
                    "name": "beta",
                    "children": [{ "keyword": "type", "name": "string" }, statement("visibility", "text", "prototype")]
                }]
            }]
        }]))
        .unwrap();

        let choice = model.get_model_for_path("root.mode").unwrap();
        assert!(choice.cases()[0].is_prototype());
        assert!(!choice.is_prototype());
    }

    #[test]
    fn test_visit_sees_every_node_once() {
        let model = data_model();
        let mut seen = Vec::new();
        model.visit(|node| seen.push(node.id()));

        assert_eq!(seen.len(), model.node_count());
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), model.node_count());
    }

    #[test]
    fn test_missing_root() {
        let doc = Element::from_value(schema_document()).unwrap();
        let err = DataModel::from_element(&doc, |doc| doc.descend(&["nope"])).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_depth_limit() {
        let doc = Element::from_value(schema_document()).unwrap();
        let err = DataModel::builder()
            .with_limits(Limits::new().with_max_schema_depth(2))
            .build(&doc, |doc| doc.descend(&["config", "authority"]))
            .unwrap_err();
        assert!(err.is_schema_error());
    }
}
