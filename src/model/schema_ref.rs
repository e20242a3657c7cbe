//! Borrowed schema node handles
//!
//! [`SchemaRef`] pairs a [`NodeId`] with the data model that owns it, so
//! accessors can follow parent, case and choice links and compute inherited
//! properties.

use std::fmt;

use indexmap::IndexMap;

use crate::names::display_name;
use crate::namespaces::Namespace;
use crate::parsers::{Properties, Status, Visibility, When};
use crate::types::Type;

use super::node::{NodeId, NodeKind, NodeType, SchemaNode};
use super::DataModel;

/// A schema node together with the model it belongs to
#[derive(Clone, Copy)]
pub struct SchemaRef<'a> {
    model: &'a DataModel,
    id: NodeId,
}

impl<'a> SchemaRef<'a> {
    pub(crate) fn new(model: &'a DataModel, id: NodeId) -> Self {
        Self { model, id }
    }

    fn with(&self, id: NodeId) -> SchemaRef<'a> {
        SchemaRef::new(self.model, id)
    }

    /// Arena index of the node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying node
    pub fn node(&self) -> &'a SchemaNode {
        self.model.node(self.id)
    }

    /// The data model owning the node
    pub fn model(&self) -> &'a DataModel {
        self.model
    }

    /// Statement name
    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    /// Statement name, optionally camelCased
    pub fn get_name(&self, camel: bool) -> String {
        display_name(self.name(), camel)
    }

    /// Dotted registry path
    pub fn path(&self) -> &'a str {
        &self.node().path
    }

    /// Variant discriminant
    pub fn node_type(&self) -> NodeType {
        self.node().node_type()
    }

    /// Namespace of the declaring module
    pub fn namespace(&self) -> &'a Namespace {
        &self.node().ns
    }

    /// Description text
    pub fn description(&self) -> Option<&'a str> {
        self.node().description.as_deref()
    }

    /// Reference text
    pub fn reference(&self) -> Option<&'a str> {
        self.node().reference.as_deref()
    }

    /// Unrecognized annotations
    pub fn other_props(&self) -> &'a Properties {
        &self.node().other_props
    }

    /// `when` conditions declared on the node
    pub fn when(&self) -> &'a [When] {
        &self.node().when
    }

    /// Whether a `when` applies to the node or an ancestor
    pub fn has_when_ancestor_or_self(&self) -> bool {
        self.node().has_when_ancestor_or_self
    }

    /// Data parent; for a case, its choice
    pub fn parent(&self) -> Option<SchemaRef<'a>> {
        self.node().parent.map(|id| self.with(id))
    }

    /// Case the node belongs to, if declared inside a choice
    pub fn choice_case(&self) -> Option<SchemaRef<'a>> {
        self.node().choice_case.map(|id| self.with(id))
    }

    /// Choice the node is a member of, through its case
    pub fn choice(&self) -> Option<SchemaRef<'a>> {
        self.choice_case().and_then(|case| case.parent_choice())
    }

    // ========================================================================
    // Inherited status and visibility
    // ========================================================================

    fn inherited<F>(&self, own: Option<bool>, from_case: F, from_parent: fn(&SchemaRef<'a>) -> bool, default: bool) -> bool
    where
        F: Fn(&SchemaNode) -> Option<bool>,
    {
        if let Some(value) = own {
            return value;
        }
        if let Some(value) = self.choice_case().and_then(|case| from_case(case.node())) {
            return value;
        }
        self.parent().map(|p| from_parent(&p)).unwrap_or(default)
    }

    fn case_flag<F>(&self, own: Option<bool>, from_choice: fn(&SchemaRef<'a>) -> bool, from_child: F) -> bool
    where
        F: Fn(&SchemaRef<'a>) -> bool,
    {
        if let Some(value) = own {
            return value;
        }
        if self.parent().map(|choice| from_choice(&choice)).unwrap_or(false) {
            return true;
        }
        let children: Vec<SchemaRef<'a>> = self.children().collect();
        !children.is_empty() && children.iter().all(from_child)
    }

    /// Whether the node is shown
    pub fn is_visible(&self) -> bool {
        let own = self.node().visibility.map(|v| v.is_visible());
        if self.node_type() == NodeType::Case {
            return self.case_flag(own, SchemaRef::is_visible, |c| {
                c.node().visibility.map(|v| v.is_visible()).unwrap_or(false)
            });
        }
        self.inherited(own, |case| case.visibility.map(|v| v.is_visible()), SchemaRef::is_visible, true)
    }

    /// Whether the node is unreleased functionality
    pub fn is_prototype(&self) -> bool {
        let own = self.node().visibility.map(|v| v == Visibility::Prototype);
        if self.node_type() == NodeType::Case {
            return self.case_flag(own, SchemaRef::is_prototype, SchemaRef::is_prototype);
        }
        self.inherited(
            own,
            |case| case.visibility.map(|v| v == Visibility::Prototype),
            SchemaRef::is_prototype,
            false,
        )
    }

    /// Whether the node is obsolete
    pub fn is_obsolete(&self) -> bool {
        let own = self.node().status.map(|s| s == Status::Obsolete);
        if self.node_type() == NodeType::Case {
            return self.case_flag(own, SchemaRef::is_obsolete, SchemaRef::is_obsolete);
        }
        self.inherited(
            own,
            |case| case.status.map(|s| s == Status::Obsolete),
            SchemaRef::is_obsolete,
            false,
        )
    }

    /// Whether the node is deprecated
    pub fn is_deprecated(&self) -> bool {
        let own = self.node().status.map(|s| s == Status::Deprecated);
        if self.node_type() == NodeType::Case {
            return self.case_flag(own, SchemaRef::is_deprecated, SchemaRef::is_deprecated);
        }
        self.inherited(
            own,
            |case| case.status.map(|s| s == Status::Deprecated),
            SchemaRef::is_deprecated,
            false,
        )
    }

    // ========================================================================
    // Children
    // ========================================================================

    fn children_map(&self) -> Option<&'a IndexMap<String, NodeId>> {
        self.node().children()
    }

    /// Whether a child exists under its schema name or camelCase alias
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Find a child by schema name or camelCase alias
    pub fn child(&self, name: &str) -> Option<SchemaRef<'a>> {
        let id = match self.node().child_map() {
            Some(map) => map.get(name),
            None => self.children_map().and_then(|c| c.get(name).copied()),
        };
        id.map(|id| self.with(id))
    }

    /// Data children in declaration order, choice members flattened in
    pub fn children(&self) -> impl Iterator<Item = SchemaRef<'a>> + 'a {
        let model = self.model;
        self.children_map()
            .into_iter()
            .flat_map(|c| c.values())
            .map(move |id| SchemaRef::new(model, *id))
    }

    /// Choices declared directly on a container, list or case
    pub fn choices(&self) -> impl Iterator<Item = SchemaRef<'a>> + 'a {
        let model = self.model;
        let choices = match self.node().kind {
            NodeKind::Container(ref c) => Some(&c.children.choices),
            NodeKind::List(ref l) => Some(&l.children.choices),
            NodeKind::Case(ref c) => Some(&c.choices),
            _ => None,
        };
        choices
            .into_iter()
            .flat_map(|c| c.values())
            .map(move |id| SchemaRef::new(model, *id))
    }

    // ========================================================================
    // Leaf and leaf-list
    // ========================================================================

    /// Declared type of a leaf or leaf-list
    pub fn leaf_type(&self) -> Option<&'a Type> {
        self.node().leaf_type()
    }

    /// Built-in type behind any typedef chain
    pub fn resolved_type(&self) -> Option<&'a Type> {
        self.leaf_type().map(Type::built_in_type)
    }

    /// Default value: the leaf's own, else its typedef chain's
    pub fn default(&self) -> Option<&'a str> {
        match self.node().kind {
            NodeKind::Leaf(ref leaf) => leaf.default.as_deref().or_else(|| leaf.leaf_type.default()),
            _ => None,
        }
    }

    /// Units: the node's own, else its typedef chain's
    pub fn units(&self) -> Option<&'a str> {
        match self.node().kind {
            NodeKind::Leaf(ref leaf) => leaf.units.as_deref().or_else(|| leaf.leaf_type.units()),
            NodeKind::LeafList(ref list) => list.units.as_deref().or_else(|| list.leaf_type.units()),
            _ => None,
        }
    }

    /// Whether the leaf is declared mandatory
    pub fn is_mandatory(&self) -> bool {
        match self.node().kind {
            NodeKind::Leaf(ref leaf) => leaf.mandatory,
            NodeKind::Choice(ref choice) => choice.mandatory,
            _ => false,
        }
    }

    /// Whether the leaf is a key of its parent list
    pub fn is_key(&self) -> bool {
        self.node_type() == NodeType::Leaf
            && self
                .parent()
                .map(|p| p.keys().iter().any(|k| k == self.name()))
                .unwrap_or(false)
    }

    /// Whether a value must be present: keys and mandatory leaves
    pub fn is_required(&self) -> bool {
        self.is_key() || self.is_mandatory()
    }

    /// Whether the leaf belongs to a uniqueness group of its parent list
    pub fn is_unique(&self) -> bool {
        match self.parent().map(|p| &p.node().kind) {
            Some(NodeKind::List(ref list)) => list.unique.contains_key(self.name()),
            _ => false,
        }
    }

    /// Leaf names co-unique with this leaf
    pub fn unique_with(&self) -> &'a [String] {
        match self.parent().map(|p| &p.node().kind) {
            Some(NodeKind::List(ref list)) => list.unique.get(self.name()).map(Vec::as_slice).unwrap_or(&[]),
            _ => &[],
        }
    }

    // ========================================================================
    // List, container, choice and case
    // ========================================================================

    /// Key leaf names of a list
    pub fn keys(&self) -> &'a [String] {
        match self.node().kind {
            NodeKind::List(ref list) => &list.keys,
            _ => &[],
        }
    }

    /// Key leaves of a list, in key order
    pub fn key_nodes(&self) -> Vec<SchemaRef<'a>> {
        self.keys().iter().filter_map(|k| self.child(k)).collect()
    }

    /// Whether the container carries a `presence` statement
    pub fn is_presence_container(&self) -> bool {
        self.presence_description().is_some()
    }

    /// Text of the `presence` statement
    pub fn presence_description(&self) -> Option<&'a str> {
        match self.node().kind {
            NodeKind::Container(ref c) => c.presence.as_deref(),
            _ => None,
        }
    }

    /// Cases of a choice
    pub fn cases(&self) -> Vec<SchemaRef<'a>> {
        match self.node().kind {
            NodeKind::Choice(ref c) => c.cases.iter().map(|id| self.with(*id)).collect(),
            _ => Vec::new(),
        }
    }

    /// Case names of a choice
    pub fn case_names(&self) -> Vec<&'a str> {
        self.cases().iter().map(|c| c.name()).collect()
    }

    /// Cases holding a leaf of type `empty`
    pub fn empty_cases(&self) -> Vec<SchemaRef<'a>> {
        self.cases().into_iter().filter(|c| c.is_empty_case()).collect()
    }

    /// Choice a case belongs to
    pub fn parent_choice(&self) -> Option<SchemaRef<'a>> {
        match self.node().kind {
            NodeKind::Case(ref c) => Some(self.with(c.parent_choice)),
            _ => None,
        }
    }

    /// Whether a case contains a leaf of type `empty`
    pub fn is_empty_case(&self) -> bool {
        self.node_type() == NodeType::Case
            && self.children().any(|c| {
                c.node_type() == NodeType::Leaf && c.resolved_type().map(Type::is_empty_type).unwrap_or(false)
            })
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Visit the node and everything below it, pre-order
    ///
    /// Containers and lists visit their choices before their own direct
    /// children; each choice visits its cases and each case its members, so
    /// every node is seen exactly once.
    pub fn visit<F: FnMut(SchemaRef<'a>)>(&self, visitor: &mut F) {
        visitor(*self);

        match self.node().kind {
            NodeKind::Container(_) | NodeKind::List(_) | NodeKind::Case(_) => {
                for choice in self.choices() {
                    choice.visit(visitor);
                }
                let own_case = (self.node_type() == NodeType::Case).then_some(self.id);
                for child in self.children() {
                    if child.node().choice_case == own_case {
                        child.visit(visitor);
                    }
                }
            }
            NodeKind::Choice(_) => {
                for case in self.cases() {
                    case.visit(visitor);
                }
            }
            NodeKind::Leaf(_) | NodeKind::LeafList(_) => {}
        }
    }
}

impl fmt::Debug for SchemaRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRef")
            .field("type", &self.node_type())
            .field("path", &self.path())
            .finish()
    }
}

impl PartialEq for SchemaRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.id == other.id
    }
}

impl Eq for SchemaRef<'_> {}
