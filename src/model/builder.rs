//! Schema tree construction
//!
//! Walks the parse tree below the selected root statement and compiles each
//! data statement into a [`SchemaNode`]. Choices are compiled together with
//! their cases; the data children of every case are flattened into the
//! choice and into the choice's parent, and keep a link to the case that
//! declared them.

use indexmap::IndexMap;

use crate::element::Element;
use crate::error::{Error, Result, SchemaError};
use crate::identities::Identities;
use crate::limits::Limits;
use crate::names::camel_case;
use crate::namespaces::{Namespace, YIN_NAMESPACE};
use crate::parsers::{
    parse_default, parse_description, parse_mandatory, parse_max_elements, parse_min_elements,
    parse_ordered_by, parse_presence, parse_properties, parse_reference, parse_status, parse_unique,
    parse_units, parse_visibility, parse_when,
};
use crate::types::Type;

use super::node::{
    CaseNode, ChildMap, ChoiceNode, ContainerNode, LeafListNode, LeafNode, ListNode, NodeId, NodeKind,
    SchemaNode,
};

/// Data children collected from one statement
#[derive(Default)]
struct Children {
    children: IndexMap<String, NodeId>,
    choices: IndexMap<String, NodeId>,
}

impl Children {
    fn into_child_map(self) -> ChildMap {
        let camel_children = self
            .children
            .iter()
            .map(|(name, id)| (camel_case(name), *id))
            .collect();

        ChildMap {
            children: self.children,
            camel_children,
            choices: self.choices,
        }
    }
}

/// Output of a schema build
pub(crate) struct BuiltTree {
    pub nodes: Vec<SchemaNode>,
    pub registry: IndexMap<String, NodeId>,
    pub root: NodeId,
}

/// Compiles a parse tree into the schema arena
pub(crate) struct TreeBuilder<'a> {
    nodes: Vec<SchemaNode>,
    registry: IndexMap<String, NodeId>,
    identities: &'a Identities,
    limits: &'a Limits,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(identities: &'a Identities, limits: &'a Limits) -> Self {
        Self {
            nodes: Vec::new(),
            registry: IndexMap::new(),
            identities,
            limits,
        }
    }

    /// Build the tree rooted at `root`, which is compiled as a container
    pub fn build(mut self, root: &Element) -> Result<BuiltTree> {
        let root = self.build_container(root, None, 0)?;

        Ok(BuiltTree {
            nodes: self.nodes,
            registry: self.registry,
            root,
        })
    }

    // ========================================================================
    // Shared statement data
    // ========================================================================

    fn statement(&self, el: &Element, parent: Option<NodeId>, kind: NodeKind) -> Result<SchemaNode> {
        let name = el.name.clone().ok_or_else(|| {
            Error::Schema(SchemaError::new("Statement has no name").with_keyword(el.keyword.as_str()))
        })?;

        let path = match parent {
            Some(parent) => format!("{}.{}", self.nodes[parent.0].path, name),
            None => name.clone(),
        };

        Ok(SchemaNode {
            ns: Namespace::of_element(el)?,
            description: parse_description(el),
            reference: parse_reference(el),
            status: parse_status(el),
            visibility: parse_visibility(el),
            other_props: parse_properties(el, &["visibility", "type", "when"]),
            when: parse_when(el),
            has_when_ancestor_or_self: el.has_when_ancestor_or_self(),
            parent,
            choice_case: None,
            kind,
            name,
            path,
        })
    }

    fn push(&mut self, node: SchemaNode, register: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        if register {
            self.registry.insert(node.path.clone(), id);
        }
        self.nodes.push(node);
        id
    }

    fn check_depth(&self, depth: usize, el: &Element) -> Result<()> {
        self.limits.check_schema_depth(depth, el.name_or_empty())
    }

    // ========================================================================
    // Children
    // ========================================================================

    fn build_children(&mut self, el: &Element, parent: NodeId, depth: usize) -> Result<Children> {
        let mut collected = Children::default();

        for child in &el.children {
            if child.child_value("config") == Some("false") {
                tracing::trace!(name = child.name_or_empty(), "skipping non-configuration statement");
                continue;
            }

            let id = match child.keyword.as_str() {
                "leaf" => self.build_leaf(child, parent, depth)?,
                "leaf-list" => self.build_leaf_list(child, parent, depth)?,
                "container" => self.build_container(child, Some(parent), depth)?,
                "list" => self.build_list(child, parent, depth)?,
                "choice" => {
                    let choice = self.build_choice(child, parent, depth)?;
                    if let NodeKind::Choice(ref c) = self.nodes[choice.0].kind {
                        collected
                            .children
                            .extend(c.children.iter().map(|(name, id)| (name.clone(), *id)));
                    }
                    collected.choices.insert(self.nodes[choice.0].name.clone(), choice);
                    continue;
                }
                other => {
                    tracing::trace!(keyword = other, "skipping non-data statement");
                    continue;
                }
            };

            collected.children.insert(self.nodes[id.0].name.clone(), id);
        }

        Ok(collected)
    }

    // ========================================================================
    // Node variants
    // ========================================================================

    fn build_container(&mut self, el: &Element, parent: Option<NodeId>, depth: usize) -> Result<NodeId> {
        self.check_depth(depth, el)?;

        let kind = NodeKind::Container(ContainerNode {
            presence: parse_presence(el),
            children: ChildMap::default(),
        });
        let node = self.statement(el, parent, kind)?;
        let id = self.push(node, true);

        let children = self.build_children(el, id, depth + 1)?.into_child_map();
        if let NodeKind::Container(ref mut c) = self.nodes[id.0].kind {
            c.children = children;
        }

        Ok(id)
    }

    fn build_list(&mut self, el: &Element, parent: NodeId, depth: usize) -> Result<NodeId> {
        self.check_depth(depth, el)?;

        let keys: Vec<String> = el
            .child_value("key")
            .map(|k| k.split(' ').filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();

        let kind = NodeKind::List(ListNode {
            keys,
            unique: parse_unique(el),
            min_elements: parse_min_elements(el),
            max_elements: parse_max_elements(el),
            ordered_by: parse_ordered_by(el),
            children: ChildMap::default(),
        });
        let node = self.statement(el, Some(parent), kind)?;

        if matches!(node.kind, NodeKind::List(ref l) if l.keys.is_empty()) {
            return Err(Error::Schema(
                SchemaError::new(format!("List {} must specify a key", node.name))
                    .with_keyword("list")
                    .with_path(node.path),
            ));
        }

        let id = self.push(node, true);

        let children = self.build_children(el, id, depth + 1)?.into_child_map();
        if let NodeKind::List(ref mut l) = self.nodes[id.0].kind {
            l.children = children;
        }

        Ok(id)
    }

    fn resolve_type(&self, el: &Element) -> Result<Type> {
        let type_el = el
            .find_child_ns("type", YIN_NAMESPACE)
            .or_else(|| el.find_child("type"))
            .ok_or_else(|| {
                Error::Schema(
                    SchemaError::new(format!("{} must specify a type", el.name_or_empty()))
                        .with_keyword(el.keyword.as_str()),
                )
            })?;

        Type::resolve(type_el, self.identities)
    }

    fn build_leaf(&mut self, el: &Element, parent: NodeId, depth: usize) -> Result<NodeId> {
        self.check_depth(depth, el)?;

        let kind = NodeKind::Leaf(LeafNode {
            leaf_type: self.resolve_type(el)?,
            default: parse_default(el),
            units: parse_units(el),
            mandatory: parse_mandatory(el),
        });
        let node = self.statement(el, Some(parent), kind)?;

        Ok(self.push(node, true))
    }

    fn build_leaf_list(&mut self, el: &Element, parent: NodeId, depth: usize) -> Result<NodeId> {
        self.check_depth(depth, el)?;

        let kind = NodeKind::LeafList(LeafListNode {
            leaf_type: self.resolve_type(el)?,
            units: parse_units(el),
            min_elements: parse_min_elements(el),
            max_elements: parse_max_elements(el),
            ordered_by: parse_ordered_by(el),
        });
        let node = self.statement(el, Some(parent), kind)?;

        Ok(self.push(node, true))
    }

    fn build_choice(&mut self, el: &Element, parent: NodeId, depth: usize) -> Result<NodeId> {
        self.check_depth(depth, el)?;

        let kind = NodeKind::Choice(ChoiceNode {
            mandatory: parse_mandatory(el),
            cases: Vec::new(),
            children: IndexMap::new(),
        });
        let node = self.statement(el, Some(parent), kind)?;
        let id = self.push(node, true);

        let mut cases = Vec::new();
        let mut children = IndexMap::new();

        for case_el in el.find_children("case") {
            let case = self.build_case(case_el, id, parent, depth + 1)?;
            if let NodeKind::Case(ref c) = self.nodes[case.0].kind {
                children.extend(c.children.iter().map(|(name, id)| (name.clone(), *id)));
            }
            cases.push(case);
        }

        if let NodeKind::Choice(ref mut c) = self.nodes[id.0].kind {
            c.cases = cases;
            c.children = children;
        }

        Ok(id)
    }

    /// Cases are not registered; their children hang off the choice's parent.
    fn build_case(&mut self, el: &Element, choice: NodeId, parent: NodeId, depth: usize) -> Result<NodeId> {
        self.check_depth(depth, el)?;

        let kind = NodeKind::Case(CaseNode {
            parent_choice: choice,
            children: IndexMap::new(),
            choices: IndexMap::new(),
        });
        let node = self.statement(el, Some(choice), kind)?;
        let id = self.push(node, false);

        let collected = self.build_children(el, parent, depth + 1)?;

        // Members of a nested choice keep the innermost case.
        for member in collected.children.values().chain(collected.choices.values()) {
            let member = &mut self.nodes[member.0];
            if member.choice_case.is_none() {
                member.choice_case = Some(id);
            }
        }

        if let NodeKind::Case(ref mut c) = self.nodes[id.0].kind {
            c.children = collected.children;
            c.choices = collected.choices;
        }

        Ok(id)
    }
}
