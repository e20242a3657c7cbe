//! Schema node storage
//!
//! Schema nodes live in an arena owned by the data model and refer to each
//! other through [`NodeId`] indices. Parent, enclosing-case and
//! parent-choice links are plain indices, so the tree has no reference
//! cycles and can be shared read-only across threads.

use indexmap::IndexMap;

use crate::namespaces::Namespace;
use crate::parsers::{OrderedBy, Properties, Status, UniqueMap, Visibility, When};
use crate::types::Type;

/// Index of a schema node inside its data model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Discriminant of a schema node variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// container
    Container,
    /// list
    List,
    /// leaf
    Leaf,
    /// leaf-list
    LeafList,
    /// choice
    Choice,
    /// case
    Case,
}

impl NodeType {
    /// YANG keyword of the variant
    pub fn keyword(&self) -> &'static str {
        match self {
            NodeType::Container => "container",
            NodeType::List => "list",
            NodeType::Leaf => "leaf",
            NodeType::LeafList => "leaf-list",
            NodeType::Choice => "choice",
            NodeType::Case => "case",
        }
    }
}

/// Data children of a container or list
#[derive(Debug, Clone, Default)]
pub struct ChildMap {
    /// Children by schema name, choice members flattened in
    pub children: IndexMap<String, NodeId>,
    /// The same children keyed by camelCase name
    pub camel_children: IndexMap<String, NodeId>,
    /// Choices declared directly on the node
    pub choices: IndexMap<String, NodeId>,
}

impl ChildMap {
    /// Find a child by schema name or camelCase alias
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.camel_children
            .get(name)
            .or_else(|| self.children.get(name))
            .copied()
    }
}

/// container-specific data
#[derive(Debug, Clone)]
pub struct ContainerNode {
    /// Presence statement text
    pub presence: Option<String>,
    /// Children
    pub children: ChildMap,
}

/// list-specific data
#[derive(Debug, Clone)]
pub struct ListNode {
    /// Key leaf names in declaration order
    pub keys: Vec<String>,
    /// Leaf name to co-unique leaf names
    pub unique: UniqueMap,
    /// Minimum number of entries
    pub min_elements: u64,
    /// Maximum number of entries; `None` is unbounded
    pub max_elements: Option<u64>,
    /// Ordering mode
    pub ordered_by: OrderedBy,
    /// Children
    pub children: ChildMap,
}

/// leaf-specific data
#[derive(Debug, Clone)]
pub struct LeafNode {
    /// Resolved type
    pub leaf_type: Type,
    /// Own `default` statement
    pub default: Option<String>,
    /// Own `units` statement
    pub units: Option<String>,
    /// Whether a value must be supplied
    pub mandatory: bool,
}

/// leaf-list-specific data
#[derive(Debug, Clone)]
pub struct LeafListNode {
    /// Resolved type
    pub leaf_type: Type,
    /// Own `units` statement
    pub units: Option<String>,
    /// Minimum number of entries
    pub min_elements: u64,
    /// Maximum number of entries; `None` is unbounded
    pub max_elements: Option<u64>,
    /// Ordering mode
    pub ordered_by: OrderedBy,
}

/// choice-specific data
#[derive(Debug, Clone)]
pub struct ChoiceNode {
    /// Whether one case must be present
    pub mandatory: bool,
    /// Cases in declaration order
    pub cases: Vec<NodeId>,
    /// Children of every case, flattened
    pub children: IndexMap<String, NodeId>,
}

/// case-specific data
#[derive(Debug, Clone)]
pub struct CaseNode {
    /// Choice the case belongs to
    pub parent_choice: NodeId,
    /// Data children, including members of nested choices
    pub children: IndexMap<String, NodeId>,
    /// Choices nested directly inside the case
    pub choices: IndexMap<String, NodeId>,
}

/// Variant payload of a schema node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// container
    Container(ContainerNode),
    /// list
    List(ListNode),
    /// leaf
    Leaf(LeafNode),
    /// leaf-list
    LeafList(LeafListNode),
    /// choice
    Choice(ChoiceNode),
    /// case
    Case(CaseNode),
}

/// A compiled schema statement
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Statement name
    pub name: String,
    /// Namespace of the declaring module
    pub ns: Namespace,
    /// Dotted registry path
    pub path: String,
    /// Description text
    pub description: Option<String>,
    /// Reference text
    pub reference: Option<String>,
    /// Explicit status; `None` inherits
    pub status: Option<Status>,
    /// Explicit visibility; `None` inherits
    pub visibility: Option<Visibility>,
    /// Unrecognized annotations
    pub other_props: Properties,
    /// `when` conditions on the statement itself
    pub when: Vec<When>,
    /// Whether a `when` applies to the statement or an ancestor
    pub has_when_ancestor_or_self: bool,
    /// Data parent; for a case, its choice
    pub parent: Option<NodeId>,
    /// Case the node is a member of
    pub choice_case: Option<NodeId>,
    /// Variant payload
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Variant discriminant
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Container(_) => NodeType::Container,
            NodeKind::List(_) => NodeType::List,
            NodeKind::Leaf(_) => NodeType::Leaf,
            NodeKind::LeafList(_) => NodeType::LeafList,
            NodeKind::Choice(_) => NodeType::Choice,
            NodeKind::Case(_) => NodeType::Case,
        }
    }

    /// Child map of a container or list
    pub fn child_map(&self) -> Option<&ChildMap> {
        match self.kind {
            NodeKind::Container(ref c) => Some(&c.children),
            NodeKind::List(ref l) => Some(&l.children),
            _ => None,
        }
    }

    /// Canonical children of any node that has them
    pub fn children(&self) -> Option<&IndexMap<String, NodeId>> {
        match self.kind {
            NodeKind::Container(ref c) => Some(&c.children.children),
            NodeKind::List(ref l) => Some(&l.children.children),
            NodeKind::Choice(ref c) => Some(&c.children),
            NodeKind::Case(ref c) => Some(&c.children),
            NodeKind::Leaf(_) | NodeKind::LeafList(_) => None,
        }
    }

    /// Type of a leaf or leaf-list
    pub fn leaf_type(&self) -> Option<&Type> {
        match self.kind {
            NodeKind::Leaf(ref l) => Some(&l.leaf_type),
            NodeKind::LeafList(ref l) => Some(&l.leaf_type),
            _ => None,
        }
    }
}
