//! Instance tree storage, binding and mutation
//!
//! An [`InstanceTree`] binds one JSON configuration payload against a shared
//! [`DataModel`]. Instances live in an arena indexed by [`InstanceId`]; each
//! keeps the id of its schema node and of its parent, which is enough to
//! rebuild its path.
//!
//! Leaf values are stored as raw strings and converted through the leaf's
//! type only when read.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::model::{DataModel, NodeId, NodeType, SchemaRef};

use super::attributes::{Attribute, ConfigValue};
use super::path::{Key, Path, PathSegment};

/// Index of an instance inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) usize);

impl InstanceId {
    /// Position of the instance in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Discriminant of an instance variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceType {
    /// Bound container
    Container,
    /// Bound list
    List,
    /// One entry of a list
    ListChild,
    /// Bound leaf
    Leaf,
    /// Bound leaf-list
    LeafList,
    /// One item of a leaf-list
    LeafListChild,
}

/// Children of a container or list entry
#[derive(Debug, Clone, Default)]
pub(crate) struct ChildInstances {
    /// Children keyed by schema name, in payload order
    pub children: IndexMap<String, InstanceId>,
    /// Choice name to the case whose members are present
    pub active_choices: IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub(crate) enum InstanceKind {
    Container(ChildInstances),
    List(Vec<InstanceId>),
    ListChild(ChildInstances),
    Leaf(Option<String>),
    LeafList(Vec<InstanceId>),
    LeafListChild { value: String, config: Value },
}

#[derive(Debug, Clone)]
pub(crate) struct InstanceNode {
    pub schema: NodeId,
    pub parent: Option<InstanceId>,
    pub attributes: Vec<Attribute>,
    pub kind: InstanceKind,
    pub detached: bool,
}

impl InstanceNode {
    fn new(schema: NodeId, parent: Option<InstanceId>, attributes: Vec<Attribute>, kind: InstanceKind) -> Self {
        Self {
            schema,
            parent,
            attributes,
            kind,
            detached: false,
        }
    }

    pub fn instance_type(&self) -> InstanceType {
        match self.kind {
            InstanceKind::Container(_) => InstanceType::Container,
            InstanceKind::List(_) => InstanceType::List,
            InstanceKind::ListChild(_) => InstanceType::ListChild,
            InstanceKind::Leaf(_) => InstanceType::Leaf,
            InstanceKind::LeafList(_) => InstanceType::LeafList,
            InstanceKind::LeafListChild { .. } => InstanceType::LeafListChild,
        }
    }

    fn child_instances(&self) -> Option<&ChildInstances> {
        match self.kind {
            InstanceKind::Container(ref c) | InstanceKind::ListChild(ref c) => Some(c),
            _ => None,
        }
    }

    fn renumber(&mut self, ids: &IndexMap<InstanceId, InstanceId>) {
        self.parent = self.parent.and_then(|p| ids.get(&p).copied());
        match self.kind {
            InstanceKind::Container(ref mut c) | InstanceKind::ListChild(ref mut c) => {
                c.children.retain(|_, id| match ids.get(id) {
                    Some(new) => {
                        *id = *new;
                        true
                    }
                    None => false,
                });
            }
            InstanceKind::List(ref mut items) | InstanceKind::LeafList(ref mut items) => {
                *items = items.iter().filter_map(|id| ids.get(id).copied()).collect();
            }
            InstanceKind::Leaf(_) | InstanceKind::LeafListChild { .. } => {}
        }
    }

    /// Ids of every direct child, in order
    pub fn child_ids(&self) -> Vec<InstanceId> {
        match self.kind {
            InstanceKind::Container(ref c) | InstanceKind::ListChild(ref c) => c.children.values().copied().collect(),
            InstanceKind::List(ref items) | InstanceKind::LeafList(ref items) => items.clone(),
            InstanceKind::Leaf(_) | InstanceKind::LeafListChild { .. } => Vec::new(),
        }
    }
}

/// Stringify a payload scalar the way leaf values are stored
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| stringify(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Authorization predicate admitting every instance
pub fn allow(_: InstanceRef<'_>) -> bool {
    true
}

// ============================================================================
// Tree
// ============================================================================

/// A configuration payload bound against a data model
///
/// Deleting an instance only unlinks it; its arena slot stays allocated so
/// that stale ids keep resolving to `None`. Trees that churn through many
/// edits should call [`InstanceTree::compact`] to reclaim those slots.
#[derive(Debug, Clone)]
pub struct InstanceTree {
    model: Arc<DataModel>,
    nodes: Vec<InstanceNode>,
    root: InstanceId,
    limits: Limits,
}

impl InstanceTree {
    /// Bind the payload of the model's root container
    pub fn bind(model: Arc<DataModel>, config: &Value) -> Result<Self> {
        Self::bind_with_limits(model, config, Limits::default())
    }

    /// Bind with explicit recursion limits
    pub fn bind_with_limits(model: Arc<DataModel>, config: &Value, limits: Limits) -> Result<Self> {
        let mut tree = Self {
            model: Arc::clone(&model),
            nodes: Vec::new(),
            root: InstanceId(0),
            limits,
        };

        tree.root = tree.bind_children(model.root(), config, None, 0, InstanceType::Container)?;

        tracing::debug!(root = model.root_name(), instances = tree.nodes.len(), "bound instance tree");

        Ok(tree)
    }

    /// The data model the tree is bound against
    pub fn model(&self) -> &Arc<DataModel> {
        &self.model
    }

    /// Root container instance
    pub fn root(&self) -> InstanceRef<'_> {
        InstanceRef::new(self, self.root)
    }

    /// Handle for a live instance
    ///
    /// Returns `None` for ids of deleted instances and foreign ids.
    pub fn get(&self, id: InstanceId) -> Option<InstanceRef<'_>> {
        self.nodes
            .get(id.0)
            .filter(|node| !node.detached)
            .map(|_| InstanceRef::new(self, id))
    }

    /// Number of instances still attached to the tree
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.detached).count()
    }

    /// Number of arena slots, deleted instances included
    pub fn arena_size(&self) -> usize {
        self.nodes.len()
    }

    /// Drop deleted instances from the arena
    ///
    /// Live instances are renumbered in arena order. The returned map gives
    /// the new id of every live instance; ids obtained before the call must be
    /// translated through it.
    pub fn compact(&mut self) -> IndexMap<InstanceId, InstanceId> {
        let ids: IndexMap<InstanceId, InstanceId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.detached)
            .enumerate()
            .map(|(new, (old, _))| (InstanceId(old), InstanceId(new)))
            .collect();

        let removed = self.nodes.len() - ids.len();
        if removed == 0 {
            return ids;
        }

        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_iter()
            .filter(|node| !node.detached)
            .map(|mut node| {
                node.renumber(&ids);
                node
            })
            .collect();

        if let Some(root) = ids.get(&self.root) {
            self.root = *root;
        }

        tracing::debug!(removed, live = self.nodes.len(), "compacted instance tree");
        ids
    }

    pub(crate) fn node(&self, id: InstanceId) -> &InstanceNode {
        &self.nodes[id.0]
    }

    fn live(&self, id: InstanceId) -> Result<InstanceRef<'_>> {
        self.get(id)
            .ok_or_else(|| Error::Instance(format!("Instance {} is not part of the tree.", id.0)))
    }

    fn push(&mut self, node: InstanceNode) -> InstanceId {
        let id = InstanceId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    // ========================================================================
    // Binding
    // ========================================================================

    fn bind_value(&mut self, schema: SchemaRef<'_>, raw: &Value, parent: InstanceId, depth: usize) -> Result<InstanceId> {
        self.limits.check_instance_depth(depth, schema.name())?;

        match schema.node_type() {
            NodeType::Container => self.bind_children(schema, raw, Some(parent), depth, InstanceType::Container),
            NodeType::List => self.bind_list(schema, raw, parent, depth),
            NodeType::Leaf => self.bind_leaf(schema, raw, parent),
            NodeType::LeafList => self.bind_leaf_list(schema, raw, parent),
            other => Err(Error::UnknownChild(format!(
                "Unknown child of type {} encountered.",
                other.keyword()
            ))),
        }
    }

    fn bind_children(
        &mut self,
        schema: SchemaRef<'_>,
        raw: &Value,
        parent: Option<InstanceId>,
        depth: usize,
        instance_type: InstanceType,
    ) -> Result<InstanceId> {
        let config = ConfigValue::parse(raw)?;
        let attributes = config.attributes(schema)?;

        let placeholder = InstanceKind::Container(ChildInstances::default());
        let id = self.push(InstanceNode::new(schema.id(), parent, attributes, placeholder));

        let mut bound = ChildInstances::default();

        if let Some(obj) = config.value().as_object() {
            for (raw_name, child) in obj {
                if child.is_null() {
                    continue;
                }

                let Some(child_schema) = schema.child(raw_name) else {
                    tracing::trace!(parent = schema.name(), child = raw_name.as_str(), "ignoring unknown payload member");
                    continue;
                };

                record_active_choices(&mut bound.active_choices, child_schema);

                let child_id = self.bind_value(child_schema, child, id, depth + 1)?;
                if let Some(previous) = bound.children.insert(child_schema.name().to_string(), child_id) {
                    tracing::debug!(
                        parent = schema.name(),
                        child = child_schema.name(),
                        member = raw_name.as_str(),
                        "payload names a child twice, keeping the last member"
                    );
                    self.detach(previous);
                }
            }
        }

        self.nodes[id.0].kind = match instance_type {
            InstanceType::ListChild => InstanceKind::ListChild(bound),
            _ => InstanceKind::Container(bound),
        };

        Ok(id)
    }

    fn bind_list(&mut self, schema: SchemaRef<'_>, raw: &Value, parent: InstanceId, depth: usize) -> Result<InstanceId> {
        let entries = match raw {
            Value::Array(entries) => entries.as_slice(),
            Value::Null => &[],
            _ => {
                return Err(Error::Instance(format!(
                    "List {} must be bound to an array.",
                    schema.name()
                )))
            }
        };

        let id = self.push(InstanceNode::new(schema.id(), Some(parent), Vec::new(), InstanceKind::List(Vec::new())));

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            children.push(self.bind_children(schema, entry, Some(id), depth + 1, InstanceType::ListChild)?);
        }

        self.nodes[id.0].kind = InstanceKind::List(children);
        Ok(id)
    }

    fn bind_leaf(&mut self, schema: SchemaRef<'_>, raw: &Value, parent: InstanceId) -> Result<InstanceId> {
        let config = ConfigValue::parse(raw)?;
        let attributes = config.attributes(schema)?;
        let value = stringify(config.value());

        Ok(self.push(InstanceNode::new(schema.id(), Some(parent), attributes, InstanceKind::Leaf(value))))
    }

    fn bind_leaf_list(&mut self, schema: SchemaRef<'_>, raw: &Value, parent: InstanceId) -> Result<InstanceId> {
        let config = ConfigValue::parse(raw)?;
        let attributes = config.attributes(schema)?;

        let id = self.push(InstanceNode::new(schema.id(), Some(parent), attributes, InstanceKind::LeafList(Vec::new())));

        let mut items = Vec::new();
        if let Some(values) = config.value().as_array() {
            for item in values {
                if let Some(item_id) = self.bind_leaf_list_item(schema, item, id)? {
                    items.push(item_id);
                }
            }
        }

        self.nodes[id.0].kind = InstanceKind::LeafList(items);
        Ok(id)
    }

    fn bind_leaf_list_item(&mut self, schema: SchemaRef<'_>, raw: &Value, parent: InstanceId) -> Result<Option<InstanceId>> {
        let config = ConfigValue::parse(raw)?;
        let Some(value) = stringify(config.value()) else {
            return Ok(None);
        };
        let attributes = config.attributes(schema)?;

        let kind = InstanceKind::LeafListChild {
            value,
            config: raw.clone(),
        };
        Ok(Some(self.push(InstanceNode::new(schema.id(), Some(parent), attributes, kind))))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    fn detach(&mut self, id: InstanceId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.detached = true;
            stack.extend(node.child_ids());
        }
    }

    /// Remove a named child of a container or list entry
    ///
    /// Key leaves of a list entry cannot be removed.
    pub fn delete_child(&mut self, id: InstanceId, name: &str) -> Result<()> {
        let instance = self.live(id)?;
        let schema = instance.schema();

        let canonical = schema.child(name).map(|c| c.name()).unwrap_or(name);
        let child = instance
            .node()
            .child_instances()
            .and_then(|c| c.children.get(canonical).copied())
            .ok_or_else(|| Error::Instance(format!("Cannot delete {}, it was not found on {}.", name, schema.name())))?;

        if instance.instance_type() == InstanceType::ListChild && schema.keys().iter().any(|k| k == canonical) {
            return Err(Error::Instance(format!("Cannot delete key {}.", name)));
        }

        let canonical = canonical.to_string();
        if let InstanceKind::Container(ref mut c) | InstanceKind::ListChild(ref mut c) = self.nodes[id.0].kind {
            c.children.shift_remove(&canonical);
        }
        self.detach(child);

        Ok(())
    }

    fn expect_type(&self, id: InstanceId, expected: InstanceType) -> Result<InstanceRef<'_>> {
        let instance = self.live(id)?;
        if instance.instance_type() != expected {
            return Err(Error::Instance(format!(
                "{} is not a {}.",
                instance.name(),
                instance.schema().node_type().keyword()
            )));
        }
        Ok(instance)
    }

    fn retain_items<F>(&mut self, id: InstanceId, keep: F)
    where
        F: Fn(&Self, InstanceId) -> bool,
    {
        let items = self.node(id).child_ids();
        let (kept, removed): (Vec<_>, Vec<_>) = items.into_iter().partition(|item| keep(self, *item));

        match self.nodes[id.0].kind {
            InstanceKind::List(ref mut items) | InstanceKind::LeafList(ref mut items) => *items = kept,
            _ => return,
        }

        for item in removed {
            self.detach(item);
        }
    }

    /// Append a new entry bound from `config` to a list
    pub fn add_list_entry(&mut self, list: InstanceId, config: &Value) -> Result<InstanceId> {
        let instance = self.expect_type(list, InstanceType::List)?;
        let schema_id = instance.node().schema;
        let depth = instance.depth();

        let model = Arc::clone(&self.model);
        let schema = SchemaRef::new(&model, schema_id);
        let entry = self.bind_children(schema, config, Some(list), depth + 1, InstanceType::ListChild)?;

        if let InstanceKind::List(ref mut items) = self.nodes[list.0].kind {
            items.push(entry);
        }
        Ok(entry)
    }

    /// Remove the entries of a list whose key string equals `key_string`
    pub fn delete_list_entry(&mut self, list: InstanceId, key_string: &str) -> Result<()> {
        self.expect_type(list, InstanceType::List)?;
        self.retain_items(list, |tree, item| InstanceRef::new(tree, item).key_string() != key_string);
        Ok(())
    }

    /// Keep only the entries of a list matching `predicate`
    pub fn filter_list<A, P>(&mut self, list: InstanceId, authorized: A, predicate: P) -> Result<()>
    where
        A: Fn(InstanceRef<'_>) -> bool,
        P: Fn(InstanceRef<'_>) -> bool,
    {
        let instance = self.expect_type(list, InstanceType::List)?;
        if !authorized(instance) {
            return Err(Error::Unauthorized(format!("cannot modify list {}", instance.name())));
        }

        self.retain_items(list, |tree, item| predicate(InstanceRef::new(tree, item)));
        Ok(())
    }

    /// Remove one entry of a list
    pub fn delete_list_instance<A>(&mut self, list: InstanceId, authorized: A, entry: InstanceId) -> Result<()>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.filter_list(list, authorized, |item| item.id() != entry)
    }

    /// Append an item bound from `config` to a leaf-list
    ///
    /// Returns `None` when the item value is null.
    pub fn add_leaf_list_item(&mut self, leaf_list: InstanceId, config: &Value) -> Result<Option<InstanceId>> {
        let schema_id = self.expect_type(leaf_list, InstanceType::LeafList)?.node().schema;

        let model = Arc::clone(&self.model);
        let item = self.bind_leaf_list_item(SchemaRef::new(&model, schema_id), config, leaf_list)?;

        if let (Some(item), InstanceKind::LeafList(items)) = (item, &mut self.nodes[leaf_list.0].kind) {
            items.push(item);
        }
        Ok(item)
    }

    /// Remove every item of a leaf-list whose visible raw value equals `value`
    pub fn delete_leaf_list_value<A>(&mut self, leaf_list: InstanceId, authorized: A, value: &str) -> Result<()>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.filter_leaf_list(leaf_list, &authorized, |item| item.raw_value(&authorized) != Some(value))
    }

    /// Keep only the items of a leaf-list matching `predicate`
    pub fn filter_leaf_list<A, P>(&mut self, leaf_list: InstanceId, authorized: A, predicate: P) -> Result<()>
    where
        A: Fn(InstanceRef<'_>) -> bool,
        P: Fn(InstanceRef<'_>) -> bool,
    {
        let instance = self.expect_type(leaf_list, InstanceType::LeafList)?;
        if !authorized(instance) {
            return Err(Error::Unauthorized(format!("cannot modify leaf-list {}", instance.name())));
        }

        self.retain_items(leaf_list, |tree, item| predicate(InstanceRef::new(tree, item)));
        Ok(())
    }

    /// Remove one item of a leaf-list
    pub fn delete_leaf_list_instance<A>(&mut self, leaf_list: InstanceId, authorized: A, item: InstanceId) -> Result<()>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.filter_leaf_list(leaf_list, authorized, |candidate| candidate.id() != item)
    }

    /// Replace the raw value of a leaf
    pub fn set_leaf_value(&mut self, leaf: InstanceId, value: Option<String>) -> Result<()> {
        self.expect_type(leaf, InstanceType::Leaf)?;
        self.nodes[leaf.0].kind = InstanceKind::Leaf(value);
        Ok(())
    }
}

fn record_active_choices(active: &mut IndexMap<String, String>, member: SchemaRef<'_>) {
    let mut case = member.choice_case();

    while let Some(current) = case {
        let Some(choice) = current.parent_choice() else {
            break;
        };

        match active.get(choice.name()) {
            None => {
                active.insert(choice.name().to_string(), current.name().to_string());
            }
            Some(selected) if selected != current.name() => {
                tracing::debug!(
                    choice = choice.name(),
                    selected = selected.as_str(),
                    ignored = current.name(),
                    "payload populates more than one case"
                );
            }
            Some(_) => {}
        }

        case = choice.choice_case();
    }
}

// ============================================================================
// Handles
// ============================================================================

/// A live instance together with its tree
#[derive(Clone, Copy)]
pub struct InstanceRef<'t> {
    tree: &'t InstanceTree,
    id: InstanceId,
}

impl<'t> InstanceRef<'t> {
    pub(crate) fn new(tree: &'t InstanceTree, id: InstanceId) -> Self {
        Self { tree, id }
    }

    pub(crate) fn node(&self) -> &'t InstanceNode {
        self.tree.node(self.id)
    }

    fn with(&self, id: InstanceId) -> InstanceRef<'t> {
        InstanceRef::new(self.tree, id)
    }

    /// Arena index of the instance
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The tree owning the instance
    pub fn tree(&self) -> &'t InstanceTree {
        self.tree
    }

    /// Variant discriminant
    pub fn instance_type(&self) -> InstanceType {
        self.node().instance_type()
    }

    /// Schema node the instance is bound to
    pub fn schema(&self) -> SchemaRef<'t> {
        SchemaRef::new(&self.tree.model, self.node().schema)
    }

    /// Schema name
    pub fn name(&self) -> &'t str {
        self.schema().name()
    }

    /// Schema name, optionally camelCased
    pub fn get_name(&self, camel: bool) -> String {
        self.schema().get_name(camel)
    }

    /// Parent instance; `None` for the root
    pub fn parent(&self) -> Option<InstanceRef<'t>> {
        self.node().parent.map(|id| self.with(id))
    }

    fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |p| p.parent()).count()
    }

    /// Path from the root to this instance
    pub fn path(&self) -> Path {
        let mut path = match self.parent() {
            Some(parent) => parent.path(),
            None => Path::new(),
        };

        match self.node().kind {
            InstanceKind::ListChild(_) => {
                let keys = self
                    .schema()
                    .keys()
                    .iter()
                    .map(|key| Key::new(key.as_str(), self.key_value(key).unwrap_or_default()))
                    .collect();
                if let Some(last) = path.last_mut() {
                    last.keys = Some(keys);
                }
            }
            InstanceKind::LeafListChild { ref value, .. } => {
                if let Some(last) = path.last_mut() {
                    last.value = Some(value.clone());
                }
            }
            _ => path.push(PathSegment::new(self.name())),
        }

        path
    }

    /// Attributes parsed from the payload envelope
    pub fn attributes(&self) -> &'t [Attribute] {
        &self.node().attributes
    }

    /// Attribute values by name
    pub fn custom_attributes(&self) -> IndexMap<&'t str, &'t str> {
        self.attributes()
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect()
    }

    /// Whether any attribute is present
    pub fn has_attributes(&self) -> bool {
        !self.attributes().is_empty()
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Direct children passing `authorized`
    ///
    /// A leaf-list yields its items only when the leaf-list itself passes.
    pub fn children<A>(&self, authorized: A) -> Vec<InstanceRef<'t>>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        if self.instance_type() == InstanceType::LeafList && !authorized(*self) {
            return Vec::new();
        }

        self.node()
            .child_ids()
            .into_iter()
            .map(|id| self.with(id))
            .filter(|child| authorized(*child))
            .collect()
    }

    /// Named child of a container or list entry
    pub fn child<A>(&self, authorized: A, name: &str) -> Result<InstanceRef<'t>>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.find_child(name)
            .filter(|child| authorized(*child))
            .ok_or_else(|| {
                let owner = match self.instance_type() {
                    InstanceType::ListChild => "list instance",
                    _ => "container",
                };
                Error::Instance(format!("Child {} not found on {} {}.", name, owner, self.name()))
            })
    }

    /// Named child of a container or list entry, ignoring authorization
    pub(crate) fn find_child(&self, name: &str) -> Option<InstanceRef<'t>> {
        let canonical = self.schema().child(name).map(|c| c.name()).unwrap_or(name);
        self.node()
            .child_instances()
            .and_then(|c| c.children.get(canonical))
            .map(|id| self.with(*id))
    }

    /// Entries of a list passing `authorized`, by key string
    pub fn entries_by_key<A>(&self, authorized: A) -> IndexMap<String, InstanceRef<'t>>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.children(authorized)
            .into_iter()
            .filter(|c| c.instance_type() == InstanceType::ListChild)
            .map(|c| (c.key_string(), c))
            .collect()
    }

    /// Choice name to selected case name, for containers and list entries
    pub fn active_choices(&self) -> Option<&'t IndexMap<String, String>> {
        self.node().child_instances().map(|c| &c.active_choices)
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Raw value of a leaf
    pub fn value<A>(&self, authorized: A) -> Option<&'t str>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        match self.node().kind {
            InstanceKind::Leaf(ref value) if authorized(*self) => value.as_deref(),
            _ => None,
        }
    }

    /// Value of a leaf converted through its type
    pub fn converted_value<A>(&self, authorized: A) -> Option<Value>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        let raw = self.value(authorized)?;
        self.schema().leaf_type().map(|t| t.serialize(raw))
    }

    /// Converted values of the leaf-list items passing `authorized`
    pub fn values<A>(&self, authorized: A) -> Vec<Value>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.item_refs()
            .filter(|item| authorized(*item))
            .map(|item| item.item_value())
            .collect()
    }

    /// Raw leaf-list item values; items failing `authorized` yield `None`
    pub fn raw_values<A>(&self, authorized: A) -> Vec<Option<&'t str>>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.item_refs().map(|item| item.raw_value(&authorized)).collect()
    }

    pub(crate) fn item_refs(&self) -> impl Iterator<Item = InstanceRef<'t>> + 't {
        let tree = self.tree;
        let items = match self.node().kind {
            InstanceKind::LeafList(ref items) => items.as_slice(),
            _ => &[],
        };
        items.iter().map(move |id| InstanceRef::new(tree, *id))
    }

    /// Raw value of a leaf-list item
    pub fn raw_value<A>(&self, authorized: A) -> Option<&'t str>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        match self.node().kind {
            InstanceKind::LeafListChild { ref value, .. } if authorized(*self) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Value of a leaf-list item converted through its type
    pub fn item_value(&self) -> Value {
        match self.node().kind {
            InstanceKind::LeafListChild { ref value, .. } => self
                .schema()
                .leaf_type()
                .map(|t| t.serialize(value))
                .unwrap_or_else(|| Value::String(value.clone())),
            _ => Value::Null,
        }
    }

    /// Payload a leaf-list item was bound from
    pub fn config<A>(&self, authorized: A) -> Result<&'t Value>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        if !authorized(*self) {
            return Err(Error::Unauthorized(format!("cannot read {}", self.name())));
        }

        match self.node().kind {
            InstanceKind::LeafListChild { ref config, .. } => Ok(config),
            _ => Err(Error::Instance(format!("{} is not a leaf-list item.", self.name()))),
        }
    }

    // ========================================================================
    // List entries
    // ========================================================================

    pub(crate) fn key_value(&self, key: &str) -> Option<&'t str> {
        let id = self.node().child_instances()?.children.get(key)?;
        match self.tree.node(*id).kind {
            InstanceKind::Leaf(ref value) => value.as_deref(),
            _ => None,
        }
    }

    /// Key values of a list entry in key order, joined with `,`
    pub fn key_string(&self) -> String {
        self.schema()
            .keys()
            .iter()
            .map(|key| self.key_value(key).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Key name to value of a list entry; keys failing `authorized` map to `None`
    pub fn keys<A>(&self, authorized: A) -> IndexMap<&'t str, Option<&'t str>>
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.schema()
            .keys()
            .iter()
            .map(|key| {
                let value = self
                    .node()
                    .child_instances()
                    .and_then(|c| c.children.get(key.as_str()))
                    .and_then(|id| self.with(*id).value(&authorized));
                (key.as_str(), value)
            })
            .collect()
    }

    /// Whether the instance is a key leaf of its list entry
    pub fn is_key(&self) -> bool {
        self.instance_type() == InstanceType::Leaf && self.schema().is_key()
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Visit the instance and every live descendant, pre-order
    pub fn visit<F: FnMut(InstanceRef<'t>)>(&self, visitor: &mut F) {
        visitor(*self);

        for child in self.node().child_ids() {
            self.with(child).visit(visitor);
        }
    }
}

impl std::fmt::Debug for InstanceRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRef")
            .field("type", &self.instance_type())
            .field("path", &self.path())
            .finish()
    }
}

impl PartialEq for InstanceRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for InstanceRef<'_> {}
