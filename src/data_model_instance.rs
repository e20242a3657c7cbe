//! Data model instances
//!
//! A [`DataModelInstance`] is the entry point for working with one
//! configuration document: it binds the payload under the model's root name,
//! resolves paths from that root and forwards JSON-mode evaluation (`when`
//! conditions, leafrefs, suggestion refs) to a pluggable
//! [`JsonModeEvaluators`] backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::instance::{
    path_to_model_path, InstanceRef, InstanceTree, MapOptions, NoMatch, Path, PathSegment, SerializeOptions,
};
use crate::limits::Limits;
use crate::model::{DataModel, NodeType};

/// Evaluation backend for expressions the data model cannot resolve itself
#[async_trait]
pub trait JsonModeEvaluators: Send + Sync {
    /// Evaluate the `when` conditions applying to `path`
    async fn evaluate_when_condition(&self, path: &[PathSegment], context: Option<&Value>) -> Result<bool>;

    /// Values a leafref at `path` may take
    async fn evaluate_leaf_ref(&self, path: &[PathSegment], context: Option<&Value>) -> Result<Vec<String>>;

    /// Values suggested for the leaf at `path`
    async fn evaluate_suggestion_ref(&self, path: &[PathSegment], context: Option<&Value>) -> Result<Vec<String>>;

    /// Path of the instance a leafref at `path` points to
    async fn resolve_leaf_ref_path(&self, path: &[PathSegment], context: Option<&Value>) -> Result<Path>;
}

/// Evaluators accepting every condition and resolving nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEvaluators;

#[async_trait]
impl JsonModeEvaluators for DefaultEvaluators {
    async fn evaluate_when_condition(&self, _: &[PathSegment], _: Option<&Value>) -> Result<bool> {
        Ok(true)
    }

    async fn evaluate_leaf_ref(&self, _: &[PathSegment], _: Option<&Value>) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn evaluate_suggestion_ref(&self, _: &[PathSegment], _: Option<&Value>) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn resolve_leaf_ref_path(&self, _: &[PathSegment], _: Option<&Value>) -> Result<Path> {
        Ok(Path::new())
    }
}

/// A configuration document bound against a data model
pub struct DataModelInstance {
    model: Arc<DataModel>,
    tree: InstanceTree,
    evaluators: Box<dyn JsonModeEvaluators>,
}

impl DataModelInstance {
    /// Bind a `{ <root name>: { .. } }` document
    ///
    /// When the root name is absent the first member is bound instead.
    pub fn new(model: Arc<DataModel>, instance: &Value) -> Result<Self> {
        Self::with_limits(model, instance, Limits::default())
    }

    /// Bind with explicit recursion limits
    pub fn with_limits(model: Arc<DataModel>, instance: &Value, limits: Limits) -> Result<Self> {
        let empty = Value::Null;
        let root_config = instance
            .as_object()
            .and_then(|members| members.get(model.root_name()).or_else(|| members.values().next()))
            .unwrap_or(&empty);

        let tree = InstanceTree::bind_with_limits(Arc::clone(&model), root_config, limits)?;

        Ok(Self {
            model,
            tree,
            evaluators: Box::new(DefaultEvaluators),
        })
    }

    /// Replace the evaluation backend
    pub fn with_evaluators<E: JsonModeEvaluators + 'static>(mut self, evaluators: E) -> Self {
        self.evaluators = Box::new(evaluators);
        self
    }

    /// The data model
    pub fn model(&self) -> &Arc<DataModel> {
        &self.model
    }

    /// The bound instances
    pub fn tree(&self) -> &InstanceTree {
        &self.tree
    }

    /// The bound instances, for mutation
    pub fn tree_mut(&mut self) -> &mut InstanceTree {
        &mut self.tree
    }

    /// Root container instance
    pub fn root(&self) -> InstanceRef<'_> {
        self.tree.root()
    }

    /// Find the instance addressed by a path starting at the root
    pub fn get_instance<'s, 'p, H>(&'s self, path: &'p [PathSegment], on_no_match: H) -> Result<Option<InstanceRef<'s>>>
    where
        H: FnOnce(NoMatch<'s, 'p>) -> Result<()>,
    {
        let first = path
            .first()
            .ok_or_else(|| Error::Instance("Path length must be greater than 0.".to_string()))?;

        if first.name != self.model.root_name() {
            return Err(Error::Instance(format!("Path must start with {}.", self.model.root_name())));
        }

        self.tree.root().get_instance(path, on_no_match)
    }

    /// Render the document, see [`InstanceRef::to_json`]
    pub fn to_json<A>(
        &self,
        authorized: A,
        options: &SerializeOptions,
        skip: Option<&dyn Fn(InstanceRef<'_>) -> bool>,
    ) -> Value
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.root().to_json(authorized, options, skip)
    }

    /// Render the document through a mapper, see [`InstanceRef::map_to_json`]
    pub fn map_to_json<A, M>(&self, authorized: A, mapper: M, options: &MapOptions) -> Result<Value>
    where
        A: Fn(InstanceRef<'_>) -> bool,
        M: Fn(InstanceRef<'_>) -> Value,
    {
        self.root().map_to_json(authorized, mapper, options)
    }

    /// Visit every instance, pre-order
    pub fn visit<'s, F: FnMut(InstanceRef<'s>)>(&'s self, visitor: &mut F) {
        self.tree.root().visit(visitor);
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluate the `when` conditions of the node at `path`
    ///
    /// Nodes without a `when` on themselves or an ancestor are always
    /// present. A choice is evaluated in the context of its parent.
    pub async fn evaluate_when_condition(&self, path: &[PathSegment], context: Option<&Value>) -> Result<bool> {
        let (has_when, is_choice) = {
            let model = self.model.get_model_for_path(&path_to_model_path(path))?;
            (model.has_when_ancestor_or_self(), model.node_type() == NodeType::Choice)
        };

        if !has_when {
            tracing::trace!(path = %path_to_model_path(path), "no when condition applies");
            return Ok(true);
        }

        let evaluation_path = if is_choice {
            &path[..path.len().saturating_sub(1)]
        } else {
            path
        };

        self.evaluators.evaluate_when_condition(evaluation_path, context).await
    }

    /// Values a leafref at `path` may take
    pub async fn evaluate_leaf_ref(&self, path: &[PathSegment], context: Option<&Value>) -> Result<Vec<String>> {
        self.evaluators.evaluate_leaf_ref(path, context).await
    }

    /// Values suggested for the leaf at `path`
    pub async fn evaluate_suggestion_ref(&self, path: &[PathSegment], context: Option<&Value>) -> Result<Vec<String>> {
        self.evaluators.evaluate_suggestion_ref(path, context).await
    }

    /// Path of the instance a leafref at `path` points to
    pub async fn resolve_leaf_ref_path(&self, path: &[PathSegment], context: Option<&Value>) -> Result<Path> {
        self.evaluators.resolve_leaf_ref_path(path, context).await
    }
}

impl std::fmt::Debug for DataModelInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataModelInstance")
            .field("root", &self.model.root_name())
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}
