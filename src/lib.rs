//! # yang-datamodel
//!
//! Schema-driven binding of JSON configuration data against YANG data models.
//!
//! A YANG module set is loaded from its YIN-as-JSON export into a
//! [`DataModel`]: a tree of containers, lists, leaves, leaf-lists and
//! choices with resolved types and an identity registry. Configuration
//! payloads are then bound against the model to produce instances which can
//! be looked up by path, mutated, and rendered back to JSON under an
//! authorization predicate.
//!
//! ## Features
//!
//! - Type resolution for every YANG built-in, typedef chains and unions
//! - Identity registry for `identityref` options
//! - Path registry addressing every schema node by dotted path
//! - Instance binding with NETCONF edit attributes (`_operation`, `_position`)
//! - Authorized `to_json` and mapper-driven `map_to_json` rendering
//! - Pluggable async evaluators for `when`, leafref and suggestion refs
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use yang_datamodel::{allow, DataModel, DataModelInstance, Element, SerializeOptions};
//!
//! let doc = Element::from_json_str(&std::fs::read_to_string("model.json")?)?;
//! let model = DataModel::from_element(&doc, |doc| doc.descend(&["config", "authority"]))?;
//!
//! let config = serde_json::from_str(&std::fs::read_to_string("config.json")?)?;
//! let instance = DataModelInstance::new(Arc::new(model), &config)?;
//!
//! println!("{}", instance.to_json(allow, &SerializeOptions::default(), None));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;

// Schema documents
pub mod element;
pub mod identities;
pub mod parsers;
pub mod types;

// Schema model
pub mod model;

// Instances
pub mod data_model_instance;
pub mod instance;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use data_model_instance::{DataModelInstance, DefaultEvaluators, JsonModeEvaluators};
pub use element::Element;
pub use error::{Error, Result};
pub use identities::Identities;
pub use instance::{
    allow, fail_on_no_match, ignore_no_match, InstanceRef, InstanceTree, MapOptions, Path, PathSegment,
    SerializeOptions,
};
pub use limits::Limits;
pub use model::{DataModel, DataModelBuilder, NodeType, SchemaRef};
pub use types::Type;

/// Version of the yang-datamodel library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
