//! Configuration instances
//!
//! This module binds JSON configuration payloads against a [`DataModel`]:
//!
//! - [`InstanceTree`] owns the bound instances and every mutation
//! - [`InstanceRef`] is a borrowed handle used for reads, lookups and rendering
//! - [`Path`] addresses a single instance from the root
//! - [`Attribute`] carries NETCONF edit metadata parsed from payload envelopes
//!
//! Every read takes an authorization predicate; [`allow`] admits everything.
//!
//! [`DataModel`]: crate::model::DataModel

mod attributes;
mod json;
mod path;
mod search;
mod tree;

pub use attributes::{Attribute, ConfigValue, Envelope, Insert, NetconfOperation, Position};
pub use json::{default_mapper, json_size, MapOptions, SerializeOptions};
pub use path::{path_to_model_path, path_to_xpath, Key, Path, PathSegment};
pub use search::{fail_on_no_match, ignore_no_match, NoMatch};
pub use tree::{allow, InstanceId, InstanceRef, InstanceTree, InstanceType};
