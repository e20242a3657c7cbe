//! Limits and constraints for schema and instance processing
//!
//! Schema trees and configuration payloads are both walked recursively, so
//! nesting depth is capped to keep pathological inputs from exhausting the
//! stack.

use crate::error::{Error, Result, SchemaError};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum nesting depth of schema statements below the model root
    pub max_schema_depth: usize,

    /// Maximum nesting depth of a bound configuration payload
    pub max_instance_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_schema_depth: 256,
            max_instance_depth: 256,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_schema_depth: 32,
            max_instance_depth: 32,
        }
    }

    /// Set the schema depth limit
    pub fn with_max_schema_depth(mut self, depth: usize) -> Self {
        self.max_schema_depth = depth;
        self
    }

    /// Set the instance depth limit
    pub fn with_max_instance_depth(mut self, depth: usize) -> Self {
        self.max_instance_depth = depth;
        self
    }

    /// Check if schema depth is within limits
    pub fn check_schema_depth(&self, depth: usize, path: &str) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(Error::Schema(
                SchemaError::new(format!(
                    "Schema depth {} exceeds maximum {}",
                    depth, self.max_schema_depth
                ))
                .with_path(path),
            ))
        } else {
            Ok(())
        }
    }

    /// Check if instance depth is within limits
    pub fn check_instance_depth(&self, depth: usize, name: &str) -> Result<()> {
        if depth > self.max_instance_depth {
            Err(Error::Instance(format!(
                "Instance depth {} exceeds maximum {} at {}",
                depth, self.max_instance_depth, name
            )))
        } else {
            Ok(())
        }
    }
}
