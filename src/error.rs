//! Error types for yang-datamodel
//!
//! This module defines all error types used throughout the library.
//! Schema errors are fatal and surface from model construction; instance,
//! path and authorization errors surface from individual operations on a
//! bound instance tree.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for data model operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete schema
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A type statement names no known type and has no typedef
    #[error("{0}")]
    TypeResolution(String),

    /// A built-in type is missing one of its mandatory sub-statements
    #[error("{type_name} type must specify {field}.")]
    RequiredField {
        /// Type name, e.g. `decimal64`
        type_name: String,
        /// Missing statement keyword, e.g. `fraction-digits`
        field: String,
    },

    /// Invalid operation on an instance tree
    #[error("{0}")]
    Instance(String),

    /// Path lookup failure
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Read or mutation attempted without passing the authorization check
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Binding reached a schema node that cannot hold instance data
    #[error("unknown child: {0}")]
    UnknownChild(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a missing required sub-statement of a type
    pub fn required_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Error::RequiredField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Whether this error was raised while building the schema
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::Schema(_) | Error::TypeResolution(_) | Error::RequiredField { .. }
        )
    }
}

/// Schema construction error with context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error message
    pub message: String,
    /// Dotted registry path of the node being built
    pub path: Option<String>,
    /// Keyword of the offending statement
    pub keyword: Option<String>,
}

impl SchemaError {
    /// Create a new schema error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            keyword: None,
        }
    }

    /// Set the path of the node being built
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the keyword of the offending statement
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref keyword) = self.keyword {
            write!(f, " (statement '{}')", keyword)?;
        }

        if let Some(ref path) = self.path {
            write!(f, " at {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Why a path lookup could not proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatchReason {
    /// No child carries the next segment's name
    SegmentNotFound,
    /// A list was traversed without keys
    KeysRequired,
    /// A supplied key is not declared by the list
    UnknownKey(String),
    /// No list entry carries the supplied key values
    KeyValueNotFound,
    /// No leaf-list item carries the supplied value
    ValueNotFound,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::SegmentNotFound => write!(f, "segment not found"),
            NoMatchReason::KeysRequired => write!(f, "keys are required to traverse a list"),
            NoMatchReason::UnknownKey(key) => write!(f, "key '{}' is not declared by the list", key),
            NoMatchReason::KeyValueNotFound => write!(f, "no list entry matches the keys"),
            NoMatchReason::ValueNotFound => write!(f, "no leaf-list item matches the value"),
        }
    }
}

/// Path lookup error
#[derive(Debug, Clone)]
pub struct PathError {
    /// Error message
    pub message: String,
    /// Remaining (unresolved) path rendered as XPath
    pub remaining: Option<String>,
    /// Lookup failure reason
    pub reason: Option<NoMatchReason>,
}

impl PathError {
    /// Create a new path error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            remaining: None,
            reason: None,
        }
    }

    /// Set the unresolved remainder of the path
    pub fn with_remaining(mut self, remaining: impl Into<String>) -> Self {
        self.remaining = Some(remaining.into());
        self
    }

    /// Set the failure reason
    pub fn with_reason(mut self, reason: NoMatchReason) -> Self {
        self.reason = Some(reason);
        self
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }

        if let Some(ref remaining) = self.remaining {
            write!(f, "\n\nRemaining: {}", remaining)?;
        }

        Ok(())
    }
}

impl std::error::Error for PathError {}
