//! Derived (typedef) types
//!
//! A `type` statement naming a typedef carries the typedef inline. The
//! typedef's own `type` becomes the base type, with any restrictions written
//! at the point of use appended to it, so chains of typedefs resolve
//! recursively down to a built-in type.

use crate::element::Element;
use crate::error::{Error, Result};
use crate::identities::Identities;
use crate::names::{collapse_line_breaks, split_whitespace_tokens};

use super::Type;

/// A type defined through one or more typedefs
#[derive(Debug, Clone)]
pub struct DerivedType {
    /// Declared (usually prefixed) type name
    pub name: String,
    /// Type the typedef restricts
    pub base_type: Box<Type>,
    /// Default value, inherited from base typedefs when not set here
    pub default: Option<String>,
    /// Units, inherited from base typedefs when not set here
    pub units: Option<String>,
    /// Description, inherited from base typedefs when not set here
    pub description: Option<String>,
    /// Paths suggested as value sources
    pub suggestion_refs: Vec<String>,
}

impl DerivedType {
    /// Build from a `type` statement whose name is not a built-in type
    pub fn from_element(el: &Element, identities: &Identities) -> Result<Self> {
        let name = el.name_or_empty().to_string();
        let typedef = el
            .find_child("typedef")
            .ok_or_else(|| Error::TypeResolution(format!("Type constructor not found for {}", name)))?;

        let mut base_el = typedef
            .find_child("type")
            .cloned()
            .ok_or_else(|| Error::required_field("typedef", "type"))?;

        // Restrictions at the point of use refine the typedef's base type.
        base_el.children.extend(
            el.children
                .iter()
                .filter(|c| c.keyword != "typedef" && c.keyword != "type")
                .cloned(),
        );

        let base_type = Type::resolve(&base_el, identities)?;
        let inherited = match base_type {
            Type::Derived(ref base) => Some(base),
            _ => None,
        };

        let default = typedef
            .child_value("default")
            .map(str::to_string)
            .or_else(|| inherited.and_then(|b| b.default.clone()));
        let units = typedef
            .child_name("units")
            .map(str::to_string)
            .or_else(|| inherited.and_then(|b| b.units.clone()));
        let description = typedef
            .child_text("description")
            .map(collapse_line_breaks)
            .or_else(|| inherited.and_then(|b| b.description.clone()));
        let suggestion_refs = typedef
            .child_text("suggestionref")
            .map(split_whitespace_tokens)
            .unwrap_or_default();

        Ok(Self {
            name,
            base_type: Box::new(base_type),
            default,
            units,
            description,
            suggestion_refs,
        })
    }

    /// The first non-derived type down the typedef chain
    pub fn built_in_type(&self) -> &Type {
        match *self.base_type {
            Type::Derived(ref base) => base.built_in_type(),
            ref other => other,
        }
    }
}
